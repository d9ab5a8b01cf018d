//! # Property Management
//!
//! Black Duck tags repository paths with properties: project identity,
//! vulnerability counts, policy status, scan and inspection bookkeeping.
//!
//! - [`vocabulary`]: the closed set of property definitions the plugin manages
//! - [`service`]: typed get/set/delete, bulk discovery, and selective cleanup
//!
//! Every definition has a companion *time name* (`<name>Converted`). When a
//! date is written and a display time zone is configured, the zone-converted
//! rendering is stored under the companion; deleting a property always removes
//! both.

pub mod service;
pub mod vocabulary;

pub use service::{CleanupParams, PropertyService, EXCLUDED_PROPERTIES_PARAM};
pub use vocabulary::{find_in, PropertyDefinition, PROPERTIES};
