//! # Black Duck Artifactory Architecture
//!
//! This crate manages the metadata Black Duck attaches to Artifactory items: a
//! closed vocabulary of `blackduck.*` properties, read and written with typed
//! accessors, discovered in bulk, and cleaned up selectively.
//!
//! It is a library first; `bd-artifactory` is a thin CLI over it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (args.rs, wired by main.rs)                      │
//! │  - Parses arguments, picks a store, prints results          │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Service Layer (properties/, inspection.rs, scan.rs)        │
//! │  - PropertyService: typed get/set/delete, bulk cleanup      │
//! │  - Dates rendered through DateTimeManager                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/, artifactory/)                       │
//! │  - Abstract PropertyStore trait                             │
//! │  - ArtifactoryPropertyStore (REST), FilePropertyStore,      │
//! │    InMemoryPropertyStore (testing)                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: The Store Is Injected
//!
//! [`PropertyService`](properties::PropertyService) owns no state besides its
//! collaborators. The same service code runs against Artifactory, a JSON file
//! or an in-memory map, which is where most of the tests live.
//!
//! Library code never prints; diagnostics go through the `log` facade and the
//! binary decides where they end up (see [`logging`]).
//!
//! ## Module Overview
//!
//! - [`model`]: `RepoPath`, `NameVersion`, `PropertyQuery`
//! - [`properties`]: the vocabulary and `PropertyService`
//! - [`datetime`]: `DateTimeManager`
//! - [`store`]: `PropertyStore` and the local stores
//! - [`artifactory`]: REST client, Artifactory-backed store, repository configuration
//! - [`inspection`]: populating vulnerability and policy metadata
//! - [`scan`]: scan eligibility
//! - [`config`]: layered configuration
//! - [`error`]: `BlackDuckError`

pub mod artifactory;
pub mod config;
pub mod datetime;
pub mod error;
pub mod inspection;
pub mod logging;
pub mod model;
pub mod properties;
pub mod scan;
pub mod store;
