//! Property definitions and registry.
//!
//! Every property the plugin writes to Artifactory is declared here. Bulk
//! operations (cleanup in particular) iterate [`PROPERTIES`], so a property
//! missing from the table is never cleaned up.

/// Prefix shared by every Black Duck property name.
pub const PROPERTY_PREFIX: &str = "blackduck.";

/// Suffix appended to a property name to form its companion time name.
pub const TIME_NAME_SUFFIX: &str = "Converted";

/// A property the plugin knows how to read, write, and clean up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyDefinition {
    /// Key the value is stored under (e.g. "blackduck.projectName")
    pub name: &'static str,

    /// Key of the companion property holding the time-zone converted date.
    ///
    /// Always present, even for properties that never hold dates.
    pub time_name: &'static str,
}

impl PropertyDefinition {
    const fn new(name: &'static str, time_name: &'static str) -> Self {
        Self { name, time_name }
    }

    /// The name without [`PROPERTY_PREFIX`].
    pub fn key(&self) -> &'static str {
        self.name.strip_prefix(PROPERTY_PREFIX).unwrap_or(self.name)
    }
}

pub const PROJECT_NAME: PropertyDefinition = PropertyDefinition::new(
    "blackduck.projectName",
    "blackduck.projectNameConverted",
);
pub const PROJECT_VERSION_NAME: PropertyDefinition = PropertyDefinition::new(
    "blackduck.projectVersionName",
    "blackduck.projectVersionNameConverted",
);
pub const PROJECT_VERSION_URL: PropertyDefinition = PropertyDefinition::new(
    "blackduck.projectVersionUrl",
    "blackduck.projectVersionUrlConverted",
);
pub const PROJECT_VERSION_UI_URL: PropertyDefinition = PropertyDefinition::new(
    "blackduck.projectVersionUiUrl",
    "blackduck.projectVersionUiUrlConverted",
);
pub const ORIGIN_ID: PropertyDefinition =
    PropertyDefinition::new("blackduck.originId", "blackduck.originIdConverted");
pub const FORGE: PropertyDefinition =
    PropertyDefinition::new("blackduck.forge", "blackduck.forgeConverted");
pub const HIGH_VULNERABILITIES: PropertyDefinition = PropertyDefinition::new(
    "blackduck.highVulnerabilities",
    "blackduck.highVulnerabilitiesConverted",
);
pub const MEDIUM_VULNERABILITIES: PropertyDefinition = PropertyDefinition::new(
    "blackduck.mediumVulnerabilities",
    "blackduck.mediumVulnerabilitiesConverted",
);
pub const LOW_VULNERABILITIES: PropertyDefinition = PropertyDefinition::new(
    "blackduck.lowVulnerabilities",
    "blackduck.lowVulnerabilitiesConverted",
);
pub const POLICY_STATUS: PropertyDefinition = PropertyDefinition::new(
    "blackduck.policyStatus",
    "blackduck.policyStatusConverted",
);
pub const OVERALL_POLICY_STATUS: PropertyDefinition = PropertyDefinition::new(
    "blackduck.overallPolicyStatus",
    "blackduck.overallPolicyStatusConverted",
);
pub const COMPONENT_VERSION_URL: PropertyDefinition = PropertyDefinition::new(
    "blackduck.componentVersionUrl",
    "blackduck.componentVersionUrlConverted",
);
pub const SCAN_TIME: PropertyDefinition =
    PropertyDefinition::new("blackduck.scanTime", "blackduck.scanTimeConverted");
pub const SCAN_RESULT: PropertyDefinition =
    PropertyDefinition::new("blackduck.scanResult", "blackduck.scanResultConverted");
pub const POST_SCAN_ACTION_STATUS: PropertyDefinition = PropertyDefinition::new(
    "blackduck.postScanActionStatus",
    "blackduck.postScanActionStatusConverted",
);
pub const POST_SCAN_PHASE: PropertyDefinition = PropertyDefinition::new(
    "blackduck.postScanPhase",
    "blackduck.postScanPhaseConverted",
);
pub const INSPECTION_STATUS: PropertyDefinition = PropertyDefinition::new(
    "blackduck.inspectionStatus",
    "blackduck.inspectionStatusConverted",
);
pub const INSPECTION_RETRY_COUNT: PropertyDefinition = PropertyDefinition::new(
    "blackduck.inspectionRetryCount",
    "blackduck.inspectionRetryCountConverted",
);
pub const LAST_INSPECTION: PropertyDefinition = PropertyDefinition::new(
    "blackduck.lastInspection",
    "blackduck.lastInspectionConverted",
);
pub const LAST_UPDATE: PropertyDefinition =
    PropertyDefinition::new("blackduck.lastUpdate", "blackduck.lastUpdateConverted");
pub const UPDATE_STATUS: PropertyDefinition = PropertyDefinition::new(
    "blackduck.updateStatus",
    "blackduck.updateStatusConverted",
);

/// Registry of all Black Duck properties, in declaration order.
///
/// This is the single source of truth for what the plugin manages.
pub const PROPERTIES: &[PropertyDefinition] = &[
    // Project identity
    PROJECT_NAME,
    PROJECT_VERSION_NAME,
    PROJECT_VERSION_URL,
    PROJECT_VERSION_UI_URL,
    // Component identity
    ORIGIN_ID,
    FORGE,
    // Inspection results
    HIGH_VULNERABILITIES,
    MEDIUM_VULNERABILITIES,
    LOW_VULNERABILITIES,
    POLICY_STATUS,
    OVERALL_POLICY_STATUS,
    COMPONENT_VERSION_URL,
    // Scanning
    SCAN_TIME,
    SCAN_RESULT,
    POST_SCAN_ACTION_STATUS,
    POST_SCAN_PHASE,
    // Bookkeeping
    INSPECTION_STATUS,
    INSPECTION_RETRY_COUNT,
    LAST_INSPECTION,
    LAST_UPDATE,
    UPDATE_STATUS,
];

/// Look up a definition in `vocabulary` by full name ("blackduck.forge") or
/// bare key ("forge").
pub fn find_in(
    vocabulary: &'static [PropertyDefinition],
    name: &str,
) -> Option<&'static PropertyDefinition> {
    let name = name.trim();
    vocabulary
        .iter()
        .find(|definition| definition.name == name)
        .or_else(|| vocabulary.iter().find(|definition| definition.key() == name))
}
