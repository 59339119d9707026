use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::{ContractKind, ScanResult, UnitFailurePolicy};

// ============================================================
// Tool Parameters
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanContractsParams {
    /// Path to a .sln or .csproj file
    pub input_path: String,
    /// Only return contracts of this kind
    pub kind: Option<ContractKind>,
    /// Maximum number of items to return (default 50, max 500)
    pub limit: Option<u32>,
    /// Number of items to skip
    pub offset: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetConfigParams {
    /// Directory to start the config file search from
    pub project_root_path: String,
}

// ============================================================
// Config Types (get_config)
// ============================================================

/// Configuration DTO for MCP
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDto {
    /// True if config was loaded from a file, false if using defaults
    pub from_file: bool,
    pub config: ConfigValues,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigValues {
    pub ignores: Vec<String>,
    pub include_generated: bool,
    pub on_unit_failure: UnitFailurePolicy,
    pub output: String,
    pub data_members_output: String,
}

impl From<crate::config::Config> for ConfigValues {
    fn from(c: crate::config::Config) -> Self {
        Self {
            ignores: c.ignores,
            include_generated: c.include_generated,
            on_unit_failure: c.on_unit_failure,
            output: c.output,
            data_members_output: c.data_members_output,
        }
    }
}

// ============================================================
// Scan Types (scan_contracts)
// ============================================================

/// Result of scan_contracts operation
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractScanResult {
    /// Number of contracts matching the kind filter
    pub total_count: usize,
    pub service_contract_count: usize,
    pub data_contract_count: usize,
    pub items: Vec<ScanResult>,
    pub pagination: Pagination,
}

/// Pagination information
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
}
