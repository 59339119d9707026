use std::path::Path;

use anyhow::Result;
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::{
    config::{load_config, search_dir_for},
    core::{ContractKind, ScanOptions},
    output::{MemorySink, scan_into},
    workspace::WorkspaceOptions,
};

use super::types::{
    ConfigDto, ConfigValues, ContractScanResult, GetConfigParams, Pagination, ScanContractsParams,
};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

#[derive(Clone)]
pub struct ContractScanMcpServer {
    tool_router: ToolRouter<Self>,
}

impl Default for ContractScanMcpServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl ContractScanMcpServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    /// Scan a solution or project for service and data contracts
    #[tool(
        description = "Scan a .sln or .csproj for [ServiceContract] and [DataContract] types. Returns counts by kind and a paginated list of contracts; data contracts include their [DataMember] names in declaration order."
    )]
    pub async fn scan_contracts(
        &self,
        params: Parameters<ScanContractsParams>,
    ) -> Result<CallToolResult, McpError> {
        let input = Path::new(&params.0.input_path);
        let limit = params
            .0
            .limit
            .map(|v| v as usize)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);
        let offset = params.0.offset.map(|v| v as usize).unwrap_or(0);

        let config = load_config(&search_dir_for(input))
            .map_err(|e| {
                McpError::internal_error(format!("Failed to load config: {:#}", e), None)
            })?
            .config;
        let options = ScanOptions {
            unit_failure: config.on_unit_failure,
            workspace: WorkspaceOptions {
                include_generated: config.include_generated,
                ignores: config.ignores,
            },
        };

        let mut sink = MemorySink::new();
        let summary = scan_into(input, &options, &mut sink, None, &CancellationToken::new())
            .map_err(|e| McpError::internal_error(format!("Scan failed: {}", e), None))?;

        let all_items: Vec<_> = sink
            .into_results()
            .into_iter()
            .filter(|result| params.0.kind.is_none_or(|kind| result.kind == kind))
            .collect();
        let total_count = all_items.len();

        // Apply pagination
        let items: Vec<_> = all_items.into_iter().skip(offset).take(limit).collect();
        let has_more = offset + items.len() < total_count;

        let scan_result = ContractScanResult {
            total_count,
            service_contract_count: match params.0.kind {
                Some(ContractKind::DataContract) => 0,
                _ => summary.service_contracts,
            },
            data_contract_count: match params.0.kind {
                Some(ContractKind::ServiceContract) => 0,
                _ => summary.data_contracts,
            },
            items,
            pagination: Pagination {
                offset,
                limit,
                has_more,
            },
        };

        json_result(&scan_result)
    }

    /// Get project configuration
    #[tool(
        description = "Get the contractscan configuration (.contractscanrc.json) that applies to a directory, or the defaults when no config file is found."
    )]
    pub async fn get_config(
        &self,
        params: Parameters<GetConfigParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = Path::new(&params.0.project_root_path);

        let result = load_config(path).map_err(|e| {
            McpError::internal_error(format!("Failed to load config: {:#}", e), None)
        })?;

        let config_dto = ConfigDto {
            from_file: result.from_file,
            config: ConfigValues::from(result.config),
        };

        json_result(&config_dto)
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json_str = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("JSON serialization failed: {}", e), None)
    })?;

    Ok(CallToolResult::success(vec![Content::text(json_str)]))
}

#[tool_handler]
impl ServerHandler for ContractScanMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "contractscan MCP finds WCF contracts in C# solutions.\n\n\
                 Available tools:\n\
                 1. get_config - Get the configuration applying to a directory\n\
                 2. scan_contracts - List [ServiceContract] and [DataContract] types of a .sln or .csproj (paginated)\n\n\
                 Each contract is reported once per scan, even when it is declared as a partial type\n\
                 across several files. Use the kind parameter to list only one kind of contract."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Entry point for MCP server
pub fn run_server() -> Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let service = ContractScanMcpServer::new();
            let server = service.serve(rmcp::transport::stdio()).await?;
            server.waiting().await?;
            Ok(())
        })
}
