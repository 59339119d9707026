use contractscan::mcp::{ContractScanMcpServer, types::GetConfigParams};
use rmcp::handler::server::wrapper::Parameters;
use serde_json::json;

use crate::{McpTestFixture, extract_tool_result_json};

#[tokio::test]
async fn test_get_config_defaults() {
    let fixture = McpTestFixture::new().unwrap();
    let server = ContractScanMcpServer::new();

    let params = Parameters(GetConfigParams {
        project_root_path: fixture.root(),
    });

    let result = server.get_config(params).await.unwrap();
    let json_result = extract_tool_result_json(&result);

    assert_eq!(json_result["fromFile"], false);
    assert_eq!(json_result["config"]["onUnitFailure"], "abort");
    assert_eq!(json_result["config"]["output"], "contracts.jsonl");
    assert_eq!(json_result["config"]["dataMembersOutput"], "data-members.jsonl");
    assert_eq!(json_result["config"]["includeGenerated"], false);
    assert!(json_result["config"]["ignores"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_config_from_file() {
    let fixture = McpTestFixture::new().unwrap();
    fixture
        .write_config(&json!({
            "ignores": ["**/Migrations/**"],
            "onUnitFailure": "skip"
        }))
        .unwrap();

    let server = ContractScanMcpServer::new();
    let params = Parameters(GetConfigParams {
        project_root_path: fixture.root_path().join("Shop").to_string_lossy().to_string(),
    });

    let result = server.get_config(params).await.unwrap();
    let json_result = extract_tool_result_json(&result);

    assert_eq!(json_result["fromFile"], true);
    assert_eq!(json_result["config"]["ignores"], json!(["**/Migrations/**"]));
    assert_eq!(json_result["config"]["onUnitFailure"], "skip");
}

#[tokio::test]
async fn test_get_config_invalid_file() {
    let fixture = McpTestFixture::new().unwrap();
    fixture
        .write_config(&json!({ "ignores": ["[unclosed"] }))
        .unwrap();

    let server = ContractScanMcpServer::new();
    let params = Parameters(GetConfigParams {
        project_root_path: fixture.root(),
    });

    let result = server.get_config(params).await;
    assert!(result.is_err());
}
