use anyhow::{Context, Result};
use serde_json::Value;

use crate::CliTest;

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    assert_eq!(parsed["ignores"], Value::Array(Vec::new()));
    assert_eq!(parsed["includeGenerated"], false);
    assert_eq!(parsed["onUnitFailure"], "abort");
    assert_eq!(parsed["output"], "contracts.jsonl");
    assert_eq!(parsed["dataMembersOutput"], "data-members.jsonl");

    assert!(
        content.contains("  "),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Created .contractscanrc.json"));

    assert!(test.root().join(".contractscanrc.json").exists());
    let content = test.read_file(".contractscanrc.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file(".contractscanrc.json", "{}")?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));
    assert_eq!(test.read_file(".contractscanrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;

    test.command().arg("init").output()?;
    test.write_file(
        "Shop/Shop.csproj",
        r#"<Project Sdk="Microsoft.NET.Sdk"></Project>"#,
    )?;
    test.write_file("Shop/Plain.cs", "namespace Shop { class Plain { } }")?;

    let output = test.scan_command("Shop/Shop.csproj").output()?;
    assert!(
        output.status.success(),
        "Scan should work with initialized config. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    Ok(())
}
