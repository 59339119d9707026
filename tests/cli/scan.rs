use anyhow::Result;
use insta::assert_snapshot;
use pretty_assertions::assert_eq;

use crate::CliTest;

const SDK_PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <ItemGroup>
    <PackageReference Include="System.ServiceModel.Primitives" Version="6.0.0" />
  </ItemGroup>
</Project>
"#;

const ORDER: &str = r#"using System.ServiceModel;

namespace Shop
{
    [ServiceContract]
    public interface Order
    {
        [OperationContract]
        void Submit();
    }
}
"#;

const CUSTOMER: &str = r#"using System.Runtime.Serialization;

namespace Shop
{
    [DataContract]
    public class Customer
    {
        [DataMember]
        public int Id { get; set; }

        [DataMember]
        public string Name { get; set; }

        public string Cache;
    }
}
"#;

fn shop() -> Result<CliTest> {
    let test = CliTest::with_file("Shop/Shop.csproj", SDK_PROJECT)?;
    test.write_file("Shop/Order.cs", ORDER)?;
    Ok(test)
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_scan_single_service_contract() -> Result<()> {
    let test = shop()?;

    let output = test.scan_command("Shop/Shop.csproj").output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    assert_snapshot!(test.read_file("contracts.jsonl")?, @r#"{"type":"ServiceContract","name":"Shop.Order"}"#);
    assert_eq!(test.read_file("data-members.jsonl")?, "");
    assert!(stderr(&output).contains("Found 1 contract (1 service, 0 data) in 1 project"));

    Ok(())
}

#[test]
fn test_scan_data_contract_members() -> Result<()> {
    let test = shop()?;
    test.write_file("Shop/Customer.cs", CUSTOMER)?;

    let output = test.scan_command("Shop/Shop.csproj").output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    assert_snapshot!(test.read_file("contracts.jsonl")?, @r#"
    {"type":"DataContract","name":"Shop.Customer","dataMembers":["Id","Name"]}
    {"type":"ServiceContract","name":"Shop.Order"}
    "#);
    assert_snapshot!(test.read_file("data-members.jsonl")?, @r#"{"type":"DataContract","name":"Shop.Customer","dataMembers":["Id","Name"]}"#);

    Ok(())
}

#[test]
fn test_scan_solution_reports_partial_type_once() -> Result<()> {
    let test = CliTest::with_file(
        "Shop.sln",
        r#"
Microsoft Visual Studio Solution File, Format Version 12.00
Project("{9A19103F-16F7-4668-BE54-9A1E7A4F7556}") = "Shop.Billing", "Billing\Shop.Billing.csproj", "{00000000-0000-0000-0000-000000000001}"
EndProject
Project("{9A19103F-16F7-4668-BE54-9A1E7A4F7556}") = "Shop.Api", "Api\Shop.Api.csproj", "{00000000-0000-0000-0000-000000000002}"
EndProject
"#,
    )?;
    test.write_file("Billing/Shop.Billing.csproj", SDK_PROJECT)?;
    test.write_file(
        "Billing/Invoice.cs",
        r#"using System.Runtime.Serialization;
namespace Shop.Billing
{
    [DataContract]
    public partial class Invoice
    {
        [DataMember] public decimal Total { get; set; }
    }
}
"#,
    )?;
    test.write_file(
        "Billing/InvoiceLines.cs",
        r#"using System.Runtime.Serialization;
namespace Shop.Billing
{
    public partial class Invoice
    {
        [DataMember(Order = 2)] public string[] Lines { get; set; }
    }
}
"#,
    )?;
    test.write_file(
        "Api/Shop.Api.csproj",
        r#"<Project Sdk="Microsoft.NET.Sdk">
  <ItemGroup>
    <ProjectReference Include="..\Billing\Shop.Billing.csproj" />
  </ItemGroup>
</Project>
"#,
    )?;
    test.write_file(
        "Api/Billing.cs",
        r#"using System.ServiceModel;
using Shop.Billing;
namespace Shop.Api
{
    [ServiceContract(Namespace = "urn:billing")]
    public interface IBillingService
    {
        [OperationContract] Invoice Get(int id);
    }
}
"#,
    )?;

    let output = test.scan_command("Shop.sln").output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    assert_snapshot!(test.read_file("contracts.jsonl")?, @r#"
    {"type":"DataContract","name":"Shop.Billing.Invoice","dataMembers":["Total","Lines"]}
    {"type":"ServiceContract","name":"Shop.Api.IBillingService"}
    "#);

    Ok(())
}

#[test]
fn test_scan_unresolved_attributes_fall_back_to_names() -> Result<()> {
    // Legacy project without framework references: nothing binds
    let test = CliTest::with_file(
        "Legacy/Legacy.csproj",
        r#"<Project ToolsVersion="15.0">
  <ItemGroup>
    <Compile Include="Dtos.cs" />
  </ItemGroup>
</Project>
"#,
    )?;
    test.write_file(
        "Legacy/Dtos.cs",
        r#"namespace Legacy
{
    [DataContract] public class A { }
    [DataContractAttribute] public class B { }
    [Contracts.DataContract] public class C { }
    [Contracts.DataContractAttribute] public class D { }
    [DataContractX] public class E { }
    [Serializable] public class F { }
}
"#,
    )?;

    let output = test.scan_command("Legacy/Legacy.csproj").output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    assert_snapshot!(test.read_file("contracts.jsonl")?, @r#"
    {"type":"DataContract","name":"Legacy.A"}
    {"type":"DataContract","name":"Legacy.B"}
    {"type":"DataContract","name":"Legacy.C"}
    {"type":"DataContract","name":"Legacy.D"}
    "#);

    Ok(())
}

#[test]
fn test_scan_to_stdout() -> Result<()> {
    let test = shop()?;
    test.write_file("Shop/Customer.cs", CUSTOMER)?;

    let output = test.scan_command("Shop/Shop.csproj").arg("--stdout").output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 2);
    assert!(stdout.contains(r#""name":"Shop.Order""#));
    assert!(!test.root().join("contracts.jsonl").exists());
    assert!(!test.root().join("data-members.jsonl").exists());

    Ok(())
}

#[test]
fn test_scan_output_paths() -> Result<()> {
    let test = shop()?;

    let output = test
        .scan_command("Shop/Shop.csproj")
        .args(["-o", "out/all.jsonl"])
        .args(["--data-members-output", "out/members.jsonl"])
        .output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    assert_eq!(test.read_file("out/all.jsonl")?.lines().count(), 1);
    assert!(test.root().join("out/members.jsonl").exists());

    Ok(())
}

#[test]
fn test_scan_output_paths_from_config() -> Result<()> {
    let test = shop()?;
    test.write_file(
        ".contractscanrc.json",
        r#"{ "output": "reports/contracts.jsonl", "dataMembersOutput": "reports/dm.jsonl" }"#,
    )?;

    let output = test.scan_command("Shop/Shop.csproj").output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    assert_eq!(test.read_file("reports/contracts.jsonl")?.lines().count(), 1);
    assert!(test.root().join("reports/dm.jsonl").exists());

    Ok(())
}

#[test]
fn test_scan_skips_generated_documents_by_default() -> Result<()> {
    let test = shop()?;
    test.write_file(
        "Shop/Reference.g.cs",
        "namespace Shop.Proxy { [System.ServiceModel.ServiceContract] public interface IRemote { } }",
    )?;

    test.scan_command("Shop/Shop.csproj").output()?;
    assert_eq!(test.read_file("contracts.jsonl")?.lines().count(), 1);

    let output = test
        .scan_command("Shop/Shop.csproj")
        .arg("--include-generated")
        .output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(test.read_file("contracts.jsonl")?.contains("Shop.Proxy.IRemote"));

    Ok(())
}

#[test]
fn test_scan_partial_with_attribute_in_generated_part() -> Result<()> {
    let test = shop()?;
    test.write_file(
        "Shop/Customer.cs",
        r#"using System.Runtime.Serialization;

namespace Shop
{
    public partial class Customer
    {
        [DataMember]
        public int Id { get; set; }
    }
}
"#,
    )?;
    test.write_file(
        "Shop/Customer.g.cs",
        r#"using System.Runtime.Serialization;

namespace Shop
{
    [DataContract]
    public partial class Customer
    {
        [DataMember]
        public string Name { get; set; }
    }
}
"#,
    )?;

    let output = test.scan_command("Shop/Shop.csproj").output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    assert_snapshot!(test.read_file("contracts.jsonl")?, @r#"
    {"type":"DataContract","name":"Shop.Customer","dataMembers":["Id","Name"]}
    {"type":"ServiceContract","name":"Shop.Order"}
    "#);

    Ok(())
}

#[test]
fn test_scan_ignores_from_config() -> Result<()> {
    let test = shop()?;
    test.write_file("Shop/Legacy/Customer.cs", CUSTOMER)?;
    test.write_file(".contractscanrc.json", r#"{ "ignores": ["Legacy/**"] }"#)?;

    let output = test.scan_command("Shop/Shop.csproj").output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    assert_snapshot!(test.read_file("contracts.jsonl")?, @r#"{"type":"ServiceContract","name":"Shop.Order"}"#);

    Ok(())
}

// ============================================================
// Unit failures
// ============================================================

fn project_with_missing_document() -> Result<CliTest> {
    let test = CliTest::with_file(
        "Legacy/Legacy.csproj",
        r#"<Project>
  <ItemGroup>
    <Compile Include="Gone.cs" />
    <Compile Include="Order.cs" />
  </ItemGroup>
</Project>
"#,
    )?;
    test.write_file("Legacy/Order.cs", "namespace Legacy { [ServiceContract] interface Order { } }")?;
    Ok(test)
}

#[test]
fn test_scan_aborts_on_unreadable_document() -> Result<()> {
    let test = project_with_missing_document()?;

    let output = test.scan_command("Legacy/Legacy.csproj").output()?;
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("Gone.cs"));
    assert_eq!(test.read_file("contracts.jsonl")?, "");

    Ok(())
}

#[test]
fn test_scan_skip_policy_continues() -> Result<()> {
    let test = project_with_missing_document()?;

    let output = test
        .scan_command("Legacy/Legacy.csproj")
        .args(["--on-unit-failure", "skip"])
        .output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let stderr = stderr(&output);
    assert!(stderr.contains("warning: skipping"));
    assert!(stderr.contains("1 document could not be loaded and was skipped"));
    assert_snapshot!(test.read_file("contracts.jsonl")?, @r#"{"type":"ServiceContract","name":"Legacy.Order"}"#);

    Ok(())
}

// ============================================================
// Exit codes
// ============================================================

#[test]
fn test_missing_input_exits_2() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.scan_command("Nope.sln").output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("input not found"));

    Ok(())
}

#[test]
fn test_unrecognized_input_exits_3() -> Result<()> {
    let test = CliTest::with_file("notes.txt", "hello")?;

    let output = test.scan_command("notes.txt").output()?;
    assert_eq!(output.status.code(), Some(3));

    Ok(())
}

#[test]
fn test_missing_listed_project_exits_3() -> Result<()> {
    let test = CliTest::with_file(
        "Shop.sln",
        r#"Project("{9A19103F-16F7-4668-BE54-9A1E7A4F7556}") = "Shop", "Shop\Shop.csproj", "{00000000-0000-0000-0000-000000000001}"
EndProject
"#,
    )?;

    let output = test.scan_command("Shop.sln").output()?;
    assert_eq!(output.status.code(), Some(3));

    Ok(())
}

#[test]
fn test_usage_errors_exit_1() -> Result<()> {
    let test = CliTest::new()?;

    assert_eq!(test.command().output()?.status.code(), Some(1));
    assert_eq!(test.command().arg("scan").output()?.status.code(), Some(1));
    assert_eq!(
        test.command()
            .args(["scan", "x.sln", "--on-unit-failure", "retry"])
            .output()?
            .status
            .code(),
        Some(1)
    );

    Ok(())
}

#[test]
fn test_help_and_version_exit_0() -> Result<()> {
    let test = CliTest::new()?;

    let help = test.command().arg("--help").output()?;
    assert_eq!(help.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&help.stdout).contains("scan"));

    assert_eq!(test.command().arg("--version").output()?.status.code(), Some(0));

    Ok(())
}
