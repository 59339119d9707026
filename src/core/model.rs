//! Read-only views handed to the engine and the results it produces.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::attribute::AttributeUsage;

/// Kind of contract a type was recognized as.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum ContractKind {
    ServiceContract,
    DataContract,
}

impl ContractKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractKind::ServiceContract => "ServiceContract",
            ContractKind::DataContract => "DataContract",
        }
    }
}

impl std::fmt::Display for ContractKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Property,
    Event,
    Method,
}

/// A field, property, event or method of a type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDeclaration {
    pub name: String,
    pub kind: MemberKind,
    pub attributes: Vec<AttributeUsage>,
}

impl MemberDeclaration {
    pub fn new(name: impl Into<String>, kind: MemberKind, attributes: Vec<AttributeUsage>) -> Self {
        Self {
            name: name.into(),
            kind,
            attributes,
        }
    }
}

/// One class, struct, interface, record or enum declaration node.
///
/// For partial types bound to a symbol, `attributes` and `members` cover all
/// parts of the symbol, not only the syntax of this node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    /// Metadata name of the declared symbol, `None` when binding failed.
    pub declared_symbol: Option<String>,
    /// Fully qualified, generics-aware display name (e.g. `Shop.Repository<T>.Entry`).
    pub qualified_name: String,
    pub attributes: Vec<AttributeUsage>,
    pub members: Vec<MemberDeclaration>,
}

/// One discovered contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScanResult {
    #[serde(rename = "type")]
    pub kind: ContractKind,
    #[serde(rename = "name")]
    pub qualified_name: String,
    /// Present only for data contracts with at least one data member.
    #[serde(
        rename = "dataMembers",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub data_members: Option<Vec<String>>,
}
