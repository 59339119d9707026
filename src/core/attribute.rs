//! Attribute identities and the dual-path attribute matcher.
//!
//! An attribute usage is matched against a recognized identity in two steps:
//!
//! 1. **Semantic**: when the usage was bound to a symbol, its fully qualified
//!    name is compared ordinally with the identity. This is authoritative.
//! 2. **Syntactic**: when binding failed (e.g. the assembly defining the
//!    attribute is not referenced), the literal name written at the usage site
//!    is compared against the identity's short name, with or without the
//!    `Attribute` suffix and with or without a qualifier.

/// Canonical identity of a recognized attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeIdentity {
    /// `global::`-rooted dotted name, e.g. `global::System.ServiceModel.ServiceContractAttribute`.
    pub fully_qualified_name: &'static str,
    /// Name without namespace and without the `Attribute` suffix, e.g. `ServiceContract`.
    pub short_name: &'static str,
}

pub const SERVICE_CONTRACT: AttributeIdentity = AttributeIdentity {
    fully_qualified_name: "global::System.ServiceModel.ServiceContractAttribute",
    short_name: "ServiceContract",
};

pub const DATA_CONTRACT: AttributeIdentity = AttributeIdentity {
    fully_qualified_name: "global::System.Runtime.Serialization.DataContractAttribute",
    short_name: "DataContract",
};

pub const DATA_MEMBER: AttributeIdentity = AttributeIdentity {
    fully_qualified_name: "global::System.Runtime.Serialization.DataMemberAttribute",
    short_name: "DataMember",
};

/// Suffix the C# compiler allows to be omitted at attribute usage sites.
pub const ATTRIBUTE_SUFFIX: &str = "Attribute";

/// One attribute usage as seen by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeUsage {
    /// `global::`-rooted name of the bound attribute class, if binding succeeded.
    pub resolved_name: Option<String>,
    /// Name as written at the usage site (whitespace removed).
    pub syntactic_name: String,
}

impl AttributeUsage {
    pub fn resolved(resolved_name: impl Into<String>, syntactic_name: impl Into<String>) -> Self {
        Self {
            resolved_name: Some(resolved_name.into()),
            syntactic_name: syntactic_name.into(),
        }
    }

    pub fn unresolved(syntactic_name: impl Into<String>) -> Self {
        Self {
            resolved_name: None,
            syntactic_name: syntactic_name.into(),
        }
    }
}

/// Decide whether `usage` denotes the attribute described by `identity`.
///
/// A usage bound to a different attribute class does not match, even if its
/// spelling would pass the syntactic comparison.
pub fn matches(usage: &AttributeUsage, identity: &AttributeIdentity) -> bool {
    match usage.resolved_name.as_deref() {
        Some(resolved) => resolved == identity.fully_qualified_name,
        None => matches_syntactically(&usage.syntactic_name, identity.short_name),
    }
}

/// Syntactic fallback: `Short`, `ShortAttribute`, `*.Short`, `*.ShortAttribute`.
fn matches_syntactically(written: &str, short: &str) -> bool {
    let Some(rest) = written.strip_suffix(short).or_else(|| {
        written
            .strip_suffix(ATTRIBUTE_SUFFIX)
            .and_then(|w| w.strip_suffix(short))
    }) else {
        return false;
    };

    rest.is_empty() || rest.ends_with('.')
}
