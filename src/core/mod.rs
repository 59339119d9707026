//! Contract discovery engine.
//!
//! ## Module Structure
//!
//! - `attribute`: Recognized attribute identities and the dual-path matcher
//! - `model`: Type/member declaration views and scan results
//! - `classify`: Contract classification of a type declaration
//! - `members`: Data member collection for data contracts
//! - `pipeline`: Streaming, deduplicating scan over a workspace
//! - `error`: Scan failure type

pub mod attribute;
pub mod classify;
pub mod error;
pub mod members;
pub mod model;
pub mod pipeline;

pub use attribute::{
    ATTRIBUTE_SUFFIX, AttributeIdentity, AttributeUsage, DATA_CONTRACT, DATA_MEMBER,
    SERVICE_CONTRACT, matches,
};
pub use classify::{Classification, classify};
pub use error::ScanError;
pub use members::collect_members;
pub use model::{ContractKind, MemberDeclaration, MemberKind, ScanResult, TypeDeclaration};
pub use pipeline::{
    LogCallback, ResultCallback, ScanOptions, ScanSummary, UnitFailurePolicy, scan,
    scan_workspace,
};
