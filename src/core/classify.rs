//! Contract classification of a type declaration.

use super::attribute::{AttributeIdentity, DATA_CONTRACT, SERVICE_CONTRACT, matches};
use super::model::{ContractKind, TypeDeclaration};

/// Identities tested on every attribute usage, in priority order.
const CONTRACT_IDENTITIES: [(ContractKind, AttributeIdentity); 2] = [
    (ContractKind::ServiceContract, SERVICE_CONTRACT),
    (ContractKind::DataContract, DATA_CONTRACT),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: ContractKind,
    /// Index of the attribute usage that decided the kind.
    pub attribute_index: usize,
}

/// Classify a type by the first attribute usage matching a contract identity.
///
/// Service is tested before Data on each usage; usages after the first match
/// are not inspected.
pub fn classify(declaration: &TypeDeclaration) -> Option<Classification> {
    declaration
        .attributes
        .iter()
        .enumerate()
        .find_map(|(attribute_index, usage)| {
            CONTRACT_IDENTITIES
                .iter()
                .find(|(_, identity)| matches(usage, identity))
                .map(|(kind, _)| Classification {
                    kind: *kind,
                    attribute_index,
                })
        })
}
