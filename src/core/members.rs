//! Data member collection for data contract types.

use super::attribute::{DATA_MEMBER, matches};
use super::model::{MemberKind, TypeDeclaration};

/// Collect the names of fields and properties marked as data members.
///
/// Names are returned in member declaration order. A member contributes at
/// most one name. Returns `None` when nothing matched, never an empty list.
pub fn collect_members(declaration: &TypeDeclaration) -> Option<Vec<String>> {
    let members: Vec<String> = declaration
        .members
        .iter()
        .filter(|member| matches!(member.kind, MemberKind::Field | MemberKind::Property))
        .filter(|member| {
            member
                .attributes
                .iter()
                .any(|usage| matches(usage, &DATA_MEMBER))
        })
        .map(|member| member.name.clone())
        .collect();

    (!members.is_empty()).then_some(members)
}
