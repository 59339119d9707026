//! Per-project semantic view: which attribute classes exist and what an
//! attribute name written at a usage site binds to.
//!
//! Resolution follows the C# lookup rules closely enough for attribute names:
//! enclosing types and namespaces are searched innermost first, each namespace
//! level consulting its using aliases and using namespaces before moving out.
//! Both `N` and `NAttribute` are tried. Ambiguity leaves a usage unresolved.

use std::collections::{HashMap, HashSet};

use super::syntax::{ScopeFrame, SourceSyntax, TypeSegment, TypeSyntax, UsingDirective};
use crate::core::{ATTRIBUTE_SUFFIX, AttributeUsage, MemberDeclaration, TypeDeclaration};

const GLOBAL_PREFIX: &str = "global::";

/// Attribute classes every compilation sees (mscorlib / System.Runtime).
const CORE_TYPES: &[&str] = &[
    "System.AttributeUsageAttribute",
    "System.FlagsAttribute",
    "System.NonSerializedAttribute",
    "System.ObsoleteAttribute",
    "System.SerializableAttribute",
];

const SERVICE_MODEL_TYPES: &[&str] = &[
    "System.ServiceModel.FaultContractAttribute",
    "System.ServiceModel.MessageContractAttribute",
    "System.ServiceModel.OperationContractAttribute",
    "System.ServiceModel.ServiceBehaviorAttribute",
    "System.ServiceModel.ServiceContractAttribute",
    "System.ServiceModel.ServiceKnownTypeAttribute",
];

const SERIALIZATION_TYPES: &[&str] = &[
    "System.Runtime.Serialization.CollectionDataContractAttribute",
    "System.Runtime.Serialization.DataContractAttribute",
    "System.Runtime.Serialization.DataMemberAttribute",
    "System.Runtime.Serialization.EnumMemberAttribute",
    "System.Runtime.Serialization.IgnoreDataMemberAttribute",
    "System.Runtime.Serialization.KnownTypeAttribute",
];

/// Framework assemblies a project can see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameworkReferences {
    pub service_model: bool,
    pub serialization: bool,
}

/// Dotted names (no type parameters) of every type visible to a project.
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    types: HashSet<String>,
}

impl SymbolIndex {
    pub fn new(framework: FrameworkReferences) -> Self {
        let mut index = Self::default();
        index.extend(CORE_TYPES);
        if framework.service_model {
            index.extend(SERVICE_MODEL_TYPES);
        }
        if framework.serialization {
            index.extend(SERIALIZATION_TYPES);
        }
        index
    }

    fn extend(&mut self, names: &[&str]) {
        self.types.extend(names.iter().map(|name| name.to_string()));
    }

    /// Add the types declared in one source file.
    pub fn add_source(&mut self, syntax: &SourceSyntax) {
        self.types.extend(
            syntax
                .types
                .iter()
                .filter(|ty| !ty.in_error)
                .map(TypeSyntax::lookup_name),
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains(name)
    }
}

/// Identity of a (possibly partial) type symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SymbolKey {
    namespace: Vec<String>,
    containing: Vec<(String, usize)>,
    name: String,
    arity: usize,
}

impl SymbolKey {
    fn of(ty: &TypeSyntax) -> Self {
        Self {
            namespace: ty.namespace.clone(),
            containing: ty
                .containing_types
                .iter()
                .map(|segment| (segment.name.clone(), segment.arity()))
                .collect(),
            name: ty.segment.name.clone(),
            arity: ty.segment.arity(),
        }
    }

    /// Metadata name, e.g. ``Shop.Repository`1+Entry``.
    fn metadata_name(&self) -> String {
        let mut types: Vec<String> = self
            .containing
            .iter()
            .map(|(name, arity)| metadata_segment(name, *arity))
            .collect();
        types.push(metadata_segment(&self.name, self.arity));
        let nested = types.join("+");
        if self.namespace.is_empty() {
            nested
        } else {
            format!("{}.{}", self.namespace.join("."), nested)
        }
    }
}

fn metadata_segment(name: &str, arity: usize) -> String {
    if arity == 0 {
        name.to_string()
    } else {
        format!("{}`{}", name, arity)
    }
}

/// Binds attribute names for the documents of one project.
pub struct Binder<'a> {
    index: &'a SymbolIndex,
    global_usings: &'a [UsingDirective],
}

/// A lookup level: where to search for type names and which usings apply.
struct LookupFrame<'a> {
    path: Vec<String>,
    usings: Vec<&'a UsingDirective>,
}

impl<'a> Binder<'a> {
    pub fn new(index: &'a SymbolIndex, global_usings: &'a [UsingDirective]) -> Self {
        Self {
            index,
            global_usings,
        }
    }

    /// Bind every document of a project and merge partial type parts.
    ///
    /// Returns one declaration list per input document, in input order.
    pub fn bind_project(&self, documents: &[&SourceSyntax]) -> Vec<Vec<TypeDeclaration>> {
        let mut merged: HashMap<SymbolKey, (Vec<AttributeUsage>, Vec<MemberDeclaration>)> =
            HashMap::new();
        let mut bound: Vec<Vec<(Option<SymbolKey>, TypeDeclaration)>> = Vec::new();

        for syntax in documents {
            let mut declarations = Vec::new();
            for ty in &syntax.types {
                let declaration = self.bind_type(ty);
                let key = (!ty.in_error).then(|| SymbolKey::of(ty));
                if let Some(key) = &key {
                    let parts = merged.entry(key.clone()).or_default();
                    parts.0.extend(declaration.attributes.iter().cloned());
                    parts.1.extend(declaration.members.iter().cloned());
                }
                declarations.push((key, declaration));
            }
            bound.push(declarations);
        }

        bound
            .into_iter()
            .map(|declarations| {
                declarations
                    .into_iter()
                    .map(|(key, mut declaration)| {
                        if let Some((attributes, members)) =
                            key.as_ref().and_then(|k| merged.get(k))
                        {
                            declaration.attributes = attributes.clone();
                            declaration.members = members.clone();
                        }
                        declaration
                    })
                    .collect()
            })
            .collect()
    }

    /// Bind one declaration in isolation (no partial merge).
    pub fn bind_type(&self, ty: &TypeSyntax) -> TypeDeclaration {
        let type_frames = self.frames(ty, false);
        let member_frames = self.frames(ty, true);

        TypeDeclaration {
            declared_symbol: (!ty.in_error).then(|| SymbolKey::of(ty).metadata_name()),
            qualified_name: ty.display_name(),
            attributes: ty
                .attributes
                .iter()
                .map(|written| self.bind_usage(ty, written, &type_frames))
                .collect(),
            members: ty
                .members
                .iter()
                .map(|member| {
                    MemberDeclaration::new(
                        member.name.clone(),
                        member.kind,
                        member
                            .attributes
                            .iter()
                            .map(|written| self.bind_usage(ty, written, &member_frames))
                            .collect(),
                    )
                })
                .collect(),
        }
    }

    fn bind_usage(
        &self,
        ty: &TypeSyntax,
        written: &str,
        frames: &[LookupFrame<'_>],
    ) -> AttributeUsage {
        // Declarations the parser could not place have no symbol to bind against.
        let resolved_name = if ty.in_error {
            None
        } else {
            self.resolve(written, frames)
        };
        AttributeUsage {
            resolved_name,
            syntactic_name: written.to_string(),
        }
    }

    /// Lookup levels for a declaration, innermost first.
    ///
    /// Attributes on a type are bound in the scope containing it; attributes
    /// on its members also see the type's own nested types.
    fn frames<'s>(&'s self, ty: &'s TypeSyntax, include_self: bool) -> Vec<LookupFrame<'s>> {
        let mut types: Vec<&TypeSegment> = ty.containing_types.iter().collect();
        if include_self {
            types.push(&ty.segment);
        }

        let mut frames = Vec::new();
        for depth in (1..=types.len()).rev() {
            let mut path = ty.namespace.clone();
            path.extend(types[..depth].iter().map(|segment| segment.name.clone()));
            frames.push(LookupFrame {
                path,
                usings: Vec::new(),
            });
        }

        for (level, scope) in ty.scopes.iter().enumerate().rev() {
            frames.push(self.scope_frame(scope, level == 0));
        }
        if ty.scopes.is_empty() {
            frames.push(LookupFrame {
                path: Vec::new(),
                usings: self.global_usings.iter().collect(),
            });
        }
        frames
    }

    fn scope_frame<'s>(&'s self, scope: &'s ScopeFrame, with_globals: bool) -> LookupFrame<'s> {
        let mut usings: Vec<&UsingDirective> = scope.usings.iter().collect();
        if with_globals {
            usings.extend(self.global_usings.iter());
        }
        LookupFrame {
            path: scope.namespace.clone(),
            usings,
        }
    }

    /// Resolve a written attribute name to a `global::`-rooted class name.
    fn resolve(&self, written: &str, frames: &[LookupFrame<'_>]) -> Option<String> {
        let written = strip_type_arguments(written);

        if let Some(absolute) = written.strip_prefix(GLOBAL_PREFIX) {
            return pick_single(self.candidates(&[], absolute)).map(rooted);
        }

        if let Some((alias, rest)) = written.split_once("::") {
            let target = frames
                .iter()
                .find_map(|frame| find_alias(&frame.usings, alias))?;
            let target = target.trim_start_matches(GLOBAL_PREFIX);
            return pick_single(self.candidates(&[target.to_string()], rest)).map(rooted);
        }

        match written.split_once('.') {
            None => self.resolve_simple(written, frames),
            Some((first, rest)) => self.resolve_qualified(first, rest, frames),
        }
    }

    fn resolve_simple(&self, name: &str, frames: &[LookupFrame<'_>]) -> Option<String> {
        for frame in frames {
            let found = self.candidates(&frame.path, name);
            if !found.is_empty() {
                return pick_single(found).map(rooted);
            }

            let mut found = Vec::new();
            for candidate in attribute_spellings(name) {
                if let Some(target) = find_alias(&frame.usings, &candidate) {
                    let target = target.trim_start_matches(GLOBAL_PREFIX);
                    if self.index.contains(target) {
                        found.push(target.to_string());
                    }
                }
            }
            for using in &frame.usings {
                if let UsingDirective::Namespace(namespace) = using {
                    let namespace = namespace.trim_start_matches(GLOBAL_PREFIX);
                    found.extend(self.candidates(&[namespace.to_string()], name));
                }
            }
            if !found.is_empty() {
                return pick_single(found).map(rooted);
            }
        }
        None
    }

    fn resolve_qualified(
        &self,
        first: &str,
        rest: &str,
        frames: &[LookupFrame<'_>],
    ) -> Option<String> {
        for frame in frames {
            if let Some(target) = find_alias(&frame.usings, first) {
                let target = target.trim_start_matches(GLOBAL_PREFIX);
                return pick_single(self.candidates(&[target.to_string()], rest)).map(rooted);
            }

            let mut prefix = frame.path.clone();
            prefix.push(first.to_string());
            let found = self.candidates(&prefix, rest);
            if !found.is_empty() {
                return pick_single(found).map(rooted);
            }
        }
        None
    }

    /// Existing types named `prefix.name` or `prefix.nameAttribute`.
    fn candidates(&self, prefix: &[String], name: &str) -> Vec<String> {
        attribute_spellings(name)
            .into_iter()
            .map(|spelling| {
                if prefix.is_empty() {
                    spelling
                } else {
                    format!("{}.{}", prefix.join("."), spelling)
                }
            })
            .filter(|full| self.index.contains(full))
            .collect()
    }
}

/// A single distinct candidate, or nothing when ambiguous.
fn pick_single(mut found: Vec<String>) -> Option<String> {
    found.sort();
    found.dedup();
    match found.as_slice() {
        [single] => Some(single.clone()),
        _ => None,
    }
}

/// `NAttribute` first, then `N`, for the last segment of a dotted name.
fn attribute_spellings(name: &str) -> Vec<String> {
    vec![format!("{}{}", name, ATTRIBUTE_SUFFIX), name.to_string()]
}

fn find_alias<'u>(usings: &[&'u UsingDirective], name: &str) -> Option<&'u str> {
    usings.iter().find_map(|using| match using {
        UsingDirective::Alias { alias, target } if alias == name => Some(target.as_str()),
        _ => None,
    })
}

fn strip_type_arguments(written: &str) -> &str {
    written.split('<').next().unwrap_or(written)
}

fn rooted(name: String) -> String {
    format!("{}{}", GLOBAL_PREFIX, name)
}
