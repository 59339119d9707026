//! C# syntax extraction.
//!
//! Turns a tree-sitter parse tree into plain declaration data: type
//! declarations with their namespace, using scopes, attributes and members.
//! Nothing here binds names; see [`super::semantic`].

use anyhow::{Context, Result};
use tree_sitter::{Node, Parser};

use crate::core::MemberKind;

const TYPE_DECLARATION_KINDS: &[&str] = &[
    "class_declaration",
    "struct_declaration",
    "interface_declaration",
    "record_declaration",
    "record_struct_declaration",
    "enum_declaration",
];

/// A `using` directive that brings names into scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsingDirective {
    /// `using System.ServiceModel;`
    Namespace(String),
    /// `using WCF = System.ServiceModel;`
    Alias { alias: String, target: String },
}

/// One level of namespace nesting and the usings declared at that level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeFrame {
    /// Namespace segments from the global namespace down to this level.
    pub namespace: Vec<String>,
    pub usings: Vec<UsingDirective>,
}

/// Name and type parameters of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSegment {
    pub name: String,
    pub type_parameters: Vec<String>,
}

impl TypeSegment {
    pub fn arity(&self) -> usize {
        self.type_parameters.len()
    }

    /// `Name` or `Name<T, U>`, keywords escaped with `@`.
    pub fn display(&self) -> String {
        let name = escape_keyword(&self.name);
        if self.type_parameters.is_empty() {
            name
        } else {
            let parameters: Vec<String> = self
                .type_parameters
                .iter()
                .map(|parameter| escape_keyword(parameter))
                .collect();
            format!("{}<{}>", name, parameters.join(", "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSyntax {
    pub name: String,
    pub kind: MemberKind,
    /// Attribute names as written, whitespace removed.
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSyntax {
    pub namespace: Vec<String>,
    /// Enclosing types, outermost first.
    pub containing_types: Vec<TypeSegment>,
    pub segment: TypeSegment,
    /// Declared inside a region the parser could not make sense of.
    pub in_error: bool,
    /// Using scopes from the compilation unit (first) to the innermost namespace.
    pub scopes: Vec<ScopeFrame>,
    pub attributes: Vec<String>,
    pub members: Vec<MemberSyntax>,
}

impl TypeSyntax {
    /// `Namespace.Outer<T>.Inner`
    pub fn display_name(&self) -> String {
        self.namespace
            .iter()
            .cloned()
            .chain(self.containing_types.iter().map(TypeSegment::display))
            .chain(std::iter::once(self.segment.display()))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Dotted name without type parameters, used for name lookup.
    pub fn lookup_name(&self) -> String {
        self.namespace
            .iter()
            .chain(self.containing_types.iter().map(|segment| &segment.name))
            .chain(std::iter::once(&self.segment.name))
            .cloned()
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Declarations of one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSyntax {
    /// `global using` directives; they apply to the whole project.
    pub global_usings: Vec<UsingDirective>,
    /// Type declarations in pre-order.
    pub types: Vec<TypeSyntax>,
}

pub struct SyntaxParser {
    parser: Parser,
}

impl SyntaxParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .context("Failed to load the C# grammar")?;
        Ok(Self { parser })
    }

    pub fn parse(&mut self, source: &str) -> Result<SourceSyntax> {
        let tree = self
            .parser
            .parse(source, None)
            .context("C# parser produced no syntax tree")?;

        let mut extractor = Extractor {
            source,
            output: SourceSyntax::default(),
        };
        let root = tree.root_node();
        let children = named_children(root);
        extractor.walk_container(
            &children,
            &[ScopeFrame::default()],
            &[],
            root.kind() == "ERROR",
        );
        Ok(extractor.output)
    }
}

struct Extractor<'s> {
    source: &'s str,
    output: SourceSyntax,
}

impl<'s> Extractor<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }

    /// Identifier text without the verbatim `@` prefix.
    fn identifier(&self, node: Node<'_>) -> String {
        let text = compact(self.text(node));
        match text.strip_prefix('@') {
            Some(name) => name.to_string(),
            None => text,
        }
    }

    /// Walk the members of a compilation unit, namespace body or ERROR node.
    ///
    /// `frames` ends with the frame that owns `nodes`.
    fn walk_container(
        &mut self,
        nodes: &[Node<'_>],
        frames: &[ScopeFrame],
        containing: &[TypeSegment],
        in_error: bool,
    ) {
        let mut frames = frames.to_vec();
        let scope_end = nodes
            .iter()
            .position(|node| node.kind() == "file_scoped_namespace_declaration")
            .unwrap_or(nodes.len());
        for node in nodes[..scope_end]
            .iter()
            .filter(|node| node.kind() == "using_directive")
        {
            self.add_using(*node, &mut frames);
        }

        for (index, node) in nodes.iter().enumerate() {
            match node.kind() {
                "namespace_declaration" => {
                    let body = node
                        .child_by_field_name("body")
                        .map(named_children)
                        .unwrap_or_default();
                    let inner = self.enter_namespace(*node, &frames);
                    self.walk_container(&body, &inner, containing, in_error);
                }
                "file_scoped_namespace_declaration" => {
                    // Everything after the declaration belongs to it, whether the
                    // grammar nests it or leaves it as siblings.
                    let name = node.child_by_field_name("name");
                    let mut rest: Vec<Node<'_>> = named_children(*node)
                        .into_iter()
                        .filter(|child| Some(*child) != name)
                        .collect();
                    rest.extend(nodes[index + 1..].iter().copied());
                    let inner = self.enter_namespace(*node, &frames);
                    self.walk_container(&rest, &inner, containing, in_error);
                    return;
                }
                "ERROR" => {
                    let children = named_children(*node);
                    self.walk_container(&children, &frames, containing, true);
                }
                kind if TYPE_DECLARATION_KINDS.contains(&kind) => {
                    self.walk_type(*node, &frames, containing, in_error);
                }
                _ => {}
            }
        }
    }

    fn enter_namespace(&self, node: Node<'_>, frames: &[ScopeFrame]) -> Vec<ScopeFrame> {
        let mut frames = frames.to_vec();
        let Some(name) = node.child_by_field_name("name") else {
            return frames;
        };

        let mut namespace = frames.last().map(|f| f.namespace.clone()).unwrap_or_default();
        for part in compact(self.text(name))
            .split('.')
            .map(|part| part.trim_start_matches('@'))
            .filter(|part| !part.is_empty())
        {
            namespace.push(part.to_string());
            frames.push(ScopeFrame {
                namespace: namespace.clone(),
                usings: Vec::new(),
            });
        }
        frames
    }

    fn add_using(&mut self, node: Node<'_>, frames: &mut [ScopeFrame]) {
        let mut is_global = false;
        let mut is_static = false;
        let mut is_alias = false;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "global" => is_global = true,
                "static" => is_static = true,
                "=" => is_alias = true,
                _ => {}
            }
        }
        if is_static {
            return;
        }

        let named = named_children(node);
        let directive = if is_alias {
            let alias = node
                .child_by_field_name("name")
                .or_else(|| named.first().copied());
            let target = named.last().copied();
            match (alias, target) {
                (Some(alias), Some(target)) if alias != target => UsingDirective::Alias {
                    alias: compact(self.text(alias)),
                    target: compact(self.text(target)),
                },
                _ => return,
            }
        } else {
            match named.first() {
                Some(name) => UsingDirective::Namespace(compact(self.text(*name))),
                None => return,
            }
        };

        if is_global {
            self.output.global_usings.push(directive);
        } else if let Some(frame) = frames.last_mut() {
            frame.usings.push(directive);
        }
    }

    fn walk_type(
        &mut self,
        node: Node<'_>,
        frames: &[ScopeFrame],
        containing: &[TypeSegment],
        in_error: bool,
    ) {
        let Some(name) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.identifier(name);
        if name.is_empty() {
            return;
        }

        let segment = TypeSegment {
            name,
            type_parameters: self.type_parameters(node),
        };
        let body = node.child_by_field_name("body").or_else(|| {
            named_children(node).into_iter().find(|child| {
                matches!(
                    child.kind(),
                    "declaration_list" | "enum_member_declaration_list"
                )
            })
        });
        let body_children = body.map(named_children).unwrap_or_default();

        let mut members = self.record_parameters(node);
        for child in &body_children {
            self.collect_member(*child, &mut members);
        }

        self.output.types.push(TypeSyntax {
            namespace: frames.last().map(|f| f.namespace.clone()).unwrap_or_default(),
            containing_types: containing.to_vec(),
            segment: segment.clone(),
            in_error,
            scopes: frames.to_vec(),
            attributes: self.attributes(node, AttributeTarget::Type),
            members,
        });

        let mut nested = containing.to_vec();
        nested.push(segment);
        for child in body_children
            .iter()
            .filter(|child| TYPE_DECLARATION_KINDS.contains(&child.kind()))
        {
            self.walk_type(*child, frames, &nested, in_error);
        }
    }

    fn type_parameters(&self, node: Node<'_>) -> Vec<String> {
        let Some(list) = node
            .child_by_field_name("type_parameters")
            .or_else(|| {
                named_children(node)
                    .into_iter()
                    .find(|child| child.kind() == "type_parameter_list")
            })
        else {
            return Vec::new();
        };

        named_children(list)
            .into_iter()
            .filter(|child| child.kind() == "type_parameter")
            .map(|parameter| {
                let name = parameter.child_by_field_name("name").or_else(|| {
                    named_children(parameter)
                        .into_iter()
                        .rfind(|child| child.kind() == "identifier")
                });
                self.identifier(name.unwrap_or(parameter))
            })
            .collect()
    }

    /// Positional record parameters become properties.
    fn record_parameters(&self, node: Node<'_>) -> Vec<MemberSyntax> {
        if !node.kind().starts_with("record") {
            return Vec::new();
        }
        let Some(list) = node.child_by_field_name("parameters").or_else(|| {
            named_children(node)
                .into_iter()
                .find(|child| child.kind() == "parameter_list")
        }) else {
            return Vec::new();
        };

        named_children(list)
            .into_iter()
            .filter(|child| child.kind() == "parameter")
            .filter_map(|parameter| {
                let name = parameter.child_by_field_name("name")?;
                Some(MemberSyntax {
                    name: self.identifier(name),
                    kind: MemberKind::Property,
                    attributes: self.explicit_target_attributes(parameter, "property"),
                })
            })
            .collect()
    }

    fn collect_member(&self, node: Node<'_>, members: &mut Vec<MemberSyntax>) {
        match node.kind() {
            "field_declaration" | "event_field_declaration" => {
                let (kind, target) = if node.kind() == "field_declaration" {
                    (MemberKind::Field, AttributeTarget::Field)
                } else {
                    (MemberKind::Event, AttributeTarget::Event)
                };
                let attributes = self.attributes(node, target);
                let Some(declaration) = named_children(node)
                    .into_iter()
                    .find(|child| child.kind() == "variable_declaration")
                else {
                    return;
                };
                for declarator in named_children(declaration)
                    .into_iter()
                    .filter(|child| child.kind() == "variable_declarator")
                {
                    let name = declarator.child_by_field_name("name").or_else(|| {
                        named_children(declarator)
                            .into_iter()
                            .find(|child| child.kind() == "identifier")
                    });
                    if let Some(name) = name {
                        members.push(MemberSyntax {
                            name: self.identifier(name),
                            kind,
                            attributes: attributes.clone(),
                        });
                    }
                }
            }
            "property_declaration" => self.push_named_member(
                node,
                MemberKind::Property,
                AttributeTarget::Property,
                members,
            ),
            "event_declaration" => {
                self.push_named_member(node, MemberKind::Event, AttributeTarget::Event, members)
            }
            "method_declaration" => {
                self.push_named_member(node, MemberKind::Method, AttributeTarget::Method, members)
            }
            "enum_member_declaration" => {
                self.push_named_member(node, MemberKind::Field, AttributeTarget::Field, members)
            }
            _ => {}
        }
    }

    fn push_named_member(
        &self,
        node: Node<'_>,
        kind: MemberKind,
        target: AttributeTarget,
        members: &mut Vec<MemberSyntax>,
    ) {
        let Some(name) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.identifier(name);
        if name.is_empty() {
            return;
        }
        members.push(MemberSyntax {
            name,
            kind,
            attributes: self.attributes(node, target),
        });
    }

    /// Attribute names of the lists that apply to `target`.
    fn attributes(&self, node: Node<'_>, target: AttributeTarget) -> Vec<String> {
        self.attribute_names(node, |list_target| match list_target {
            None => true,
            Some(explicit) => explicit == target.keyword(),
        })
    }

    /// Attribute names of the lists carrying exactly `target:`.
    fn explicit_target_attributes(&self, node: Node<'_>, target: &str) -> Vec<String> {
        self.attribute_names(node, |list_target| list_target == Some(target))
    }

    fn attribute_names(
        &self,
        node: Node<'_>,
        accept: impl Fn(Option<&str>) -> bool,
    ) -> Vec<String> {
        let mut names = Vec::new();
        for list in named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "attribute_list")
        {
            let children = named_children(list);
            let target = children
                .iter()
                .find(|child| child.kind() == "attribute_target_specifier")
                .map(|specifier| {
                    compact(self.text(*specifier))
                        .trim_end_matches(':')
                        .to_string()
                });
            if !accept(target.as_deref()) {
                continue;
            }

            for attribute in children.iter().filter(|child| child.kind() == "attribute") {
                if let Some(name) = attribute.child_by_field_name("name") {
                    let name = compact(self.text(name));
                    if !name.is_empty() {
                        names.push(name);
                    }
                }
            }
        }
        names
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeTarget {
    Type,
    Field,
    Property,
    Event,
    Method,
}

impl AttributeTarget {
    fn keyword(&self) -> &'static str {
        match self {
            AttributeTarget::Type => "type",
            AttributeTarget::Field => "field",
            AttributeTarget::Property => "property",
            AttributeTarget::Event => "event",
            AttributeTarget::Method => "method",
        }
    }
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// C# reserved keywords; identifiers spelled like one need `@` in source.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

fn escape_keyword(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("@{}", name)
    } else {
        name.to_string()
    }
}

/// Remove all whitespace, e.g. `System . ServiceModel` -> `System.ServiceModel`.
fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
