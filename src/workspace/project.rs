//! `.csproj` parsing and document enumeration.
//!
//! Only the parts of MSBuild evaluation that decide which C# documents belong
//! to a project and which assemblies it references are understood. Properties,
//! conditions and imports are not evaluated.

use std::{
    collections::HashSet,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern, glob};
use quick_xml::{Reader, events::Event};
use walkdir::WalkDir;

use super::{Document, SourceKind, WorkspaceOptions};

/// Directories excluded from SDK-style default compile items.
const DEFAULT_EXCLUDED_DIRS: &[&str] = &["bin", "obj"];

/// File name suffixes (lowercase) marking generated code.
const GENERATED_SUFFIXES: &[&str] = &[
    ".g.cs",
    ".g.i.cs",
    ".designer.cs",
    ".generated.cs",
    ".assemblyinfo.cs",
    ".assemblyattributes.cs",
];

/// Marker in a leading comment of generated files.
const AUTO_GENERATED_MARKER: &str = "<auto-generated";

/// Number of leading lines inspected for the auto-generated marker.
const HEADER_LINES: usize = 10;

/// Evaluated view of a project file.
#[derive(Debug, Clone, Default)]
pub struct ProjectFile {
    pub path: PathBuf,
    pub name: String,
    pub sdk_style: bool,
    pub enable_default_compile_items: bool,
    pub compile_includes: Vec<String>,
    pub compile_removes: Vec<String>,
    /// `<Reference Include>` assembly names, version suffix stripped.
    pub references: Vec<String>,
    pub package_references: Vec<String>,
    /// Absolute paths of `<ProjectReference Include>` items.
    pub project_references: Vec<PathBuf>,
    /// Items skipped because they depend on MSBuild properties.
    pub unevaluated_items: Vec<String>,
}

impl ProjectFile {
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn references_assembly(&self, assembly: &str) -> bool {
        self.references
            .iter()
            .any(|reference| reference.eq_ignore_ascii_case(assembly))
    }

    pub fn references_package_prefix(&self, prefix: &str) -> bool {
        let prefix = prefix.to_ascii_lowercase();
        self.package_references
            .iter()
            .any(|package| package.to_ascii_lowercase().starts_with(&prefix))
    }
}

pub fn load_project_file(path: &Path) -> Result<ProjectFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read project file: {}", path.display()))?;
    parse_project_file(&content, path)
        .with_context(|| format!("Failed to parse project file: {}", path.display()))
}

pub fn parse_project_file(content: &str, path: &Path) -> Result<ProjectFile> {
    let mut project = ProjectFile {
        path: path.to_path_buf(),
        name: path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default(),
        ..Default::default()
    };
    let base_dir = project.directory().to_path_buf();

    let mut reader = Reader::from_str(content.trim_start_matches('\u{feff}'));
    reader.config_mut().trim_text(true);

    let mut default_items_setting: Option<bool> = None;
    let mut in_default_items_element = false;

    loop {
        match reader.read_event()? {
            Event::Start(element) | Event::Empty(element) => {
                let name = element.local_name();
                let name = name.as_ref();
                in_default_items_element = name == b"EnableDefaultCompileItems";

                let mut include = None;
                let mut remove = None;
                let mut sdk = None;
                for attribute in element.attributes() {
                    let attribute = attribute?;
                    let value = attribute.unescape_value()?.to_string();
                    match attribute.key.local_name().as_ref() {
                        b"Include" => include = Some(value),
                        b"Remove" => remove = Some(value),
                        b"Sdk" => sdk = Some(value),
                        _ => {}
                    }
                }

                match name {
                    b"Project" | b"Import" if sdk.is_some() => project.sdk_style = true,
                    b"Sdk" => project.sdk_style = true,
                    b"Compile" => {
                        if let Some(include) = include {
                            push_items(
                                &include,
                                &mut project.compile_includes,
                                &mut project.unevaluated_items,
                            );
                        }
                        if let Some(remove) = remove {
                            push_items(
                                &remove,
                                &mut project.compile_removes,
                                &mut project.unevaluated_items,
                            );
                        }
                    }
                    b"Reference" => {
                        if let Some(include) = include {
                            let assembly = include.split(',').next().unwrap_or_default().trim();
                            if !assembly.is_empty() {
                                project.references.push(assembly.to_string());
                            }
                        }
                    }
                    b"PackageReference" => {
                        if let Some(include) = include {
                            project.package_references.push(include.trim().to_string());
                        }
                    }
                    b"ProjectReference" => {
                        if let Some(include) = include {
                            let mut items = Vec::new();
                            push_items(&include, &mut items, &mut project.unevaluated_items);
                            project
                                .project_references
                                .extend(items.into_iter().map(|item| base_dir.join(item)));
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(text) if in_default_items_element => {
                let value = String::from_utf8_lossy(&text).trim().to_ascii_lowercase();
                default_items_setting = Some(value != "false");
            }
            Event::End(element)
                if element.local_name().as_ref() == b"EnableDefaultCompileItems" =>
            {
                in_default_items_element = false;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    project.enable_default_compile_items =
        project.sdk_style && default_items_setting.unwrap_or(true);

    Ok(project)
}

/// Split an MSBuild item list (`a;b`) and normalize separators.
fn push_items(raw: &str, items: &mut Vec<String>, unevaluated: &mut Vec<String>) {
    for item in raw.split(';').map(str::trim).filter(|item| !item.is_empty()) {
        if item.contains("$(") || item.contains("@(") {
            unevaluated.push(item.to_string());
            continue;
        }
        items.push(item.replace('\\', "/"));
    }
}

/// Enumerate the C# documents of a project, in compilation order.
pub fn enumerate_documents(project: &ProjectFile, options: &WorkspaceOptions) -> Vec<Document> {
    let base_dir = project.directory();
    let mut paths: Vec<PathBuf> = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    if project.enable_default_compile_items {
        for path in default_compile_items(base_dir) {
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }

    for include in &project.compile_includes {
        for path in expand_item(base_dir, include) {
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }

    let removes = compile_patterns(&project.compile_removes);
    let ignores = compile_patterns(&options.ignores);

    paths
        .into_iter()
        .filter(|path| {
            let relative = path.strip_prefix(base_dir).unwrap_or(path);
            !matches_any(&removes, relative) && !matches_any(&ignores, relative)
        })
        .map(|path| {
            let kind = match classify_source(&path) {
                SourceKind::Generated if options.include_generated => SourceKind::Regular,
                kind => kind,
            };
            Document::new(path, kind)
        })
        .collect()
}

/// `**/*.cs` under the project directory minus `bin/`, `obj/` and dot-directories.
fn default_compile_items(base_dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(base_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !name.starts_with('.')
                && !DEFAULT_EXCLUDED_DIRS
                    .iter()
                    .any(|excluded| name.eq_ignore_ascii_case(excluded))
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && has_extension(entry.path(), "cs"))
        .map(|entry| entry.into_path())
        .collect()
}

fn expand_item(base_dir: &Path, item: &str) -> Vec<PathBuf> {
    let full = base_dir.join(item);
    if !item.contains('*') && !item.contains('?') {
        return vec![full];
    }

    let pattern = full.to_string_lossy().to_string();
    match glob(&pattern) {
        Ok(entries) => {
            let mut paths: Vec<PathBuf> = entries.flatten().filter(|p| p.is_file()).collect();
            paths.sort();
            paths
        }
        Err(_) => Vec::new(),
    }
}

fn compile_patterns(raw: &[String]) -> Vec<Pattern> {
    raw.iter()
        .filter_map(|pattern| Pattern::new(&pattern.replace('\\', "/")).ok())
        .collect()
}

fn matches_any(patterns: &[Pattern], relative: &Path) -> bool {
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };
    patterns
        .iter()
        .any(|pattern| pattern.matches_path_with(relative, options))
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Classify a document by file name and leading comment.
pub fn classify_source(path: &Path) -> SourceKind {
    if has_extension(path, "csx") {
        return SourceKind::Script;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if GENERATED_SUFFIXES
        .iter()
        .any(|suffix| file_name.ends_with(suffix))
        || file_name == "assemblyinfo.cs"
    {
        return SourceKind::Generated;
    }

    if has_auto_generated_header(path) {
        return SourceKind::Generated;
    }

    SourceKind::Regular
}

/// Unreadable files are reported later, when their unit is loaded.
fn has_auto_generated_header(path: &Path) -> bool {
    let Ok(file) = fs::File::open(path) else {
        return false;
    };

    BufReader::new(file)
        .lines()
        .take(HEADER_LINES)
        .map_while(|line| line.ok())
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .take_while(|line| {
            line.starts_with("//") || line.starts_with("/*") || line.starts_with('*')
        })
        .any(|line| line.contains(AUTO_GENERATED_MARKER))
}
