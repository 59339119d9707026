//! File-system backed workspace.
//!
//! Opening a workspace reads the solution/project files, enumerates documents,
//! parses every compiled document once (in parallel) and binds each scanned
//! project against the symbols of itself and its transitive references.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Result, bail};
use rayon::prelude::*;

use super::project::{ProjectFile, enumerate_documents, load_project_file};
use super::semantic::{Binder, FrameworkReferences, SymbolIndex};
use super::solution::load_solution;
use super::syntax::{SourceSyntax, SyntaxParser, UsingDirective};
use super::{
    CompilationUnit, Document, InputForm, Project, SourceKind, UnitError, Workspace,
    WorkspaceOptions,
};

const SERVICE_MODEL_ASSEMBLY: &str = "System.ServiceModel";
const SERVICE_MODEL_PACKAGE_PREFIX: &str = "System.ServiceModel.";
const SERIALIZATION_ASSEMBLY: &str = "System.Runtime.Serialization";

type ParsedDocuments = HashMap<PathBuf, Result<SourceSyntax, UnitError>>;

pub struct FileSystemWorkspace {
    projects: Vec<Project>,
    diagnostics: Vec<String>,
    /// Keyed by (project file, document path).
    units: HashMap<(PathBuf, PathBuf), Result<CompilationUnit, UnitError>>,
}

impl FileSystemWorkspace {
    pub fn open(path: &Path, form: InputForm, options: &WorkspaceOptions) -> Result<Self> {
        let mut diagnostics = Vec::new();
        let mut graph = ProjectGraph::default();

        let mut roots: Vec<(String, usize)> = Vec::new();
        match form {
            InputForm::Solution => {
                let solution = load_solution(path)?;
                for entry in &solution.entries {
                    // Solution folders have no file extension.
                    if !entry.is_csharp_project()
                        && Path::new(&entry.relative_path).extension().is_some()
                    {
                        diagnostics.push(format!(
                            "ignoring {} ({}): not a C# project",
                            entry.name, entry.relative_path
                        ));
                    }
                }
                for entry in solution.csharp_projects() {
                    if !entry.path.is_file() {
                        bail!(
                            "project {} listed in the solution was not found: {}",
                            entry.name,
                            entry.path.display()
                        );
                    }
                    let index = graph.load(&entry.path, options)?;
                    if !roots.iter().any(|(_, root)| *root == index) {
                        roots.push((entry.name.clone(), index));
                    }
                }
            }
            InputForm::Project => {
                let index = graph.load(path, options)?;
                roots.push((graph.nodes[index].file.name.clone(), index));
            }
        }

        let root_indices: Vec<usize> = roots.iter().map(|(_, index)| *index).collect();
        graph.load_references(&root_indices, options, &mut diagnostics);

        for node in &graph.nodes {
            for item in &node.file.unevaluated_items {
                diagnostics.push(format!(
                    "{}: skipped item with unevaluated MSBuild property: {}",
                    node.file.name, item
                ));
            }
        }

        let parsed = parse_documents(&graph);

        let mut projects = Vec::new();
        let mut units = HashMap::new();
        for (name, index) in roots {
            let node = &graph.nodes[index];
            for (document, unit) in bind_project(&graph, index, &parsed) {
                units.insert((node.file.path.clone(), document), unit);
            }
            projects.push(Project {
                name,
                path: node.file.path.clone(),
                documents: node.documents.clone(),
            });
        }

        Ok(Self {
            projects,
            diagnostics,
            units,
        })
    }
}

impl Workspace for FileSystemWorkspace {
    fn projects(&self) -> &[Project] {
        &self.projects
    }

    fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    fn load_unit(
        &self,
        project: &Project,
        document: &Document,
    ) -> Result<CompilationUnit, UnitError> {
        self.units
            .get(&(project.path.clone(), document.path.clone()))
            .cloned()
            .unwrap_or(Err(UnitError::Unknown))
    }
}

struct ProjectNode {
    file: ProjectFile,
    documents: Vec<Document>,
    references: Vec<usize>,
}

/// Loaded projects and their reference edges.
#[derive(Default)]
struct ProjectGraph {
    nodes: Vec<ProjectNode>,
    by_path: HashMap<PathBuf, usize>,
}

impl ProjectGraph {
    fn load(&mut self, path: &Path, options: &WorkspaceOptions) -> Result<usize> {
        let key = identity(path);
        if let Some(index) = self.by_path.get(&key) {
            return Ok(*index);
        }

        let file = load_project_file(path)?;
        let documents = enumerate_documents(&file, options);
        self.nodes.push(ProjectNode {
            file,
            documents,
            references: Vec::new(),
        });
        let index = self.nodes.len() - 1;
        self.by_path.insert(key, index);
        Ok(index)
    }

    /// Follow `ProjectReference` items breadth first. Problems are diagnostics.
    fn load_references(
        &mut self,
        roots: &[usize],
        options: &WorkspaceOptions,
        diagnostics: &mut Vec<String>,
    ) {
        let mut queue: VecDeque<usize> = roots.iter().copied().collect();
        let mut visited: HashSet<usize> = HashSet::new();

        while let Some(index) = queue.pop_front() {
            if !visited.insert(index) {
                continue;
            }

            let referencing = self.nodes[index].file.name.clone();
            let reference_paths = self.nodes[index].file.project_references.clone();
            for reference in reference_paths {
                if !reference.is_file() {
                    diagnostics.push(format!(
                        "{}: referenced project not found: {}",
                        referencing,
                        reference.display()
                    ));
                    continue;
                }
                match self.load(&reference, options) {
                    Ok(target) => {
                        if !self.nodes[index].references.contains(&target) {
                            self.nodes[index].references.push(target);
                        }
                        queue.push_back(target);
                    }
                    Err(err) => diagnostics.push(format!(
                        "{}: failed to load referenced project: {:#}",
                        referencing, err
                    )),
                }
            }
        }
    }

    /// `index` and every project it references, directly or not.
    fn closure(&self, index: usize) -> Vec<usize> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            stack.extend(self.nodes[current].references.iter().rev().copied());
        }
        order
    }
}

/// Canonical path when available, for project identity.
fn identity(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn is_compiled(document: &Document) -> bool {
    document.kind != SourceKind::Script
}

/// Read and parse every compiled document of every loaded project.
fn parse_documents(graph: &ProjectGraph) -> ParsedDocuments {
    let mut seen = HashSet::new();
    let paths: Vec<PathBuf> = graph
        .nodes
        .iter()
        .flat_map(|node| node.documents.iter())
        .filter(|document| is_compiled(document))
        .filter(|document| seen.insert(document.path.clone()))
        .map(|document| document.path.clone())
        .collect();

    // Parallel read + parse, one parser per worker
    let results: Vec<(PathBuf, Result<SourceSyntax, UnitError>)> = paths
        .into_par_iter()
        .map_init(SyntaxParser::new, |parser, path| {
            let result = parse_document(parser, &path);
            (path, result)
        })
        .collect();

    results.into_iter().collect()
}

fn parse_document(
    parser: &mut Result<SyntaxParser>,
    path: &Path,
) -> Result<SourceSyntax, UnitError> {
    let bytes = fs::read(path).map_err(|err| UnitError::Read(err.to_string()))?;
    let source = String::from_utf8_lossy(&bytes);
    let parser = parser
        .as_mut()
        .map_err(|err| UnitError::Parse(format!("{:#}", err)))?;
    parser
        .parse(source.trim_start_matches('\u{feff}'))
        .map_err(|err| UnitError::Parse(format!("{:#}", err)))
}

/// Bind the documents of one scanned project.
///
/// Returns the unit of every compiled document of the project, keyed by path.
fn bind_project(
    graph: &ProjectGraph,
    index: usize,
    parsed: &ParsedDocuments,
) -> Vec<(PathBuf, Result<CompilationUnit, UnitError>)> {
    let closure = graph.closure(index);
    let root = &graph.nodes[index];

    let framework = FrameworkReferences {
        service_model: closure.iter().any(|i| {
            let file = &graph.nodes[*i].file;
            file.references_assembly(SERVICE_MODEL_ASSEMBLY)
                || file.references_package_prefix(SERVICE_MODEL_PACKAGE_PREFIX)
        }),
        serialization: root.file.sdk_style
            || closure
                .iter()
                .any(|i| graph.nodes[*i].file.references_assembly(SERIALIZATION_ASSEMBLY)),
    };

    let mut index_builder = SymbolIndex::new(framework);
    for node in closure.iter().map(|i| &graph.nodes[*i]) {
        for document in node.documents.iter().filter(|d| is_compiled(d)) {
            if let Some(Ok(syntax)) = parsed.get(&document.path) {
                index_builder.add_source(syntax);
            }
        }
    }

    let own: Vec<(&Document, Option<&SourceSyntax>)> = root
        .documents
        .iter()
        .filter(|document| is_compiled(document))
        .map(|document| {
            let syntax = parsed.get(&document.path).and_then(|r| r.as_ref().ok());
            (document, syntax)
        })
        .collect();

    let global_usings: Vec<UsingDirective> = own
        .iter()
        .filter_map(|(_, syntax)| *syntax)
        .flat_map(|syntax| syntax.global_usings.iter().cloned())
        .collect();

    let sources: Vec<&SourceSyntax> = own.iter().filter_map(|(_, syntax)| *syntax).collect();
    let mut bound = Binder::new(&index_builder, &global_usings)
        .bind_project(&sources)
        .into_iter();

    own.into_iter()
        .map(|(document, syntax)| {
            let unit = match syntax {
                Some(_) => Ok(CompilationUnit {
                    declarations: bound.next().unwrap_or_default(),
                }),
                None => match parsed.get(&document.path) {
                    Some(Err(err)) => Err(err.clone()),
                    _ => Err(UnitError::Unknown),
                },
            };
            (document.path.clone(), unit)
        })
        .collect()
}
