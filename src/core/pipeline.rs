//! Scan pipeline: projects -> compilation units -> type declarations -> results.
//!
//! The pipeline is a sequential, streaming producer. Every unique
//! `(kind, qualified name)` key is handed to the result callback exactly once,
//! in first-encounter order, as soon as it is found. Cancellation is polled at
//! compilation-unit boundaries only.

use std::collections::HashSet;
use std::io;
use std::path::Path;

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::classify::classify;
use super::error::ScanError;
use super::members::collect_members;
use super::model::{ContractKind, ScanResult};
use crate::workspace::{
    FileSystemWorkspace, InputForm, Project, SourceKind, Workspace, WorkspaceOptions,
};

/// What to do when a compilation unit's syntax/semantic views cannot be obtained.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, ValueEnum,
)]
#[serde(rename_all = "camelCase")]
pub enum UnitFailurePolicy {
    /// Fail the whole scan.
    #[default]
    Abort,
    /// Log a warning and continue with the next unit.
    Skip,
}

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub unit_failure: UnitFailurePolicy,
    pub workspace: WorkspaceOptions,
}

/// Counters of one finished scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub projects: usize,
    pub documents: usize,
    pub skipped_documents: usize,
    pub failed_units: usize,
    pub service_contracts: usize,
    pub data_contracts: usize,
}

impl ScanSummary {
    pub fn total_matches(&self) -> usize {
        self.service_contracts + self.data_contracts
    }
}

/// Callback receiving each result as it is found.
pub type ResultCallback<'a> = &'a mut dyn FnMut(ScanResult) -> io::Result<()>;

/// Optional advisory log callback.
pub type LogCallback<'a> = Option<&'a mut dyn FnMut(&str)>;

/// Scan a `.sln` or `.csproj` file.
pub fn scan(
    root: &Path,
    options: &ScanOptions,
    on_result: ResultCallback<'_>,
    on_log: LogCallback<'_>,
    cancellation: &CancellationToken,
) -> Result<ScanSummary, ScanError> {
    let form = validate_root(root)?;

    if cancellation.is_cancelled() {
        return Err(ScanError::Cancelled);
    }

    let mut log = Logger(on_log);
    log.emit(|| format!("Scanning {} {}", form.describe(), root.display()));

    let workspace = FileSystemWorkspace::open(root, form, &options.workspace)
        .map_err(|err| ScanError::workspace_load(root, &err))?;

    scan_workspace(&workspace, options, on_result, log.0, cancellation)
}

/// Scan an already opened workspace.
pub fn scan_workspace<W: Workspace + ?Sized>(
    workspace: &W,
    options: &ScanOptions,
    on_result: ResultCallback<'_>,
    on_log: LogCallback<'_>,
    cancellation: &CancellationToken,
) -> Result<ScanSummary, ScanError> {
    let mut log = Logger(on_log);
    let mut state = ScanState::default();

    for diagnostic in workspace.diagnostics() {
        log.emit(|| format!("warning: {}", diagnostic));
    }

    for project in workspace.projects() {
        scan_project(
            workspace,
            project,
            options,
            &mut state,
            on_result,
            &mut log,
            cancellation,
        )?;
    }

    let summary = state.summary;
    log.emit(|| {
        format!(
            "Scan complete: {} contract(s) ({} service, {} data) in {} project(s), {} document(s)",
            summary.total_matches(),
            summary.service_contracts,
            summary.data_contracts,
            summary.projects,
            summary.documents
        )
    });

    Ok(summary)
}

fn scan_project<W: Workspace + ?Sized>(
    workspace: &W,
    project: &Project,
    options: &ScanOptions,
    state: &mut ScanState,
    on_result: ResultCallback<'_>,
    log: &mut Logger<'_>,
    cancellation: &CancellationToken,
) -> Result<(), ScanError> {
    state.summary.projects += 1;
    let matches_before = state.summary.total_matches();

    log.emit(|| {
        format!(
            "Project {}: {} document(s)",
            project.name,
            project.documents.len()
        )
    });

    for document in &project.documents {
        if cancellation.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        if document.kind != SourceKind::Regular {
            state.summary.skipped_documents += 1;
            continue;
        }

        let unit = match workspace.load_unit(project, document) {
            Ok(unit) => unit,
            Err(err) => match options.unit_failure {
                UnitFailurePolicy::Abort => {
                    return Err(ScanError::UnitLoad {
                        path: document.path.clone(),
                        message: err.to_string(),
                    });
                }
                UnitFailurePolicy::Skip => {
                    state.summary.failed_units += 1;
                    log.emit(|| {
                        format!("warning: skipping {}: {}", document.path.display(), err)
                    });
                    continue;
                }
            },
        };
        state.summary.documents += 1;

        for declaration in &unit.declarations {
            // No symbol: the node sits in a region that failed to parse.
            if declaration.declared_symbol.is_none() {
                continue;
            }
            let Some(classification) = classify(declaration) else {
                continue;
            };

            let kind = classification.kind;
            if !state.mark_seen(kind, &declaration.qualified_name) {
                continue;
            }

            let data_members = match kind {
                ContractKind::DataContract => collect_members(declaration),
                ContractKind::ServiceContract => None,
            };

            on_result(ScanResult {
                kind,
                qualified_name: declaration.qualified_name.clone(),
                data_members,
            })?;
            state.record(kind);
        }
    }

    let project_matches = state.summary.total_matches() - matches_before;
    log.emit(|| format!("Project {}: {} match(es)", project.name, project_matches));

    Ok(())
}

fn validate_root(root: &Path) -> Result<InputForm, ScanError> {
    if root.as_os_str().is_empty() || root.to_string_lossy().trim().is_empty() {
        return Err(ScanError::InvalidInput(
            "Solution or project path is required.".to_string(),
        ));
    }

    let form = InputForm::detect(root).ok_or_else(|| {
        ScanError::InvalidInput(format!(
            "Input path must be a .sln or .csproj file: {}",
            root.display()
        ))
    })?;

    if !root.is_file() {
        return Err(ScanError::InvalidInput(format!(
            "Input file not found: {}",
            root.display()
        )));
    }

    Ok(form)
}

/// Dedup set and counters owned by one scan invocation.
#[derive(Default)]
struct ScanState {
    seen: HashSet<(ContractKind, String)>,
    summary: ScanSummary,
}

impl ScanState {
    /// Returns true the first time a key is seen.
    fn mark_seen(&mut self, kind: ContractKind, qualified_name: &str) -> bool {
        self.seen.insert((kind, qualified_name.to_string()))
    }

    fn record(&mut self, kind: ContractKind) {
        match kind {
            ContractKind::ServiceContract => self.summary.service_contracts += 1,
            ContractKind::DataContract => self.summary.data_contracts += 1,
        }
    }
}

struct Logger<'a>(LogCallback<'a>);

impl Logger<'_> {
    fn emit(&mut self, message: impl FnOnce() -> String) {
        if let Some(sink) = self.0.as_mut() {
            sink(&message());
        }
    }
}
