//! Workspace collaborator: solutions, projects, documents and their
//! syntax/semantic views.
//!
//! ## Module Structure
//!
//! - `solution`: `.sln` file parsing
//! - `project`: `.csproj` parsing and document enumeration
//! - `syntax`: C# syntax extraction (tree-sitter)
//! - `semantic`: per-project symbol index and attribute binding
//! - `loader`: file-system backed [`Workspace`] implementation

mod loader;
pub mod project;
pub mod semantic;
pub mod solution;
pub mod syntax;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::TypeDeclaration;

pub use loader::FileSystemWorkspace;

/// Form of the scan input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputForm {
    /// `.sln` file listing many projects.
    Solution,
    /// Single `.csproj` file.
    Project,
}

impl InputForm {
    /// Detect the input form from the file extension (case-insensitive).
    pub fn detect(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "sln" => Some(InputForm::Solution),
            "csproj" => Some(InputForm::Project),
            _ => None,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            InputForm::Solution => "solution",
            InputForm::Project => "project",
        }
    }
}

/// Options controlling how documents are enumerated.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceOptions {
    /// Treat generated documents as ordinary source.
    pub include_generated: bool,
    /// Glob patterns (relative to the project directory) of documents to leave out.
    pub ignores: Vec<String>,
}

/// How a document takes part in compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Regular,
    Generated,
    Script,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub kind: SourceKind,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, kind: SourceKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    /// Path of the `.csproj` file.
    pub path: PathBuf,
    /// Documents in enumeration order.
    pub documents: Vec<Document>,
}

/// Type declaration views of one document.
#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    pub declarations: Vec<TypeDeclaration>,
}

/// A document whose views could not be obtained.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("failed to read source file: {0}")]
    Read(String),
    #[error("failed to parse source file: {0}")]
    Parse(String),
    #[error("document is not part of the loaded workspace")]
    Unknown,
}

/// Source of projects and compilation units for the scan pipeline.
pub trait Workspace {
    /// Projects to scan, in workspace order.
    fn projects(&self) -> &[Project];

    /// Non-fatal problems found while opening the workspace.
    fn diagnostics(&self) -> &[String] {
        &[]
    }

    /// Obtain the type declaration views of one document.
    fn load_unit(&self, project: &Project, document: &Document)
    -> Result<CompilationUnit, UnitError>;
}
