//! contractscan - WCF contract discovery for C# solutions
//!
//! contractscan is a CLI tool and library that walks a `.sln` or `.csproj`,
//! finds every type marked `[ServiceContract]` or `[DataContract]` and reports
//! each one once, with the `[DataMember]` fields and properties of data
//! contracts.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Contract discovery engine (matcher, classifier, scan pipeline)
//! - `mcp`: Model Context Protocol server implementation
//! - `output`: Result sinks (JSON lines, in-memory)
//! - `workspace`: Solution/project loading, syntax extraction and binding

pub mod cli;
pub mod config;
pub mod core;
pub mod mcp;
pub mod output;
pub mod workspace;
