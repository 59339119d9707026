//! Visual Studio `.sln` parsing.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use anyhow::{Context, Result, bail};
use regex::Regex;

const SOLUTION_HEADER: &str = "Microsoft Visual Studio Solution File";

static PROJECT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^Project\("\{(?P<kind>[0-9A-Fa-f-]+)\}"\)\s*=\s*"(?P<name>[^"]*)"\s*,\s*"(?P<path>[^"]*)"\s*,\s*"\{(?P<guid>[0-9A-Fa-f-]+)\}"\s*$"#,
    )
    .expect("valid project line regex")
});

/// One `Project(...)` entry of a solution file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionEntry {
    pub name: String,
    /// Path as written in the solution, with `\` normalized to `/`.
    pub relative_path: String,
    /// Absolute (solution-relative resolved) path.
    pub path: PathBuf,
}

impl SolutionEntry {
    pub fn is_csharp_project(&self) -> bool {
        self.relative_path.to_ascii_lowercase().ends_with(".csproj")
    }
}

#[derive(Debug, Clone, Default)]
pub struct Solution {
    /// All project entries in file order, solution folders included.
    pub entries: Vec<SolutionEntry>,
}

impl Solution {
    pub fn csharp_projects(&self) -> impl Iterator<Item = &SolutionEntry> {
        self.entries.iter().filter(|entry| entry.is_csharp_project())
    }
}

pub fn load_solution(path: &Path) -> Result<Solution> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read solution file: {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_solution(&content, base_dir)
        .with_context(|| format!("Failed to parse solution file: {}", path.display()))
}

pub fn parse_solution(content: &str, base_dir: &Path) -> Result<Solution> {
    let content = content.trim_start_matches('\u{feff}');
    if !content
        .lines()
        .take(5)
        .any(|line| line.trim_start().starts_with(SOLUTION_HEADER))
    {
        bail!("missing \"{}\" header", SOLUTION_HEADER);
    }

    let entries = content
        .lines()
        .filter_map(|line| PROJECT_LINE.captures(line.trim()))
        .map(|caps| {
            let relative_path = caps["path"].replace('\\', "/");
            SolutionEntry {
                name: caps["name"].to_string(),
                path: base_dir.join(&relative_path),
                relative_path,
            }
        })
        .collect();

    Ok(Solution { entries })
}
