//! TOML sanitize cases: one file per policy, many `[[case]]` entries.
//!
//! ```toml
//! [policy]
//! elements = ["b"]
//!
//! [[case]]
//! name = "drops-italics"
//! input = "<b>x</b><i>y</i>"
//! expected = "<b>x</b>y"
//! ```
//!
//! The `policy` table is opaque here; the consuming test deserializes it
//! into whatever configuration type it exercises.

use crate::fixtures::FixtureStatus;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Case {
    pub name: String,
    pub input: String,
    pub expected: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl Case {
    pub fn status(&self, origin: &Path) -> FixtureStatus {
        let status = FixtureStatus::parse(self.status.as_deref(), origin);
        if status != FixtureStatus::Active && self.reason.as_deref().unwrap_or("").is_empty() {
            panic!("non-active case '{}' missing reason in {origin:?}", self.name);
        }
        status
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseFile {
    #[serde(skip)]
    pub path: PathBuf,
    #[serde(default)]
    pub policy: toml::Table,
    #[serde(rename = "case", default)]
    pub cases: Vec<Case>,
}

/// Load every `*.toml` file directly under `root`, sorted by file name.
pub fn load_case_files(root: &Path) -> Vec<CaseFile> {
    let mut paths: Vec<PathBuf> = fs::read_dir(root)
        .unwrap_or_else(|err| panic!("failed to read case root {root:?}: {err}"))
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();
    paths
        .into_iter()
        .map(|path| {
            let content = fs::read_to_string(&path)
                .unwrap_or_else(|err| panic!("failed to read case file {path:?}: {err}"));
            let mut file: CaseFile = toml::from_str(&content)
                .unwrap_or_else(|err| panic!("failed to parse case file {path:?}: {err}"));
            if file.cases.is_empty() {
                panic!("case file {path:?} has no [[case]] entries");
            }
            file.path = path;
            file
        })
        .collect()
}
