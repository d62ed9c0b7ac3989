//! Directory-per-case fixtures with a headered expected file.
//!
//! Layout: `<root>/<case>/input.html` plus an expected file whose leading
//! `# key: value` lines are headers (`format` required, `status` and
//! `reason` optional) and whose remaining non-empty lines are the snapshot.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FixtureStatus {
    Active,
    Xfail,
    Skip,
}

impl FixtureStatus {
    pub fn parse(raw: Option<&str>, origin: &Path) -> Self {
        match raw {
            Some("active") | None => FixtureStatus::Active,
            Some("xfail") => FixtureStatus::Xfail,
            Some("skip") => FixtureStatus::Skip,
            Some(other) => panic!("unsupported status '{other}' in {origin:?}"),
        }
    }
}

pub struct Expected {
    pub status: FixtureStatus,
    pub reason: Option<String>,
    pub lines: Vec<String>,
}

/// Parse an expected file, asserting its `format` header equals `format`.
pub fn parse_expected_file(path: &Path, format: &str) -> Expected {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read expected file {path:?}: {err}"));
    let mut lines = Vec::new();
    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for raw_line in content.lines() {
        let line = raw_line.trim_end();
        if line.is_empty() {
            continue;
        }
        if let Some(stripped) = line.strip_prefix('#') {
            let header = stripped.trim();
            if header.is_empty() {
                continue;
            }
            let (key, value) = header
                .split_once(':')
                .unwrap_or_else(|| panic!("invalid header in {path:?}: '{line}'"));
            let key = key.trim().to_ascii_lowercase();
            if headers.insert(key.clone(), value.trim().to_string()).is_some() {
                panic!("duplicate header '{key}' in {path:?}");
            }
        } else {
            lines.push(line.to_string());
        }
    }

    let found = headers
        .get("format")
        .unwrap_or_else(|| panic!("missing format header in {path:?}"));
    assert_eq!(found, format, "unsupported format in {path:?}");

    let status = FixtureStatus::parse(headers.get("status").map(String::as_str), path);
    let reason = headers.get("reason").cloned();
    if status != FixtureStatus::Active && reason.as_deref().unwrap_or("").is_empty() {
        panic!("non-active fixture missing reason in {path:?}");
    }
    Expected {
        status,
        reason,
        lines,
    }
}

/// Case directories under `root`, sorted by name; dot-directories are skipped.
pub fn fixture_dirs(root: &Path) -> Vec<(String, PathBuf)> {
    let mut entries: Vec<_> = fs::read_dir(root)
        .unwrap_or_else(|err| panic!("failed to read fixture root {root:?}: {err}"))
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .collect();
    entries.sort_by_key(|entry| entry.file_name());
    entries
        .into_iter()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if name != name.trim() {
                panic!("fixture directory has leading/trailing whitespace: '{name}'");
            }
            (!name.starts_with('.')).then(|| (name, entry.path()))
        })
        .collect()
}

/// Substring filter over case names, read from an environment variable.
pub struct FixtureFilter {
    raw: Option<String>,
}

impl FixtureFilter {
    pub fn from_env(key: &str) -> Self {
        Self {
            raw: env::var(key).ok(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.raw.as_deref().is_none_or(|filter| name.contains(filter))
    }
}
