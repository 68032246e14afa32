//! Scenario loading from a YAML file or a directory of YAML files.
//!
//! Any failure here is fatal for the whole batch: nothing is checked unless
//! every input file reads and parses.

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;

use crate::scenario::ScenarioDocument;

/// File extensions picked up when the input is a directory.
pub const SCENARIO_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("cannot read {}: {source}", .path.display())]
    #[diagnostic(code(polcheck::load::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", .path.display())]
    #[diagnostic(code(polcheck::load::parse))]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no scenarios found in {}", .path.display())]
    #[diagnostic(
        code(polcheck::load::empty),
        help("a directory is scanned for *.yaml and *.yml files (not recursively)")
    )]
    Empty { path: PathBuf },
}

/// Load every scenario document under `path`, in deterministic order.
pub fn load_scenarios(path: &Path) -> Result<Vec<ScenarioDocument>, LoadError> {
    let metadata = fs::metadata(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let files = if metadata.is_dir() {
        scenario_files(path)?
    } else {
        vec![path.to_path_buf()]
    };

    let mut scenarios = Vec::new();
    for file in &files {
        let loaded = load_stream(file)?;
        tracing::debug!(file = %file.display(), documents = loaded.len(), "loaded scenario file");
        scenarios.extend(loaded);
    }

    if scenarios.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(scenarios)
}

/// Scenario files directly inside `dir`, sorted by file name.
fn scenario_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let read_err = |source| LoadError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SCENARIO_EXTENSIONS.contains(&ext));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Parse every document of one YAML stream. Empty documents are skipped.
fn load_stream(file: &Path) -> Result<Vec<ScenarioDocument>, LoadError> {
    let text = fs::read_to_string(file).map_err(|source| LoadError::Read {
        path: file.to_path_buf(),
        source,
    })?;
    parse_stream(file, &text)
}

/// Parse the documents of `text`, attributing them to `source`.
pub fn parse_stream(source: &Path, text: &str) -> Result<Vec<ScenarioDocument>, LoadError> {
    let mut documents = Vec::new();
    for (index, de) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let value = Value::deserialize(de).map_err(|source_err| LoadError::Parse {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        if value.is_null() {
            continue;
        }
        documents.push(ScenarioDocument::new(source, index, value));
    }
    Ok(documents)
}
