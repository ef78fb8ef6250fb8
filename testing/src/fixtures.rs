//! Canned JSON response bodies stored as `<name>.json` files.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("fixture {name:?} not found at {path}: {source}")]
    Missing {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fixture {name:?} at {path} is not valid JSON: {source}")]
    Invalid {
        name: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A directory of JSON fixtures, typically
/// `concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixtures {
    dir: PathBuf,
}

impl Fixtures {
    pub fn at(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Read and validate `<name>.json`, returning its text verbatim.
    pub fn try_load(&self, name: &str) -> Result<String, FixtureError> {
        self.read(name).map(|(text, _)| text)
    }

    /// Like `try_load`, but a missing or broken fixture fails the test.
    #[track_caller]
    pub fn load(&self, name: &str) -> String {
        match self.read(name) {
            Ok((text, _)) => text,
            Err(e) => panic!("{e}"),
        }
    }

    /// The fixture parsed as a JSON value.
    #[track_caller]
    pub fn load_json(&self, name: &str) -> Value {
        match self.read(name) {
            Ok((_, value)) => value,
            Err(e) => panic!("{e}"),
        }
    }

    fn read(&self, name: &str) -> Result<(String, Value), FixtureError> {
        let path = self.path(name);
        let text = fs::read_to_string(&path).map_err(|source| FixtureError::Missing {
            name: name.to_string(),
            path: path.clone(),
            source,
        })?;
        let value = serde_json::from_str(&text).map_err(|source| FixtureError::Invalid {
            name: name.to_string(),
            path,
            source,
        })?;
        Ok((text, value))
    }
}
