//! TOML loading for matching options and central-memory documents.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tmm_model::{CentralMemory, ConfigurationError, MatchOptions, ScoreWeights};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse TOML {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl LoadError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Contents of a `tmm.toml` options file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsFile {
    pub fuzzy_threshold: Option<f64>,
    pub max_suggestions: Option<usize>,
    pub disable_fuzzy: Option<bool>,
    pub weights: Option<ScoreWeights>,
}

impl OptionsFile {
    /// Overlays the keys present in the file onto `base`.
    #[must_use]
    pub fn apply_to(&self, mut base: MatchOptions) -> MatchOptions {
        if let Some(threshold) = self.fuzzy_threshold {
            base.fuzzy_threshold = threshold;
        }
        if let Some(max) = self.max_suggestions {
            base.max_suggestions = max;
        }
        if let Some(disable) = self.disable_fuzzy {
            base.fuzzy_enabled = !disable;
        }
        if let Some(weights) = self.weights {
            base.weights = weights;
        }
        base
    }
}

/// Loads matching options. A missing file yields the defaults.
pub fn load_options(path: &Path) -> Result<MatchOptions, LoadError> {
    let file: OptionsFile = match fs::read_to_string(path) {
        Ok(contents) => parse(path, &contents)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no options file, using defaults");
            OptionsFile::default()
        }
        Err(e) => return Err(LoadError::io(path, e)),
    };
    let options = file.apply_to(MatchOptions::default());
    options.validate()?;
    Ok(options)
}

/// Loads a central-memory rule document.
pub fn load_central_memory(path: &Path) -> Result<CentralMemory, LoadError> {
    let contents = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    let memory: CentralMemory = parse(path, &contents)?;
    info!(
        path = %path.display(),
        synonyms = memory.synonyms.len(),
        global_skips = memory.global_skip_fields.len(),
        global_manual = memory.global_manual_mappings.len(),
        tables = memory.table_specific.len(),
        "loaded central memory"
    );
    Ok(memory)
}

fn parse<T: DeserializeOwned>(path: &Path, contents: &str) -> Result<T, LoadError> {
    toml::from_str(contents).map_err(|source| LoadError::Toml {
        path: path.to_path_buf(),
        source,
    })
}
