//! Command implementations, independent of argument parsing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tmm_map::{MatchEngine, ResolvedRules, SynonymTable, load_central_memory, load_options};
use tmm_model::{CentralMemory, MatchDecision, MatchOptions, MatchStatistics};
use tracing::info;

use crate::batch::Batch;

/// Inputs of one `map` invocation. `None` overrides keep the file value.
#[derive(Debug, Clone, Default)]
pub struct MapRequest {
    pub batch: PathBuf,
    pub rules: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub table: Option<String>,
    pub threshold: Option<f64>,
    pub max_suggestions: Option<usize>,
    pub disable_fuzzy: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    pub options: MatchOptions,
    pub decisions: Vec<MatchDecision>,
    pub statistics: MatchStatistics,
}

/// Options from the config file (defaults when absent), then CLI overrides.
pub fn resolve_options(request: &MapRequest) -> Result<MatchOptions> {
    let mut options = match &request.config {
        Some(path) => load_options(path)?,
        None => MatchOptions::default(),
    };
    if let Some(threshold) = request.threshold {
        options.fuzzy_threshold = threshold;
    }
    if let Some(max) = request.max_suggestions {
        options.max_suggestions = max;
    }
    if request.disable_fuzzy {
        options.fuzzy_enabled = false;
    }
    options.validate().context("invalid matching options")?;
    Ok(options)
}

fn load_rules(path: Option<&Path>) -> Result<CentralMemory> {
    match path {
        Some(path) => Ok(load_central_memory(path)?),
        None => Ok(CentralMemory::default()),
    }
}

pub fn run_map(request: &MapRequest) -> Result<MapReport> {
    let batch = Batch::load(&request.batch)?;
    let options = resolve_options(request)?;
    let memory = load_rules(request.rules.as_deref())?;
    let table = request.table.clone().or_else(|| batch.table_key());

    let engine = MatchEngine::new(options.clone())?.with_central_memory(&memory);
    let rules = ResolvedRules::resolve(&memory, table.as_deref());
    let outcome = engine
        .run(&batch.sources, &batch.targets, &rules)
        .with_context(|| format!("match batch {}", request.batch.display()))?;
    info!(
        batch = %request.batch.display(),
        decisions = outcome.decisions.len(),
        "batch matched"
    );
    Ok(MapReport {
        table,
        options,
        decisions: outcome.decisions,
        statistics: outcome.statistics,
    })
}

/// Synonyms of `term` from the built-in table plus any custom groups.
pub fn lookup_synonyms(term: &str, rules: Option<&Path>) -> Result<Vec<String>> {
    let memory = load_rules(rules)?;
    let mut table = SynonymTable::builtin();
    table.extend_from(&memory.synonyms);
    Ok(table.synonyms_of(term).into_iter().collect())
}
