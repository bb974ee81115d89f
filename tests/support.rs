#![allow(dead_code)]

use std::path::PathBuf;

use geomapper::{EngineConfig, GeoIndex, RegionRecord};

/// Directory holding the hand-built boundary corpus
pub fn corpus_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/corpus")
}

pub fn config() -> EngineConfig {
    EngineConfig::with_corpus_dir(corpus_dir())
}

pub fn load_index() -> GeoIndex {
    GeoIndex::load(&config()).unwrap_or_else(|err| panic!("fixture corpus failed to load: {err}"))
}

pub fn ids(records: &[RegionRecord]) -> Vec<Option<&str>> {
    records.iter().map(RegionRecord::id).collect()
}
