use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use crate::config::EngineConfig;
use crate::engine::GeoIndex;

pub(crate) fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/corpus")
}

pub(crate) fn fixture_config() -> EngineConfig {
    EngineConfig::with_corpus_dir(fixture_dir())
}

static FIXTURE_INDEX: LazyLock<Arc<GeoIndex>> = LazyLock::new(|| {
    Arc::new(GeoIndex::load(&fixture_config()).expect("fixture corpus loads"))
});

/// Index over the fixture corpus, built once per test binary
pub(crate) fn fixture_index() -> Arc<GeoIndex> {
    Arc::clone(&FIXTURE_INDEX)
}
