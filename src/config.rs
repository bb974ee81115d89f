//! Engine configuration read from TOML.
//!
//! Every key is optional; omitted keys take the defaults below.

use serde::Deserialize;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::error::{GeoError, Result};
use crate::gazetteer::DEFAULT_SAMPLE_SIZE;
use crate::pip::{
    ResolverOptions, DEFAULT_CACHE_CAPACITY, DEFAULT_CANDIDATES, DEFAULT_MAX_FALLBACK_DISTANCE,
};

/// Engine settings, usually read from a TOML file.
///
/// ```toml
/// corpus_dir = "/srv/geo/admin"
/// cache_capacity = 700
/// candidates = 30
/// max_fallback_distance = 0.2
/// detect_sample_size = 200
/// ```
///
/// Every key except `corpus_dir` may be omitted.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub corpus_dir: PathBuf,
    pub cache_capacity: usize,
    pub candidates: usize,
    pub max_fallback_distance: f64,
    pub detect_sample_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("admin"),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            candidates: DEFAULT_CANDIDATES,
            max_fallback_distance: DEFAULT_MAX_FALLBACK_DISTANCE,
            detect_sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl EngineConfig {
    pub fn with_corpus_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            corpus_dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            GeoError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: EngineConfig = toml::from_str(&content).map_err(|e| {
            GeoError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(GeoError::Config("cache_capacity must be positive".into()));
        }
        if self.candidates == 0 {
            return Err(GeoError::Config("candidates must be positive".into()));
        }
        if self.detect_sample_size == 0 {
            return Err(GeoError::Config("detect_sample_size must be positive".into()));
        }
        if !self.max_fallback_distance.is_finite() || self.max_fallback_distance < 0.0 {
            return Err(GeoError::Config(format!(
                "max_fallback_distance must be a non-negative number, got {}",
                self.max_fallback_distance
            )));
        }
        Ok(())
    }

    pub(crate) fn resolver_options(&self) -> Result<ResolverOptions> {
        let cache_capacity = NonZeroUsize::new(self.cache_capacity)
            .ok_or_else(|| GeoError::Config("cache_capacity must be positive".into()))?;
        Ok(ResolverOptions {
            candidates: self.candidates,
            max_fallback_distance: self.max_fallback_distance,
            cache_capacity,
        })
    }
}
