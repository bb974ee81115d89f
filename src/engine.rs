//! The geocoding engine: a one-shot background build of every index, and the
//! public operations that wait on it.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::config::EngineConfig;
use crate::error::{GeoError, Result};
use crate::gazetteer::{AliasTables, Gazetteer, IdentifierEncoder, SchemeDetector};
use crate::models::{AdminLevel, BoundingRect, IdentifierType, RegionRecord};
use crate::pip::{BoundaryCorpus, RegionResolver};

/// Every index built from one corpus directory. Immutable once loaded apart
/// from the resolver's memo cache.
pub struct GeoIndex {
    corpus: Arc<BoundaryCorpus>,
    resolver: RegionResolver,
    gazetteer: Gazetteer,
    detect_sample_size: usize,
}

impl GeoIndex {
    /// Build synchronously. Blocks for as long as the corpus takes to parse.
    pub fn load(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let started = Instant::now();

        let corpus = Arc::new(BoundaryCorpus::load(&config.corpus_dir)?);
        let aliases = AliasTables::load_from_dir(&config.corpus_dir)?;
        let resolver = RegionResolver::new(Arc::clone(&corpus), config.resolver_options()?);
        let gazetteer = Gazetteer::build(&corpus, aliases);

        info!(
            "Geo index ready in {:.2?}: {} boundaries, {} admin2 countries",
            started.elapsed(),
            corpus.len(),
            corpus.admin2_countries().len()
        );

        Ok(Self {
            corpus,
            resolver,
            gazetteer,
            detect_sample_size: config.detect_sample_size,
        })
    }

    pub fn resolve(&self, coords: &[[f64; 2]], level: AdminLevel) -> Vec<RegionRecord> {
        debug!("Resolving {} coordinates at {} level", coords.len(), level.label());
        self.resolver.resolve(coords, level)
    }

    pub fn resolve_rows(&self, rows: &[Vec<f64>], level: u8) -> Result<Vec<RegionRecord>> {
        self.resolver.resolve_rows(rows, level)
    }

    pub fn encode<S: AsRef<str>>(&self, values: &[S], ty: IdentifierType) -> Vec<RegionRecord> {
        self.encoder().encode(values, ty)
    }

    pub fn detect_scheme<S: AsRef<str>>(&self, values: &[S]) -> Option<IdentifierType> {
        SchemeDetector::new(self.encoder(), self.detect_sample_size).detect(values)
    }

    /// Smallest rectangle around the representative points of `ids`.
    ///
    /// Unknown ids are ignored; `None` when no id is known.
    pub fn bounding_rect<I>(&self, ids: I) -> Option<BoundingRect>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        ids.into_iter()
            .filter_map(|id| self.corpus.by_id(id.as_ref()))
            .map(|boundary| boundary.region.point)
            .fold(None, |rect: Option<BoundingRect>, point| match rect {
                Some(mut rect) => {
                    rect.extend(point);
                    Some(rect)
                }
                None => Some(BoundingRect::from_point(point)),
            })
    }

    pub fn valid_values(&self, ty: IdentifierType) -> Vec<String> {
        self.gazetteer.valid_values(ty)
    }

    /// Countries with their own admin2 file
    pub fn admin2_countries(&self) -> &BTreeSet<String> {
        self.corpus.admin2_countries()
    }

    pub fn encoder(&self) -> IdentifierEncoder<'_> {
        IdentifierEncoder::new(&self.gazetteer)
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    pub fn corpus(&self) -> &BoundaryCorpus {
        &self.corpus
    }
}

type Readiness = Shared<BoxFuture<'static, Result<Arc<GeoIndex>>>>;

/// Handle to a [`GeoIndex`] that may still be building.
///
/// Every operation waits once for the build to finish and then runs against
/// the frozen index. A failed build is reported by every operation as
/// [`GeoError::Init`]. Cloning the handle shares the same build.
#[derive(Clone)]
pub struct GeoEngine {
    ready: Readiness,
}

impl GeoEngine {
    /// Start loading `config` on the blocking pool and return immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(config: EngineConfig) -> Self {
        info!("Loading boundary corpus from {}", config.corpus_dir.display());
        let build = tokio::task::spawn_blocking(move || GeoIndex::load(&config));

        let ready = async move {
            match build.await {
                Ok(Ok(index)) => Ok(Arc::new(index)),
                Ok(Err(e)) => {
                    error!("Geo index build failed: {}", e);
                    Err(GeoError::Init(Arc::new(e)))
                }
                Err(e) => {
                    error!("Geo index build aborted: {}", e);
                    Err(GeoError::Init(Arc::new(GeoError::Aborted(e.to_string()))))
                }
            }
        }
        .boxed()
        .shared();

        Self { ready }
    }

    /// Wrap an index that is already built
    pub fn from_index(index: Arc<GeoIndex>) -> Self {
        Self {
            ready: futures::future::ready(Ok(index)).boxed().shared(),
        }
    }

    /// Wait for the build and hand out the index for synchronous use
    pub async fn ready(&self) -> Result<Arc<GeoIndex>> {
        self.ready.clone().await
    }

    /// Run CPU-bound work against the index on the blocking pool
    async fn run_blocking<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&GeoIndex) -> T + Send + 'static,
        T: Send + 'static,
    {
        let index = self.ready().await?;
        tokio::task::spawn_blocking(move || work(&index))
            .await
            .map_err(|e| GeoError::Aborted(e.to_string()))
    }

    /// Resolve `[lat, lon]` pairs at admin level 0, 1 or 2.
    ///
    /// The level is checked before waiting for the build.
    pub async fn resolve(&self, coords: &[[f64; 2]], level: u8) -> Result<Vec<RegionRecord>> {
        let level = AdminLevel::try_from(level)?;
        let coords = coords.to_vec();
        self.run_blocking(move |index| index.resolve(&coords, level))
            .await
    }

    pub async fn encode<S: AsRef<str>>(
        &self,
        values: &[S],
        ty: IdentifierType,
    ) -> Result<Vec<RegionRecord>> {
        let values = owned(values);
        self.run_blocking(move |index| index.encode(&values, ty))
            .await
    }

    pub async fn detect_scheme<S: AsRef<str>>(
        &self,
        values: &[S],
    ) -> Result<Option<IdentifierType>> {
        let values = owned(values);
        self.run_blocking(move |index| index.detect_scheme(&values))
            .await
    }

    pub async fn bounding_rect<I>(&self, ids: I) -> Result<Option<BoundingRect>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let index = self.ready().await?;
        Ok(index.bounding_rect(ids))
    }

    pub async fn valid_values(&self, ty: IdentifierType) -> Result<Vec<String>> {
        let index = self.ready().await?;
        Ok(index.valid_values(ty))
    }

    pub async fn admin2_countries(&self) -> Result<BTreeSet<String>> {
        let index = self.ready().await?;
        Ok(index.admin2_countries().clone())
    }
}

fn owned<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values.iter().map(|v| v.as_ref().to_string()).collect()
}
