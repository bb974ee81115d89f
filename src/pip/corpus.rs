//! Boundary corpus loading.
//!
//! The corpus is a directory of GeoJSON feature collections named
//! `admin{level}[-{CC}].json`. Each file is parsed independently, then merged
//! in file-name order so boundary ids and index slots are deterministic.

use hashbrown::{HashMap, HashSet};
use rayon::prelude::*;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use tracing::{info, warn};
use walkdir::WalkDir;

use super::AdminBoundary;
use crate::error::{GeoError, Result};
use crate::models::AdminLevel;

static CORPUS_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^admin([0-2])(?:-([A-Za-z]{3}))?\.json$").expect("static regex is valid")
});

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Value>,
}

/// A corpus file identified by its name
#[derive(Debug, Clone, PartialEq)]
struct CorpusFile {
    path: PathBuf,
    level: AdminLevel,
    country: Option<String>,
}

impl CorpusFile {
    fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let caps = CORPUS_FILE.captures(file_name)?;
        let level = caps.get(1)?.as_str().parse::<u8>().ok()?;
        Some(Self {
            path: path.to_path_buf(),
            level: AdminLevel::try_from(level).ok()?,
            country: caps.get(2).map(|m| m.as_str().to_uppercase()),
        })
    }
}

/// All boundaries of the corpus with their id and country tables
#[derive(Debug, Default)]
pub struct BoundaryCorpus {
    /// Boundaries loaded from each level's own files, in load order
    by_level: [Vec<Arc<AdminBoundary>>; 3],
    /// Level 2 as queried: explicit admin2 boundaries plus the admin1
    /// boundaries of countries that have no admin2 file
    level2_indexed: Vec<Arc<AdminBoundary>>,
    /// Ids seen per level; ids are only unique within a level
    level_ids: [HashSet<String>; 3],
    /// First boundary loaded under each id, lowest level first
    id_to_boundary: HashMap<String, Arc<AdminBoundary>>,
    country_to_boundary: HashMap<String, Arc<AdminBoundary>>,
    admin2_countries: BTreeSet<String>,
}

impl BoundaryCorpus {
    /// Load every `admin*.json` file in `dir`.
    ///
    /// A missing or empty directory and unreadable files are fatal. Individual
    /// malformed features are logged and skipped.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(GeoError::CorpusMissing(dir.to_path_buf()));
        }

        info!("Loading boundary corpus from {}", dir.display());

        let mut files: Vec<CorpusFile> = WalkDir::new(dir)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| CorpusFile::from_path(entry.path()))
            .collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        if files.is_empty() {
            return Err(GeoError::CorpusEmpty(dir.to_path_buf()));
        }

        let parsed = files
            .par_iter()
            .map(|file| parse_file(file).map(|boundaries| (file, boundaries)))
            .collect::<Result<Vec<_>>>()?;

        let mut corpus = Self::default();
        for file in &files {
            if file.level == AdminLevel::Subdivision2 {
                if let Some(cc) = &file.country {
                    corpus.admin2_countries.insert(cc.clone());
                }
            }
        }

        for (file, boundaries) in parsed {
            for boundary in boundaries {
                corpus.insert(file, boundary);
            }
        }

        corpus.level2_indexed = corpus.by_level[2].clone();
        corpus.level2_indexed.extend(
            corpus.by_level[1]
                .iter()
                .filter(|b| !corpus.admin2_countries.contains(b.country_code()))
                .cloned(),
        );

        for level in AdminLevel::all() {
            info!(
                "  {}: {} boundaries",
                level,
                corpus.by_level[level.as_u8() as usize].len()
            );
        }
        info!(
            "Level 2 queries cover {} boundaries ({} countries with explicit admin2)",
            corpus.level2_indexed.len(),
            corpus.admin2_countries.len()
        );

        Ok(corpus)
    }

    fn insert(&mut self, file: &CorpusFile, boundary: AdminBoundary) {
        let level = boundary.level();
        let boundary = Arc::new(boundary);

        if !self.level_ids[level.as_u8() as usize].insert(boundary.id().to_string()) {
            warn!(
                "Skipping feature in {}: {}",
                file.path.display(),
                super::boundary::FeatureError::DuplicateId(boundary.id().to_string())
            );
            return;
        }

        if level == AdminLevel::Country {
            self.country_to_boundary
                .entry(boundary.country_code().to_string())
                .or_insert_with(|| Arc::clone(&boundary));
        }
        self.id_to_boundary
            .entry(boundary.id().to_string())
            .or_insert_with(|| Arc::clone(&boundary));
        self.by_level[level.as_u8() as usize].push(boundary);
    }

    /// Boundaries that answer spatial queries at `level`
    pub fn indexed(&self, level: AdminLevel) -> &[Arc<AdminBoundary>] {
        match level {
            AdminLevel::Subdivision2 => &self.level2_indexed,
            other => &self.by_level[other.as_u8() as usize],
        }
    }

    /// Boundaries loaded from `level`'s own files
    pub fn boundaries(&self, level: AdminLevel) -> &[Arc<AdminBoundary>] {
        &self.by_level[level.as_u8() as usize]
    }

    /// Boundary with `id`; when levels share an id the lowest level wins
    pub fn by_id(&self, id: &str) -> Option<&Arc<AdminBoundary>> {
        self.id_to_boundary.get(id)
    }

    /// Admin-0 boundary of a country
    pub fn country(&self, country_code: &str) -> Option<&Arc<AdminBoundary>> {
        self.country_to_boundary.get(country_code)
    }

    /// Countries with explicit admin-2 boundary files
    pub fn admin2_countries(&self) -> &BTreeSet<String> {
        &self.admin2_countries
    }

    /// Boundaries loaded across all levels
    pub fn len(&self) -> usize {
        self.by_level.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_level.iter().all(Vec::is_empty)
    }
}

fn parse_file(file: &CorpusFile) -> Result<Vec<AdminBoundary>> {
    let content =
        fs::read_to_string(&file.path).map_err(|e| GeoError::corpus_file(&file.path, e))?;
    let collection: FeatureCollection =
        serde_json::from_str(&content).map_err(|e| GeoError::corpus_file(&file.path, e))?;

    let total = collection.features.len();
    let mut boundaries = Vec::with_capacity(total);
    let mut file_ids = HashSet::new();

    for (index, feature) in collection.features.into_iter().enumerate() {
        match AdminBoundary::from_feature(feature, file.level, file.country.as_deref()) {
            Ok(boundary) => {
                if file_ids.insert(boundary.id().to_string()) {
                    boundaries.push(boundary);
                } else {
                    warn!(
                        "Skipping feature {} in {}: duplicate _id {}",
                        index,
                        file.path.display(),
                        boundary.id()
                    );
                }
            }
            Err(e) => warn!("Skipping feature {} in {}: {}", index, file.path.display(), e),
        }
    }

    info!(
        "Parsed {}/{} features from {}",
        boundaries.len(),
        total,
        file.path.display()
    );

    Ok(boundaries)
}
