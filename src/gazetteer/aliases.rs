//! Synonym tables applied to identifiers before gazetteer lookup.
//!
//! Built-in tables cover common country, region and US state synonyms. A
//! corpus may ship an `aliases.json` next to its boundary files to add more,
//! together with the curated city tables.

use anyhow::Context;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::normalize_key;
use crate::error::{GeoError, Result};
use crate::models::IdentifierType;

/// Name of the alias file inside the corpus directory
pub const ALIAS_FILE: &str = "aliases.json";

const COUNTRY_SYNONYMS: &[(&str, &str)] = &[
    ("USA", "United States of America"),
    ("US", "United States of America"),
    ("U.S.", "United States of America"),
    ("U.S.A.", "United States of America"),
    ("United States", "United States of America"),
    ("America", "United States of America"),
    ("UK", "United Kingdom"),
    ("U.K.", "United Kingdom"),
    ("Great Britain", "United Kingdom"),
    ("Britain", "United Kingdom"),
    ("England", "United Kingdom"),
    ("Russian Federation", "Russia"),
    ("Czech Republic", "Czechia"),
    ("Republic of Korea", "South Korea"),
    ("Korea, Republic of", "South Korea"),
    ("Korea, Rep.", "South Korea"),
    ("Korea", "South Korea"),
    ("Democratic People's Republic of Korea", "North Korea"),
    ("Korea, Dem. Rep.", "North Korea"),
    ("Democratic Republic of the Congo", "Dem. Rep. Congo"),
    ("Congo, Dem. Rep.", "Dem. Rep. Congo"),
    ("DR Congo", "Dem. Rep. Congo"),
    ("Republic of the Congo", "Congo"),
    ("Congo, Rep.", "Congo"),
    ("Ivory Coast", "Côte d'Ivoire"),
    ("Cote d'Ivoire", "Côte d'Ivoire"),
    ("Bosnia and Herzegovina", "Bosnia and Herz."),
    ("Central African Republic", "Central African Rep."),
    ("Dominican Republic", "Dominican Rep."),
    ("Equatorial Guinea", "Eq. Guinea"),
    ("South Sudan", "S. Sudan"),
    ("Solomon Islands", "Solomon Is."),
    ("Macedonia", "North Macedonia"),
    ("FYR Macedonia", "North Macedonia"),
    ("Burma", "Myanmar"),
    ("Swaziland", "eSwatini"),
    ("Eswatini", "eSwatini"),
    ("Holland", "Netherlands"),
    ("The Netherlands", "Netherlands"),
    ("Viet Nam", "Vietnam"),
    ("Lao PDR", "Laos"),
    ("Iran, Islamic Rep.", "Iran"),
    ("Egypt, Arab Rep.", "Egypt"),
    ("Syrian Arab Republic", "Syria"),
    ("Venezuela, RB", "Venezuela"),
    ("Yemen, Rep.", "Yemen"),
    ("Kyrgyz Republic", "Kyrgyzstan"),
    ("Slovak Republic", "Slovakia"),
    ("Gambia, The", "Gambia"),
    ("Bahamas, The", "Bahamas"),
    ("East Timor", "Timor-Leste"),
    ("Turkiye", "Turkey"),
    ("Türkiye", "Turkey"),
];

const REGION_SYNONYMS: &[(&str, &str)] = &[
    ("Tibet", "Xizang"),
    ("Quebec", "Québec"),
    ("Bavaria", "Bayern"),
    ("Lower Saxony", "Niedersachsen"),
    ("North Rhine-Westphalia", "Nordrhein-Westfalen"),
    ("Saxony", "Sachsen"),
    ("Tuscany", "Toscana"),
    ("Lombardy", "Lombardia"),
    ("Sicily", "Sicilia"),
    ("Sardinia", "Sardegna"),
    ("Piedmont", "Piemonte"),
    ("Catalonia", "Cataluña"),
    ("Andalusia", "Andalucía"),
    ("Brittany", "Bretagne"),
    ("Carinthia", "Kärnten"),
    ("Styria", "Steiermark"),
];

const US_STATE_SYNONYMS: &[(&str, &str)] = &[
    ("Washington DC", "District of Columbia"),
    ("Washington D.C.", "District of Columbia"),
    ("D.C.", "District of Columbia"),
    ("Ala.", "Alabama"),
    ("Ariz.", "Arizona"),
    ("Ark.", "Arkansas"),
    ("Calif.", "California"),
    ("Colo.", "Colorado"),
    ("Conn.", "Connecticut"),
    ("Del.", "Delaware"),
    ("Fla.", "Florida"),
    ("Ga.", "Georgia"),
    ("Ill.", "Illinois"),
    ("Ind.", "Indiana"),
    ("Kan.", "Kansas"),
    ("Ky.", "Kentucky"),
    ("La.", "Louisiana"),
    ("Md.", "Maryland"),
    ("Mass.", "Massachusetts"),
    ("Mich.", "Michigan"),
    ("Minn.", "Minnesota"),
    ("Miss.", "Mississippi"),
    ("Mo.", "Missouri"),
    ("Mont.", "Montana"),
    ("Neb.", "Nebraska"),
    ("Nev.", "Nevada"),
    ("N.H.", "New Hampshire"),
    ("N.J.", "New Jersey"),
    ("N.M.", "New Mexico"),
    ("N.Y.", "New York"),
    ("N.C.", "North Carolina"),
    ("N.D.", "North Dakota"),
    ("Okla.", "Oklahoma"),
    ("Ore.", "Oregon"),
    ("Pa.", "Pennsylvania"),
    ("Penn.", "Pennsylvania"),
    ("R.I.", "Rhode Island"),
    ("S.C.", "South Carolina"),
    ("S.D.", "South Dakota"),
    ("Tenn.", "Tennessee"),
    ("Tex.", "Texas"),
    ("Vt.", "Vermont"),
    ("Va.", "Virginia"),
    ("Wash.", "Washington"),
    ("W.Va.", "West Virginia"),
    ("Wis.", "Wisconsin"),
    ("Wyo.", "Wyoming"),
];

/// One curated city: values matching `pattern` resolve to region `id`
#[derive(Debug, Clone, Deserialize)]
pub struct CityEntry {
    pub name: String,
    #[serde(default)]
    pub pattern: Option<String>,
    pub id: String,
}

/// Contents of `aliases.json`; every section is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AliasFile {
    pub country_names: HashMap<String, String>,
    pub region_names: HashMap<String, String>,
    pub us_states: HashMap<String, String>,
    pub cities_europe: Vec<CityEntry>,
    pub cities_us: Vec<CityEntry>,
    pub cities_world: Vec<CityEntry>,
}

/// A compiled city pattern
#[derive(Debug, Clone)]
pub struct CityPattern {
    pub name: String,
    pub id: String,
    regex: Regex,
}

impl CityPattern {
    fn compile(entry: CityEntry) -> std::result::Result<Self, regex::Error> {
        let pattern = entry
            .pattern
            .unwrap_or_else(|| format!("^{}$", regex::escape(entry.name.trim())));
        Ok(Self {
            regex: Regex::new(&format!("(?i){}", pattern))?,
            name: entry.name,
            id: entry.id,
        })
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value.trim())
    }
}

/// Synonym mapping: normalized synonym -> (synonym as written, canonical key)
type SynonymMap = HashMap<String, (String, String)>;

/// Alias tables for every identifier scheme
#[derive(Debug, Clone, Default)]
pub struct AliasTables {
    country_names: SynonymMap,
    region_names: SynonymMap,
    us_states: SynonymMap,
    cities_europe: Vec<CityPattern>,
    cities_us: Vec<CityPattern>,
    cities_world: Vec<CityPattern>,
}

impl AliasTables {
    /// Built-in synonym tables, no cities
    pub fn builtin() -> Self {
        let mut tables = Self::default();
        extend(&mut tables.country_names, COUNTRY_SYNONYMS.iter().copied());
        extend(&mut tables.region_names, REGION_SYNONYMS.iter().copied());
        extend(&mut tables.us_states, US_STATE_SYNONYMS.iter().copied());
        tables
    }

    /// Built-in tables extended with the corpus directory's alias file.
    ///
    /// A missing alias file only logs a warning; an unreadable one is fatal.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let mut tables = Self::builtin();
        let path = dir.join(ALIAS_FILE);

        if !path.is_file() {
            warn!(
                "Alias file not found: {}, using built-in synonyms only",
                path.display()
            );
            return Ok(tables);
        }

        let file = fs::read_to_string(&path)
            .context("Failed to read alias file")
            .and_then(|content| {
                serde_json::from_str::<AliasFile>(&content).context("Failed to parse alias file")
            })
            .map_err(|e| GeoError::corpus_file(&path, format!("{:#}", e)))?;

        tables.merge(file);
        info!(
            "Loaded aliases from {}: {} country, {} region, {} US state synonyms, {} cities",
            path.display(),
            tables.country_names.len(),
            tables.region_names.len(),
            tables.us_states.len(),
            tables.cities_europe.len() + tables.cities_us.len() + tables.cities_world.len()
        );
        Ok(tables)
    }

    /// Add the entries of an alias file; later entries override earlier ones
    pub fn merge(&mut self, file: AliasFile) {
        extend(
            &mut self.country_names,
            file.country_names.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
        extend(
            &mut self.region_names,
            file.region_names.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
        extend(
            &mut self.us_states,
            file.us_states.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
        compile_cities(&mut self.cities_europe, file.cities_europe);
        compile_cities(&mut self.cities_us, file.cities_us);
        compile_cities(&mut self.cities_world, file.cities_world);
    }

    fn synonyms(&self, ty: IdentifierType) -> Option<&SynonymMap> {
        match ty {
            IdentifierType::CountryName => Some(&self.country_names),
            IdentifierType::RegionName => Some(&self.region_names),
            IdentifierType::UsState => Some(&self.us_states),
            _ => None,
        }
    }

    /// Curated city table of a city scheme
    pub fn cities(&self, ty: IdentifierType) -> &[CityPattern] {
        match ty {
            IdentifierType::CityEurope => &self.cities_europe,
            IdentifierType::CityUs => &self.cities_us,
            IdentifierType::CityWorld => &self.cities_world,
            _ => &[],
        }
    }

    /// Drop city patterns whose region id fails `known`
    pub fn retain_cities(&mut self, known: impl Fn(&str) -> bool) {
        for table in [
            &mut self.cities_europe,
            &mut self.cities_us,
            &mut self.cities_world,
        ] {
            table.retain(|city| {
                let keep = known(&city.id);
                if !keep {
                    debug!(
                        "City alias '{}' points at unknown region {}",
                        city.name, city.id
                    );
                }
                keep
            });
        }
    }

    /// Normalized lookup key for `value` under `ty`.
    ///
    /// Synonyms are replaced by their canonical key; city names are replaced
    /// by the id of the first matching pattern.
    pub fn canonical(&self, ty: IdentifierType, value: &str) -> String {
        if ty.is_city() {
            return self
                .cities(ty)
                .iter()
                .find(|city| city.is_match(value))
                .map(|city| normalize_key(&city.id))
                .unwrap_or_else(|| normalize_key(value));
        }

        let key = normalize_key(value);
        match self.synonyms(ty).and_then(|map| map.get(&key)) {
            Some((_, canonical)) => normalize_key(canonical),
            None => key,
        }
    }

    /// Synonyms of `ty` as written, paired with their canonical key
    pub fn synonym_pairs(&self, ty: IdentifierType) -> impl Iterator<Item = (&str, &str)> {
        self.synonyms(ty)
            .into_iter()
            .flat_map(|map| map.values())
            .map(|(written, canonical)| (written.as_str(), canonical.as_str()))
    }
}

fn extend<'a>(map: &mut SynonymMap, pairs: impl Iterator<Item = (&'a str, &'a str)>) {
    for (synonym, canonical) in pairs {
        let key = normalize_key(synonym);
        if key.is_empty() || key == normalize_key(canonical) {
            continue;
        }
        map.insert(key, (synonym.trim().to_string(), canonical.trim().to_string()));
    }
}

fn compile_cities(table: &mut Vec<CityPattern>, entries: Vec<CityEntry>) {
    for entry in entries {
        let name = entry.name.clone();
        match CityPattern::compile(entry) {
            Ok(city) => table.push(city),
            Err(e) => warn!("Skipping city alias '{}': {}", name, e),
        }
    }
}
