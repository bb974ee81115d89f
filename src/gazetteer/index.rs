//! Reverse lookup tables from identifier properties to region records.

use hashbrown::HashMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

use super::{normalize_key, AliasTables};
use crate::models::{AdminLevel, IdentifierType, Region, RegionRecord};
use crate::pip::{AdminBoundary, BoundaryCorpus};

/// Lookup table of one identifier scheme
#[derive(Debug, Default)]
struct Table {
    by_key: HashMap<String, Arc<Region>>,
    /// Keys as written in the corpus
    display: BTreeSet<String>,
}

impl Table {
    /// Add `region` under `key`; the first region registered for a key wins
    fn insert(&mut self, key: &str, region: &Arc<Region>) {
        let normalized = normalize_key(key);
        if normalized.is_empty() {
            return;
        }
        if self.by_key.contains_key(&normalized) {
            return;
        }
        self.by_key.insert(normalized, Arc::clone(region));
        self.display.insert(key.trim().to_string());
    }

    fn insert_properties(&mut self, boundaries: &[Arc<AdminBoundary>], properties: &[&str]) {
        for boundary in boundaries {
            for property in properties {
                if let Some(value) = boundary.region.property_str(property) {
                    self.insert(value, &boundary.region);
                }
            }
        }
    }
}

/// Region properties indexed by each identifier scheme
fn scheme_properties(ty: IdentifierType) -> &'static [&'static str] {
    match ty {
        IdentifierType::CountryName => &["name", "name_long", "admin", "formal_en"],
        IdentifierType::Iso2 => &["iso_a2"],
        IdentifierType::Iso3 => &["iso_a3", "adm0_a3"],
        IdentifierType::RegionName => &["name"],
        IdentifierType::Fips => &["fips"],
        IdentifierType::Hasc => &["hasc"],
        IdentifierType::UsState => &["name", "postal"],
        IdentifierType::CityEurope | IdentifierType::CityUs | IdentifierType::CityWorld => &[],
    }
}

/// Gazetteer over the loaded corpus: one reverse map per identifier scheme,
/// plus the alias tables applied before lookup.
#[derive(Debug)]
pub struct Gazetteer {
    tables: HashMap<IdentifierType, Table>,
    aliases: AliasTables,
}

impl Gazetteer {
    pub fn build(corpus: &BoundaryCorpus, mut aliases: AliasTables) -> Self {
        // A pattern for an unknown region would shadow later matching ones
        aliases.retain_cities(|id| corpus.by_id(id).is_some());
        let mut tables = HashMap::new();

        for &ty in IdentifierType::all() {
            let mut table = Table::default();
            let properties = scheme_properties(ty);

            match ty {
                IdentifierType::CountryName | IdentifierType::Iso2 | IdentifierType::Iso3 => {
                    table.insert_properties(corpus.boundaries(AdminLevel::Country), properties);
                }
                IdentifierType::RegionName | IdentifierType::Fips | IdentifierType::Hasc => {
                    table.insert_properties(
                        corpus.boundaries(AdminLevel::Subdivision1),
                        properties,
                    );
                    table.insert_properties(
                        corpus.boundaries(AdminLevel::Subdivision2),
                        properties,
                    );
                }
                IdentifierType::UsState => {
                    let states: Vec<Arc<AdminBoundary>> = corpus
                        .boundaries(AdminLevel::Subdivision1)
                        .iter()
                        .filter(|b| b.country_code() == "USA")
                        .cloned()
                        .collect();
                    table.insert_properties(&states, properties);
                }
                IdentifierType::CityEurope | IdentifierType::CityUs | IdentifierType::CityWorld => {
                    for city in aliases.cities(ty) {
                        if let Some(boundary) = corpus.by_id(&city.id) {
                            table
                                .by_key
                                .entry(normalize_key(&city.id))
                                .or_insert_with(|| Arc::clone(&boundary.region));
                            table.display.insert(city.name.trim().to_string());
                        }
                    }
                }
            }

            debug!("Gazetteer table {}: {} keys", ty, table.by_key.len());
            tables.insert(ty, table);
        }

        info!(
            "Gazetteer built: {} countries by name, {} regions by name, {} US states",
            tables
                .get(&IdentifierType::CountryName)
                .map_or(0, |t| t.by_key.len()),
            tables
                .get(&IdentifierType::RegionName)
                .map_or(0, |t| t.by_key.len()),
            tables.get(&IdentifierType::UsState).map_or(0, |t| t.by_key.len()),
        );

        Self { tables, aliases }
    }

    /// Exact lookup of an already canonical key (normalization still applies)
    pub fn lookup(&self, ty: IdentifierType, key: &str) -> RegionRecord {
        self.tables
            .get(&ty)
            .and_then(|table| table.by_key.get(&normalize_key(key)))
            .map(|region| RegionRecord::from(Arc::clone(region)))
            .unwrap_or_default()
    }

    /// Canonical lookup key of a raw value, after alias substitution
    pub fn canonical(&self, ty: IdentifierType, value: &str) -> String {
        self.aliases.canonical(ty, value)
    }

    /// Every key recognized by a scheme, as written, sorted
    pub fn valid_values(&self, ty: IdentifierType) -> Vec<String> {
        let Some(table) = self.tables.get(&ty) else {
            return Vec::new();
        };
        let mut values = table.display.clone();
        for (synonym, canonical) in self.aliases.synonym_pairs(ty) {
            if table.by_key.contains_key(&normalize_key(canonical)) {
                values.insert(synonym.to_string());
            }
        }
        values.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gazetteer::aliases::{AliasFile, CityEntry};
    use serde_json::{json, Value};
    use std::fs;
    use std::path::Path;

    fn feature(x0: f64, properties: Value) -> Value {
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[x0, 0.0], [x0 + 1.0, 0.0], [x0 + 1.0, 1.0], [x0, 1.0], [x0, 0.0]]]
            },
            "properties": properties
        })
    }

    fn write(dir: &Path, name: &str, features: Vec<Value>) {
        let collection = json!({"type": "FeatureCollection", "features": features});
        fs::write(dir.join(name), collection.to_string()).unwrap();
    }

    fn corpus() -> BoundaryCorpus {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "admin0.json",
            vec![
                feature(0.0, json!({"_id": "USA", "adm0_a3": "USA", "name": "United States of America", "iso_a2": "US", "iso_a3": "USA"})),
                feature(2.0, json!({"_id": "SVN", "adm0_a3": "SVN", "name": "Slovenia", "iso_a2": "SI", "iso_a3": "SVN"})),
                feature(4.0, json!({"_id": "KOS", "adm0_a3": "KOS", "name": "Kosovo", "iso_a2": null, "iso_a3": "-99"})),
            ],
        );
        write(
            dir.path(),
            "admin1.json",
            vec![
                feature(0.0, json!({"_id": "USA-3559", "adm0_a3": "USA", "name": "New York", "postal": "NY", "fips": "US36", "hasc": "US.NY"})),
                feature(2.0, json!({"_id": "SVN-962", "adm0_a3": "SVN", "name": "Ljubljana", "fips": "SI61", "hasc": "SI.LJ"})),
            ],
        );
        BoundaryCorpus::load(dir.path()).unwrap()
    }

    fn gazetteer() -> Gazetteer {
        let mut aliases = AliasTables::builtin();
        let mut file = AliasFile::default();
        file.cities_europe = vec![
            CityEntry {
                name: "Emona".into(),
                pattern: Some("^(emona|ljubljana)$".into()),
                id: "EMO-1".into(),
            },
            CityEntry {
                name: "Ljubljana".into(),
                pattern: None,
                id: "SVN-962".into(),
            },
            CityEntry {
                name: "Atlantis".into(),
                pattern: None,
                id: "ATL-1".into(),
            },
        ];
        aliases.merge(file);
        Gazetteer::build(&corpus(), aliases)
    }

    #[test]
    fn test_lookup_by_code_and_name() {
        let gazetteer = gazetteer();
        assert_eq!(gazetteer.lookup(IdentifierType::Iso2, "si").id(), Some("SVN"));
        assert_eq!(gazetteer.lookup(IdentifierType::Iso3, "USA").id(), Some("USA"));
        assert_eq!(
            gazetteer.lookup(IdentifierType::CountryName, "slovenia").id(),
            Some("SVN")
        );
        assert_eq!(
            gazetteer.lookup(IdentifierType::Hasc, "US.NY").id(),
            Some("USA-3559")
        );
        assert_eq!(gazetteer.lookup(IdentifierType::UsState, "ny").id(), Some("USA-3559"));
        assert!(gazetteer.lookup(IdentifierType::UsState, "Ljubljana").is_null());
        assert!(gazetteer.lookup(IdentifierType::Iso2, "XX").is_null());
    }

    #[test]
    fn test_adm0_a3_backs_up_iso3() {
        let gazetteer = gazetteer();
        assert_eq!(gazetteer.lookup(IdentifierType::Iso3, "KOS").id(), Some("KOS"));
        assert_eq!(gazetteer.lookup(IdentifierType::Iso3, "-99").id(), Some("KOS"));
    }

    #[test]
    fn test_city_table_only_holds_known_regions() {
        let gazetteer = gazetteer();
        let key = gazetteer.canonical(IdentifierType::CityEurope, "Ljubljana");
        assert_eq!(
            gazetteer.lookup(IdentifierType::CityEurope, &key).id(),
            Some("SVN-962")
        );
        assert_eq!(
            gazetteer.valid_values(IdentifierType::CityEurope),
            vec!["Ljubljana".to_string()]
        );
    }

    #[test]
    fn test_unknown_city_pattern_does_not_shadow_later_ones() {
        let gazetteer = gazetteer();
        // "Emona" is listed first and matches Ljubljana too, but its region
        // is not in the corpus
        assert_eq!(
            gazetteer.canonical(IdentifierType::CityEurope, "Ljubljana"),
            normalize_key("SVN-962")
        );
        assert_eq!(
            gazetteer.canonical(IdentifierType::CityEurope, "Emona"),
            normalize_key("Emona")
        );
        assert!(gazetteer
            .lookup(IdentifierType::CityEurope, "Emona")
            .is_null());
    }

    #[test]
    fn test_valid_values_include_resolvable_synonyms() {
        let gazetteer = gazetteer();
        let values = gazetteer.valid_values(IdentifierType::CountryName);
        assert!(values.contains(&"Slovenia".to_string()));
        assert!(values.contains(&"USA".to_string()));
        // Synonym whose canonical country is not in the corpus
        assert!(!values.contains(&"UK".to_string()));

        let mut sorted = values.clone();
        sorted.sort();
        assert_eq!(values, sorted);

        assert_eq!(
            gazetteer.valid_values(IdentifierType::Iso2),
            vec!["SI".to_string(), "US".to_string()]
        );
    }
}
