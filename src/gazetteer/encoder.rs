//! Forward geocoding of identifier strings.

use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use super::Gazetteer;
use crate::models::{IdentifierType, RegionRecord};

/// Distinct values split by whether they resolve under a scheme
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matches {
    pub matched: Vec<String>,
    pub unmatched: Vec<String>,
}

/// Encodes identifier strings into region records with a chosen scheme
#[derive(Clone, Copy)]
pub struct IdentifierEncoder<'g> {
    gazetteer: &'g Gazetteer,
}

impl<'g> IdentifierEncoder<'g> {
    pub fn new(gazetteer: &'g Gazetteer) -> Self {
        Self { gazetteer }
    }

    /// Resolve one value: alias substitution, then exact lookup
    pub fn encode_one(&self, value: &str, ty: IdentifierType) -> RegionRecord {
        let key = self.gazetteer.canonical(ty, value);
        self.gazetteer.lookup(ty, &key)
    }

    /// Resolve every value; unmatched values become [`RegionRecord::Null`]
    pub fn encode<S: AsRef<str>>(&self, values: &[S], ty: IdentifierType) -> Vec<RegionRecord> {
        debug!("Geocoding {} values as {}", values.len(), ty);
        values
            .iter()
            .map(|value| self.encode_one(value.as_ref(), ty))
            .collect()
    }

    /// Like [`encode`](Self::encode), substituting caller-supplied
    /// replacements for values first
    pub fn encode_with_replacements<S: AsRef<str>>(
        &self,
        values: &[S],
        ty: IdentifierType,
        replacements: &HashMap<String, String>,
    ) -> Vec<RegionRecord> {
        values
            .iter()
            .map(|value| {
                let value = value.as_ref();
                let value = replacements
                    .get(value)
                    .filter(|r| !r.is_empty())
                    .map_or(value, String::as_str);
                self.encode_one(value, ty)
            })
            .collect()
    }

    /// Distinct non-empty values, sorted, partitioned into matched and unmatched
    pub fn partition<S: AsRef<str>>(&self, values: &[S], ty: IdentifierType) -> Matches {
        let distinct: BTreeSet<&str> = values
            .iter()
            .map(|v| v.as_ref())
            .filter(|v| !v.trim().is_empty())
            .collect();

        let (matched, unmatched): (Vec<&str>, Vec<&str>) = distinct
            .into_iter()
            .partition(|value| !self.encode_one(value, ty).is_null());

        Matches {
            matched: matched.into_iter().map(str::to_string).collect(),
            unmatched: unmatched.into_iter().map(str::to_string).collect(),
        }
    }

    /// All keys recognized by `ty`, sorted
    pub fn valid_values(&self, ty: IdentifierType) -> Vec<String> {
        self.gazetteer.valid_values(ty)
    }
}
