//! Forward geocoding: identifier strings to region records.
//!
//! The gazetteer maps names and codes found in the corpus properties back to
//! their regions. Alias tables normalize synonyms and city names first.

pub mod aliases;
mod detect;
mod encoder;
mod index;

pub use aliases::{AliasFile, AliasTables, CityEntry, ALIAS_FILE};
pub use detect::{SchemeDetector, DEFAULT_SAMPLE_SIZE};
pub use encoder::{IdentifierEncoder, Matches};
pub use index::Gazetteer;

/// Lookup key form of an identifier: trimmed, inner whitespace collapsed,
/// lower-cased
pub fn normalize_key(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IdentifierType;
    use crate::test_support::fixture_index;
    use std::collections::HashMap;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  New   York "), "new york");
        assert_eq!(normalize_key("US.NY"), "us.ny");
        assert_eq!(normalize_key("\t"), "");
    }

    #[test]
    fn test_encode_preserves_length_and_order() {
        let index = fixture_index();
        let encoder = IdentifierEncoder::new(index.gazetteer());
        let out = encoder.encode(&["ita", "Narnia", "SWE", ""], IdentifierType::Iso3);
        let ids: Vec<Option<&str>> = out.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![Some("ITA"), None, Some("SWE"), None]);
    }

    #[test]
    fn test_encoded_records_carry_coordinates() {
        let index = fixture_index();
        let encoder = IdentifierEncoder::new(index.gazetteer());
        let record = encoder.encode_one("SVN", IdentifierType::Iso3);
        assert_eq!(record.get("latitude").and_then(|v| v.as_f64()), Some(46.15));
        assert_eq!(record.get("longitude").and_then(|v| v.as_f64()), Some(14.99));
    }

    #[test]
    fn test_aliases_apply_before_lookup() {
        let index = fixture_index();
        let encoder = IdentifierEncoder::new(index.gazetteer());
        assert_eq!(
            encoder.encode_one("U.S.A.", IdentifierType::CountryName).id(),
            Some("USA")
        );
        assert_eq!(
            encoder.encode_one("Tex.", IdentifierType::UsState).id(),
            Some("USA-3536")
        );
        assert_eq!(
            encoder.encode_one("Big Apple", IdentifierType::CityUs).id(),
            Some("USA-NY-36061")
        );
    }

    #[test]
    fn test_replacements_and_partition() {
        let index = fixture_index();
        let encoder = IdentifierEncoder::new(index.gazetteer());
        let values = ["Slovenija", "Italy", "Slovenija", "Atlantis", ""];

        let matches = encoder.partition(&values, IdentifierType::CountryName);
        assert_eq!(matches.matched, vec!["Italy".to_string()]);
        assert_eq!(
            matches.unmatched,
            vec!["Atlantis".to_string(), "Slovenija".to_string()]
        );

        let replacements = HashMap::from([("Slovenija".to_string(), "Slovenia".to_string())]);
        let out =
            encoder.encode_with_replacements(&values, IdentifierType::CountryName, &replacements);
        let ids: Vec<Option<&str>> = out.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![Some("SVN"), Some("ITA"), Some("SVN"), None, None]);
    }

    #[test]
    fn test_detect_priority_and_threshold() {
        let index = fixture_index();
        let detector = SchemeDetector::new(IdentifierEncoder::new(index.gazetteer()), 200);

        assert_eq!(detector.detect(&["SI", "IT", "SE"]), Some(IdentifierType::Iso2));
        assert_eq!(detector.detect(&["SVN", "ITA", "XYZ"]), Some(IdentifierType::Iso3));
        assert_eq!(
            detector.detect(&["Slovenia", "Italy", "Narnia", "Atlantis"]),
            Some(IdentifierType::CountryName)
        );
        assert_eq!(
            detector.detect(&["Texas", "New York", "NY"]),
            Some(IdentifierType::UsState)
        );
        assert_eq!(
            detector.detect(&["Ljubljana", "Krasnoyarsk", "Québec"]),
            Some(IdentifierType::RegionName)
        );
        // One in three is below half
        assert_eq!(detector.detect(&["Slovenia", "Narnia", "Atlantis"]), None);
        assert_eq!(detector.detect::<&str>(&[]), None);
        assert_eq!(detector.detect(&["", "nan"]), None);
    }

    #[test]
    fn test_detect_gates_fixed_width_codes() {
        let index = fixture_index();
        let detector = SchemeDetector::new(IdentifierEncoder::new(index.gazetteer()), 200);
        // HASC codes: too long for ISO, lengths 5 and 8 pass the gate
        assert_eq!(
            detector.detect(&["US.NY", "US.TX", "US.NY.NE"]),
            Some(IdentifierType::Hasc)
        );
    }

    #[test]
    fn test_detect_tolerates_values_of_other_lengths() {
        let index = fixture_index();
        let detector = SchemeDetector::new(IdentifierEncoder::new(index.gazetteer()), 200);
        assert_eq!(
            detector.detect(&["SI", "IT", "SE", "Sweden"]),
            Some(IdentifierType::Iso2)
        );
        assert_eq!(
            detector.detect(&["SVN", "ITA", "SWE", "USA", "Narnia"]),
            Some(IdentifierType::Iso3)
        );
        // Two codes out of five stay below half
        assert_eq!(
            detector.detect(&["SI", "IT", "Narnia", "Atlantis", "Lilliput"]),
            None
        );
    }
}
