//! Identifier schemes understood by forward geocoding.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Scheme a column of region identifiers is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum IdentifierType {
    CountryName,
    Iso2,
    Iso3,
    RegionName,
    Fips,
    Hasc,
    UsState,
    CityEurope,
    CityUs,
    CityWorld,
}

impl IdentifierType {
    /// All schemes, in declaration order
    pub fn all() -> &'static [IdentifierType] {
        &[
            IdentifierType::CountryName,
            IdentifierType::Iso2,
            IdentifierType::Iso3,
            IdentifierType::RegionName,
            IdentifierType::Fips,
            IdentifierType::Hasc,
            IdentifierType::UsState,
            IdentifierType::CityEurope,
            IdentifierType::CityUs,
            IdentifierType::CityWorld,
        ]
    }

    /// Order in which schemes are tried during auto-detection.
    ///
    /// Fixed-width codes go first; the first scheme matching half the sample wins.
    pub fn detection_order() -> &'static [IdentifierType] {
        &[
            IdentifierType::Iso2,
            IdentifierType::Iso3,
            IdentifierType::CountryName,
            IdentifierType::UsState,
            IdentifierType::CityEurope,
            IdentifierType::CityUs,
            IdentifierType::CityWorld,
            IdentifierType::RegionName,
            IdentifierType::Fips,
            IdentifierType::Hasc,
        ]
    }

    /// Admissible value lengths for fixed-width code schemes
    pub fn code_lengths(&self) -> Option<&'static [usize]> {
        match self {
            IdentifierType::Iso2 => Some(&[2]),
            IdentifierType::Iso3 => Some(&[3]),
            IdentifierType::Fips | IdentifierType::Hasc => Some(&[2, 5, 8]),
            _ => None,
        }
    }

    pub fn is_city(&self) -> bool {
        matches!(
            self,
            IdentifierType::CityEurope | IdentifierType::CityUs | IdentifierType::CityWorld
        )
    }

    /// Short name used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierType::CountryName => "country-name",
            IdentifierType::Iso2 => "iso2",
            IdentifierType::Iso3 => "iso3",
            IdentifierType::RegionName => "region-name",
            IdentifierType::Fips => "fips",
            IdentifierType::Hasc => "hasc",
            IdentifierType::UsState => "us-state",
            IdentifierType::CityEurope => "city-europe",
            IdentifierType::CityUs => "city-us",
            IdentifierType::CityWorld => "city-world",
        }
    }

    /// Human-readable description
    pub fn label(&self) -> &'static str {
        match self {
            IdentifierType::CountryName => "Country name",
            IdentifierType::Iso2 => "ISO 3166-1 alpha-2 country code",
            IdentifierType::Iso3 => "ISO 3166-1 alpha-3 country code",
            IdentifierType::RegionName => "Region name",
            IdentifierType::Fips => "FIPS code",
            IdentifierType::Hasc => "HASC code",
            IdentifierType::UsState => "US state (name or abbr.)",
            IdentifierType::CityEurope => "Major city (Europe)",
            IdentifierType::CityUs => "Major city (US)",
            IdentifierType::CityWorld => "Major city (World)",
        }
    }
}

impl std::fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentifierType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        IdentifierType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = IdentifierType::all().iter().map(|t| t.as_str()).collect();
                format!("unknown identifier type '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("iso3".parse::<IdentifierType>(), Ok(IdentifierType::Iso3));
        assert_eq!(
            "US_STATE".parse::<IdentifierType>(),
            Ok(IdentifierType::UsState)
        );
        assert!("zip".parse::<IdentifierType>().is_err());
    }

    #[test]
    fn test_detection_order_covers_every_scheme() {
        let mut order = IdentifierType::detection_order().to_vec();
        order.sort();
        let mut all = IdentifierType::all().to_vec();
        all.sort();
        assert_eq!(order, all);
        assert_eq!(IdentifierType::detection_order()[0], IdentifierType::Iso2);
    }

    #[test]
    fn test_code_lengths() {
        assert_eq!(IdentifierType::Hasc.code_lengths(), Some(&[2, 5, 8][..]));
        assert_eq!(IdentifierType::CountryName.code_lengths(), None);
    }
}
