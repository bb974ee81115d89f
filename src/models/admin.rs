//! Administrative level of a boundary.

use serde::{Deserialize, Serialize};

use crate::error::GeoError;

/// Granularity of a political boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AdminLevel {
    /// Country (admin0)
    Country,
    /// State / province / region (admin1)
    Subdivision1,
    /// County / district (admin2)
    Subdivision2,
}

impl AdminLevel {
    /// Get the numeric admin level used in corpus file names
    pub fn as_u8(&self) -> u8 {
        match self {
            AdminLevel::Country => 0,
            AdminLevel::Subdivision1 => 1,
            AdminLevel::Subdivision2 => 2,
        }
    }

    /// Get all admin levels in hierarchical order (country first)
    pub fn all() -> &'static [AdminLevel] {
        &[
            AdminLevel::Country,
            AdminLevel::Subdivision1,
            AdminLevel::Subdivision2,
        ]
    }

    /// Level whose spatial index answers queries for this level.
    ///
    /// Countries are resolved through their subdivisions, so only two
    /// boundary sets are ever spatially indexed.
    pub fn index_level(&self) -> AdminLevel {
        match self {
            AdminLevel::Country => AdminLevel::Subdivision1,
            other => *other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AdminLevel::Country => "country",
            AdminLevel::Subdivision1 => "1st-level subdivision",
            AdminLevel::Subdivision2 => "2nd-level subdivision",
        }
    }
}

impl TryFrom<u8> for AdminLevel {
    type Error = GeoError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(AdminLevel::Country),
            1 => Ok(AdminLevel::Subdivision1),
            2 => Ok(AdminLevel::Subdivision2),
            other => Err(GeoError::InvalidLevel(other)),
        }
    }
}

impl std::fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "admin{}", self.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_round_trip() {
        for level in AdminLevel::all() {
            assert_eq!(AdminLevel::try_from(level.as_u8()).unwrap(), *level);
        }
    }

    #[test]
    fn test_out_of_range_level() {
        assert!(matches!(
            AdminLevel::try_from(3),
            Err(GeoError::InvalidLevel(3))
        ));
    }

    #[test]
    fn test_country_resolves_through_subdivisions() {
        assert_eq!(AdminLevel::Country.index_level(), AdminLevel::Subdivision1);
        assert_eq!(
            AdminLevel::Subdivision2.index_level(),
            AdminLevel::Subdivision2
        );
        assert_eq!(AdminLevel::Subdivision2.to_string(), "admin2");
    }
}
