//! Latitude/longitude column inference for tabular input.

const LATITUDE_PREFIXES: &[&str] = &["latitude", "lat"];
const LONGITUDE_PREFIXES: &[&str] = &["longitude", "lng", "long", "lon"];

/// A numeric column of a table
#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub name: String,
    pub values: Vec<f64>,
}

impl NumericColumn {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    fn name_starts_with(&self, prefixes: &[&str]) -> bool {
        let name = self.name.to_lowercase();
        prefixes.iter().any(|p| name.starts_with(p))
    }

    /// Largest absolute value, ignoring NaN; 0 for an empty column
    fn max_abs(&self) -> f64 {
        self.values
            .iter()
            .filter(|v| !v.is_nan())
            .fold(0.0, |max, v| max.max(v.abs()))
    }
}

/// Guess which of `columns` hold latitude and longitude.
///
/// Named columns win. With exactly two columns, one named column picks its
/// partner, otherwise value ranges decide: a column within ±90 next to one
/// exceeding it reads as latitude, longitude. When nothing identifies the
/// pair among more than two columns, the first column is returned for both
/// so the caller can tell the choice needs to be made by hand.
pub fn find_lat_lon(columns: &[NumericColumn]) -> (Option<usize>, Option<usize>) {
    if columns.len() < 2 {
        return (None, None);
    }

    let lat = columns
        .iter()
        .position(|c| c.name_starts_with(LATITUDE_PREFIXES));
    let lon = columns
        .iter()
        .position(|c| c.name_starts_with(LONGITUDE_PREFIXES));

    if let (Some(lat), Some(lon)) = (lat, lon) {
        return (Some(lat), Some(lon));
    }

    if columns.len() > 2 {
        return (Some(0), Some(0));
    }

    match (lat, lon) {
        (Some(lat), None) => (Some(lat), Some(1 - lat)),
        (None, Some(lon)) => (Some(1 - lon), Some(lon)),
        _ => {
            let (lat, lon) = [(1, 0), (0, 1)]
                .into_iter()
                .find(|&(lat, lon)| {
                    columns[lat].max_abs() <= 90.0 && columns[lon].max_abs() > 90.0
                })
                .unwrap_or((0, 1));

            if columns[lon].max_abs() > 180.0 {
                (Some(0), Some(0))
            } else {
                (Some(lat), Some(lon))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, values: &[f64]) -> NumericColumn {
        NumericColumn::new(name, values.to_vec())
    }

    #[test]
    fn test_too_few_columns() {
        assert_eq!(find_lat_lon(&[]), (None, None));
        assert_eq!(find_lat_lon(&[col("lat", &[1.0])]), (None, None));
    }

    #[test]
    fn test_named_columns() {
        let columns = [
            col("population", &[1e6]),
            col("Longitude", &[14.5]),
            col("LAT_deg", &[46.0]),
        ];
        assert_eq!(find_lat_lon(&columns), (Some(2), Some(1)));
    }

    #[test]
    fn test_one_named_column_picks_partner() {
        let columns = [col("y", &[46.0]), col("lng", &[14.5])];
        assert_eq!(find_lat_lon(&columns), (Some(0), Some(1)));
        let columns = [col("latitude", &[46.0]), col("x", &[14.5])];
        assert_eq!(find_lat_lon(&columns), (Some(0), Some(1)));
    }

    #[test]
    fn test_value_ranges_decide() {
        let columns = [col("a", &[-120.0, 10.0]), col("b", &[45.0, f64::NAN])];
        assert_eq!(find_lat_lon(&columns), (Some(1), Some(0)));

        let columns = [col("a", &[45.0]), col("b", &[-120.0])];
        assert_eq!(find_lat_lon(&columns), (Some(0), Some(1)));

        // Neither exceeds 90: first is latitude
        let columns = [col("a", &[10.0]), col("b", &[20.0])];
        assert_eq!(find_lat_lon(&columns), (Some(0), Some(1)));
    }

    #[test]
    fn test_out_of_range_longitude_is_ambiguous() {
        let columns = [col("a", &[45.0]), col("b", &[1000.0])];
        assert_eq!(find_lat_lon(&columns), (Some(0), Some(0)));
    }

    #[test]
    fn test_many_unnamed_columns_are_ambiguous() {
        let columns = [col("a", &[1.0]), col("b", &[2.0]), col("c", &[3.0])];
        assert_eq!(find_lat_lon(&columns), (Some(0), Some(0)));
    }
}
