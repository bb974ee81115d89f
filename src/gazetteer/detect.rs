//! Identifier scheme auto-detection.

use hashbrown::HashSet;
use tracing::debug;

use super::IdentifierEncoder;
use crate::models::IdentifierType;

pub const DEFAULT_SAMPLE_SIZE: usize = 200;

/// Picks the identifier scheme most values of a column are written in
pub struct SchemeDetector<'g> {
    encoder: IdentifierEncoder<'g>,
    sample_size: usize,
}

impl<'g> SchemeDetector<'g> {
    pub fn new(encoder: IdentifierEncoder<'g>, sample_size: usize) -> Self {
        Self {
            encoder,
            sample_size,
        }
    }

    /// First scheme, in detection priority order, that resolves at least half
    /// of the sample; `None` if no scheme does or the sample is empty.
    ///
    /// Fixed-width schemes are only looked up when some sampled value has
    /// one of their code lengths.
    pub fn detect<S: AsRef<str>>(&self, values: &[S]) -> Option<IdentifierType> {
        let sample = sample(values, self.sample_size);
        if sample.is_empty() {
            return None;
        }

        for &ty in IdentifierType::detection_order() {
            // Fixed-width codes: skip the lookup when no value could be one
            if let Some(lengths) = ty.code_lengths() {
                if !sample
                    .iter()
                    .any(|v| lengths.contains(&v.chars().count()))
                {
                    continue;
                }
            }

            let matches = self
                .encoder
                .encode(&sample, ty)
                .iter()
                .filter(|r| !r.is_null())
                .count();

            debug!("Scheme {} matches {}/{} sampled values", ty, matches, sample.len());

            if 2 * matches >= sample.len() {
                return Some(ty);
            }
        }

        None
    }
}

/// Trimmed, de-duplicated values in first-seen order, without blanks or NaN
fn sample<S: AsRef<str>>(values: &[S], cap: usize) -> Vec<&str> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(|v| v.as_ref().trim())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("nan"))
        .filter(|v| seen.insert(*v))
        .take(cap)
        .collect()
}
