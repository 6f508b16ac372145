//! Bedroom-count discriminant assignment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// File-name marker used by the upstream exports (`..._bdrmcnt_3_...csv`).
pub const BEDROOM_FILENAME_MARKER: &str = "bdrmcnt_";

/// How each source table gets its `bedrooms` value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BedroomPlan {
    /// Source at index `i` gets `i + 1`.
    #[default]
    Positional,
    /// Caller-supplied mapping from source file name to bedroom count.
    Explicit(BTreeMap<String, i32>),
    /// Read the count following [`BEDROOM_FILENAME_MARKER`] in the file name.
    FromFileName,
}

impl BedroomPlan {
    /// Resolve the bedroom count for the source at `index` named `source_name`.
    ///
    /// Returns `None` when the plan has no answer for this source.
    pub fn bedrooms_for(&self, index: usize, source_name: &str) -> Option<i32> {
        match self {
            BedroomPlan::Positional => i32::try_from(index + 1).ok(),
            BedroomPlan::Explicit(map) => map.get(source_name).copied(),
            BedroomPlan::FromFileName => bedrooms_from_file_name(source_name),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            BedroomPlan::Positional => "positional",
            BedroomPlan::Explicit(_) => "explicit",
            BedroomPlan::FromFileName => "file name",
        }
    }
}

/// Extract the bedroom count from an upstream file name.
///
/// ```
/// use hv_model::bedrooms_from_file_name;
///
/// assert_eq!(
///     bedrooms_from_file_name("County_zhvi_bdrmcnt_3_uc_sfrcondo_tier_0.33_0.67_sm_sa_month.csv"),
///     Some(3)
/// );
/// assert_eq!(bedrooms_from_file_name("County_zhvi.csv"), None);
/// ```
pub fn bedrooms_from_file_name(name: &str) -> Option<i32> {
    let lower = name.to_ascii_lowercase();
    let start = lower.find(BEDROOM_FILENAME_MARKER)? + BEDROOM_FILENAME_MARKER.len();
    let digits: String = lower[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
