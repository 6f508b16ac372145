//! Column vocabulary and column contracts.
//!
//! Source files arrive with the upstream spelling of the identifying columns
//! (`RegionID`, `StateCodeFIPS`, ...). The reshape stage renames them to the
//! lower-case vocabulary below, which every later stage and the target store
//! use.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const REGION_ID: &str = "region_id";
pub const SIZE_RANK: &str = "size_rank";
pub const REGION_NAME: &str = "region_name";
pub const REGION_TYPE: &str = "region_type";
pub const STATE_NAME: &str = "state_name";
pub const STATE: &str = "state";
pub const METRO: &str = "metro";
pub const STATE_CODE_FIPS: &str = "state_code_fips";
pub const MUNICIPAL_CODE_FIPS: &str = "municipal_code_fips";
pub const COUNTY: &str = "county";
pub const DATE: &str = "date";
pub const VALUE: &str = "value";
pub const BEDROOMS: &str = "bedrooms";

/// Physical type an identifying column is parsed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// Int64; `required` columns may not hold empty cells.
    Integer { required: bool },
    /// Nullable String.
    Text,
}

/// An identifying (row key) column of a wide source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdColumn {
    /// Header as written by the upstream export.
    pub source: &'static str,
    /// Normalized name used from the long format onwards.
    pub name: &'static str,
    pub kind: IdKind,
}

impl IdColumn {
    /// True when `header` names this column in either spelling (case-insensitive).
    pub fn matches(&self, header: &str) -> bool {
        let header = header.trim();
        header.eq_ignore_ascii_case(self.source) || header.eq_ignore_ascii_case(self.name)
    }
}

/// Identifying columns in source order. Every other column of a raw table is
/// an observation date.
pub const ID_COLUMNS: [IdColumn; 9] = [
    IdColumn {
        source: "RegionID",
        name: REGION_ID,
        kind: IdKind::Integer { required: true },
    },
    IdColumn {
        source: "SizeRank",
        name: SIZE_RANK,
        kind: IdKind::Integer { required: false },
    },
    IdColumn {
        source: "RegionName",
        name: REGION_NAME,
        kind: IdKind::Text,
    },
    IdColumn {
        source: "RegionType",
        name: REGION_TYPE,
        kind: IdKind::Text,
    },
    IdColumn {
        source: "StateName",
        name: STATE_NAME,
        kind: IdKind::Text,
    },
    IdColumn {
        source: "State",
        name: STATE,
        kind: IdKind::Text,
    },
    IdColumn {
        source: "Metro",
        name: METRO,
        kind: IdKind::Text,
    },
    IdColumn {
        source: "StateCodeFIPS",
        name: STATE_CODE_FIPS,
        kind: IdKind::Integer { required: false },
    },
    IdColumn {
        source: "MunicipalCodeFIPS",
        name: MUNICIPAL_CODE_FIPS,
        kind: IdKind::Integer { required: false },
    },
];

/// Column order of a long (and merged) table.
pub const LONG_COLUMNS: [&str; 13] = [
    REGION_ID,
    SIZE_RANK,
    REGION_NAME,
    REGION_TYPE,
    STATE_NAME,
    STATE,
    METRO,
    STATE_CODE_FIPS,
    MUNICIPAL_CODE_FIPS,
    COUNTY,
    DATE,
    VALUE,
    BEDROOMS,
];

/// Columns the `regions` table is projected onto.
pub const REGION_COLUMNS: [&str; 5] = [
    REGION_ID,
    STATE,
    STATE_CODE_FIPS,
    MUNICIPAL_CODE_FIPS,
    COUNTY,
];

/// Columns the `home_values` table is projected onto.
pub const HOME_VALUE_COLUMNS: [&str; 4] = [REGION_ID, DATE, BEDROOMS, VALUE];

/// The two normalized output tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Regions,
    HomeValues,
}

impl TableKind {
    pub const ALL: [TableKind; 2] = [TableKind::Regions, TableKind::HomeValues];

    /// Table name in the target store and in sample exports.
    pub fn name(self) -> &'static str {
        match self {
            TableKind::Regions => "regions",
            TableKind::HomeValues => "home_values",
        }
    }

    /// Required-column contract of this table.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            TableKind::Regions => &REGION_COLUMNS,
            TableKind::HomeValues => &HOME_VALUE_COLUMNS,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the contract columns absent from `present`, in contract order.
pub fn missing_columns<S: AsRef<str>>(present: &[S], contract: &[&str]) -> Vec<String> {
    contract
        .iter()
        .filter(|required| !present.iter().any(|name| name.as_ref() == **required))
        .map(|required| (*required).to_string())
        .collect()
}

/// Case-insensitive lookup from a name to the spelling actually present.
#[derive(Debug, Clone)]
pub struct CaseInsensitiveSet {
    map: HashMap<String, String>,
}

impl CaseInsensitiveSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = HashMap::new();
        for name in names {
            let name = name.as_ref();
            let key = name.trim().to_ascii_uppercase();
            map.entry(key).or_insert_with(|| name.to_string());
        }
        Self { map }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map
            .get(&name.trim().to_ascii_uppercase())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(&name.trim().to_ascii_uppercase())
    }
}
