//! Data model for the home value pipeline.
//!
//! Defines the normalized column vocabulary, the required-column contracts of
//! the two output tables, the per-stage table types and the bedroom plan.

pub mod bedrooms;
pub mod columns;
pub mod tables;

pub use bedrooms::{BEDROOM_FILENAME_MARKER, BedroomPlan, bedrooms_from_file_name};
pub use columns::{
    CaseInsensitiveSet, HOME_VALUE_COLUMNS, ID_COLUMNS, IdColumn, IdKind, LONG_COLUMNS,
    REGION_COLUMNS, TableKind, missing_columns,
};
pub use tables::{HomeValuesTable, LongTable, MergedTable, RawTable, RegionsTable};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_columns_match_either_spelling() {
        let region_id = ID_COLUMNS[0];
        assert!(region_id.matches("RegionID"));
        assert!(region_id.matches("regionid"));
        assert!(region_id.matches(" region_id "));
        assert!(!region_id.matches("RegionName"));
    }

    #[test]
    fn long_columns_cover_both_contracts() {
        for kind in TableKind::ALL {
            assert!(missing_columns(&LONG_COLUMNS, kind.columns()).is_empty());
        }
    }

    #[test]
    fn missing_columns_reports_in_contract_order() {
        let present = ["region_id", "state"];
        assert_eq!(
            missing_columns(&present, &REGION_COLUMNS),
            vec!["state_code_fips", "municipal_code_fips", "county"]
        );
    }

    #[test]
    fn table_kind_names() {
        assert_eq!(TableKind::from_name("REGIONS"), Some(TableKind::Regions));
        assert_eq!(TableKind::from_name("home_values"), Some(TableKind::HomeValues));
        assert_eq!(TableKind::from_name("homevalues"), None);
        assert_eq!(TableKind::HomeValues.to_string(), "home_values");
    }

    #[test]
    fn case_insensitive_set_keeps_first_spelling() {
        let set = CaseInsensitiveSet::new(["RegionID", "REGIONID", "State"]);
        assert_eq!(set.get("regionid"), Some("RegionID"));
        assert!(set.contains("STATE"));
        assert!(!set.contains("Metro"));
    }
}
