//! Target schema of the relational store.

/// `regions` dimension table.
pub const REGIONS_DDL: &str = "CREATE TABLE IF NOT EXISTS regions (
    region_id INT PRIMARY KEY,
    state VARCHAR(255),
    state_code_fips INT,
    municipal_code_fips INT,
    county VARCHAR(255)
)";

/// `home_values` fact table; references `regions`.
pub const HOME_VALUES_DDL: &str = "CREATE TABLE IF NOT EXISTS home_values (
    region_id INT,
    date DATE,
    value FLOAT,
    bedrooms INT,
    PRIMARY KEY (region_id, date, bedrooms),
    FOREIGN KEY (region_id) REFERENCES regions(region_id)
)";

/// Statements creating the target schema, in dependency order.
pub const SCHEMA_STATEMENTS: [&str; 2] = [REGIONS_DDL, HOME_VALUES_DDL];

/// The full schema as a script.
pub fn schema_sql() -> String {
    SCHEMA_STATEMENTS
        .iter()
        .map(|statement| format!("{statement};"))
        .collect::<Vec<_>>()
        .join("\n")
}
