//! Column names of the crash warehouse table and of the aggregate aliases
//! the reports read back.

/// Crash date.
pub const DATE: &str = "\"DATE\"";
/// Hour of day, 0-23.
pub const HOUR: &str = "HOUR";
/// Day-of-week name (`"Monday"` .. `"Sunday"`).
pub const DAY_OF_WEEK_NAME: &str = "DAYOFWEEKNAME";
/// Month name (`"January"` .. `"December"`).
pub const MONTH_NAME: &str = "MONTHNAME";
/// Severity category.
pub const SEVERITY_CATEGORY: &str = "SEVERITY_CATEGORY";
/// First street of the intersection.
pub const STREET_A: &str = "INTASTREETNAME";
/// Second street of the intersection.
pub const STREET_B: &str = "INTBSTREETNAME";
/// Latitude of the crash.
pub const LATITUDE: &str = "LATITUDE";
/// Longitude of the crash.
pub const LONGITUDE: &str = "LONGITUDE";

/// Alias of `COUNT(*)` in every report.
pub const CRASH_COUNT: &str = "crash_count";
/// Alias of the mean latitude per intersection.
pub const MEAN_LATITUDE: &str = "latitude";
/// Alias of the mean longitude per intersection.
pub const MEAN_LONGITUDE: &str = "longitude";
/// Alias of the distinct year column in the year filter options.
pub const YEAR: &str = "year";
