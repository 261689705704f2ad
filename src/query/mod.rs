//! Pure functions over the record set: the filter engine and the
//! per-widget aggregators.

pub mod aggregate;
pub mod filter;

pub use aggregate::{
    age_bucket_index, by_age_bucket, by_city, by_month, by_sector, by_year_month,
    province_counts, AgeBucket, ChoroplethScale, LegendEntry, MonthCount, Tier, AGE_BUCKETS,
};
pub use filter::{
    apply, matching_indices, parse_date_input, AgeFilter, Criteria, YearSelection, AGE_CEILING,
    AGE_FLOOR,
};
