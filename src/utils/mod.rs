//! Numeric helpers used by the transforms.

pub mod optimization;
pub mod stats;

pub use optimization::{golden_section_max, GoldenSectionConfig, SearchResult};
pub use stats::{has_distinct_values, mean, min_max, population_variance, std_dev, variance};
