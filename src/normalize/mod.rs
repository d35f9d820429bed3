//! Pure text normalization: date cells and whitespace.

pub mod date_range;
pub mod text;

pub use date_range::{normalize, normalize_with_year, DateRange, DateRangeNormalizer};
pub use text::{clean_field, normalize_whitespace};
