pub mod statistics;

pub use statistics::{conversion_rate, ConversionRate};
