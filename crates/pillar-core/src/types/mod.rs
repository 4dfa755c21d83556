//! Domain types for dates and rate conventions.

mod date;
mod frequency;
mod period;

pub use date::Date;
pub use frequency::{Compounding, Frequency};
pub use period::{Period, TimeUnit};
