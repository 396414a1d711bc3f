//! Output module for reporting on the enriched record set

pub mod stats;

pub use stats::{print_statistics, RosterStatistics};
