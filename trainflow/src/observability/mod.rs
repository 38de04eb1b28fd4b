//! Observability utilities.

mod timing;

pub use timing::{SpanTimer, StageTimings};
