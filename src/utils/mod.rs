//! Diagnostics helpers.
pub mod logging;

pub use logging::{format_matrix_array, trace_matrix_array};
