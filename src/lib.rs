//! prism-core: space-tagged arrays of square matrices.
//!
//! This crate provides `MatrixArray`, an ordered stack of symmetric
//! `rank x rank` matrices used to hold pair correlation functions sampled on a
//! wavenumber or real-space grid, together with elementwise arithmetic,
//! batched inversion and batched matrix multiplication.
//!
//! Each array carries a `Space` tag so values from real and Fourier space are
//! never mixed by accident. The transforms themselves live outside this crate.
pub mod config;
pub mod error;
pub mod math;
pub mod space;
pub mod utils;

pub use config::LinalgConfig;
pub use error::{MatrixArrayError, Result};
pub use math::{Columns, MatrixArray, Operand};
pub use space::Space;
