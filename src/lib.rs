//! mdpost – batch post-processing for molecular-dynamics output.
//!
//! Reads per-run pressure or mean-squared-displacement time series from
//! text files, reduces them (mean, least-squares regression), and writes
//! PNG plots and CSV/TXT summary tables: diffusion coefficients,
//! target-parameter predictions, Arrhenius fits.

pub mod analysis;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod plot;
pub mod report;
