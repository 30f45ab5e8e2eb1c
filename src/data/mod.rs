/// Data layer: core types, loading, and time windowing.
///
/// Architecture:
/// ```text
///  <run>/results/*.dat
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Series, discover run folders
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  model    │  Series, Window, RunKey, RunClass
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  window   │  fs → ps conversion, re-based sub-series
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod window;
