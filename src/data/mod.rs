/// Data layer: table model, loading, cleaning, filtering, reporting, export.
///
/// Architecture:
/// ```text
///   .csv / .xlsx upload
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → Table (typed columns)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ TableSession  │  owns the working Table + operation history
///   └──────────────┘
///        │   clean · filter · summary · profile · chart
///        ▼
///   ┌──────────┐
///   │  export   │  Table → csv / xlsx bytes for download
///   └──────────┘
/// ```

pub mod chart;
pub mod clean;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod profile;
pub mod session;
pub mod summary;
pub mod upload;
