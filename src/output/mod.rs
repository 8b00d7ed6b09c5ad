pub mod schema;

pub use schema::{CompileSummary, DetectionReport, DispatcherStatus, ReleaseDocument};
