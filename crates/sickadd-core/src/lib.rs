pub mod catalog;
pub mod classify;
pub mod error;
pub mod lock;
pub mod reconcile;

pub use catalog::Catalog;
pub use classify::{is_series_title, Classification, ClassificationMemo, Classifier};
pub use error::{CatalogError, ReconcileError};
pub use lock::RunLock;
pub use reconcile::{ListSummary, Reconciler, RunSummary};
