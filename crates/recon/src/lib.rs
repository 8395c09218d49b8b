//! `distress-recon`: raw vs domain property-distress reconciliation.
//!
//! Pure engine crate: receives pre-loaded tables, returns summaries and the
//! flattened detail table. No filesystem access.

pub mod compare;
pub mod config;
pub mod detail;
pub mod engine;
pub mod error;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod summary;
pub mod table;

pub use config::{Category, DistressConfig};
pub use engine::run;
pub use error::ReconError;
pub use model::{ClientInput, ClientReport};
pub use summary::SummaryEntry;
pub use table::{Side, Table, Value};
