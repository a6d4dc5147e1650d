//! runlog-storage: gateways to the automation log tables and the report table.
//!
//! Two traits split the database surface by access pattern:
//!
//! - [`LogStore`] -- read the latest execution of a region
//! - [`ReportStore`] -- insert placeholders, finalize them, read them back
//!
//! [`MySqlStore`] implements both against MySQL. [`MemoryStore`] implements
//! both in process for tests, and [`conformance`] checks any backend
//! against the shared contract.

pub mod conformance;
mod error;
pub mod memory;
pub mod mysql;
mod record;
mod traits;

pub use error::StorageError;
pub use memory::{FinalizeCall, MemoryStore};
pub use mysql::{mask_connection_string, MySqlConfig, MySqlStore};
pub use record::{RawExecution, ReportRecord, SeedRow};
pub use traits::{LogStore, ReportStore};
