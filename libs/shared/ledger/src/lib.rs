pub mod catalog;
pub mod ledger;
pub mod memory;

pub use catalog::ServiceCatalog;
pub use ledger::BookingLedger;
pub use memory::{InMemoryCatalog, InMemoryLedger};
