//! Download history.
//!
//! Every finished download attempt is appended to a SQLite ledger. Records
//! are read back in pages of [`PAGE_SIZE`], newest first.
//!
//! ```rust
//! use pdl::history::{record::now, HistoryStatus, HistoryStore, NewRecord};
//!
//! # fn example() -> Result<(), pdl::Error> {
//! let store = HistoryStore::open_in_memory()?;
//! let id = store.add(&NewRecord {
//!     filename: "file.zip".into(),
//!     url: "https://example.com/file.zip".into(),
//!     status: HistoryStatus::Ok,
//!     start_time: now(),
//!     end_time: now(),
//!     size: "1.00 MiB".into(),
//! })?;
//! assert_eq!(id, 1);
//! assert_eq!(store.page(1)?.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod record;
pub mod store;

pub use record::{HistoryRecord, HistoryStatus, NewRecord};
pub use store::{HistoryStore, PAGE_SIZE};
