//! In-process key-value store with flat-file persistence.
//!
//! Entries live in memory behind a lock and are written to a plain text file
//! exactly once, when the store is closed. The file holds one `key:value`
//! line per entry and is decoded in full when the store is opened.
//!
//! # Storage Backends
//!
//! All backends implement the [`KvStore`] trait:
//!
//! - [`FileStore`] -- loads from and persists to a flat file
//! - [`MemoryStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Keys match `[A-Za-z0-9_-]*` (the empty key is valid); values never
//!    contain a newline.
//! 2. Create never overwrites; Update and Delete never insert.
//! 3. A closed [`FileStore`] rejects every operation, including a second close.
//! 4. Decoding the encoded form of a mapping yields the same mapping.
//! 5. Errors are returned to the caller, never swallowed.

pub mod codec;
pub mod config;
pub mod error;
pub mod file;
pub mod key;
pub mod memory;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use codec::Entries;
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use key::{is_valid_key, validate_key};
pub use memory::MemoryStore;
pub use traits::KvStore;
