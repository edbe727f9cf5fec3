//! Document storage
//!
//! A [`DocumentStore`] holds untyped JSON documents; [`Collection`] gives a
//! typed view over one collection of it.

pub mod collection;
pub mod file;
pub mod memory;
pub mod traits;

pub use collection::Collection;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::{DocumentStore, StoreError, StoreResult};
