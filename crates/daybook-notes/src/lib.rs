//! Append-only flat-file note storage.
//!
//! One note per line, newest last. There is no per-note identity and no
//! deletion; the file is the whole data model. No locking — this is a
//! single-user demo store, and concurrent writers are out of scope.

pub mod store;

pub use store::{NoteError, NoteStore};
