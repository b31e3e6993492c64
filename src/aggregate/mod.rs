//! Ordering, concatenation, and write-back of source members.

pub mod concat;
pub mod ordering;
pub mod writer;

pub use concat::{concatenate_members, VertexArray};
pub use ordering::SortKey;
pub use writer::replace_or_create;
