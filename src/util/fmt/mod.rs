//! Human-readable renderings of the compiler's data structures.
//!
//! Errors and notes implement [`std::fmt::Display`] in [`error`]; the
//! alternate flag (`{:#}`) prefixes them with their span. Trees are rendered by
//! [`tree`], mostly for tests and `hsc --emit`.

pub mod error;
pub mod tree;
