//! adl_core: Core utilities for the ADL compiler.
//!
//! Provides typed index arenas, string interning and source locations
//! used throughout the compiler pipeline.

pub mod arena;
pub mod intern;
pub mod text;

// Re-export commonly used types
pub use arena::{Idx, IndexVec};
pub use intern::{InternedString, StringInterner};
pub use text::{TextRange, TextSpan};
