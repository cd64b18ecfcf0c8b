//! todolang_core: Core utilities for the TodoLang compiler front end.
//!
//! Provides the source location types shared by tokens, AST nodes and
//! diagnostics.

pub mod text;

// Re-export commonly used types
pub use text::{Location, TextPos, TextSpan};
