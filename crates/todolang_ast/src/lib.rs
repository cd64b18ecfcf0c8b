//! todolang_ast: Abstract Syntax Tree definitions for TodoLang.
//!
//! This module defines all AST node types, the SyntaxKind enum, the typed
//! operator enums and the modifier flags.

pub mod generated;
pub mod node;
pub mod syntax_kind;
pub mod types;
pub mod visitor;

// Re-export key types
pub use node::*;
pub use syntax_kind::SyntaxKind;
pub use types::*;
pub use visitor::AstVisitor;
