//! todolang_parser: Recursive descent parser for TodoLang.
//!
//! Consumes the lexer's token stream and builds an arena-allocated AST.
//! Binary operators are handled by precedence climbing and embedded markup
//! has its own sub-grammar entered from primary expression position.

mod parser;
mod precedence;
mod utilities;

pub use parser::{Parser, MAX_NESTING_DEPTH};
