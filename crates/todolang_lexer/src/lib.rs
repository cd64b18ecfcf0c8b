//! todolang_lexer: Lexer/tokenizer for TodoLang source code.
//!
//! Produces a flat, EOF-terminated token stream with 1-based line/column
//! positions and byte spans:
//! - 16 reserved words, identifiers (ASCII and Unicode `XID`)
//! - decimal numbers and quoted strings with escape decoding
//! - line and block comments as trivia tokens
//! - operators by longest match, including the markup delimiters `</` and `/>`

mod lexer;
mod token;

pub use lexer::{keyword_kind, tokenize, Lexer};
pub use token::Token;
