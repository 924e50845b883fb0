//! Canonical LR(1) parsing over grammars whose production bodies are regular expressions.
//!
//! # Example
//! ```
//! use relr::{sequence, Builder, Context, Grammar, Parser, TokenStream};
//!
//! let grammar = Grammar::builder()
//!     .start("S")
//!     .production("S", sequence!("C", "C"))
//!     .production("C", sequence!("c", "C").union(Builder::create("d")))
//!     .build()
//!     .unwrap();
//!
//! let mut parser = Parser::new(Context::from_grammar(grammar).unwrap());
//! parser.reset(TokenStream::words("c d d"), "input");
//!
//! let root = parser.parse().unwrap();
//! assert_eq!(root.to_string(), "S[C[c:c C[d:d]] C[d:d]]");
//! ```
pub use relr_core::*;
