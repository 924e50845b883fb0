pub mod config;
pub mod context;
pub mod diagnostic;
pub mod error;
pub mod grammar;
pub mod item;
pub mod lr;
pub mod production;
pub mod scope;
pub mod span;
pub mod symbol;
pub mod token;
pub mod tokenizer;

pub use config::{AttributeScope, ContextConfig};
pub use context::Context;
pub use diagnostic::Diagnostic;
pub use error::{Error, ErrorKind};
pub use grammar::{Grammar, GrammarBuilder, TokenCallback};
pub use item::{Item, Items};
pub use lr::{Action, LrTable, Parser};
pub use production::{Builder, NodeSet, Production, SemanticAction};
pub use scope::ScopeTable;
pub use span::Cursor;
pub use symbol::{traits::SyntaxSymbol, NonTerminal, Symbol};
pub use token::{Token, LEXEME};
pub use tokenizer::{TokenStream, Tokenizer};

pub type StateId = usize;
pub type NodeId = usize;

pub type RelrResult<T> = Result<T, Error>;

/// Root of the augmented grammar.
pub const START: &str = "%start";
/// Marks the accepting node of a production in first sets.
pub const END: &str = "$end";
/// End-of-input terminal.
pub const EOF: &str = "$eof";
/// Empty transition, only meaningful while building a production.
pub const EPSILON: &str = "$epsilon";
/// Pseudo-terminal under which a state may register a diagnostic for input no token matches.
pub const UNRECOGNIZED: &str = "$unrecognized";

/// Concatenate single-symbol graphs.
///
/// # Example
/// ```
/// use relr_core::{production::Builder, sequence};
///
/// let body: Builder = sequence!("L", "=", "R");
/// assert_eq!(body.len(), 4);
/// ```
#[macro_export]
macro_rules! sequence {
    ($first:expr $(, $rest:expr)* $(,)?) => {
        $crate::production::Builder::create($first)
            $(.concat($crate::production::Builder::create($rest)))*
    };
}
