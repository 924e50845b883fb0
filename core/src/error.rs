use itertools::Itertools as _;
use thiserror::Error;

use crate::{diagnostic::Diagnostic, lr::Action, span::Cursor, StateId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedSymbols(Vec<String>);

impl ExpectedSymbols {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self(symbols.into_iter().map(|s| s.to_string()).collect())
    }
}

impl std::fmt::Display for ExpectedSymbols {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.iter().join(", ").fmt(f)
    }
}

#[derive(Error, Debug, Clone)]
pub enum ErrorKind {
    // Grammar definition.
    #[error("symbol {symbol} is reserved and cannot be used in production {production}")]
    ReservedSymbol { production: String, symbol: String },

    #[error("node {node} of production {production} has more than one consuming transition")]
    AmbiguousNode { production: String, node: usize },

    #[error("a production named {0} already exists")]
    DuplicatedProduction(String),

    #[error("the grammar has no %start production")]
    MissingStart,

    #[error("the %start production must consume exactly one non-terminal, got {0}")]
    MalformedStart(String),

    #[error("unknown production {0}")]
    UnknownProduction(String),

    #[error("conflict in state {state} on symbol {symbol}: {existing} vs {incoming}")]
    Conflict {
        state: StateId,
        symbol: String,
        existing: Action,
        incoming: Action,
    },

    // Input.
    #[error("{0}")]
    Lexical(Diagnostic),

    #[error("{0}")]
    Syntax(Diagnostic),

    // Internal consistency.
    #[error("accept reached with {0} symbols on the stack")]
    AcceptDepth(usize),

    #[error("goto on {symbol} reached as a token action in state {state}")]
    UnexpectedGoto { state: StateId, symbol: String },

    #[error("reduction of {production} is not covered by state {state}")]
    UncoveredReduction { state: StateId, production: String },

    #[error("missing goto for {symbol} in state {state}")]
    MissingGoto { state: StateId, symbol: String },

    #[error("the parser stack is empty")]
    EmptyStack,

    #[error("the parser has not been reset with a tokenizer")]
    NotReset,
}

impl ErrorKind {
    pub fn reserved_symbol(production: &str, symbol: &str) -> Self {
        Self::ReservedSymbol {
            production: production.to_owned(),
            symbol: symbol.to_owned(),
        }
    }

    /// Returns true for errors caused by the grammar itself rather than by the parsed input.
    pub fn is_grammar_error(&self) -> bool {
        matches!(
            self,
            Self::ReservedSymbol { .. }
                | Self::AmbiguousNode { .. }
                | Self::DuplicatedProduction(_)
                | Self::MissingStart
                | Self::MalformedStart(_)
                | Self::UnknownProduction(_)
                | Self::Conflict { .. }
        )
    }

    /// Returns true for errors signalling a bug in table construction or in the driver.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::AcceptDepth(_)
                | Self::UnexpectedGoto { .. }
                | Self::UncoveredReduction { .. }
                | Self::MissingGoto { .. }
                | Self::EmptyStack
        )
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Lexical(diagnostic) | Self::Syntax(diagnostic) => Some(diagnostic),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone)]
#[error("{kind}")]
pub struct Error {
    /// Kind of error
    kind: ErrorKind,
    /// Location of the error in the input.
    pub(crate) span: Option<Cursor>,
}

impl Error {
    pub fn new(kind: impl Into<ErrorKind>, span: Option<Cursor>) -> Self {
        Self {
            kind: kind.into(),
            span,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Option<Cursor> {
        self.span
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind, span: None }
    }
}
