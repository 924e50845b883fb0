use std::collections::BTreeMap;

use crate::{span::Cursor, symbol::traits::SyntaxSymbol, EOF};

/// Attribute key under which a token keeps its lexeme.
pub const LEXEME: &str = "lexeme";

/// A terminal symbol produced by a tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    name: String,
    position: Cursor,
    attributes: BTreeMap<String, String>,
}

impl Token {
    pub fn new<N, L>(name: N, lexeme: L, position: Cursor) -> Self
    where
        N: ToString,
        L: ToString,
    {
        Self {
            name: name.to_string(),
            position,
            attributes: BTreeMap::from_iter([(LEXEME.to_owned(), lexeme.to_string())]),
        }
    }

    /// The end-of-input token.
    pub fn eof(position: Cursor) -> Self {
        Self::new(EOF, "", position)
    }

    pub fn is_eof(&self) -> bool {
        self.name == EOF
    }

    pub fn lexeme(&self) -> &str {
        self.get(LEXEME)
    }

    /// Where the token starts in the input.
    pub fn position(&self) -> Cursor {
        self.position
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

impl SyntaxSymbol for Token {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> &str {
        self.attributes.get(key).map(String::as_str).unwrap_or_default()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.attributes.insert(key.to_owned(), value.to_owned());
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.lexeme())
    }
}
