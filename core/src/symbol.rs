use std::collections::BTreeMap;

use itertools::Itertools as _;

use crate::token::Token;

pub mod traits {
    /// A grammar symbol as seen by semantic code: a name and a string attribute store.
    pub trait SyntaxSymbol {
        fn name(&self) -> &str;

        /// Returns the attribute value, or an empty string.
        fn get(&self, key: &str) -> &str;

        fn set(&mut self, key: &str, value: &str);
    }
}

use traits::SyntaxSymbol;

/// A non-terminal built by one reduction.
///
/// The node itself carries the synthesized attributes; `children` are the symbols the
/// reduction consumed, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonTerminal {
    name: String,
    attributes: BTreeMap<String, String>,
    children: Vec<Symbol>,
}

impl NonTerminal {
    pub fn new<I>(name: &str, children: I) -> Self
    where
        I: IntoIterator<Item = Symbol>,
    {
        Self {
            name: name.to_owned(),
            attributes: BTreeMap::default(),
            children: children.into_iter().collect(),
        }
    }

    pub fn children(&self) -> &[Symbol] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&Symbol> {
        self.children.get(index)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub(crate) fn extend_attributes<I>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.attributes.extend(attributes)
    }
}

impl SyntaxSymbol for NonTerminal {
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

impl std::fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}]",
            self.name,
            self.children.iter().map(ToString::to_string).join(" ")
        )
    }
}

/// A node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Token(Token),
    NonTerminal(NonTerminal),
}

impl Symbol {
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Self::Token(token) => Some(token),
            Self::NonTerminal(_) => None,
        }
    }

    pub fn as_non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            Self::Token(_) => None,
            Self::NonTerminal(nt) => Some(nt),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Token(_))
    }

    /// Iterate over the leaves of the tree, left to right.
    pub fn tokens(&self) -> Vec<&Token> {
        let mut leaves = Vec::default();
        let mut stack = vec![self];

        while let Some(symbol) = stack.pop() {
            match symbol {
                Self::Token(token) => leaves.push(token),
                Self::NonTerminal(nt) => stack.extend(nt.children.iter().rev()),
            }
        }

        leaves
    }
}

impl From<Token> for Symbol {
    fn from(token: Token) -> Self {
        Self::Token(token)
    }
}

impl From<NonTerminal> for Symbol {
    fn from(nt: NonTerminal) -> Self {
        Self::NonTerminal(nt)
    }
}

impl SyntaxSymbol for Symbol {
    fn name(&self) -> &str {
        match self {
            Self::Token(token) => token.name(),
            Self::NonTerminal(nt) => nt.name(),
        }
    }

    fn get(&self, key: &str) -> &str {
        match self {
            Self::Token(token) => token.get(key),
            Self::NonTerminal(nt) => nt.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        match self {
            Self::Token(token) => token.set(key, value),
            Self::NonTerminal(nt) => nt.set(key, value),
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(token) => token.fmt(f),
            Self::NonTerminal(nt) => nt.fmt(f),
        }
    }
}
