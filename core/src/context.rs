use std::{collections::BTreeMap, sync::Arc};

use crate::{
    config::{AttributeScope, ContextConfig},
    diagnostic::Diagnostic,
    error::Error,
    grammar::Grammar,
    lr::LrTable,
    scope::ScopeTable,
    span::{Cursor, NextColumn, NextLine},
    symbol::{traits::SyntaxSymbol as _, Symbol},
    token::Token,
    ErrorKind, RelrResult, StateId,
};

/// A parse session over a shared grammar and table.
///
/// Holds everything a single parse mutates: the state and symbol stacks, the input
/// counters, the synthesized-attribute store and the scope table. Reset it before each
/// parse.
#[derive(Debug)]
pub struct Context {
    grammar: Arc<Grammar>,
    table: Arc<LrTable>,
    config: ContextConfig,
    states: Vec<StateId>,
    symbols: Vec<Symbol>,
    cursor: Cursor,
    length: usize,
    line: String,
    attributes: BTreeMap<String, BTreeMap<String, String>>,
    scopes: ScopeTable,
}

impl Context {
    pub fn new(grammar: Arc<Grammar>, table: Arc<LrTable>) -> Self {
        let mut context = Self {
            grammar,
            table,
            config: ContextConfig::default(),
            states: Vec::default(),
            symbols: Vec::default(),
            cursor: Cursor::default(),
            length: 0,
            line: String::default(),
            attributes: BTreeMap::default(),
            scopes: ScopeTable::default(),
        };

        context.reset();
        context
    }

    /// Build the table of the grammar and open a session on it.
    pub fn from_grammar(grammar: impl Into<Arc<Grammar>>) -> RelrResult<Self> {
        let grammar = grammar.into();
        let table = LrTable::create(&grammar)?;
        Ok(Self::new(grammar, Arc::new(table)))
    }

    pub fn with_config(mut self, config: ContextConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    pub fn table(&self) -> &Arc<LrTable> {
        &self.table
    }

    /// Clear the stacks, counters, attributes and scopes, and push the initial state.
    pub fn reset(&mut self) {
        self.states.clear();
        self.symbols.clear();
        self.cursor = Cursor::default();
        self.length = 0;
        self.line.clear();
        self.attributes.clear();
        self.scopes.clear();

        self.states.push(0);
    }

    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn top_state(&self) -> RelrResult<StateId> {
        self.states
            .last()
            .copied()
            .ok_or_else(|| ErrorKind::EmptyStack.into())
    }

    pub(crate) fn push(&mut self, state: StateId, symbol: Symbol) {
        self.states.push(state);
        self.symbols.push(symbol);
    }

    /// Pop `count` state/symbol pairs, returning the symbols in input order.
    pub(crate) fn pop(&mut self, count: usize) -> RelrResult<Vec<Symbol>> {
        if count > self.symbols.len() {
            return Err(ErrorKind::EmptyStack.into());
        }

        self.states.truncate(self.states.len() - count);
        Ok(self.symbols.split_off(self.symbols.len() - count))
    }

    pub(crate) fn pop_root(&mut self) -> RelrResult<Symbol> {
        self.states.pop();
        self.symbols.pop().ok_or_else(|| ErrorKind::EmptyStack.into())
    }

    /// Record one character read by the tokenizer.
    pub fn accept_input(&mut self, ch: char) {
        self.length += 1;

        if ch == '\n' {
            self.cursor += NextLine;
            self.line.clear();
        } else {
            self.cursor += NextColumn;
            self.line.push(ch);
        }
    }

    /// Position of the next character to be read.
    pub fn position(&self) -> Cursor {
        self.cursor
    }

    /// Number of characters read so far.
    pub fn length(&self) -> usize {
        self.length
    }

    /// The current line, as read so far.
    pub fn line(&self) -> &str {
        &self.line
    }

    /// A synthesized attribute staged for the next reduction of `non_terminal`.
    pub fn attribute(&self, non_terminal: &str, key: &str) -> &str {
        self.attributes
            .get(non_terminal)
            .and_then(|attributes| attributes.get(key))
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn set_attribute(&mut self, non_terminal: &str, key: &str, value: &str) {
        self.attributes
            .entry(non_terminal.to_owned())
            .or_default()
            .insert(key.to_owned(), value.to_owned());
    }

    /// The attributes handed to a reduction of `non_terminal`.
    pub(crate) fn take_attributes(&mut self, non_terminal: &str) -> BTreeMap<String, String> {
        match self.config.attribute_scope {
            AttributeScope::Instance => self.attributes.remove(non_terminal),
            AttributeScope::Global => self.attributes.get(non_terminal).cloned(),
        }
        .unwrap_or_default()
    }

    pub fn scopes(&self) -> &ScopeTable {
        &self.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut ScopeTable {
        &mut self.scopes
    }

    /// Run the scan callback registered for the token name, if any.
    pub fn on_scan(&mut self, token: &mut Token) {
        let grammar = Arc::clone(&self.grammar);

        if let Some(callback) = grammar.callback(token.name()) {
            callback(token, self);
        }
    }

    fn diagnostic(&self, file: &str, message: &str, position: Cursor) -> Diagnostic {
        Diagnostic::new(file, position, message, &self.line, self.config.tab_width)
    }

    /// Render a syntax error at `position`.
    pub fn on_error(&self, file: &str, message: &str, position: Cursor) -> Error {
        Error::new(
            ErrorKind::Syntax(self.diagnostic(file, message, position)),
            Some(position),
        )
    }

    /// Render a lexical error at the current position.
    pub fn on_lexical_error(&self, file: &str, message: &str) -> Error {
        Error::new(
            ErrorKind::Lexical(self.diagnostic(file, message, self.cursor)),
            Some(self.cursor),
        )
    }
}
