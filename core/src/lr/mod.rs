use std::{collections::BTreeSet, sync::Arc};

use log::trace;

use crate::{
    context::Context,
    error::ExpectedSymbols,
    item::Item,
    symbol::{traits::SyntaxSymbol as _, NonTerminal, Symbol},
    token::Token,
    tokenizer::Tokenizer,
    Error, ErrorKind, RelrResult, UNRECOGNIZED,
};

mod action;
mod graph;
mod table;
mod transition;

pub use action::*;
use graph::*;
pub use table::*;
use transition::*;

pub use crate::StateId;

/// Message of lexical errors with no diagnostic registered in the table.
const UNRECOGNIZED_INPUT: &str = "unrecognized input";

/// Shift/reduce/goto driver.
pub struct Parser<T: Tokenizer> {
    context: Context,
    tokenizer: Option<T>,
    file: String,
}

impl<T: Tokenizer> Parser<T> {
    pub fn new(context: Context) -> Self {
        Self {
            context,
            tokenizer: None,
            file: String::default(),
        }
    }

    /// Prepare a parse of `file`, read through `tokenizer`.
    pub fn reset(&mut self, tokenizer: T, file: &str) {
        self.context.reset();
        self.tokenizer = Some(tokenizer);
        self.file = file.to_owned();
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub fn into_context(self) -> Context {
        self.context
    }

    /// Parse the whole input, returning the root of the derivation.
    ///
    /// The tokenizer is consumed: call [Parser::reset] before parsing again.
    pub fn parse(&mut self) -> RelrResult<Symbol> {
        let mut tokenizer = self.tokenizer.take().ok_or(ErrorKind::NotReset)?;
        let table = Arc::clone(self.context.table());

        let mut token = self.next_token(&mut tokenizer, &table)?;

        loop {
            let state = self.context.top_state()?;

            let Some(action) = table.get(state, token.name()) else {
                return Err(self.unexpected(&table, state, &token));
            };

            match action {
                Action::Accept => {
                    let depth = self.context.symbols().len();

                    if depth != 1 || !token.is_eof() {
                        return Err(ErrorKind::AcceptDepth(depth).into());
                    }

                    trace!("accept in state {}", state);
                    return self.context.pop_root();
                }
                Action::Error(message) => {
                    return Err(self.context.on_error(&self.file, message, token.position()));
                }
                Action::Goto(_) => {
                    return Err(ErrorKind::UnexpectedGoto {
                        state,
                        symbol: token.name().to_owned(),
                    }
                    .into());
                }
                Action::Shift(next) => {
                    let symbol = Symbol::Token(token);

                    if let Some(items) = table.state(state) {
                        items.process(&symbol, &mut self.context);
                    }

                    trace!("shift {} -> {}", symbol, next);
                    self.context.push(*next, symbol);

                    token = self.next_token(&mut tokenizer, &table)?;
                }
                Action::Reduce(production) => {
                    self.reduce(&table, production, &token)?;
                }
            }
        }
    }

    fn next_token(&mut self, tokenizer: &mut T, table: &LrTable) -> RelrResult<Token> {
        loop {
            let Some(mut token) = tokenizer.scan(&mut self.context) else {
                return Err(self.unrecognized(table));
            };

            self.context.on_scan(&mut token);

            if self.context.grammar().is_banned(token.name()) {
                trace!("skip banned {}", token);
                continue;
            }

            return Ok(token);
        }
    }

    fn reduce(&mut self, table: &LrTable, production: &str, token: &Token) -> RelrResult<()> {
        let lookahead = Symbol::Token(token.clone());
        let top = self.context.top_state()?;

        if let Some(items) = table.state(top) {
            items.process(&lookahead, &mut self.context);
            items.process_reduction(production, &lookahead, &mut self.context);
        }

        let length = reduction_length(
            table,
            self.context.states(),
            self.context.symbols(),
            production,
            token.name(),
        )?;

        let mut non_terminal = NonTerminal::new(production, self.context.pop(length)?);
        non_terminal.extend_attributes(self.context.take_attributes(production));
        let symbol = Symbol::NonTerminal(non_terminal);

        let exposed = self.context.top_state()?;

        let Some(Action::Goto(next)) = table.get(exposed, production) else {
            return Err(ErrorKind::MissingGoto {
                state: exposed,
                symbol: production.to_owned(),
            }
            .into());
        };

        if let Some(items) = table.state(exposed) {
            items.process(&symbol, &mut self.context);
        }

        trace!(
            "reduce {} popping {} symbols, goto {} -> {}",
            production,
            length,
            exposed,
            next
        );

        self.context.push(*next, symbol);
        Ok(())
    }

    fn unexpected(&self, table: &LrTable, state: StateId, token: &Token) -> Error {
        let message = format!(
            "unexpected {}, expecting {}",
            token.name(),
            ExpectedSymbols::new(table.expected(state))
        );

        self.context.on_error(&self.file, &message, token.position())
    }

    fn unrecognized(&self, table: &LrTable) -> Error {
        let message = self
            .context
            .top_state()
            .ok()
            .and_then(|state| table.get(state, UNRECOGNIZED))
            .and_then(|action| match action {
                Action::Error(message) => Some(message.as_str()),
                _ => None,
            })
            .unwrap_or(UNRECOGNIZED_INPUT);

        self.context.on_lexical_error(&self.file, message)
    }
}

/// Number of stacked symbols a reduction of `production` on `lookahead` consumes.
///
/// Productions are automata, so the length is not fixed. Starting from the reduced items
/// of the top state, the item chain is followed down the stack: at each level, the
/// predecessor items are the items of the state below which step onto the current ones
/// over the stacked symbol. The walk stops when the state below no longer covers the
/// production, and the length is taken at the deepest level where the chain holds an
/// initial item.
pub(crate) fn reduction_length(
    table: &LrTable,
    states: &[StateId],
    symbols: &[Symbol],
    production: &str,
    lookahead: &str,
) -> RelrResult<usize> {
    let top = symbols.len();

    let uncovered = |state: StateId| ErrorKind::UncoveredReduction {
        state,
        production: production.to_owned(),
    };

    let top_state = states.last().copied().ok_or(ErrorKind::EmptyStack)?;
    let items = table.state(top_state).ok_or_else(|| uncovered(top_state))?;

    if !items.contains(production) {
        return Err(uncovered(top_state).into());
    }

    let mut chain: BTreeSet<Item> = items
        .reduced_items()
        .filter(|item| item.name() == production && item.is_reduced_item(lookahead))
        .cloned()
        .collect();

    let mut deepest = chain.iter().any(Item::is_initial).then_some(top);
    let mut level = top;

    while level > 0 && !chain.is_empty() {
        let Some(below) = states.get(level - 1).and_then(|id| table.state(*id)) else {
            break;
        };

        if !below.contains(production) {
            break;
        }

        let symbol = symbols[level - 1].name();

        chain = below
            .get(symbol)
            .filter(|item| item.name() == production && item.lookahead() == lookahead)
            .filter(|item| chain.contains(&item.step(symbol)))
            .cloned()
            .collect();

        level -= 1;

        if chain.iter().any(Item::is_initial) {
            deepest = Some(level);
        }
    }

    deepest
        .map(|level| top - level)
        .ok_or_else(|| uncovered(top_state).into())
}
