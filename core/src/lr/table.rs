use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use prettytable::Table as PtTable;

use crate::{grammar::Grammar, item::Items, ErrorKind, RelrResult, EOF, START};

use super::{Action, Graph, StateId, Transition};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Row {
    actions: BTreeMap<String, Action>,
}

impl Row {
    /// Set a cell, failing if it already holds another action.
    fn insert(&mut self, state: StateId, symbol: &str, action: Action) -> RelrResult<()> {
        match self.actions.get(symbol) {
            Some(existing) if *existing != action => Err(ErrorKind::Conflict {
                state,
                symbol: symbol.to_owned(),
                existing: existing.clone(),
                incoming: action,
            }
            .into()),
            Some(_) => Ok(()),
            None => {
                self.actions.insert(symbol.to_owned(), action);
                Ok(())
            }
        }
    }

    fn from_transition(transition: &Transition<'_>, grammar: &Grammar) -> RelrResult<Self> {
        let mut row = Self::default();

        for (symbol, to) in transition.edges.iter().copied() {
            let action = if grammar.is_non_terminal(symbol) {
                Action::Goto(to)
            } else {
                Action::Shift(to)
            };

            row.insert(transition.from, symbol, action)?;
        }

        for item in transition.state.reduced_items() {
            if item.name() == START {
                row.insert(transition.from, EOF, Action::Accept)?;
            } else {
                row.insert(
                    transition.from,
                    item.lookahead(),
                    Action::Reduce(item.name().to_owned()),
                )?;
            }
        }

        Ok(row)
    }
}

/// The canonical LR(1) table.
///
/// Row `i` holds the actions of state `i`, keyed by terminal (shift, reduce, accept) or by
/// non-terminal (goto).
#[derive(PartialEq, Eq)]
pub struct LrTable {
    states: Vec<Items>,
    rows: Vec<Row>,
    non_terminals: BTreeSet<String>,
}

impl std::fmt::Debug for LrTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

impl std::fmt::Display for LrTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let terminals = self.terminals();
        let columns: Vec<&str> = terminals
            .iter()
            .copied()
            .chain(self.non_terminals().map(String::as_str))
            .collect();

        let mut table = PtTable::new();

        table.add_row(["#"].into_iter().chain(columns.iter().copied()).collect());

        for (id, row) in self.rows.iter().enumerate() {
            table.add_row(
                [id.to_string()]
                    .into_iter()
                    .chain(columns.iter().map(|symbol| {
                        row.actions
                            .get(*symbol)
                            .map(ToString::to_string)
                            .unwrap_or_default()
                    }))
                    .collect(),
            );
        }

        write!(f, "{}", table)
    }
}

impl LrTable {
    /// Build the table of a grammar.
    ///
    /// Fails on the first cell receiving two different actions.
    pub fn create(grammar: &Grammar) -> RelrResult<Self> {
        let mut graph = Graph::new(grammar)?;
        graph.build();

        let rows = graph
            .iter_transitions()
            .map(|transition| Row::from_transition(&transition, grammar))
            .collect::<RelrResult<Vec<_>>>()?;

        debug!(
            "lr table built: {} states, {} transitions",
            graph.states.len(),
            graph.edges.len()
        );

        let non_terminals = grammar
            .productions()
            .map(|production| production.name())
            .filter(|name| *name != START)
            .map(ToOwned::to_owned)
            .collect();

        Ok(Self {
            states: graph.states,
            rows,
            non_terminals,
        })
    }

    pub fn get(&self, state: StateId, symbol: &str) -> Option<&Action> {
        self.rows.get(state).and_then(|row| row.actions.get(symbol))
    }

    /// The canonical state behind a row.
    pub fn state(&self, state: StateId) -> Option<&Items> {
        self.states.get(state)
    }

    /// Install a diagnostic for a cell, unless the cell already holds an action.
    ///
    /// Returns true if the error was installed.
    pub fn set_error(&mut self, state: StateId, symbol: &str, message: &str) -> bool {
        let Some(row) = self.rows.get_mut(state) else {
            return false;
        };

        if row.actions.contains_key(symbol) {
            return false;
        }

        row.actions
            .insert(symbol.to_owned(), Action::Error(message.to_owned()));
        true
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The actions of a state, ordered by symbol.
    pub fn transitions(&self, state: StateId) -> impl Iterator<Item = (&str, &Action)> {
        self.rows
            .get(state)
            .into_iter()
            .flat_map(|row| row.actions.iter().map(|(symbol, action)| (symbol.as_str(), action)))
    }

    /// The terminals a state can act upon, explicit errors excluded.
    pub fn expected(&self, state: StateId) -> impl Iterator<Item = &str> {
        self.transitions(state)
            .filter(|(symbol, action)| !self.is_non_terminal(symbol) && !action.is_error())
            .map(|(symbol, _)| symbol)
    }

    pub fn non_terminals(&self) -> impl Iterator<Item = &String> {
        self.non_terminals.iter()
    }

    pub fn is_non_terminal(&self, symbol: &str) -> bool {
        self.non_terminals.contains(symbol)
    }

    fn terminals(&self) -> BTreeSet<&str> {
        self.rows
            .iter()
            .flat_map(|row| row.actions.keys())
            .map(String::as_str)
            .filter(|symbol| !self.is_non_terminal(symbol))
            .collect()
    }
}
