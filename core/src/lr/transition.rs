use crate::item::Items;

use super::{graph::Graph, StateId};

pub struct Transition<'graph> {
    pub(super) from: StateId,
    pub(super) state: &'graph Items,
    pub(super) edges: Vec<(&'graph str, StateId)>,
}

impl Graph<'_> {
    pub fn iter_transitions(&self) -> impl Iterator<Item = Transition<'_>> {
        self.states.iter().enumerate().map(|(from, state)| Transition {
            from,
            state,
            edges: self
                .edges
                .iter()
                .filter(|(source, _, _)| *source == from)
                .map(|(_, symbol, to)| (symbol.as_str(), *to))
                .collect(),
        })
    }
}
