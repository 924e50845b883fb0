use std::collections::BTreeMap;

use crate::{grammar::Grammar, item::Items, RelrResult, END};

use super::StateId;

/// The canonical collection: every state reachable from the start state.
pub struct Graph<'gen> {
    grammar: &'gen Grammar,
    pub(super) states: Vec<Items>,
    index: BTreeMap<Items, StateId>,
    pub(super) edges: Vec<(StateId, String, StateId)>,
}

impl<'gen> Graph<'gen> {
    pub fn new(grammar: &'gen Grammar) -> RelrResult<Self> {
        let start = Items::start(grammar)?;

        Ok(Self {
            grammar,
            index: BTreeMap::from([(start.clone(), 0)]),
            states: vec![start],
            edges: vec![],
        })
    }

    fn get_id(&self, state: &Items) -> Option<StateId> {
        self.index.get(state).copied()
    }

    fn insert(&mut self, state: Items) -> StateId {
        let id = self.states.len();
        self.index.insert(state.clone(), id);
        self.states.push(state);
        id
    }

    /// Symbols leaving a state, in order.
    fn outgoing(&self, id: StateId) -> std::vec::IntoIter<String> {
        self.states
            .get(id)
            .map(|state| {
                state
                    .first()
                    .filter(|symbol| *symbol != END)
                    .map(ToOwned::to_owned)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
            .into_iter()
    }

    /// Depth-first search of the collection.
    ///
    /// A new state is numbered when first reached and explored before the remaining
    /// symbols of its parent, so numbering only depends on the grammar.
    pub fn build(&mut self) {
        let mut stack = vec![(0, self.outgoing(0))];

        loop {
            let Some((from, symbol)) = stack
                .last_mut()
                .map(|(from, symbols)| (*from, symbols.next()))
            else {
                break;
            };

            let Some(symbol) = symbol else {
                stack.pop();
                continue;
            };

            let successor = self.states[from].goto(&symbol, self.grammar);

            let to = match self.get_id(&successor) {
                Some(id) => id,
                None => {
                    let id = self.insert(successor);
                    stack.push((id, self.outgoing(id)));
                    id
                }
            };

            self.edges.push((from, symbol, to));
        }
    }
}
