use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use itertools::Itertools as _;

use crate::{
    context::Context,
    grammar::Grammar,
    symbol::{traits::SyntaxSymbol as _, Symbol},
    ErrorKind, NodeId, RelrResult, END, EOF, EPSILON, START, UNRECOGNIZED,
};

/// Callback attached to a production body, fired when the parse walks through it.
///
/// It receives the symbol that triggered the traversal: the lookahead token before a
/// shift or a reduce, the freshly built non-terminal before a goto.
pub type SemanticAction = Arc<dyn Fn(&mut Context, &Symbol) + Send + Sync>;

/// Names a production body may never consume.
const RESERVED: [&str; 5] = [START, END, EOF, EPSILON, UNRECOGNIZED];

/// A sorted set of production nodes.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeSet(BTreeSet<NodeId>);

impl NodeSet {
    pub fn contains(&self, node: NodeId) -> bool {
        self.0.contains(&node)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, node: NodeId) -> bool {
        self.0.insert(node)
    }
}

impl FromIterator<NodeId> for NodeSet {
    fn from_iter<T: IntoIterator<Item = NodeId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<NodeId> for NodeSet {
    fn extend<T: IntoIterator<Item = NodeId>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

impl std::fmt::Display for NodeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.0.iter().join(","))
    }
}

/// The consuming transition leaving a node.
#[derive(Clone)]
pub enum Transform {
    /// Consumes a terminal or a non-terminal.
    Match { symbol: String, dest: NodeId },
    /// Consumes nothing and fires its callback when traversed.
    Action { action: SemanticAction, dest: NodeId },
}

impl Transform {
    pub fn dest(&self) -> NodeId {
        match self {
            Self::Match { dest, .. } | Self::Action { dest, .. } => *dest,
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::Match { symbol, .. } => Some(symbol),
            Self::Action { .. } => None,
        }
    }

    pub fn is_action(&self) -> bool {
        matches!(self, Self::Action { .. })
    }

    fn offset(&self, by: usize) -> Self {
        match self {
            Self::Match { symbol, dest } => Self::Match {
                symbol: symbol.clone(),
                dest: dest + by,
            },
            Self::Action { action, dest } => Self::Action {
                action: Arc::clone(action),
                dest: dest + by,
            },
        }
    }
}

impl std::fmt::Debug for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Match { symbol, dest } => f
                .debug_struct("Match")
                .field("symbol", symbol)
                .field("dest", dest)
                .finish(),
            Self::Action { dest, .. } => f.debug_struct("Action").field("dest", dest).finish(),
        }
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Match { symbol, dest } => write!(f, "[{}]->{}", symbol, dest),
            Self::Action { dest, .. } => write!(f, "[$action]->{}", dest),
        }
    }
}

#[derive(Clone, Debug)]
enum Edge {
    Epsilon(NodeId),
    Transform(Transform),
}

impl Edge {
    fn offset(&self, by: usize) -> Self {
        match self {
            Self::Epsilon(dest) => Self::Epsilon(dest + by),
            Self::Transform(transform) => Self::Transform(transform.offset(by)),
        }
    }
}

/// Builds a production body with the regular-expression algebra.
///
/// Every builder has a head (node 0) and a tail (the last node). Combinators glue graphs
/// together with epsilon edges, which [Builder::build] later resolves into closures.
///
/// # Example
/// ```
/// use relr_core::production::Builder;
///
/// // a b c*
/// let body = Builder::create("a")
///     .concat(Builder::create("b"))
///     .concat(Builder::create("c").closure());
///
/// let production = body.build("S").unwrap();
/// assert_eq!(production.first(&production.start()).len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct Builder {
    nodes: Vec<Vec<Edge>>,
}

impl Builder {
    fn with_nodes(count: usize) -> Self {
        Self {
            nodes: vec![Vec::default(); count],
        }
    }

    fn add(&mut self, node: NodeId, edge: Edge) {
        self.nodes[node].push(edge);
    }

    /// Copy the edges of another graph, shifting its nodes by `start`.
    fn splice(&mut self, start: NodeId, other: &Self) {
        for (offset, edges) in other.nodes.iter().enumerate() {
            for edge in edges {
                self.nodes[start + offset].push(edge.offset(start));
            }
        }
    }

    fn tail(&self) -> NodeId {
        self.nodes.len() - 1
    }

    /// A graph consuming one symbol.
    pub fn create(symbol: &str) -> Self {
        let mut result = Self::with_nodes(2);

        if symbol == EPSILON {
            result.add(0, Edge::Epsilon(1));
        } else {
            result.add(
                0,
                Edge::Transform(Transform::Match {
                    symbol: symbol.to_owned(),
                    dest: 1,
                }),
            );
        }

        result
    }

    /// A graph consuming nothing.
    pub fn empty() -> Self {
        Self::create(EPSILON)
    }

    /// A graph whose single transition fires a callback.
    pub fn action<F>(callback: F) -> Self
    where
        F: Fn(&mut Context, &Symbol) + Send + Sync + 'static,
    {
        let mut result = Self::with_nodes(2);
        result.add(
            0,
            Edge::Transform(Transform::Action {
                action: Arc::new(callback),
                dest: 1,
            }),
        );
        result
    }

    /// `self other`
    pub fn concat(self, other: Self) -> Self {
        let mut result = Self::with_nodes(self.nodes.len() + other.nodes.len() - 1);
        result.splice(0, &self);
        result.splice(self.tail(), &other);
        result
    }

    /// `self | other`
    pub fn union(self, other: Self) -> Self {
        let a = self.nodes.len();
        let b = other.nodes.len();

        let mut result = Self::with_nodes(a + b + 1);
        result.add(0, Edge::Epsilon(1));
        result.add(0, Edge::Epsilon(1 + a));
        result.splice(1, &self);
        result.add(a, Edge::Epsilon(a + b));
        result.splice(1 + a, &other);
        result
    }

    /// `self*`
    pub fn closure(self) -> Self {
        let a = self.nodes.len();

        let mut result = Self::with_nodes(a + 2);
        result.add(0, Edge::Epsilon(1));
        result.add(0, Edge::Epsilon(a + 1));
        result.splice(1, &self);
        result.add(a, Edge::Epsilon(1));
        result.add(a, Edge::Epsilon(a + 1));
        result
    }

    /// `self?`
    pub fn optional(self) -> Self {
        self.union(Self::empty())
    }

    /// `self+`
    pub fn repeat(self) -> Self {
        self.clone().concat(self.closure())
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn epsilon_closure(&self, node: NodeId) -> BTreeSet<NodeId> {
        let mut visited = BTreeSet::default();
        let mut stack = vec![node];

        while let Some(node) = stack.pop() {
            if visited.insert(node) {
                stack.extend(self.nodes[node].iter().filter_map(|edge| match edge {
                    Edge::Epsilon(dest) => Some(*dest),
                    Edge::Transform(_) => None,
                }));
            }
        }

        visited
    }

    /// Freeze the graph into the production of the non-terminal `name`.
    ///
    /// Each node keeps at most one consuming transition, and its epsilon edges are
    /// replaced by the set of nodes reachable without consuming anything, restricted to
    /// nodes with a transition plus the accepting node.
    pub fn build(&self, name: &str) -> RelrResult<Production> {
        if name != START && RESERVED.contains(&name) {
            return Err(ErrorKind::reserved_symbol(name, name).into());
        }

        let accept = self.tail();
        let mut transforms = Vec::with_capacity(self.nodes.len());

        for (node, edges) in self.nodes.iter().enumerate() {
            let mut consuming = edges.iter().filter_map(|edge| match edge {
                Edge::Transform(transform) => Some(transform),
                Edge::Epsilon(_) => None,
            });

            let transform = consuming.next().cloned();

            if consuming.next().is_some() {
                return Err(ErrorKind::AmbiguousNode {
                    production: name.to_owned(),
                    node,
                }
                .into());
            }

            if let Some(symbol) = transform.as_ref().and_then(Transform::symbol) {
                if RESERVED.contains(&symbol) {
                    return Err(ErrorKind::reserved_symbol(name, symbol).into());
                }
            }

            transforms.push(transform);
        }

        let epsilons = (0..self.nodes.len())
            .map(|node| {
                self.epsilon_closure(node)
                    .into_iter()
                    .filter(|&n| n == accept || transforms[n].is_some())
                    .collect()
            })
            .collect();

        Ok(Production {
            name: name.to_owned(),
            transforms,
            epsilons,
        })
    }
}

/// The automaton of one grammar rule body.
///
/// Node `len() - 1` is the accepting node. Every node holds at most one consuming
/// transition and the precomputed epsilon-closure of itself.
#[derive(Clone, Debug)]
pub struct Production {
    name: String,
    transforms: Vec<Option<Transform>>,
    epsilons: Vec<NodeSet>,
}

impl std::fmt::Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Production:{}", self.name)?;
        write!(f, "Node:{}", self.transforms.len())?;

        for (node, (transform, epsilons)) in
            self.transforms.iter().zip(self.epsilons.iter()).enumerate()
        {
            write!(f, "\n{}:({{", node)?;
            if let Some(transform) = transform {
                write!(f, "{}", transform)?;
            }
            write!(f, "}},{})", epsilons)?;
        }

        Ok(())
    }
}

impl Production {
    /// The non-terminal this production produces.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn accept_node(&self) -> NodeId {
        self.transforms.len().saturating_sub(1)
    }

    pub fn transform(&self, node: NodeId) -> Option<&Transform> {
        self.transforms.get(node).and_then(Option::as_ref)
    }

    /// The epsilon-closure of the head node.
    pub fn start(&self) -> NodeSet {
        self.epsilons.first().cloned().unwrap_or_default()
    }

    /// Resolve action nodes to the nodes they lead to.
    ///
    /// The result only holds symbol-consuming nodes and the accepting node.
    pub fn symbols(&self, nodes: &NodeSet) -> NodeSet {
        let accept = self.accept_node();
        let mut result = NodeSet::default();
        let mut visited = BTreeSet::default();
        let mut stack: Vec<NodeId> = nodes.iter().rev().collect();

        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }

            if node == accept {
                result.insert(node);
                continue;
            }

            match self.transform(node) {
                Some(Transform::Action { dest, .. }) => {
                    stack.extend(self.epsilons[*dest].iter().rev())
                }
                Some(Transform::Match { .. }) => {
                    result.insert(node);
                }
                None => {}
            }
        }

        result
    }

    /// The symbols expected next, `$end` standing for the accepting node.
    pub fn first(&self, nodes: &NodeSet) -> BTreeSet<String> {
        let accept = self.accept_node();

        self.symbols(nodes)
            .iter()
            .filter_map(|node| {
                if node == accept {
                    Some(END.to_owned())
                } else {
                    self.transform(node)
                        .and_then(Transform::symbol)
                        .map(ToOwned::to_owned)
                }
            })
            .collect()
    }

    /// Returns true if the accepting node is reachable without consuming a symbol.
    pub fn is_end(&self, nodes: &NodeSet) -> bool {
        self.symbols(nodes).contains(self.accept_node())
    }

    /// Advance the node set over `symbol`, without firing any action.
    pub fn step(&self, nodes: &NodeSet, symbol: &str) -> NodeSet {
        let mut result = NodeSet::default();

        for node in self.symbols(nodes).iter() {
            if let Some(Transform::Match { symbol: expected, dest }) = self.transform(node) {
                if expected == symbol {
                    result.extend(self.epsilons[*dest].iter());
                }
            }
        }

        result
    }

    /// Advance the node set over `symbol`, firing the actions reachable from `nodes`.
    pub fn advance(&self, nodes: &NodeSet, symbol: &Symbol, context: &mut Context) -> NodeSet {
        self.process(nodes, symbol, context);
        self.step(nodes, symbol.name())
    }

    /// Fire every action reachable from `nodes` through action transitions.
    ///
    /// Each action node fires once per call, whichever branch it belongs to.
    pub fn process(&self, nodes: &NodeSet, symbol: &Symbol, context: &mut Context) {
        let mut visited = BTreeSet::default();
        let mut stack: Vec<NodeId> = nodes.iter().rev().collect();

        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }

            if let Some(Transform::Action { action, dest }) = self.transform(node) {
                action(context, symbol);
                stack.extend(self.epsilons[*dest].iter().rev());
            }
        }
    }

    /// Collect the terminals that can be consumed first from `nodes`.
    ///
    /// Non-terminals are replaced by their FIRST set and looked through when nullable.
    /// The boolean is true if the accepting node can be reached consuming only nullable
    /// non-terminals.
    pub(crate) fn walk(
        &self,
        nodes: &NodeSet,
        first: &BTreeMap<String, BTreeSet<String>>,
        nullable: &BTreeSet<String>,
    ) -> (BTreeSet<String>, bool) {
        let accept = self.accept_node();
        let mut terminals = BTreeSet::default();
        let mut reaches_end = false;
        let mut visited = BTreeSet::default();
        let mut stack = vec![nodes.clone()];

        while let Some(nodes) = stack.pop() {
            for node in self.symbols(&nodes).iter() {
                if !visited.insert(node) {
                    continue;
                }

                if node == accept {
                    reaches_end = true;
                    continue;
                }

                if let Some(Transform::Match { symbol, dest }) = self.transform(node) {
                    match first.get(symbol) {
                        Some(set) => {
                            terminals.extend(set.iter().cloned());
                            if nullable.contains(symbol) {
                                stack.push(self.epsilons[*dest].clone());
                            }
                        }
                        None => {
                            terminals.insert(symbol.clone());
                        }
                    }
                }
            }
        }

        (terminals, reaches_end)
    }

    /// Terminals that can begin this production.
    pub fn first_symbols(&self, grammar: &Grammar) -> BTreeSet<String> {
        grammar.first_symbols(&self.name).cloned().unwrap_or_default()
    }

    /// Terminals that can follow `symbol` when consumed from `nodes`.
    ///
    /// If the rest of the body can derive the empty string, `lookahead` is included.
    pub fn follow_symbols(
        &self,
        nodes: &NodeSet,
        symbol: &str,
        lookahead: &str,
        grammar: &Grammar,
    ) -> BTreeSet<String> {
        let next = self.step(nodes, symbol);
        let (mut terminals, nullable) = self.walk(&next, grammar.first_sets(), grammar.nullables());

        if nullable {
            terminals.insert(lookahead.to_owned());
        }

        terminals
    }

    /// Returns the symbol if the body consumes exactly one symbol and then accepts.
    pub fn is_single_symbol(&self) -> Option<&str> {
        let accept = self.accept_node();
        let start: Vec<NodeId> = self.symbols(&self.start()).iter().collect();

        let &[node] = start.as_slice() else {
            return None;
        };

        match self.transform(node) {
            Some(Transform::Match { symbol, dest }) => {
                let rest = self.symbols(&self.epsilons[*dest]);
                (rest.len() == 1 && rest.contains(accept)).then_some(symbol.as_str())
            }
            _ => None,
        }
    }

    /// Every symbol consumed somewhere in the body.
    pub fn alphabet(&self) -> BTreeSet<&str> {
        self.transforms
            .iter()
            .flatten()
            .filter_map(Transform::symbol)
            .collect()
    }
}
