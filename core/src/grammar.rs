use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use itertools::Itertools as _;
use log::debug;

use crate::{
    context::Context,
    production::{Builder, Production},
    token::Token,
    ErrorKind, RelrResult, START,
};

/// Callback invoked on every scanned token of a given name, before the ban filter.
pub type TokenCallback = Arc<dyn Fn(&mut Token, &mut Context) + Send + Sync>;

/// An immutable grammar definition.
///
/// It can be shared between any number of parse sessions.
pub struct Grammar {
    productions: BTreeMap<String, Arc<Production>>,
    bans: BTreeSet<String>,
    callbacks: BTreeMap<String, TokenCallback>,
    first: BTreeMap<String, BTreeSet<String>>,
    nullable: BTreeSet<String>,
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("productions", &self.productions.keys().collect::<Vec<_>>())
            .field("bans", &self.bans)
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .field("first", &self.first)
            .field("nullable", &self.nullable)
            .finish()
    }
}

impl std::fmt::Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.productions.values().join("\n"))
    }
}

impl Grammar {
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::default()
    }

    /// The augmented root production.
    pub fn start(&self) -> RelrResult<&Arc<Production>> {
        self.productions
            .get(START)
            .ok_or_else(|| ErrorKind::MissingStart.into())
    }

    pub fn production(&self, name: &str) -> Option<&Arc<Production>> {
        self.productions.get(name)
    }

    pub fn productions(&self) -> impl Iterator<Item = &Arc<Production>> {
        self.productions.values()
    }

    pub fn is_non_terminal(&self, name: &str) -> bool {
        self.productions.contains_key(name)
    }

    /// Every symbol consumed by a production which is not itself a production.
    pub fn terminals(&self) -> BTreeSet<&str> {
        self.productions
            .values()
            .flat_map(|production| production.alphabet())
            .filter(|symbol| !self.is_non_terminal(symbol))
            .collect()
    }

    /// Banned tokens are scanned but never handed to the parser.
    pub fn is_banned(&self, name: &str) -> bool {
        self.bans.contains(name)
    }

    pub fn callback(&self, name: &str) -> Option<&TokenCallback> {
        self.callbacks.get(name)
    }

    /// The terminals that can begin a derivation of the non-terminal.
    pub fn first_symbols(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.first.get(name)
    }

    /// Returns true if the non-terminal derives the empty string.
    pub fn is_nullable(&self, name: &str) -> bool {
        self.nullable.contains(name)
    }

    pub(crate) fn first_sets(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.first
    }

    pub(crate) fn nullables(&self) -> &BTreeSet<String> {
        &self.nullable
    }
}

/// Collects productions, then validates and freezes them into a [Grammar].
///
/// # Example
/// ```
/// use relr_core::{production::Builder, sequence, Grammar};
///
/// // S -> C C
/// // C -> c C | d
/// let grammar = Grammar::builder()
///     .start("S")
///     .production("S", sequence!("C", "C"))
///     .production("C", sequence!("c", "C").union(Builder::create("d")))
///     .build()
///     .unwrap();
///
/// assert!(grammar.is_non_terminal("C"));
/// ```
#[derive(Default)]
pub struct GrammarBuilder {
    productions: Vec<(String, Builder)>,
    start: Option<String>,
    bans: BTreeSet<String>,
    callbacks: BTreeMap<String, TokenCallback>,
}

impl GrammarBuilder {
    pub fn production(mut self, name: &str, body: Builder) -> Self {
        self.productions.push((name.to_owned(), body));
        self
    }

    /// Install `%start -> symbol`.
    pub fn start(mut self, symbol: &str) -> Self {
        self.start = Some(symbol.to_owned());
        self
    }

    pub fn ban(mut self, name: &str) -> Self {
        self.bans.insert(name.to_owned());
        self
    }

    pub fn on_scan<F>(mut self, name: &str, callback: F) -> Self
    where
        F: Fn(&mut Token, &mut Context) + Send + Sync + 'static,
    {
        self.callbacks.insert(name.to_owned(), Arc::new(callback));
        self
    }

    pub fn build(self) -> RelrResult<Grammar> {
        let mut productions = BTreeMap::<String, Arc<Production>>::default();

        let start = self
            .start
            .map(|symbol| (START.to_owned(), Builder::create(&symbol)));

        for (name, body) in self.productions.into_iter().chain(start) {
            let production = body.build(&name)?;

            if productions
                .insert(name.clone(), Arc::new(production))
                .is_some()
            {
                return Err(ErrorKind::DuplicatedProduction(name).into());
            }
        }

        let start = productions.get(START).ok_or(ErrorKind::MissingStart)?;

        match start.is_single_symbol() {
            Some(symbol) if productions.contains_key(symbol) => {}
            Some(symbol) => return Err(ErrorKind::UnknownProduction(symbol.to_owned()).into()),
            None => {
                return Err(ErrorKind::MalformedStart(
                    start.first(&start.start()).iter().join(" "),
                )
                .into())
            }
        }

        let (first, nullable) = first_and_nullable(&productions);

        debug!(
            "grammar built: {} productions, nullable: [{}]",
            productions.len(),
            nullable.iter().join(", ")
        );

        Ok(Grammar {
            productions,
            bans: self.bans,
            callbacks: self.callbacks,
            first,
            nullable,
        })
    }
}

/// FIRST sets and nullable non-terminals, by fixpoint over every production.
fn first_and_nullable(
    productions: &BTreeMap<String, Arc<Production>>,
) -> (BTreeMap<String, BTreeSet<String>>, BTreeSet<String>) {
    let mut first: BTreeMap<String, BTreeSet<String>> = productions
        .keys()
        .map(|name| (name.clone(), BTreeSet::default()))
        .collect();
    let mut nullable = BTreeSet::<String>::default();

    loop {
        let mut changed = false;

        for (name, production) in productions {
            let (terminals, reaches_end) = production.walk(&production.start(), &first, &nullable);

            if reaches_end && nullable.insert(name.clone()) {
                changed = true;
            }

            let set = first.entry(name.clone()).or_default();
            let before = set.len();
            set.extend(terminals);
            changed |= set.len() != before;
        }

        if !changed {
            return (first, nullable);
        }
    }
}
