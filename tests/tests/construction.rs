use relr::{
    sequence, Action, Builder, ErrorKind, Grammar, Items, LrTable, NodeSet, Production, EOF,
    END, EPSILON, START,
};
use relr_tests::{cc, expressions, init_logger, pointers};

fn drive(production: &Production, symbols: &[&str]) -> NodeSet {
    symbols
        .iter()
        .fold(production.start(), |nodes, symbol| production.step(&nodes, symbol))
}

#[test]
fn sequences_accept_exactly_their_symbols() {
    let symbols = ["a", "b", "c", "d"];
    let production = sequence!("a", "b", "c", "d").build("P").unwrap();

    assert!(production.is_end(&drive(&production, &symbols)));

    for len in 0..symbols.len() {
        let nodes = drive(&production, &symbols[..len]);
        assert!(!nodes.is_empty());
        assert!(!production.is_end(&nodes));
    }

    assert!(drive(&production, &["a", "c"]).is_empty());
}

#[test]
fn closure_is_idempotent() {
    for grammar in [cc(), pointers(), expressions().build().unwrap()] {
        let start = Items::start(&grammar).unwrap();
        assert_eq!(Items::close(start.iter().cloned(), &grammar), start);

        for symbol in start.first().filter(|symbol| *symbol != END) {
            let next = start.goto(symbol, &grammar);
            assert_eq!(Items::close(next.iter().cloned(), &grammar), next);
        }
    }
}

#[test]
fn tables_are_deterministic() {
    init_logger();

    let grammars: [fn() -> Grammar; 3] = [cc, pointers, || expressions().build().unwrap()];

    for grammar in grammars {
        let first = LrTable::create(&grammar()).unwrap();
        let second = LrTable::create(&grammar()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }
}

#[test]
fn accept_is_only_reachable_on_eof() {
    for grammar in [cc(), pointers(), expressions().build().unwrap()] {
        let table = LrTable::create(&grammar).unwrap();

        let accepting: Vec<_> = (0..table.len())
            .flat_map(|state| {
                table
                    .transitions(state)
                    .filter(|(_, action)| **action == Action::Accept)
                    .map(move |(symbol, _)| (state, symbol.to_owned()))
            })
            .collect();

        assert_eq!(accepting.len(), 1);
        assert_eq!(accepting[0].1, EOF);

        // The accepting state is entered from the initial state over the start symbol.
        let start = grammar.start().unwrap().is_single_symbol().unwrap().to_owned();
        assert_eq!(table.get(0, &start), Some(&Action::Goto(accepting[0].0)));
    }
}

#[test]
fn malformed_start_is_rejected_at_build() {
    let err = Grammar::builder()
        .production("S", Builder::create("a"))
        .build()
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::MissingStart));

    let err = Grammar::builder()
        .start("S")
        .production("A", Builder::create("a"))
        .build()
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnknownProduction(name) if name == "S"));

    let err = Grammar::builder()
        .production(START, sequence!("S", "S"))
        .production("S", Builder::create("a"))
        .build()
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::MalformedStart(_)));
}

#[test]
fn reserved_and_duplicated_names_are_rejected() {
    let err = Grammar::builder()
        .start("S")
        .production("S", sequence!("a", EOF))
        .build()
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::ReservedSymbol { symbol, .. } if symbol == EOF));

    let err = Grammar::builder()
        .start("S")
        .production("S", Builder::create("a"))
        .production("S", Builder::create("b"))
        .build()
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::DuplicatedProduction(name) if name == "S"));

    // An explicit epsilon is an empty transition, not a symbol.
    let grammar = Grammar::builder()
        .start("S")
        .production("S", sequence!("a", EPSILON, "b"))
        .build()
        .unwrap();
    assert_eq!(grammar.terminals().into_iter().collect::<Vec<_>>(), ["a", "b"]);
}

#[test]
fn ambiguous_grammars_conflict() {
    // S -> a | A ; A -> a
    let grammar = Grammar::builder()
        .start("S")
        .production("S", Builder::create("a").union(Builder::create("A")))
        .production("A", Builder::create("a"))
        .build()
        .unwrap();

    let err = LrTable::create(&grammar).unwrap_err();
    assert!(err.kind().is_grammar_error());
    assert!(matches!(
        err.kind(),
        ErrorKind::Conflict { symbol, existing: Action::Reduce(_), incoming: Action::Reduce(_), .. }
            if symbol == EOF
    ));
}
