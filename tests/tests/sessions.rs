use std::{sync::Arc, thread};

use relr::{Context, Grammar, LrTable, Parser, TokenStream};
use relr_tests::{init_logger, pointers};

fn session(grammar: &Arc<Grammar>, table: &Arc<LrTable>) -> Parser<TokenStream> {
    Parser::new(Context::new(Arc::clone(grammar), Arc::clone(table)))
}

#[test]
fn sessions_share_one_table() {
    init_logger();

    let grammar = Arc::new(pointers());
    let table = Arc::new(LrTable::create(&grammar).unwrap());

    let worker = {
        let mut parser = session(&grammar, &table);

        thread::spawn(move || {
            parser.reset(TokenStream::words("* id = * * id"), "worker");
            parser.parse().map(|root| root.to_string())
        })
    };

    let mut parser = session(&grammar, &table);
    parser.reset(TokenStream::words("id = id"), "main");
    let root = parser.parse().unwrap();

    assert_eq!(root.to_string(), "S[L[id:id] =:= R[L[id:id]]]");
    assert_eq!(
        worker.join().unwrap().unwrap(),
        "S[L[*:* R[L[id:id]]] =:= R[L[*:* R[L[*:* R[L[id:id]]]]]]]"
    );

    assert!(Arc::ptr_eq(parser.context().table(), &table));
    assert!(Arc::ptr_eq(parser.context().grammar(), &grammar));
}

#[test]
fn a_failed_session_leaves_the_others_untouched() {
    let grammar = Arc::new(pointers());
    let table = Arc::new(LrTable::create(&grammar).unwrap());

    let mut failing = session(&grammar, &table);
    let mut healthy = session(&grammar, &table);

    failing.reset(TokenStream::words("id = ="), "failing");
    healthy.reset(TokenStream::words("* id"), "healthy");

    assert!(failing.parse().is_err());
    assert!(!failing.context().symbols().is_empty());

    let root = healthy.parse().unwrap();
    let children = root.as_non_terminal().unwrap().children();
    assert!(children.iter().all(|child| !child.is_terminal()));
    assert!(root.tokens().iter().all(|token| token.position().line == 1));

    // A session can be reset in place and reused on the same table.
    failing.context_mut().reset();
    assert_eq!(failing.context().states(), &[0]);

    failing.reset(TokenStream::words("id"), "failing");
    failing.parse().unwrap();

    let context = failing.into_context();
    assert!(context.symbols().is_empty());
    assert_eq!(context.table().len(), table.len());
}
