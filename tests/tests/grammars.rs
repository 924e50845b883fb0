use relr::{ErrorKind, SyntaxSymbol as _, EOF};
use relr_tests::{cc, expressions, parse_words, pointers};

#[test]
fn grammar_cc_accepts_two_cs() {
    let root = parse_words(cc(), "c d c d").unwrap();

    assert_eq!(root.name(), "S");
    assert_eq!(root.to_string(), "S[C[c:c C[d:d]] C[c:c C[d:d]]]");
}

#[test]
fn grammar_cc_rejects_a_missing_c_at_eof() {
    let err = parse_words(cc(), "c d c").unwrap_err();

    let diagnostic = err.kind().diagnostic().expect("a syntax error carries a diagnostic");
    assert!(matches!(err.kind(), ErrorKind::Syntax(_)));
    assert_eq!(
        diagnostic.message,
        format!("unexpected {}, expecting c, d", EOF)
    );
    assert_eq!(diagnostic.position.column, 6);
}

#[test]
fn pointer_grammar() {
    for input in ["id = id", "* id = id", "* * id", "id = * * id"] {
        let root = parse_words(pointers(), input)
            .unwrap_or_else(|err| panic!("{} should be accepted: {}", input, err));
        assert_eq!(root.name(), "S");
    }

    let err = parse_words(pointers(), "= id").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Syntax(_)));
    assert!(err.to_string().contains("unexpected ="));
}

#[test]
fn pointer_grammar_tree() {
    let root = parse_words(pointers(), "* id = id").unwrap();

    assert_eq!(root.to_string(), "S[L[*:* R[L[id:id]]] =:= R[L[id:id]]]");
}

#[test]
fn repetitions_reduce_to_flat_nodes() {
    let grammar = expressions().build().unwrap();
    let root = parse_words(grammar, "n + n * ( n + n ) + n").unwrap();

    assert_eq!(
        root.to_string(),
        "E[T[F[n:n]] +:+ T[F[n:n] *:* F[(:( E[T[F[n:n]] +:+ T[F[n:n]]] ):)]] +:+ T[F[n:n]]]"
    );

    let root = root.as_non_terminal().unwrap();
    assert_eq!(root.len(), 5);
}

#[test]
fn unbalanced_parentheses_are_rejected() {
    let grammar = || expressions().build().unwrap();

    let err = parse_words(grammar(), "( n + n").unwrap_err();
    assert!(err.to_string().contains(&format!("unexpected {}", EOF)));

    let err = parse_words(grammar(), "n )").unwrap_err();
    assert!(err.to_string().contains("unexpected )"));
}
