use std::sync::{Arc, Mutex};

use log::debug;
use relr::{
    sequence, AttributeScope, Builder, Context, ContextConfig, ErrorKind, Grammar, LrTable,
    Parser, Symbol, SyntaxSymbol as _, Token, TokenStream, LEXEME, UNRECOGNIZED,
};
use relr_tests::{block_tokens, expressions, init_logger, parse_words};

type Log = Arc<Mutex<Vec<String>>>;

/// Program -> Stmt*
/// Stmt    -> let id {bind} = num ; | use id {lookup} ; | Block
/// Block   -> {enter} "{" Stmt* "}" {leave}
fn blocks(log: &Log) -> Grammar {
    let lookups = Arc::clone(log);

    let bind = Builder::action(|context: &mut Context, _: &Symbol| {
        let name = context
            .symbols()
            .last()
            .map(|id| id.get(LEXEME).to_owned())
            .unwrap_or_default();

        context.scopes_mut().put(&name, "declared");
        context.set_attribute("Stmt", "binding", &name);
    });

    let lookup = Builder::action(move |context: &mut Context, _: &Symbol| {
        let name = context
            .symbols()
            .last()
            .map(|id| id.get(LEXEME).to_owned())
            .unwrap_or_default();

        let found = context.scopes().get(&name).is_some();
        debug!("lookup {} at depth {}: {}", name, context.scopes().depth(), found);

        if let Ok(mut lookups) = lookups.lock() {
            lookups.push(format!("{}:{}", name, found));
        }
    });

    let enter = Builder::action(|context: &mut Context, _: &Symbol| {
        context.scopes_mut().push_layer()
    });

    let leave = Builder::action(|context: &mut Context, _: &Symbol| {
        context.scopes_mut().pop_layer();
    });

    Grammar::builder()
        .start("Program")
        .production("Program", Builder::create("Stmt").closure())
        .production(
            "Stmt",
            sequence!("let", "id")
                .concat(bind)
                .concat(sequence!("=", "num", ";"))
                .union(sequence!("use", "id").concat(lookup).concat(Builder::create(";")))
                .union(Builder::create("Block")),
        )
        .production(
            "Block",
            enter
                .concat(Builder::create("{"))
                .concat(Builder::create("Stmt").closure())
                .concat(Builder::create("}"))
                .concat(leave),
        )
        .build()
        .expect("cannot build grammar")
}

fn parse_blocks(grammar: Grammar, config: ContextConfig, input: &str) -> Symbol {
    init_logger();

    let context = Context::from_grammar(grammar)
        .expect("cannot build table")
        .with_config(config);

    let mut parser = Parser::new(context);
    parser.reset(block_tokens(input), "input");
    parser.parse().expect("cannot parse")
}

#[test]
fn reductions_pop_every_repeated_symbol() {
    // S -> a b c*
    let grammar = Grammar::builder()
        .start("S")
        .production(
            "S",
            sequence!("a", "b").concat(Builder::create("c").closure()),
        )
        .build()
        .unwrap();

    let root = parse_words(grammar, "a b c c c").unwrap();
    let root = root.as_non_terminal().unwrap();

    assert_eq!(root.len(), 5);
    assert_eq!(root.to_string(), "S[a:a b:b c:c c:c c:c]");
}

#[test]
fn reductions_of_nested_repetitions() {
    // L -> ( L* ) | x
    let grammar = Grammar::builder()
        .start("L")
        .production(
            "L",
            Builder::create("(")
                .concat(Builder::create("L").closure())
                .concat(Builder::create(")"))
                .union(Builder::create("x")),
        )
        .build()
        .unwrap();

    let root = parse_words(grammar, "( x ( ) ( x x ) x )").unwrap();
    assert_eq!(
        root.to_string(),
        "L[(:( L[x:x] L[(:( ):)] L[(:( L[x:x] L[x:x] ):)] L[x:x] ):)]"
    );
}

#[test]
fn scopes_follow_blocks() {
    let log = Log::default();

    let root = parse_blocks(
        blocks(&log),
        ContextConfig::default(),
        "let x = 1 ; { let y = 2 ; use x ; use y ; } use y ; use x ;",
    );

    assert_eq!(root.name(), "Program");
    assert_eq!(root.as_non_terminal().map(|program| program.len()), Some(4));
    assert_eq!(
        *log.lock().unwrap(),
        ["x:true", "y:true", "y:false", "x:true"]
    );
}

#[test]
fn staged_attributes_go_to_the_next_reduction() {
    let input = "let x = 1 ; use x ; let y = 2 ;";

    let bindings = |root: &Symbol| -> Vec<String> {
        root.as_non_terminal()
            .map(|program| program.children())
            .unwrap_or_default()
            .iter()
            .map(|stmt| stmt.get("binding").to_owned())
            .collect()
    };

    let root = parse_blocks(blocks(&Log::default()), ContextConfig::default(), input);
    assert_eq!(bindings(&root), ["x", "", "y"]);

    let root = parse_blocks(
        blocks(&Log::default()),
        ContextConfig::default().with_attribute_scope(AttributeScope::Global),
        input,
    );
    assert_eq!(bindings(&root), ["x", "x", "y"]);
}

#[test]
fn banned_tokens_and_scan_callbacks() {
    let grammar = expressions()
        .ban("comment")
        .on_scan("num", |token, _| {
            *token = Token::new("n", token.lexeme(), token.position());
        })
        .build()
        .unwrap();

    let mut parser = Parser::new(Context::from_grammar(grammar).unwrap());
    parser.reset(
        TokenStream::pairs([
            ("num", "1"),
            ("comment", "#one"),
            ("+", "+"),
            ("num", "2"),
            ("comment", "#two"),
        ]),
        "input",
    );

    let root = parser.parse().unwrap();
    let lexemes: Vec<_> = root.tokens().into_iter().map(|token| token.lexeme()).collect();

    assert_eq!(lexemes, ["1", "+", "2"]);
    assert_eq!(root.to_string(), "E[T[F[n:1]] +:+ T[F[n:2]]]");
}

#[test]
fn diagnostics_expand_tabs() {
    init_logger();

    let mut parser = Parser::new(Context::from_grammar(relr_tests::cc()).unwrap());
    parser.reset(TokenStream::words("\tc d c"), "main.cc");

    let err = parser.parse().unwrap_err();
    assert_eq!(
        err.to_string(),
        [
            "main.cc:1:7:unexpected $eof, expecting c, d",
            "     1 |     c d c",
            "       |          ^",
        ]
        .join("\n")
    );
}

#[test]
fn lexical_errors_use_registered_messages() {
    init_logger();

    let grammar = Arc::new(relr_tests::cc());
    let mut table = LrTable::create(&grammar).unwrap();
    assert!(table.set_error(0, UNRECOGNIZED, "a c or a d was expected"));

    let context = Context::new(grammar, Arc::new(table));
    let mut parser = Parser::new(context);

    parser.reset(TokenStream::default().unrecognized("?"), "input");
    let err = parser.parse().unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Lexical(_)));
    assert_eq!(err.kind().diagnostic().unwrap().message, "a c or a d was expected");

    parser.reset(TokenStream::words("c").unrecognized("?"), "input");
    let err = parser.parse().unwrap_err();
    assert_eq!(err.kind().diagnostic().unwrap().message, "unrecognized input");
}
