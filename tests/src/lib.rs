//! Grammars and helpers shared by the integration tests.

use relr::{
    sequence, Builder, Context, Grammar, GrammarBuilder, Parser, RelrResult, Symbol, TokenStream,
};

/// Keywords and punctuation of the block language, named after themselves.
const KEYWORDS: [&str; 7] = ["let", "use", "=", ";", "{", "}", "+"];

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// S -> C C
/// C -> c C | d
pub fn cc() -> Grammar {
    Grammar::builder()
        .start("S")
        .production("S", sequence!("C", "C"))
        .production("C", sequence!("c", "C").union(Builder::create("d")))
        .build()
        .expect("cannot build grammar")
}

/// S -> L = R | R
/// L -> * R | id
/// R -> L
pub fn pointers() -> Grammar {
    Grammar::builder()
        .start("S")
        .production("S", sequence!("L", "=", "R").union(Builder::create("R")))
        .production("L", sequence!("*", "R").union(Builder::create("id")))
        .production("R", Builder::create("L"))
        .build()
        .expect("cannot build grammar")
}

/// E -> T (+ T)*
/// T -> F (* F)*
/// F -> ( E ) | n
pub fn expressions() -> GrammarBuilder {
    Grammar::builder()
        .start("E")
        .production(
            "E",
            Builder::create("T").concat(sequence!("+", "T").closure()),
        )
        .production(
            "T",
            Builder::create("F").concat(sequence!("*", "F").closure()),
        )
        .production("F", sequence!("(", "E", ")").union(Builder::create("n")))
}

/// Parse whitespace-separated words, every word being a token named after itself.
pub fn parse_words(grammar: Grammar, input: &str) -> RelrResult<Symbol> {
    init_logger();
    let mut parser = Parser::new(Context::from_grammar(grammar)?);
    parser.reset(TokenStream::words(input), "input");
    parser.parse()
}

/// Tokens of the block language: keywords, `num` and `id`.
pub fn block_tokens(input: &str) -> TokenStream {
    TokenStream::pairs(input.split_whitespace().map(|word| {
        let name = if KEYWORDS.contains(&word) {
            word
        } else if word.chars().all(|ch| ch.is_ascii_digit()) {
            "num"
        } else {
            "id"
        };

        (name, word)
    }))
}
