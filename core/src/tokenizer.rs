use std::collections::VecDeque;

use crate::{context::Context, token::Token};

/// Source of tokens for the parser.
///
/// `scan` returns the next token, a `$eof` token once the input is exhausted, or None
/// if the input matches no token. Implementors report every character they consume with
/// [Context::accept_input] so diagnostics can point into the source.
pub trait Tokenizer {
    fn scan(&mut self, context: &mut Context) -> Option<Token>;
}

impl<F> Tokenizer for F
where
    F: FnMut(&mut Context) -> Option<Token>,
{
    fn scan(&mut self, context: &mut Context) -> Option<Token> {
        self(context)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    /// Text skipped before the entry.
    skip: String,
    /// None for unrecognized input.
    name: Option<String>,
    lexeme: String,
}

/// An in-memory token source.
///
/// # Example
/// ```
/// use relr_core::TokenStream;
///
/// // Every word is a token named after itself.
/// let stream = TokenStream::words("id = * id");
///
/// // Or explicit (name, lexeme) pairs.
/// let stream = TokenStream::pairs([("id", "x"), ("=", "="), ("id", "y")]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    entries: VecDeque<Entry>,
    trailing: String,
}

impl TokenStream {
    /// Split the input on whitespace, every word being a token named after its lexeme.
    pub fn words(input: &str) -> Self {
        let mut stream = Self::default();
        let mut skip = String::default();
        let mut word = String::default();

        for ch in input.chars() {
            if ch.is_whitespace() {
                if !word.is_empty() {
                    stream.entries.push_back(Entry {
                        skip: std::mem::take(&mut skip),
                        name: Some(word.clone()),
                        lexeme: std::mem::take(&mut word),
                    });
                }
                skip.push(ch);
            } else {
                word.push(ch);
            }
        }

        if !word.is_empty() {
            stream.entries.push_back(Entry {
                skip,
                name: Some(word.clone()),
                lexeme: word,
            });
        } else {
            stream.trailing = skip;
        }

        stream
    }

    /// Tokens separated by a single space.
    pub fn pairs<I, N, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, L)>,
        N: ToString,
        L: ToString,
    {
        pairs
            .into_iter()
            .fold(Self::default(), |stream, (name, lexeme)| {
                stream.push(name, lexeme)
            })
    }

    pub fn push<N: ToString, L: ToString>(mut self, name: N, lexeme: L) -> Self {
        let skip = self.separator();
        self.entries.push_back(Entry {
            skip,
            name: Some(name.to_string()),
            lexeme: lexeme.to_string(),
        });
        self
    }

    /// Input no token matches.
    pub fn unrecognized<L: ToString>(mut self, lexeme: L) -> Self {
        let skip = self.separator();
        self.entries.push_back(Entry {
            skip,
            name: None,
            lexeme: lexeme.to_string(),
        });
        self
    }

    fn separator(&self) -> String {
        if self.entries.is_empty() {
            String::default()
        } else {
            " ".to_owned()
        }
    }
}

impl Tokenizer for TokenStream {
    fn scan(&mut self, context: &mut Context) -> Option<Token> {
        let Some(entry) = self.entries.pop_front() else {
            std::mem::take(&mut self.trailing)
                .chars()
                .for_each(|ch| context.accept_input(ch));
            return Some(Token::eof(context.position()));
        };

        entry.skip.chars().for_each(|ch| context.accept_input(ch));

        let position = context.position();
        entry.lexeme.chars().for_each(|ch| context.accept_input(ch));

        entry
            .name
            .map(|name| Token::new(name, entry.lexeme, position))
    }
}
