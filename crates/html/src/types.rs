use crate::event::Attribute;

/// A lexical token. Names are canonical (see [`crate::names`]); text is fully decoded.
///
/// Comments, doctypes and processing instructions are consumed by the lexer and
/// never become tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    StartTag {
        name: String,
        attributes: Vec<Attribute>,
        self_closing: bool,
        /// Byte offset of the `<`.
        position: usize,
    },
    EndTag {
        name: String,
        position: usize,
    },
    Text(String),
}

/// Tokens for one input, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
