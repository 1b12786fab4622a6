//! Lexer for expectation lines.
//!
//! Produces span-based tokens without storing text. Text is sliced from the
//! source only when needed with [`token_text`].
//!
//! Every character belongs to some token, so lexing never fails.

use std::ops::Range;

use logos::Logos;
use rowan::TextRange;

use crate::syntax_kind::SyntaxKind;

/// Zero-copy token: kind + span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

impl Token {
    #[inline]
    pub fn new(kind: SyntaxKind, span: TextRange) -> Self {
        Self { kind, span }
    }
}

fn range_to_text_range(range: Range<usize>) -> TextRange {
    TextRange::new((range.start as u32).into(), (range.end as u32).into())
}

/// Tokenizes `source` into span-based tokens, trivia included.
pub fn lex(source: &str) -> Vec<Token> {
    let mut lexer = SyntaxKind::lexer(source);
    let mut tokens = Vec::new();
    while let Some(kind) = lexer.next() {
        if let Ok(kind) = kind {
            tokens.push(Token::new(kind, range_to_text_range(lexer.span())));
        }
    }
    tokens
}

/// Retrieves the text slice for a token.
#[inline]
pub fn token_text<'src>(source: &'src str, token: &Token) -> &'src str {
    &source[Range::<usize>::from(token.span)]
}
