//! Token kinds of an expectation line.
//!
//! Lines are tokenized one at a time, so a comment never spans a newline.

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("[")]
    BracketOpen = 0,

    #[token("]")]
    BracketClose,

    /// `#` up to the end of the line.
    #[regex(r"#[^\n]*", allow_greedy = true)]
    Comment,

    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    /// A bug, tag, query or status.
    #[regex(r"[^ \t\r\n\f\[\]#]+")]
    Word,
}

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        self == SyntaxKind::Whitespace
    }
}
