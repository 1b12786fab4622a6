//! Parser for expectation documents.
//!
//! The document is read line by line. Comment and blank lines shape the
//! chunks; every other line is tokenized with [`crate::lexer`] and parsed as
//! an expectation:
//!
//! ```text
//! [bug] [ tags ] query [ statuses ] [# comment]
//! ```
//!
//! Comments between `# BEGIN TAG HEADER` and `# END TAG HEADER` also declare
//! the document's tag sets:
//!
//! ```text
//! # OS
//! # tags: [ linux mac
//! #         win ]
//! ```

use rowan::{TextRange, TextSize};

use crate::content::{Chunk, Content, Expectation, TAG_HEADER_END, TAG_HEADER_START};
use crate::lexer::{Token, lex, token_text};
use crate::syntax_kind::SyntaxKind;
use crate::{Error, Result};

/// A leading word is only a bug when it starts with this.
const BUG_PREFIX: &str = "crbug.com/";

/// Parses an expectation document.
pub fn parse(source: &str) -> Result<Content> {
    let mut parser = Parser::new();
    let mut offset = 0;
    for (i, raw) in source.split_inclusive('\n').enumerate() {
        parser.line(i + 1, offset, raw.trim_end_matches(['\n', '\r']))?;
        offset += raw.len();
    }
    parser.finish()
}

#[derive(Debug)]
enum HeaderState {
    Outside,
    Inside {
        start_line: usize,
        span: TextRange,
        name: String,
        /// Tags of the set being declared, until its closing `]`.
        tags: Option<Vec<String>>,
    },
}

struct Parser {
    content: Content,
    chunk: Chunk,
    header: HeaderState,
}

impl Parser {
    fn new() -> Self {
        Self {
            content: Content::default(),
            chunk: Chunk::default(),
            header: HeaderState::Outside,
        }
    }

    fn line(&mut self, line: usize, offset: usize, text: &str) -> Result<()> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.flush();
            self.content.chunks.push(Chunk::blank());
            return Ok(());
        }

        if trimmed.starts_with('#') {
            if !self.chunk.expectations.is_empty() {
                self.flush();
            }
            let span = line_span(offset, text);
            self.header_comment(line, span, trimmed);
            self.chunk.comments.push(trimmed.to_string());
            return Ok(());
        }

        let expectation = ExpectationParser::new(text, line, offset).parse()?;
        self.chunk.expectations.push(expectation);
        Ok(())
    }

    fn header_comment(&mut self, line: usize, span: TextRange, comment: &str) {
        match &mut self.header {
            HeaderState::Outside => {
                if comment.starts_with(TAG_HEADER_START) {
                    self.header = HeaderState::Inside {
                        start_line: line,
                        span,
                        name: String::new(),
                        tags: None,
                    };
                }
            }
            HeaderState::Inside { name, tags, .. } => {
                if comment.starts_with(TAG_HEADER_END) {
                    if let Some(tags) = tags.take() {
                        self.content.tags.add_set(name.clone(), tags);
                    }
                    self.header = HeaderState::Outside;
                    return;
                }

                let body = comment.trim_start_matches('#').trim();
                let words = match (tags.is_some(), body.strip_prefix("tags:")) {
                    (true, _) => body,
                    (false, Some(rest)) => {
                        *tags = Some(Vec::new());
                        rest
                    }
                    (false, None) => {
                        if !body.is_empty() {
                            *name = body.to_string();
                        }
                        return;
                    }
                };

                let Some(list) = tags.as_mut() else {
                    return;
                };
                if collect_tags(words, list) {
                    let list = std::mem::take(list);
                    *tags = None;
                    self.content.tags.add_set(name.clone(), list);
                }
            }
        }
    }

    fn flush(&mut self) {
        if !self.chunk.is_blank() {
            self.content.chunks.push(std::mem::take(&mut self.chunk));
        }
    }

    fn finish(mut self) -> Result<Content> {
        if let HeaderState::Inside {
            start_line, span, ..
        } = self.header
        {
            return Err(Error::Syntax {
                line: start_line,
                span,
                message: format!("missing '{TAG_HEADER_END}'"),
            });
        }
        self.flush();
        Ok(self.content)
    }
}

/// Appends the tags in `words` to `list`. Returns true once the list is closed.
fn collect_tags(words: &str, list: &mut Vec<String>) -> bool {
    for word in words.split_whitespace() {
        let word = word.trim_start_matches('[');
        let (word, closed) = match word.strip_suffix(']') {
            Some(word) => (word, true),
            None => (word, false),
        };
        if !word.is_empty() {
            list.push(word.to_string());
        }
        if closed {
            return true;
        }
    }
    false
}

fn line_span(offset: usize, text: &str) -> TextRange {
    TextRange::at(TextSize::from(offset as u32), TextSize::from(text.len() as u32))
}

/// A bracketed list or a bare word of an expectation line.
enum Item<'src> {
    Word(&'src str),
    List(Vec<&'src str>),
}

struct ExpectationParser<'src> {
    text: &'src str,
    line: usize,
    offset: TextSize,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'src> ExpectationParser<'src> {
    fn new(text: &'src str, line: usize, offset: usize) -> Self {
        let tokens = lex(text)
            .into_iter()
            .filter(|t| !t.kind.is_trivia())
            .collect();
        Self {
            text,
            line,
            offset: TextSize::from(offset as u32),
            tokens,
            pos: 0,
        }
    }

    fn error(&self, span: TextRange, message: impl Into<String>) -> Error {
        Error::Syntax {
            line: self.line,
            span: TextRange::new(span.start() + self.offset, span.end() + self.offset),
            message: message.into(),
        }
    }

    fn whole_line(&self) -> TextRange {
        TextRange::at(0.into(), TextSize::from(self.text.len() as u32))
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).copied();
        self.pos += 1;
        token
    }

    fn list(&mut self, open: Token) -> Result<Vec<&'src str>> {
        let mut words = Vec::new();
        loop {
            let Some(token) = self.bump() else {
                return Err(self.error(open.span, "expected ']'"));
            };
            match token.kind {
                SyntaxKind::Word => words.push(token_text(self.text, &token)),
                SyntaxKind::BracketClose => return Ok(words),
                SyntaxKind::BracketOpen => return Err(self.error(token.span, "unexpected '['")),
                SyntaxKind::Comment => return Err(self.error(open.span, "expected ']'")),
                SyntaxKind::Whitespace => {
                    return Err(self.error(token.span, "unexpected characters"));
                }
            }
        }
    }

    fn parse(mut self) -> Result<Expectation> {
        let mut items = Vec::new();
        let mut comment = "";
        while let Some(token) = self.bump() {
            match token.kind {
                SyntaxKind::Word => items.push(Item::Word(token_text(self.text, &token))),
                SyntaxKind::BracketOpen => items.push(Item::List(self.list(token)?)),
                SyntaxKind::Comment => {
                    comment = token_text(self.text, &token).trim_end();
                    break;
                }
                SyntaxKind::BracketClose => return Err(self.error(token.span, "unexpected ']'")),
                SyntaxKind::Whitespace => {
                    return Err(self.error(token.span, "unexpected characters"));
                }
            }
        }

        let (bug, tags, query, status) = match items.as_slice() {
            [Item::Word(query), Item::List(status)] => ("", &[][..], *query, status),
            [Item::Word(bug), Item::Word(query), Item::List(status)] if is_bug(bug) => {
                (*bug, &[][..], *query, status)
            }
            [Item::List(tags), Item::Word(query), Item::List(status)] => {
                ("", tags.as_slice(), *query, status)
            }
            [
                Item::Word(bug),
                Item::List(tags),
                Item::Word(query),
                Item::List(status),
            ] if is_bug(bug) => (*bug, tags.as_slice(), *query, status),
            _ => {
                return Err(self.error(
                    self.whole_line(),
                    "expected '[bug] [ tags ] query [ status ]'",
                ));
            }
        };

        if status.is_empty() {
            return Err(self.error(self.whole_line(), "expected at least one status"));
        }

        Ok(Expectation {
            line: self.line,
            bug: bug.to_string(),
            tags: tags.iter().copied().collect(),
            query: query.to_string(),
            status: status.iter().map(|s| s.to_string()).collect(),
            comment: comment.to_string(),
        })
    }
}

fn is_bug(word: &str) -> bool {
    word.starts_with(BUG_PREFIX)
}
