use std::iter::Peekable;
use std::str::CharIndices;

use super::{Error, Position};
use KeywordToken::*;
use TokenKind::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub col: usize,
    pub len: usize,
}

impl Span {
    pub fn new(line: usize, col: usize, len: usize) -> Self {
        Self { line, col, len }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeywordToken {
    Define,
    Domain,
    Problem,
    Requirements,
    Types,
    Predicates,
    Action,
    Parameters,
    Precondition,
    Effect,
    Objects,
    Init,
    Goal,
    And,
    Not,
    Strips,
    Typing,
    NegativePreconditions,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind<'a> {
    OpenParenthesis,
    CloseParenthesis,
    Colon,
    QuestionMark,
    Minus,
    Keyword(KeywordToken),
    Identifier(&'a str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub span: Span,
    pub kind: TokenKind<'a>,
}

pub struct Lexer<'a> {
    text: &'a str,
    it: Peekable<CharIndices<'a>>,
    line: usize, // current source line, used for error reporting by Tokens
    col: usize,  // current source column, used for error reporting by Tokens
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, it: text.char_indices().peekable(), line: 1, col: 1 }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (offset, c) = self.next_char()?;
            let new_token = match c {
                '(' => Ok(self.single(OpenParenthesis)),
                ')' => Ok(self.single(CloseParenthesis)),
                ':' => Ok(self.single(Colon)),
                '?' => Ok(self.single(QuestionMark)),
                '-' => Ok(self.single(Minus)),
                c if c.is_whitespace() => {
                    self.col += 1;
                    continue;
                }
                c if c.is_alphanumeric() || c == '_' => Ok(self.identifier(offset)),
                _ => Err(Error::new(Position::Span(Span::new(self.line, self.col, 1)), "Unexpected character.")),
            };
            match &new_token {
                Ok(t) => self.col += t.span.len,
                Err(_) => self.col += 1,
            }
            return Some(new_token);
        }
    }
}

impl<'a> Lexer<'a> {
    fn next_char(&mut self) -> Option<(usize, char)> {
        loop {
            match self.it.next() {
                // Newline handler:
                Some((_, '\n')) => {
                    self.col = 1;
                    self.line += 1;
                }
                // Comments:
                Some((_, ';')) => while self.it.next_if(|(_, c)| *c != '\n').is_some() {},
                c => return c,
            }
        }
    }

    fn single(&self, kind: TokenKind<'a>) -> Token<'a> {
        Token { span: Span::new(self.line, self.col, 1), kind }
    }

    fn identifier(&mut self, offset: usize) -> Token<'a> {
        let mut len = 1;
        while self.it.next_if(|(_, c)| c.is_alphanumeric() || *c == '_' || *c == '-').is_some() {
            len += 1;
        }
        let slice = if let Some((identifier_end, _)) = self.it.peek() {
            &self.text[offset..*identifier_end]
        } else {
            &self.text[offset..]
        };
        let kind = match slice.to_ascii_lowercase().as_str() {
            "define" => Keyword(Define),
            "domain" => Keyword(Domain),
            "problem" => Keyword(Problem),
            "requirements" => Keyword(Requirements),
            "types" => Keyword(Types),
            "predicates" => Keyword(Predicates),
            "action" => Keyword(Action),
            "parameters" => Keyword(Parameters),
            "precondition" => Keyword(Precondition),
            "effect" => Keyword(Effect),
            "objects" => Keyword(Objects),
            "init" => Keyword(Init),
            "goal" => Keyword(Goal),
            "and" => Keyword(And),
            "not" => Keyword(Not),
            "strips" => Keyword(Strips),
            "typing" => Keyword(Typing),
            "negative-preconditions" => Keyword(NegativePreconditions),
            _ => Identifier(slice),
        };
        Token { span: Span::new(self.line, self.col, len), kind }
    }
}
