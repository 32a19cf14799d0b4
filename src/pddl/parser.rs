use std::iter::Peekable;

use super::ast::{self, Stmt, TypedList};
use super::lexer::{KeywordToken, Lexer, Token, TokenKind};
use super::{Error, Position};

/// Parses the STRIPS subset of PDDL: typed domains with ground or
/// parameterised actions whose preconditions and effects are conjunctions of
/// possibly negated atoms.
pub struct Parser<'a> {
    lexer: Peekable<Lexer<'a>>,
}

impl<'a> Iterator for Parser<'a> {
    type Item = Result<Stmt<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lexer.peek()?;
        let r = self.root();
        if r.is_err() {
            self.error_recover();
        }
        Some(r)
    }
}

const EXPECTED_IDENTIFIER: &str = "Expected identifier.";
const EXPECTED_COLON: &str = "Expected ':'.";
const EXPECTED_OPEN_PARENTHESIS: &str = "Expected '('.";
const EXPECTED_CLOSE_PARENTHESIS: &str = "Expected matched ')'.";

macro_rules! expect {
    ($input:expr, {$($p:pat => $b:expr$(,)?)+}, $err:expr) => {
        match $input {
            $($p => $b,)+
            Some(Ok(Token{span,..})) => Err(Error { pos: Position::Span(span), message:String::from($err) }),
            Some(Err(e)) => Err(e),
            None => Err(Error { pos: Position::EOF, message:String::from($err) })
        }
    };
}

impl<'a> Parser<'a> {
    pub fn new(code: &'a str) -> Self {
        Self { lexer: Lexer::new(code).peekable() }
    }

    /// Nothing sensible follows a broken definition, so the rest of the input
    /// is dropped.
    fn error_recover(&mut self) {
        for _ in self.lexer.by_ref() {}
    }

    fn root(&mut self) -> Result<Stmt<'a>, Error> {
        use KeywordToken::*;
        use TokenKind::*;
        expect!(self.lexer.next(), {Some(Ok(Token{kind:OpenParenthesis,..})) => Ok(())}, EXPECTED_OPEN_PARENTHESIS)?;
        expect!(self.lexer.next(), {Some(Ok(Token{kind:Keyword(Define),..})) => Ok(())}, "Expected 'define'.")?;
        expect!(self.lexer.next(), {Some(Ok(Token{kind:OpenParenthesis,..})) => Ok(())}, EXPECTED_OPEN_PARENTHESIS)?;
        let body = expect!(self.lexer.next(), {
            Some(Ok(Token{kind:Keyword(Domain),..})) => self.domain(),
            Some(Ok(Token{kind:Keyword(Problem),..})) => self.problem(),
        }, "Expected 'domain' or 'problem'.")?;
        expect!(self.lexer.next(), {Some(Ok(Token{kind:CloseParenthesis,..})) => Ok(())}, EXPECTED_CLOSE_PARENTHESIS)?;
        Ok(body)
    }

    fn identifier(&mut self, err: &str) -> Result<&'a str, Error> {
        expect!(self.lexer.next(), {Some(Ok(Token{kind:TokenKind::Identifier(s),..})) => Ok(s)}, err)
    }

    fn close(&mut self) -> Result<(), Error> {
        expect!(self.lexer.next(), {Some(Ok(Token{kind:TokenKind::CloseParenthesis,..})) => Ok(())}, EXPECTED_CLOSE_PARENTHESIS)
    }

    fn next_is(&mut self, kind: TokenKind<'a>) -> bool {
        self.lexer.next_if(|t| matches!(t, Ok(Token{kind:k,..}) if *k == kind)).is_some()
    }

    fn peek_is(&mut self, kind: TokenKind<'a>) -> bool {
        matches!(self.lexer.peek(), Some(Ok(Token{kind:k,..})) if *k == kind)
    }

    fn domain(&mut self) -> Result<Stmt<'a>, Error> {
        use KeywordToken::*;
        use TokenKind::*;
        let name = self.identifier("Expected domain name.")?;
        self.close()?;
        let mut requirements = Vec::new();
        let mut types = Vec::new();
        let mut predicates = Vec::new();
        let mut actions = Vec::new();
        while self.next_is(OpenParenthesis) {
            expect!(self.lexer.next(), {Some(Ok(Token{kind:Colon,..})) => Ok(())}, EXPECTED_COLON)?;
            expect!(self.lexer.next(), {
                Some(Ok(Token{kind:Keyword(Requirements),..})) => Ok(requirements = self.requirements()?),
                Some(Ok(Token{kind:Keyword(Types),..})) => Ok(types = self.typed_names()?),
                Some(Ok(Token{kind:Keyword(Predicates),..})) => Ok(predicates = self.predicates()?),
                Some(Ok(Token{kind:Keyword(Action),..})) => Ok(actions.push(self.action()?)),
            }, "Expected :requirements, :types, :predicates, or :action.")?;
            self.close()?;
        }
        Ok(Stmt::Domain(ast::Domain { name, requirements, types, predicates, actions }))
    }

    fn problem(&mut self) -> Result<Stmt<'a>, Error> {
        use KeywordToken::*;
        use TokenKind::*;
        let name_span = self.lexer.peek().and_then(|t| t.as_ref().ok()).map(|t| t.span);
        let name = self.identifier("Expected problem name.")?;
        self.close()?;
        let mut domain = None;
        let mut objects = Vec::new();
        let mut init = Vec::new();
        let mut goal = None;
        while self.next_is(OpenParenthesis) {
            expect!(self.lexer.next(), {Some(Ok(Token{kind:Colon,..})) => Ok(())}, EXPECTED_COLON)?;
            expect!(self.lexer.next(), {
                Some(Ok(Token{kind:Keyword(Domain),..})) => Ok(domain = Some(self.identifier(EXPECTED_IDENTIFIER)?)),
                Some(Ok(Token{kind:Keyword(Requirements),..})) => self.requirements().map(|_| ()),
                Some(Ok(Token{kind:Keyword(Objects),..})) => Ok(objects = self.typed_names()?),
                Some(Ok(Token{kind:Keyword(Init),..})) => Ok(init = self.group()?),
                Some(Ok(Token{kind:Keyword(Goal),..})) => Ok(goal = Some(self.expr()?)),
            }, "Expected :domain, :requirements, :objects, :init, or :goal.")?;
            self.close()?;
        }
        let missing = |message: &str| match name_span {
            Some(span) => Error::new(Position::Span(span), message),
            None => Error::new(Position::EOF, message),
        };
        let domain = domain.ok_or_else(|| missing("Problem does not name its :domain."))?;
        let goal = goal.ok_or_else(|| missing("Problem does not define a :goal."))?;
        Ok(Stmt::Problem(ast::Problem { name, domain, objects, init, goal }))
    }

    fn requirements(&mut self) -> Result<Vec<ast::Requirement>, Error> {
        use KeywordToken::*;
        use TokenKind::*;
        let mut r = Vec::new();
        while self.next_is(Colon) {
            expect!(self.lexer.next(), {
                Some(Ok(Token{kind:Keyword(Strips),..})) => Ok(r.push(ast::Requirement::Strips)),
                Some(Ok(Token{kind:Keyword(Typing),..})) => Ok(r.push(ast::Requirement::Typing)),
                Some(Ok(Token{kind:Keyword(NegativePreconditions),..})) => Ok(r.push(ast::Requirement::NegativePreconditions)),
            }, "Unsupported requirement, expected :strips, :typing, or :negative-preconditions.")?;
        }
        Ok(r)
    }

    fn predicates(&mut self) -> Result<Vec<ast::Predicate<'a>>, Error> {
        use TokenKind::*;
        let mut predicates = Vec::new();
        while self.next_is(OpenParenthesis) {
            let name = self.identifier(EXPECTED_IDENTIFIER)?;
            let variables = self.typed_variables()?;
            predicates.push(ast::Predicate { name, variables });
            self.close()?;
        }
        Ok(predicates)
    }

    fn action(&mut self) -> Result<ast::Action<'a>, Error> {
        use KeywordToken::*;
        use TokenKind::*;
        let name = self.identifier(EXPECTED_IDENTIFIER)?;
        let mut parameters = Vec::new();
        let mut precondition = None;
        let mut effect = None;
        while self.next_is(Colon) {
            expect!(self.lexer.next(), {
                Some(Ok(Token{kind:Keyword(Parameters),..})) => {
                    expect!(self.lexer.next(), {Some(Ok(Token{kind:OpenParenthesis,..})) => Ok(())}, EXPECTED_OPEN_PARENTHESIS)?;
                    parameters = self.typed_variables()?;
                    self.close()
                },
                Some(Ok(Token{kind:Keyword(Precondition),..})) => Ok(precondition = Some(self.expr()?)),
                Some(Ok(Token{kind:Keyword(Effect),..})) => Ok(effect = Some(self.expr()?)),
            }, "Expected :parameters, :precondition, or :effect.")?;
        }
        Ok(ast::Action { name, parameters, precondition, effect })
    }

    /// `?a ?b - kind ?c` up to the closing parenthesis, which is left in place.
    fn typed_variables(&mut self) -> Result<Vec<TypedList<'a>>, Error> {
        use TokenKind::*;
        let mut lists = Vec::new();
        while self.peek_is(QuestionMark) {
            let mut identifiers = Vec::new();
            while self.next_is(QuestionMark) {
                identifiers.push(self.identifier(EXPECTED_IDENTIFIER)?);
            }
            let kind = if self.next_is(Minus) { self.identifier("Expected type name.")? } else { "object" };
            lists.push(TypedList { identifiers, kind });
        }
        Ok(lists)
    }

    /// `a b - kind c` up to the closing parenthesis, which is left in place.
    fn typed_names(&mut self) -> Result<Vec<TypedList<'a>>, Error> {
        use TokenKind::*;
        let mut lists = Vec::new();
        while let Some(Ok(Token{kind:Identifier(_),..})) = self.lexer.peek() {
            let mut identifiers = Vec::new();
            while let Some(Ok(Token{kind:Identifier(s),..})) = self.lexer.next_if(|t| matches!(t, Ok(Token{kind:Identifier(_),..}))) {
                identifiers.push(s);
            }
            let kind = if self.next_is(Minus) { self.identifier("Expected type name.")? } else { "object" };
            lists.push(TypedList { identifiers, kind });
        }
        Ok(lists)
    }

    /// Expressions up to the closing parenthesis, which is left in place.
    fn group(&mut self) -> Result<Vec<ast::Expr<'a>>, Error> {
        let mut group = Vec::new();
        while self.peek_is(TokenKind::OpenParenthesis) {
            group.push(self.expr()?);
        }
        Ok(group)
    }

    fn atom(&mut self, name: &'a str) -> Result<ast::Expr<'a>, Error> {
        use TokenKind::*;
        let mut terms = Vec::new();
        loop {
            match self.lexer.peek() {
                Some(Ok(Token{kind:QuestionMark,..})) => {
                    self.lexer.next();
                    terms.push(ast::Term::Variable(self.identifier(EXPECTED_IDENTIFIER)?));
                }
                Some(Ok(Token{kind:Identifier(s),..})) => {
                    terms.push(ast::Term::Name(*s));
                    self.lexer.next();
                }
                _ => return Ok(ast::Expr::Atom(ast::Atom { name, terms })),
            }
        }
    }

    fn expr(&mut self) -> Result<ast::Expr<'a>, Error> {
        use KeywordToken::{And, Not};
        use TokenKind::*;
        expect!(self.lexer.next(), {Some(Ok(Token{kind:OpenParenthesis,..})) => Ok(())}, EXPECTED_OPEN_PARENTHESIS)?;
        let result = expect!(self.lexer.next(), {
            Some(Ok(Token{kind:Keyword(And),..})) => self.group().map(ast::Expr::And),
            Some(Ok(Token{kind:Keyword(Not),..})) => self.expr().map(|e| ast::Expr::Not(Box::new(e))),
            Some(Ok(Token{kind:Identifier(s),..})) => self.atom(s),
        }, "Expected expression.")?;
        self.close()?;
        Ok(result)
    }
}
