pub mod ast;
pub mod lexer;
pub mod parser;
mod compiler;

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{Error as CrateError, Result};
use crate::problem::Problem;
use lexer::Span;
use parser::Parser;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    Span(Span),
    EOF,
}

/// Syntax error with the position it was found at.
#[derive(Clone, PartialEq, Eq)]
pub struct Error {
    pub pos: Position,
    pub message: String,
}

impl Error {
    pub fn new(pos: Position, message: &str) -> Self {
        Self { pos, message: message.to_owned() }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Position::Span(span) => write!(f, "line:{} col:{} {}", span.line, span.col, self.message),
            Position::EOF => write!(f, "end of file: {}", self.message),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for Error {}

/// A ground problem together with the initial state vector it starts from.
#[derive(Debug, Clone)]
pub struct Instance {
    pub problem: Problem,
    pub initial_state: Vec<bool>,
}

/// The only definition in `code`. Anything after it, well formed or not, is
/// an error.
fn single_definition(code: &str) -> Result<Option<ast::Stmt<'_>>> {
    let mut parser = Parser::new(code);
    let stmt = match parser.next() {
        Some(stmt) => stmt?,
        None => return Ok(None),
    };
    match parser.next() {
        None => Ok(Some(stmt)),
        Some(Err(e)) => Err(e.into()),
        Some(Ok(_)) => Err(CrateError::Grounding("Expected a single definition.".to_owned())),
    }
}

/// Parses a domain and a problem definition and grounds them.
pub fn load(domain_code: &str, problem_code: &str) -> Result<Instance> {
    let domain = match single_definition(domain_code)? {
        Some(ast::Stmt::Domain(domain)) => domain,
        _ => return Err(CrateError::Grounding("Expected a domain definition.".to_owned())),
    };
    let problem = match single_definition(problem_code)? {
        Some(ast::Stmt::Problem(problem)) => problem,
        _ => return Err(CrateError::Grounding("Expected a problem definition.".to_owned())),
    };
    if !domain.name.eq_ignore_ascii_case(problem.domain) {
        return Err(CrateError::Grounding(format!(
            "Problem {} is defined for domain {}, not {}.",
            problem.name, problem.domain, domain.name
        )));
    }
    let instance = compiler::Compiler::new(&domain, &problem)?.compile()?;
    info!(
        domain = domain.name,
        problem = problem.name,
        fluents = instance.problem.fluents().len(),
        actions = instance.problem.actions().len(),
        "loaded planning problem"
    );
    Ok(instance)
}

pub fn load_files<P: AsRef<Path>, Q: AsRef<Path>>(domain_path: P, problem_path: Q) -> Result<Instance> {
    let read = |path: &Path| {
        fs::read_to_string(path).map_err(|e| CrateError::File {
            path: path.display().to_string(),
            source: Box::new(e.into()),
        })
    };
    let domain_code = read(domain_path.as_ref())?;
    let problem_code = read(problem_path.as_ref())?;
    load(&domain_code, &problem_code).map_err(|e| {
        let in_domain = match &e {
            // tell which of the two files the position refers to
            CrateError::Parse(parse_error) => {
                Parser::new(&domain_code).any(|r| r.as_ref().err() == Some(parse_error))
            }
            _ => false,
        };
        if !matches!(e, CrateError::Parse(_)) {
            return e;
        }
        let path = if in_domain { domain_path.as_ref() } else { problem_path.as_ref() };
        CrateError::File { path: path.display().to_string(), source: Box::new(e) }
    })
}
