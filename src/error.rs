use crate::pddl;

/// Everything that can go wrong while describing a problem, building its
/// planning graph or loading it from PDDL.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("fluent '{0}' is declared more than once")]
    DuplicateFluent(String),

    #[error("unknown fluent '{0}'")]
    UnknownFluent(String),

    #[error("fluent names must not be empty")]
    EmptyFluentName,

    /// A literal points past the end of the fluent universe.
    #[error("{owner} references fluent #{fluent} but only {count} fluents are declared")]
    FluentOutOfRange { owner: String, fluent: usize, count: usize },

    #[error("initial state has {found} values, expected one per fluent ({expected})")]
    StateLength { expected: usize, found: usize },

    #[error("set-level needs mutexes, but the graph was built with ignore_mutexes")]
    MutexesIgnored,

    #[error(transparent)]
    Parse(#[from] pddl::Error),

    #[error("{0}")]
    Grounding(String),

    #[error("In file {path}:\n{source}")]
    File { path: String, source: Box<Error> },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
