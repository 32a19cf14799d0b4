use std::collections::BTreeSet;

use super::literal::Literal;

/// A ground STRIPS action: a set of precondition literals that must hold and a
/// set of effect literals that hold afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    preconditions: BTreeSet<Literal>,
    effects: BTreeSet<Literal>,
    no_op: bool,
}

impl Action {
    pub fn new<P, E>(name: &str, preconditions: P, effects: E) -> Self
    where
        P: IntoIterator<Item = Literal>,
        E: IntoIterator<Item = Literal>,
    {
        Self {
            name: name.to_owned(),
            preconditions: preconditions.into_iter().collect(),
            effects: effects.into_iter().collect(),
            no_op: false,
        }
    }

    /// Persistence action that carries `literal` unchanged to the next level.
    pub fn no_op(literal: Literal, name: &str) -> Self {
        Self {
            name: name.to_owned(),
            preconditions: BTreeSet::from([literal]),
            effects: BTreeSet::from([literal]),
            no_op: true,
        }
    }

    pub fn preconditions(&self) -> &BTreeSet<Literal> {
        &self.preconditions
    }

    pub fn effects(&self) -> &BTreeSet<Literal> {
        &self.effects
    }

    pub fn is_no_op(&self) -> bool {
        self.no_op
    }

    /// True when every precondition passes `holds`.
    pub fn is_applicable<F>(&self, holds: F) -> bool
    where
        F: Fn(&Literal) -> bool,
    {
        self.preconditions.iter().all(holds)
    }

    pub(crate) fn literals(&self) -> impl Iterator<Item = &Literal> {
        self.preconditions.iter().chain(self.effects.iter())
    }
}
