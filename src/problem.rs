pub mod action;
pub mod literal;

pub use action::Action;
pub use literal::{Fluent, Literal, Named};

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::error::{Error, Result};

/// A ground planning problem: the ordered fluent universe, the available
/// actions and the literals that must hold at the goal.
#[derive(Clone)]
pub struct Problem {
    fluents: Vec<String>,
    fluent_mapping: HashMap<String, Fluent>,
    actions: Vec<Action>,
    goal: BTreeSet<Literal>,
}

impl fmt::Debug for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Problem:")?;
        writeln!(f, "Fluents: {:?}", self.fluents)?;
        writeln!(f, "Actions:")?;
        for action in &self.actions {
            let pre = action.preconditions().iter().map(|l| self.display(*l).to_string()).collect::<Vec<_>>();
            let eff = action.effects().iter().map(|l| self.display(*l).to_string()).collect::<Vec<_>>();
            writeln!(f, "\t{}: {:?} -> {:?}", action.name, pre, eff)?;
        }
        let goal = self.goal.iter().map(|l| self.display(*l).to_string()).collect::<Vec<_>>();
        write!(f, "Goal: {:?}", goal)
    }
}

impl Problem {
    /// Builds a problem from already resolved literals, rejecting any literal
    /// whose fluent lies outside `fluents`.
    pub fn new<G>(fluents: Vec<String>, actions: Vec<Action>, goal: G) -> Result<Self>
    where
        G: IntoIterator<Item = Literal>,
    {
        let mut fluent_mapping = HashMap::with_capacity(fluents.len());
        for (idx, name) in fluents.iter().enumerate() {
            if name.is_empty() {
                return Err(Error::EmptyFluentName);
            }
            if fluent_mapping.insert(name.clone(), Fluent(idx)).is_some() {
                return Err(Error::DuplicateFluent(name.clone()));
            }
        }
        let count = fluents.len();
        let out_of_range = |owner: &str, literal: &Literal| {
            let Fluent(fluent) = literal.fluent();
            if fluent >= count {
                Err(Error::FluentOutOfRange { owner: owner.to_owned(), fluent, count })
            } else {
                Ok(())
            }
        };
        for action in &actions {
            for literal in action.literals() {
                out_of_range(&format!("action '{}'", action.name), literal)?;
            }
        }
        let goal: BTreeSet<Literal> = goal.into_iter().collect();
        for literal in &goal {
            out_of_range("goal", literal)?;
        }
        Ok(Self { fluents, fluent_mapping, actions, goal })
    }

    pub fn builder() -> ProblemBuilder {
        ProblemBuilder::default()
    }

    pub fn fluents(&self) -> &[String] {
        &self.fluents
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn goal(&self) -> &BTreeSet<Literal> {
        &self.goal
    }

    pub fn fluent(&self, name: &str) -> Option<Fluent> {
        self.fluent_mapping.get(name).copied()
    }

    /// Resolves `Name` or `~Name` to a literal of this problem.
    pub fn literal(&self, text: &str) -> Result<Literal> {
        let (name, positive) = match text.strip_prefix('~') {
            Some(name) => (name, false),
            None => (text, true),
        };
        match self.fluent(name.trim()) {
            Some(fluent) => Ok(Literal::new(fluent, positive)),
            None => Err(Error::UnknownFluent(name.trim().to_owned())),
        }
    }

    pub fn display(&self, literal: Literal) -> Named<'_> {
        let Fluent(idx) = literal.fluent();
        let name = self.fluents.get(idx).map(String::as_str).unwrap_or("?");
        Named { literal, name }
    }

    /// Two persistence actions per fluent, one for each polarity, in fluent
    /// order.
    pub fn no_ops(&self) -> Vec<Action> {
        let mut no_ops = Vec::with_capacity(self.fluents.len() * 2);
        for idx in 0..self.fluents.len() {
            for literal in [Literal::pos(idx), Literal::neg(idx)] {
                no_ops.push(Action::no_op(literal, &format!("NoOp({})", self.display(literal))));
            }
        }
        no_ops
    }

    /// One literal per fluent: the fluent itself when its state value is
    /// true, its negation otherwise.
    pub fn initial_literals(&self, state: &[bool]) -> Result<Vec<Literal>> {
        if state.len() != self.fluents.len() {
            return Err(Error::StateLength { expected: self.fluents.len(), found: state.len() });
        }
        Ok(state.iter().enumerate().map(|(idx, value)| Literal::new(Fluent(idx), *value)).collect())
    }
}

/// Name based construction of a [`Problem`].
///
/// Literals are written as the fluent name, prefixed with `~` for the negated
/// form. Names are resolved when [`ProblemBuilder::build`] is called.
#[derive(Debug, Default, Clone)]
pub struct ProblemBuilder {
    fluents: Vec<String>,
    actions: Vec<(String, Vec<String>, Vec<String>)>,
    goal: Vec<String>,
}

impl ProblemBuilder {
    pub fn fluent(mut self, name: &str) -> Self {
        self.fluents.push(name.to_owned());
        self
    }

    pub fn fluents<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fluents.extend(names.into_iter().map(|s| s.as_ref().to_owned()));
        self
    }

    pub fn action<P, E, S>(mut self, name: &str, preconditions: P, effects: E) -> Self
    where
        P: IntoIterator<Item = S>,
        E: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let preconditions = preconditions.into_iter().map(|s| s.as_ref().to_owned()).collect();
        let effects = effects.into_iter().map(|s| s.as_ref().to_owned()).collect();
        self.actions.push((name.to_owned(), preconditions, effects));
        self
    }

    pub fn goal<I, S>(mut self, literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.goal.extend(literals.into_iter().map(|s| s.as_ref().to_owned()));
        self
    }

    pub fn build(self) -> Result<Problem> {
        let names = Problem::new(self.fluents, Vec::new(), [])?;
        let resolve = |texts: &[String]| -> Result<Vec<Literal>> {
            texts.iter().map(|text| names.literal(text)).collect()
        };
        let mut actions = Vec::with_capacity(self.actions.len());
        for (name, preconditions, effects) in &self.actions {
            actions.push(Action::new(name, resolve(preconditions)?, resolve(effects)?));
        }
        let goal = resolve(&self.goal)?;
        Problem::new(names.fluents, actions, goal)
    }
}
