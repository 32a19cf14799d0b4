use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use super::ast::{self, Expr, Term, TypedList};
use super::Instance;
use crate::error::{Error, Result};
use crate::problem::{Action, Fluent, Literal, Problem};

const ROOT_TYPE: &str = "object";

/// Grounds a typed STRIPS domain against a problem's objects.
pub(super) struct Compiler<'a> {
    domain: &'a ast::Domain<'a>,
    problem: &'a ast::Problem<'a>,
    /// Parent of every type named in `:types`.
    parents: HashMap<&'a str, &'a str>,
    /// Object name to its declared type, in declaration order.
    objects: IndexMap<&'a str, &'a str>,
    arity: HashMap<&'a str, usize>,
    fluents: IndexSet<String>,
}

fn grounding<T>(message: String) -> Result<T> {
    Err(Error::Grounding(message))
}

fn flatten<'a>(lists: &'a [TypedList<'a>]) -> impl Iterator<Item = (&'a str, &'a str)> {
    lists.iter().flat_map(|list| list.identifiers.iter().map(move |id| (*id, list.kind)))
}

impl<'a> Compiler<'a> {
    pub fn new(domain: &'a ast::Domain<'a>, problem: &'a ast::Problem<'a>) -> Result<Self> {
        let mut parents = HashMap::new();
        for (kind, parent) in flatten(&domain.types) {
            if kind == ROOT_TYPE || parents.insert(kind, parent).is_some() {
                return grounding(format!("Type {} is declared more than once.", kind));
            }
        }
        let mut r = Self {
            domain,
            problem,
            parents,
            objects: IndexMap::new(),
            arity: HashMap::new(),
            fluents: IndexSet::new(),
        };
        for (object, kind) in flatten(&problem.objects) {
            if !r.is_known_type(kind) {
                return grounding(format!("Object {} has unknown type {}.", object, kind));
            }
            if r.objects.insert(object, kind).is_some() {
                return grounding(format!("Object {} is declared more than once.", object));
            }
        }
        for predicate in &domain.predicates {
            if r.arity.insert(predicate.name, predicate.arity()).is_some() {
                return grounding(format!("Predicate {} is declared more than once.", predicate.name));
            }
        }
        Ok(r)
    }

    /// Types only mentioned as a parent are implicitly declared below `object`.
    fn is_known_type(&self, kind: &str) -> bool {
        kind == ROOT_TYPE || self.parents.contains_key(kind) || self.parents.values().any(|p| *p == kind)
    }

    fn is_type(&self, start_kind: &str, end_kind: &str) -> bool {
        if end_kind == ROOT_TYPE {
            return true;
        }
        let mut current = start_kind;
        // a cyclic hierarchy can't be walked more often than it has edges
        for _ in 0..=self.parents.len() {
            if current == end_kind {
                return true;
            }
            match self.parents.get(current) {
                Some(parent) => current = *parent,
                None => return false,
            }
        }
        false
    }

    fn atom_name(&self, atom: &ast::Atom<'a>, binding: &HashMap<&'a str, &'a str>, owner: &str) -> Result<String> {
        if let Some(arity) = self.arity.get(atom.name) {
            if *arity != atom.terms.len() {
                return grounding(format!(
                    "{} uses predicate {} with {} arguments, declared with {}.",
                    owner,
                    atom.name,
                    atom.terms.len(),
                    arity
                ));
            }
        }
        let mut args = Vec::with_capacity(atom.terms.len());
        for term in &atom.terms {
            let object = match term {
                Term::Variable(var) => match binding.get(var) {
                    Some(object) => *object,
                    None => return grounding(format!("{} uses unknown variable ?{}.", owner, var)),
                },
                Term::Name(name) if self.objects.contains_key(name) => *name,
                Term::Name(name) => return grounding(format!("{} uses unknown object {}.", owner, name)),
            };
            args.push(object);
        }
        if args.is_empty() {
            Ok(atom.name.to_owned())
        } else {
            Ok(format!("{}({})", atom.name, args.join(", ")))
        }
    }

    fn fluent(&mut self, name: String) -> Fluent {
        Fluent(self.fluents.insert_full(name).0)
    }

    /// Literals of a conjunction of possibly negated atoms.
    fn literals(
        &mut self,
        expr: &Expr<'a>,
        binding: &HashMap<&'a str, &'a str>,
        owner: &str,
        out: &mut Vec<Literal>,
    ) -> Result<()> {
        match expr {
            Expr::And(exprs) => {
                for expr in exprs {
                    self.literals(expr, binding, owner, out)?;
                }
            }
            Expr::Atom(atom) => {
                let name = self.atom_name(atom, binding, owner)?;
                out.push(Literal::new(self.fluent(name), true));
            }
            Expr::Not(inner) => match inner.as_ref() {
                Expr::Atom(atom) => {
                    let name = self.atom_name(atom, binding, owner)?;
                    out.push(Literal::new(self.fluent(name), false));
                }
                _ => return grounding(format!("{} negates something other than an atom.", owner)),
            },
        }
        Ok(())
    }

    fn initial_atoms(&mut self) -> Result<HashSet<Fluent>> {
        let mut literals = Vec::new();
        let empty = HashMap::new();
        let problem = self.problem;
        for expr in &problem.init {
            self.literals(expr, &empty, ":init", &mut literals)?;
        }
        let mut atoms = HashSet::with_capacity(literals.len());
        for literal in literals {
            if !literal.is_positive() {
                let Fluent(idx) = literal.fluent();
                return grounding(format!(
                    ":init negates {}, the initial state is closed world.",
                    self.fluents.get_index(idx).map(String::as_str).unwrap_or("?")
                ));
            }
            atoms.insert(literal.fluent());
        }
        Ok(atoms)
    }

    /// Every assignment of compatible objects to the action's parameters, in
    /// declaration order with the last parameter varying fastest.
    fn bindings(&self, action: &'a ast::Action<'a>) -> Result<Vec<HashMap<&'a str, &'a str>>> {
        let mut parameters = Vec::new();
        let mut candidates = Vec::new();
        for (var, kind) in flatten(&action.parameters) {
            if !self.is_known_type(kind) {
                return grounding(format!("Action {} has parameter ?{} of unknown type {}.", action.name, var, kind));
            }
            parameters.push(var);
            candidates.push(
                self.objects.iter().filter(|(_, k)| self.is_type(k, kind)).map(|(o, _)| *o).collect::<Vec<_>>(),
            );
        }
        if candidates.iter().any(Vec::is_empty) {
            return Ok(Vec::new());
        }
        let mut result = Vec::new();
        let mut odometer = vec![0; parameters.len()];
        loop {
            result.push(parameters.iter().zip(&odometer).zip(&candidates).map(|((v, i), c)| (*v, c[*i])).collect());
            let mut digit = odometer.len();
            loop {
                if digit == 0 {
                    return Ok(result);
                }
                digit -= 1;
                odometer[digit] += 1;
                if odometer[digit] < candidates[digit].len() {
                    break;
                }
                odometer[digit] = 0;
            }
        }
    }

    fn ground_actions(&mut self) -> Result<Vec<Action>> {
        let mut actions = Vec::new();
        let domain = self.domain;
        for action in &domain.actions {
            let bindings = self.bindings(action)?;
            for binding in bindings {
                let args = flatten(&action.parameters).map(|(var, _)| binding[var]).collect::<Vec<_>>();
                let name = if args.is_empty() {
                    action.name.to_owned()
                } else {
                    format!("{}({})", action.name, args.join(", "))
                };
                let mut preconditions = Vec::new();
                if let Some(expr) = &action.precondition {
                    self.literals(expr, &binding, &name, &mut preconditions)?;
                }
                let mut effects = Vec::new();
                if let Some(expr) = &action.effect {
                    self.literals(expr, &binding, &name, &mut effects)?;
                }
                actions.push(Action::new(&name, preconditions, effects));
            }
        }
        Ok(actions)
    }

    pub fn compile(mut self) -> Result<Instance> {
        let initial = self.initial_atoms()?;
        let actions = self.ground_actions()?;
        let mut goal = Vec::new();
        let problem = self.problem;
        self.literals(&problem.goal, &HashMap::new(), ":goal", &mut goal)?;
        debug!(objects = self.objects.len(), fluents = self.fluents.len(), actions = actions.len(), "grounded");
        let initial_state = (0..self.fluents.len()).map(|idx| initial.contains(&Fluent(idx))).collect();
        let problem = Problem::new(self.fluents.into_iter().collect(), actions, goal)?;
        Ok(Instance { problem, initial_state })
    }
}
