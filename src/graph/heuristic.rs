use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use tracing::trace;

use super::{GraphConfig, LiteralLayer, PlanningGraph};
use crate::error::{Error, Result};
use crate::problem::{Literal, Problem};

/// A heuristic value: a literal layer index, or `Unreachable` when the graph
/// leveled off without satisfying the goal. `Unreachable` orders above every
/// level and absorbs addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Estimate {
    Level(usize),
    Unreachable,
}

impl Estimate {
    pub fn level(self) -> Option<usize> {
        match self {
            Estimate::Level(level) => Some(level),
            Estimate::Unreachable => None,
        }
    }

    pub fn is_reachable(self) -> bool {
        matches!(self, Estimate::Level(_))
    }
}

impl Add for Estimate {
    type Output = Estimate;

    fn add(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Estimate::Level(l), Estimate::Level(r)) => Estimate::Level(l + r),
            _ => Estimate::Unreachable,
        }
    }
}

impl Sum for Estimate {
    fn sum<I: Iterator<Item = Estimate>>(iter: I) -> Self {
        iter.fold(Estimate::Level(0), Add::add)
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Estimate::Level(level) => write!(f, "{}", level),
            Estimate::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// The level based heuristics a planning graph can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heuristic {
    LevelSum,
    MaxLevel,
    SetLevel,
}

impl Heuristic {
    pub const ALL: [Heuristic; 3] = [Heuristic::LevelSum, Heuristic::MaxLevel, Heuristic::SetLevel];

    /// Builds a fresh graph for `state` and evaluates this heuristic on it.
    /// This is the function a forward search calls for each node it expands.
    pub fn estimate(self, problem: &Problem, state: &[bool], config: GraphConfig) -> Result<Estimate> {
        PlanningGraph::new(problem, state, config)?.evaluate(self)
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Heuristic::LevelSum => write!(f, "levelsum"),
            Heuristic::MaxLevel => write!(f, "maxlevel"),
            Heuristic::SetLevel => write!(f, "setlevel"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownHeuristic(pub String);

impl fmt::Display for UnknownHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown heuristic '{}', expected levelsum, maxlevel or setlevel", self.0)
    }
}

impl std::error::Error for UnknownHeuristic {}

impl FromStr for Heuristic {
    type Err = UnknownHeuristic;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "levelsum" => Ok(Heuristic::LevelSum),
            "maxlevel" => Ok(Heuristic::MaxLevel),
            "setlevel" => Ok(Heuristic::SetLevel),
            _ => Err(UnknownHeuristic(s.to_owned())),
        }
    }
}

impl PlanningGraph {
    /// Index of the first literal layer containing `goal`.
    ///
    /// Grows the graph one level at a time while the goal is missing, and
    /// reports `Unreachable` once the graph has leveled without it.
    pub fn level_cost(&mut self, goal: &Literal) -> Estimate {
        // layers only grow, so the frontier is the first to gain the goal
        while !self.leveled && !self.literal_layers.last().is_some_and(|layer| layer.contains(goal)) {
            self.extend();
        }
        self.built_cost(goal)
    }

    /// Level cost over the layers built so far.
    fn built_cost(&self, goal: &Literal) -> Estimate {
        let cost = self
            .literal_layers
            .iter()
            .position(|layer| layer.contains(goal))
            .map_or(Estimate::Unreachable, Estimate::Level);
        trace!(?goal, %cost, "level cost");
        cost
    }

    /// Sum of the level costs of the goal literals, each taken on its own.
    /// Inadmissible: interactions between goals are ignored.
    pub fn h_levelsum(&mut self) -> Estimate {
        self.fill(None);
        self.goal.iter().map(|goal| self.built_cost(goal)).sum()
    }

    /// Largest level cost over the goal literals. Admissible.
    pub fn h_maxlevel(&mut self) -> Estimate {
        self.fill(None);
        self.goal.iter().map(|goal| self.built_cost(goal)).max().unwrap_or(Estimate::Level(0))
    }

    /// First level where every goal literal is present and no two of them are
    /// mutex. Needs a graph built with mutexes.
    pub fn h_setlevel(&mut self) -> Result<Estimate> {
        if self.config.ignore_mutexes {
            return Err(Error::MutexesIgnored);
        }
        self.fill(None);
        for (level, layer) in self.literal_layers.iter().enumerate() {
            if !self.goal.iter().all(|goal| layer.contains(goal)) {
                continue;
            }
            if !Self::goals_interfere(&self.goal, layer) {
                return Ok(Estimate::Level(level));
            }
        }
        Ok(Estimate::Unreachable)
    }

    /// Any two distinct goals are mutex in `layer`. Each unordered pair is
    /// checked once.
    fn goals_interfere(goals: &[Literal], layer: &LiteralLayer) -> bool {
        for (i, a) in goals.iter().enumerate() {
            for b in &goals[i + 1..] {
                if layer.is_mutex(a, b) {
                    return true;
                }
            }
        }
        false
    }

    pub fn evaluate(&mut self, heuristic: Heuristic) -> Result<Estimate> {
        match heuristic {
            Heuristic::LevelSum => Ok(self.h_levelsum()),
            Heuristic::MaxLevel => Ok(self.h_maxlevel()),
            Heuristic::SetLevel => self.h_setlevel(),
        }
    }
}
