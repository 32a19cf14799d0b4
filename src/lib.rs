//! Planning graphs for STRIPS problems and the level based heuristics
//! (level-sum, max-level, set-level) computed from them.
//!
//! A [`Problem`] is either built by hand with [`Problem::builder`] or loaded
//! from PDDL with [`pddl::load_files`]. A [`PlanningGraph`] is grown from one
//! state of that problem until it levels off.

pub mod graph;
pub mod pddl;
pub mod problem;
mod error;

pub use error::{Error, Result};
pub use graph::{ActionId, Estimate, GraphConfig, Heuristic, PlanningGraph};
pub use problem::{Action, Fluent, Literal, Problem, ProblemBuilder};
