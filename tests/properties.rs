use plangraph::graph::{ActionLayer, LiteralLayer};
use plangraph::{Action, Estimate, Fluent, GraphConfig, Literal, PlanningGraph, Problem};
use proptest::prelude::*;

const FLUENTS: usize = 4;

fn literal() -> impl Strategy<Value = Literal> {
    (0..FLUENTS, any::<bool>()).prop_map(|(fluent, positive)| Literal::new(Fluent(fluent), positive))
}

fn action() -> impl Strategy<Value = (Vec<Literal>, Vec<Literal>)> {
    (prop::collection::vec(literal(), 0..3), prop::collection::vec(literal(), 1..3))
}

fn problem() -> impl Strategy<Value = Problem> {
    (prop::collection::vec(action(), 0..6), prop::collection::vec(literal(), 0..3)).prop_map(|(actions, goal)| {
        let fluents = (0..FLUENTS).map(|idx| format!("f{}", idx)).collect();
        let actions = actions
            .into_iter()
            .enumerate()
            .map(|(idx, (pre, eff))| Action::new(&format!("a{}", idx), pre, eff))
            .collect();
        Problem::new(fluents, actions, goal).unwrap()
    })
}

fn state() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), FLUENTS)
}

fn filled(problem: &Problem, state: &[bool], config: GraphConfig) -> PlanningGraph {
    let mut graph = PlanningGraph::new(problem, state, config).unwrap();
    graph.fill(None);
    graph
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_mutexes_are_symmetric(problem in problem(), state in state(), serialize in any::<bool>()) {
        let graph = filled(&problem, &state, GraphConfig::default().serialize(serialize));
        for (level, layer) in graph.literal_layers().iter().enumerate() {
            let parent = level.checked_sub(1).map(|idx| &graph.action_layers()[idx]);
            for a in layer.iter() {
                for b in layer.iter() {
                    prop_assert_eq!(layer.is_mutex(a, b), layer.is_mutex(b, a));
                    prop_assert_eq!(LiteralLayer::negation(a, b), LiteralLayer::negation(b, a));
                    if let Some(parent) = parent {
                        prop_assert_eq!(layer.inconsistent_support(a, b, parent), layer.inconsistent_support(b, a, parent));
                    }
                }
            }
        }
        for (level, layer) in graph.action_layers().iter().enumerate() {
            let parent = &graph.literal_layers()[level];
            for a in layer.iter() {
                for b in layer.iter() {
                    let (x, y) = (graph.action(*a).unwrap(), graph.action(*b).unwrap());
                    prop_assert_eq!(layer.is_mutex(a, b), layer.is_mutex(b, a));
                    prop_assert_eq!(ActionLayer::inconsistent_effects(x, y), ActionLayer::inconsistent_effects(y, x));
                    prop_assert_eq!(ActionLayer::interference(x, y), ActionLayer::interference(y, x));
                    prop_assert_eq!(ActionLayer::competing_needs(x, y, parent), ActionLayer::competing_needs(y, x, parent));
                }
            }
        }
    }

    #[test]
    fn prop_layers_only_grow(problem in problem(), state in state()) {
        let graph = filled(&problem, &state, GraphConfig::default());
        for pair in graph.literal_layers().windows(2) {
            prop_assert!(pair[0].iter().all(|literal| pair[1].contains(literal)));
        }
        for pair in graph.action_layers().windows(2) {
            prop_assert!(pair[0].iter().all(|id| pair[1].contains(id)));
        }
    }

    #[test]
    fn prop_negations_are_mutex(problem in problem(), state in state()) {
        let graph = filled(&problem, &state, GraphConfig::default());
        for layer in graph.literal_layers() {
            for literal in layer.iter() {
                if layer.contains(&!*literal) {
                    prop_assert!(layer.is_mutex(literal, &!*literal));
                }
            }
        }
    }

    #[test]
    fn prop_fill_levels_and_is_idempotent(problem in problem(), state in state(), ignore in any::<bool>()) {
        let mut graph = filled(&problem, &state, GraphConfig::default().ignore_mutexes(ignore));
        prop_assert!(graph.is_leveled());
        let levels = graph.literal_layers().len();
        prop_assert_eq!(graph.action_layers().len() + 1, levels);
        graph.fill(None);
        graph.extend();
        prop_assert_eq!(graph.literal_layers().len(), levels);
    }

    #[test]
    fn prop_heuristics_are_ordered(problem in problem(), state in state()) {
        let mut graph = filled(&problem, &state, GraphConfig::default());
        let levelsum = graph.h_levelsum();
        let maxlevel = graph.h_maxlevel();
        let setlevel = graph.h_setlevel().unwrap();
        prop_assert!(maxlevel <= levelsum);
        prop_assert!(maxlevel <= setlevel);
        prop_assert_eq!(maxlevel == Estimate::Unreachable, levelsum == Estimate::Unreachable);
    }

    #[test]
    fn prop_level_costs_ignore_mutexes(problem in problem(), state in state()) {
        let mut with = filled(&problem, &state, GraphConfig::default());
        let mut without = filled(&problem, &state, GraphConfig::default().ignore_mutexes(true));
        prop_assert_eq!(with.h_levelsum(), without.h_levelsum());
        prop_assert_eq!(with.h_maxlevel(), without.h_maxlevel());
    }
}
