pub mod action_layer;
pub mod heuristic;
pub mod layer;
pub mod literal_layer;

pub use action_layer::{ActionId, ActionLayer};
pub use heuristic::{Estimate, Heuristic};
pub use layer::Layer;
pub use literal_layer::LiteralLayer;

use std::fmt;

use tracing::debug;

use crate::error::Result;
use crate::problem::{Action, Literal, Problem};

/// Flags that shape how the graph is grown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphConfig {
    /// Make every pair of non-persistence actions mutex within a layer. Use it
    /// when the graph estimates a heuristic, not for GraphPlan style search.
    pub serialize: bool,
    /// Skip mutex computation entirely. Such graphs cannot answer set-level.
    pub ignore_mutexes: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { serialize: true, ignore_mutexes: false }
    }
}

impl GraphConfig {
    pub fn serialize(mut self, serialize: bool) -> Self {
        self.serialize = serialize;
        self
    }

    pub fn ignore_mutexes(mut self, ignore_mutexes: bool) -> Self {
        self.ignore_mutexes = ignore_mutexes;
        self
    }
}

/// Leveled planning graph of alternating literal and action layers.
///
/// Literal layer `i` feeds action layer `i`, which produces literal layer
/// `i + 1`. Layers are only ever appended, and every layer holds all nodes of
/// the layer of the same kind before it.
pub struct PlanningGraph {
    config: GraphConfig,
    goal: Vec<Literal>,
    actions: Vec<Action>,
    literal_layers: Vec<LiteralLayer>,
    action_layers: Vec<ActionLayer>,
    leveled: bool,
}

impl fmt::Debug for PlanningGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PlanningGraph(leveled: {}, {:?}):", self.leveled, self.config)?;
        for (level, literals) in self.literal_layers.iter().enumerate() {
            writeln!(f, "S{}: {} literals, {} mutexes", level, literals.len(), literals.mutex_count())?;
            if let Some(actions) = self.action_layers.get(level) {
                writeln!(f, "A{}: {} actions, {} mutexes", level, actions.len(), actions.mutex_count())?;
            }
        }
        Ok(())
    }
}

impl PlanningGraph {
    /// Seeds literal layer 0 from `state`, one boolean per fluent of
    /// `problem`. The graph starts unleveled with no action layer.
    pub fn new(problem: &Problem, state: &[bool], config: GraphConfig) -> Result<Self> {
        let literals = problem.initial_literals(state)?;
        let mut actions = problem.no_ops();
        actions.extend(problem.actions().iter().cloned());
        let mut root = LiteralLayer::root(literals, config.ignore_mutexes);
        root.update_mutexes(None);
        Ok(Self {
            config,
            goal: problem.goal().iter().copied().collect(),
            actions,
            literal_layers: vec![root],
            action_layers: Vec::new(),
            leveled: false,
        })
    }

    pub fn config(&self) -> GraphConfig {
        self.config
    }

    pub fn goal(&self) -> &[Literal] {
        &self.goal
    }

    pub fn is_leveled(&self) -> bool {
        self.leveled
    }

    pub fn literal_layers(&self) -> &[LiteralLayer] {
        &self.literal_layers
    }

    pub fn action_layers(&self) -> &[ActionLayer] {
        &self.action_layers
    }

    /// Every action the graph may admit: persistence actions first, then the
    /// problem's actions.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// `None` for ids that did not come from this graph.
    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.actions.get(id.0)
    }

    /// Actions of action layer `level` that need `literal`, i.e. the outbound
    /// edges of `literal` in literal layer `level`.
    pub fn consumers(&self, level: usize, literal: Literal) -> impl Iterator<Item = ActionId> + '_ {
        self.action_layers.get(level).into_iter().flat_map(move |layer| {
            layer.iter().filter(move |id| layer.inbound(id).any(|p| *p == literal)).copied()
        })
    }

    /// Adds one action layer and one literal layer.
    ///
    /// The action layer holds every action of the previous action layer plus
    /// every action whose preconditions all appear in the frontier literal
    /// layer. The literal layer holds the frontier literals plus the effects of
    /// those new actions. Does nothing once the graph is leveled.
    pub fn extend(&mut self) {
        if self.leveled {
            return;
        }
        let level = self.action_layers.len();
        let parent_literals = &self.literal_layers[level];
        let mut action_layer = match self.action_layers.last() {
            Some(previous) => ActionLayer::carry_forward(previous, level),
            None => ActionLayer::new(level, self.config.serialize, self.config.ignore_mutexes),
        };
        let mut literal_layer = LiteralLayer::carry_forward(parent_literals, level);

        for (idx, action) in self.actions.iter().enumerate() {
            let id = ActionId(idx);
            if action_layer.contains(&id) || !action.is_applicable(|p| parent_literals.contains(p)) {
                continue;
            }
            action_layer.add(id, action);
            for effect in action.effects() {
                literal_layer.add_effect(*effect, id);
            }
        }

        action_layer.update_mutexes(&self.actions, parent_literals);
        literal_layer.update_mutexes(Some(&action_layer));
        self.leveled = literal_layer.same_as(parent_literals);

        debug!(
            level = level + 1,
            actions = action_layer.len(),
            action_mutexes = action_layer.mutex_count(),
            literals = literal_layer.len(),
            literal_mutexes = literal_layer.mutex_count(),
            "extended planning graph"
        );
        if self.leveled {
            debug!(level = level + 1, "planning graph leveled");
        }

        self.action_layers.push(action_layer);
        self.literal_layers.push(literal_layer);
    }

    /// Extends until the graph levels off or `max_levels` layers were added.
    /// `None` never interrupts.
    pub fn fill(&mut self, max_levels: Option<usize>) -> &mut Self {
        let mut remaining = max_levels;
        while !self.leveled {
            if remaining == Some(0) {
                break;
            }
            self.extend();
            remaining = remaining.map(|n| n - 1);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionId, GraphConfig, PlanningGraph};
    use crate::problem::{Literal, Problem};

    pub(crate) fn cake(with_bake: bool) -> Problem {
        let mut builder = Problem::builder()
            .fluents(["Have(Cake)", "Eaten(Cake)"])
            .action("Eat(Cake)", ["Have(Cake)"], ["~Have(Cake)", "Eaten(Cake)"]);
        if with_bake {
            builder = builder.action("Bake(Cake)", ["~Have(Cake)"], ["Have(Cake)"]);
        }
        builder.goal(["Have(Cake)", "Eaten(Cake)"]).build().unwrap()
    }

    fn id(graph: &PlanningGraph, name: &str) -> ActionId {
        ActionId(graph.actions().iter().position(|a| a.name == name).unwrap())
    }

    const HAVE: Literal = Literal::pos(0);
    const EATEN: Literal = Literal::pos(1);

    #[test]
    fn test_root_layer() {
        let graph = PlanningGraph::new(&cake(true), &[true, false], GraphConfig::default()).unwrap();
        let root = &graph.literal_layers()[0];
        assert_eq!(root.len(), 2);
        assert!(root.contains(&HAVE));
        assert!(root.contains(&!EATEN));
        assert_eq!(root.mutex_count(), 0);
        assert!(graph.action_layers().is_empty());
        assert!(!graph.is_leveled());
        assert_eq!(graph.actions().len(), 6);
    }

    #[test]
    fn test_action_lookup() {
        let graph = PlanningGraph::new(&cake(true), &[true, false], GraphConfig::default()).unwrap();
        assert_eq!(graph.action(id(&graph, "Bake(Cake)")).map(|a| a.name.as_str()), Some("Bake(Cake)"));
        assert!(graph.action(ActionId(graph.actions().len())).is_none());
    }

    #[test]
    fn test_state_length() {
        assert!(PlanningGraph::new(&cake(true), &[true], GraphConfig::default()).is_err());
    }

    #[test]
    fn test_first_extension() {
        let mut graph = PlanningGraph::new(&cake(true), &[true, false], GraphConfig::default()).unwrap();
        graph.extend();
        let actions = &graph.action_layers()[0];
        let eat = id(&graph, "Eat(Cake)");
        let bake = id(&graph, "Bake(Cake)");
        let persist_have = id(&graph, "NoOp(Have(Cake))");
        let persist_not_eaten = id(&graph, "NoOp(~Eaten(Cake))");
        assert_eq!(actions.len(), 3);
        assert!(actions.contains(&eat) && actions.contains(&persist_have) && actions.contains(&persist_not_eaten));
        assert!(!actions.contains(&bake));
        assert!(actions.is_mutex(&eat, &persist_have));
        assert!(actions.is_mutex(&eat, &persist_not_eaten));
        assert!(!actions.is_mutex(&persist_have, &persist_not_eaten));

        let literals = &graph.literal_layers()[1];
        assert_eq!(literals.len(), 4);
        assert!(literals.is_mutex(&HAVE, &EATEN));
        assert!(literals.is_mutex(&!HAVE, &!EATEN));
        assert!(literals.is_mutex(&HAVE, &!HAVE));
        assert!(literals.is_mutex(&EATEN, &!EATEN));
        assert!(!literals.is_mutex(&!HAVE, &EATEN));
        assert!(!literals.is_mutex(&HAVE, &!EATEN));
        assert_eq!(literals.generators(&EATEN).copied().collect::<Vec<_>>(), vec![eat]);
        assert_eq!(graph.consumers(0, HAVE).collect::<Vec<_>>(), vec![persist_have, eat]);
        assert!(!graph.is_leveled());
    }

    #[test]
    fn test_second_extension_relaxes_mutex() {
        let mut graph = PlanningGraph::new(&cake(true), &[true, false], GraphConfig::default()).unwrap();
        graph.extend();
        graph.extend();
        let literals = &graph.literal_layers()[2];
        assert_eq!(literals.len(), 4);
        assert!(!literals.is_mutex(&HAVE, &EATEN));
        assert!(graph.action_layers()[1].contains(&id(&graph, "Bake(Cake)")));
        // membership is unchanged but the mutexes shrank, so growth goes on
        assert!(!graph.is_leveled());
        graph.fill(None);
        assert!(graph.is_leveled());
        assert_eq!(graph.literal_layers().len(), 4);
    }

    #[test]
    fn test_monotonic_layers() {
        let mut graph = PlanningGraph::new(&cake(true), &[true, false], GraphConfig::default()).unwrap();
        graph.fill(None);
        for pair in graph.literal_layers().windows(2) {
            assert!(pair[0].iter().all(|l| pair[1].contains(l)));
        }
        for pair in graph.action_layers().windows(2) {
            assert!(pair[0].iter().all(|a| pair[1].contains(a)));
        }
        for (idx, layer) in graph.action_layers().iter().enumerate() {
            assert_eq!(layer.parent_index(), Some(idx));
            assert_eq!(graph.literal_layers()[idx + 1].parent_index(), Some(idx));
        }
    }

    #[test]
    fn test_fill_budget_and_idempotence() {
        let mut graph = PlanningGraph::new(&cake(true), &[true, false], GraphConfig::default()).unwrap();
        graph.fill(Some(1));
        assert_eq!(graph.literal_layers().len(), 2);
        graph.fill(Some(0));
        assert_eq!(graph.literal_layers().len(), 2);
        graph.fill(None);
        let levels = graph.literal_layers().len();
        assert!(graph.is_leveled());
        graph.fill(None);
        graph.extend();
        assert_eq!(graph.literal_layers().len(), levels);
        assert_eq!(graph.action_layers().len(), levels - 1);
    }

    #[test]
    fn test_ignore_mutexes() {
        let config = GraphConfig::default().ignore_mutexes(true);
        let mut graph = PlanningGraph::new(&cake(true), &[true, false], config).unwrap();
        graph.fill(None);
        assert!(graph.is_leveled());
        for layer in graph.literal_layers() {
            assert_eq!(layer.mutex_count(), 0);
            assert!(!layer.has_mutexes_computed());
        }
        for layer in graph.action_layers() {
            assert_eq!(layer.mutex_count(), 0);
        }
    }

    #[test]
    fn test_deterministic() {
        let build = || {
            let mut graph = PlanningGraph::new(&cake(true), &[false, false], GraphConfig::default()).unwrap();
            graph.fill(None);
            graph
                .literal_layers()
                .iter()
                .map(|l| (l.iter().copied().collect::<Vec<_>>(), l.mutexes().copied().collect::<Vec<_>>()))
                .collect::<Vec<_>>()
        };
        assert_eq!(build(), build());
    }
}
