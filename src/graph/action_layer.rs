use std::ops::Deref;

use indexmap::{IndexMap, IndexSet};

use super::layer::Layer;
use super::literal_layer::LiteralLayer;
use crate::problem::{Action, Literal};

/// Identity of an action node: its index in the graph's action catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionId(pub usize);

/// A layer of actions (persistence actions included). Inbound edges lead to
/// the preconditions in the parent literal layer, outbound edges to the
/// effects in the next literal layer.
#[derive(Debug, Clone)]
pub struct ActionLayer {
    layer: Layer<ActionId, Literal>,
    outbound: IndexMap<ActionId, IndexSet<Literal>>,
    serialize: bool,
}

impl Deref for ActionLayer {
    type Target = Layer<ActionId, Literal>;

    fn deref(&self) -> &Self::Target {
        &self.layer
    }
}

impl ActionLayer {
    /// Empty first action layer, fed by the root literal layer.
    pub(crate) fn new(parent: usize, serialize: bool, ignore_mutexes: bool) -> Self {
        Self { layer: Layer::new(Some(parent), ignore_mutexes), outbound: IndexMap::new(), serialize }
    }

    /// Next action layer: every action of `previous` plus whatever gets added.
    pub(crate) fn carry_forward(previous: &ActionLayer, parent: usize) -> Self {
        Self {
            layer: Layer::carry_forward(&previous.layer, Some(parent)),
            outbound: previous.outbound.clone(),
            serialize: previous.serialize,
        }
    }

    pub(crate) fn add(&mut self, id: ActionId, action: &Action) {
        self.layer.add(id);
        self.layer.add_inbound_edges(id, action.preconditions().iter().copied());
        self.outbound.entry(id).or_default().extend(action.effects().iter().copied());
    }

    /// Literals of the next layer produced by `id`.
    pub fn outbound(&self, id: &ActionId) -> impl Iterator<Item = &Literal> + '_ {
        self.outbound.get(id).into_iter().flat_map(|set| set.iter())
    }

    pub fn serializes(&self) -> bool {
        self.serialize
    }

    /// An effect of one action negates an effect of the other.
    pub fn inconsistent_effects(a: &Action, b: &Action) -> bool {
        a.effects().iter().any(|ea| b.effects().iter().any(|eb| ea.is_negation_of(eb)))
    }

    /// An effect of either action negates a precondition of the other.
    pub fn interference(a: &Action, b: &Action) -> bool {
        let negates = |effects: &Action, needs: &Action| {
            effects.effects().iter().any(|e| needs.preconditions().iter().any(|p| e.is_negation_of(p)))
        };
        negates(a, b) || negates(b, a)
    }

    /// Some precondition of `a` is mutex with some precondition of `b` in the
    /// parent literal layer.
    pub fn competing_needs(a: &Action, b: &Action, parent: &LiteralLayer) -> bool {
        a.preconditions()
            .iter()
            .any(|pa| b.preconditions().iter().any(|pb| parent.is_mutex(pa, pb)))
    }

    /// Whether the pair cannot share this layer. Serialized layers also
    /// exclude any two non-persistence actions.
    pub fn actions_mutex(&self, a: &Action, b: &Action, parent: &LiteralLayer) -> bool {
        (self.serialize && !a.is_no_op() && !b.is_no_op())
            || Self::inconsistent_effects(a, b)
            || Self::interference(a, b)
            || Self::competing_needs(a, b, parent)
    }

    /// Computes the mutex relation of this layer. `catalog` resolves action
    /// ids and `parent` must be the literal layer this layer was built from,
    /// with its own mutexes already computed.
    pub(crate) fn update_mutexes(&mut self, catalog: &[Action], parent: &LiteralLayer) {
        if !self.layer.begin_mutexes() {
            return;
        }
        for (ia, ib) in self.layer.pairs() {
            if self.actions_mutex(&catalog[ia.0], &catalog[ib.0], parent) {
                self.layer.set_mutex(ia, ib);
            }
        }
    }
}
