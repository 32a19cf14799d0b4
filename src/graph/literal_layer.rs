use std::ops::Deref;

use super::action_layer::{ActionId, ActionLayer};
use super::layer::Layer;
use crate::problem::Literal;

/// A layer of literals. Inbound edges lead to the actions of the parent action
/// layer that produce each literal (its generators).
#[derive(Debug, Clone)]
pub struct LiteralLayer {
    layer: Layer<Literal, ActionId>,
}

impl Deref for LiteralLayer {
    type Target = Layer<Literal, ActionId>;

    fn deref(&self) -> &Self::Target {
        &self.layer
    }
}

impl LiteralLayer {
    /// Level 0: the literals of the initial state, without generators.
    pub(crate) fn root<I>(literals: I, ignore_mutexes: bool) -> Self
    where
        I: IntoIterator<Item = Literal>,
    {
        let mut layer = Layer::new(None, ignore_mutexes);
        for literal in literals {
            layer.add(literal);
        }
        Self { layer }
    }

    /// Next literal layer: every literal of `previous` with its generators,
    /// fed by the action layer at index `parent`.
    pub(crate) fn carry_forward(previous: &LiteralLayer, parent: usize) -> Self {
        Self { layer: Layer::carry_forward(&previous.layer, Some(parent)) }
    }

    /// Adds `literal` as an effect of `action`.
    pub(crate) fn add_effect(&mut self, literal: Literal, action: ActionId) {
        self.layer.add(literal);
        self.layer.add_inbound_edges(literal, [action]);
    }

    /// Generating actions of `literal`.
    pub fn generators(&self, literal: &Literal) -> impl Iterator<Item = &ActionId> + '_ {
        self.layer.inbound(literal)
    }

    pub fn negation(a: &Literal, b: &Literal) -> bool {
        a.is_negation_of(b)
    }

    /// Every pair of generators, one for each literal, is mutex in `parent`.
    ///
    /// A literal without generators makes this vacuously true.
    pub fn inconsistent_support(&self, a: &Literal, b: &Literal, parent: &ActionLayer) -> bool {
        self.generators(a).all(|ga| self.generators(b).all(|gb| parent.is_mutex(ga, gb)))
    }

    pub fn literals_mutex(&self, a: &Literal, b: &Literal, parent: Option<&ActionLayer>) -> bool {
        if Self::negation(a, b) {
            return true;
        }
        match parent {
            Some(parent) => self.inconsistent_support(a, b, parent),
            None => false,
        }
    }

    /// Computes the mutex relation of this layer. `parent` must be the action
    /// layer this layer was built from, with its mutexes already computed, or
    /// `None` for the root layer where only negation applies.
    pub(crate) fn update_mutexes(&mut self, parent: Option<&ActionLayer>) {
        if !self.layer.begin_mutexes() {
            return;
        }
        for (a, b) in self.layer.pairs() {
            if self.literals_mutex(&a, &b, parent) {
                self.layer.set_mutex(a, b);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LiteralLayer;
    use crate::graph::action_layer::{ActionId, ActionLayer};
    use crate::problem::{Action, Literal};

    #[test]
    fn test_negation() {
        let mut layer = LiteralLayer::root([Literal::pos(0), Literal::neg(0), Literal::pos(1)], false);
        layer.update_mutexes(None);
        assert!(LiteralLayer::negation(&Literal::pos(0), &Literal::neg(0)));
        assert!(layer.is_mutex(&Literal::neg(0), &Literal::pos(0)));
        assert!(!layer.is_mutex(&Literal::pos(0), &Literal::pos(1)));
        assert_eq!(layer.mutex_count(), 1);
    }

    /// Have(Cake) only persists, Eaten(Cake) only comes from Eat(Cake), and the
    /// two supporting actions are mutex.
    #[test]
    fn test_inconsistent_support() {
        let have = Literal::pos(0);
        let eaten = Literal::pos(1);
        let catalog = vec![
            Action::no_op(have, "NoOp(Have(Cake))"),
            Action::new("Eat(Cake)", [have], [!have, eaten]),
        ];
        let mut root = LiteralLayer::root([have, !eaten], false);
        root.update_mutexes(None);
        let mut actions = ActionLayer::new(0, true, false);
        actions.add(ActionId(0), &catalog[0]);
        actions.add(ActionId(1), &catalog[1]);
        actions.update_mutexes(&catalog, &root);
        assert!(actions.is_mutex(&ActionId(0), &ActionId(1)));

        let mut next = LiteralLayer::carry_forward(&root, 0);
        next.add_effect(have, ActionId(0));
        next.add_effect(!have, ActionId(1));
        next.add_effect(eaten, ActionId(1));
        assert!(next.inconsistent_support(&have, &eaten, &actions));
        assert!(next.inconsistent_support(&eaten, &have, &actions));
        // both produced by the same action
        assert!(!next.inconsistent_support(&!have, &eaten, &actions));
        // no generators at all: vacuously inconsistent
        assert!(next.inconsistent_support(&!eaten, &eaten, &actions));

        next.update_mutexes(Some(&actions));
        assert!(next.is_mutex(&have, &eaten));
        assert!(next.is_mutex(&have, &!have));
        assert!(!next.is_mutex(&!have, &eaten));
    }

    #[test]
    fn test_generators_carried_forward() {
        let mut root = LiteralLayer::root([Literal::pos(0)], false);
        root.update_mutexes(None);
        let mut first = LiteralLayer::carry_forward(&root, 0);
        first.add_effect(Literal::pos(0), ActionId(4));
        let mut second = LiteralLayer::carry_forward(&first, 1);
        second.add_effect(Literal::pos(0), ActionId(9));
        assert_eq!(root.generators(&Literal::pos(0)).count(), 0);
        assert_eq!(second.generators(&Literal::pos(0)).copied().collect::<Vec<_>>(), vec![ActionId(4), ActionId(9)]);
        assert_eq!(second.parent_index(), Some(1));
    }
}
