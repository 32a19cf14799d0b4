use std::collections::BTreeSet;
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

/// One level of the planning graph.
///
/// Nodes are kept in insertion order. `inbound` records, for each node, the
/// nodes of the previous layer it was derived from. The parent handle is the
/// index of the previous layer (of the other kind) inside the owning graph and
/// is only used to look that layer up for mutex tests.
#[derive(Debug, Clone)]
pub struct Layer<N, E> {
    nodes: IndexSet<N>,
    inbound: IndexMap<N, IndexSet<E>>,
    parent: Option<usize>,
    mutexes: BTreeSet<(N, N)>,
    mutexes_computed: bool,
    ignore_mutexes: bool,
}

impl<N, E> Layer<N, E>
where
    N: Copy + Eq + Ord + Hash,
    E: Copy + Eq + Hash,
{
    pub(crate) fn new(parent: Option<usize>, ignore_mutexes: bool) -> Self {
        Self {
            nodes: IndexSet::new(),
            inbound: IndexMap::new(),
            parent,
            mutexes: BTreeSet::new(),
            mutexes_computed: false,
            ignore_mutexes,
        }
    }

    /// Starts a layer that already holds every node and inbound edge of
    /// `previous`. Mutexes are not carried over.
    pub(crate) fn carry_forward(previous: &Layer<N, E>, parent: Option<usize>) -> Self {
        Self {
            nodes: previous.nodes.clone(),
            inbound: previous.inbound.clone(),
            parent,
            mutexes: BTreeSet::new(),
            mutexes_computed: false,
            ignore_mutexes: previous.ignore_mutexes,
        }
    }

    pub(crate) fn add(&mut self, node: N) -> bool {
        self.nodes.insert(node)
    }

    pub(crate) fn add_inbound_edges<I>(&mut self, node: N, from: I)
    where
        I: IntoIterator<Item = E>,
    {
        self.inbound.entry(node).or_default().extend(from);
    }

    pub fn contains(&self, node: &N) -> bool {
        self.nodes.contains(node)
    }

    pub fn iter(&self) -> impl Iterator<Item = &N> + '_ {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes of the previous layer connected to `node`, in insertion order.
    pub fn inbound(&self, node: &N) -> impl Iterator<Item = &E> + '_ {
        self.inbound.get(node).into_iter().flat_map(|set| set.iter())
    }

    pub fn parent_index(&self) -> Option<usize> {
        self.parent
    }

    pub fn ignores_mutexes(&self) -> bool {
        self.ignore_mutexes
    }

    /// Whether `update_mutexes` has already run for this layer.
    pub fn has_mutexes_computed(&self) -> bool {
        self.mutexes_computed
    }

    pub(crate) fn set_mutex(&mut self, a: N, b: N) {
        self.mutexes.insert(Self::pair(a, b));
    }

    pub fn is_mutex(&self, a: &N, b: &N) -> bool {
        self.mutexes.contains(&Self::pair(*a, *b))
    }

    /// Every mutex pair once, smaller node first.
    pub fn mutexes(&self) -> impl Iterator<Item = &(N, N)> + '_ {
        self.mutexes.iter()
    }

    pub fn mutex_count(&self) -> usize {
        self.mutexes.len()
    }

    /// Same nodes and same mutex relation, regardless of insertion order.
    pub fn same_as(&self, other: &Layer<N, E>) -> bool {
        self.nodes == other.nodes && self.mutexes == other.mutexes
    }

    /// Marks the mutex relation as final. Returns false when it should not be
    /// computed at all: mutexes are ignored or were already computed.
    pub(crate) fn begin_mutexes(&mut self) -> bool {
        if self.ignore_mutexes || self.mutexes_computed {
            return false;
        }
        self.mutexes_computed = true;
        true
    }

    /// All unordered pairs of distinct nodes, each exactly once.
    pub(crate) fn pairs(&self) -> Vec<(N, N)> {
        let nodes: Vec<N> = self.nodes.iter().copied().collect();
        let mut pairs = Vec::with_capacity(nodes.len() * nodes.len().saturating_sub(1) / 2);
        for (i, a) in nodes.iter().enumerate() {
            for b in &nodes[i + 1..] {
                pairs.push((*a, *b));
            }
        }
        pairs
    }

    #[inline]
    fn pair(a: N, b: N) -> (N, N) {
        if a <= b { (a, b) } else { (b, a) }
    }
}

#[cfg(test)]
mod tests {
    use super::Layer;

    #[test]
    fn test_mutex_symmetry() {
        let mut layer = Layer::<u32, u32>::new(None, false);
        for n in [3, 1, 2] {
            layer.add(n);
        }
        layer.set_mutex(3, 1);
        assert!(layer.is_mutex(&1, &3));
        assert!(layer.is_mutex(&3, &1));
        assert!(!layer.is_mutex(&1, &2));
        assert_eq!(layer.mutexes().collect::<Vec<_>>(), vec![&(1, 3)]);
    }

    #[test]
    fn test_carry_forward() {
        let mut first = Layer::<u32, char>::new(None, false);
        first.add(7);
        first.add_inbound_edges(7, ['a', 'b']);
        first.set_mutex(7, 8);
        let mut second = Layer::carry_forward(&first, Some(0));
        second.add(9);
        second.add_inbound_edges(7, ['c']);
        assert!(second.contains(&7) && second.contains(&9));
        assert_eq!(second.inbound(&7).copied().collect::<Vec<_>>(), vec!['a', 'b', 'c']);
        assert_eq!(first.inbound(&7).count(), 2);
        assert_eq!(second.mutex_count(), 0);
        assert_eq!(second.parent_index(), Some(0));
        assert_eq!(second.inbound(&9).count(), 0);
    }

    #[test]
    fn test_pairs_and_same_as() {
        let mut a = Layer::<u32, u32>::new(None, false);
        let mut b = Layer::<u32, u32>::new(None, false);
        for n in [1, 2, 3] {
            a.add(n);
        }
        for n in [3, 2, 1] {
            b.add(n);
        }
        assert_eq!(a.pairs(), vec![(1, 2), (1, 3), (2, 3)]);
        assert!(a.same_as(&b));
        a.set_mutex(1, 2);
        assert!(!a.same_as(&b));
        b.set_mutex(2, 1);
        assert!(a.same_as(&b));
    }

    #[test]
    fn test_begin_mutexes_once() {
        let mut layer = Layer::<u32, u32>::new(None, false);
        assert!(layer.begin_mutexes());
        assert!(!layer.begin_mutexes());
        assert!(layer.has_mutexes_computed());
        let mut ignored = Layer::<u32, u32>::new(None, true);
        assert!(!ignored.begin_mutexes());
        assert!(!ignored.has_mutexes_computed());
    }
}
