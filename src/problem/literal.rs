use std::fmt;
use std::ops::Not;

/// Index of a fluent in the problem's ordered fluent universe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fluent(pub usize);

/// A fluent in one polarity.
///
/// Literals are plain values: two literals are equal when they name the same
/// fluent with the same polarity, and `!literal` is the same fluent with the
/// polarity flipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    fluent: Fluent,
    positive: bool,
}

impl Literal {
    pub const fn new(fluent: Fluent, positive: bool) -> Self {
        Self { fluent, positive }
    }

    #[inline]
    pub const fn pos(fluent: usize) -> Self {
        Self::new(Fluent(fluent), true)
    }

    #[inline]
    pub const fn neg(fluent: usize) -> Self {
        Self::new(Fluent(fluent), false)
    }

    pub fn fluent(&self) -> Fluent {
        self.fluent
    }

    pub fn is_positive(&self) -> bool {
        self.positive
    }

    /// Same fluent, opposite polarity.
    #[inline]
    pub fn is_negation_of(&self, other: &Literal) -> bool {
        self.fluent == other.fluent && self.positive != other.positive
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        Literal { fluent: self.fluent, positive: !self.positive }
    }
}

/// Renders a literal with its fluent name, `~` marking the negated form.
pub struct Named<'a> {
    pub(crate) literal: Literal,
    pub(crate) name: &'a str,
}

impl fmt::Display for Named<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.literal.is_positive() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "~{}", self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Fluent, Literal};
    use proptest::prelude::*;

    #[test]
    fn test_negation() {
        let have = Literal::pos(0);
        assert_eq!(!have, Literal::neg(0));
        assert!(have.is_negation_of(&!have));
        assert!(!have.is_negation_of(&have));
        assert!(!have.is_negation_of(&Literal::neg(1)));
        assert_eq!((!have).fluent(), Fluent(0));
    }

    proptest! {
        #[test]
        fn prop_negation_involutive(fluent in 0usize..10_000, positive in any::<bool>()) {
            let literal = Literal::new(Fluent(fluent), positive);
            prop_assert_eq!(!!literal, literal);
            prop_assert!((!literal).is_negation_of(&literal));
            prop_assert!(literal.is_negation_of(&!literal));
        }
    }
}
