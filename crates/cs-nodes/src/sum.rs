//! Signed summing junction.

use crate::node::{Node, NodeRef};

/// Whether an operand is added or subtracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Plus => value,
            Self::Minus => -value,
        }
    }
}

impl From<bool> for Sign {
    /// `true` adds, `false` subtracts.
    fn from(positive: bool) -> Self {
        if positive { Self::Plus } else { Self::Minus }
    }
}

/// One edge into a [`Sum`].
#[derive(Clone)]
pub struct Operand {
    pub node: NodeRef,
    pub sign: Sign,
}

impl Operand {
    pub fn new(node: NodeRef, sign: Sign) -> Self {
        Self { node, sign }
    }

    pub fn plus(node: NodeRef) -> Self {
        Self::new(node, Sign::Plus)
    }

    pub fn minus(node: NodeRef) -> Self {
        Self::new(node, Sign::Minus)
    }
}

/// Signed combination of any number of operands.
///
/// The usual error junction is `Sum::new().plus(reference).minus(measurement)`.
#[derive(Clone, Default)]
pub struct Sum {
    operands: Vec<Operand>,
}

impl Sum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_operands(operands: Vec<Operand>) -> Self {
        Self { operands }
    }

    pub fn plus(mut self, node: NodeRef) -> Self {
        self.operands.push(Operand::plus(node));
        self
    }

    pub fn minus(mut self, node: NodeRef) -> Self {
        self.operands.push(Operand::minus(node));
        self
    }

    pub fn with(mut self, node: NodeRef, sign: impl Into<Sign>) -> Self {
        self.operands.push(Operand::new(node, sign.into()));
        self
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }
}

impl Node for Sum {
    fn get(&self) -> f64 {
        self.operands
            .iter()
            .map(|op| op.sign.apply(op.node.get()))
            .sum()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::node::ConstantRef;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn signed_sum_matches_operands(
            a in -1e6_f64..1e6,
            b in -1e6_f64..1e6,
            sign_a: bool,
            sign_b: bool,
        ) {
            let na = ConstantRef::shared(a);
            let nb = ConstantRef::shared(b);
            let sum = Sum::new().with(na, sign_a).with(nb, sign_b);

            let expected = Sign::from(sign_a).apply(a) + Sign::from(sign_b).apply(b);
            prop_assert!((sum.get() - expected).abs() <= 1e-9);
        }
    }
}
