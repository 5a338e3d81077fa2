//! Scalar gain stage.

use crate::node::{Node, NodeRef};

/// Multiplies an upstream node by a constant factor.
#[derive(Clone)]
pub struct Gain {
    factor: f64,
    upstream: NodeRef,
}

impl Gain {
    pub fn new(factor: f64, upstream: NodeRef) -> Self {
        Self { factor, upstream }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl Node for Gain {
    fn get(&self) -> f64 {
        self.factor * self.upstream.get()
    }
}
