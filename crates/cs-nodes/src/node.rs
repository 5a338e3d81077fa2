//! The node capability and the two leaf sources.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// A scalar signal that can be pulled once per tick.
pub trait Node {
    /// Evaluate the node, pulling operands as needed.
    fn get(&self) -> f64;
}

/// Shared handle to a node inside a composed graph.
pub type NodeRef = Rc<dyn Node>;

/// Mutable setpoint register.
///
/// Typically held as `Rc<ConstantRef>` by both the control graph (as a PID
/// reference) and the state machine callbacks that move the setpoint.
#[derive(Debug, Default)]
pub struct ConstantRef {
    value: Cell<f64>,
}

impl ConstantRef {
    pub fn new(initial: f64) -> Self {
        Self {
            value: Cell::new(initial),
        }
    }

    /// Convenience for the common shared-ownership case.
    pub fn shared(initial: f64) -> Rc<Self> {
        Rc::new(Self::new(initial))
    }

    pub fn set(&self, value: f64) {
        self.value.set(value);
    }
}

impl Node for ConstantRef {
    fn get(&self) -> f64 {
        self.value.get()
    }
}

/// Wraps an external zero-argument read (sensor, encoder, gyro).
///
/// The callable is invoked on every [`Node::get`]. If the collaborator's value
/// changes between two pulls in the same tick, both pulls see different
/// values. Read failures are the collaborator's business: the callable must
/// always produce a number (e.g. a last-known-good value).
pub struct Source {
    read: Box<dyn Fn() -> f64>,
}

impl Source {
    pub fn new(read: impl Fn() -> f64 + 'static) -> Self {
        Self {
            read: Box::new(read),
        }
    }

    pub fn shared(read: impl Fn() -> f64 + 'static) -> Rc<Self> {
        Rc::new(Self::new(read))
    }
}

impl Node for Source {
    fn get(&self) -> f64 {
        (self.read)()
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_ref_returns_last_set_value() {
        let r = ConstantRef::new(1.5);
        assert_eq!(r.get(), 1.5);
        r.set(-3.0);
        assert_eq!(r.get(), -3.0);
        assert_eq!(r.get(), -3.0);
    }

    #[test]
    fn source_is_read_fresh_every_pull() {
        let counter = Rc::new(Cell::new(0.0));
        let c = Rc::clone(&counter);
        let src = Source::new(move || {
            c.set(c.get() + 1.0);
            c.get()
        });

        assert_eq!(src.get(), 1.0);
        assert_eq!(src.get(), 2.0);
        assert_eq!(counter.get(), 2.0);
    }

    #[test]
    fn shared_nodes_coerce_to_node_ref() {
        let setpoint = ConstantRef::shared(4.0);
        let handle: NodeRef = setpoint.clone();
        setpoint.set(5.0);
        assert_eq!(handle.get(), 5.0);
    }
}
