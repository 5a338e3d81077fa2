//! Pull-based signal nodes for fixed-period control loops.
//!
//! A control loop is composed as a small dataflow graph of scalar nodes.
//! Every node exposes a single evaluation operation, [`Node::get`], which
//! recursively pulls its operands. Nothing is cached between calls: a node
//! is re-evaluated each time it is pulled, except where the node keeps
//! deliberate running state ([`Pid`] and [`Filter`]).
//!
//! # Architecture
//!
//! - **Sources**: [`ConstantRef`] setpoint registers and [`Source`] wrappers
//!   around external reads
//! - **Combinators**: [`Sum`], [`Gain`], [`Pid`], [`Filter`]
//! - **Sinks**: [`Output`] forwards a node's value to an [`Actuator`]
//!
//! Combinators hold [`NodeRef`] handles to their operands. The composing
//! subsystem owns the graph; several parents may read the same node.
//!
//! # Limitations
//!
//! - No thread-safety: nodes use `Cell`/`RefCell` and are `!Send`
//! - No anti-windup or output clamping in [`Pid`]; compose saturation
//!   externally
//! - [`Output`] assumes, but does not enforce, its call period

pub mod circular_buffer;
pub mod config;
pub mod error;
pub mod filter;
pub mod gain;
pub mod node;
pub mod output;
pub mod pid;
pub mod sum;

pub use circular_buffer::CircularBuffer;
pub use config::{FilterSpec, PidGains};
pub use error::{ActuatorError, NodeError, NodeResult};
pub use filter::{Filter, MAX_MOVING_AVERAGE_TAPS};
pub use gain::Gain;
pub use node::{ConstantRef, Node, NodeRef, Source};
pub use output::{Actuator, Output};
pub use pid::Pid;
pub use sum::{Operand, Sign, Sum};
