//! Polling hierarchical state machines for sequencing control behaviours.
//!
//! A [`StateMachine`] holds named [`State`]s, each with an entry action, an
//! exit action and a transition predicate. The embedding loop calls
//! [`StateMachine::run`] once per tick; the active state's predicate sees the
//! last event buffered with [`StateMachine::handle_event`] and either stays or
//! names the next state.
//!
//! Machines nest: a machine added as a state of another runs its own states
//! while active, and [`StateMachine::stack_trace`] reports the full path, e.g.
//! `"Auto > LeftGear > Rotate"`. Callers commonly detect completion by
//! comparing the trace against a known terminal path.
//!
//! Callbacks are stored closures with no coupling to hardware types; they
//! typically capture shared setpoint registers and sensor handles.

pub mod error;
pub mod machine;
pub mod state;

pub use error::{MachineError, MachineResult};
pub use machine::{MachineEvent, StateMachine, StateNode};
pub use state::{State, Transition};
