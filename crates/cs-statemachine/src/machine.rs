//! State machine engine.
//!
//! # Run semantics
//!
//! - The first [`StateMachine::run`] enters the first state added.
//! - Every later run polls the active state's predicate with the buffered
//!   event (which is then cleared). A target different from the active state
//!   fires the active state's exit, then the target's entry.
//! - A target that does not exist faults the machine before any exit fires.
//!   The previously active state stays active and all further runs fail.
//!
//! # Nesting
//!
//! A machine added as a state of another machine behaves like a state whose
//! body is the child machine. Entering it fires its own entry action and
//! then enters its first child state. Each parent run forwards the buffered
//! event to the child, runs it, and then polls the nested machine's own
//! predicate with the event and the child's active state name. Leaving it
//! exits the active child state, then fires its own exit action. Re-entering
//! starts the child from its first state again and clears its fault.
//!
//! A failing child does not stop its parent: the nested predicate is still
//! polled, so the parent can leave the faulted child for a safe state. The
//! child's error is returned after that transition.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, error};

use crate::error::{MachineError, MachineResult};
use crate::state::{State, Transition};

type Action = Box<dyn FnMut()>;
type NestedPredicate = Box<dyn FnMut(&str, &str) -> Transition>;
type Hook = Box<dyn FnMut(&MachineEvent<'_>)>;

/// Diagnostic notification passed to an optional hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineEvent<'a> {
    /// A state became active.
    Entered {
        machine: &'a str,
        state: &'a str,
        path: &'a str,
    },
    /// A state stopped being active.
    Exited {
        machine: &'a str,
        state: &'a str,
        path: &'a str,
    },
}

/// Something that can be registered as a state of a machine.
pub enum StateNode {
    Leaf(State),
    Machine(Box<StateMachine>),
}

impl StateNode {
    pub fn name(&self) -> &str {
        match self {
            Self::Leaf(state) => state.name(),
            Self::Machine(machine) => machine.name(),
        }
    }
}

impl From<State> for StateNode {
    fn from(state: State) -> Self {
        Self::Leaf(state)
    }
}

impl From<StateMachine> for StateNode {
    fn from(machine: StateMachine) -> Self {
        Self::Machine(Box::new(machine))
    }
}

/// Named collection of states with exactly one active state once started.
pub struct StateMachine {
    name: String,
    /// Full path of the owning machine, set when added as a nested state.
    parent: Option<String>,
    states: Vec<StateNode>,
    index: HashMap<String, usize>,
    active: Option<usize>,
    pending_event: String,
    faulted: bool,
    entry: Option<Action>,
    exit: Option<Action>,
    check_transition: Option<NestedPredicate>,
    hook: Option<Hook>,
}

impl StateMachine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            states: Vec::new(),
            index: HashMap::new(),
            active: None,
            pending_event: String::new(),
            faulted: false,
            entry: None,
            exit: None,
            check_transition: None,
            hook: None,
        }
    }

    /// Entry action used when this machine is nested inside another.
    pub fn on_entry<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.entry = Some(Box::new(f));
        self
    }

    /// Exit action used when this machine is nested inside another.
    pub fn on_exit<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.exit = Some(Box::new(f));
        self
    }

    /// Predicate used when this machine is nested inside another.
    ///
    /// Receives the buffered event and the name of the child's active state.
    pub fn with_transition<F>(mut self, f: F) -> Self
    where
        F: FnMut(&str, &str) -> Transition + 'static,
    {
        self.check_transition = Some(Box::new(f));
        self
    }

    /// Install a diagnostic hook called on every entry and exit.
    pub fn set_hook<F: FnMut(&MachineEvent<'_>) + 'static>(&mut self, hook: F) {
        self.hook = Some(Box::new(hook));
    }

    /// Register a state or nested machine.
    ///
    /// Fails with [`MachineError::DuplicateState`] if the name is taken; the
    /// machine is left unchanged.
    pub fn add_state(&mut self, state: impl Into<StateNode>) -> MachineResult<()> {
        let mut node = state.into();
        let name = node.name().to_string();
        if self.index.contains_key(&name) {
            return Err(MachineError::DuplicateState {
                machine: self.name.clone(),
                state: name,
            });
        }
        if let StateNode::Machine(child) = &mut node {
            child.set_parent(self.own_path());
        }
        self.index.insert(name, self.states.len());
        self.states.push(node);
        Ok(())
    }

    /// Buffer an event for the next run's transition check.
    pub fn handle_event(&mut self, event: impl Into<String>) {
        self.pending_event = event.into();
    }

    /// Advance the machine by one tick.
    pub fn run(&mut self) -> MachineResult<()> {
        if self.faulted {
            return Err(MachineError::MachineFaulted {
                machine: self.name.clone(),
            });
        }
        if self.states.is_empty() {
            return Err(MachineError::NoStates {
                machine: self.name.clone(),
            });
        }

        let Some(current) = self.active else {
            self.enter_state(0);
            return Ok(());
        };

        let event = std::mem::take(&mut self.pending_event);
        let (transition, child_result) = match &mut self.states[current] {
            StateNode::Leaf(state) => (state.check(&event), Ok(())),
            StateNode::Machine(child) => {
                child.handle_event(event.as_str());
                let result = child.run();
                (child.check_nested(&event), result)
            }
        };

        self.follow(current, transition)?;
        child_result
    }

    /// Apply a predicate result for the active state at `current`.
    fn follow(&mut self, current: usize, transition: Transition) -> MachineResult<()> {
        let Transition::To(target) = transition else {
            return Ok(());
        };
        if target == self.states[current].name() {
            return Ok(());
        }
        let Some(&next) = self.index.get(&target) else {
            error!(machine = %self.name, target = %target, "transition to unknown state");
            self.faulted = true;
            return Err(MachineError::UnknownState {
                machine: self.name.clone(),
                state: target,
            });
        };

        self.exit_state(current);
        self.enter_state(next);
        Ok(())
    }

    /// Active-state path, e.g. `"Seq > Idle"` or `"Auto > LeftGear > Rotate"`.
    ///
    /// Before the first run only the machine path is returned.
    pub fn stack_trace(&self) -> String {
        let mut path = self.own_path();
        self.append_active(&mut path);
        path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the active state, `None` before the first run.
    pub fn active_state(&self) -> Option<&str> {
        self.active.map(|i| self.states[i].name())
    }

    pub fn is_started(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    /// State names in insertion order.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(StateNode::name)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn own_path(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{parent} > {}", self.name),
            None => self.name.clone(),
        }
    }

    fn set_parent(&mut self, parent: String) {
        self.parent = Some(parent);
        let own = self.own_path();
        for node in &mut self.states {
            if let StateNode::Machine(child) = node {
                child.set_parent(own.clone());
            }
        }
    }

    fn append_active(&self, path: &mut String) {
        let Some(i) = self.active else {
            return;
        };
        path.push_str(" > ");
        match &self.states[i] {
            StateNode::Leaf(state) => path.push_str(state.name()),
            StateNode::Machine(child) => {
                path.push_str(child.name());
                child.append_active(path);
            }
        }
    }

    fn enter_state(&mut self, i: usize) {
        self.active = Some(i);
        match &mut self.states[i] {
            StateNode::Leaf(state) => state.enter(),
            StateNode::Machine(child) => {
                if let Some(f) = child.entry.as_mut() {
                    f();
                }
            }
        }
        self.notify(i, true);

        if let StateNode::Machine(child) = &mut self.states[i] {
            child.active = None;
            child.faulted = false;
            child.pending_event.clear();
            if !child.states.is_empty() {
                child.enter_state(0);
            }
        }
    }

    fn exit_state(&mut self, i: usize) {
        match &mut self.states[i] {
            StateNode::Leaf(state) => state.leave(),
            StateNode::Machine(child) => {
                if let Some(active) = child.active {
                    child.exit_state(active);
                }
                child.active = None;
                if let Some(f) = child.exit.as_mut() {
                    f();
                }
            }
        }
        self.notify(i, false);
    }

    fn check_nested(&mut self, event: &str) -> Transition {
        let active = self.active.map(|i| self.states[i].name()).unwrap_or_default();
        match self.check_transition.as_mut() {
            Some(f) => f(event, active),
            None => Transition::Stay,
        }
    }

    fn notify(&mut self, i: usize, entered: bool) {
        let state = self.states[i].name();
        let path = format!("{} > {state}", self.own_path());
        if entered {
            debug!(machine = %self.name, state, path = %path, "entered state");
        } else {
            debug!(machine = %self.name, state, path = %path, "exited state");
        }
        if let Some(hook) = self.hook.as_mut() {
            let event = if entered {
                MachineEvent::Entered {
                    machine: &self.name,
                    state,
                    path: &path,
                }
            } else {
                MachineEvent::Exited {
                    machine: &self.name,
                    state,
                    path: &path,
                }
            };
            hook(&event);
        }
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("path", &self.own_path())
            .field("states", &self.state_names().collect::<Vec<_>>())
            .field("active", &self.active_state())
            .field("faulted", &self.faulted)
            .finish()
    }
}
