//! Leaf states and transition results.

use std::fmt;

/// Result of a transition predicate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Transition {
    /// Remain in the active state; nothing fires.
    #[default]
    Stay,
    /// Move to the named state.
    To(String),
}

impl Transition {
    /// Transition to `name`. An empty name means [`Transition::Stay`].
    pub fn to(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() {
            Self::Stay
        } else {
            Self::To(name)
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Stay => None,
            Self::To(name) => Some(name),
        }
    }
}

impl From<&str> for Transition {
    fn from(name: &str) -> Self {
        Self::to(name)
    }
}

impl From<String> for Transition {
    fn from(name: String) -> Self {
        Self::to(name)
    }
}

impl<T: Into<Transition>> From<Option<T>> for Transition {
    fn from(target: Option<T>) -> Self {
        target.map_or(Self::Stay, Into::into)
    }
}

type Action = Box<dyn FnMut()>;
type Predicate = Box<dyn FnMut(&str) -> Transition>;

/// A named state with optional entry, exit and transition callbacks.
///
/// ```
/// use cs_statemachine::{State, Transition};
///
/// let state = State::new("Rotate")
///     .on_entry(|| println!("rotating"))
///     .with_transition(|event| {
///         if event == "abort" { Transition::to("Idle") } else { Transition::Stay }
///     });
/// assert_eq!(state.name(), "Rotate");
/// ```
pub struct State {
    name: String,
    entry: Option<Action>,
    exit: Option<Action>,
    check_transition: Option<Predicate>,
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: None,
            exit: None,
            check_transition: None,
        }
    }

    /// Action run once each time the state becomes active.
    pub fn on_entry<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.entry = Some(Box::new(f));
        self
    }

    /// Action run once each time the state stops being active.
    pub fn on_exit<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.exit = Some(Box::new(f));
        self
    }

    /// Predicate polled on every run with the buffered event.
    pub fn with_transition<F: FnMut(&str) -> Transition + 'static>(mut self, f: F) -> Self {
        self.check_transition = Some(Box::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn enter(&mut self) {
        if let Some(f) = self.entry.as_mut() {
            f();
        }
    }

    pub(crate) fn leave(&mut self) {
        if let Some(f) = self.exit.as_mut() {
            f();
        }
    }

    pub(crate) fn check(&mut self, event: &str) -> Transition {
        match self.check_transition.as_mut() {
            Some(f) => f(event),
            None => Transition::Stay,
        }
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("entry", &self.entry.is_some())
            .field("exit", &self.exit.is_some())
            .field("check_transition", &self.check_transition.is_some())
            .finish()
    }
}
