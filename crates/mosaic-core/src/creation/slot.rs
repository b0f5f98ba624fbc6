use crate::NavigableRole;

use std::fmt;

/// Lifecycle of a mapping node while the metamodel is created.
///
/// `Declared -> UnderConstruction -> (Waiting <-> UnderConstruction)* -> Ready`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Declared,
    UnderConstruction,
    Waiting,
    Ready,
}

/// A part of a mapping node that is filled in by a creation step.
///
/// Reads are only permitted once the slot is `Ready`. Any earlier read
/// returns [`NotReady`], which is distinct from a part that does not exist.
#[derive(Debug, Clone)]
pub struct Slot<T> {
    state: State<T>,
}

#[derive(Debug, Clone)]
enum State<T> {
    Declared,
    UnderConstruction,
    Waiting,
    Ready(T),
}

/// Signal that a mapping node was read before it was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotReady {
    /// Role of the node that was read.
    pub role: NavigableRole,

    /// Which part of the node was read.
    pub part: &'static str,

    pub state: LifecycleState,
}

impl<T> Slot<T> {
    pub fn new() -> Slot<T> {
        Slot {
            state: State::Declared,
        }
    }

    /// A slot whose value is known at declaration time.
    pub fn ready(value: T) -> Slot<T> {
        Slot {
            state: State::Ready(value),
        }
    }

    pub fn state(&self) -> LifecycleState {
        match self.state {
            State::Declared => LifecycleState::Declared,
            State::UnderConstruction => LifecycleState::UnderConstruction,
            State::Waiting => LifecycleState::Waiting,
            State::Ready(_) => LifecycleState::Ready,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Marks the slot as being built. A no-op once it is ready.
    pub fn begin(&mut self) {
        match self.state {
            State::Declared | State::Waiting => self.state = State::UnderConstruction,
            State::UnderConstruction | State::Ready(_) => {}
        }
    }

    /// Marks the slot as blocked on another node.
    pub fn wait(&mut self) {
        if let State::UnderConstruction = self.state {
            self.state = State::Waiting;
        }
    }

    pub fn complete(&mut self, value: T) {
        debug_assert!(
            !self.is_ready(),
            "slot completed twice; creation steps must not rebuild a ready part"
        );
        self.state = State::Ready(value);
    }

    pub fn get(&self, role: &NavigableRole, part: &'static str) -> Result<&T, NotReady> {
        match &self.state {
            State::Ready(value) => Ok(value),
            _ => Err(NotReady {
                role: role.clone(),
                part,
                state: self.state(),
            }),
        }
    }

    pub(crate) fn get_mut(&mut self) -> Option<&mut T> {
        match &mut self.state {
            State::Ready(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::new()
    }
}

impl<T: PartialEq> PartialEq for Slot<T> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.state, &other.state) {
            (State::Ready(lhs), State::Ready(rhs)) => lhs == rhs,
            _ => self.state() == other.state(),
        }
    }
}

impl fmt::Display for NotReady {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of `{}` ({:?})", self.part, self.role, self.state)
    }
}
