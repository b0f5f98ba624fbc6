use super::Error;

/// Error when a full scheduler pass completes no step.
///
/// Every remaining step is waiting on a mapping that another remaining step
/// has to build first. The stuck steps are listed in queue order together with
/// the reason each one reported on its last attempt.
#[derive(Debug)]
pub(super) struct CreationDeadlock {
    stuck: Vec<StuckStep>,
}

/// A step left in the queue when the scheduler gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StuckStep {
    /// Name the step was registered under.
    pub name: String,

    /// Rendering of the `NotReady` signal the step returned last.
    pub waiting_on: String,
}

impl std::error::Error for CreationDeadlock {}

impl core::fmt::Display for CreationDeadlock {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "mapping model creation made no progress; {} step(s) stuck:",
            self.stuck.len()
        )?;

        for step in &self.stuck {
            write!(f, "\n  - {} (waiting on {})", step.name, step.waiting_on)?;
        }

        Ok(())
    }
}

impl Error {
    /// Creates a deadlock error listing the steps that could not complete.
    pub fn creation_deadlock(stuck: Vec<StuckStep>) -> Error {
        Error::from(super::ErrorKind::CreationDeadlock(CreationDeadlock { stuck }))
    }

    /// Returns `true` if this error reports a scheduler deadlock.
    pub fn is_creation_deadlock(&self) -> bool {
        matches!(self.root().kind(), super::ErrorKind::CreationDeadlock(_))
    }

    /// Returns the stuck steps if this error reports a scheduler deadlock.
    pub fn stuck_steps(&self) -> Option<&[StuckStep]> {
        match self.root().kind() {
            super::ErrorKind::CreationDeadlock(err) => Some(&err.stuck),
            _ => None,
        }
    }
}
