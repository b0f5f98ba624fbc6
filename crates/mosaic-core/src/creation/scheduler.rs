use super::NotReady;
use crate::{error::StuckStep, Error, Result};

use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, trace};

/// Outcome of running a creation step once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// The step did its work and will not run again.
    Complete,

    /// A dependency is not built yet. The step is re-queued.
    Pending(NotReady),
}

type StepFn<S> = Box<dyn FnMut(&mut S, &mut Steps<S>) -> Result<Progress>>;

struct Step<S> {
    name: String,
    run: StepFn<S>,
    waiting_on: Option<NotReady>,
}

/// Steps registered while another step runs.
///
/// Registrations are staged and only reach the scheduler if the registering
/// step completes. A pending step registers its follow-ups again on retry.
pub struct Steps<S> {
    primary: Vec<Step<S>>,
    post: Vec<Step<S>>,
}

/// Runs named, idempotent steps until every one of them completes.
///
/// Steps run in insertion order. A step that reports [`Progress::Pending`]
/// goes to the back of the queue. A full pass over the queue that completes
/// nothing is a deadlock. Post-initialization steps run only once the primary
/// queue has drained.
pub struct Scheduler<S> {
    queue: VecDeque<Step<S>>,
    post: VecDeque<Step<S>>,
    passes: usize,
}

impl<S> Steps<S> {
    fn new() -> Steps<S> {
        Steps {
            primary: vec![],
            post: vec![],
        }
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        step: impl FnMut(&mut S, &mut Steps<S>) -> Result<Progress> + 'static,
    ) {
        self.primary.push(Step::new(name, step));
    }

    pub fn register_post(
        &mut self,
        name: impl Into<String>,
        step: impl FnMut(&mut S, &mut Steps<S>) -> Result<Progress> + 'static,
    ) {
        self.post.push(Step::new(name, step));
    }
}

impl<S> Step<S> {
    fn new(
        name: impl Into<String>,
        step: impl FnMut(&mut S, &mut Steps<S>) -> Result<Progress> + 'static,
    ) -> Step<S> {
        Step {
            name: name.into(),
            run: Box::new(step),
            waiting_on: None,
        }
    }
}

impl<S> Scheduler<S> {
    pub fn new() -> Scheduler<S> {
        Scheduler {
            queue: VecDeque::new(),
            post: VecDeque::new(),
            passes: 0,
        }
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        step: impl FnMut(&mut S, &mut Steps<S>) -> Result<Progress> + 'static,
    ) {
        self.queue.push_back(Step::new(name, step));
    }

    pub fn register_post(
        &mut self,
        name: impl Into<String>,
        step: impl FnMut(&mut S, &mut Steps<S>) -> Result<Progress> + 'static,
    ) {
        self.post.push_back(Step::new(name, step));
    }

    /// Number of passes run so far, over both queues.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Number of steps not yet completed, over both queues.
    pub fn remaining(&self) -> usize {
        self.queue.len() + self.post.len()
    }

    /// Runs the primary queue to completion, then the post-initialization
    /// queue.
    pub fn run(&mut self, state: &mut S) -> Result<()> {
        while !self.queue.is_empty() {
            self.pass(state, Phase::Primary)?;
        }

        // Steps registered during the post phase join the post queue,
        // whichever queue they asked for.
        self.queue = std::mem::take(&mut self.post);

        while !self.queue.is_empty() {
            self.pass(state, Phase::Post)?;
        }

        Ok(())
    }

    fn pass(&mut self, state: &mut S, phase: Phase) -> Result<()> {
        self.passes += 1;

        let len = self.queue.len();
        let mut completed = 0;

        for _ in 0..len {
            let Some(mut step) = self.queue.pop_front() else {
                break;
            };

            let mut staged = Steps::new();

            match (step.run)(state, &mut staged) {
                Ok(Progress::Complete) => {
                    trace!(step = %step.name, "creation step complete");
                    completed += 1;

                    match phase {
                        Phase::Primary => {
                            self.queue.extend(staged.primary);
                            self.post.extend(staged.post);
                        }
                        Phase::Post => {
                            self.queue.extend(staged.primary);
                            self.queue.extend(staged.post);
                        }
                    }
                }
                Ok(Progress::Pending(not_ready)) => {
                    trace!(step = %step.name, waiting_on = %not_ready, "creation step pending");
                    step.waiting_on = Some(not_ready);
                    self.queue.push_back(step);
                }
                Err(err) => {
                    return Err(err.context(format!("creation step `{}` failed", step.name)));
                }
            }
        }

        debug!(
            pass = self.passes,
            %phase,
            completed,
            pending = self.queue.len(),
            "creation pass finished"
        );

        if completed == 0 {
            let stuck = self
                .queue
                .iter()
                .map(|step| StuckStep {
                    name: step.name.clone(),
                    waiting_on: step
                        .waiting_on
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| "nothing".to_string()),
                })
                .collect();

            return Err(Error::creation_deadlock(stuck));
        }

        Ok(())
    }
}

impl<S> Default for Scheduler<S> {
    fn default() -> Self {
        Scheduler::new()
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Primary,
    Post,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Primary => f.write_str("primary"),
            Phase::Post => f.write_str("post-init"),
        }
    }
}

impl<S> fmt::Debug for Scheduler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field(
                "queue",
                &self.queue.iter().map(|step| &step.name).collect::<Vec<_>>(),
            )
            .field(
                "post",
                &self.post.iter().map(|step| &step.name).collect::<Vec<_>>(),
            )
            .field("passes", &self.passes)
            .finish()
    }
}
