use super::{NotReady, Progress, Slot, Steps};
use crate::boot::BootModel;
use crate::context::CreationContext;
use crate::mapping::Metamodel;
use crate::{Error, Result};

/// Everything a creation step works on.
pub(crate) struct CreationState<'a> {
    pub(crate) boot: &'a BootModel,
    pub(crate) cx: &'a CreationContext,
    pub(crate) metamodel: Metamodel,
}

pub(crate) type Registrar<'a> = Steps<CreationState<'a>>;

/// Why a creation step stopped early.
#[derive(Debug)]
pub(crate) enum Interrupt {
    /// A dependency is not built yet; retry later.
    NotReady(NotReady),

    /// The mapping is invalid; abort creation.
    Fatal(Error),
}

pub(crate) type StepResult<T = ()> = core::result::Result<T, Interrupt>;

impl From<NotReady> for Interrupt {
    fn from(value: NotReady) -> Self {
        Interrupt::NotReady(value)
    }
}

impl From<Error> for Interrupt {
    fn from(value: Error) -> Self {
        Interrupt::Fatal(value)
    }
}

/// Maps the outcome of a step body onto the scheduler protocol.
pub(crate) fn progress(result: StepResult) -> Result<Progress> {
    match result {
        Ok(()) => Ok(Progress::Complete),
        Err(Interrupt::NotReady(not_ready)) => Ok(Progress::Pending(not_ready)),
        Err(Interrupt::Fatal(err)) => Err(err),
    }
}

/// Stores the outcome of building a slot's value.
///
/// A not-ready outcome leaves the slot `Waiting` and is passed on.
pub(crate) fn settle<T>(slot: &mut Slot<T>, result: StepResult<T>) -> StepResult {
    match result {
        Ok(value) => {
            slot.complete(value);
            Ok(())
        }
        Err(Interrupt::NotReady(not_ready)) => {
            slot.wait();
            Err(not_ready.into())
        }
        Err(fatal) => Err(fatal),
    }
}

pub(crate) fn register<'a>(
    steps: &mut Registrar<'a>,
    name: String,
    mut step: impl FnMut(&mut CreationState<'a>, &mut Registrar<'a>) -> StepResult + 'static,
) {
    steps.register(name, move |state, steps| progress(step(state, steps)));
}

pub(crate) fn register_post<'a>(
    steps: &mut Registrar<'a>,
    name: String,
    mut step: impl FnMut(&mut CreationState<'a>, &mut Registrar<'a>) -> StepResult + 'static,
) {
    steps.register_post(name, move |state, steps| progress(step(state, steps)));
}
