mod adhoc;
mod creation_deadlock;
mod invalid_mapping;
mod invalid_value;

use adhoc::AdhocError;
use creation_deadlock::CreationDeadlock;
pub use creation_deadlock::StuckStep;
use invalid_mapping::InvalidMapping;
use invalid_value::InvalidValue;
use std::sync::Arc;

/// Returns early with an ad-hoc [`Error`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::from_args(format_args!($($arg)*)))
    };
}

/// Builds an ad-hoc [`Error`] from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from_args(format_args!($($arg)*))
    };
}

/// An error raised while building or querying the mapping model.
///
/// One pointer wide. Each error holds a kind and, when context was added,
/// the error it wraps.
#[derive(Clone)]
pub struct Error {
    inner: Arc<ErrorInner>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Wraps this error in `consequent`.
    ///
    /// The wrapping error is displayed first, the root cause last.
    #[inline(always)]
    pub fn context(self, consequent: impl IntoError) -> Error {
        self.wrap(consequent.into_error())
    }

    #[inline(never)]
    #[cold]
    fn wrap(self, consequent: Error) -> Error {
        // A context error shared elsewhere keeps only its message.
        let kind = Arc::try_unwrap(consequent.inner)
            .map(|inner| inner.kind)
            .unwrap_or_else(|shared| ErrorKind::Adhoc(AdhocError::new(shared.kind.to_string())));

        Error {
            inner: Arc::new(ErrorInner {
                kind,
                cause: Some(self),
            }),
        }
    }

    pub fn from_args(args: core::fmt::Arguments<'_>) -> Error {
        Error::from(ErrorKind::Adhoc(AdhocError::new(args.to_string())))
    }

    /// The innermost error, which decides what kind of failure this is.
    fn root(&self) -> &Error {
        let mut err = self;

        while let Some(cause) = &err.inner.cause {
            err = cause;
        }

        err
    }

    fn causes(&self) -> impl Iterator<Item = &Error> {
        core::iter::successors(Some(self), |err| err.inner.cause.as_ref())
    }

    fn kind(&self) -> &ErrorKind {
        &self.inner.kind
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.root().kind() {
            ErrorKind::Anyhow(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        for (depth, err) in self.causes().enumerate() {
            if depth > 0 {
                f.write_str(": ")?;
            }

            core::fmt::Display::fmt(err.kind(), f)?;
        }

        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if f.alternate() {
            f.debug_struct("Error")
                .field("kind", &self.inner.kind)
                .field("cause", &self.inner.cause)
                .finish()
        } else {
            core::fmt::Display::fmt(self, f)
        }
    }
}

#[derive(Debug)]
enum ErrorKind {
    Anyhow(anyhow::Error),
    Adhoc(AdhocError),
    InvalidMapping(InvalidMapping),
    InvalidValue(InvalidValue),
    CreationDeadlock(CreationDeadlock),
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            ErrorKind::Anyhow(err) => core::fmt::Display::fmt(err, f),
            ErrorKind::Adhoc(err) => core::fmt::Display::fmt(err, f),
            ErrorKind::InvalidMapping(err) => core::fmt::Display::fmt(err, f),
            ErrorKind::InvalidValue(err) => core::fmt::Display::fmt(err, f),
            ErrorKind::CreationDeadlock(err) => core::fmt::Display::fmt(err, f),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Arc::new(ErrorInner { kind, cause: None }),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::from(ErrorKind::Anyhow(err))
    }
}

impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}

/// Trait for types that can be converted into an Error.
pub trait IntoError {
    /// Converts this type into an Error.
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        self
    }
}

impl IntoError for &str {
    fn into_error(self) -> Error {
        Error::from(ErrorKind::Adhoc(AdhocError::new(self.to_string())))
    }
}

impl IntoError for String {
    fn into_error(self) -> Error {
        Error::from(ErrorKind::Adhoc(AdhocError::new(self)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NavigableRole;

    #[test]
    fn error_is_one_pointer() {
        assert_eq!(core::mem::size_of::<Error>(), core::mem::size_of::<usize>());
    }

    #[test]
    fn error_from_args() {
        let err = Error::from_args(format_args!("test error: {}", 42));
        assert_eq!(err.to_string(), "test error: 42");
    }

    #[test]
    fn context_is_displayed_outermost_first() {
        let err = Error::invalid_value("`Order.total` expects i64")
            .context("disassembling `Order`")
            .context(String::from("insert failed"));

        assert!(err.is_invalid_value());
        assert_eq!(
            err.to_string(),
            "insert failed: disassembling `Order`: invalid value: `Order.total` expects i64"
        );
    }

    #[test]
    fn shared_context_keeps_its_message() {
        let context = err!("step `A` failed");
        let _shared = context.clone();

        let err = err!("root").context(context);
        assert_eq!(err.to_string(), "step `A` failed: root");
    }

    #[test]
    fn root_cause_is_preserved_through_context() {
        let role = NavigableRole::new("Order").append("customer");
        let err = Error::invalid_mapping(&role, "unknown entity `Client`")
            .context("EntityMappingType(Order)#prepareMappingModel");

        assert!(err.is_invalid_mapping());
        assert_eq!(
            err.to_string(),
            "EntityMappingType(Order)#prepareMappingModel: \
             invalid mapping at `Order.customer`: unknown entity `Client`"
        );
    }

    #[test]
    fn anyhow_bridge() {
        let anyhow_err = anyhow::anyhow!("something failed");
        let our_err: Error = anyhow_err.into();
        assert_eq!(our_err.to_string(), "something failed");
    }
}
