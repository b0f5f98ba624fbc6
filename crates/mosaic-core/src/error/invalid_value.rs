use super::Error;

/// Error when a domain value does not have the shape its mapping expects.
///
/// Raised while disassembling a value into column values, for example when a
/// composite expects an object of a different type or a natural-id value has
/// the wrong number of components.
#[derive(Debug)]
pub(super) struct InvalidValue {
    message: Box<str>,
}

impl std::error::Error for InvalidValue {}

impl core::fmt::Display for InvalidValue {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid value: {}", self.message)
    }
}

impl Error {
    pub fn invalid_value(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidValue(InvalidValue {
            message: message.into().into(),
        }))
    }

    pub fn is_invalid_value(&self) -> bool {
        matches!(self.root().kind(), super::ErrorKind::InvalidValue(_))
    }
}
