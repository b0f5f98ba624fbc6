use super::Error;
use crate::NavigableRole;

/// Error when the boot model cannot be turned into a runtime mapping.
///
/// This occurs when:
/// - An association references an entity or property that does not exist
/// - The two sides of a foreign key disagree on column count or JDBC types
/// - A discriminator value is declared twice, or a subtype is unknown
/// - An id-class attribute cannot be matched to an identifier attribute
/// - A natural-id value does not have the shape of the natural-id attributes
///
/// These errors abort bootstrap. They always carry the role of the offending
/// mapping node.
#[derive(Debug)]
pub(super) struct InvalidMapping {
    role: Box<str>,
    message: Box<str>,
}

impl std::error::Error for InvalidMapping {}

impl core::fmt::Display for InvalidMapping {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid mapping at `{}`: {}", self.role, self.message)
    }
}

impl Error {
    /// Creates an invalid mapping error for the mapping node at `role`.
    pub fn invalid_mapping(role: &NavigableRole, message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidMapping(InvalidMapping {
            role: role.full_path().into(),
            message: message.into().into(),
        }))
    }

    /// Returns `true` if the root cause of this error is an invalid mapping.
    pub fn is_invalid_mapping(&self) -> bool {
        matches!(self.root().kind(), super::ErrorKind::InvalidMapping(_))
    }
}
