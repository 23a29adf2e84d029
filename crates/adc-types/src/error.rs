use thiserror::Error;

use crate::kind::ScalarKind;

/// A name that does not map to any [`ScalarKind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scalar kind '{0}'")]
pub struct UnknownKind(pub String);

/// An element whose kind differs from the kind declared for its array.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("array of {expected} cannot hold an element of {found}")]
pub struct KindMismatch {
    /// Kind declared for the array.
    pub expected: ScalarKind,
    /// Kind of the offending element.
    pub found: ScalarKind,
}
