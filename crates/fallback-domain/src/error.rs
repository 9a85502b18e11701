//! Lookup errors.

/// Errors returned by [`lookup`](crate::lookup) and friends.
///
/// `E` is the source's own error type. A backend failure is carried as-is;
/// nothing here inspects or rewrites it.
#[derive(Debug, thiserror::Error)]
pub enum LookupError<E> {
    /// A required argument was absent. Raised before the source is touched.
    #[error("invalid argument: {argument} is required")]
    InvalidArgument { argument: &'static str },

    #[error(transparent)]
    Backend(E),
}

impl<E> LookupError<E> {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, LookupError::InvalidArgument { .. })
    }

    /// The untouched backend error, if that is what this is.
    pub fn into_backend(self) -> Option<E> {
        match self {
            LookupError::Backend(e) => Some(e),
            LookupError::InvalidArgument { .. } => None,
        }
    }
}
