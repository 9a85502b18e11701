use fallback_types::{Row, Value};
use std::borrow::Cow;

/// Anything an [`Expr`](crate::Expr) can be evaluated against.
///
/// A missing field reads as `null`.
pub trait Record {
    fn field(&self, name: &str) -> Option<Cow<'_, Value>>;
}

impl Record for Row {
    fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        self.get(name).map(Cow::Borrowed)
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        (**self).field(name)
    }
}
