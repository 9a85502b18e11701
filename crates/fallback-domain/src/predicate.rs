//! Boolean tests over elements, and their OR composition.

/// A side-effect-free boolean test over an element.
///
/// Any `Fn(&T) -> bool` is a predicate. Backends that cannot run Rust closures
/// (SQLite) accept only predicates they know how to translate, such as
/// [`Expr`](crate::Expr) and [`Or`] of translatable parts.
pub trait Predicate<T: ?Sized> {
    fn evaluate(&self, item: &T) -> bool;

    /// Combine with `other` into `self OR other`.
    ///
    /// Both halves stay reachable through [`Or::left`] and [`Or::right`], so
    /// the combined value can drive a backend fetch while each half is still
    /// evaluated on its own afterwards.
    fn or<Q>(self, other: Q) -> Or<Self, Q>
    where
        Self: Sized,
        Q: Predicate<T>,
    {
        Or::new(self, other)
    }
}

impl<T: ?Sized, F> Predicate<T> for F
where
    F: Fn(&T) -> bool,
{
    fn evaluate(&self, item: &T) -> bool {
        self(item)
    }
}

/// Logical OR of two predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Or<A, B> {
    left: A,
    right: B,
}

impl<A, B> Or<A, B> {
    pub fn new(left: A, right: B) -> Self {
        Self { left, right }
    }

    pub fn left(&self) -> &A {
        &self.left
    }

    pub fn right(&self) -> &B {
        &self.right
    }

    pub fn into_parts(self) -> (A, B) {
        (self.left, self.right)
    }
}

impl<T: ?Sized, A, B> Predicate<T> for Or<A, B>
where
    A: Predicate<T>,
    B: Predicate<T>,
{
    fn evaluate(&self, item: &T) -> bool {
        self.left.evaluate(item) || self.right.evaluate(item)
    }
}
