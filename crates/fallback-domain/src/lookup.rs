use crate::error::LookupError;
use crate::predicate::{Or, Predicate};
use crate::source::QuerySource;
use tracing::debug;

/// A lookup hit, tagged with the predicate that selected it.
#[derive(Clone, Debug, PartialEq)]
pub enum Match<T> {
    Primary(T),
    Fallback(T),
}

impl<T> Match<T> {
    pub fn is_primary(&self) -> bool {
        matches!(self, Match::Primary(_))
    }

    pub fn get(&self) -> &T {
        match self {
            Match::Primary(item) | Match::Fallback(item) => item,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Match::Primary(item) | Match::Fallback(item) => item,
        }
    }
}

/// Fetch everything matching `primary OR fallback` once, then pick locally.
///
/// Returns the first element (in the order the source returned them) that
/// satisfies `primary`; otherwise the first that satisfies `fallback`;
/// otherwise `None`. Exactly one call to [`QuerySource::fetch`] is made.
pub fn find_match<S, P, Q>(
    source: &S,
    primary: P,
    fallback: Q,
) -> Result<Option<Match<S::Item>>, LookupError<S::Error>>
where
    S: QuerySource<Or<P, Q>> + ?Sized,
    P: Predicate<S::Item>,
    Q: Predicate<S::Item>,
{
    let combined = Or::new(primary, fallback);
    let mut rows = source.fetch(&combined).map_err(LookupError::Backend)?;
    debug!(rows = rows.len(), "combined fetch returned");

    if let Some(idx) = rows.iter().position(|row| combined.left().evaluate(row)) {
        debug!(position = idx, "primary predicate matched");
        return Ok(Some(Match::Primary(rows.swap_remove(idx))));
    }
    if let Some(idx) = rows.iter().position(|row| combined.right().evaluate(row)) {
        debug!(position = idx, "fallback predicate matched");
        return Ok(Some(Match::Fallback(rows.swap_remove(idx))));
    }

    debug!("no row matched either predicate");
    Ok(None)
}

/// [`find_match`] without the branch tag.
pub fn find_first_or_fallback<S, P, Q>(
    source: &S,
    primary: P,
    fallback: Q,
) -> Result<Option<S::Item>, LookupError<S::Error>>
where
    S: QuerySource<Or<P, Q>> + ?Sized,
    P: Predicate<S::Item>,
    Q: Predicate<S::Item>,
{
    Ok(find_match(source, primary, fallback)?.map(Match::into_inner))
}

/// Checked entry point for callers whose arguments may be absent.
///
/// Any missing argument is an [`LookupError::InvalidArgument`], raised before
/// the source is touched. Arguments are checked in order: source, primary,
/// fallback.
pub fn lookup<S, P, Q>(
    source: Option<&S>,
    primary: Option<P>,
    fallback: Option<Q>,
) -> Result<Option<Match<S::Item>>, LookupError<S::Error>>
where
    S: QuerySource<Or<P, Q>> + ?Sized,
    P: Predicate<S::Item>,
    Q: Predicate<S::Item>,
{
    let source = source.ok_or(LookupError::InvalidArgument { argument: "source" })?;
    let primary = primary.ok_or(LookupError::InvalidArgument { argument: "primary" })?;
    let fallback = fallback.ok_or(LookupError::InvalidArgument { argument: "fallback" })?;
    find_match(source, primary, fallback)
}
