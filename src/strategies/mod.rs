//! Search strategies
//!
//! A search strategy knows how to draw a value from `ConjectureData`, whether
//! it can ever produce anything, whether it can be used for point search
//! (`find`), and how to describe itself. Strategies are shared through
//! [`BoxedStrategy`] so the same node can sit in several places of a larger
//! definition, which is what recursive definitions built with [`deferred`]
//! rely on.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::data::{ConjectureData, DrawError};
use crate::errors::InvalidArgument;

pub mod deferred;

pub use self::deferred::DeferredStrategy;

/// The capability contract every strategy implements.
pub trait SearchStrategy<T>: fmt::Debug {
    /// Draw a value. Callers normally go through `ConjectureData::draw`,
    /// which checks emptiness and nesting depth first.
    fn do_draw(&self, data: &mut ConjectureData) -> Result<T, DrawError>;

    /// Whether this strategy can never produce a value.
    ///
    /// This is a conservative approximation: it may report `false` for a
    /// strategy that is in fact empty, but never `true` for one that is not.
    fn is_empty(&self) -> bool {
        false
    }

    /// Whether this strategy can be used to deterministically locate a value
    /// satisfying a predicate.
    fn supports_find(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        format!("{:?}", self)
    }
}

/// Shared handle to a strategy.
pub type BoxedStrategy<T> = Rc<dyn SearchStrategy<T>>;

/// A strategy that may be used before it is defined.
///
/// ```rust
/// use std::rc::Rc;
/// use conjecture_strategies::strategies::{self, BoxedStrategy, SearchStrategy};
///
/// let values = strategies::deferred::<i128>();
/// let branches: Vec<BoxedStrategy<i128>> = vec![Rc::new(strategies::just(0i128)), values.clone()];
/// values.define(Rc::new(strategies::one_of(branches))).unwrap();
/// assert_eq!(values.describe(), "one_of(just(0), deferred())");
/// ```
pub fn deferred<T: 'static>() -> Rc<DeferredStrategy<T>> {
    Rc::new(DeferredStrategy::new())
}

pub fn just<T: Clone + fmt::Debug>(value: T) -> Just<T> {
    Just { value }
}

pub fn nothing<T>() -> Nothing<T> {
    Nothing {
        _marker: PhantomData,
    }
}

pub fn booleans() -> Booleans {
    Booleans
}

pub fn integers(min_value: i128, max_value: i128) -> Result<Integers, InvalidArgument> {
    if min_value > max_value {
        return Err(InvalidArgument::new(format!(
            "Cannot have max_value={} < min_value={}",
            max_value, min_value
        )));
    }
    Ok(Integers {
        min_value,
        max_value,
    })
}

pub fn one_of<T>(branches: Vec<BoxedStrategy<T>>) -> OneOf<T> {
    OneOf { branches }
}

/// Always draws a clone of the same value.
pub struct Just<T> {
    value: T,
}

impl<T: Clone + fmt::Debug> SearchStrategy<T> for Just<T> {
    fn do_draw(&self, _data: &mut ConjectureData) -> Result<T, DrawError> {
        Ok(self.value.clone())
    }
}

impl<T: fmt::Debug> fmt::Debug for Just<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "just({:?})", self.value)
    }
}

/// Never produces a value.
pub struct Nothing<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> SearchStrategy<T> for Nothing<T> {
    fn do_draw(&self, data: &mut ConjectureData) -> Result<T, DrawError> {
        data.mark_invalid();
        Err(DrawError::EmptyStrategy)
    }

    fn is_empty(&self) -> bool {
        true
    }
}

impl<T> fmt::Debug for Nothing<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("nothing()")
    }
}

pub struct Booleans;

impl SearchStrategy<bool> for Booleans {
    fn do_draw(&self, data: &mut ConjectureData) -> Result<bool, DrawError> {
        data.draw_boolean(0.5)
    }
}

impl fmt::Debug for Booleans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("booleans()")
    }
}

pub struct Integers {
    min_value: i128,
    max_value: i128,
}

impl SearchStrategy<i128> for Integers {
    fn do_draw(&self, data: &mut ConjectureData) -> Result<i128, DrawError> {
        data.draw_integer(self.min_value, self.max_value)
    }
}

impl fmt::Debug for Integers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "integers(min_value={}, max_value={})",
            self.min_value, self.max_value
        )
    }
}

/// Draws from one of several branches, skipping the empty ones.
pub struct OneOf<T> {
    branches: Vec<BoxedStrategy<T>>,
}

impl<T> OneOf<T> {
    pub fn branches(&self) -> &[BoxedStrategy<T>] {
        &self.branches
    }
}

impl<T> SearchStrategy<T> for OneOf<T> {
    fn do_draw(&self, data: &mut ConjectureData) -> Result<T, DrawError> {
        let live: Vec<&BoxedStrategy<T>> =
            self.branches.iter().filter(|b| !b.is_empty()).collect();
        if live.is_empty() {
            data.mark_invalid();
            return Err(DrawError::EmptyStrategy);
        }
        let index = data.draw_integer(0, live.len() as i128 - 1)? as usize;
        data.draw(&**live[index])
    }

    fn is_empty(&self) -> bool {
        self.branches.iter().all(|b| b.is_empty())
    }

    fn supports_find(&self) -> bool {
        self.branches.iter().all(|b| b.supports_find())
    }
}

impl<T> fmt::Debug for OneOf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("one_of(")?;
        for (i, branch) in self.branches.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt::Debug::fmt(&**branch, f)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::ChoiceValue;
    use crate::data::Status;

    #[test]
    fn test_just_draws_its_value() {
        let mut data = ConjectureData::new(0);
        assert_eq!(data.draw(&just("x")), Ok("x"));
        assert!(data.choices().is_empty());
    }

    #[test]
    fn test_nothing_is_empty_and_invalidates() {
        let strategy = nothing::<u8>();
        assert!(strategy.is_empty());
        let mut data = ConjectureData::new(0);
        assert_eq!(data.draw(&strategy), Err(DrawError::EmptyStrategy));
        assert_eq!(data.status, Status::Invalid);
    }

    #[test]
    fn test_integers_rejects_inverted_bounds() {
        let err = integers(3, 1).unwrap_err();
        assert_eq!(err.message(), "Cannot have max_value=1 < min_value=3");
    }

    #[test]
    fn test_describe_uses_repr_style() {
        assert_eq!(just(1).describe(), "just(1)");
        assert_eq!(nothing::<bool>().describe(), "nothing()");
        assert_eq!(booleans().describe(), "booleans()");
        assert_eq!(
            integers(0, 10).unwrap().describe(),
            "integers(min_value=0, max_value=10)"
        );
        let branches: Vec<BoxedStrategy<bool>> = vec![Rc::new(booleans()), Rc::new(just(true))];
        assert_eq!(one_of(branches).describe(), "one_of(booleans(), just(true))");
    }

    #[test]
    fn test_one_of_is_empty_only_when_every_branch_is() {
        let empty: Vec<BoxedStrategy<i128>> = vec![Rc::new(nothing()), Rc::new(nothing())];
        assert!(one_of(empty).is_empty());
        assert!(one_of::<i128>(Vec::new()).is_empty());

        let mixed: Vec<BoxedStrategy<i128>> = vec![Rc::new(nothing()), Rc::new(just(2i128))];
        assert!(!one_of(mixed).is_empty());
    }

    #[test]
    fn test_one_of_skips_empty_branches() {
        let branches: Vec<BoxedStrategy<i128>> = vec![Rc::new(nothing()), Rc::new(just(9i128))];
        let strategy = one_of(branches);
        for seed in 0..20 {
            let mut data = ConjectureData::new(seed);
            assert_eq!(data.draw(&strategy), Ok(9));
            assert_eq!(data.choices(), &[ChoiceValue::Integer(0)]);
        }
    }

    #[test]
    fn test_one_of_replays_branch_choice() {
        let branches: Vec<BoxedStrategy<i128>> = vec![
            Rc::new(just(1i128)),
            Rc::new(integers(10, 20).unwrap()),
        ];
        let strategy = one_of(branches);
        let mut data =
            ConjectureData::for_choices(vec![ChoiceValue::Integer(1), ChoiceValue::Integer(15)]);
        assert_eq!(data.draw(&strategy), Ok(15));
    }

    #[test]
    fn test_draw_checks_emptiness_before_drawing() {
        let empty: Vec<BoxedStrategy<bool>> = vec![Rc::new(nothing())];
        let mut data = ConjectureData::new(0);
        assert_eq!(data.draw(&one_of(empty)), Err(DrawError::EmptyStrategy));
        assert!(data.choices().is_empty());
        assert_eq!(data.status, Status::Invalid);
    }
}
