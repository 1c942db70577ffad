//! # DeferredStrategy: strategies that are used before they are defined
//!
//! Recursive definitions need to mention a strategy before it exists. A
//! `DeferredStrategy` is created empty, handed to whatever combinators need
//! it, and later bound exactly once with [`DeferredStrategy::define`]. From
//! then on every operation is forwarded to the bound strategy.
//!
//! Two queries can come back to the same node while they are still being
//! answered: `is_empty` (the definition's emptiness usually depends on the
//! node itself) and the description (printing the definition prints the node).
//! Both keep a small piece of per-node state that answers such re-entrant
//! calls with a fixed default instead of recursing:
//!
//! - `is_empty` answers `false` while its first evaluation is in flight, then
//!   caches the real result. Emptiness is a conservative approximation, so an
//!   under-reported `false` is always acceptable.
//! - The description answers `deferred()` while the bound strategy is being
//!   described.

use std::any::{self, Any};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use once_cell::unsync::OnceCell;

use super::{BoxedStrategy, SearchStrategy};
use crate::data::{ConjectureData, DrawError};
use crate::errors::InvalidArgument;

/// Rendering of a node that is not defined yet, or is already being described.
const PLACEHOLDER: &str = "deferred()";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emptiness {
    Unknown,
    /// First evaluation in progress; re-entrant queries see `false`.
    Computing,
    Known(bool),
}

/// A strategy which may be used before it is fully defined.
pub struct DeferredStrategy<T> {
    wrapped: OnceCell<BoxedStrategy<T>>,
    emptiness: Cell<Emptiness>,
    describing: Cell<bool>,
}

/// Clears the describing flag when dropped, including during unwinding.
struct DescribeGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> DescribeGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for DescribeGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

impl<T: 'static> DeferredStrategy<T> {
    pub fn new() -> Self {
        Self {
            wrapped: OnceCell::new(),
            emptiness: Cell::new(Emptiness::Unknown),
            describing: Cell::new(false),
        }
    }

    pub fn is_defined(&self) -> bool {
        self.wrapped.get().is_some()
    }

    /// The strategy this node was defined as, if any.
    pub fn wrapped_strategy(&self) -> Option<&BoxedStrategy<T>> {
        self.wrapped.get()
    }

    /// Bind this node to `definition`.
    ///
    /// Fails without changing anything if `definition` is this node itself or
    /// if the node has already been defined, whatever the new definition is.
    pub fn define(&self, definition: BoxedStrategy<T>) -> Result<(), InvalidArgument> {
        if Rc::as_ptr(&definition) as *const () == self as *const Self as *const () {
            log::debug!("Rejecting definition of a deferred strategy as itself");
            return Err(InvalidArgument::new(
                "Cannot define a deferred strategy to be itself",
            ));
        }

        self.wrapped.set(definition).map_err(|rejected| {
            let existing = self
                .wrapped
                .get()
                .map_or_else(|| PLACEHOLDER.to_string(), |s| s.describe());
            log::debug!("Rejecting redefinition of deferred strategy {}", existing);
            InvalidArgument::new(format!(
                "Deferred strategy has already been defined as {}. Cannot redefine it as {}.",
                existing,
                rejected.describe()
            ))
        })?;

        log::debug!("Defined deferred strategy");
        Ok(())
    }

    /// Bind this node to a value whose type is only known at runtime.
    ///
    /// `value` must be a `BoxedStrategy<T>` or an `Rc<DeferredStrategy<T>>`;
    /// anything else, including strategies for a different value type, is
    /// rejected with a message naming the value and its type.
    pub fn define_any<V: Any + fmt::Debug>(&self, value: V) -> Result<(), InvalidArgument> {
        let candidate: &dyn Any = &value;
        if let Some(strategy) = candidate.downcast_ref::<BoxedStrategy<T>>() {
            return self.define(Rc::clone(strategy));
        }
        if let Some(node) = candidate.downcast_ref::<Rc<DeferredStrategy<T>>>() {
            return self.define(Rc::clone(node) as BoxedStrategy<T>);
        }
        Err(InvalidArgument::new(format!(
            "Expected definition to be a SearchStrategy but got {:?} of type {}",
            value,
            any::type_name::<V>()
        )))
    }

    /// Run `f` on the wrapped strategy unless it is missing or already being
    /// described further up the stack.
    fn describing_wrapped<R>(&self, f: impl FnOnce(&BoxedStrategy<T>) -> R) -> Option<R> {
        let wrapped = self.wrapped.get()?;
        if self.describing.get() {
            return None;
        }
        let _guard = DescribeGuard::enter(&self.describing);
        Some(f(wrapped))
    }
}

impl<T: 'static> Default for DeferredStrategy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> SearchStrategy<T> for DeferredStrategy<T> {
    fn do_draw(&self, data: &mut ConjectureData) -> Result<T, DrawError> {
        match self.wrapped.get() {
            Some(wrapped) => wrapped.do_draw(data),
            None => Err(InvalidArgument::new(
                "Attempted to draw from deferred strategy that has not yet been defined.",
            )
            .into()),
        }
    }

    fn is_empty(&self) -> bool {
        let wrapped = match self.wrapped.get() {
            Some(wrapped) => wrapped,
            None => return false,
        };

        match self.emptiness.get() {
            Emptiness::Known(empty) => empty,
            Emptiness::Computing => {
                log::trace!("Re-entrant is_empty on deferred strategy, answering false");
                false
            }
            Emptiness::Unknown => {
                self.emptiness.set(Emptiness::Computing);
                let empty = wrapped.is_empty();
                self.emptiness.set(Emptiness::Known(empty));
                empty
            }
        }
    }

    fn supports_find(&self) -> bool {
        self.wrapped.get().map_or(true, |wrapped| wrapped.supports_find())
    }

    fn describe(&self) -> String {
        self.describing_wrapped(|wrapped| wrapped.describe())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }
}

impl<T: 'static> fmt::Debug for DeferredStrategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.describing_wrapped(|wrapped| fmt::Debug::fmt(&**wrapped, f))
            .unwrap_or_else(|| f.write_str(PLACEHOLDER))
    }
}
