//! # Conjecture strategies
//!
//! The search strategy contract for Hypothesis implementations, together with
//! `DeferredStrategy`, the placeholder that makes recursive and mutually
//! recursive strategy definitions possible.
//!
//! A deferred strategy is created before its definition exists, shared into
//! the combinators that refer to it, and bound once the definition is built:
//!
//! ```rust
//! use std::rc::Rc;
//! use conjecture_strategies::{strategies, BoxedStrategy, ChoiceValue, ConjectureData, SearchStrategy};
//!
//! let bits = strategies::deferred::<bool>();
//! let definition: BoxedStrategy<bool> = Rc::new(strategies::booleans());
//! bits.define(definition).unwrap();
//!
//! let mut data = ConjectureData::new(0);
//! let value = data.draw(&*bits).unwrap();
//! assert_eq!(data.choices(), &[ChoiceValue::Boolean(value)]);
//! assert_eq!(bits.describe(), "booleans()");
//! ```

pub mod choice;
pub mod data;
pub mod errors;
pub mod strategies;

// Re-export core types for easy access
pub use choice::{ChoiceType, ChoiceValue};
pub use data::{ConjectureData, DataConfig, DrawError, Status};
pub use errors::InvalidArgument;
pub use strategies::{deferred, BoxedStrategy, DeferredStrategy, SearchStrategy};
