//! # ConjectureData: the data source strategies draw from
//!
//! `ConjectureData` is the opaque source of choices handed to every
//! `SearchStrategy::do_draw` call. It either generates fresh choices from a
//! seeded ChaCha8 generator or replays a fixed sequence of choices, and it
//! records every choice it hands out so a run can be replayed exactly.
//!
//! ```rust
//! use conjecture_strategies::data::ConjectureData;
//!
//! let mut data = ConjectureData::new(42);
//! let x = data.draw_integer(0, 100)?;
//! let b = data.draw_boolean(0.7)?;
//! assert!((0..=100).contains(&x));
//!
//! let mut replay = ConjectureData::for_choices(data.choices().to_vec());
//! assert_eq!(replay.draw_integer(0, 100)?, x);
//! assert_eq!(replay.draw_boolean(0.7)?, b);
//! # Ok::<(), conjecture_strategies::data::DrawError>(())
//! ```
//!
//! Strategy-level draws go through [`ConjectureData::draw`], which rejects
//! empty strategies and bounds the nesting depth of recursive definitions.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::choice::{ChoiceType, ChoiceValue};
use crate::errors::InvalidArgument;
use crate::strategies::SearchStrategy;

/// Configuration for a `ConjectureData` instance
#[derive(Debug, Clone)]
pub struct DataConfig {
    /// Random seed for deterministic generation
    pub seed: u64,

    /// Maximum number of choices a single run may make
    pub max_length: usize,

    /// Maximum nesting of strategy draws before the run is marked invalid
    pub max_depth: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_length: 8192, // Match Python's BUFFER_SIZE
            max_depth: 100,
        }
    }
}

/// Status of a ConjectureData instance
/// Values match Python's Status enum: OVERRUN=0, INVALID=1, VALID=2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Ran out of choices (replay exhausted or `max_length` reached)
    Overrun = 0,
    /// The run drew from something that can never produce a value
    Invalid = 1,
    /// Still running and able to accept more draws
    Valid = 2,
}

impl Default for Status {
    fn default() -> Self {
        Status::Valid
    }
}

/// Errors that can end a draw
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DrawError {
    /// Attempted to draw from a frozen ConjectureData
    #[error("Cannot draw from frozen ConjectureData")]
    Frozen,
    /// Attempted to draw from ConjectureData whose status is not valid
    #[error("Cannot draw from ConjectureData with status {0:?}")]
    InvalidStatus(Status),
    /// Ran past the available choices
    #[error("Overran maximum number of choices")]
    Overrun,
    /// Invalid range (min > max)
    #[error("Invalid range: min_value={min} > max_value={max}")]
    InvalidRange { min: i128, max: i128 },
    /// Probability outside [0, 1]
    #[error("Probability must be between 0.0 and 1.0, got {0}")]
    InvalidProbability(f64),
    /// Replayed choice has a different kind than the one requested
    #[error("Type mismatch during replay: expected {expected}, found {found}")]
    TypeMismatch {
        expected: ChoiceType,
        found: ChoiceType,
    },
    /// Replayed choice is not permitted by the requested constraints
    #[error("Replayed choice {0:?} is not permitted here")]
    InvalidChoice(ChoiceValue),
    /// Drew from a strategy that can never produce a value
    #[error("Cannot draw from an empty strategy")]
    EmptyStrategy,
    /// Strategy draws nested deeper than the configured limit
    #[error("Exceeded maximum draw depth of {0}")]
    MaxDepthExceeded(usize),
    /// The strategies involved were assembled incorrectly
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
}

/// The data source a single test run draws from.
pub struct ConjectureData {
    /// Current status of the run
    pub status: Status,

    /// Maximum number of choices this run may make
    pub max_length: usize,

    /// Maximum nesting of strategy draws
    pub max_depth: usize,

    rng: ChaCha8Rng,

    /// Choices still to be replayed, when this data was built from a fixed sequence
    prefix: Option<VecDeque<ChoiceValue>>,

    choices: Vec<ChoiceValue>,

    depth: usize,

    frozen: bool,
}

impl std::fmt::Debug for ConjectureData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConjectureData")
            .field("status", &self.status)
            .field("choices", &self.choices.len())
            .field("depth", &self.depth)
            .field("frozen", &self.frozen)
            .finish()
    }
}

impl ConjectureData {
    /// Create a new ConjectureData instance with the given random seed
    pub fn new(seed: u64) -> Self {
        Self::with_config(DataConfig {
            seed,
            ..DataConfig::default()
        })
    }

    pub fn with_config(config: DataConfig) -> Self {
        Self {
            status: Status::Valid,
            max_length: config.max_length,
            max_depth: config.max_depth,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            prefix: None,
            choices: Vec::new(),
            depth: 0,
            frozen: false,
        }
    }

    /// Create ConjectureData that replays `choices` in order (equivalent to Python's for_choices).
    ///
    /// Once the choices run out the data is marked overrun.
    pub fn for_choices(choices: impl IntoIterator<Item = ChoiceValue>) -> Self {
        let prefix: VecDeque<ChoiceValue> = choices.into_iter().collect();
        let mut data = Self::with_config(DataConfig {
            max_length: prefix.len(),
            ..DataConfig::default()
        });
        data.prefix = Some(prefix);
        data
    }

    /// Choices made so far, in draw order
    pub fn choices(&self) -> &[ChoiceValue] {
        &self.choices
    }

    /// Current nesting of strategy draws
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn can_draw(&self) -> bool {
        !self.frozen && self.status == Status::Valid
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn mark_invalid(&mut self) {
        log::debug!("Marking data invalid after {} choices", self.choices.len());
        self.status = Status::Invalid;
        self.freeze();
    }

    pub fn mark_overrun(&mut self) {
        log::debug!("Marking data overrun after {} choices", self.choices.len());
        self.status = Status::Overrun;
        self.freeze();
    }

    /// Draw a value from `strategy`.
    ///
    /// Empty strategies mark the data invalid instead of being asked to draw,
    /// and so does nesting past `max_depth`, which is what eventually stops a
    /// recursive definition that keeps choosing to recurse.
    pub fn draw<T, S>(&mut self, strategy: &S) -> Result<T, DrawError>
    where
        S: SearchStrategy<T> + ?Sized,
    {
        self.check_can_draw()?;

        if strategy.is_empty() {
            log::debug!("Drawing from empty strategy {:?}", strategy);
            self.mark_invalid();
            return Err(DrawError::EmptyStrategy);
        }

        if self.depth >= self.max_depth {
            log::debug!("Draw depth limit {} reached", self.max_depth);
            self.mark_invalid();
            return Err(DrawError::MaxDepthExceeded(self.max_depth));
        }

        self.depth += 1;
        let result = strategy.do_draw(self);
        self.depth -= 1;
        result
    }

    /// Draw a boolean that is `true` with probability `p`.
    pub fn draw_boolean(&mut self, p: f64) -> Result<bool, DrawError> {
        self.check_can_draw()?;

        if !(0.0..=1.0).contains(&p) {
            return Err(DrawError::InvalidProbability(p));
        }

        let value = match self.next_replayed(ChoiceType::Boolean)? {
            Some(ChoiceValue::Boolean(value)) => {
                if (p == 0.0 && value) || (p == 1.0 && !value) {
                    self.mark_invalid();
                    return Err(DrawError::InvalidChoice(ChoiceValue::Boolean(value)));
                }
                value
            }
            Some(other) => kind_mismatch(other, ChoiceType::Boolean)?,
            None => {
                if p == 0.0 {
                    false
                } else if p == 1.0 {
                    true
                } else {
                    self.rng.gen::<f64>() < p
                }
            }
        };

        self.choices.push(ChoiceValue::Boolean(value));
        Ok(value)
    }

    /// Draw an integer in `[min_value, max_value]`.
    pub fn draw_integer(&mut self, min_value: i128, max_value: i128) -> Result<i128, DrawError> {
        self.check_can_draw()?;

        if min_value > max_value {
            return Err(DrawError::InvalidRange {
                min: min_value,
                max: max_value,
            });
        }

        let value = match self.next_replayed(ChoiceType::Integer)? {
            Some(ChoiceValue::Integer(value)) => {
                if value < min_value || value > max_value {
                    self.mark_invalid();
                    return Err(DrawError::InvalidChoice(ChoiceValue::Integer(value)));
                }
                value
            }
            Some(other) => kind_mismatch(other, ChoiceType::Integer)?,
            None => self.rng.gen_range(min_value..=max_value),
        };

        self.choices.push(ChoiceValue::Integer(value));
        Ok(value)
    }

    fn check_can_draw(&self) -> Result<(), DrawError> {
        if self.can_draw() {
            Ok(())
        } else if self.status == Status::Valid {
            Err(DrawError::Frozen)
        } else {
            Err(DrawError::InvalidStatus(self.status))
        }
    }

    /// Next choice to replay, or `None` when fresh randomness should be used.
    fn next_replayed(&mut self, expected: ChoiceType) -> Result<Option<ChoiceValue>, DrawError> {
        if self.choices.len() >= self.max_length {
            self.mark_overrun();
            return Err(DrawError::Overrun);
        }

        let next = match self.prefix.as_mut() {
            Some(prefix) => prefix.pop_front(),
            None => return Ok(None),
        };

        match next {
            Some(choice) if choice.choice_type() == expected => Ok(Some(choice)),
            Some(choice) => {
                self.mark_invalid();
                Err(DrawError::TypeMismatch {
                    expected,
                    found: choice.choice_type(),
                })
            }
            None => {
                self.mark_overrun();
                Err(DrawError::Overrun)
            }
        }
    }
}

fn kind_mismatch<T>(found: ChoiceValue, expected: ChoiceType) -> Result<T, DrawError> {
    Err(DrawError::TypeMismatch {
        expected,
        found: found.choice_type(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_choices() {
        let mut a = ConjectureData::new(7);
        let mut b = ConjectureData::new(7);
        for _ in 0..20 {
            assert_eq!(a.draw_integer(-50, 50), b.draw_integer(-50, 50));
            assert_eq!(a.draw_boolean(0.5), b.draw_boolean(0.5));
        }
        assert_eq!(a.choices(), b.choices());
    }

    #[test]
    fn test_draw_integer_respects_bounds() {
        let mut data = ConjectureData::new(3);
        for _ in 0..200 {
            let value = data.draw_integer(-3, 3).unwrap();
            assert!((-3..=3).contains(&value));
        }
    }

    #[test]
    fn test_draw_integer_invalid_range() {
        let mut data = ConjectureData::new(0);
        assert_eq!(
            data.draw_integer(5, 1),
            Err(DrawError::InvalidRange { min: 5, max: 1 })
        );
        assert_eq!(data.status, Status::Valid);
    }

    #[test]
    fn test_draw_boolean_deterministic_probabilities() {
        let mut data = ConjectureData::new(11);
        for _ in 0..50 {
            assert_eq!(data.draw_boolean(0.0), Ok(false));
            assert_eq!(data.draw_boolean(1.0), Ok(true));
        }
    }

    #[test]
    fn test_draw_boolean_invalid_probability() {
        let mut data = ConjectureData::new(0);
        assert!(matches!(
            data.draw_boolean(1.5),
            Err(DrawError::InvalidProbability(_))
        ));
        assert!(matches!(
            data.draw_boolean(f64::NAN),
            Err(DrawError::InvalidProbability(_))
        ));
    }

    #[test]
    fn test_replay_reproduces_choices() {
        let mut data = ConjectureData::for_choices(vec![
            ChoiceValue::Integer(4),
            ChoiceValue::Boolean(true),
        ]);
        assert_eq!(data.draw_integer(0, 10), Ok(4));
        assert_eq!(data.draw_boolean(0.5), Ok(true));
        assert_eq!(data.status, Status::Valid);
    }

    #[test]
    fn test_replay_exhaustion_is_overrun() {
        let mut data = ConjectureData::for_choices(vec![ChoiceValue::Boolean(false)]);
        assert_eq!(data.draw_boolean(0.5), Ok(false));
        assert_eq!(data.draw_boolean(0.5), Err(DrawError::Overrun));
        assert_eq!(data.status, Status::Overrun);
        assert!(data.is_frozen());
        assert_eq!(
            data.draw_boolean(0.5),
            Err(DrawError::InvalidStatus(Status::Overrun))
        );
    }

    #[test]
    fn test_replay_type_mismatch() {
        let mut data = ConjectureData::for_choices(vec![ChoiceValue::Boolean(true)]);
        assert_eq!(
            data.draw_integer(0, 1),
            Err(DrawError::TypeMismatch {
                expected: ChoiceType::Integer,
                found: ChoiceType::Boolean,
            })
        );
        assert_eq!(data.status, Status::Invalid);
    }

    #[test]
    fn test_replay_out_of_range_is_invalid_choice() {
        let mut data = ConjectureData::for_choices(vec![ChoiceValue::Integer(12)]);
        assert_eq!(
            data.draw_integer(0, 10),
            Err(DrawError::InvalidChoice(ChoiceValue::Integer(12)))
        );
        assert_eq!(data.status, Status::Invalid);
    }

    #[test]
    fn test_max_length_overruns_fresh_generation() {
        let mut data = ConjectureData::with_config(DataConfig {
            seed: 1,
            max_length: 2,
            max_depth: 10,
        });
        assert!(data.draw_boolean(0.5).is_ok());
        assert!(data.draw_boolean(0.5).is_ok());
        assert_eq!(data.draw_boolean(0.5), Err(DrawError::Overrun));
        assert_eq!(data.status, Status::Overrun);
    }

    #[test]
    fn test_frozen_data_rejects_draws() {
        let mut data = ConjectureData::new(0);
        data.freeze();
        assert_eq!(data.draw_integer(0, 1), Err(DrawError::Frozen));
        assert!(data.choices().is_empty());
    }

    #[test]
    fn test_invalid_argument_converts_into_draw_error() {
        let err: DrawError = InvalidArgument::new("bad").into();
        assert_eq!(err.to_string(), "bad");
    }
}
