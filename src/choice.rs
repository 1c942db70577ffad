//! Choice values recorded by `ConjectureData`
//!
//! Every primitive draw produces exactly one choice. Recording them lets a
//! run be replayed later through `ConjectureData::for_choices`.

/// Choice types that can be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChoiceType {
    Integer,
    Boolean,
}

impl std::fmt::Display for ChoiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChoiceType::Integer => write!(f, "integer"),
            ChoiceType::Boolean => write!(f, "boolean"),
        }
    }
}

/// Choice value that can be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChoiceValue {
    Integer(i128),
    Boolean(bool),
}

impl ChoiceValue {
    pub fn choice_type(&self) -> ChoiceType {
        match self {
            ChoiceValue::Integer(_) => ChoiceType::Integer,
            ChoiceValue::Boolean(_) => ChoiceType::Boolean,
        }
    }
}

impl From<bool> for ChoiceValue {
    fn from(value: bool) -> Self {
        ChoiceValue::Boolean(value)
    }
}

impl From<i128> for ChoiceValue {
    fn from(value: i128) -> Self {
        ChoiceValue::Integer(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_type_of_value() {
        assert_eq!(ChoiceValue::Integer(-4).choice_type(), ChoiceType::Integer);
        assert_eq!(ChoiceValue::from(true).choice_type(), ChoiceType::Boolean);
    }

    #[test]
    fn test_choice_type_display() {
        assert_eq!(ChoiceType::Integer.to_string(), "integer");
        assert_eq!(ChoiceType::Boolean.to_string(), "boolean");
    }
}
