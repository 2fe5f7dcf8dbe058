//! Single conditions and boolean condition trees over decoded records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};
use crate::types::{PropertyType, Record, Value};

/// Comparison operator of a [`Condition`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Comparator {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Text contains the operand substring.
    Contains,
    /// Text starts with the operand.
    StartsWith,
    /// Text ends with the operand.
    EndsWith,
}

impl Comparator {
    fn is_ordering(self) -> bool {
        matches!(self, Self::Lt | Self::Le | Self::Gt | Self::Ge)
    }

    fn is_text_pattern(self) -> bool {
        matches!(self, Self::Contains | Self::StartsWith | Self::EndsWith)
    }
}

/// One property-comparator-operand predicate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Conditioned property name.
    pub property: String,
    /// Comparison operator.
    pub comparator: Comparator,
    /// Right-hand operand.
    pub operand: Value,
    /// Case-insensitive text comparison.
    pub ignore_case: bool,
}

impl Condition {
    /// Creates a case-sensitive condition.
    pub fn new(property: impl Into<String>, comparator: Comparator, operand: impl Into<Value>) -> Self {
        Self {
            property: property.into(),
            comparator,
            operand: operand.into(),
            ignore_case: false,
        }
    }

    /// Switches text comparison to case-insensitive.
    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    /// Checks the condition against the schema's declared type for its
    /// property. Fails fast on operand/type disagreement and on
    /// comparator/type pairs that can never be satisfied.
    pub fn validate(&self, declared: PropertyType) -> Result<()> {
        let mismatch = || DbError::TypeMismatch {
            property: self.property.clone(),
            declared,
            operand: self.operand.clone(),
        };
        let unsupported = || DbError::UnsupportedComparator {
            comparator: self.comparator,
            property_type: declared,
        };
        let operand_ok = match declared {
            PropertyType::Undefined => return Err(mismatch()),
            PropertyType::Text => matches!(self.operand, Value::Text(_)),
            PropertyType::Blob => matches!(self.operand, Value::Blob(_)),
            _ => self.operand.as_f64().is_some(),
        };
        if !operand_ok {
            return Err(mismatch());
        }
        if self.comparator.is_ordering() && declared == PropertyType::Blob {
            return Err(unsupported());
        }
        if self.comparator.is_text_pattern() && declared != PropertyType::Text {
            return Err(unsupported());
        }
        Ok(())
    }

    /// Evaluates the condition against one property value. A record missing
    /// the property evaluates false. Infallible once [`validate`] passed.
    ///
    /// [`validate`]: Condition::validate
    pub fn matches(&self, value: Option<&Value>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self.comparator {
            Comparator::Eq => self.compare_eq(value),
            Comparator::Ne => !self.compare_eq(value),
            Comparator::Lt => self.compare_ord(value, |o| o.is_lt()),
            Comparator::Le => self.compare_ord(value, |o| o.is_le()),
            Comparator::Gt => self.compare_ord(value, |o| o.is_gt()),
            Comparator::Ge => self.compare_ord(value, |o| o.is_ge()),
            Comparator::Contains => self.text_pattern(value, |hay, pat| hay.contains(pat)),
            Comparator::StartsWith => self.text_pattern(value, |hay, pat| hay.starts_with(pat)),
            Comparator::EndsWith => self.text_pattern(value, |hay, pat| hay.ends_with(pat)),
        }
    }

    fn compare_eq(&self, value: &Value) -> bool {
        if self.ignore_case {
            if let (Value::Text(a), Value::Text(b)) = (value, &self.operand) {
                return a.eq_ignore_ascii_case(b);
            }
        }
        value
            .partial_cmp_value(&self.operand)
            .is_some_and(|o| o.is_eq())
    }

    fn compare_ord(&self, value: &Value, keep: impl Fn(std::cmp::Ordering) -> bool) -> bool {
        if self.ignore_case {
            if let (Value::Text(a), Value::Text(b)) = (value, &self.operand) {
                return keep(a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase()));
            }
        }
        value.partial_cmp_value(&self.operand).is_some_and(keep)
    }

    fn text_pattern(&self, value: &Value, keep: impl Fn(&str, &str) -> bool) -> bool {
        let (Value::Text(hay), Value::Text(pat)) = (value, &self.operand) else {
            return false;
        };
        if self.ignore_case {
            keep(&hay.to_ascii_lowercase(), &pat.to_ascii_lowercase())
        } else {
            keep(hay, pat)
        }
    }
}

/// Boolean expression tree over [`Condition`] leaves, evaluated with
/// standard short-circuit semantics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MultiCondition {
    /// Single condition leaf.
    Leaf(Condition),
    /// Both branches must hold; the right branch is skipped once the left
    /// is false.
    And(Box<MultiCondition>, Box<MultiCondition>),
    /// Either branch holds; the right branch is skipped once the left is
    /// true.
    Or(Box<MultiCondition>, Box<MultiCondition>),
    /// Negation.
    Not(Box<MultiCondition>),
}

impl MultiCondition {
    /// Conjunction combinator.
    pub fn and(self, other: MultiCondition) -> Self {
        MultiCondition::And(Box::new(self), Box::new(other))
    }

    /// Disjunction combinator.
    pub fn or(self, other: MultiCondition) -> Self {
        MultiCondition::Or(Box::new(self), Box::new(other))
    }

    /// Negation combinator.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        MultiCondition::Not(Box::new(self))
    }

    /// Validates every leaf against the supplied name-to-type map before
    /// any record is scanned. Unknown names and impossible comparator/type
    /// pairs fail here, never mid-scan.
    pub fn validate(&self, types: &HashMap<String, PropertyType>) -> Result<()> {
        match self {
            MultiCondition::Leaf(condition) => {
                let declared = types
                    .get(&condition.property)
                    .copied()
                    .ok_or_else(|| DbError::InvalidConditionReference(condition.property.clone()))?;
                condition.validate(declared)
            }
            MultiCondition::And(left, right) | MultiCondition::Or(left, right) => {
                left.validate(types)?;
                right.validate(types)
            }
            MultiCondition::Not(inner) => inner.validate(types),
        }
    }

    /// Evaluates the tree against one decoded record. Short-circuits; the
    /// match set never depends on evaluation order, only the work performed.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            MultiCondition::Leaf(condition) => condition.matches(record.get(&condition.property)),
            MultiCondition::And(left, right) => left.matches(record) && right.matches(record),
            MultiCondition::Or(left, right) => left.matches(record) || right.matches(record),
            MultiCondition::Not(inner) => !inner.matches(record),
        }
    }
}

impl From<Condition> for MultiCondition {
    fn from(condition: Condition) -> Self {
        MultiCondition::Leaf(condition)
    }
}
