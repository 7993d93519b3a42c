//! Text normalization and similarity helpers
//!
//! Used by the comparator to honour the sensitivity options and to score
//! rename candidates.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::AttributeValue;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// How string values are folded before comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sensitivity {
    pub ignore_case: bool,
    pub ignore_whitespace: bool,
}

impl Sensitivity {
    /// Fold a string according to the sensitivity flags
    pub fn normalize(&self, text: &str) -> String {
        let text = if self.ignore_whitespace {
            WHITESPACE.replace_all(text, "").into_owned()
        } else {
            text.to_string()
        };

        if self.ignore_case {
            text.to_lowercase()
        } else {
            text
        }
    }

    /// Compare two strings under the sensitivity flags
    pub fn text_eq(&self, left: &str, right: &str) -> bool {
        if !self.ignore_case && !self.ignore_whitespace {
            return left == right;
        }
        self.normalize(left) == self.normalize(right)
    }

    /// Compare two attribute values; folding applies to strings only
    pub fn value_eq(&self, left: &AttributeValue, right: &AttributeValue) -> bool {
        match (left, right) {
            (AttributeValue::Text(l), AttributeValue::Text(r)) => self.text_eq(l, r),
            (AttributeValue::Integer(l), AttributeValue::Float(r))
            | (AttributeValue::Float(r), AttributeValue::Integer(l)) => (*l as f64) == *r,
            (AttributeValue::List(l), AttributeValue::List(r)) => {
                l.len() == r.len() && l.iter().zip(r).all(|(a, b)| self.value_eq(a, b))
            }
            (AttributeValue::Map(l), AttributeValue::Map(r)) => {
                l.len() == r.len()
                    && l.iter().all(|(key, a)| r.get(key).is_some_and(|b| self.value_eq(a, b)))
            }
            _ => left == right,
        }
    }

    /// Compare two optional values, treating a missing value as null
    pub fn option_eq(&self, left: Option<&AttributeValue>, right: Option<&AttributeValue>) -> bool {
        match (non_null(left), non_null(right)) {
            (None, None) => true,
            (Some(l), Some(r)) => self.value_eq(l, r),
            _ => false,
        }
    }
}

/// Drop explicit nulls so that a null attribute and a missing one compare alike
pub fn non_null(value: Option<&AttributeValue>) -> Option<&AttributeValue> {
    value.filter(|v| !v.is_null())
}

/// Canonical form of an attribute key: lowercase without `_`, `-` or spaces
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalized Levenshtein similarity in `[0.0, 1.0]`
pub fn similarity(left: &str, right: &str) -> f64 {
    let left: Vec<char> = left.chars().collect();
    let right: Vec<char> = right.chars().collect();
    let longest = left.len().max(right.len());

    if longest == 0 {
        return 1.0;
    }

    1.0 - levenshtein(&left, &right) as f64 / longest as f64
}

fn levenshtein(left: &[char], right: &[char]) -> usize {
    let mut previous: Vec<usize> = (0..=right.len()).collect();
    let mut current = vec![0; right.len() + 1];

    for (i, l) in left.iter().enumerate() {
        current[0] = i + 1;
        for (j, r) in right.iter().enumerate() {
            let substitution = previous[j] + usize::from(l != r);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[right.len()]
}
