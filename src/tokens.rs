use std::str::FromStr;

use bevy_derive::{Deref, DerefMut};
use itertools::Itertools as _;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("expected at least {expected} fields, found {actual}")]
    InsufficientFields { expected: usize, actual: usize },
    #[error("{field} should be a number but is \"{value}\"")]
    NotANumber { field: &'static str, value: String },
}

/// Whitespace separated fields of a single data line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deref, DerefMut)]
pub struct Tokens(pub Vec<String>);

pub fn tokenise(line: &str) -> Tokens {
    Tokens(line.split_whitespace().map(str::to_string).collect())
}

pub fn to_upper(s: &str) -> String {
    s.to_uppercase()
}

impl Tokens {
    pub fn require(&self, expected: usize) -> Result<(), FieldError> {
        if self.len() < expected {
            return Err(FieldError::InsufficientFields {
                expected,
                actual: self.len(),
            });
        }
        Ok(())
    }

    pub fn field(&self, idx: usize) -> Result<&str, FieldError> {
        self.get(idx)
            .map(String::as_str)
            .ok_or(FieldError::InsufficientFields {
                expected: idx + 1,
                actual: self.len(),
            })
    }

    pub fn parse_field<T: FromStr>(&self, idx: usize, field: &'static str) -> Result<T, FieldError> {
        let value = self.field(idx)?;
        value.parse().map_err(|_| FieldError::NotANumber {
            field,
            value: value.to_string(),
        })
    }

    /// Rejoins the fields from `start` onward with single spaces, recovering free text names.
    pub fn detokenise(&self, start: usize) -> String {
        self.iter().skip(start).join(" ")
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions_sorted::assert_eq_sorted;

    use super::{tokenise, to_upper, FieldError, Tokens};

    #[test]
    fn test_tokenise_collapses_whitespace() {
        let tokens = tokenise("  3  47.4325\t-122.3\t\t 354 11680  130 19.0 SEA  SEATTLE VORTAC ");

        assert_eq_sorted!(
            tokens,
            Tokens(
                [
                    "3", "47.4325", "-122.3", "354", "11680", "130", "19.0", "SEA", "SEATTLE",
                    "VORTAC"
                ]
                .map(str::to_string)
                .to_vec()
            )
        );
        assert!(tokenise(" \t ").is_empty());
    }

    #[test]
    fn test_detokenise() {
        let tokens = tokenise("2 48.6 -1.6 0 0 0 0 LFG   DECCA MASTER  7B");

        assert_eq!(tokens.detokenise(8), "DECCA MASTER 7B");
        assert_eq!(tokens.detokenise(10), "7B");
        assert_eq!(tokens.detokenise(11), "");
    }

    #[test]
    fn test_to_upper() {
        assert_eq!(to_upper("Decca"), "DECCA");
        assert_eq!(to_upper("purple"), "PURPLE");
    }

    #[test]
    fn test_field_access() {
        let tokens = tokenise("100 45.0 abc");

        assert_eq!(tokens.field(0), Ok("100"));
        assert_eq!(tokens.parse_field::<i32>(0, "row code"), Ok(100));
        assert_eq!(tokens.parse_field::<f64>(1, "latitude"), Ok(45.0));
        assert_eq!(
            tokens.parse_field::<f64>(2, "longitude"),
            Err(FieldError::NotANumber {
                field: "longitude",
                value: "abc".to_string()
            })
        );
        assert_eq!(
            tokens.field(5),
            Err(FieldError::InsufficientFields {
                expected: 6,
                actual: 3
            })
        );
        assert_eq!(
            tokens.require(9),
            Err(FieldError::InsufficientFields {
                expected: 9,
                actual: 3
            })
        );
    }
}
