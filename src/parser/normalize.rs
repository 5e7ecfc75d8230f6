//! Token list normalization
//!
//! A state may be given as ten loose tokens (number, type, entries 2..9)
//! instead of a 28-character string, e.g. `[0, "A", 870, "500", ...]`.
//! Numeric tokens are zero padded to three digits, the non-numeric token
//! is the type character.

use super::field::{FIELD_WIDTH, RECORD_LEN};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of tokens in a state token list
pub const TOKEN_COUNT: usize = 10;

/// One entry of a state token list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Token {
    Number(i64),
    Text(String),
}

impl From<i64> for Token {
    fn from(value: i64) -> Self {
        Token::Number(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::Text(value.to_string())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Token::Text(value)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Text(s) => f.write_str(s),
        }
    }
}

impl Token {
    /// Split a text line of comma or whitespace separated entries into tokens
    pub fn split_line(line: &str) -> Vec<Token> {
        line.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(Token::from)
            .collect()
    }

    fn normalize_at(&self, position: usize) -> Result<String> {
        let invalid = || Error::InvalidToken {
            position,
            token: self.to_string(),
        };

        let digits = match self {
            Token::Number(n) if *n >= 0 => n.to_string(),
            Token::Number(_) => return Err(invalid()),
            Token::Text(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s.clone(),
            Token::Text(s) => {
                // Not a number: must be a single type character
                return if s.chars().count() == 1 {
                    Ok(s.clone())
                } else {
                    Err(invalid())
                };
            }
        };

        if digits.len() > FIELD_WIDTH {
            return Err(invalid());
        }
        Ok(format!("{:0>width$}", digits, width = FIELD_WIDTH))
    }
}

/// Build the canonical 28-character record from a token list
pub fn normalize(tokens: &[Token]) -> Result<String> {
    if tokens.len() != TOKEN_COUNT {
        return Err(Error::TokenCount {
            expected: TOKEN_COUNT,
            actual: tokens.len(),
        });
    }

    let record = tokens
        .iter()
        .enumerate()
        .map(|(position, token)| token.normalize_at(position))
        .collect::<Result<String>>()?;

    if record.chars().count() != RECORD_LEN {
        return Err(Error::InvalidToken {
            position: 1,
            token: record,
        });
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::decode;
    use proptest::prelude::*;

    fn tokens(values: &[&str]) -> Vec<Token> {
        values.iter().map(|v| Token::from(*v)).collect()
    }

    #[test]
    fn test_padded_tokens() {
        let record = normalize(&tokens(&[
            "000", "A", "870", "500", "128", "002", "002", "002", "001", "127",
        ]))
        .unwrap();
        assert_eq!(record, "000A870500128002002002001127");
    }

    #[test]
    fn test_unpadded_tokens() {
        let record = normalize(&tokens(&[
            "0", "A", "870", "500", "128", "2", "2", "2", "21", "127",
        ]))
        .unwrap();
        assert_eq!(record, "000A870500128002002002021127");
    }

    #[test]
    fn test_numeric_tokens() {
        let list: Vec<Token> = vec![
            2.into(),
            "J".into(),
            132.into(),
            0.into(),
            132.into(),
            136.into(),
            132.into(),
            0.into(),
            120.into(),
            264.into(),
        ];
        assert_eq!(normalize(&list).unwrap(), "002J132000132136132000120264");
    }

    #[test]
    fn test_rejects_bad_tokens() {
        let too_long = tokens(&["0", "A", "870", "500", "128", "2", "2", "0", "21", "9999"]);
        assert!(matches!(
            normalize(&too_long),
            Err(Error::InvalidToken { position: 9, .. })
        ));

        let empty = tokens(&["0", "A", "870", "500", "128", "2", "", "0", "21", "000"]);
        assert!(matches!(
            normalize(&empty),
            Err(Error::InvalidToken { position: 6, .. })
        ));

        let wide_type = tokens(&["0", "AX", "870", "500", "128", "2", "2", "0", "21", "000"]);
        assert!(matches!(
            normalize(&wide_type),
            Err(Error::InvalidToken { position: 1, .. })
        ));

        let mut negative = tokens(&["0", "A", "870", "500", "128", "2", "2", "0", "21", "000"]);
        negative[2] = Token::Number(-1);
        assert!(normalize(&negative).is_err());
    }

    #[test]
    fn test_rejects_wrong_count() {
        let short = tokens(&["0", "A", "870"]);
        assert!(matches!(
            normalize(&short),
            Err(Error::TokenCount {
                expected: 10,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_split_line() {
        let parts = Token::split_line("0, A, 870 500,128");
        assert_eq!(parts, tokens(&["0", "A", "870", "500", "128"]));
    }

    #[test]
    fn test_tokens_from_json() {
        let list: Vec<Token> = serde_json::from_str(r#"[2, "J", "132", 0]"#).unwrap();
        assert_eq!(
            list,
            vec![
                Token::Number(2),
                Token::from("J"),
                Token::from("132"),
                Token::Number(0)
            ]
        );
    }

    proptest! {
        #[test]
        fn normalized_tokens_decode_like_padded_record(
            number in 0i64..1000,
            entries in proptest::collection::vec(0i64..1000, 8),
            as_text in any::<bool>(),
        ) {
            let mut list: Vec<Token> = vec![Token::Number(number), Token::from("K")];
            for entry in &entries {
                list.push(if as_text { Token::Text(entry.to_string()) } else { Token::Number(*entry) });
            }

            let padded: String = std::iter::once(format!("{:03}", number))
                .chain(std::iter::once("K".to_string()))
                .chain(entries.iter().map(|entry| format!("{:03}", entry)))
                .collect();

            let normalized = normalize(&list).unwrap();
            prop_assert_eq!(&normalized, &padded);
            prop_assert_eq!(decode(&normalized).unwrap(), decode(&padded).unwrap());
        }
    }
}
