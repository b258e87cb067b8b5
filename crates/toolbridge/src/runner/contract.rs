//! Single-JSON-object stdout contract.

use std::fmt;

use serde_json::{Map, Value};

/// Why a stdout byte stream failed the JSON-mode contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractError {
    /// The stream does not begin with a decodable JSON value.
    NotJson,
    /// The first value is valid JSON but not an object.
    NotAnObject,
    /// A second valid JSON value follows the first.
    MultipleValues,
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractError::NotJson => write!(f, "stdout is not valid JSON"),
            ContractError::NotAnObject => write!(f, "stdout JSON value is not an object"),
            ContractError::MultipleValues => write!(f, "stdout contains multiple JSON values"),
        }
    }
}

/// Decode `stdout` as exactly one JSON object.
///
/// The stream must begin with a single JSON value, that value must be an
/// object, and no further valid JSON value may follow it. Trailing bytes
/// that cannot start another JSON value end the stream without violating
/// the contract. Numbers keep their original textual form, so
/// re-serializing the returned object loses no precision.
pub fn parse_single_object(stdout: &str) -> Result<Map<String, Value>, ContractError> {
    let mut stream = serde_json::Deserializer::from_str(stdout).into_iter::<Value>();
    let first = match stream.next() {
        Some(Ok(value)) => value,
        _ => return Err(ContractError::NotJson),
    };
    let object = match first {
        Value::Object(object) => object,
        _ => return Err(ContractError::NotAnObject),
    };
    match stream.next() {
        Some(Ok(_)) => Err(ContractError::MultipleValues),
        _ => Ok(object),
    }
}
