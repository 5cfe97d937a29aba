//! `key=value,key=value` property strings.
//!
//! The parser only splits; what a key means is up to the [`PropertyHandler`]
//! filling a command record. Keys are lowercased before they reach the
//! handler, so records match on lowercase names only. Values cannot contain
//! `,` or `=` (there is no escaping).

use thiserror::Error;

/// Why a property string (or a positional argument) was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
	#[error("option '{key}' requires a value")]
	EmptyValue { key: String },

	#[error("unrecognized option '{key}'")]
	Unrecognized { key: String },

	#[error("option '{key}' given more than once")]
	Duplicate { key: String },

	#[error("missing mandatory option '{key}'")]
	Missing { key: &'static str },

	#[error("invalid {key} '{value}': expected {expected}")]
	InvalidValue {
		key: String,
		value: String,
		expected: &'static str,
	},

	#[error("malformed input: {0}")]
	Malformed(String),
}

impl PropertyError {
	pub fn invalid(key: &str, value: &str, expected: &'static str) -> Self {
		PropertyError::InvalidValue {
			key: key.to_string(),
			value: value.to_string(),
			expected,
		}
	}
}

/// Receives each `(key, value)` pair of a property string.
pub trait PropertyHandler {
	fn set_property(&mut self, key: &str, value: &str) -> Result<(), PropertyError>;
}

impl<F> PropertyHandler for F
where
	F: FnMut(&str, &str) -> Result<(), PropertyError>,
{
	fn set_property(&mut self, key: &str, value: &str) -> Result<(), PropertyError> {
		self(key, value)
	}
}

/// Splits `input` on `,` then on the first `=`, feeding each pair to `handler`.
///
/// Stops at the first failing pair. Whitespace around keys and values is
/// trimmed and empty segments are skipped.
pub fn parse_key_value_string<H>(input: &str, handler: &mut H) -> Result<(), PropertyError>
where
	H: PropertyHandler + ?Sized,
{
	for segment in input.split(',') {
		let segment = segment.trim();
		if segment.is_empty() {
			continue;
		}

		let Some((key, value)) = segment.split_once('=') else {
			return Err(PropertyError::Malformed(format!(
				"'{segment}' is not a key=value pair"
			)));
		};

		let key = key.trim();
		let value = value.trim();
		if key.is_empty() {
			return Err(PropertyError::Malformed(format!("'{segment}' has no key")));
		}
		if value.is_empty() {
			return Err(PropertyError::EmptyValue {
				key: key.to_string(),
			});
		}

		handler.set_property(&key.to_ascii_lowercase(), value)?;
	}
	Ok(())
}

/// Stores `value` into an unset slot, rejecting a second assignment.
pub fn set_once<T>(slot: &mut Option<T>, key: &str, value: T) -> Result<(), PropertyError> {
	if slot.is_some() {
		return Err(PropertyError::Duplicate {
			key: key.to_string(),
		});
	}
	*slot = Some(value);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn collect(input: &str) -> Result<Vec<(String, String)>, PropertyError> {
		let mut pairs = Vec::new();
		parse_key_value_string(input, &mut |key: &str, value: &str| -> Result<(), PropertyError> {
			pairs.push((key.to_string(), value.to_string()));
			Ok(())
		})?;
		Ok(pairs)
	}

	#[test]
	fn splits_pairs_in_order() {
		let pairs = collect("apn=internet,auth=PAP").unwrap();
		assert_eq!(
			pairs,
			vec![
				("apn".to_string(), "internet".to_string()),
				("auth".to_string(), "PAP".to_string())
			]
		);
	}

	#[test]
	fn lowercases_keys_but_not_values() {
		let pairs = collect("APN=Internet").unwrap();
		assert_eq!(pairs, vec![("apn".to_string(), "Internet".to_string())]);
	}

	#[test]
	fn value_keeps_everything_after_first_equals() {
		let pairs = collect("password=a=b").unwrap();
		assert_eq!(pairs[0].1, "a=b");
	}

	#[test]
	fn trims_whitespace_and_skips_empty_segments() {
		let pairs = collect(" apn = internet ,, ip-type=4,").unwrap();
		assert_eq!(pairs.len(), 2);
		assert_eq!(pairs[0], ("apn".to_string(), "internet".to_string()));
		assert_eq!(pairs[1], ("ip-type".to_string(), "4".to_string()));
	}

	#[test]
	fn empty_input_calls_nothing() {
		assert!(collect("").unwrap().is_empty());
	}

	#[test]
	fn empty_value_fails() {
		assert_eq!(
			collect("apn=").unwrap_err(),
			PropertyError::EmptyValue { key: "apn".into() }
		);
	}

	#[test]
	fn segment_without_equals_is_malformed() {
		assert!(matches!(collect("apn=x,oops"), Err(PropertyError::Malformed(_))));
		assert!(matches!(collect("=x"), Err(PropertyError::Malformed(_))));
	}

	#[test]
	fn handler_failure_stops_parse() {
		let mut seen = 0;
		let result = parse_key_value_string("a=1,b=2,c=3", &mut |key: &str, _: &str| -> Result<(), PropertyError> {
			seen += 1;
			if key == "b" {
				Err(PropertyError::Unrecognized { key: key.into() })
			} else {
				Ok(())
			}
		});
		assert!(result.is_err());
		assert_eq!(seen, 2);
	}

	#[test]
	fn set_once_rejects_second_value() {
		let mut slot = None;
		set_once(&mut slot, "apn", 1).unwrap();
		assert_eq!(
			set_once(&mut slot, "apn", 2),
			Err(PropertyError::Duplicate { key: "apn".into() })
		);
		assert_eq!(slot, Some(1));
	}
}
