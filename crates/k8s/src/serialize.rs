//! Canonical YAML serialization of Kubernetes objects.
//!
//! Objects go through a JSON intermediate whose keys are sorted the way
//! go-yaml sorts them, are converted to YAML, and then have the zero-value
//! fields that typed encoders emit for objects that never touched a cluster
//! stripped away. The result is stable: serializing, parsing and serializing
//! again produces the same bytes.

use std::{cmp::Ordering, sync::OnceLock};

use regex::Regex;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::instrument;

/// Errors that can occur while serializing a manifest.
#[derive(Debug, Error)]
pub enum SerializeError {
	#[error("encoding object to JSON")]
	Json(#[source] serde_json::Error),

	#[error("converting object to YAML")]
	Yaml(#[source] serde_yaml::Error),
}

/// `creationTimestamp: null` lines, left behind by objects that were never applied.
static TIMESTAMP_LINE: OnceLock<Regex> = OnceLock::new();

/// Empty `status`, `selector` and `strategy` blocks.
static EMPTY_BLOCK_LINE: OnceLock<Regex> = OnceLock::new();

fn timestamp_line() -> &'static Regex {
	TIMESTAMP_LINE.get_or_init(|| {
		Regex::new(r"(?m)\n[ \t]*creationTimestamp: null[ \t]*$")
			.expect("creationTimestamp pattern is a valid regex")
	})
}

fn empty_block_line() -> &'static Regex {
	EMPTY_BLOCK_LINE.get_or_init(|| {
		Regex::new(r"(?m)\n[ \t]*(?:status|selector|strategy): \{\}[ \t]*$")
			.expect("empty block pattern is a valid regex")
	})
}

/// Serialize `object` into its canonical manifest form.
#[instrument(skip_all)]
pub fn to_manifest_yaml<T: Serialize>(object: &T) -> Result<String, SerializeError> {
	let value = serde_json::to_value(object).map_err(SerializeError::Json)?;
	let yaml = serde_yaml::to_string(&sort_json_keys(value)).map_err(SerializeError::Yaml)?;
	Ok(normalize(&yaml))
}

/// Strip the zero-value lines from already serialized YAML.
pub fn normalize(yaml: &str) -> String {
	let yaml = timestamp_line().replace_all(yaml, "");
	empty_block_line().replace_all(&yaml, "").into_owned()
}

/// Sort all object keys recursively, in go-yaml's order.
pub fn sort_json_keys(value: JsonValue) -> JsonValue {
	match value {
		JsonValue::Object(map) => {
			let mut entries: Vec<(String, JsonValue)> = map.into_iter().collect();
			entries.sort_by(|(a, _), (b, _)| go_yaml_key_compare(a, b));
			JsonValue::Object(
				entries
					.into_iter()
					.map(|(k, v)| (k, sort_json_keys(v)))
					.collect(),
			)
		}
		JsonValue::Array(items) => JsonValue::Array(items.into_iter().map(sort_json_keys).collect()),
		other => other,
	}
}

/// go-yaml's "natural" key order (sorter.go).
///
/// Runs of digits compare numerically. After a digit, letters sort before
/// other characters; elsewhere other characters sort before letters.
fn go_yaml_key_compare(a: &str, b: &str) -> Ordering {
	let ar: Vec<char> = a.chars().collect();
	let br: Vec<char> = b.chars().collect();
	let mut after_digit = false;

	for i in 0..ar.len().min(br.len()) {
		if ar[i] == br[i] {
			after_digit = ar[i].is_ascii_digit();
			continue;
		}

		let a_letter = ar[i].is_alphabetic();
		let b_letter = br[i].is_alphabetic();
		if a_letter && b_letter {
			return ar[i].cmp(&br[i]);
		}
		if a_letter || b_letter {
			let letter_first = if a_letter {
				Ordering::Less
			} else {
				Ordering::Greater
			};
			return if after_digit {
				letter_first
			} else {
				letter_first.reverse()
			};
		}

		let mut an: i64 = 0;
		let mut bn: i64 = 0;
		if ar[i] == '0' || br[i] == '0' {
			// a zero inside a number is a digit like any other
			let mut j = i;
			while j > 0 && ar[j - 1].is_ascii_digit() {
				j -= 1;
				if ar[j] != '0' {
					an = 1;
					bn = 1;
					break;
				}
			}
		}

		let (an, a_end) = read_number(&ar, i, an);
		let (bn, b_end) = read_number(&br, i, bn);
		if an != bn {
			return an.cmp(&bn);
		}
		if a_end != b_end {
			return a_end.cmp(&b_end);
		}
		return ar[i].cmp(&br[i]);
	}

	ar.len().cmp(&br.len())
}

fn read_number(chars: &[char], start: usize, mut acc: i64) -> (i64, usize) {
	let mut end = start;
	while let Some(digit) = chars.get(end).and_then(|c| c.to_digit(10)) {
		acc = acc.saturating_mul(10).saturating_add(i64::from(digit));
		end += 1;
	}
	(acc, end)
}
