//! Textual diffs between the canonical forms of two objects.

use std::io::Write;

use k8s_openapi::{api::apps::v1::Deployment, Resource};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::serialize::{to_manifest_yaml, SerializeError};

/// Errors that can occur while diffing objects.
#[derive(Debug, Error)]
pub enum DiffError {
	#[error("serializing object for diff")]
	Serialize(#[from] SerializeError),

	#[error("writing diff output")]
	Write(#[from] std::io::Error),
}

/// File name shown in diff headers, `<kind>.<name>`.
pub fn display_name<K: Resource>(metadata_name: Option<&str>) -> String {
	format!("{}.{}", K::KIND, metadata_name.unwrap_or_default())
}

/// Write a unified diff between the normalized YAML of `old` and `new`.
///
/// Both objects are serialized before anything is written. Returns whether
/// they differ.
#[instrument(skip(writer, old, new))]
pub fn diff_manifests<W: Write + ?Sized, T: Serialize>(
	writer: &mut W,
	label: &str,
	old: &T,
	new: &T,
	colored: bool,
) -> Result<bool, DiffError> {
	let old = to_manifest_yaml(old)?;
	let new = to_manifest_yaml(new)?;
	Ok(konfigurator_diff::write_unified_diff(
		writer, label, label, &old, &new, colored,
	)?)
}

pub fn diff_deployments<W: Write + ?Sized>(
	writer: &mut W,
	old: &Deployment,
	new: &Deployment,
	colored: bool,
) -> Result<bool, DiffError> {
	let label = display_name::<Deployment>(new.metadata.name.as_deref());
	diff_manifests(writer, &label, old, new, colored)
}
