//! Locating typed objects inside multi-document manifest files.

use std::{
	fs,
	path::{Path, PathBuf},
};

use k8s_openapi::{
	api::{
		apps::v1::Deployment,
		core::v1::{ConfigMap, Secret},
	},
	Resource,
};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::document::{self, Leftovers};

/// Errors that can occur while reading a manifest.
#[derive(Debug, Error)]
pub enum LocateError {
	#[error("reading manifest {}", .path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("could not locate a {kind} object{}", describe_path(.path.as_deref()))]
	NotFound {
		kind: &'static str,
		path: Option<PathBuf>,
	},
}

fn describe_path(path: Option<&Path>) -> String {
	path.map(|p| format!(" in {}", p.display()))
		.unwrap_or_default()
}

/// Just enough of an object to tell what kind it is.
#[derive(Debug, Deserialize)]
struct TypeHeader {
	#[serde(default)]
	kind: Option<String>,
}

/// Find the first document of kind `K` among `documents`.
///
/// Documents that fail to parse, or that are of another kind, are skipped.
/// Only the first object of a kind is found; later ones stay in the leftovers.
#[instrument(skip_all, fields(kind = K::KIND, documents = documents.len()))]
pub fn locate<K>(documents: &[&[u8]]) -> Result<(K, Leftovers), LocateError>
where
	K: Resource + DeserializeOwned,
{
	for (index, document) in documents.iter().enumerate() {
		let header: TypeHeader = match serde_yaml::from_slice(document) {
			Ok(header) => header,
			Err(error) => {
				warn!(index, %error, "error parsing YAML document");
				continue;
			}
		};

		if header.kind.as_deref() != Some(K::KIND) {
			continue;
		}

		match serde_yaml::from_slice::<K>(document) {
			Ok(object) => {
				debug!(index, "found object");
				return Ok((object, Leftovers::without(documents, index)));
			}
			Err(error) => {
				warn!(index, %error, "error parsing YAML document");
			}
		}
	}

	Err(LocateError::NotFound {
		kind: K::KIND,
		path: None,
	})
}

/// Read the file at `path` and locate the first object of kind `K` in it.
#[instrument(skip_all, fields(kind = K::KIND, path = %path.display()))]
pub fn read_manifest<K>(path: &Path) -> Result<(K, Leftovers), LocateError>
where
	K: Resource + DeserializeOwned,
{
	let contents = fs::read(path).map_err(|source| LocateError::Read {
		path: path.to_path_buf(),
		source,
	})?;

	locate(&document::split(&contents)).map_err(|err| match err {
		LocateError::NotFound { kind, .. } => LocateError::NotFound {
			kind,
			path: Some(path.to_path_buf()),
		},
		other => other,
	})
}

pub fn read_secret(path: &Path) -> Result<(Secret, Leftovers), LocateError> {
	read_manifest(path)
}

pub fn read_config_map(path: &Path) -> Result<(ConfigMap, Leftovers), LocateError> {
	read_manifest(path)
}

pub fn read_deployment(path: &Path) -> Result<(Deployment, Leftovers), LocateError> {
	read_manifest(path)
}
