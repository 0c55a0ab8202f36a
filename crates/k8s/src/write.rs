//! Writing objects back into manifest files.

use std::{
	fs::File,
	io::Write,
	path::{Path, PathBuf},
};

use k8s_openapi::api::{
	apps::v1::Deployment,
	core::v1::{ConfigMap, Secret},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::{
	document::Leftovers,
	serialize::{to_manifest_yaml, SerializeError},
};

/// Errors that can occur while writing a manifest.
#[derive(Debug, Error)]
pub enum WriteError {
	#[error("serializing manifest for {}", .path.display())]
	Serialize {
		path: PathBuf,
		#[source]
		source: SerializeError,
	},

	#[error("writing manifest {}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Write `object` together with its `leftovers` to `path`, replacing the file.
///
/// The object is serialized before the file is opened, so a serialization
/// failure leaves the existing file untouched. The write itself is a plain
/// overwrite, not an atomic rename.
#[instrument(skip_all, fields(path = %path.display(), leftovers = leftovers.len()))]
pub fn write_manifest<T: Serialize>(
	path: &Path,
	object: &T,
	leftovers: &Leftovers,
) -> Result<(), WriteError> {
	let serialized = to_manifest_yaml(object).map_err(|source| WriteError::Serialize {
		path: path.to_path_buf(),
		source,
	})?;
	let contents = leftovers.assemble(serialized.as_bytes());

	let io_error = |source| WriteError::Io {
		path: path.to_path_buf(),
		source,
	};
	let mut file = File::create(path).map_err(io_error)?;
	file.write_all(&contents).map_err(io_error)?;
	file.flush().map_err(io_error)?;

	info!(bytes = contents.len(), "wrote manifest");
	Ok(())
}

pub fn write_secret(path: &Path, secret: &Secret, leftovers: &Leftovers) -> Result<(), WriteError> {
	write_manifest(path, secret, leftovers)
}

pub fn write_config_map(
	path: &Path,
	config_map: &ConfigMap,
	leftovers: &Leftovers,
) -> Result<(), WriteError> {
	write_manifest(path, config_map, leftovers)
}

pub fn write_deployment(
	path: &Path,
	deployment: &Deployment,
	leftovers: &Leftovers,
) -> Result<(), WriteError> {
	write_manifest(path, deployment, leftovers)
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;
	use indoc::indoc;
	use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

	use super::*;
	use crate::locate::read_config_map;

	const STREAM: &str = indoc! {"
		apiVersion: v1
		kind: Service
		metadata:
		  name: app
		---
		apiVersion: v1
		kind: ConfigMap
		metadata:
		  name: helios
		---
		# trailing comment is kept verbatim
		apiVersion: v1
		kind: Namespace
		metadata:
		  name: prod
	"};

	#[test]
	fn test_write_new_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("configmap.yaml");
		let config_map = ConfigMap {
			metadata: ObjectMeta {
				name: Some("helios".to_string()),
				..Default::default()
			},
			..Default::default()
		};

		write_config_map(&path, &config_map, &Leftovers::default()).unwrap();

		assert_eq!(
			std::fs::read_to_string(&path).unwrap(),
			"apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: helios\n"
		);
	}

	#[test]
	fn test_rewrite_keeps_leftovers_and_position() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("manifest.yaml");
		std::fs::write(&path, STREAM).unwrap();

		let (mut config_map, leftovers) = read_config_map(&path).unwrap();
		config_map.data = Some([("db_host".to_string(), "db.local".to_string())].into());
		write_config_map(&path, &config_map, &leftovers).unwrap();

		let written = std::fs::read_to_string(&path).unwrap();
		let documents: Vec<&str> = written.split("---\n").collect();
		assert_eq!(documents.len(), 3);
		assert_eq!(documents[0], "apiVersion: v1\nkind: Service\nmetadata:\n  name: app\n");
		assert!(documents[1].contains("data:\n  db_host: db.local\n"));
		assert!(documents[2].starts_with("# trailing comment is kept verbatim\n"));

		let (reread, _) = read_config_map(&path).unwrap();
		assert_eq!(reread, config_map);
	}

	#[test]
	fn test_write_into_missing_directory_fails() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("missing").join("configmap.yaml");

		let result = write_config_map(&path, &ConfigMap::default(), &Leftovers::default());

		assert_matches!(result, Err(WriteError::Io { .. }));
	}
}
