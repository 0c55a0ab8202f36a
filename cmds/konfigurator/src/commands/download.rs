//! Download command handler.

use std::{
	io::Write,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Args;
use konfigurator_diff::ColorMode;
use tracing::{error, info, instrument};

use crate::{config::Config, inputs, outputs};

#[derive(Args)]
pub struct DownloadArgs {
	/// Output format
	#[arg(short = 'o', long, default_value = outputs::DEFAULT_OUTPUT)]
	pub output: String,

	/// Directory the manifests are written to [default: working directory]
	#[arg(short = 'd', long)]
	pub destination: Option<PathBuf>,

	/// Config file to use instead of searching for .konfigurator.yaml
	#[arg(short = 'c', long)]
	pub config: Option<PathBuf>,

	/// Controls color in diff output, must be "auto", "always", or "never"
	#[arg(long, default_value = "auto")]
	pub color: ColorMode,

	/// Log level (possible values: disabled, error, warn, info, debug, trace)
	#[arg(long, default_value = "info", env = "KONFIGURATOR_LOG_LEVEL")]
	pub log_level: String,
}

/// Fully resolved options of a download.
#[derive(Debug, Clone)]
pub struct DownloadOpts {
	pub output: String,
	pub destination: PathBuf,
	pub config: Option<PathBuf>,
	pub colored: bool,
}

impl DownloadOpts {
	pub fn from_args(args: DownloadArgs, working_dir: &Path) -> Self {
		Self {
			output: args.output,
			destination: args
				.destination
				.unwrap_or_else(|| working_dir.to_path_buf()),
			config: args.config,
			colored: args.color.should_colorize(),
		}
	}
}

/// Load the config, resolve every definition and hand the variables to the output.
#[instrument(skip(writer), fields(output = %opts.output, destination = %opts.destination.display()))]
pub fn download<W: Write>(opts: &DownloadOpts, working_dir: &Path, writer: &mut W) -> Result<()> {
	let config = Config::load(opts.config.as_deref(), working_dir)?;

	let Some(output) = outputs::get(&opts.output, &config, opts.colored) else {
		anyhow::bail!(
			"unknown output format '{}', available: {}",
			opts.output,
			outputs::registered_names().join(", ")
		);
	};

	let variables = inputs::process(&config.definitions)
		.context("failed to resolve configuration values")?;
	info!(name = %config.name, variables = variables.len(), "resolved configuration");

	output
		.save(&config.name, &opts.destination, &variables, writer)
		.with_context(|| format!("failed to save configuration as {}", opts.output))?;
	writer.flush()?;

	info!(name = %config.name, "configuration saved");
	Ok(())
}

/// Run the download command.
///
/// Failures are logged rather than returned.
pub fn run<W: Write>(args: DownloadArgs, working_dir: &Path, mut writer: W) -> Result<()> {
	let opts = DownloadOpts::from_args(args, working_dir);
	if let Err(err) = download(&opts, working_dir, &mut writer) {
		error!(error = format!("{err:#}"), "download failed");
	}
	Ok(())
}
