use anyhow::Result;
use clap::{Parser, Subcommand};
use konfigurator::{commands, commands::util::BrokenPipeGuard, telemetry};
use tracing::error;

/// Exit status used when the working directory cannot be determined.
const WORKING_DIR_EXIT_CODE: i32 = -6;

#[derive(Parser)]
#[command(name = "konfigurator")]
#[command(about = "Download configuration and store it as Kubernetes manifests", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Download configuration and store it in the destination directory
	Download(commands::download::DownloadArgs),
}

/// Extract log level from command
fn get_log_level(cmd: &Commands) -> &str {
	match cmd {
		Commands::Download(args) => &args.log_level,
	}
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	telemetry::init(telemetry::parse_level(get_log_level(&cli.command)));

	let working_dir = match std::env::current_dir() {
		Ok(dir) => dir,
		Err(err) => {
			error!(error = %err, "failed to determine working directory");
			std::process::exit(WORKING_DIR_EXIT_CODE);
		}
	};

	let stdout = BrokenPipeGuard::new(std::io::stdout());

	match cli.command {
		Commands::Download(args) => commands::download::run(args, &working_dir, stdout),
	}
}
