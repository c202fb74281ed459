use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

use sitebook::app::{App, Command};
use sitebook::config::Config;
use sitebook::logging;

#[derive(Parser, Debug)]
#[command(name = "sitebook")]
#[command(about = "Offline-first project records for landscaping and construction crews")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/sitebook/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Log at debug level
  #[arg(short, long)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;

  // Dropping the guard flushes buffered log lines
  let _guard = logging::init(&config.log, args.verbose)?;

  let app = App::new(config)?;
  app.run(args.command).await?;

  Ok(())
}
