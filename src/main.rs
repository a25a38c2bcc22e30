// rtl-shell - shell session renderer
// Main entry point

use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use rtl_shell::cli::{self, LaunchOptions, ReplayFormat};
use rtl_shell::config::{load_config, Config};
use rtl_shell::logging::{init_logging, LogTarget};
use rtl_shell::render::ShapingMode;
use rtl_shell::session::SessionOptions;

#[derive(Parser)]
#[command(name = "rtl-shell")]
#[command(about = "Interactive shell session with ANSI styling, bidi shaping and path completion")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Shell to run (repeat to give fallbacks); overrides `shells` in config
    #[arg(long = "shell", global = true)]
    shells: Vec<String>,

    /// Initial working directory
    #[arg(long, global = true)]
    cwd: Option<PathBuf>,

    /// Render text without bidi reordering
    #[arg(long, global = true)]
    no_shaping: bool,

    /// Config file (default: ~/.rtl-shell/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Render a recorded JSON Lines transcript of host messages
    Replay {
        file: PathBuf,

        /// Print text without SGR sequences
        #[arg(long)]
        plain: bool,
    },
}

fn apply_overrides(mut config: Config, cli: &Cli) -> Config {
    if !cli.shells.is_empty() {
        config.shells = cli.shells.clone();
    }
    if cli.no_shaping {
        config.shaping = ShapingMode::None;
    }
    if cli.log_file.is_some() {
        config.log_file = cli.log_file.clone();
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = apply_overrides(load_config(cli.config.as_deref())?, &cli);

    match &cli.command {
        Some(Command::Replay { file, plain }) => {
            let target = match config.log_file.as_deref() {
                Some(path) => LogTarget::File(path),
                None => LogTarget::Stderr,
            };
            init_logging(target)?;

            let format = if *plain {
                ReplayFormat::Plain
            } else {
                ReplayFormat::Styled
            };
            let mut out = BufWriter::new(io::stdout().lock());
            cli::replay_file(file, SessionOptions::from(&config), format, &mut out)
        }
        None => {
            let target = match config.log_file.as_deref() {
                Some(path) => LogTarget::File(path),
                None => LogTarget::Disabled,
            };
            init_logging(target)?;

            let cwd = match &cli.cwd {
                Some(dir) => dir.clone(),
                None => std::env::current_dir().context("Failed to read current directory")?,
            };
            let launch = LaunchOptions {
                shells: config.shell_candidates(),
                cwd,
            };
            cli::run_interactive(config, launch).await
        }
    }
}
