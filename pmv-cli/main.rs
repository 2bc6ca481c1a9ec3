mod inspect;
mod tree;

use std::io::Write as _;

use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize as _;
use pmv_host::{Host, Snapshot};
use pmv_render::{RenderSettings, parse_settings, pattern_matcher_printers};
use tracing_subscriber::EnvFilter;

use crate::inspect::Inspector;

#[derive(Debug, clap::Parser)]
pub struct Args {
    /// Path to the process snapshot (JSON).
    pub snapshot: std::path::PathBuf,
    /// Symbols to display. Defaults to every symbol in the snapshot.
    pub symbols: Vec<String>,
    /// The path to the settings file. Defaults to `pmv.toml` in the working
    /// dir, if it exists.
    #[clap(short, long)]
    pub config: Option<std::path::PathBuf>,
    /// How many levels of children to expand. Overrides `display.max-depth`.
    #[clap(short, long)]
    pub depth: Option<usize>,
    /// Disable a printer by name. May be given multiple times.
    #[clap(long)]
    pub disable: Vec<String>,
    /// List the registered printers and exit.
    #[clap(long)]
    pub list_printers: bool,
    /// Do not use any printers; show the host's generic formatting only.
    #[clap(long)]
    pub raw: bool,
    #[clap(long, default_value = "auto")]
    pub color: ColorChoice,
}

/// Color mode.
#[derive(Clone, Copy, Default, Debug, clap::ValueEnum)]
pub enum ColorChoice {
    /// Probe the current terminal and environment variables for color support.
    /// Color is disabled when stdout is not a terminal, or when the `NO_COLOR`
    /// environment variable is set.
    #[default]
    Auto,
    /// Force color output, even if the command is not running in a terminal.
    Always,
    /// Do not use color output, regardless of whether the command is running in
    /// a terminal.
    Never,
}

impl From<ColorChoice> for anstream::ColorChoice {
    fn from(choice: ColorChoice) -> Self {
        match choice {
            ColorChoice::Auto => anstream::ColorChoice::Auto,
            ColorChoice::Always => anstream::ColorChoice::Always,
            ColorChoice::Never => anstream::ColorChoice::Never,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("PMV_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    try_main(args)
}

fn try_main(args: Args) -> Result<()> {
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(depth) = args.depth {
        settings.max_depth = depth;
    }
    settings.disabled.extend(args.disable);

    let registry = pattern_matcher_printers(&settings)?;
    let mut stdout = anstream::AutoStream::new(std::io::stdout(), args.color.into());

    if args.list_printers {
        for entry in registry.entries() {
            if entry.enabled {
                writeln!(stdout, "{}", entry.name)?;
            } else {
                writeln!(stdout, "{} {}", entry.name, "[disabled]".dimmed())?;
            }
        }
        return Ok(());
    }

    let json = std::fs::read_to_string(&args.snapshot)?;
    let snapshot = Snapshot::from_json(&json)?;
    tracing::debug!("Loaded snapshot: {}", args.snapshot.display());

    let symbols = if args.symbols.is_empty() {
        snapshot.symbols()
    } else {
        args.symbols
    };

    let inspector = Inspector {
        registry: (!args.raw).then_some(&registry),
        max_depth: settings.max_depth,
        max_children: settings.max_children,
    };

    let mut missing = 0usize;
    for name in &symbols {
        let Some(value) = snapshot.symbol(name) else {
            writeln!(stdout, "{}: no symbol `{name}`", "error".bright_red().bold())?;
            missing += 1;
            continue;
        };
        let node = inspector.inspect_root(&snapshot, name, &value);
        tree::write_tree(&mut stdout, &node)?;
    }
    stdout.flush()?;

    if missing != 0 {
        anyhow::bail!("{missing} symbol(s) not found");
    }
    Ok(())
}

fn load_settings(path: Option<&std::path::Path>) -> Result<RenderSettings> {
    let path = match path {
        Some(path) => path.to_owned(),
        None => {
            let candidate = std::env::current_dir()?.join("pmv.toml");
            if !candidate.is_file() {
                tracing::debug!("No pmv.toml, using default settings");
                return Ok(RenderSettings::default());
            }
            candidate
        }
    };
    tracing::debug!("Using settings: {}", path.display());
    let contents = std::fs::read_to_string(&path)?;
    Ok(parse_settings(&contents)?)
}
