//! Rigcade CLI - Command-line interface for rigging and animating layered
//! characters
//!
//! This binary turns a decoded layer tree into a rigged skeleton, free-text
//! requests into keyframe timelines, and both into a Spine project document.

use clap::{Parser, Subcommand};
use std::path::Path;
use std::process::ExitCode;

use rigcade_cli::{commands, input};

/// Rigcade - Layered Character Rigging and Animation
#[derive(Parser)]
#[command(name = "rigcade")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Engine configuration file (JSON; default: built-in settings)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer a rigged skeleton from a layer tree
    Rig {
        /// Path to the layer tree JSON
        #[arg(short, long)]
        layers: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Parse a free-text animation request
    Intent {
        /// The request, e.g. "wave happily with sparkles"
        #[arg(short, long)]
        text: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Synthesize one timeline per text against a rigged skeleton
    Animate {
        /// Path to a skeleton written by `rig`
        #[arg(short, long)]
        skeleton: String,

        /// Free-text request (repeatable)
        #[arg(short, long = "text", required = true)]
        texts: Vec<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Export a skeleton and its timelines as a Spine project
    Export {
        /// Path to a skeleton written by `rig`
        #[arg(short, long)]
        skeleton: String,

        /// Timeline file written by `animate` (repeatable)
        #[arg(long = "timeline")]
        timelines: Vec<String>,

        /// Asset manifest mapping layer ids to image paths
        #[arg(short, long)]
        assets: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Rig, animate, and export in one step
    Build {
        /// Path to the layer tree JSON
        #[arg(short, long)]
        layers: String,

        /// Asset manifest (default: `<layer id>.png` for every pixel layer)
        #[arg(short, long)]
        assets: Option<String>,

        /// Free-text request (repeatable)
        #[arg(short, long = "text")]
        texts: Vec<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },
}

/// Library warnings already appear in command output, so only the CLI's own
/// target logs by default.
fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("rigcade_cli=warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match input::load_config(cli.config.as_deref().map(Path::new)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            return ExitCode::from(1);
        }
    };
    log::debug!("engine config: {:?}", config);

    let result = match cli.command {
        Commands::Rig {
            layers,
            output,
            json,
        } => commands::rig::run(&layers, output.as_deref(), &config, json),
        Commands::Intent { text, output, json } => {
            commands::intent::run(&text, output.as_deref(), &config, json)
        }
        Commands::Animate {
            skeleton,
            texts,
            output,
            json,
        } => commands::animate::run(&skeleton, &texts, output.as_deref(), &config, json),
        Commands::Export {
            skeleton,
            timelines,
            assets,
            output,
            json,
        } => commands::export::run(
            &skeleton,
            &timelines,
            &assets,
            output.as_deref(),
            &config,
            json,
        ),
        Commands::Build {
            layers,
            assets,
            texts,
            output,
            json,
        } => commands::build::run(
            &layers,
            assets.as_deref(),
            &texts,
            output.as_deref(),
            &config,
            json,
        ),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_rig() {
        let cli = Cli::try_parse_from(["rigcade", "rig", "--layers", "layers.json"]).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
        match cli.command {
            Commands::Rig {
                layers,
                output,
                json,
            } => {
                assert_eq!(layers, "layers.json");
                assert!(output.is_none());
                assert!(!json);
            }
            _ => panic!("expected rig command"),
        }
    }

    #[test]
    fn test_cli_parses_repeated_texts() {
        let cli = Cli::try_parse_from([
            "rigcade",
            "animate",
            "-s",
            "skeleton.json",
            "-t",
            "walk",
            "--text",
            "happy wave",
            "-o",
            "timelines.json",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Animate {
                skeleton,
                texts,
                output,
                json,
            } => {
                assert_eq!(skeleton, "skeleton.json");
                assert_eq!(texts, vec!["walk", "happy wave"]);
                assert_eq!(output.as_deref(), Some("timelines.json"));
                assert!(json);
            }
            _ => panic!("expected animate command"),
        }
    }

    #[test]
    fn test_cli_animate_requires_text() {
        assert!(Cli::try_parse_from(["rigcade", "animate", "-s", "skeleton.json"]).is_err());
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "rigcade",
            "intent",
            "--text",
            "nod",
            "--config",
            "engine.json",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some("engine.json"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_parses_export_timelines() {
        let cli = Cli::try_parse_from([
            "rigcade",
            "export",
            "--skeleton",
            "s.json",
            "--timeline",
            "a.json",
            "--timeline",
            "b.json",
            "--assets",
            "assets.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Export {
                timelines, assets, ..
            } => {
                assert_eq!(timelines, vec!["a.json", "b.json"]);
                assert_eq!(assets, "assets.json");
            }
            _ => panic!("expected export command"),
        }
    }
}
