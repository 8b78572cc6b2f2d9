//! livery CLI - website template customizer.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use livery_render::Viewport;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

use config::ConfigFile;

#[derive(Parser)]
#[command(name = "livery")]
#[command(about = "Customize, preview and export website templates")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to livery.toml config file
    #[arg(short, long, default_value = "livery.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create livery.toml and a default state file
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// List gallery presets
    Presets {
        /// Only show one category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Apply a gallery preset to the state file
    Apply {
        /// Preset id (e.g., "tech-dark")
        id: String,
    },

    /// Set one field (e.g., `livery set bgColor "#112233"`)
    Set { field: String, value: String },

    /// Print the current customization
    Show {
        /// Print the preview markup for a viewport instead
        #[arg(long)]
        viewport: Option<Viewport>,
    },

    /// Export the customization as a standalone HTML page
    Export {
        /// Output directory (defaults to config or "dist")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minify the embedded stylesheet
        #[arg(long)]
        minify: bool,
    },

    /// Export every gallery preset with an index page
    Gallery {
        /// Output directory (defaults to "<output>/gallery")
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the live preview editor
    Edit {
        /// Port to listen on (defaults to config or 7878)
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,

        /// Seed the editor from the template API first
        #[arg(long)]
        pull: bool,
    },

    /// Preview exported pages
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve (defaults to config or "dist")
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Replace the state file with the first stored template
    Pull,

    /// Save the state file as a new stored template
    Push {
        /// Template name (defaults to "Customized Template by <email>")
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Upload an image and use it for the background or logo
    Upload {
        /// "background" or "logo"
        slot: String,
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt().with_env_filter(filter).with_target(false).init();

    if let Commands::Init { yes } = cli.command {
        return commands::init::run(&cli.config, yes).await;
    }

    let config = ConfigFile::load(&cli.config)?;

    match cli.command {
        Commands::Init { .. } => {}
        Commands::Presets { category } => {
            commands::presets::list(category.as_deref());
        }
        Commands::Apply { id } => {
            commands::presets::apply(&config, &id)?;
        }
        Commands::Set { field, value } => {
            commands::state::set(&config, &field, &value)?;
        }
        Commands::Show { viewport } => {
            commands::state::show(&config, viewport)?;
        }
        Commands::Export { output, minify } => {
            commands::export::run(&config, output, minify)?;
        }
        Commands::Gallery { output } => {
            commands::export::gallery(&config, output)?;
        }
        Commands::Edit {
            port,
            no_open,
            pull,
        } => {
            commands::edit::run(&config, port, !no_open, pull).await?;
        }
        Commands::Serve { port, dir } => {
            let dir = dir.unwrap_or_else(|| config.project.output.clone());
            commands::serve::run(port, dir).await?;
        }
        Commands::Pull => {
            commands::remote::pull(&config).await?;
        }
        Commands::Push { name } => {
            commands::remote::push(&config, name).await?;
        }
        Commands::Upload { slot, file } => {
            commands::remote::upload(&config, &slot, &file).await?;
        }
    }

    Ok(())
}
