//! nether-fontgen - Nethercore bitmap font baker
//!
//! Converts a fixed-width BDF font into a packed coverage mask emitted as a
//! self-contained Rust module.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use nether_fontgen::{load_manifest, output, FontManifest};

#[derive(Parser)]
#[command(name = "nether-fontgen")]
#[command(about = "Bake bitmap fonts into packed coverage masks")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the Rust module for a font
    Generate {
        #[command(flatten)]
        input: InputArgs,

        /// Output .rs file (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that a generated module is in sync with its font
    Check {
        #[command(flatten)]
        input: InputArgs,

        /// Generated .rs file to compare (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the rasterized canvas as a PNG
    Preview {
        #[command(flatten)]
        input: InputArgs,

        /// Output .png file
        #[arg(long)]
        png: PathBuf,

        /// Integer scale factor
        #[arg(long, default_value_t = 4)]
        scale: u32,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Path to fontgen.toml manifest (defaults apply when omitted)
    manifest: Option<PathBuf>,

    /// Input BDF font (overrides manifest)
    #[arg(short, long)]
    font: Option<PathBuf>,
}

impl InputArgs {
    fn load(&self) -> Result<FontManifest> {
        let mut manifest = match &self.manifest {
            Some(path) => load_manifest(path)?,
            None => FontManifest::default(),
        };
        if let Some(font) = &self.font {
            manifest.font.source = Some(absolute_from_cwd(font, &manifest.base_dir));
        }
        Ok(manifest)
    }
}

/// Resolve a CLI path so that joining it to the manifest directory is a no-op
fn absolute_from_cwd(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() || base_dir.as_os_str().is_empty() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match cli.command {
        Commands::Generate { input, output } => {
            let mut manifest = input.load()?;
            if let Some(path) = output {
                manifest.font.output = Some(absolute_from_cwd(&path, &manifest.base_dir));
            }
            let output_path = manifest.output_path()?;

            let generated = nether_fontgen::generate(&manifest).context("Font generation failed")?;
            output::write_atomic(&output_path, generated.text.as_bytes())
                .with_context(|| format!("Failed to write {:?}", output_path))?;
            tracing::info!("Generated {:?}", output_path);
        }

        Commands::Check { input, output } => {
            let mut manifest = input.load()?;
            if let Some(path) = output {
                manifest.font.output = Some(absolute_from_cwd(&path, &manifest.base_dir));
            }
            let output_path = manifest.output_path()?;

            let generated = nether_fontgen::generate(&manifest).context("Font generation failed")?;
            if output::check_in_sync(&output_path, &generated.text)? {
                tracing::info!("{:?} is in sync", output_path);
            } else {
                anyhow::bail!(
                    "{:?} is out of sync. Run 'nether-fontgen generate' to regenerate.",
                    output_path
                );
            }
        }

        Commands::Preview { input, png, scale } => {
            let manifest = input.load()?;
            let generated = nether_fontgen::generate(&manifest).context("Font generation failed")?;
            output::write_preview(&generated.baked.canvas, &png, scale)?;
            tracing::info!("Wrote preview {:?}", png);
        }
    }

    Ok(())
}
