//! pointgroups - converts OFF/PLY point clouds into renderer-sized point groups
//! and stores them as per-group binary PLY files plus a manifest.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pointgroups_convert::{
    convert_batch, load_or_convert, source_id, Converter, DirStore, ResultStore,
};
use pointgroups_core::ConvertConfig;
use pointgroups_io::{format_of, open_source, read_header, resolve_source};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pointgroups")]
#[command(about = "Point cloud to point-group converter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// TOML file with scale / invert_yz / capacity
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Uniform multiplier applied to every coordinate
    #[arg(long)]
    scale: Option<f32>,

    /// Swap the Y and Z axes on read
    #[arg(long)]
    invert_yz: bool,

    /// Maximum points per group
    #[arg(long)]
    capacity: Option<u32>,
}

impl ConfigArgs {
    fn resolve(&self) -> Result<ConvertConfig> {
        let mut config = match &self.config {
            Some(path) => ConvertConfig::load(path)
                .with_context(|| format!("loading config {:?}", path))?,
            None => ConvertConfig::default(),
        };
        if let Some(scale) = self.scale {
            config.scale = scale;
        }
        if self.invert_yz {
            config.invert_yz = true;
        }
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one point cloud, reusing a stored result when present
    Convert {
        /// Source path, with or without .off/.ply extension
        input: PathBuf,

        /// Directory converted results are stored in
        #[arg(short, long, default_value = "point_cloud_meshes")]
        output: PathBuf,

        /// Identifier to store under (default: source file name)
        #[arg(long)]
        id: Option<String>,

        /// Discard any stored result and convert again
        #[arg(short, long)]
        force: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Convert several point clouds in parallel, always from source
    Batch {
        inputs: Vec<PathBuf>,

        #[arg(short, long, default_value = "point_cloud_meshes")]
        output: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print a source's parsed header without decoding vertices
    Inspect {
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            id,
            force,
            config,
        } => {
            let config = config.resolve()?;
            let id = id.unwrap_or_else(|| source_id(&input));
            let mut store = DirStore::new(output);
            let converter = Converter::new(config);

            let mut last_reported = -1.0f32;
            let mut progress = |fraction: f32, message: &str| {
                if fraction - last_reported >= 0.1 || fraction >= 1.0 {
                    tracing::info!("{:>3.0}% {}", fraction * 100.0, message);
                    last_reported = fraction;
                }
            };

            let result = load_or_convert(&id, &input, &mut store, &converter, force, &mut progress)
                .with_context(|| format!("converting {:?}", input))?;
            tracing::info!(
                "{}: {} points in {} groups, origin {:?} -> {:?}",
                id,
                result.total_points,
                result.group_count(),
                result.origin,
                store.root().join(&id)
            );
        }

        Commands::Batch {
            inputs,
            output,
            config,
        } => {
            let config = config.resolve()?;
            let mut store = DirStore::new(output);
            let results = convert_batch(&inputs, &config);

            let mut failures = 0;
            for (input, result) in inputs.iter().zip(results) {
                let id = source_id(input);
                match result {
                    Ok(result) => {
                        store
                            .store(&id, &result)
                            .with_context(|| format!("storing {}", id))?;
                        tracing::info!(
                            "{}: {} points in {} groups",
                            id,
                            result.total_points,
                            result.group_count()
                        );
                    }
                    Err(e) => {
                        failures += 1;
                        tracing::error!("{:?}: {:?} - {}", input, e.kind(), e);
                    }
                }
            }
            if failures > 0 {
                anyhow::bail!("{} of {} conversions failed", failures, inputs.len());
            }
        }

        Commands::Inspect { input } => {
            let path = resolve_source(&input)?;
            let mut reader = open_source(&path)?;
            let header = read_header(&mut reader, format_of(&path))?;

            println!("source:    {}", path.display());
            println!("format:    {:?} ({:?})", header.format, header.encoding);
            println!("vertices:  {}", header.vertex_count);
            println!("stride:    {} bytes", header.stride());
            let color = if header.has_color() {
                "yes"
            } else {
                "no (default cyan)"
            };
            println!("color:     {}", color);
            for p in &header.properties {
                println!("  [{}] {:<12} {:?} {:?}", p.index, p.name, p.width, p.role);
            }
        }
    }

    Ok(())
}
