use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use flatgeographbuf::minimal_features::MinimalFeatureCodec;
use flatgeographbuf::{deserialize, deserialize_graph_edges, ProbeMeta};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Inspects FlatGeoGraphBuf files encoded with the crate's own minimal,
/// `Point`-only feature codec. Files produced by a real FlatGeobuf encoder
/// need a real `FeatureCodec` implementation plugged in instead; this tool
/// is a demo, not a general-purpose reader.
#[derive(Parser, Debug)]
#[command(name = "fgg-cli", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the feature-header and graph-header metadata without
    /// materializing any feature or edge.
    Probe {
        /// Path to a `.fgg` file
        path: PathBuf,
    },
    /// Stream and print every edge in the graph section.
    Edges {
        /// Path to a `.fgg` file
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env()))
        .init();

    let cli = Cli::parse();
    let codec = MinimalFeatureCodec;

    match cli.command {
        Commands::Probe { path } => {
            info!(path = %path.display(), "probing file");
            let bytes = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;

            let mut meta: Option<ProbeMeta> = None;
            let mut observer = |m: &ProbeMeta| {
                meta = Some(m.clone());
                Ok(())
            };
            deserialize(&codec, &bytes, Some(&mut observer))
                .with_context(|| format!("failed to deserialize {}", path.display()))?;

            let meta = meta.expect("observer always runs before deserialize returns");
            println!("{}", serde_json::to_string_pretty(&meta)?);
            Ok(())
        }
        Commands::Edges { path } => {
            let bytes = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
            let reader = deserialize_graph_edges(&codec, &bytes)
                .with_context(|| format!("failed to locate graph section in {}", path.display()))?;

            info!(count = reader.len(), "streaming edges");
            for edge in reader {
                let edge = edge.context("malformed edge record")?;
                println!("{}", serde_json::to_string(&edge)?);
            }
            Ok(())
        }
    }
}
