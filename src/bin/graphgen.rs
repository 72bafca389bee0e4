use std::path::{Path, PathBuf};

use clap::Parser;

use graphgen::{
    ContextCompiler, Manifest, Orchestrator, RepoLayout, RunConfig, clean, is_context_on_path,
};

#[derive(Parser, Debug)]
#[command(name = "graphgen", version, about = "Batch generation of rendered graph drawings")]
struct Cli {
    /// Repository manifest; its directory is the repository root.
    #[arg(long, default_value = "repository.json")]
    manifest: PathBuf,

    /// Batch processing (no interaction needed).
    #[arg(short, long)]
    batch: bool,

    /// Clean up the build directories and exit.
    #[arg(short, long)]
    cleanup: bool,

    /// Regenerate existing graphs.
    #[arg(short = 'n', long)]
    regenerate: bool,

    /// Print the compile logs.
    #[arg(short, long)]
    verbose: bool,

    /// Graph type to generate drawings for (repeatable).
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    types: Vec<String>,

    /// Graph file to generate drawings for (repeatable).
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    graph_files: Vec<PathBuf>,

    /// Algorithm to be used (repeatable).
    #[arg(short = 'a', long = "algorithm", value_name = "ALGORITHM")]
    algorithms: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let root = match cli.manifest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let layout = RepoLayout::new(root);

    if cli.cleanup {
        clean(&layout)?;
        return Ok(());
    }

    let manifest = Manifest::from_path(&cli.manifest)?;

    for graph_type in &cli.types {
        if !manifest.graph_type_exists(graph_type) {
            anyhow::bail!("graph type {graph_type} does not exist");
        }
    }
    for algorithm in &cli.algorithms {
        if !manifest.algorithm_exists(algorithm) {
            anyhow::bail!(
                "algorithm {algorithm} is not defined in {}",
                cli.manifest.display()
            );
        }
    }
    for file in &cli.graph_files {
        if !file.exists() {
            anyhow::bail!("graph file {} does not exist", file.display());
        }
    }

    let config = RunConfig {
        types: cli.types,
        graph_files: cli.graph_files,
        algorithms: cli.algorithms,
        regenerate: cli.regenerate,
        verbose: cli.verbose,
        batch: cli.batch,
    };

    if !is_context_on_path() {
        anyhow::bail!("context is required for rendering, but was not found on PATH");
    }

    let orchestrator = Orchestrator::new(&manifest, layout, config);
    let mut compiler = ContextCompiler;
    orchestrator.run(&mut compiler)?;

    Ok(())
}
