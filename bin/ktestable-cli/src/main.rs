use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use ktestable_learn::{learn, Error as CoreError, OracleMethod};

/// Learn a k-test union from a dataset.
///
/// Reads a newline-delimited text file (one example per line, trailing
/// newlines stripped) and clusters the examples into k-testable-in-the-
/// strict-sense descriptors via agglomerative, consistency-preserving
/// merges.
#[derive(Parser, Debug)]
#[command(name = "ktestable-cli", version)]
struct Cli {
    /// Path to the newline-delimited example dataset.
    dataset: PathBuf,

    /// Window size for the k-TSS descriptors.
    #[arg(long, default_value_t = 3)]
    k: usize,

    /// Which consistency-oracle implementation to use.
    #[arg(long, value_enum, default_value_t = Method::DeFacto)]
    method: Method,

    /// Raise the tracing filter from `info` to `trace`.
    #[arg(long)]
    verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[value(rename_all = "kebab-case")]
enum Method {
    Graph,
    #[value(alias = "de_facto")]
    DeFacto,
}

impl From<Method> for OracleMethod {
    fn from(m: Method) -> Self {
        match m {
            #[cfg(feature = "graph-oracle")]
            Method::Graph => OracleMethod::Graph,
            #[cfg(not(feature = "graph-oracle"))]
            Method::Graph => {
                eprintln!("ktestable-cli: built without the `graph-oracle` feature, falling back to de-facto");
                OracleMethod::DeFacto
            }
            Method::DeFacto => OracleMethod::DeFacto,
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("could not read dataset {path:?}: {source}")]
    ReadDataset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Core(#[from] CoreError),
}

fn run(cli: Cli) -> Result<(), CliError> {
    let contents = fs::read_to_string(&cli.dataset).map_err(|source| CliError::ReadDataset {
        path: cli.dataset.clone(),
        source,
    })?;
    let examples: Vec<String> = contents.lines().map(|line| line.to_string()).collect();

    info!(
        "loaded {} example(s) from {:?}, k={}",
        examples.len(),
        cli.dataset,
        cli.k
    );

    let clusters = learn(&examples, cli.k, cli.method.into())?;

    for (_, provenance) in &clusters {
        println!("{:?}", provenance.leaves());
    }
    println!("{}", clusters.len());

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::filter::LevelFilter::TRACE
    } else {
        tracing_subscriber::filter::LevelFilter::INFO
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ktestable-cli: {err}");
            ExitCode::FAILURE
        }
    }
}
