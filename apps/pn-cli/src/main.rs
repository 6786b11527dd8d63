use clap::{Parser, Subcommand};
use pn_reduce::ValidationMode;
use pn_scenario::{ScenarioError, ScenarioResult};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser)]
#[command(name = "pn-cli")]
#[command(about = "PipeNet CLI - Gas network topology reduction", long_about = None)]
struct Cli {
    /// Log every reduction step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate network file syntax and structure
    Validate {
        /// Path to the network YAML or JSON file
        network_path: PathBuf,
    },
    /// Reduce a network and write the result
    Reduce {
        /// Path to the network YAML or JSON file
        network_path: PathBuf,
        /// Output file for the reduced network (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write JSON instead of YAML
        #[arg(long)]
        json: bool,
        /// Skip the invariant checks after each reduction step
        #[arg(long)]
        no_validate: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();
    } else {
        tracing_subscriber::fmt::init();
    }

    let result = match cli.command {
        Commands::Validate { network_path } => cmd_validate(&network_path),
        Commands::Reduce {
            network_path,
            output,
            json,
            no_validate,
        } => cmd_reduce(&network_path, output.as_deref(), json, no_validate),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_fatal_defect() => {
            eprintln!("fatal: {err}");
            eprintln!("the reduced model is inconsistent; no output was written");
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_validate(network_path: &Path) -> ScenarioResult<()> {
    println!("Validating network: {}", network_path.display());
    let file = pn_scenario::load(network_path)?;
    let network = pn_scenario::to_network(&file)?;
    println!(
        "✓ Network '{}' is valid ({} nodes, {} connections)",
        file.name,
        network.node_count(),
        network.edge_count()
    );
    Ok(())
}

fn cmd_reduce(
    network_path: &Path,
    output: Option<&Path>,
    json: bool,
    no_validate: bool,
) -> ScenarioResult<()> {
    let file = pn_scenario::load(network_path)?;
    let mut config = pn_scenario::reduce_config(&file);
    if no_validate {
        config.validation = ValidationMode::Off;
    }

    let reduction = pn_scenario::reduce_file(&file, config)?;
    let report = &reduction.report;

    match output {
        Some(path) => {
            if json {
                pn_scenario::save_json(path, &reduction.file)?;
            } else {
                pn_scenario::save_yaml(path, &reduction.file)?;
            }
            println!("{report}");
            println!("  {}", report.run);
            println!("  {} terminals reclassified", report.reclassified);
            println!("✓ Reduced network written to {}", path.display());
        }
        None => {
            let content = if json {
                serde_json::to_string_pretty(&reduction.file).map_err(ScenarioError::from)?
            } else {
                serde_yaml::to_string(&reduction.file).map_err(ScenarioError::from)?
            };
            // Summary on stderr keeps stdout parseable.
            eprintln!("{report}");
            eprintln!("  {}", report.run);
            print!("{content}");
        }
    }
    Ok(())
}
