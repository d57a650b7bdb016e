//! Command line front end: solve, verify and set up formulas

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use puzzle_cnf::{
    config::{CliOverrides, OutputFormat, Settings, SolverBackend},
    sat::ClauseStore,
    solve_file,
    utils::{ColorOutput, SolutionFormatter},
    Var,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "puzzle_cnf")]
#[command(about = "Constraint-to-CNF compiler and solution enumerator")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate the solutions of a DIMACS formula
    Solve {
        /// Formula to solve (clause lines, header optional)
        #[arg(short, long)]
        formula: PathBuf,

        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Maximum solutions to find (overrides config)
        #[arg(short, long)]
        max_solutions: Option<usize>,

        /// Only these variables distinguish solutions
        #[arg(short, long, value_delimiter = ',')]
        interesting: Vec<Var>,

        /// Also block every true literal of a found solution
        #[arg(long)]
        aggressive: bool,

        /// Solver backend (overrides config)
        #[arg(short, long)]
        backend: Option<SolverBackend>,

        /// Solver executable (overrides config)
        #[arg(short, long)]
        solver: Option<PathBuf>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (overrides config)
        #[arg(long, value_parser = parse_format)]
        format: Option<OutputFormat>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Check that a formula has no variable gaps and is satisfiable
    Verify {
        /// Formula to check
        #[arg(short, long)]
        formula: PathBuf,

        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Skip the density check
        #[arg(long)]
        allow_partial: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Create a default configuration file
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

fn parse_format(text: &str) -> Result<OutputFormat, String> {
    match text.to_ascii_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => Err(format!("unknown output format '{}', expected text or json", other)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            formula,
            config,
            max_solutions,
            interesting,
            aggressive,
            backend,
            solver,
            output,
            format,
            verbose,
        } => {
            init_tracing(verbose);
            let overrides = CliOverrides {
                max_solutions,
                backend,
                executable: solver,
                output_dir: output,
                format,
                aggressive,
            };
            solve_command(&formula, &config, &overrides, &interesting, verbose)
        }
        Commands::Verify {
            formula,
            config,
            allow_partial,
            verbose,
        } => {
            init_tracing(verbose);
            verify_command(&formula, &config, allow_partial)
        }
        Commands::Setup { directory, force } => {
            init_tracing(false);
            setup_command(directory, force)
        }
    }
}

/// `RUST_LOG` wins; otherwise `debug` when verbose and `warn` by default
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // a second subscriber (tests, embedding) is not an error worth reporting
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

fn load_settings(config_path: &Path) -> Result<Settings> {
    if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))
    } else {
        println!(
            "{}",
            ColorOutput::warning(&format!("Config file {} not found, using defaults", config_path.display()))
        );
        Ok(Settings::default())
    }
}

fn solve_command(
    formula: &Path,
    config_path: &Path,
    overrides: &CliOverrides,
    interesting: &[Var],
    verbose: bool,
) -> Result<()> {
    println!("{}", ColorOutput::info("Starting solver"));

    let mut settings = load_settings(config_path)?;
    settings.merge_with_cli(overrides);
    settings.validate().context("Configuration validation failed")?;

    if verbose {
        println!("Configuration:");
        println!("  Formula: {}", formula.display());
        println!("  Backend: {:?}", settings.solver.backend);
        println!("  Max solutions: {}", settings.enumeration.max_solutions);
        println!("  Output dir: {}", settings.output.directory.display());
        println!();
    }

    let start_time = Instant::now();
    let solutions = solve_file(&settings, formula, interesting).context("Failed to solve formula")?;
    let total_time = start_time.elapsed();
    debug!(solutions = solutions.len(), elapsed = ?total_time, "enumeration finished");

    if solutions.is_empty() {
        println!("{}", ColorOutput::warning("No solutions found"));
        return Ok(());
    }

    println!(
        "{}",
        ColorOutput::success(&format!(
            "Found {} solution(s) in {:.3}s",
            solutions.len(),
            total_time.as_secs_f64()
        ))
    );
    println!("\n{}", SolutionFormatter::format_solution_summary(&solutions));

    if solutions.len() <= 3 {
        for solution in &solutions {
            println!("{}", SolutionFormatter::format_solution(solution, None));
        }
    }

    SolutionFormatter::save_solutions(&solutions, &settings.output.directory, settings.output.format, None)
        .context("Failed to save solutions")?;
    println!(
        "{}",
        ColorOutput::success(&format!("Solutions saved to {}", settings.output.directory.display()))
    );

    Ok(())
}

fn verify_command(formula: &Path, config_path: &Path, allow_partial: bool) -> Result<()> {
    println!("{}", ColorOutput::info(&format!("Verifying {}", formula.display())));

    let settings = load_settings(config_path)?;
    settings.validate().context("Configuration validation failed")?;

    let mut store = ClauseStore::ephemeral(&settings).context("Failed to create clause store")?;
    store
        .read(formula)
        .with_context(|| format!("Failed to read formula {}", formula.display()))?;
    println!("{}", store.statistics());

    match store.verify(allow_partial) {
        Ok(()) => {
            println!("{}", ColorOutput::success("Formula is satisfiable"));
            Ok(())
        }
        Err(err) => {
            println!("{}", ColorOutput::error(&format!("Verification failed: {}", err)));
            Err(err.into())
        }
    }
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_dir = directory.join("config");
    let output_dir = directory.join("output/solutions");
    for dir in [&config_dir, &output_dir] {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    let in_process_path = config_dir.join("in_process.yaml");
    if !in_process_path.exists() || force {
        Settings::in_process()
            .to_file(&in_process_path)
            .context("Failed to create in-process configuration")?;
        println!("Created: {}", in_process_path.display());
    }

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Run: puzzle_cnf solve --formula puzzle.cnf --config config/default.yaml");

    Ok(())
}
