//! agentprof CLI
//!
//! Measures how much of a CPU sampling profile an instrumentation agent
//! accounts for, and prints the agent's call tree.

use agentprof::aggregator::ClassifierMode;
use agentprof::commands::{execute_analyze, render_policy, validate_args, AnalyzeArgs};
use agentprof::output::ReportOptions;
use agentprof::parser::InputFormat;
use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

/// agentprof - attribute sampling profiles to an instrumentation agent
#[derive(Parser, Debug)]
#[command(name = "agentprof")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a capture and print the agent's call tree
    Analyze {
        /// Capture file (`jfr print --json` output or folded stacks)
        input: PathBuf,

        /// Input format (detected from extension/content if omitted)
        #[arg(short, long, value_enum)]
        format: Option<InputFormat>,

        /// Also analyze jdk.NativeMethodSample events
        #[arg(long)]
        include_native: bool,

        /// Classifier policy TOML file
        #[arg(short, long, env = "AGENTPROF_POLICY")]
        policy: Option<PathBuf>,

        /// Package prefix of the instrumentation agent
        #[arg(long)]
        prefix: Option<String>,

        /// Type prefix never attributed to the agent
        #[arg(long)]
        self_exclusion: Option<String>,

        /// Classifier mode
        #[arg(long, value_enum, default_value_t = ClassifierMode::Callers)]
        mode: ClassifierMode,

        /// Leave line numbers out of frame keys
        #[arg(long)]
        no_line_numbers: bool,

        /// Drop samples whose path runs through class loading
        #[arg(long)]
        exclude_class_loading: bool,

        /// Deepest tree level to print (0 = top level only)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Hide tree nodes with fewer samples
        #[arg(long, default_value = "1")]
        min_count: u64,
    },

    /// Print the effective classifier policy as TOML
    Policy {
        /// Policy file to load instead of the built-in defaults
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Analyze {
            input,
            format,
            include_native,
            policy,
            prefix,
            self_exclusion,
            mode,
            no_line_numbers,
            exclude_class_loading,
            max_depth,
            min_count,
        } => {
            let args = AnalyzeArgs {
                input,
                format,
                include_native,
                policy,
                instrumentation_prefix: prefix,
                self_exclusion_prefix: self_exclusion,
                mode,
                include_line_number: !no_line_numbers,
                exclude_class_loading,
                report: ReportOptions {
                    max_depth,
                    min_count,
                },
            };

            // Validate args first
            validate_args(&args)?;

            execute_analyze(args)?;
        }

        Commands::Policy { file } => {
            print!("{}", render_policy(file.as_deref())?);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("agentprof v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Attributes CPU sampling profiles to an instrumentation agent.");
}
