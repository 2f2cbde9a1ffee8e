//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Partition test classes into fork-per-class sequential and parallel tasks
#[derive(Parser, Debug)]
#[command(name = "run-tests-separate")]
#[command(author = "hephaex@gmail.com")]
#[command(version = "0.1.4")]
#[command(about = "Resolve and plan fork-per-class test partitions")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the configuration and print it
    Resolve(ResolveArgs),

    /// Plan the task wiring for a project descriptor
    Plan(PlanArgs),

    /// List recognized configuration keys
    Keys(KeysArgs),
}

/// Configuration sources shared by `resolve` and `plan`
#[derive(ClapArgs, Debug)]
pub struct SourceArgs {
    /// Project-level config file (.properties, .yaml, .json); searched in
    /// the standard locations when omitted
    #[arg(long)]
    pub properties: Option<String>,

    /// System property definition, `key=value` (repeatable)
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE")]
    pub defines: Vec<String>,

    /// Ignore the process environment
    #[arg(long)]
    pub no_env: bool,

    /// Output format (table, json, json-pretty, yaml)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Arguments for resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Treat the test-retry capability as present
    #[arg(long)]
    pub retry_capability: bool,
}

/// Arguments for plan command
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Project descriptor (YAML or JSON)
    #[arg(short, long)]
    pub project: String,

    #[command(flatten)]
    pub sources: SourceArgs,

    /// Also print the project's task set with the plan applied
    #[arg(long)]
    pub apply: bool,
}

/// Arguments for keys command
#[derive(Parser, Debug)]
pub struct KeysArgs {
    /// Output format (table, json, json-pretty, yaml)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}
