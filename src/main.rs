//! run-tests-separate - fork-per-class test partitioning
//!
//! Resolves the plugin configuration from the project config file, `-D`
//! system properties and the environment, then prints it or the task wiring
//! plan for a project descriptor.
//!
//! ## Usage
//!
//! ```bash
//! # Resolve from ./gradle.properties and the environment
//! run-tests-separate resolve
//!
//! # Override a key as a system property
//! run-tests-separate resolve -D plugins.runtestsseparatejvm.listOfTests.parallel=FastTest
//!
//! # Plan the task wiring for a project
//! run-tests-separate plan --project project.yaml --apply
//!
//! # List recognized keys
//! run-tests-separate keys
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info, warn};

use run_tests_separate::cli::{self, Args};
use run_tests_separate::config::{
    parse_define, resolve, ConfigKey, EnvSource, HostCapabilities, LayeredSources, MapSource,
    ProjectProperties, KEY_PREFIX,
};
use run_tests_separate::error::ConfigError;
use run_tests_separate::models::Project;
use run_tests_separate::output::{OutputFormat, ReportFormatter};
use run_tests_separate::utils::logger::{init_logger, LogLevel};
use run_tests_separate::wiring;

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::from_str(&args.log_level).unwrap_or(LogLevel::Info)
    };
    init_logger(level);

    if let Err(err) = run(args) {
        let code = match err.downcast_ref::<ConfigError>() {
            Some(config_err) => {
                error!("[{}] {}", config_err.kind(), config_err);
                config_err.kind().exit_code()
            }
            None => {
                error!("{:#}", err);
                1
            }
        };
        std::process::exit(code);
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        cli::Command::Resolve(resolve_args) => run_resolve(resolve_args),
        cli::Command::Plan(plan_args) => run_plan(plan_args),
        cli::Command::Keys(keys_args) => {
            println!("{}", formatter(&keys_args.format, false).format_keys());
            Ok(())
        }
    }
}

fn run_resolve(args: cli::ResolveArgs) -> Result<()> {
    let project = load_properties(args.sources.properties.as_deref())?.into_source();
    let sources = layered_sources(project, &args.sources);
    let capabilities = HostCapabilities::default().with_retry(args.retry_capability);

    let resolution = resolve(&sources, capabilities)?;
    info!(
        "Resolved {} partition(s), {} advisory warning(s)",
        resolution.configuration.partitions().len(),
        resolution.advisories.len()
    );

    let formatter = formatter(&args.sources.format, args.sources.no_color);
    println!("{}", formatter.format_resolution(&resolution));
    Ok(())
}

fn run_plan(args: cli::PlanArgs) -> Result<()> {
    let mut project = Project::load(&args.project)?;

    // Descriptor properties first, the properties file on top
    let mut project_source = project.property_source();
    let file = load_properties(args.sources.properties.as_deref())?;
    project_source.extend(&file.into_source());

    let sources = layered_sources(project_source, &args.sources);
    let plan = wiring::plan(&project, &sources)?;
    info!(
        "Planned {} task(s) for project '{}'",
        plan.tasks.len(),
        project.name
    );

    let formatter = formatter(&args.sources.format, args.sources.no_color);
    println!("{}", formatter.format_plan(&plan));

    if args.apply {
        plan.apply(&mut project);
        println!("{}", formatter.format_tasks(&project.tasks));
    }
    Ok(())
}

fn load_properties(path: Option<&str>) -> Result<ProjectProperties> {
    let properties = match path {
        Some(path) => ProjectProperties::load(path)
            .with_context(|| format!("Failed to load project properties from {path}"))?,
        None => ProjectProperties::load_default()?,
    };

    match &properties.path {
        Some(path) if properties.is_empty() => warn!("{} holds no entries", path.display()),
        Some(path) => debug!("Using {} entries from {}", properties.len(), path.display()),
        None => debug!("No project-level config file found"),
    }
    Ok(properties)
}

fn layered_sources(project: MapSource, args: &cli::SourceArgs) -> LayeredSources {
    let mut properties = MapSource::properties();
    for define in &args.defines {
        match parse_define(define) {
            Some((key, value)) => {
                if key.starts_with(KEY_PREFIX) && ConfigKey::from_name(&key).is_none() {
                    warn!("Unrecognized key '{}' (see `run-tests-separate keys`)", key);
                }
                properties.insert(key, value);
            }
            None => debug!("Ignoring malformed definition {:?}", define),
        }
    }
    if !properties.is_empty() {
        debug!("{} system property definition(s)", properties.len());
    }

    let environment = if args.no_env {
        EnvSource::default()
    } else {
        EnvSource::snapshot()
    };

    LayeredSources::new(project, properties, environment)
}

fn formatter(format: &str, no_color: bool) -> ReportFormatter {
    let formatter = ReportFormatter::new(OutputFormat::from_str(format).unwrap_or(OutputFormat::Table));
    if no_color {
        formatter.no_color()
    } else {
        formatter
    }
}
