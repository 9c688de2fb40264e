//! ditastore command line
//!
//! Argument parsing, configuration layering and logging setup for the
//! `ditastore` binary. Kept in a library so the command can be tested
//! without spawning processes.

#![allow(missing_docs)]

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use ditastore_core::{plan_topics, pull_topics, PlannedReference, PullTopicsConfig, RewriteReport};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Build the command line definition
#[must_use]
pub fn command() -> Command {
    Command::new("ditastore")
        .version(ditastore_core::VERSION)
        .about("Resolve m2: artifact references in DITA maps into local topics")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Raise log level (-v info, -vv debug, -vvv trace)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(with_run_args(
            Command::new("pull-topics").about("Fetch referenced topics and write the rewritten map"),
        ))
        .subcommand(with_run_args(
            Command::new("plan").about("Show where each reference would resolve, without fetching"),
        ))
}

fn with_run_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("map")
                .long("map")
                .value_parser(value_parser!(PathBuf))
                .help("DITA map to process"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file; flags override its values"),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .short('o')
                .value_parser(value_parser!(PathBuf))
                .help("Directory receiving the rewritten map [default: target]"),
        )
        .arg(
            Arg::new("topics-dir")
                .long("topics-dir")
                .value_parser(value_parser!(PathBuf))
                .help("Directory receiving topics [default: <output-dir>/dita-topics]"),
        )
        .arg(
            Arg::new("no-overwrite")
                .long("no-overwrite")
                .action(ArgAction::SetTrue)
                .help("Keep topics that already exist"),
        )
        .arg(
            Arg::new("local-repo")
                .long("local-repo")
                .value_parser(value_parser!(PathBuf))
                .help("Local Maven repository [default: ~/.m2/repository]"),
        )
        .arg(
            Arg::new("remote-repo")
                .long("remote-repo")
                .action(ArgAction::Append)
                .help("Remote repository base URL (repeatable, tried in order)"),
        )
        .arg(
            Arg::new("http-timeout")
                .long("http-timeout")
                .value_parser(value_parser!(u64))
                .help("Download timeout in seconds"),
        )
        .arg(
            Arg::new("element")
                .long("element")
                .action(ArgAction::Append)
                .help("Element name scanned for references (repeatable) [default: topicref]"),
        )
        .arg(
            Arg::new("no-specializations")
                .long("no-specializations")
                .action(ArgAction::SetTrue)
                .help("Do not match map/topicref specializations by class"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the result as JSON"),
        )
}

/// Configuration from an optional file overlaid with flags
///
/// # Errors
/// Fails if the config file cannot be loaded or no map file is given
pub fn config_from_args(args: &ArgMatches) -> anyhow::Result<PullTopicsConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => PullTopicsConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PullTopicsConfig::default(),
    };

    if let Some(map) = args.get_one::<PathBuf>("map") {
        config.map_file.clone_from(map);
    }
    if let Some(dir) = args.get_one::<PathBuf>("output-dir") {
        config.output_directory.clone_from(dir);
    }
    if let Some(dir) = args.get_one::<PathBuf>("topics-dir") {
        config.topics_directory = Some(dir.clone());
    }
    if args.get_flag("no-overwrite") {
        config.overwrite = false;
    }
    if let Some(dir) = args.get_one::<PathBuf>("local-repo") {
        config.local_repository = Some(dir.clone());
    }
    if let Some(urls) = args.get_many::<String>("remote-repo") {
        config.remote_repositories.extend(urls.cloned());
    }
    if let Some(secs) = args.get_one::<u64>("http-timeout") {
        config.http_timeout_secs = *secs;
    }
    if let Some(elements) = args.get_many::<String>("element") {
        config.reference_elements = elements.cloned().collect();
    }
    if args.get_flag("no-specializations") {
        config.match_specializations = false;
    }

    if config.map_file.as_os_str().is_empty() {
        bail!("no map file given (use --map or set map-file in the config file)");
    }
    Ok(config)
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over `verbosity` when set.
///
/// # Errors
/// Fails if a global subscriber is already installed
pub fn init_logging(verbosity: u8, json: bool) -> anyhow::Result<()> {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("cannot install logger: {e}"))
}

/// Run the selected subcommand, returning what to print
///
/// # Errors
/// Any configuration or pipeline failure
pub fn run(matches: &ArgMatches) -> anyhow::Result<String> {
    match matches.subcommand() {
        Some(("pull-topics", args)) => {
            let config = config_from_args(args)?;
            let report = pull_topics(&config)
                .with_context(|| format!("pulling topics for {}", config.map_file.display()))?;
            if args.get_flag("json") {
                Ok(serde_json::to_string_pretty(&report)?)
            } else {
                Ok(render_report(&report))
            }
        }
        Some(("plan", args)) => {
            let config = config_from_args(args)?;
            let plan = plan_topics(&config)
                .with_context(|| format!("planning {}", config.map_file.display()))?;
            if args.get_flag("json") {
                Ok(serde_json::to_string_pretty(&plan)?)
            } else {
                Ok(render_plan(&plan))
            }
        }
        Some((other, _)) => bail!("unknown command '{other}'"),
        None => bail!("no command given"),
    }
}

fn render_report(report: &RewriteReport) -> String {
    let mut out = format!(
        "Wrote {} ({} reference{} resolved)\n",
        report.output_file.display(),
        report.references.len(),
        if report.references.len() == 1 { "" } else { "s" }
    );
    for reference in &report.references {
        out.push_str(&format!(
            "  {} -> {} [{}]\n",
            reference.href,
            reference.path.display(),
            reference.digest.short()
        ));
    }
    out
}

fn render_plan(plan: &[PlannedReference]) -> String {
    if plan.is_empty() {
        return "No m2: references found\n".to_string();
    }
    plan.iter()
        .map(|p| format!("  {} -> {} ({})\n", p.href, p.expected_path.display(), p.strategy))
        .collect()
}
