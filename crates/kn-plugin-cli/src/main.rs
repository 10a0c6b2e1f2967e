use std::collections::HashSet;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgMatches, Command, CommandFactory, FromArgMatches};
use clap_complete::generate;
use colored::Colorize;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kn_plugin_core::config::Config;
use kn_plugin_core::platform;
use kn_plugin_core::{InternalPlugin, Manager, ManagerConfig, Plugin, PluginError, PluginList, Result};

mod args;
use args::{Cli, Commands, ConfigAction, PluginAction, Shell};

const HOST_NAME: &str = "kn";

fn main() -> ExitCode {
    let argv: Vec<OsString> = std::env::args_os().collect();

    // Plugin help needs a manager before clap renders anything
    let mut help_cmd = wants_help(&argv).then(|| {
        let manager = build_manager(&peek_overrides(&argv));
        annotate_plugin_help(Cli::command(), &[], &manager)
    });
    let matches = match help_cmd.as_mut() {
        Some(cmd) => cmd.try_get_matches_from_mut(&argv),
        None => Cli::command().try_get_matches_from(&argv),
    }
    .unwrap_or_else(|e| e.exit());
    let cli = parse_cli(&matches);

    init_tracing(cli.verbose, cli.quiet);

    let overrides = Overrides {
        config_dir: cli.config_dir.clone(),
        plugins_dir: cli.plugins_dir.clone(),
        lookup_in_path: cli.lookup_plugins_in_path,
    };
    let config_dir = resolve_config_dir(overrides.config_dir.clone());

    let result = match cli.command {
        Some(Commands::Plugin { action }) => handle_plugin(action, &overrides),
        Some(Commands::Config { action }) => handle_config(action, &config_dir),
        Some(Commands::Completion { shell }) => {
            handle_completion(shell);
            Ok(())
        }
        Some(Commands::External(args)) => handle_external(&args, &overrides),
        None => {
            let mut cmd = help_cmd.unwrap_or_else(|| {
                annotate_plugin_help(Cli::command(), &[], &build_manager(&overrides))
            });
            cmd.print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn parse_cli(matches: &ArgMatches) -> Cli {
    Cli::from_arg_matches(matches).unwrap_or_else(|e| e.exit())
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_env("KN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .init();
}

// ============================================================================
// Configuration
// ============================================================================

/// Discovery settings given on the command line
#[derive(Debug, Default, Clone)]
struct Overrides {
    config_dir: Option<PathBuf>,
    plugins_dir: Option<PathBuf>,
    lookup_in_path: Option<bool>,
}

fn resolve_config_dir(cli_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = cli_dir {
        return dir;
    }

    if let Ok(dir) = std::env::var("KN_CONFIG_DIR") {
        return PathBuf::from(dir);
    }

    dirs::home_dir()
        .map(|h| h.join(".config").join("kn"))
        .unwrap_or_else(|| PathBuf::from(".kn"))
}

/// Build the manager settings
/// Priority: CLI options > config file > defaults
fn manager_config(overrides: &Overrides) -> ManagerConfig {
    let config_dir = resolve_config_dir(overrides.config_dir.clone());
    let config = Config::load(&config_dir).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable config file");
        Config::default()
    });

    let mut manager_config = ManagerConfig::from_config(&config);
    if let Some(dir) = &overrides.plugins_dir {
        manager_config.plugins_dir = dir.clone();
    }
    if let Some(lookup) = overrides.lookup_in_path {
        manager_config.lookup_in_path = lookup;
    }
    manager_config
}

fn build_manager(overrides: &Overrides) -> Manager {
    let config = manager_config(overrides);
    let internal = internal_plugins(&config);
    Manager::with_internal_plugins(config, internal)
}

/// Plugins compiled into kn
fn internal_plugins(config: &ManagerConfig) -> PluginList {
    let config = config.clone();
    let info = InternalPlugin::new(
        ["info"],
        "Show where kn looks for plugins",
        move |_args: &[OsString]| {
            let dir = platform::expand_home(&config.plugins_dir)
                .unwrap_or_else(|_| config.plugins_dir.clone());
            println!("{} {}", "Plugin directory:".cyan(), dir.display());
            println!("{} {}", "Lookup in PATH:  ".cyan(), config.lookup_in_path);
            println!("{} {}", "Prefixes:        ".cyan(), config.prefixes.join(", "));
            Ok(())
        },
    );

    std::iter::once(Arc::new(info) as Arc<dyn Plugin>).collect()
}

// ============================================================================
// Help
// ============================================================================

fn wants_help(argv: &[OsString]) -> bool {
    argv.len() <= 1
        || argv
            .iter()
            .skip(1)
            .any(|arg| arg == "-h" || arg == "--help" || arg == "help")
}

/// Read discovery flags from raw arguments, before clap runs.
fn peek_overrides(argv: &[OsString]) -> Overrides {
    let value_of = |flag: &str| -> Option<OsString> {
        let with_eq = format!("{}=", flag);
        argv.iter().enumerate().find_map(|(i, arg)| {
            if let Some(value) = arg.to_str().and_then(|a| a.strip_prefix(&with_eq)) {
                Some(OsString::from(value))
            } else if arg == flag {
                argv.get(i + 1).cloned()
            } else {
                None
            }
        })
    };

    let lookup_in_path = argv.iter().filter_map(|arg| arg.to_str()).find_map(|arg| {
        if arg == "--lookup-plugins-in-path" {
            Some(true)
        } else {
            arg.strip_prefix("--lookup-plugins-in-path=")
                .and_then(|v| v.parse().ok())
        }
    });

    Overrides {
        config_dir: value_of("--config-dir").map(PathBuf::from),
        plugins_dir: value_of("--plugins-dir").map(PathBuf::from),
        lookup_in_path,
    }
}

/// Attach a "Plugins:" section to every command that has plugins below it.
fn annotate_plugin_help(cmd: Command, path: &[String], manager: &Manager) -> Command {
    let names: Vec<String> = cmd
        .get_subcommands()
        .map(|sub| sub.get_name().to_string())
        .collect();

    let mut cmd = cmd;
    for name in names {
        let mut sub_path = path.to_vec();
        sub_path.push(name.clone());
        cmd = cmd.mut_subcommand(&name, |sub| annotate_plugin_help(sub, &sub_path, manager));
    }

    match manager.plugins_help(path) {
        Ok(block) if !block.is_empty() => {
            cmd.after_help(format!("{}\n{}", "Plugins:".bold().underline(), block))
        }
        _ => cmd,
    }
}

fn handle_completion(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, HOST_NAME, &mut io::stdout());
}

// ============================================================================
// Plugins
// ============================================================================

fn handle_external(args: &[OsString], overrides: &Overrides) -> Result<()> {
    let manager = build_manager(overrides);
    if manager.handle_plugin_command(args)? {
        return Ok(());
    }

    Err(PluginError::UnknownCommand {
        command: args
            .first()
            .map(|arg| arg.to_string_lossy().into_owned())
            .unwrap_or_default(),
        host: HOST_NAME.to_string(),
    })
}

#[derive(Serialize)]
struct PluginEntry {
    name: String,
    parts: Vec<String>,
    path: Option<PathBuf>,
}

fn handle_plugin(action: PluginAction, overrides: &Overrides) -> Result<()> {
    let manager = build_manager(overrides);

    match action {
        PluginAction::List { long, json } => {
            let plugins = manager.list_plugins()?;

            if json {
                let entries: Vec<PluginEntry> = plugins
                    .iter()
                    .map(|p| PluginEntry {
                        name: p.name(),
                        parts: p.command_parts().to_vec(),
                        path: p.path().map(Path::to_path_buf),
                    })
                    .collect();
                let out = serde_json::to_string_pretty(&entries).map_err(io::Error::from)?;
                println!("{}", out);
                return Ok(());
            }

            if plugins.is_empty() {
                println!(
                    "No plugins found in {}{}",
                    manager.plugins_dir().display(),
                    if manager.lookup_in_path() {
                        " or PATH"
                    } else {
                        ""
                    }
                );
                return Ok(());
            }

            let builtins: HashSet<String> = Cli::command()
                .get_subcommands()
                .map(|sub| sub.get_name().to_string())
                .collect();

            println!();
            println!("{}", "The following plugins are available:".cyan().bold());
            println!();

            let mut seen = HashSet::new();
            for plugin in &plugins {
                let path = plugin.path().map(Path::to_path_buf).unwrap_or_default();
                if long {
                    println!("  {} {}", plugin.name().bold(), path.display().to_string().dimmed());
                } else {
                    println!("  {}", plugin.name().bold());
                }

                for warning in plugin_warnings(&**plugin, &path, &builtins, &mut seen) {
                    println!("    {} {}", "[WARN]".yellow().bold(), warning);
                }
            }
            println!();
        }
    }

    Ok(())
}

/// Problems that would keep a listed plugin from running as expected
fn plugin_warnings(
    plugin: &dyn Plugin,
    path: &Path,
    builtins: &HashSet<String>,
    seen: &mut HashSet<String>,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if !platform::is_executable(path) {
        warnings.push(format!("{} is not executable", path.display()));
    }
    if let Some(first) = plugin.command_parts().first() {
        if builtins.contains(first) && plugin.command_parts().len() == 1 {
            warnings.push(format!("overwrites the built-in command \"{}\"", first));
        }
    }
    if !seen.insert(plugin.name()) {
        warnings.push("is shadowed by an earlier plugin with the same name".to_string());
    }

    warnings
}

fn handle_config(action: ConfigAction, config_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(config_dir)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(PluginError::ConfigKeyNotFound { key });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(config_dir)?;
            config.set(&key, &value)?;
            config.save(config_dir)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load(config_dir)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            let path = Config::path(config_dir);
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            let path = Config::init(config_dir)?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}
