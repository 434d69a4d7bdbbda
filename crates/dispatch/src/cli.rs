//! CLI command definitions and handlers

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use dispatch_core::catalog::{Catalog, ToolCategory};
use dispatch_core::config::Config;
use dispatch_core::history::{HistoryRecord, HistoryStore, MatchedRule};
use dispatch_core::matcher;
use dispatch_core::presence::{detect_version, PathProbe, PresenceProbe};
use dispatch_core::rules::RuleSet;
use dispatch_core::score;
use dispatch_core::stats::StatsCache;
use dispatch_core::Paths;

use crate::display;
use crate::run;

/// dispatch - Route free-text tasks to the right AI CLI tool
///
/// "Describe the task. Get the right tool."
#[derive(Parser)]
#[command(name = "dispatch")]
#[command(version)]
#[command(about = "Route free-text tasks to the right AI CLI tool")]
#[command(after_help = "EXAMPLES:\n\
    dispatch route \"summarize this article\"\n\
    dispatch route \"debug the failing build\" --format json\n\
    dispatch run fabric --command pattern --param pattern=summarize\n\
    dispatch list --category coding\n\
    dispatch stats --refresh\n\
    dispatch init")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recommend the best tool for a task
    Route {
        /// Task description (natural language)
        #[arg(trailing_var_arg = true)]
        task: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: Format,

        /// Force a specific tool instead of the top recommendation
        #[arg(long)]
        tool: Option<String>,
    },

    /// List the tool catalog with install status
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Only show tools in this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Show one tool in detail
    Info {
        /// Tool name
        tool: String,
    },

    /// Run a tool, optionally through one of its command templates
    Run {
        /// Tool name
        tool: String,

        /// Named command template from the catalog
        #[arg(long)]
        command: Option<String>,

        /// Template parameter, key=value (repeatable)
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Extra arguments passed through after --
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Show routing history
    History {
        /// Most recent records to show
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Delete all history
        #[arg(long)]
        clear: bool,
    },

    /// Show routing statistics
    Stats {
        /// Recompute even if the cached snapshot is fresh
        #[arg(long)]
        refresh: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check configuration and tool availability
    Doctor,

    /// Write default configuration files
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Route { task, format, tool } => cmd_route(task, format, tool),
        Commands::List { json, category } => cmd_list(json, category),
        Commands::Info { tool } => cmd_info(&tool),
        Commands::Run {
            tool,
            command,
            params,
            args,
        } => run::cmd_run(&tool, command.as_deref(), &params, &args),
        Commands::History { limit, json, clear } => cmd_history(limit, json, clear),
        Commands::Stats { refresh, json } => cmd_stats(refresh, json),
        Commands::Doctor => cmd_doctor(),
        Commands::Init { force } => cmd_init(force),
    }
}

fn cmd_route(task_words: Vec<String>, format: Format, forced: Option<String>) -> Result<()> {
    let task = task_words.join(" ");
    if task.trim().is_empty() {
        eprintln!("{} route needs a task description", "error:".red());
        eprintln!("Usage: dispatch route <task...>");
        std::process::exit(1);
    }

    let catalog = Catalog::load()?;
    let rules = RuleSet::load()?;
    rules.validate(&catalog)?;
    let config = Config::load()?;

    if let Some(name) = &forced {
        if catalog.get(name).is_none() {
            eprintln!("{} unknown tool: {}", "error:".red(), name);
            eprintln!("Run {} to see the catalog", "dispatch list".bold());
            std::process::exit(1);
        }
    }

    let probe = PathProbe;
    let matched = matcher::match_rules(&task, &rules, &catalog);
    let recommendations = score::recommend(&task, &matched, &catalog, &probe, &config);

    let selected = forced
        .clone()
        .or_else(|| recommendations.first().map(|r| r.tool.clone()));
    let matched_rule = recommendations.first().map(|r| MatchedRule {
        id: r.rule_id.clone(),
        name: r.rule_name.clone(),
    });

    // A failed history write should not hide the recommendation
    match HistoryStore::new() {
        Ok(store) => {
            let record = HistoryRecord::new(
                &task,
                matched_rule.clone(),
                recommendations.clone(),
                selected,
                true,
            );
            if let Err(e) = store.append(record) {
                tracing::warn!("failed to record history: {e:#}");
            }
        }
        Err(e) => tracing::warn!("failed to open history store: {e:#}"),
    }

    match format {
        Format::Json => {
            let payload = serde_json::json!({
                "task": task,
                "matched_rule": matched_rule,
                "recommendations": recommendations,
                "timestamp": chrono::Utc::now(),
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Format::Text => display::print_route(&task, &recommendations, forced.as_deref()),
    }

    Ok(())
}

fn cmd_list(json: bool, category: Option<String>) -> Result<()> {
    let catalog = Catalog::load()?;
    let probe = PathProbe;

    let filter = match category.as_deref() {
        Some(raw) => match ToolCategory::from_str(raw) {
            Some(c) => Some(c),
            None => {
                eprintln!("{} unknown category: {}", "error:".red(), raw);
                eprintln!(
                    "Known categories: {}",
                    ToolCategory::all()
                        .iter()
                        .map(|c| c.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                std::process::exit(1);
            }
        },
        None => None,
    };

    let tools: Vec<_> = catalog
        .tools
        .iter()
        .filter(|t| filter.map_or(true, |c| t.category == c))
        .map(|t| (t, probe.is_installed(&t.name)))
        .collect();

    if json {
        let payload: Vec<_> = tools
            .iter()
            .map(|(tool, installed)| {
                serde_json::json!({
                    "name": tool.name,
                    "display_name": tool.label(),
                    "description": tool.description,
                    "category": tool.category,
                    "cost": tool.cost,
                    "latency": tool.latency,
                    "installed": installed,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    display::print_catalog(&tools);
    Ok(())
}

fn cmd_info(name: &str) -> Result<()> {
    let catalog = Catalog::load()?;
    let tool = match catalog.get(name) {
        Some(tool) => tool,
        None => {
            eprintln!("{} unknown tool: {}", "error:".red(), name);
            eprintln!("Run {} to see the catalog", "dispatch list".bold());
            std::process::exit(1);
        }
    };

    let probe = PathProbe;
    let installed = probe.is_installed(&tool.name);
    let version = if installed {
        detect_version(&tool.name)
    } else {
        String::new()
    };

    display::print_tool_info(tool, installed, &version);
    Ok(())
}

fn cmd_history(limit: usize, json: bool, clear: bool) -> Result<()> {
    let store = HistoryStore::new()?;

    if clear {
        store.clear()?;
        println!("{} history cleared", "ok".green());
        return Ok(());
    }

    let records = store.recent(limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    display::print_history(&records);
    Ok(())
}

fn cmd_stats(refresh: bool, json: bool) -> Result<()> {
    let config = Config::load()?;
    let store = HistoryStore::new()?;
    let records = store.load()?;

    let cache = StatsCache::new()?;
    let stats = cache.load_or_compute(&records, config.stats_ttl_secs, refresh)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    display::print_stats(&stats);
    Ok(())
}

fn cmd_doctor() -> Result<()> {
    let paths = Paths::new();

    println!("{}", "Dispatch Doctor".bold());
    println!("================");
    println!();

    let mut issues = 0;

    println!("{}", "Checking configuration...".bold());
    let catalog = match Catalog::load() {
        Ok(catalog) => {
            println!("{} {}", "ok".green(), paths.tools_file().display());
            catalog
        }
        Err(e) => {
            println!("{}  {e:#}", "!".yellow());
            issues += 1;
            // Keep probing with the built-in catalog so the rest of the
            // report is still useful
            Catalog::builtin()
        }
    };

    match RuleSet::load() {
        Ok(rules) => match rules.validate(&catalog) {
            Ok(()) => println!("{} {}", "ok".green(), paths.rules_file().display()),
            Err(e) => {
                println!("{}  {}", "!".yellow(), e);
                issues += 1;
            }
        },
        Err(e) => {
            println!("{}  {e:#}", "!".yellow());
            issues += 1;
        }
    }

    if paths.config_file().exists() {
        println!("{} {}", "ok".green(), paths.config_file().display());
    } else {
        println!(
            "{} {} {}",
            "-".dimmed(),
            paths.config_file().display(),
            "(using defaults)".dimmed()
        );
    }

    println!();
    println!("{}", "Checking tools...".bold());
    let probe = PathProbe;
    for tool in &catalog.tools {
        if probe.is_installed(&tool.name) {
            println!(
                "{} {} ({})",
                "ok".green(),
                tool.name,
                detect_version(&tool.name)
            );
        } else {
            println!("{}  {} - not found", "!".yellow(), tool.name);
            issues += 1;
        }
    }

    println!();
    println!("{}", "Checking data directory...".bold());
    if paths.data.exists() {
        println!("{} {}", "ok".green(), paths.data.display());
    } else {
        println!(
            "{} {} - will be created on first use",
            "-".dimmed(),
            paths.data.display()
        );
    }

    println!();
    if issues == 0 {
        println!("{} All checks passed!", "ok".green());
    } else {
        println!("{}  {} issues found", "!".yellow(), issues);
        println!();
        println!(
            "Run {} to write default configuration files.",
            "dispatch init".bold()
        );
        println!(
            "Missing tools are fine - they just lose the installed bonus. \
             Run {} for install commands.",
            "dispatch info <tool>".bold()
        );
    }

    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let paths = Paths::new();

    let targets = [
        ("tools.yaml", paths.tools_file()),
        ("rules.yaml", paths.rules_file()),
        ("config.yaml", paths.config_file()),
    ];

    for (name, path) in &targets {
        if path.exists() && !force {
            println!(
                "{} {} exists, skipping (use --force to overwrite)",
                "-".dimmed(),
                path.display()
            );
            continue;
        }

        match *name {
            "tools.yaml" => Catalog::builtin().save_to(path)?,
            "rules.yaml" => RuleSet::builtin().save_to(path)?,
            "config.yaml" => Config::default().save_to(path)?,
            _ => unreachable!(),
        }
        println!("{} wrote {}", "ok".green(), path.display());
    }

    Ok(())
}
