//! Terminal rendering for dispatch output

use colored::Colorize;
use dispatch_core::catalog::Tool;
use dispatch_core::history::HistoryRecord;
use dispatch_core::score::Recommendation;
use dispatch_core::stats::StatsSnapshot;

/// Render a route result: best recommendation plus alternatives
pub fn print_route(task: &str, recommendations: &[Recommendation], forced: Option<&str>) {
    println!("{} {}", "Task:".bold(), task);
    println!();

    if recommendations.is_empty() {
        println!("{}", "No matching tool for this task.".yellow());
        println!(
            "Run {} to see what dispatch knows about.",
            "dispatch list".bold()
        );
        return;
    }

    if let Some(name) = forced {
        println!(
            "{} {} {}",
            "Selected:".bold(),
            name.cyan().bold(),
            "(forced)".dimmed()
        );
        println!();
    }

    let best = &recommendations[0];
    println!(
        "{} {}  {}",
        "Recommended:".bold(),
        best.tool.cyan().bold(),
        format!("score {}", best.score).dimmed()
    );
    println!(
        "  {:10} {}",
        "installed".dimmed(),
        if best.installed {
            "yes".green()
        } else {
            "no".red()
        }
    );
    println!(
        "  {:10} {} (priority {})",
        "rule".dimmed(),
        best.rule_name,
        best.priority
    );
    println!("  {:10} {}", "reason".dimmed(), best.reason);
    if let Some(fallback) = &best.fallback {
        println!("  {:10} {}", "fallback".dimmed(), fallback);
    }

    if recommendations.len() > 1 {
        println!();
        println!("{}", "Alternatives:".bold());
        for rec in &recommendations[1..] {
            let status = if rec.installed {
                "installed".green()
            } else {
                "not installed".dimmed()
            };
            println!(
                "  {:12} {:<4} {}",
                rec.tool.cyan(),
                rec.score,
                status
            );
        }
    }
}

/// Render the catalog with install status
pub fn print_catalog(tools: &[(&Tool, bool)]) {
    println!("{}", "Tool Catalog".bold());
    println!("============");
    println!();

    let mut installed = 0;
    let mut missing = 0;

    for (tool, present) in tools {
        if *present {
            println!(
                "{} {} [{}] - {}",
                "ok".green(),
                tool.name.cyan(),
                tool.category,
                tool.description
            );
            installed += 1;
        } else {
            println!(
                "{}  {} [{}] - {} {}",
                "!".yellow(),
                tool.name.dimmed(),
                tool.category,
                tool.description,
                "(not installed)".red()
            );
            missing += 1;
        }
    }

    println!();
    println!("{} installed, {} missing", installed, missing);
}

/// Render one tool in detail
pub fn print_tool_info(tool: &Tool, installed: bool, version: &str) {
    println!("{} ({})", tool.label().bold(), tool.name);
    println!("{}", "=".repeat(tool.label().len() + tool.name.len() + 3));
    println!();
    println!("  {:10} {}", "category".dimmed(), tool.category);
    println!("  {:10} {}", "cost".dimmed(), tool.cost.as_str());
    println!("  {:10} {}", "latency".dimmed(), tool.latency.as_str());
    println!(
        "  {:10} {}",
        "status".dimmed(),
        if installed {
            format!("installed ({})", version).green().to_string()
        } else {
            "not installed".red().to_string()
        }
    );
    if let Some(url) = &tool.url {
        println!("  {:10} {}", "url".dimmed(), url);
    }
    if !tool.description.is_empty() {
        println!();
        println!("  {}", tool.description);
    }

    if let Some(install) = &tool.install {
        println!();
        println!("{}", "Install".bold());
        println!("  {}", install.command);
        if let Some(verify) = &install.verify {
            println!("  verify: {}", verify.dimmed());
        }
    }

    if !tool.commands.is_empty() {
        println!();
        println!("{}", "Commands".bold());
        for command in &tool.commands {
            println!(
                "  {:12} {}  {}",
                command.name.cyan(),
                command.syntax,
                command.description.dimmed()
            );
        }
    }
}

/// Render recent history, newest first
pub fn print_history(records: &[HistoryRecord]) {
    if records.is_empty() {
        println!("{}", "No routing history yet.".dimmed());
        return;
    }

    for record in records {
        let outcome = if record.successful {
            "ok".green()
        } else {
            "fail".red()
        };
        let tool = record.selected_tool.as_deref().unwrap_or("-");
        let rule = record
            .matched_rule
            .as_ref()
            .map(|r| r.id.as_str())
            .unwrap_or("-");

        println!(
            "{}  {:4} {} {} {}",
            record
                .timestamp
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .dimmed(),
            outcome,
            record.task,
            format!("-> {}", tool).cyan(),
            format!("({})", rule).dimmed()
        );
    }
}

/// Render a stats snapshot
pub fn print_stats(stats: &StatsSnapshot) {
    println!("{}", "Routing Statistics".bold());
    println!("==================");
    println!();
    println!("  {:14} {}", "total routes".dimmed(), stats.total_routes);
    println!(
        "  {:14} {:.0}% ({}/{})",
        "success rate".dimmed(),
        stats.success_rate(),
        stats.successful,
        stats.total_routes
    );
    println!(
        "  {:14} {}s ago",
        "generated".dimmed(),
        stats.age_secs().max(0)
    );

    if !stats.by_tool.is_empty() {
        println!();
        println!("{}", "By tool".bold());
        let mut by_tool: Vec<_> = stats.by_tool.iter().collect();
        by_tool.sort_by(|a, b| b.1.cmp(a.1));
        for (tool, count) in by_tool {
            println!("  {:12} {}", tool.cyan(), count);
        }
    }

    if !stats.by_rule.is_empty() {
        println!();
        println!("{}", "By rule".bold());
        let mut by_rule: Vec<_> = stats.by_rule.iter().collect();
        by_rule.sort_by(|a, b| b.1.cmp(a.1));
        for (rule, count) in by_rule {
            println!("  {:16} {}", rule, count);
        }
    }

    if !stats.by_day.is_empty() {
        println!();
        println!("{}", "Recent days".bold());
        for (day, count) in stats.by_day.iter().rev().take(7) {
            println!("  {:12} {}", day, count);
        }
    }
}
