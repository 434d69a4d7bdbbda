//! Tool invocation - argv construction and process exec
//!
//! Arguments are always built as a list and handed to Command::args;
//! template parameter values never pass through a shell.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::collections::HashMap;
use std::process::Command;

use dispatch_core::catalog::Catalog;
use dispatch_core::history::{HistoryRecord, HistoryStore};
use dispatch_core::presence::{PathProbe, PresenceProbe};
use dispatch_core::template;

/// Parse repeated key=value parameters
pub fn parse_params(raw: &[String]) -> Result<HashMap<String, String>> {
    let mut params = HashMap::new();
    for entry in raw {
        match entry.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                params.insert(key.to_string(), value.to_string());
            }
            _ => bail!("Invalid --param '{}': expected KEY=VALUE", entry),
        }
    }
    Ok(params)
}

pub fn cmd_run(
    tool_name: &str,
    command: Option<&str>,
    raw_params: &[String],
    args: &[String],
) -> Result<()> {
    let catalog = Catalog::load()?;
    let tool = match catalog.get(tool_name) {
        Some(tool) => tool,
        None => {
            eprintln!("{} unknown tool: {}", "error:".red(), tool_name);
            eprintln!("Run {} to see the catalog", "dispatch list".bold());
            std::process::exit(1);
        }
    };

    let probe = PathProbe;
    if !probe.is_installed(&tool.name) {
        eprintln!("{} {} is not installed", "error:".red(), tool.name);
        if let Some(install) = &tool.install {
            eprintln!("Install with: {}", install.command.bold());
        }
        std::process::exit(1);
    }

    let argv = build_argv(tool_name, tool, command, raw_params, args)?;
    tracing::debug!(?argv, "invoking tool");

    let status = Command::new(&argv[0])
        .args(&argv[1..])
        .status()
        .with_context(|| format!("Failed to start {}", argv[0]))?;

    // Record the invocation outcome
    match HistoryStore::new() {
        Ok(store) => {
            let record = HistoryRecord::new(
                &format!("run {}", tool.name),
                None,
                Vec::new(),
                Some(tool.name.clone()),
                status.success(),
            );
            if let Err(e) = store.append(record) {
                tracing::warn!("failed to record history: {e:#}");
            }
        }
        Err(e) => tracing::warn!("failed to open history store: {e:#}"),
    }

    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }
    Ok(())
}

/// Build the argument vector for an invocation
fn build_argv(
    tool_name: &str,
    tool: &dispatch_core::catalog::Tool,
    command: Option<&str>,
    raw_params: &[String],
    args: &[String],
) -> Result<Vec<String>> {
    let mut argv = match command {
        Some(name) => {
            let spec = tool
                .command(name)
                .with_context(|| format!("Tool '{}' has no command '{}'", tool_name, name))?;
            let params = parse_params(raw_params)?;
            template::render_argv(&spec.syntax, &params)?
        }
        None => vec![tool.name.clone()],
    };

    argv.extend(args.iter().cloned());
    Ok(argv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_params() {
        let params = parse_params(&["pattern=summarize".into(), "model=llama3".into()]).unwrap();
        assert_eq!(params.get("pattern"), Some(&"summarize".to_string()));
        assert_eq!(params.get("model"), Some(&"llama3".to_string()));
    }

    #[test]
    fn test_parse_params_keeps_equals_in_value() {
        let params = parse_params(&["prompt=a=b".into()]).unwrap();
        assert_eq!(params.get("prompt"), Some(&"a=b".to_string()));
    }

    #[test]
    fn test_parse_params_rejects_bad_entries() {
        assert!(parse_params(&["no-equals".into()]).is_err());
        assert!(parse_params(&["=value".into()]).is_err());
    }

    #[test]
    fn test_build_argv_with_template() {
        let catalog = Catalog::builtin();
        let fabric = catalog.get("fabric").unwrap();

        let argv = build_argv(
            "fabric",
            fabric,
            Some("pattern"),
            &["pattern=summarize".into()],
            &[],
        )
        .unwrap();
        assert_eq!(argv, vec!["fabric", "--pattern", "summarize"]);
    }

    #[test]
    fn test_build_argv_passthrough() {
        let catalog = Catalog::builtin();
        let fabric = catalog.get("fabric").unwrap();

        let argv = build_argv("fabric", fabric, None, &[], &["--help".into()]).unwrap();
        assert_eq!(argv, vec!["fabric", "--help"]);
    }

    #[test]
    fn test_build_argv_unknown_command() {
        let catalog = Catalog::builtin();
        let fabric = catalog.get("fabric").unwrap();

        assert!(build_argv("fabric", fabric, Some("bogus"), &[], &[]).is_err());
    }
}
