//! Recommendation scoring and ranking
//!
//! Every (tool, rule) candidate gets exactly four additive terms:
//! the rule priority, an installed bonus, a free-tier bonus, and a
//! low-latency bonus. Candidates are ranked by a stable descending
//! sort, so equal scores keep their enumeration order.

use crate::catalog::{Catalog, Tool};
use crate::config::Config;
use crate::presence::PresenceProbe;
use crate::rules::{Rule, AUTO_DETECT};
use serde::{Deserialize, Serialize};

/// Score bonus for a tool that is installed right now
pub const INSTALLED_BONUS: i32 = 20;

/// Task keywords that resolve the `auto_detect` sentinel to a tool
const AUTO_DETECT_TOOLS: &[(&str, &str)] = &[
    ("claude", "claude"),
    ("gpt", "openai"),
    ("openai", "openai"),
    ("gemini", "gemini"),
    ("ollama", "ollama"),
];

/// A scored (tool, rule) pairing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub rule_id: String,
    pub rule_name: String,
    pub priority: i32,
    pub tool: String,
    pub fallback: Option<String>,
    pub reason: String,
    pub score: i32,
    pub installed: bool,
}

/// Resolve the `auto_detect` sentinel against the task text
///
/// Returns None when the task names no known tool; the candidate is
/// dropped entirely rather than scored.
pub fn resolve_auto_detect(task: &str) -> Option<&'static str> {
    let folded = task.to_lowercase();
    AUTO_DETECT_TOOLS
        .iter()
        .find(|(keyword, _)| folded.contains(keyword))
        .map(|(_, tool)| *tool)
}

/// The additive score for one candidate
pub fn score_tool(tool: &Tool, priority: i32, installed: bool, config: &Config) -> i32 {
    let mut score = priority;
    if installed {
        score += INSTALLED_BONUS;
    }
    if tool.is_free() {
        score += config.free_tier_bonus;
    }
    if tool.is_low_latency() {
        score += config.low_latency_bonus;
    }
    score
}

/// Score every candidate from the matched rules and rank descending
pub fn recommend(
    task: &str,
    matched: &[&Rule],
    catalog: &Catalog,
    probe: &dyn PresenceProbe,
    config: &Config,
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    for rule in matched {
        for name in &rule.recommend.tools {
            let resolved = if name == AUTO_DETECT {
                match resolve_auto_detect(task) {
                    Some(tool) => tool,
                    None => continue,
                }
            } else {
                name.as_str()
            };

            let tool = match catalog.get(resolved) {
                Some(tool) => tool,
                None => continue,
            };

            let installed = probe.is_installed(&tool.name);
            out.push(Recommendation {
                rule_id: rule.id.clone(),
                rule_name: rule.name.clone(),
                priority: rule.priority,
                tool: tool.name.clone(),
                fallback: rule.recommend.fallback.clone(),
                reason: render_reason(rule, tool),
                score: score_tool(tool, rule.priority, installed, config),
                installed,
            });
        }
    }

    out.sort_by(|a, b| b.score.cmp(&a.score));
    out
}

/// Fill the rule's reason template with the tool name
fn render_reason(rule: &Rule, tool: &Tool) -> String {
    match &rule.recommend.reason_template {
        Some(template) => template.replace("{tool_name}", tool.label()),
        None => format!("matched rule '{}'", rule.name),
    }
}
