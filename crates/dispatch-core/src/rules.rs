//! Routing rules - declarative task-to-tool matching
//!
//! Loaded from ~/.config/dispatch/rules.yaml. A rule pairs a match
//! descriptor (keywords, capabilities, categories, or catch-all) with an
//! ordered list of recommended tools and a priority; higher priority
//! wins. `dispatch init` writes the built-in rule set out for first use.

use crate::catalog::{Catalog, ToolCategory};
use crate::config::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Rule id used as the catch-all fallback when nothing matches
pub const FALLBACK_RULE_ID: &str = "general-chat";

/// Sentinel tool name resolved against the task text at scoring time
pub const AUTO_DETECT: &str = "auto_detect";

/// How a rule decides whether it applies to a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Any keyword is a case-folded substring of the task
    Keyword,
    /// Keyword match first, capability vocabulary second
    KeywordOrCapability,
    /// Same substring semantics as `Keyword`; kept as a distinct type
    /// for rule-file compatibility
    KeywordExact,
    /// Task contains a keyword from the built-in capability vocabulary
    Capability,
    /// Matches on catalog metadata (see `matcher`)
    Category,
    /// Always matches
    Any,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::KeywordOrCapability => "keyword_or_capability",
            Self::KeywordExact => "keyword_exact",
            Self::Capability => "capability",
            Self::Category => "category",
            Self::Any => "any",
        }
    }
}

/// Match descriptor for a rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSpec {
    #[serde(rename = "type")]
    pub match_type: MatchType,

    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub capabilities: Vec<String>,

    #[serde(default)]
    pub categories: Vec<ToolCategory>,
}

/// What a rule recommends when it matches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommend {
    /// Ordered tool names; may contain the `auto_detect` sentinel
    pub tools: Vec<String>,

    #[serde(default)]
    pub fallback: Option<String>,

    /// Template with a {tool_name} slot
    #[serde(default)]
    pub reason_template: Option<String>,
}

/// A routing rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub priority: i32,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(rename = "match")]
    pub match_spec: MatchSpec,

    pub recommend: Recommend,
}

fn default_enabled() -> bool {
    true
}

/// The full rule set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Load rules from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&crate::Paths::new().rules_file())
    }

    /// Load rules from a specific path
    ///
    /// A missing file is fatal; `dispatch init` writes the built-in
    /// rule set out for first use.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules: {}", path.display()))?;

        let rules: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            file: path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(rules)
    }

    /// Save the rule set to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize rules")?;
        crate::write_atomic(path, &content)
    }

    /// Look up a rule by id
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Enabled rules, in file order
    pub fn enabled(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.enabled)
    }

    /// Check structural invariants: unique ids, recommended tools
    /// resolve to catalog entries or the auto_detect sentinel
    pub fn validate(&self, catalog: &Catalog) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(ConfigError::DuplicateRule(rule.id.clone()));
            }

            for tool in &rule.recommend.tools {
                if tool != AUTO_DETECT && catalog.get(tool).is_none() {
                    return Err(ConfigError::UnknownRecommendedTool {
                        rule: rule.id.clone(),
                        tool: tool.clone(),
                    });
                }
            }

            if let Some(fallback) = &rule.recommend.fallback {
                if catalog.get(fallback).is_none() {
                    return Err(ConfigError::UnknownRecommendedTool {
                        rule: rule.id.clone(),
                        tool: fallback.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The built-in rule set used when no rules.yaml exists
    pub fn builtin() -> Self {
        Self {
            rules: vec![
                Rule {
                    id: "explicit-model".into(),
                    name: "Explicitly named model".into(),
                    priority: 30,
                    enabled: true,
                    match_spec: MatchSpec {
                        match_type: MatchType::Keyword,
                        keywords: strings(&["claude", "gpt", "openai", "gemini", "ollama"]),
                        capabilities: vec![],
                        categories: vec![],
                    },
                    recommend: Recommend {
                        tools: strings(&[AUTO_DETECT]),
                        fallback: Some("aichat".into()),
                        reason_template: Some("the task names {tool_name} directly".into()),
                    },
                },
                Rule {
                    id: "coding".into(),
                    name: "Coding tasks".into(),
                    priority: 20,
                    enabled: true,
                    match_spec: MatchSpec {
                        match_type: MatchType::KeywordOrCapability,
                        keywords: strings(&["refactor", "debug", "重构", "修复"]),
                        capabilities: strings(&["code"]),
                        categories: vec![],
                    },
                    recommend: Recommend {
                        tools: strings(&["aider", "claude"]),
                        fallback: Some("aichat".into()),
                        reason_template: Some("{tool_name} works directly in the codebase".into()),
                    },
                },
                Rule {
                    id: "local-only".into(),
                    name: "Keep it on this machine".into(),
                    priority: 15,
                    enabled: true,
                    match_spec: MatchSpec {
                        match_type: MatchType::Keyword,
                        keywords: strings(&["local", "offline", "本地", "private"]),
                        capabilities: vec![],
                        categories: vec![],
                    },
                    recommend: Recommend {
                        tools: strings(&["ollama"]),
                        fallback: None,
                        reason_template: Some("{tool_name} keeps the task on this machine".into()),
                    },
                },
                Rule {
                    id: "summarize".into(),
                    name: "Summarization".into(),
                    priority: 10,
                    enabled: true,
                    match_spec: MatchSpec {
                        match_type: MatchType::Keyword,
                        keywords: strings(&["summarize", "summary", "总结", "摘要", "tldr"]),
                        capabilities: vec![],
                        categories: vec![],
                    },
                    recommend: Recommend {
                        tools: strings(&["fabric", "claude"]),
                        fallback: None,
                        reason_template: Some("{tool_name} condenses long text well".into()),
                    },
                },
                Rule {
                    id: "translate".into(),
                    name: "Translation".into(),
                    priority: 10,
                    enabled: true,
                    match_spec: MatchSpec {
                        match_type: MatchType::Keyword,
                        keywords: strings(&["translate", "翻译"]),
                        capabilities: vec![],
                        categories: vec![],
                    },
                    recommend: Recommend {
                        tools: strings(&["aichat", "gemini"]),
                        fallback: None,
                        reason_template: Some("{tool_name} handles quick translations".into()),
                    },
                },
                Rule {
                    id: "local-tools".into(),
                    name: "Prefer local tools".into(),
                    priority: 5,
                    // Shipped disabled: category rules match whenever the
                    // catalog has a tool in the category, regardless of task
                    enabled: false,
                    match_spec: MatchSpec {
                        match_type: MatchType::Category,
                        keywords: vec![],
                        capabilities: vec![],
                        categories: vec![ToolCategory::Local],
                    },
                    recommend: Recommend {
                        tools: strings(&["ollama"]),
                        fallback: None,
                        reason_template: None,
                    },
                },
                Rule {
                    id: FALLBACK_RULE_ID.into(),
                    name: "General chat".into(),
                    priority: 0,
                    enabled: true,
                    match_spec: MatchSpec {
                        match_type: MatchType::Any,
                        keywords: vec![],
                        capabilities: vec![],
                        categories: vec![],
                    },
                    recommend: Recommend {
                        tools: strings(&["aichat", "claude"]),
                        fallback: Some("aichat".into()),
                        reason_template: Some("{tool_name} handles general questions well".into()),
                    },
                },
            ],
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules_validate_against_builtin_catalog() {
        let catalog = Catalog::builtin();
        let rules = RuleSet::builtin();
        rules.validate(&catalog).unwrap();
        assert!(rules.get(FALLBACK_RULE_ID).is_some());
    }

    #[test]
    fn test_duplicate_rule_ids_rejected() {
        let catalog = Catalog::builtin();
        let mut rules = RuleSet::builtin();
        let dup = rules.rules[0].clone();
        rules.rules.push(dup);

        assert!(matches!(
            rules.validate(&catalog),
            Err(ConfigError::DuplicateRule(_))
        ));
    }

    #[test]
    fn test_unknown_recommended_tool_rejected() {
        let catalog = Catalog::builtin();
        let mut rules = RuleSet::builtin();
        rules.rules[0].recommend.tools.push("no-such-tool".into());

        assert!(matches!(
            rules.validate(&catalog),
            Err(ConfigError::UnknownRecommendedTool { .. })
        ));
    }

    #[test]
    fn test_enabled_skips_disabled_rules() {
        let rules = RuleSet::builtin();
        assert!(rules.enabled().all(|r| r.id != "local-tools"));
    }

    #[test]
    fn test_load_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.yaml");
        std::fs::write(
            &path,
            r#"rules:
  - id: summarize
    name: Summarization
    priority: 10
    match:
      type: keyword
      keywords: ["summarize", "总结"]
    recommend:
      tools: ["fabric", "claude"]
      reason_template: "{tool_name} condenses text"
"#,
        )
        .unwrap();

        let rules = RuleSet::load_from(&path).unwrap();
        assert_eq!(rules.rules.len(), 1);

        let rule = rules.get("summarize").unwrap();
        assert!(rule.enabled);
        assert_eq!(rule.priority, 10);
        assert_eq!(rule.match_spec.match_type, MatchType::Keyword);
        assert_eq!(rule.recommend.tools, vec!["fabric", "claude"]);
    }

    #[test]
    fn test_invalid_yaml_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.yaml");
        std::fs::write(&path, "rules: [broken\n").unwrap();

        let err = RuleSet::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("rules.yaml"));
    }

    #[test]
    fn test_missing_file_is_a_fatal_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RuleSet::load_from(&dir.path().join("rules.yaml")).unwrap_err();
        assert!(err.to_string().contains("rules.yaml"));
    }
}
