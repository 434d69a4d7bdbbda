//! Tool catalog - the external AI CLI tools dispatch knows about
//!
//! Loaded from ~/.config/dispatch/tools.yaml. `dispatch init` writes
//! the built-in catalog of common tools out for first use; after that
//! the file is the single source of truth.

use crate::config::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Tool category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    /// Hosted AI assistants
    Ai,
    /// Runs models on this machine
    Local,
    /// Prompt pipelines and automation
    Workflow,
    /// Works directly in a codebase
    Coding,
    Other,
}

impl ToolCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Local => "local",
            Self::Workflow => "workflow",
            Self::Coding => "coding",
            Self::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ai" => Some(Self::Ai),
            "local" => Some(Self::Local),
            "workflow" => Some(Self::Workflow),
            "coding" => Some(Self::Coding),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::Ai,
            Self::Local,
            Self::Workflow,
            Self::Coding,
            Self::Other,
        ]
    }
}

impl std::fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pricing model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cost {
    Free,
    Freemium,
    Paid,
}

impl Cost {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Freemium => "freemium",
            Self::Paid => "paid",
        }
    }
}

/// Typical response latency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Latency {
    Low,
    Medium,
    High,
}

impl Latency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// How to install a tool and prove the install worked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallSpec {
    /// Shell command that installs the tool
    pub command: String,

    /// Command that verifies the install
    #[serde(default)]
    pub verify: Option<String>,
}

/// A named invocation a tool supports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCommand {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Invocation template with {placeholder} slots,
    /// e.g. "fabric --pattern {pattern}"
    pub syntax: String,
}

/// A tool catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Unique id; also the executable name looked up on PATH
    pub name: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub description: String,

    pub category: ToolCategory,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_cost")]
    pub cost: Cost,

    #[serde(default = "default_latency")]
    pub latency: Latency,

    #[serde(default)]
    pub install: Option<InstallSpec>,

    #[serde(default)]
    pub commands: Vec<ToolCommand>,
}

fn default_cost() -> Cost {
    Cost::Paid
}

fn default_latency() -> Latency {
    Latency::Medium
}

impl Tool {
    /// Human-facing name, falling back to the id
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Look up a command template by name
    pub fn command(&self, name: &str) -> Option<&ToolCommand> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn is_free(&self) -> bool {
        matches!(self.cost, Cost::Free)
    }

    pub fn is_low_latency(&self) -> bool {
        matches!(self.latency, Latency::Low)
    }
}

/// The full tool catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub tools: Vec<Tool>,
}

impl Catalog {
    /// Load the catalog from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&crate::Paths::new().tools_file())
    }

    /// Load the catalog from a specific path
    ///
    /// A missing file is fatal; `dispatch init` writes the built-in
    /// catalog out for first use.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read tool catalog: {}", path.display()))?;

        let catalog: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            file: path.display().to_string(),
            message: e.to_string(),
        })?;

        catalog.validate()?;
        Ok(catalog)
    }

    /// Save the catalog to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize tool catalog")?;
        crate::write_atomic(path, &content)
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Tools in a given category, in catalog order
    pub fn in_category(&self, category: ToolCategory) -> Vec<&Tool> {
        self.tools.iter().filter(|t| t.category == category).collect()
    }

    /// Check structural invariants (unique tool names)
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for tool in &self.tools {
            if !seen.insert(tool.name.as_str()) {
                return Err(ConfigError::DuplicateTool(tool.name.clone()));
            }
        }
        Ok(())
    }

    /// The built-in catalog used when no tools.yaml exists
    pub fn builtin() -> Self {
        Self {
            tools: vec![
                Tool {
                    name: "claude".into(),
                    display_name: Some("Claude Code".into()),
                    description: "Anthropic's agentic coding assistant".into(),
                    category: ToolCategory::Coding,
                    url: Some("https://claude.com/claude-code".into()),
                    cost: Cost::Paid,
                    latency: Latency::Medium,
                    install: Some(InstallSpec {
                        command: "npm install -g @anthropic-ai/claude-code".into(),
                        verify: Some("claude --version".into()),
                    }),
                    commands: vec![ToolCommand {
                        name: "prompt".into(),
                        description: "One-shot prompt, print the answer".into(),
                        syntax: "claude -p {prompt}".into(),
                    }],
                },
                Tool {
                    name: "openai".into(),
                    display_name: Some("OpenAI CLI".into()),
                    description: "Official OpenAI command-line client".into(),
                    category: ToolCategory::Ai,
                    url: Some("https://platform.openai.com".into()),
                    cost: Cost::Paid,
                    latency: Latency::Medium,
                    install: Some(InstallSpec {
                        command: "pip install openai".into(),
                        verify: Some("openai --version".into()),
                    }),
                    commands: vec![],
                },
                Tool {
                    name: "gemini".into(),
                    display_name: Some("Gemini CLI".into()),
                    description: "Google's Gemini in the terminal".into(),
                    category: ToolCategory::Ai,
                    url: Some("https://github.com/google-gemini/gemini-cli".into()),
                    cost: Cost::Free,
                    latency: Latency::Medium,
                    install: Some(InstallSpec {
                        command: "npm install -g @google/gemini-cli".into(),
                        verify: Some("gemini --version".into()),
                    }),
                    commands: vec![ToolCommand {
                        name: "prompt".into(),
                        description: "One-shot prompt".into(),
                        syntax: "gemini -p {prompt}".into(),
                    }],
                },
                Tool {
                    name: "fabric".into(),
                    display_name: Some("Fabric".into()),
                    description: "Prompt pattern framework for everyday text work".into(),
                    category: ToolCategory::Workflow,
                    url: Some("https://github.com/danielmiessler/fabric".into()),
                    cost: Cost::Free,
                    latency: Latency::Low,
                    install: Some(InstallSpec {
                        command: "go install github.com/danielmiessler/fabric@latest".into(),
                        verify: Some("fabric --version".into()),
                    }),
                    commands: vec![
                        ToolCommand {
                            name: "pattern".into(),
                            description: "Run a named pattern over stdin".into(),
                            syntax: "fabric --pattern {pattern}".into(),
                        },
                        ToolCommand {
                            name: "summarize".into(),
                            description: "Summarize stdin".into(),
                            syntax: "fabric --pattern summarize".into(),
                        },
                    ],
                },
                Tool {
                    name: "aichat".into(),
                    display_name: Some("AIChat".into()),
                    description: "All-in-one chat client for many providers".into(),
                    category: ToolCategory::Ai,
                    url: Some("https://github.com/sigoden/aichat".into()),
                    cost: Cost::Free,
                    latency: Latency::Low,
                    install: Some(InstallSpec {
                        command: "cargo install aichat".into(),
                        verify: Some("aichat --version".into()),
                    }),
                    commands: vec![ToolCommand {
                        name: "ask".into(),
                        description: "Ask a single question".into(),
                        syntax: "aichat {prompt}".into(),
                    }],
                },
                Tool {
                    name: "ollama".into(),
                    display_name: Some("Ollama".into()),
                    description: "Run open models locally".into(),
                    category: ToolCategory::Local,
                    url: Some("https://ollama.com".into()),
                    cost: Cost::Free,
                    latency: Latency::Low,
                    install: Some(InstallSpec {
                        command: "curl -fsSL https://ollama.com/install.sh | sh".into(),
                        verify: Some("ollama --version".into()),
                    }),
                    commands: vec![ToolCommand {
                        name: "run".into(),
                        description: "Prompt a local model".into(),
                        syntax: "ollama run {model} {prompt}".into(),
                    }],
                },
                Tool {
                    name: "aider".into(),
                    display_name: Some("Aider".into()),
                    description: "AI pair programming in the terminal".into(),
                    category: ToolCategory::Coding,
                    url: Some("https://aider.chat".into()),
                    cost: Cost::Free,
                    latency: Latency::Medium,
                    install: Some(InstallSpec {
                        command: "pip install aider-install && aider-install".into(),
                        verify: Some("aider --version".into()),
                    }),
                    commands: vec![ToolCommand {
                        name: "message".into(),
                        description: "Apply one change and exit".into(),
                        syntax: "aider --message {message}".into(),
                    }],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin();
        catalog.validate().unwrap();
        assert!(catalog.get("claude").is_some());
        assert!(catalog.get("ollama").is_some());
        assert!(catalog.get("nonexistent").is_none());
    }

    #[test]
    fn test_duplicate_tool_names_rejected() {
        let mut catalog = Catalog::builtin();
        let dup = catalog.tools[0].clone();
        catalog.tools.push(dup);

        assert!(matches!(
            catalog.validate(),
            Err(ConfigError::DuplicateTool(_))
        ));
    }

    #[test]
    fn test_load_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tools.yaml");
        std::fs::write(
            &path,
            r#"tools:
  - name: fabric
    description: pattern runner
    category: workflow
    cost: free
    latency: low
"#,
        )
        .unwrap();

        let catalog = Catalog::load_from(&path).unwrap();
        assert_eq!(catalog.tools.len(), 1);

        let fabric = catalog.get("fabric").unwrap();
        assert!(fabric.is_free());
        assert!(fabric.is_low_latency());
        assert_eq!(fabric.label(), "fabric");
    }

    #[test]
    fn test_missing_file_is_a_fatal_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load_from(&dir.path().join("tools.yaml")).unwrap_err();
        assert!(err.to_string().contains("tools.yaml"));
        assert!(err.to_string().contains("dispatch init"));
    }

    #[test]
    fn test_invalid_yaml_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tools.yaml");
        std::fs::write(&path, "tools: [oops\n").unwrap();

        let err = Catalog::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("tools.yaml"));
    }

    #[test]
    fn test_category_round_trip() {
        for category in ToolCategory::all() {
            assert_eq!(ToolCategory::from_str(category.as_str()), Some(*category));
        }
        assert_eq!(ToolCategory::from_str("bogus"), None);
    }

    #[test]
    fn test_command_lookup() {
        let catalog = Catalog::builtin();
        let fabric = catalog.get("fabric").unwrap();
        assert!(fabric.command("pattern").is_some());
        assert!(fabric.command("bogus").is_none());
    }
}
