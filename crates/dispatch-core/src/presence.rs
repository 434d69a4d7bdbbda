//! Installation presence checks and version probing
//!
//! Presence is a pure boolean: is a runnable binary with the tool's
//! name reachable on PATH. Version detection is best-effort display
//! polish and never feeds into scoring.

use regex::Regex;
use std::process::Command;

/// Sentinel when a tool responds but prints no parseable version
pub const VERSION_INSTALLED: &str = "installed";

/// Sentinel when a tool cannot be probed at all
pub const VERSION_UNKNOWN: &str = "unknown";

/// Seam for presence checks so scoring can be tested without PATH access
pub trait PresenceProbe {
    /// True when a runnable binary of this name is on the search path
    fn is_installed(&self, name: &str) -> bool;
}

/// PATH-backed probe used in production
pub struct PathProbe;

impl PresenceProbe for PathProbe {
    fn is_installed(&self, name: &str) -> bool {
        which::which(name).is_ok()
    }
}

/// Fixed probe for tests and dry runs
pub struct StaticProbe {
    installed: Vec<String>,
}

impl StaticProbe {
    pub fn new<I, S>(installed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            installed: installed.into_iter().map(Into::into).collect(),
        }
    }
}

impl PresenceProbe for StaticProbe {
    fn is_installed(&self, name: &str) -> bool {
        self.installed.iter().any(|n| n == name)
    }
}

/// Best-effort version detection: `--version`, then `-v`, then `--help`
pub fn detect_version(name: &str) -> String {
    let mut responded = false;

    for flag in ["--version", "-v", "--help"] {
        if let Some(output) = run_quiet(name, flag) {
            responded = true;
            if let Some(version) = extract_version(&output) {
                return version;
            }
        }
    }

    if responded {
        VERSION_INSTALLED.to_string()
    } else {
        VERSION_UNKNOWN.to_string()
    }
}

/// Run `name flag` and capture combined output on success
fn run_quiet(name: &str, flag: &str) -> Option<String> {
    Command::new(name)
        .arg(flag)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| {
            let mut text = String::from_utf8_lossy(&o.stdout).to_string();
            text.push_str(&String::from_utf8_lossy(&o.stderr));
            text
        })
}

/// Extract the first semantic-version-like substring
pub fn extract_version(text: &str) -> Option<String> {
    let re = Regex::new(r"\d+\.\d+(?:\.\d+)?").ok()?;
    re.find(text).map(|m| m.as_str().to_string())
}
