//! Health - installation and version probes for registered tools
//!
//! Health is recomputed on every query. Nothing here is cached, and no
//! probe failure ever escalates past an empty field.

use crate::registry::{ToolCategory, ToolDefinition, ToolRegistry};
use crate::resolve::{current_platform, resolve_binary};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Default bound on a single version probe
pub const DEFAULT_VERSION_TIMEOUT: Duration = Duration::from_secs(5);

/// Health prober configuration
#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// How long a `binary <version_flag>` probe may run
    pub version_timeout: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            version_timeout: DEFAULT_VERSION_TIMEOUT,
        }
    }
}

impl HealthConfig {
    /// Set the version probe timeout
    #[must_use]
    pub fn with_version_timeout(mut self, timeout: Duration) -> Self {
        self.version_timeout = timeout;
        self
    }
}

/// Health of a single tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolHealth {
    /// Registry name
    pub name: String,
    /// Tool category
    pub category: ToolCategory,
    /// Whether the binary resolved on the search path
    pub installed: bool,
    /// First non-blank line of the version probe, empty if unknown
    pub version: String,
    /// Resolved path, empty when not installed
    pub path: String,
    /// Advisory privilege requirement
    pub needs_root: bool,
    /// Install hint for the current platform
    pub install_hint: String,
}

/// Probes installation status and versions
#[derive(Debug, Clone, Default)]
pub struct HealthProber {
    config: HealthConfig,
}

impl HealthProber {
    /// Create a prober with the given configuration
    #[must_use]
    pub fn new(config: HealthConfig) -> Self {
        Self { config }
    }

    /// Check every registered tool, sorted by name
    #[instrument(skip(self, registry), fields(tools = registry.len()))]
    pub async fn check_all(&self, registry: &ToolRegistry) -> Vec<ToolHealth> {
        let defs = registry.list();
        let probes = defs.iter().map(|def| self.check(def));
        let mut results = futures::future::join_all(probes).await;
        results.sort_by(|a, b| a.name.cmp(&b.name));
        results
    }

    /// Check a single tool definition
    pub async fn check(&self, def: &ToolDefinition) -> ToolHealth {
        let mut health = ToolHealth {
            name: def.name.clone(),
            category: def.category,
            installed: false,
            version: String::new(),
            path: String::new(),
            needs_root: def.needs_root,
            install_hint: def.install_hint_for(current_platform()).to_string(),
        };

        let Some(path) = resolve_binary(&def.binary) else {
            debug!(tool = %def.name, binary = %def.binary, "Binary not found");
            return health;
        };

        health.installed = true;
        health.path = path.display().to_string();

        if !def.version_flag.is_empty() {
            health.version = self.probe_version(&def.name, &path, &def.version_flag).await;
        }

        health
    }

    async fn probe_version(&self, tool: &str, path: &Path, flag: &str) -> String {
        let mut cmd = Command::new(path);
        cmd.arg(flag)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.config.version_timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                debug!(tool, error = %e, "Version probe failed to run");
                return String::new();
            }
            Err(_) => {
                debug!(tool, timeout = ?self.config.version_timeout, "Version probe timed out");
                return String::new();
            }
        };

        // Exit status is ignored: many tools exit non-zero on a bare version query
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        first_non_blank_line(&stdout)
            .or_else(|| first_non_blank_line(&stderr))
            .map(str::to_string)
            .unwrap_or_default()
    }
}

fn first_non_blank_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_non_blank_line() {
        assert_eq!(first_non_blank_line("\n  \n  v1.2.3  \nextra"), Some("v1.2.3"));
        assert_eq!(first_non_blank_line("   \n\t\n"), None);
        assert_eq!(first_non_blank_line(""), None);
    }

    #[tokio::test]
    async fn test_missing_tool_reports_hint() {
        let registry = ToolRegistry::new();
        registry.register(
            ToolDefinition::new("ghost", ToolCategory::Scanning, "nser-no-such-binary")
                .with_needs_root(true)
                .with_version_flag("--version")
                .with_install_hint(current_platform(), "install ghost"),
        );

        let results = HealthProber::default().check_all(&registry).await;
        assert_eq!(results.len(), 1);
        let health = &results[0];
        assert!(!health.installed);
        assert!(health.path.is_empty());
        assert!(health.version.is_empty());
        assert!(health.needs_root);
        assert_eq!(health.install_hint, "install ghost");
    }

    #[tokio::test]
    async fn test_missing_platform_hint_is_empty() {
        let def = ToolDefinition::new("ghost", ToolCategory::Recon, "nser-no-such-binary")
            .with_install_hint("plan9", "9fans");
        let health = HealthProber::default().check(&def).await;
        assert_eq!(health.install_hint, "");
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Write an executable script and return its absolute path
        fn script(dir: &Path, name: &str, body: &str) -> String {
            let path = dir.join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.display().to_string()
        }

        fn temp_dir(tag: &str) -> std::path::PathBuf {
            let dir = std::env::temp_dir().join(format!("nser-health-{tag}-{}", std::process::id()));
            std::fs::create_dir_all(&dir).unwrap();
            dir
        }

        #[tokio::test]
        async fn test_version_from_stdout() {
            let dir = temp_dir("stdout");
            let bin = script(&dir, "tool", "echo\necho '  tool v2.1.0  '\necho more");
            let def = ToolDefinition::new("tool", ToolCategory::Recon, &bin).with_version_flag("-v");

            let health = HealthProber::default().check(&def).await;
            assert!(health.installed);
            assert_eq!(health.path, bin);
            assert_eq!(health.version, "tool v2.1.0");
            std::fs::remove_dir_all(&dir).unwrap();
        }

        #[tokio::test]
        async fn test_nonzero_exit_still_reports_version() {
            let dir = temp_dir("nonzero");
            let bin = script(&dir, "tool", "echo 'usage: tool 0.9' >&2\nexit 2");
            let def = ToolDefinition::new("tool", ToolCategory::Recon, &bin).with_version_flag("-h");

            let health = HealthProber::default().check(&def).await;
            assert_eq!(health.version, "usage: tool 0.9");
            std::fs::remove_dir_all(&dir).unwrap();
        }

        #[tokio::test]
        async fn test_empty_version_flag_never_invokes() {
            let dir = temp_dir("noflag");
            let marker = dir.join("invoked");
            let bin = script(&dir, "tool", &format!("touch '{}'", marker.display()));
            let def = ToolDefinition::new("tool", ToolCategory::Exploit, &bin);

            let health = HealthProber::default().check(&def).await;
            assert!(health.installed);
            assert!(health.version.is_empty());
            assert!(!marker.exists());
            std::fs::remove_dir_all(&dir).unwrap();
        }

        #[tokio::test]
        async fn test_hanging_probe_times_out() {
            let dir = temp_dir("hang");
            let bin = script(&dir, "tool", "exec sleep 30");
            let def = ToolDefinition::new("tool", ToolCategory::Scanning, &bin).with_version_flag("-v");

            let prober = HealthProber::new(
                HealthConfig::default().with_version_timeout(Duration::from_millis(200)),
            );
            let started = std::time::Instant::now();
            let health = prober.check(&def).await;
            assert!(started.elapsed() < Duration::from_secs(10));
            assert!(health.installed);
            assert!(health.version.is_empty());
            std::fs::remove_dir_all(&dir).unwrap();
        }
    }
}
