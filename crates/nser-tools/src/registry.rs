//! Registry - Tool registration and discovery
//!
//! This module provides the catalog of external tools nser knows how to
//! launch. Each tool is described declaratively by a [`ToolDefinition`];
//! adding a scanner means adding a definition, not execution code.
//!
//! Registration happens once at startup. Lookups and listings may run
//! concurrently from any number of callers afterwards.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use tracing::debug;

/// Tool category, following the engagement lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    /// Passive and active reconnaissance
    Recon,
    /// Port, service and web scanning
    Scanning,
    /// Exploitation and credential attacks
    Exploit,
}

impl ToolCategory {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recon => "recon",
            Self::Scanning => "scanning",
            Self::Exploit => "exploit",
        }
    }
}

impl std::fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Declarative description of an external tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name
    pub name: String,
    /// Tool category
    pub category: ToolCategory,
    /// Executable looked up on the search path
    pub binary: String,
    /// Flags always placed before user arguments
    #[serde(default)]
    pub default_args: Vec<String>,
    /// Whether the tool needs elevated privileges (advisory)
    #[serde(default)]
    pub needs_root: bool,
    /// Install instructions keyed by platform (`linux`, `darwin`, `windows`)
    #[serde(default)]
    pub install_hint: HashMap<String, String>,
    /// Flag that prints the version; empty means do not probe
    #[serde(default)]
    pub version_flag: String,
    /// One-line summary
    #[serde(default)]
    pub description: String,
}

impl ToolDefinition {
    /// Create a new tool definition
    #[must_use]
    pub fn new(name: impl Into<String>, category: ToolCategory, binary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category,
            binary: binary.into(),
            default_args: Vec::new(),
            needs_root: false,
            install_hint: HashMap::new(),
            version_flag: String::new(),
            description: String::new(),
        }
    }

    /// Set the default arguments
    #[must_use]
    pub fn with_default_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Mark the tool as needing root
    #[must_use]
    pub fn with_needs_root(mut self, needs_root: bool) -> Self {
        self.needs_root = needs_root;
        self
    }

    /// Add an install hint for a platform
    #[must_use]
    pub fn with_install_hint(mut self, platform: impl Into<String>, hint: impl Into<String>) -> Self {
        self.install_hint.insert(platform.into(), hint.into());
        self
    }

    /// Set the version flag
    #[must_use]
    pub fn with_version_flag(mut self, flag: impl Into<String>) -> Self {
        self.version_flag = flag.into();
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Install hint for a platform, empty when none is defined
    #[must_use]
    pub fn install_hint_for(&self, platform: &str) -> &str {
        self.install_hint
            .get(platform)
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Registry for tool definitions
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, ToolDefinition>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool definition.
    ///
    /// # Panics
    ///
    /// Panics if a tool with the same name is already registered. Two
    /// colliding definitions are a build defect, not a runtime condition.
    pub fn register(&self, def: ToolDefinition) {
        let mut tools = self.tools.write().unwrap_or_else(|e| e.into_inner());
        if tools.contains_key(&def.name) {
            panic!("tool {:?} already registered", def.name);
        }
        debug!(tool = %def.name, category = %def.category, "Registering tool");
        tools.insert(def.name.clone(), def);
    }

    /// Get a tool definition by name
    pub fn get(&self, name: &str) -> Result<ToolDefinition> {
        let tools = self.tools.read().unwrap_or_else(|e| e.into_inner());
        tools
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Check if a tool exists
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        let tools = self.tools.read().unwrap_or_else(|e| e.into_inner());
        tools.contains_key(name)
    }

    /// Snapshot of all tool definitions, sorted by name
    #[must_use]
    pub fn list(&self) -> Vec<ToolDefinition> {
        let tools = self.tools.read().unwrap_or_else(|e| e.into_inner());
        let mut defs: Vec<ToolDefinition> = tools.values().cloned().collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Snapshot of all tool definitions grouped by category
    #[must_use]
    pub fn group_by_category(&self) -> BTreeMap<ToolCategory, Vec<ToolDefinition>> {
        let mut groups: BTreeMap<ToolCategory, Vec<ToolDefinition>> = BTreeMap::new();
        for def in self.list() {
            groups.entry(def.category).or_default().push(def);
        }
        groups
    }

    /// Get tool count
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Check if registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
