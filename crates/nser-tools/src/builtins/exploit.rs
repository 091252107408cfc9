use crate::registry::{ToolCategory, ToolDefinition};

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        // --batch keeps sqlmap from prompting on stdin
        ToolDefinition::new("sqlmap", ToolCategory::Exploit, "sqlmap")
            .with_default_args(["--batch"])
            .with_description("Automatic SQL injection detection and database takeover")
            .with_install_hint("linux", "apt install sqlmap")
            .with_install_hint("darwin", "brew install sqlmap")
            .with_install_hint("windows", "pip install sqlmap")
            .with_version_flag("--version"),
        ToolDefinition::new("hydra", ToolCategory::Exploit, "hydra")
            .with_description("Parallelized network login cracker supporting dozens of protocols")
            .with_install_hint("linux", "apt install hydra")
            .with_install_hint("darwin", "brew install hydra")
            .with_install_hint(
                "windows",
                "download from https://github.com/vanhauser-thc/thc-hydra",
            ),
    ]
}
