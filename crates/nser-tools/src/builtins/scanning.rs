use crate::registry::{ToolCategory, ToolDefinition};

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        // SYN scans and OS detection need raw sockets
        ToolDefinition::new("nmap", ToolCategory::Scanning, "nmap")
            .with_needs_root(true)
            .with_description("Network discovery and security auditing with port scanning")
            .with_install_hint("linux", "apt install nmap")
            .with_install_hint("darwin", "brew install nmap")
            .with_install_hint("windows", "choco install nmap")
            .with_version_flag("--version"),
        ToolDefinition::new("masscan", ToolCategory::Scanning, "masscan")
            .with_needs_root(true)
            .with_description("Fastest Internet port scanner, supports async SYN scanning")
            .with_install_hint("linux", "apt install masscan")
            .with_install_hint("darwin", "brew install masscan")
            .with_install_hint(
                "windows",
                "download from https://github.com/robertdavidgraham/masscan",
            )
            .with_version_flag("--version"),
        ToolDefinition::new("nuclei", ToolCategory::Scanning, "nuclei")
            .with_default_args(["-silent"])
            .with_description("Template-based vulnerability scanner with community-driven templates")
            .with_install_hint(
                "linux",
                "go install -v github.com/projectdiscovery/nuclei/v3/cmd/nuclei@latest",
            )
            .with_install_hint("darwin", "brew install nuclei")
            .with_install_hint(
                "windows",
                "go install -v github.com/projectdiscovery/nuclei/v3/cmd/nuclei@latest",
            )
            .with_version_flag("-version"),
        ToolDefinition::new("gobuster", ToolCategory::Scanning, "gobuster")
            .with_description("Directory and DNS brute-force scanner for web applications")
            .with_install_hint("linux", "go install github.com/OJ/gobuster/v3@latest")
            .with_install_hint("darwin", "brew install gobuster")
            .with_install_hint("windows", "go install github.com/OJ/gobuster/v3@latest")
            .with_version_flag("version"),
        ToolDefinition::new("ffuf", ToolCategory::Scanning, "ffuf")
            .with_description("Fast web fuzzer for content discovery and parameter brute-forcing")
            .with_install_hint("linux", "go install github.com/ffuf/ffuf/v2@latest")
            .with_install_hint("darwin", "brew install ffuf")
            .with_install_hint("windows", "go install github.com/ffuf/ffuf/v2@latest")
            .with_version_flag("-V"),
        ToolDefinition::new("nikto", ToolCategory::Scanning, "nikto")
            .with_description("Web server scanner that tests for dangerous files and outdated software")
            .with_install_hint("linux", "apt install nikto")
            .with_install_hint("darwin", "brew install nikto")
            .with_install_hint("windows", "download from https://github.com/sullo/nikto")
            .with_version_flag("-Version"),
    ]
}
