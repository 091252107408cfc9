use crate::registry::{ToolCategory, ToolDefinition};

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new("subfinder", ToolCategory::Recon, "subfinder")
            .with_default_args(["-silent"])
            .with_description("Fast passive subdomain enumeration tool using multiple sources")
            .with_install_hint(
                "linux",
                "go install -v github.com/projectdiscovery/subfinder/v2/cmd/subfinder@latest",
            )
            .with_install_hint("darwin", "brew install subfinder")
            .with_install_hint(
                "windows",
                "go install -v github.com/projectdiscovery/subfinder/v2/cmd/subfinder@latest",
            )
            .with_version_flag("-version"),
        ToolDefinition::new("amass", ToolCategory::Recon, "amass")
            .with_default_args(["enum", "-passive"])
            .with_description("In-depth attack surface mapping and asset discovery via DNS")
            .with_install_hint("linux", "go install -v github.com/owasp-amass/amass/v4/...@master")
            .with_install_hint("darwin", "brew install amass")
            .with_install_hint("windows", "go install -v github.com/owasp-amass/amass/v4/...@master")
            .with_version_flag("-version"),
        // theHarvester only prints its version in the help banner
        ToolDefinition::new("theharvester", ToolCategory::Recon, "theHarvester")
            .with_default_args(["-b", "all"])
            .with_description("Gathers emails, subdomains, hosts, and open ports from public sources")
            .with_install_hint("linux", "pip install theHarvester")
            .with_install_hint("darwin", "pip install theHarvester")
            .with_install_hint("windows", "pip install theHarvester")
            .with_version_flag("--help"),
        ToolDefinition::new("whois", ToolCategory::Recon, "whois")
            .with_description("Query WHOIS databases for domain registration and ownership info")
            .with_install_hint("linux", "apt install whois")
            .with_install_hint("darwin", "pre-installed on macOS")
            .with_install_hint("windows", "choco install whois"),
        ToolDefinition::new("dig", ToolCategory::Recon, "dig")
            .with_description("DNS lookup utility for querying DNS records")
            .with_install_hint("linux", "apt install dnsutils")
            .with_install_hint("darwin", "pre-installed on macOS")
            .with_install_hint("windows", "choco install bind-toolsonly")
            .with_version_flag("-v"),
    ]
}
