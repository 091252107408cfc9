//! `tools`, `health` and `privileges` commands

use crate::app::App;
use anyhow::{Context, Result};
use nser_tools::{check_privileges, current_platform};

pub fn tools(app: &App) -> Result<()> {
    let platform = current_platform();
    for (category, defs) in app.registry.group_by_category() {
        println!("{}", category.as_str());
        for def in defs {
            let root = if def.needs_root { " [root]" } else { "" };
            println!("  {:<12} {}{root}", def.name, def.description);
            let hint = def.install_hint_for(platform);
            if !hint.is_empty() {
                println!("  {:<12} install: {hint}", "");
            }
        }
    }
    Ok(())
}

pub async fn health(app: &App, json: bool) -> Result<()> {
    let results = app.prober().check_all(&app.registry).await;

    if json {
        let out = serde_json::to_string_pretty(&results).context("Failed to serialize health")?;
        println!("{out}");
        return Ok(());
    }

    let privileges = check_privileges();
    for health in &results {
        if health.installed {
            let version = if health.version.is_empty() {
                "unknown version"
            } else {
                health.version.as_str()
            };
            println!("✅ {:<12} {version} ({})", health.name, health.path);
            if health.needs_root && !privileges.elevated {
                println!("   ⚠️  needs root for full functionality");
            }
        } else {
            println!("❌ {:<12} not installed", health.name);
            if !health.install_hint.is_empty() {
                println!("   install: {}", health.install_hint);
            }
        }
    }

    let installed = results.iter().filter(|h| h.installed).count();
    println!("\n{installed}/{} tools installed", results.len());
    Ok(())
}

pub fn privileges() -> Result<()> {
    let info = check_privileges();
    let user = if info.username.is_empty() {
        "unknown"
    } else {
        info.username.as_str()
    };
    println!("user:     {user}");
    println!("platform: {}", info.platform);
    println!("elevated: {}", info.elevated);
    Ok(())
}
