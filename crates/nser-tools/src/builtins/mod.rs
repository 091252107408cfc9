//! Builtins - The shipped tool catalog
//!
//! Definitions are grouped by category:
//! - Recon: subfinder, amass, theharvester, whois, dig
//! - Scanning: nmap, masscan, nuclei, gobuster, ffuf, nikto
//! - Exploit: sqlmap, hydra

mod exploit;
mod recon;
mod scanning;

use crate::registry::ToolRegistry;

/// Register every built-in tool definition with the registry.
///
/// # Panics
///
/// Panics if any built-in name is already registered.
pub fn register_builtins(registry: &ToolRegistry) {
    for def in recon::definitions()
        .into_iter()
        .chain(scanning::definitions())
        .chain(exploit::definitions())
    {
        registry.register(def);
    }
}
