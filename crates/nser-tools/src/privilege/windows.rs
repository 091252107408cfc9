use super::{net_session_means_admin, PrivilegeInfo};
use std::process::{Command, Stdio};
use tracing::debug;

pub(super) fn detect() -> PrivilegeInfo {
    let elevated = match Command::new("net")
        .arg("session")
        .stdin(Stdio::null())
        .output()
    {
        Ok(out) => {
            let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&out.stderr));
            net_session_means_admin(out.status.success(), &text)
        }
        Err(e) => {
            debug!(error = %e, "net session probe failed");
            false
        }
    };

    PrivilegeInfo {
        elevated,
        username: std::env::var("USERNAME").unwrap_or_default(),
        platform: "windows".to_string(),
    }
}
