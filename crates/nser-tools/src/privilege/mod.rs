//! Privilege detection for the current process

use serde::{Deserialize, Serialize};

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

/// Privilege report for the current process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeInfo {
    /// Root on unix, administrator on Windows
    pub elevated: bool,
    /// Current user name, empty when it cannot be determined
    pub username: String,
    /// `unix` or `windows`
    pub platform: String,
}

/// Detect whether the current process runs elevated.
///
/// Never fails: probe errors report `elevated = false` and an empty username.
#[must_use]
pub fn check_privileges() -> PrivilegeInfo {
    #[cfg(unix)]
    {
        unix::detect()
    }
    #[cfg(windows)]
    {
        windows::detect()
    }
    #[cfg(not(any(unix, windows)))]
    {
        PrivilegeInfo {
            elevated: false,
            username: String::new(),
            platform: std::env::consts::OS.to_string(),
        }
    }
}

/// Interpret the result of the Windows `net session` probe.
///
/// Only an administrator can list sessions; everyone else gets an
/// "Access is denied" message.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn net_session_means_admin(succeeded: bool, output: &str) -> bool {
    succeeded && !output.contains("Access is denied")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_privileges_reports_platform() {
        let info = check_privileges();
        if cfg!(unix) {
            assert_eq!(info.platform, "unix");
        } else if cfg!(windows) {
            assert_eq!(info.platform, "windows");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_elevated_matches_effective_uid() {
        let info = check_privileges();
        assert_eq!(info.elevated, nix::unistd::geteuid().is_root());
    }

    #[test]
    fn test_net_session_rule() {
        assert!(net_session_means_admin(true, "There are no entries in the list.\r\n"));
        assert!(!net_session_means_admin(false, ""));
        assert!(!net_session_means_admin(
            true,
            "System error 5 has occurred.\r\n\r\nAccess is denied.\r\n"
        ));
    }

    #[test]
    fn test_serialization() {
        let info = PrivilegeInfo {
            elevated: true,
            username: "root".to_string(),
            platform: "unix".to_string(),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["elevated"], true);
        assert_eq!(json["username"], "root");
    }
}
