use super::PrivilegeInfo;
use nix::unistd::{geteuid, User};
use tracing::debug;

pub(super) fn detect() -> PrivilegeInfo {
    let uid = geteuid();
    let username = match User::from_uid(uid) {
        Ok(Some(user)) => user.name,
        Ok(None) => String::new(),
        Err(e) => {
            debug!(uid = uid.as_raw(), error = %e, "User lookup failed");
            String::new()
        }
    };

    PrivilegeInfo {
        elevated: uid.is_root(),
        username,
        platform: "unix".to_string(),
    }
}
