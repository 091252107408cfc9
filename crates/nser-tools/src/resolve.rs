//! Binary resolution on the search path

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Extensions tried on Windows when `PATHEXT` is unset
#[cfg(windows)]
const DEFAULT_PATHEXT: &[&str] = &[".exe", ".cmd", ".bat", ".com"];

/// Platform key used for install hints: `linux`, `darwin` or `windows`.
#[must_use]
pub fn current_platform() -> &'static str {
    match env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// Resolve an executable name against `PATH`.
///
/// Names containing a path separator are checked as-is. The result is
/// always absolute, relative `PATH` entries are joined onto the current
/// directory.
#[must_use]
pub fn resolve_binary(name: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH").unwrap_or_default();
    resolve_binary_in(name, &path_var)
}

/// Resolve an executable name against an explicit search path value.
#[must_use]
pub fn resolve_binary_in(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    if name.contains('/') || name.contains('\\') {
        let candidate = PathBuf::from(name);
        return is_executable(&candidate).then(|| make_absolute(candidate));
    }

    env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .find_map(|dir| find_in_dir(&dir, name))
        .map(make_absolute)
}

/// Lexical absolutization, symlinks are kept as found
fn make_absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    std::path::absolute(&path).unwrap_or(path)
}

#[cfg(not(windows))]
fn find_in_dir(dir: &Path, name: &str) -> Option<PathBuf> {
    let candidate = dir.join(name);
    is_executable(&candidate).then_some(candidate)
}

#[cfg(windows)]
fn find_in_dir(dir: &Path, name: &str) -> Option<PathBuf> {
    let name_lower = name.to_ascii_lowercase();
    std::iter::once(String::new())
        .chain(path_extensions())
        .find_map(|ext| {
            let file_name = if !ext.is_empty() && !name_lower.ends_with(&ext) {
                format!("{name}{ext}")
            } else {
                name.to_owned()
            };
            let candidate = dir.join(file_name);
            is_executable(&candidate).then_some(candidate)
        })
}

#[cfg(windows)]
fn path_extensions() -> Vec<String> {
    match env::var("PATHEXT") {
        Ok(raw) if !raw.trim().is_empty() => raw
            .split(';')
            .map(|ext| ext.trim().to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect(),
        _ => DEFAULT_PATHEXT.iter().map(|ext| (*ext).to_owned()).collect(),
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_platform_is_known() {
        let platform = current_platform();
        assert!(!platform.is_empty());
        assert_ne!(platform, "macos");
    }

    #[test]
    fn test_empty_name_never_resolves() {
        assert!(resolve_binary("").is_none());
    }

    #[test]
    fn test_missing_binary() {
        assert!(resolve_binary("nser-definitely-not-installed-binary").is_none());
    }

    #[test]
    fn test_empty_search_path() {
        assert!(resolve_binary_in("sh", OsStr::new("")).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolves_sh() {
        let path = resolve_binary("sh").expect("sh on PATH");
        assert!(path.is_absolute());
        assert!(path.ends_with("sh"));
    }

    #[cfg(unix)]
    #[test]
    fn test_skips_non_executable_files() {
        use std::os::unix::fs::PermissionsExt;

        let dir = std::env::temp_dir().join(format!("nser-resolve-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let plain = dir.join("plainfile");
        std::fs::write(&plain, "not a program").unwrap();
        std::fs::set_permissions(&plain, std::fs::Permissions::from_mode(0o644)).unwrap();

        assert!(resolve_binary_in("plainfile", dir.as_os_str()).is_none());

        std::fs::set_permissions(&plain, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(resolve_binary_in("plainfile", dir.as_os_str()), Some(plain));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_search_entry_resolves_absolute() {
        use std::os::unix::fs::PermissionsExt;

        let rel = PathBuf::from(format!(".nser-resolve-rel-{}", std::process::id()));
        std::fs::create_dir_all(&rel).unwrap();
        let tool = rel.join("reltool");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let found = resolve_binary_in("reltool", rel.as_os_str());
        let nested = resolve_binary_in(&format!("./{}", tool.display()), OsStr::new(""));
        std::fs::remove_dir_all(&rel).unwrap();

        let found = found.expect("found via relative entry");
        assert!(found.is_absolute(), "{}", found.display());
        assert!(found.ends_with("reltool"));
        assert!(nested.expect("found by path").is_absolute());
    }

    #[cfg(unix)]
    #[test]
    fn test_explicit_path_is_checked_directly() {
        assert_eq!(
            resolve_binary_in("/bin/sh", OsStr::new("")),
            Some(PathBuf::from("/bin/sh"))
        );
        assert!(resolve_binary_in("/nonexistent/tool", OsStr::new("")).is_none());
    }
}
