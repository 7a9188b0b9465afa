use std::path::{Path, PathBuf};

const APP_DIR: &str = "padradio";

pub fn data_dir() -> PathBuf {
    // XDG layout even on hosts where dirs would pick something else
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".local")
        .join("share")
        .join(APP_DIR)
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(APP_DIR)
}

fn find_beside_exe(name: &str) -> Option<PathBuf> {
    let current_exe = std::env::current_exe().ok()?;
    let dir = current_exe.parent()?;
    let p = dir.join(name);
    if p.is_file() {
        return Some(p);
    }
    let p = dir.join("external").join(name);
    if p.is_file() {
        return Some(p);
    }
    None
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|p| p.is_file())
}

/// Resolve an external program the way a shell would, with one extra stop:
/// a copy shipped beside our own executable wins over PATH.
///
/// Anything containing a path separator is taken literally and only checked
/// for existence.
pub fn find_binary(name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    if name.contains('/') {
        let p = Path::new(name);
        return p.is_file().then(|| p.to_path_buf());
    }
    find_beside_exe(name).or_else(|| find_on_path(name))
}
