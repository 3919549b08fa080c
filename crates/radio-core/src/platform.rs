use std::path::PathBuf;

const APP_DIR: &str = "radio-player";

#[cfg(unix)]
pub fn mpv_socket_name() -> String {
    format!(
        "{}/radio-player-mpv-{}.sock",
        std::env::temp_dir().display(),
        std::process::id()
    )
}

#[cfg(windows)]
pub fn mpv_socket_name() -> String {
    format!("radio-player-mpv-{}", std::process::id())
}

#[cfg(unix)]
pub fn mpv_socket_arg() -> String {
    format!("--input-ipc-server={}", mpv_socket_name())
}

#[cfg(windows)]
pub fn mpv_socket_arg() -> String {
    format!("--input-ipc-server=\\\\.\\pipe\\{}", mpv_socket_name())
}

pub fn data_dir() -> PathBuf {
    // On macOS and Linux, use ~/.local/share/radio-player/ (XDG standard)
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join(APP_DIR)
    }
    #[cfg(windows)]
    {
        if let Some(dir) = portable_dir("data") {
            return dir.join("data");
        }

        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

pub fn config_dir() -> PathBuf {
    // Portable install: config.toml next to the executable wins
    #[cfg(windows)]
    {
        if let Some(dir) = portable_dir("config.toml") {
            return dir;
        }
    }

    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join(APP_DIR)
    }

    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

/// Directory of the running executable, if `entry` exists inside it.
#[cfg(windows)]
fn portable_dir(entry: &str) -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let exe_dir = exe_path.parent()?;
    if exe_dir.join(entry).exists() {
        Some(exe_dir.to_path_buf())
    } else {
        None
    }
}

#[cfg(unix)]
pub fn mpv_binary_name() -> &'static str {
    "mpv"
}

#[cfg(windows)]
pub fn mpv_binary_name() -> &'static str {
    "mpv.exe"
}

fn find_beside_exe(name: &str) -> Option<PathBuf> {
    let current_exe = std::env::current_exe().ok()?;
    let dir = current_exe.parent()?;
    let p = dir.join(name);
    if p.exists() {
        return Some(p);
    }
    let p = dir.join("external").join(name);
    if p.exists() {
        return Some(p);
    }
    None
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|p| p.exists())
}

/// Find the mpv binary for playback.
/// Checks: an explicit override, beside the current exe, then PATH.
pub fn find_mpv_binary(explicit: Option<&std::path::Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return p.exists().then(|| p.to_path_buf());
    }

    let exe_name = mpv_binary_name();
    if let Some(p) = find_beside_exe(exe_name) {
        return Some(p);
    }

    find_on_path(exe_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_are_app_scoped() {
        assert!(config_dir().ends_with(APP_DIR));
        assert!(data_dir().ends_with(APP_DIR));
    }

    #[test]
    fn test_explicit_mpv_path_must_exist() {
        let missing = std::path::Path::new("/definitely/not/here/mpv");
        assert_eq!(find_mpv_binary(Some(missing)), None);

        let exe = std::env::current_exe().unwrap();
        assert_eq!(find_mpv_binary(Some(&exe)), Some(exe.clone()));
    }

    #[test]
    fn test_socket_arg_points_at_socket_name() {
        assert!(mpv_socket_arg().contains(&mpv_socket_name()));
    }
}
