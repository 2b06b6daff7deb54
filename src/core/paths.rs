//! Default file locations and shared path helpers.

use std::env;
use std::path::{Component, Path, PathBuf};

/// Home directory, falling back to `/tmp` when `HOME` is unset.
#[must_use]
pub fn home_dir() -> PathBuf {
    env::var_os("HOME").map_or_else(
        || {
            eprintln!("[FWV-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths");
            PathBuf::from("/tmp")
        },
        PathBuf::from,
    )
}

/// `$HOME/.config/fwv/config.toml`
#[must_use]
pub fn default_config_path() -> PathBuf {
    home_dir().join(".config").join("fwv").join("config.toml")
}

/// `$HOME/.local/share/fwv`
#[must_use]
pub fn default_data_dir() -> PathBuf {
    home_dir().join(".local").join("share").join("fwv")
}

/// `$HOME/.local/share/fwv/activity.jsonl`
#[must_use]
pub fn default_jsonl_path() -> PathBuf {
    default_data_dir().join("activity.jsonl")
}

/// Expand a leading `~` or `~/` to the home directory.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Resolve a path to an absolute, normalized path.
///
/// Existing paths go through `fs::canonicalize`. Paths that do not exist are
/// made absolute relative to CWD and `..`/`.` are resolved syntactically.
pub fn resolve_absolute_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    if let Ok(canonical) = std::fs::canonicalize(&absolute) {
        return canonical;
    }

    normalize_syntactic(&absolute)
}

fn normalize_syntactic(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(..) | Component::RootDir | Component::Normal(_) => {
                components.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                }
            }
        }
    }
    components.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_locations_live_under_fwv_dirs() {
        let cfg = default_config_path();
        assert!(cfg.ends_with(".config/fwv/config.toml"));
        let log = default_jsonl_path();
        assert!(log.ends_with(".local/share/fwv/activity.jsonl"));
    }

    #[test]
    fn tilde_expands_only_as_leading_component() {
        let expanded = expand_tilde(Path::new("~/logs/LOG00083.TXT"));
        assert_eq!(expanded, home_dir().join("logs/LOG00083.TXT"));
        assert_eq!(expand_tilde(Path::new("/abs/~x")), PathBuf::from("/abs/~x"));
        assert_eq!(expand_tilde(Path::new("rel.bin")), PathBuf::from("rel.bin"));
    }

    #[test]
    fn nonexistent_input_path_normalizes_syntactically() {
        let input = Path::new("/nonexistent-fwv/logs/../LOG00083.TXT");
        assert!(std::fs::canonicalize(input).is_err());
        assert_eq!(
            resolve_absolute_path(input),
            PathBuf::from("/nonexistent-fwv/LOG00083.TXT")
        );
    }

    #[test]
    fn parent_at_root_is_dropped() {
        assert_eq!(normalize_syntactic(Path::new("/../foo")), Path::new("/foo"));
    }
}
