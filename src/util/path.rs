use std::path::{Path, PathBuf};

/// Expand `~`, `$VAR` and `${VAR}` in a user-supplied path.
///
/// Paths that fail to expand (e.g. an undefined variable) are returned unchanged.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_tilde_when_expanding_then_resolves_home() {
        let home = std::env::var("HOME").expect("HOME should be set");

        let expanded = expand_path(Path::new("~/.kuflow.yml"));

        assert_eq!(expanded, PathBuf::from(home).join(".kuflow.yml"));
    }

    #[test]
    fn given_undefined_variable_when_expanding_then_returns_input() {
        let path = Path::new("$KUFLOWCTL_SURELY_UNDEFINED_VAR/env.yml");

        assert_eq!(expand_path(path), path.to_path_buf());
    }
}
