use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
mod atomic_io;

pub use app::{
    run_headless, AppError, Entity, EntityId, InputAction, InputSnapshot, InputSource,
    LoopConfig, LoopSummary, Scene, SceneCommand, SceneWorld, StopReason, TimerId, TimerQueue,
    Transform, Vec3,
};
pub use atomic_io::{write_bytes_atomic, write_text_atomic};

pub const ROOT_ENV_VAR: &str = "KEEPSAKE_ROOT";
pub const DATA_DIR_ENV_VAR: &str = "KEEPSAKE_DATA_DIR";
const APP_DIR_NAME: &str = "keepsake";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub data_dir: PathBuf,
    pub saves_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("failed to create save directory at {path}: {source}")]
    CreateSavesDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "KEEPSAKE_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
PowerShell: $env:{env_var}=\"C:\\path\\to\\keepsake\"\n\
Bash/zsh: export {env_var}=\"/path/to/keepsake\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let assets_dir = root.join("assets");
    let data_dir = resolve_data_dir(&root)?;
    let saves_dir = data_dir.join("saves");

    fs::create_dir_all(&saves_dir).map_err(|source| StartupError::CreateSavesDir {
        path: saves_dir.clone(),
        source,
    })?;

    Ok(AppPaths {
        root,
        assets_dir,
        data_dir,
        saves_dir,
    })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let raw = PathBuf::from(value);
            let normalized = normalize_path(&raw);
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            for candidate in exe_dir.ancestors() {
                if is_repo_marker(candidate) {
                    return Ok(normalize_path(candidate));
                }
            }

            Err(StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn resolve_data_dir(root: &Path) -> Result<PathBuf, StartupError> {
    match env::var(DATA_DIR_ENV_VAR) {
        Ok(value) if !value.trim().is_empty() => return Ok(PathBuf::from(value)),
        Ok(_) | Err(env::VarError::NotPresent) => {}
        Err(source) => {
            return Err(StartupError::EnvVar {
                var: DATA_DIR_ENV_VAR,
                source,
            })
        }
    }

    let platform_base = non_empty_env("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|| non_empty_env("HOME").map(|home| PathBuf::from(home).join(".local/share")))
        .or_else(|| non_empty_env("APPDATA").map(PathBuf::from));

    Ok(platform_data_dir(platform_base, root))
}

fn platform_data_dir(platform_base: Option<PathBuf>, root: &Path) -> PathBuf {
    match platform_base {
        Some(base) => base.join(APP_DIR_NAME),
        None => root.to_path_buf(),
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_marker_requires_cargo_toml() {
        let cwd = env::current_dir().expect("cwd");
        assert!(!is_repo_marker(&cwd.join("definitely_not_a_marker")));
    }

    #[test]
    fn repo_marker_accepts_workspace_layout() {
        let temp = tempfile::TempDir::new().expect("temp");
        fs::write(temp.path().join("Cargo.toml"), "[workspace]\n").expect("cargo toml");
        fs::create_dir_all(temp.path().join("crates")).expect("crates");
        assert!(is_repo_marker(temp.path()));
    }

    #[test]
    fn platform_data_dir_appends_app_name() {
        let root = PathBuf::from("/game");
        let dir = platform_data_dir(Some(PathBuf::from("/home/p/.local/share")), &root);
        assert_eq!(dir, PathBuf::from("/home/p/.local/share/keepsake"));
    }

    #[test]
    fn platform_data_dir_falls_back_to_root() {
        let root = PathBuf::from("/game");
        assert_eq!(platform_data_dir(None, &root), root);
    }
}
