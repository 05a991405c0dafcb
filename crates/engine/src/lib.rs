use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod config;
pub mod score;
pub mod sim;

pub use config::{ConfigError, MatchConfig, ScoringConfig, MATCH_CONFIG_ENV_VAR};
pub use score::{
    codec, InsertOutcome, JsonFileRecordStore, MemoryRecordStore, PersonalRecord,
    PersonalRecordBook, RankingService, RecordLedger, RecordStore, RecordStoreError,
    ScoreSubmitter, SubmissionReport, SubmitError,
};
pub use sim::{
    ApplyOutcome, EffectKind, EnemyRoster, FireDecision, FrameAdvance, ItemRoster, MatchEvent,
    MatchSession, MatchSnapshot, MatchSnapshotHandle, MatchState, MatchStatistics, PlayerActor,
    RosterEntity, RosterItem, Vec2, ViewRect, WaveMultipliers,
};

pub const ROOT_ENV_VAR: &str = "SURVIVAL_ROOT";
const RECORDS_FILE: &str = "records.json";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub cache_dir: PathBuf,
    pub records_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("cannot read {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("cannot locate the running executable: {0}")]
    Executable(#[source] std::io::Error),
    #[error("{var} points at {path}, which is not a directory")]
    RootOverrideNotADirectory { var: &'static str, path: PathBuf },
    #[error("no workspace root (Cargo.toml + crates/) above {searched_from}; set {var}")]
    RootNotFound {
        var: &'static str,
        searched_from: PathBuf,
    },
    #[error("cannot create {path}: {source}")]
    CreateCacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves where local match data lives: `SURVIVAL_ROOT` if set, otherwise
/// the first ancestor of the executable that looks like the workspace.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = match env::var(ROOT_ENV_VAR) {
        Ok(value) => root_from_override(Path::new(&value))?,
        Err(env::VarError::NotPresent) => root_from_executable()?,
        Err(source) => {
            return Err(StartupError::EnvVar {
                var: ROOT_ENV_VAR,
                source,
            })
        }
    };
    app_paths_for_root(root)
}

/// Creates `<root>/cache` and lays out the files under it.
pub fn app_paths_for_root(root: PathBuf) -> Result<AppPaths, StartupError> {
    let cache_dir = root.join("cache");
    if let Err(source) = fs::create_dir_all(&cache_dir) {
        return Err(StartupError::CreateCacheDir {
            path: cache_dir,
            source,
        });
    }
    Ok(AppPaths {
        records_path: cache_dir.join(RECORDS_FILE),
        cache_dir,
        root,
    })
}

fn root_from_override(path: &Path) -> Result<PathBuf, StartupError> {
    let root = canonical_or_raw(path);
    if !root.is_dir() {
        return Err(StartupError::RootOverrideNotADirectory {
            var: ROOT_ENV_VAR,
            path: root,
        });
    }
    Ok(root)
}

fn root_from_executable() -> Result<PathBuf, StartupError> {
    let exe = env::current_exe().map_err(StartupError::Executable)?;
    let searched_from = exe.parent().unwrap_or(exe.as_path()).to_path_buf();
    searched_from
        .ancestors()
        .find(|candidate| is_workspace_root(candidate))
        .map(canonical_or_raw)
        .ok_or_else(|| StartupError::RootNotFound {
            var: ROOT_ENV_VAR,
            searched_from: canonical_or_raw(&searched_from),
        })
}

fn is_workspace_root(path: &Path) -> bool {
    path.join("Cargo.toml").is_file() && path.join("crates").is_dir()
}

fn canonical_or_raw(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
