use std::env;

use engine::{
    codec, resolve_app_paths, JsonFileRecordStore, MatchConfig, MemoryRecordStore, RankingService,
    RecordLedger, RecordStore, ScoreSubmitter, SubmitError,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::script::MatchScript;

pub(crate) const MATCH_SECONDS_ENV_VAR: &str = "SURVIVAL_MATCH_SECONDS";

pub(crate) struct AppWiring {
    pub(crate) config: MatchConfig,
    pub(crate) script: MatchScript,
    pub(crate) ledger: RecordLedger,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Survival Match Startup ===");

    let config = MatchConfig::from_env_or_default();
    let script = MatchScript::default();
    let match_seconds = resolve_match_seconds(script.match_seconds);
    let script = script.with_match_seconds(match_seconds);
    let ledger = RecordLedger::open(open_record_store(), config.scoring.record_capacity)
        .with_submitter(ScoreSubmitter::spawn(LoggingRankingService::default()));

    AppWiring {
        config,
        script,
        ledger,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Records go to `<root>/cache/records.json`; without a resolvable root the
/// run keeps them in memory only.
fn open_record_store() -> Box<dyn RecordStore> {
    match resolve_app_paths() {
        Ok(paths) => {
            info!(
                root = %paths.root.display(),
                records_path = %paths.records_path.display(),
                "startup"
            );
            Box::new(JsonFileRecordStore::new(paths.records_path))
        }
        Err(error) => {
            warn!(error = %error, "record_paths_unavailable; keeping records in memory");
            Box::new(MemoryRecordStore::default())
        }
    }
}

fn resolve_match_seconds(default_seconds: f64) -> f64 {
    match env::var(MATCH_SECONDS_ENV_VAR) {
        Ok(value) => match parse_match_seconds(&value) {
            Some(seconds) => seconds,
            None => {
                warn!(
                    env_var = MATCH_SECONDS_ENV_VAR,
                    value = value.as_str(),
                    "invalid match length env var value; falling back to default"
                );
                default_seconds
            }
        },
        Err(env::VarError::NotPresent) => default_seconds,
        Err(err) => {
            warn!(
                env_var = MATCH_SECONDS_ENV_VAR,
                error = %err,
                "unable to read match length env var; falling back to default"
            );
            default_seconds
        }
    }
}

fn parse_match_seconds(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
}

/// Stand-in for the platform leaderboard: accepts everything and logs it.
#[derive(Debug, Default)]
pub(crate) struct LoggingRankingService {
    submitted: u32,
}

impl RankingService for LoggingRankingService {
    fn submit_score(&mut self, encoded: i64) -> Result<(), SubmitError> {
        self.submitted += 1;
        let (time_seconds, kills) = codec::decode(encoded);
        info!(
            encoded,
            time_seconds,
            kills,
            submitted = self.submitted,
            "score_submitted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_seconds_must_be_positive_and_finite() {
        assert_eq!(parse_match_seconds(" 42.5 "), Some(42.5));
        assert_eq!(parse_match_seconds("0"), None);
        assert_eq!(parse_match_seconds("-3"), None);
        assert_eq!(parse_match_seconds("inf"), None);
        assert_eq!(parse_match_seconds("soon"), None);
    }

    #[test]
    fn logging_service_accepts_every_score() {
        let submitter = ScoreSubmitter::spawn(LoggingRankingService::default());
        assert!(submitter.submit(codec::encode(125, 42)));
        assert!(submitter.submit(codec::encode(3, 0)));
        let report = submitter.shutdown();
        assert_eq!(report.accepted, 2);
        assert_eq!(report.failed, 0);
    }
}
