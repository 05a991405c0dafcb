use std::process::ExitCode;

use engine::sim::{MatchEventCounts, VirtualJoystick};
use engine::{
    EffectKind, FireDecision, InsertOutcome, MatchConfig, MatchEvent, MatchSession,
    MatchSnapshotHandle, MatchState, MatchStatistics, PersonalRecord, PlayerActor, RecordLedger,
    Vec2, ViewRect,
};
use tracing::{debug, error, info};

use super::bootstrap::AppWiring;
use super::player::DemoPlayer;
use super::script::MatchScript;
use super::spawner::{DemoSpawner, HitResult, ItemField};

pub(crate) const FRAME_SECONDS: f64 = 1.0 / 60.0;
const DAMAGE_PER_PELLET: f32 = 1.0;
const DROP_OFFSET: Vec2 = Vec2 { x: 20.0, y: 0.0 };
const TOUCH_ORIGIN: Vec2 = Vec2 { x: 160.0, y: 560.0 };
const THUMB_DRAG_RADIUS: f32 = 30.0;
const THUMB_TURN_RATE_RADIANS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EndReason {
    TimeUp,
    PlayerDown,
}

impl EndReason {
    fn as_token(self) -> &'static str {
        match self {
            Self::TimeUp => "time_up",
            Self::PlayerDown => "player_down",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct MatchReport {
    pub(crate) end_reason: EndReason,
    pub(crate) statistics: MatchStatistics,
    pub(crate) record: Option<PersonalRecord>,
    pub(crate) counts: MatchEventCounts,
    pub(crate) remaining_health: u32,
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        config,
        script,
        mut ledger,
    } = app;

    let report = run_scripted_match(config, &script);
    info!(
        end_reason = report.end_reason.as_token(),
        play_time_seconds = report.statistics.play_time_seconds,
        kills = report.statistics.kills,
        score = report.statistics.score,
        wave = report.statistics.current_wave,
        remaining_health = report.remaining_health,
        shots_fired = report.counts.shots_fired,
        ultimates = report.counts.ultimates,
        "match_report"
    );

    let Some(record) = report.record else {
        error!("match_did_not_produce_record");
        return ExitCode::FAILURE;
    };
    let outcome = ledger.record_match(record);
    log_record_outcome(record, outcome, &ledger);

    if let Some(submissions) = ledger.close() {
        info!(
            accepted = submissions.accepted,
            failed = submissions.failed,
            "score_submissions_finished"
        );
    }
    ExitCode::SUCCESS
}

fn log_record_outcome(record: PersonalRecord, outcome: InsertOutcome, ledger: &RecordLedger) {
    match outcome.rank {
        Some(rank) => info!(
            rank = rank + 1,
            encoded = record.encoded(),
            is_new_best = outcome.is_new_best,
            "personal_record_ranked"
        ),
        None => info!(encoded = record.encoded(), "personal_record_not_ranked"),
    }
    for (index, entry) in ledger.book().entries().iter().enumerate() {
        debug!(
            rank = index + 1,
            time_seconds = entry.time_seconds(),
            kills = entry.kills(),
            "personal_record_entry"
        );
    }
}

/// Plays one match frame by frame at a fixed 60 Hz, standing in for the
/// host engine's update loop. Returns once the script runs out or the
/// player goes down.
pub(crate) fn run_scripted_match(config: MatchConfig, script: &MatchScript) -> MatchReport {
    let snapshots = MatchSnapshotHandle::default();
    let mut joystick = VirtualJoystick::new(config.joystick);
    let mut session = MatchSession::new(config).with_snapshot_handle(snapshots.clone());
    let mut player = DemoPlayer::new(Vec2::ZERO);
    let mut spawner = DemoSpawner::default();
    let mut items = ItemField::default();
    let mut drops = script.sorted_drops().into_iter().peekable();

    session.start(0.0, &mut player);
    joystick.touch_began(TOUCH_ORIGIN);

    let total_frames = frame_count(script.match_seconds);
    let mut end_reason = EndReason::TimeUp;
    let mut next_status_at = script.status_log_interval_seconds;

    for frame_index in 1..=total_frames {
        let now = frame_index as f64 * FRAME_SECONDS;
        apply_interruptions(script, now, &mut session);

        let thumb_angle = now * THUMB_TURN_RATE_RADIANS;
        let thumb = TOUCH_ORIGIN.add(
            Vec2::new(thumb_angle.cos() as f32, thumb_angle.sin() as f32)
                .scale(THUMB_DRAG_RADIUS),
        );
        let stick = joystick.touch_moved(thumb);

        let view = ViewRect::centered(player.position(), script.view_width, script.view_height);
        let Some(frame) = session.advance(now, &mut player, &spawner, &view) else {
            continue;
        };
        let dt = frame.delta_seconds;

        player.tick(dt);
        if let Some(direction) = stick.move_direction {
            player.walk(direction, dt);
        }

        while let Some(due) = drops.next_if(|d| d.at_play_seconds <= frame.play_time_seconds) {
            items.drop_item(player.position().add(DROP_OFFSET), due.effect);
        }
        for item in items.collect_near(player.position()) {
            session.pick_up(item.effect, &mut player);
        }

        resolve_volleys(&mut session, &mut player, &mut spawner);

        let contacts = spawner.tick(dt, player.position(), session.current_multipliers());
        if contacts > 0 {
            let damage = script.contact_damage.saturating_mul(contacts as u32);
            let taken = player.take_damage(damage);
            debug!(contacts, taken, health = player.health(), "player_contact");
        }

        let view = ViewRect::centered(player.position(), script.view_width, script.view_height);
        trigger_ultimate_if_ready(&mut session, &mut spawner, &view);

        for event in session.drain_events() {
            present_event(event);
        }

        if frame.play_time_seconds >= next_status_at {
            next_status_at += script.status_log_interval_seconds;
            let snapshot = snapshots.snapshot();
            info!(
                play_time_seconds = snapshot.statistics.play_time_seconds,
                wave = snapshot.statistics.current_wave,
                kills = snapshot.statistics.kills,
                gauge = snapshot.gauge,
                fire_interval_seconds = session.current_fire_interval_seconds(),
                live_enemies = spawner.live_count(),
                active_effects = snapshot.active_effects.len(),
                health = player.health(),
                ammo = player.ammo(),
                reloading = player.is_reloading(),
                invincible = player.is_invincible(),
                speed_multiplier = player.speed_multiplier(),
                "match_status"
            );
        }

        if player.is_down() {
            end_reason = EndReason::PlayerDown;
            break;
        }
    }

    joystick.touch_ended();
    let record = session.end(&mut player);
    for event in session.drain_events() {
        present_event(event);
    }

    MatchReport {
        end_reason,
        statistics: *session.statistics(),
        record,
        counts: session.event_counts(),
        remaining_health: player.health(),
    }
}

fn frame_count(match_seconds: f64) -> u64 {
    if match_seconds.is_finite() && match_seconds > 0.0 {
        (match_seconds / FRAME_SECONDS).round() as u64
    } else {
        0
    }
}

fn apply_interruptions(script: &MatchScript, now: f64, session: &mut MatchSession) {
    if let Some(pause) = script.pause {
        let paused = session.state() == MatchState::Paused;
        if pause.is_active(now) && !paused {
            session.pause(now);
        } else if !pause.is_active(now) && paused {
            session.resume(now);
        }
    }
    if let Some(background) = script.background {
        session.set_backgrounded(background.is_active(now), now);
    }
}

/// Shots land instantly on the target auto-fire picked this frame.
fn resolve_volleys(session: &mut MatchSession, player: &mut DemoPlayer, spawner: &mut DemoSpawner) {
    let volleys = player.drain_volleys();
    let Some(FireDecision::Fired { target_id, .. }) = session.last_fire_decision() else {
        return;
    };
    for volley in volleys {
        debug!(
            target_id,
            pellets = volley.pellets,
            aim_x = volley.direction.x,
            aim_y = volley.direction.y,
            "volley_resolved"
        );
        match spawner.damage(target_id, volley.pellets as f32 * DAMAGE_PER_PELLET) {
            HitResult::Killed => {
                session.register_kill();
            }
            HitResult::Wounded => {
                session.register_hit();
            }
            HitResult::Missed => {}
        }
    }
}

/// Clears every visible enemy once the gauge is full. Cleared enemies count
/// as kills. Returns how many were cleared.
pub(crate) fn trigger_ultimate_if_ready(
    session: &mut MatchSession,
    spawner: &mut DemoSpawner,
    view: &ViewRect,
) -> usize {
    if !session.gauge().is_ready() {
        return 0;
    }
    let mut cleared = 0;
    session.activate_ultimate(|| cleared = spawner.clear_within(view));
    for _ in 0..cleared {
        session.register_kill();
    }
    cleared
}

fn present_event(event: MatchEvent) {
    match toast_text(event) {
        Some(text) => info!(toast = text.as_str(), "toast"),
        None => debug!(event = ?event, "match_event"),
    }
}

/// Player-facing text for the events worth a toast.
pub(crate) fn toast_text(event: MatchEvent) -> Option<String> {
    match event {
        MatchEvent::WaveStarted { wave } if wave > 1 => Some(format!("Wave {wave}")),
        MatchEvent::GaugeReady => Some("Ultimate ready!".to_string()),
        MatchEvent::EffectStarted { kind } => Some(format!("{}!", effect_label(kind))),
        MatchEvent::EffectRefreshed { kind } => {
            Some(format!("{} extended", effect_label(kind)))
        }
        MatchEvent::EffectEnded { kind } => Some(format!("{} wore off", effect_label(kind))),
        _ => None,
    }
}

fn effect_label(kind: EffectKind) -> &'static str {
    match kind {
        EffectKind::SpeedBoost => "Speed boost",
        EffectKind::Invincibility => "Invincible",
        EffectKind::ShotgunMode => "Shotgun",
        EffectKind::RestoreHealth => "Health restored",
        EffectKind::RestoreAmmo => "Ammo restored",
    }
}
