use std::io;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use super::scene::SceneRuntime;
use super::{InputSnapshot, Scene, SceneCommand};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_ticks: Option<u64>,
    /// Sleep between ticks so simulation time tracks wall-clock time.
    pub pace_realtime: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_ticks: None,
            pace_realtime: false,
        }
    }
}

impl LoopConfig {
    pub fn fixed_dt_seconds(&self) -> f32 {
        1.0 / self.target_tps.max(1) as f32
    }
}

/// Supplies one input snapshot per simulation tick. `Ok(None)` means the
/// source is exhausted and the loop should stop.
pub trait InputSource {
    fn next_tick(&mut self) -> Result<Option<InputSnapshot>, io::Error>;
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read input for tick {tick}: {source}")]
    Input {
        tick: u64,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QuitRequested,
    InputExhausted,
    TickLimit,
}

impl StopReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::QuitRequested => "quit_requested",
            Self::InputExhausted => "input_exhausted",
            Self::TickLimit => "tick_limit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub ticks: u64,
    pub reloads: u32,
    pub stop_reason: StopReason,
}

pub fn run_headless(
    config: LoopConfig,
    scene: Box<dyn Scene>,
    input: &mut dyn InputSource,
) -> Result<LoopSummary, AppError> {
    let fixed_dt_seconds = config.fixed_dt_seconds();
    let tick_duration = Duration::from_secs_f32(fixed_dt_seconds);
    info!(
        target_tps = config.target_tps.max(1),
        max_ticks = ?config.max_ticks,
        pace_realtime = config.pace_realtime,
        "loop_config"
    );

    let mut runtime = SceneRuntime::new(scene);
    runtime.load();
    info!(
        entity_count = runtime.world().entity_count(),
        title = ?runtime.debug_title(),
        "scene_loaded"
    );

    let mut ticks: u64 = 0;
    let mut reloads: u32 = 0;
    let result = loop {
        if config.max_ticks.is_some_and(|limit| ticks >= limit) {
            break Ok(StopReason::TickLimit);
        }

        let snapshot = match input.next_tick() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => break Ok(StopReason::InputExhausted),
            Err(source) => break Err(AppError::Input { tick: ticks, source }),
        };
        let tick_started = Instant::now();

        if snapshot.quit_requested() {
            info!(tick = ticks, reason = "quit_action", "shutdown_requested");
            break Ok(StopReason::QuitRequested);
        }

        let command = runtime.update(fixed_dt_seconds, &snapshot);
        ticks = ticks.saturating_add(1);
        match command {
            SceneCommand::None => {}
            SceneCommand::Reload => {
                runtime.reload();
                reloads = reloads.saturating_add(1);
                info!(
                    tick = ticks,
                    entity_count = runtime.world().entity_count(),
                    "scene_reloaded"
                );
            }
            SceneCommand::Quit => {
                info!(tick = ticks, reason = "scene_command", "shutdown_requested");
                break Ok(StopReason::QuitRequested);
            }
        }

        if config.pace_realtime {
            let elapsed = tick_started.elapsed();
            match tick_duration.checked_sub(elapsed) {
                Some(remaining) => thread::sleep(remaining),
                None => warn!(
                    tick = ticks,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "tick_overrun"
                ),
            }
        }
    };

    runtime.shutdown();
    let stop_reason = result?;
    info!(ticks, reloads, reason = stop_reason.as_str(), "shutdown");
    Ok(LoopSummary {
        ticks,
        reloads,
        stop_reason,
    })
}
