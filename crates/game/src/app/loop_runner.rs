use std::io;
use std::process::ExitCode;

use engine::run_headless;
use tracing::{error, info};

use super::bootstrap::AppWiring;
use super::script_input::ScriptInput;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let stdin = io::stdin();
    let mut input = ScriptInput::new(stdin.lock(), app.config.target_tps);
    match run_headless(app.config, app.scene, &mut input) {
        Ok(summary) => {
            info!(
                ticks = summary.ticks,
                reloads = summary.reloads,
                stop_reason = ?summary.stop_reason,
                "run_finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "run_failed");
            ExitCode::FAILURE
        }
    }
}
