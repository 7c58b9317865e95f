use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead};

use engine::{InputAction, InputSnapshot, InputSource};
use tracing::{debug, warn};

/// Longest single `move` or `wait`, in seconds.
pub const MAX_COMMAND_SECONDS: f32 = 3600.0;

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    Move {
        forward: f32,
        right: f32,
        seconds: f32,
    },
    Turn {
        degrees: f32,
    },
    Wait {
        seconds: f32,
    },
    Press(InputAction),
    SetClock {
        hours: u32,
        minutes: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptParseError {
    reason: String,
    usage: &'static str,
}

impl fmt::Display for ScriptParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. usage: {}", self.reason, self.usage)
    }
}

impl std::error::Error for ScriptParseError {}

/// Blank lines and `#` comments parse to `None`.
pub fn parse_script_line(line: &str) -> Result<Option<ScriptCommand>, ScriptParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let tokens = trimmed.split_whitespace().collect::<Vec<_>>();
    let (name, args) = (tokens[0], &tokens[1..]);

    let command = match name.to_ascii_lowercase().as_str() {
        "move" => {
            let usage = "move <forward> <right> <seconds>";
            require_args(args, 3, usage)?;
            ScriptCommand::Move {
                forward: parse_axis(args[0], "forward", usage)?,
                right: parse_axis(args[1], "right", usage)?,
                seconds: parse_seconds(args[2], usage)?,
            }
        }
        "turn" => {
            let usage = "turn <degrees>";
            require_args(args, 1, usage)?;
            ScriptCommand::Turn {
                degrees: parse_f32(args[0], "degrees", usage)?,
            }
        }
        "wait" => {
            let usage = "wait <seconds>";
            require_args(args, 1, usage)?;
            ScriptCommand::Wait {
                seconds: parse_seconds(args[0], usage)?,
            }
        }
        "time" => {
            let usage = "time <HH:MM>";
            require_args(args, 1, usage)?;
            let (hours, minutes) = parse_clock(args[0], usage)?;
            ScriptCommand::SetClock { hours, minutes }
        }
        "interact" => press(args, "interact", InputAction::Interact)?,
        "eat" => press(args, "eat", InputAction::EatFood)?,
        "inventory" => press(args, "inventory", InputAction::ToggleInventory)?,
        "new-game" => press(args, "new-game", InputAction::NewGame)?,
        "status" => press(args, "status", InputAction::Status)?,
        "quit" => press(args, "quit", InputAction::Quit)?,
        _ => {
            return Err(ScriptParseError {
                reason: format!("unknown command '{name}'"),
                usage: "move|turn|wait|time|interact|eat|inventory|new-game|status|quit",
            })
        }
    };
    Ok(Some(command))
}

impl ScriptCommand {
    /// Expands the command into per-tick snapshots. Timed commands last
    /// at least one tick.
    pub fn to_snapshots(&self, target_tps: u32) -> Vec<InputSnapshot> {
        let ticks_for = |seconds: f32| -> usize {
            let seconds = seconds.clamp(0.0, MAX_COMMAND_SECONDS);
            let ticks = (seconds * target_tps.max(1) as f32).round();
            ticks.max(1.0) as usize
        };
        match *self {
            ScriptCommand::Move {
                forward,
                right,
                seconds,
            } => vec![InputSnapshot::empty().with_movement(forward, right); ticks_for(seconds)],
            ScriptCommand::Turn { degrees } => {
                vec![InputSnapshot::empty().with_turn_degrees(degrees)]
            }
            ScriptCommand::Wait { seconds } => vec![InputSnapshot::empty(); ticks_for(seconds)],
            ScriptCommand::Press(action) => {
                vec![InputSnapshot::empty().with_action_pressed(action, true)]
            }
            ScriptCommand::SetClock { hours, minutes } => {
                vec![InputSnapshot::empty().with_set_clock(Some((hours, minutes)))]
            }
        }
    }
}

/// Reads a line script and feeds the loop one snapshot per tick. Bad
/// lines are logged and skipped.
pub struct ScriptInput<R> {
    reader: R,
    target_tps: u32,
    queued: VecDeque<InputSnapshot>,
    line_number: usize,
}

impl<R: BufRead> ScriptInput<R> {
    pub fn new(reader: R, target_tps: u32) -> Self {
        Self {
            reader,
            target_tps,
            queued: VecDeque::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> InputSource for ScriptInput<R> {
    fn next_tick(&mut self) -> Result<Option<InputSnapshot>, io::Error> {
        let mut line = String::new();
        while self.queued.is_empty() {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            match parse_script_line(&line) {
                Ok(Some(command)) => {
                    debug!(line = self.line_number, command = ?command, "script_command");
                    self.queued.extend(command.to_snapshots(self.target_tps));
                }
                Ok(None) => {}
                Err(error) => warn!(line = self.line_number, error = %error, "script_line_invalid"),
            }
        }
        Ok(self.queued.pop_front())
    }
}

fn press(
    args: &[&str],
    usage: &'static str,
    action: InputAction,
) -> Result<ScriptCommand, ScriptParseError> {
    require_args(args, 0, usage)?;
    Ok(ScriptCommand::Press(action))
}

fn require_args(args: &[&str], count: usize, usage: &'static str) -> Result<(), ScriptParseError> {
    if args.len() == count {
        Ok(())
    } else {
        Err(ScriptParseError {
            reason: format!("expected {count} argument(s), got {}", args.len()),
            usage,
        })
    }
}

fn parse_f32(raw: &str, what: &str, usage: &'static str) -> Result<f32, ScriptParseError> {
    match raw.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ScriptParseError {
            reason: format!("invalid {what} '{raw}' (expected a finite number)"),
            usage,
        }),
    }
}

fn parse_axis(raw: &str, what: &str, usage: &'static str) -> Result<f32, ScriptParseError> {
    let value = parse_f32(raw, what, usage)?;
    if (-1.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ScriptParseError {
            reason: format!("{what} axis '{raw}' must be within [-1, 1]"),
            usage,
        })
    }
}

fn parse_seconds(raw: &str, usage: &'static str) -> Result<f32, ScriptParseError> {
    let value = parse_f32(raw, "seconds", usage)?;
    if value < 0.0 {
        return Err(ScriptParseError {
            reason: format!("seconds '{raw}' must not be negative"),
            usage,
        });
    }
    if value > MAX_COMMAND_SECONDS {
        return Err(ScriptParseError {
            reason: format!("seconds '{raw}' exceeds the {MAX_COMMAND_SECONDS} second limit"),
            usage,
        });
    }
    Ok(value)
}

fn parse_clock(raw: &str, usage: &'static str) -> Result<(u32, u32), ScriptParseError> {
    let invalid = || ScriptParseError {
        reason: format!("invalid time '{raw}' (expected HH:MM)"),
        usage,
    };
    let (hours, minutes) = raw.split_once(':').ok_or_else(invalid)?;
    let hours = hours.parse::<u32>().map_err(|_| invalid())?;
    let minutes = minutes.parse::<u32>().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    Ok((hours, minutes))
}
