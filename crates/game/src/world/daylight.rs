use tracing::{debug, info};

pub const SUNRISE: f32 = 0.25;
pub const NOON: f32 = 0.5;
pub const SUNSET: f32 = 0.75;
pub const MIDNIGHT: f32 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPhase {
    Day,
    Night,
}

/// Normalized clock: 0 is midnight, 0.5 is noon.
#[derive(Debug, Clone, PartialEq)]
pub struct DayNightCycle {
    day_length_minutes: f32,
    current_time: f32,
    paused: bool,
    last_was_day: bool,
}

impl Default for DayNightCycle {
    fn default() -> Self {
        Self::new(10.0, NOON)
    }
}

impl DayNightCycle {
    pub fn new(day_length_minutes: f32, start_time: f32) -> Self {
        let mut cycle = Self {
            day_length_minutes: day_length_minutes.max(f32::EPSILON),
            current_time: 0.0,
            paused: false,
            last_was_day: true,
        };
        cycle.set_time(start_time);
        cycle.last_was_day = cycle.is_day();
        cycle
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advances the clock and reports a day/night flip, if one happened.
    pub fn advance(&mut self, dt_seconds: f32) -> Option<DayPhase> {
        if !self.paused && dt_seconds.is_finite() && dt_seconds > 0.0 {
            let speed = 1.0 / (self.day_length_minutes * 60.0);
            self.current_time += dt_seconds * speed;
            if self.current_time >= 1.0 {
                self.current_time = 0.0;
            }
        }

        let is_day = self.is_day();
        if is_day == self.last_was_day {
            return None;
        }
        self.last_was_day = is_day;
        let phase = if is_day {
            DayPhase::Day
        } else {
            DayPhase::Night
        };
        info!(time = %self.readable_time(), phase = ?phase, "day_phase_changed");
        Some(phase)
    }

    pub fn is_day(&self) -> bool {
        self.current_time > 0.2 && self.current_time < 0.8
    }

    pub fn is_night(&self) -> bool {
        !self.is_day()
    }

    pub fn readable_time(&self) -> String {
        // f32 error would otherwise read 18:30 back as 18:29.
        let total_minutes = (self.current_time * 1440.0 + 0.001).floor() as u32;
        format!("{:02}:{:02}", (total_minutes / 60) % 24, total_minutes % 60)
    }

    pub fn set_time(&mut self, normalized: f32) {
        self.current_time = if normalized.is_finite() {
            normalized.clamp(0.0, 1.0)
        } else {
            0.0
        };
        debug!(time = %self.readable_time(), "time_set");
    }

    pub fn set_time_hm(&mut self, hours: u32, minutes: u32) {
        let hours = (hours % 24) as f32;
        let minutes = minutes.min(59) as f32;
        self.set_time((hours + minutes / 60.0) / 24.0);
    }

    pub fn set_sunrise(&mut self) {
        self.set_time(SUNRISE);
    }

    pub fn set_noon(&mut self) {
        self.set_time(NOON);
    }

    pub fn set_sunset(&mut self) {
        self.set_time(SUNSET);
    }

    pub fn set_midnight(&mut self) {
        self.set_time(MIDNIGHT);
    }

    pub fn sun_angle(&self) -> f32 {
        self.current_time * 360.0 - 90.0
    }

    /// 1 in full daylight, 0 at night, with linear dawn and dusk ramps.
    pub fn daylight_factor(&self) -> f32 {
        let t = self.current_time;
        if t > 0.2 && t < 0.8 {
            1.0
        } else if (0.1..=0.2).contains(&t) {
            (t - 0.1) / 0.1
        } else if (0.8..=0.9).contains(&t) {
            1.0 - (t - 0.8) / 0.1
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lantern {
    pub name: String,
    pub lit: bool,
}

/// Every lantern shares one lit state: on at night, off by day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lanterns {
    lit: bool,
    lanterns: Vec<Lantern>,
}

impl Lanterns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>) {
        self.lanterns.push(Lantern {
            name: name.into(),
            lit: self.lit,
        });
    }

    /// Returns whether anything changed.
    pub fn set_all(&mut self, lit: bool) -> bool {
        if lit == self.lit {
            return false;
        }
        self.lit = lit;
        for lantern in &mut self.lanterns {
            lantern.lit = lit;
        }
        info!(lit, count = self.lanterns.len(), "lanterns_toggled");
        true
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn len(&self) -> usize {
        self.lanterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lantern> {
        self.lanterns.iter()
    }

    pub fn clear(&mut self) {
        self.lit = false;
        self.lanterns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_window_is_exclusive() {
        let mut cycle = DayNightCycle::default();
        cycle.set_time(0.2);
        assert!(cycle.is_night());
        cycle.set_time(0.21);
        assert!(cycle.is_day());
        cycle.set_time(0.8);
        assert!(cycle.is_night());
    }

    #[test]
    fn advance_reports_transition_into_night() {
        let mut cycle = DayNightCycle::new(1.0, 0.75);
        assert_eq!(cycle.advance(1.0), None);
        assert_eq!(cycle.advance(3.0), Some(DayPhase::Night));
        assert_eq!(cycle.advance(1.0), None);
    }

    #[test]
    fn advance_wraps_to_midnight() {
        let mut cycle = DayNightCycle::new(1.0, 0.99);
        cycle.advance(1.0);
        assert_eq!(cycle.current_time(), 0.0);
        assert_eq!(cycle.readable_time(), "00:00");
    }

    #[test]
    fn paused_clock_does_not_move() {
        let mut cycle = DayNightCycle::default();
        cycle.set_paused(true);
        cycle.advance(100.0);
        assert_eq!(cycle.current_time(), NOON);
    }

    #[test]
    fn set_time_clamps_and_formats() {
        let mut cycle = DayNightCycle::default();
        cycle.set_time(4.0);
        assert_eq!(cycle.current_time(), 1.0);
        cycle.set_time(-1.0);
        assert_eq!(cycle.current_time(), 0.0);
        cycle.set_time_hm(18, 30);
        assert_eq!(cycle.readable_time(), "18:30");
        cycle.set_noon();
        assert_eq!(cycle.readable_time(), "12:00");
        assert_eq!(cycle.sun_angle(), 90.0);
    }

    #[test]
    fn daylight_factor_ramps_at_dawn_and_dusk() {
        let mut cycle = DayNightCycle::default();
        cycle.set_time(0.15);
        assert!((cycle.daylight_factor() - 0.5).abs() < 1e-4);
        cycle.set_time(0.85);
        assert!((cycle.daylight_factor() - 0.5).abs() < 1e-4);
        cycle.set_midnight();
        assert_eq!(cycle.daylight_factor(), 0.0);
        cycle.set_noon();
        assert_eq!(cycle.daylight_factor(), 1.0);
    }

    #[test]
    fn lanterns_only_change_on_a_real_flip() {
        let mut lanterns = Lanterns::new();
        lanterns.add("Lantern_01");
        assert!(!lanterns.set_all(false));
        assert!(lanterns.set_all(true));
        assert!(!lanterns.set_all(true));
        assert!(lanterns.iter().all(|lantern| lantern.lit));
    }

    #[test]
    fn new_lantern_takes_current_state() {
        let mut lanterns = Lanterns::new();
        lanterns.set_all(true);
        lanterns.add("Lantern_02");
        assert!(lanterns.iter().all(|lantern| lantern.lit));
    }
}
