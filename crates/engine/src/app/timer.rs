#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct TimerEntry<T> {
    id: TimerId,
    due_at_seconds: f64,
    payload: T,
}

/// One-shot timers driven by the fixed-step loop. Timers only fire from
/// `advance`, so callers never observe a payload mid-tick.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    next_id: u64,
    now_seconds: f64,
    entries: Vec<TimerEntry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            now_seconds: 0.0,
            entries: Vec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay_seconds: f32, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let delay = if delay_seconds.is_finite() {
            f64::from(delay_seconds.max(0.0))
        } else {
            0.0
        };
        self.entries.push(TimerEntry {
            id,
            due_at_seconds: self.now_seconds + delay,
            payload,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Moves the clock forward and returns every payload now due, earliest
    /// deadline first (schedule order breaks ties).
    pub fn advance(&mut self, dt_seconds: f32) -> Vec<T> {
        if dt_seconds.is_finite() && dt_seconds > 0.0 {
            self.now_seconds += f64::from(dt_seconds);
        }

        let now = self.now_seconds;
        let mut due = Vec::new();
        let mut index = 0;
        while index < self.entries.len() {
            if self.entries[index].due_at_seconds <= now {
                due.push(self.entries.remove(index));
            } else {
                index += 1;
            }
        }
        due.sort_by(|a, b| {
            a.due_at_seconds
                .total_cmp(&b.due_at_seconds)
                .then(a.id.cmp(&b.id))
        });
        due.into_iter().map(|entry| entry.payload).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_fires_once_after_delay() {
        let mut timers = TimerQueue::new();
        timers.schedule(1.0, "hide");

        assert!(timers.advance(0.5).is_empty());
        assert_eq!(timers.advance(0.5), vec!["hide"]);
        assert!(timers.advance(5.0).is_empty());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timers = TimerQueue::new();
        let id = timers.schedule(1.0, 7);

        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(timers.advance(2.0).is_empty());
    }

    #[test]
    fn due_timers_fire_in_deadline_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(3.0, "late");
        timers.schedule(1.0, "early");
        timers.schedule(1.0, "early_second");

        assert_eq!(timers.advance(4.0), vec!["early", "early_second", "late"]);
    }

    #[test]
    fn delay_is_measured_from_schedule_time() {
        let mut timers = TimerQueue::new();
        timers.advance(10.0);
        let id = timers.schedule(2.0, ());

        assert!(timers.advance(1.0).is_empty());
        assert!(timers.is_scheduled(id));
        assert_eq!(timers.advance(1.0).len(), 1);
    }

    #[test]
    fn non_finite_delay_fires_on_next_advance() {
        let mut timers = TimerQueue::new();
        timers.schedule(f32::NAN, "now");
        assert_eq!(timers.advance(0.0), vec!["now"]);
    }
}
