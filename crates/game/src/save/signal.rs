use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Restored,
    NoSave,
    Corrupt,
}

impl LoadOutcome {
    /// Whether a save file was found and applied.
    pub fn found(self) -> bool {
        matches!(self, LoadOutcome::Restored)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LoadOutcome::Restored => "restored",
            LoadOutcome::NoSave => "no_save",
            LoadOutcome::Corrupt => "corrupt",
        }
    }
}

/// Receiving end of the one-shot load notification.
#[derive(Debug)]
pub struct LoadListener {
    receiver: Receiver<LoadOutcome>,
    outcome: Option<LoadOutcome>,
}

impl LoadListener {
    /// Returns the outcome once the load has finished. A listener whose
    /// signal was re-armed before firing stays pending.
    pub fn poll(&mut self) -> Option<LoadOutcome> {
        if self.outcome.is_none() {
            match self.receiver.try_recv() {
                Ok(outcome) => self.outcome = Some(outcome),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => {}
            }
        }
        self.outcome
    }

    pub fn is_ready(&mut self) -> bool {
        self.poll().is_some()
    }
}

#[derive(Debug, Default)]
pub(crate) struct LoadSignal {
    fired: Option<LoadOutcome>,
    pending: Vec<Sender<LoadOutcome>>,
}

impl LoadSignal {
    pub(crate) fn subscribe(&mut self) -> LoadListener {
        let (sender, receiver) = mpsc::channel();
        match self.fired {
            Some(outcome) => {
                let _ = sender.send(outcome);
            }
            None => self.pending.push(sender),
        }
        LoadListener {
            receiver,
            outcome: None,
        }
    }

    pub(crate) fn fire(&mut self, outcome: LoadOutcome) {
        self.fired = Some(outcome);
        for sender in self.pending.drain(..) {
            // A dropped listener belonged to an object that is already gone.
            let _ = sender.send(outcome);
        }
    }

    pub(crate) fn rearm(&mut self) {
        self.fired = None;
        self.pending.clear();
    }

    pub(crate) fn fired(&self) -> Option<LoadOutcome> {
        self.fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listener_is_pending_until_fired() {
        let mut signal = LoadSignal::default();
        let mut listener = signal.subscribe();

        assert_eq!(listener.poll(), None);
        signal.fire(LoadOutcome::NoSave);
        assert_eq!(listener.poll(), Some(LoadOutcome::NoSave));
        assert_eq!(listener.poll(), Some(LoadOutcome::NoSave));
    }

    #[test]
    fn late_subscriber_receives_outcome_immediately() {
        let mut signal = LoadSignal::default();
        signal.fire(LoadOutcome::Restored);

        let mut listener = signal.subscribe();
        assert_eq!(listener.poll(), Some(LoadOutcome::Restored));
    }

    #[test]
    fn rearm_leaves_old_listeners_pending() {
        let mut signal = LoadSignal::default();
        let mut stale = signal.subscribe();
        signal.rearm();
        signal.fire(LoadOutcome::Corrupt);

        assert_eq!(stale.poll(), None);
        assert_eq!(signal.subscribe().poll(), Some(LoadOutcome::Corrupt));
    }

    #[test]
    fn dropped_listener_does_not_block_others() {
        let mut signal = LoadSignal::default();
        drop(signal.subscribe());
        let mut kept = signal.subscribe();

        signal.fire(LoadOutcome::NoSave);
        assert!(kept.is_ready());
    }

    #[test]
    fn only_restored_counts_as_found() {
        assert!(LoadOutcome::Restored.found());
        assert!(!LoadOutcome::NoSave.found());
        assert!(!LoadOutcome::Corrupt.found());
    }
}
