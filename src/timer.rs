//! Cancellable fire-once timers, keyed by label.
//!
//! The cycle scheduler owns every pending timer through a [`DelaySet`].
//! Dropping a handle cancels the underlying timer, so replacing an entry
//! or clearing the set is the cancellation mechanism; a cancelled callback
//! never runs.

use std::collections::HashMap;

use gloo_timers::callback::Timeout;

/// Labels for every delay the cycle scheduler keeps in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerLabel {
    Countdown,
    IterationBoundary,
    RecoverCue,
    CatchHighlightEnd,
    FinishHighlight,
    FinishHighlightEnd,
}

/// A fire-once timer source. The returned handle cancels its timer when
/// dropped.
pub trait DelayHost {
    type Handle: 'static;

    fn schedule(&self, duration_ms: u32, run: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Browser timers via `setTimeout`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserDelays;

impl DelayHost for BrowserDelays {
    type Handle = Timeout;

    fn schedule(&self, duration_ms: u32, run: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(duration_ms, run)
    }
}

/// Pending timers for one scheduler run, keyed by label.
pub struct DelaySet<H: DelayHost> {
    host: H,
    pending: HashMap<TimerLabel, H::Handle>,
}

impl<H: DelayHost> DelaySet<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            pending: HashMap::new(),
        }
    }

    /// Run `run` after `duration_ms`, registered under `label`. A timer
    /// already pending under the same label is cancelled by the
    /// replacement.
    pub fn schedule(&mut self, label: TimerLabel, duration_ms: u32, run: Box<dyn FnOnce()>) {
        let handle = self.host.schedule(duration_ms, run);
        self.pending.insert(label, handle);
    }

    /// Cancel one pending timer. Unknown labels are a no-op.
    pub fn cancel(&mut self, label: TimerLabel) {
        self.pending.remove(&label);
    }

    /// Cancel every pending timer. This is the global stop.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::TestTimers;
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn flag() -> (Rc<Cell<bool>>, Box<dyn FnOnce()>) {
        let fired = Rc::new(Cell::new(false));
        let inner = Rc::clone(&fired);
        (fired, Box::new(move || inner.set(true)))
    }

    #[test]
    fn fires_after_its_duration() {
        let timers = TestTimers::default();
        let (fired, run) = flag();
        let _handle = timers.schedule(250, run);

        timers.advance(249);
        assert!(!fired.get());
        timers.advance(1);
        assert!(fired.get());
    }

    #[test]
    fn dropped_handle_never_fires() {
        let timers = TestTimers::default();
        let (fired, run) = flag();
        let handle = timers.schedule(250, run);
        drop(handle);

        timers.advance(1_000);
        assert!(!fired.get());
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn replacing_a_label_cancels_the_old_timer() {
        let timers = TestTimers::default();
        let mut delays = DelaySet::new(timers.clone());
        let (old_fired, old_run) = flag();
        let (new_fired, new_run) = flag();

        delays.schedule(TimerLabel::Countdown, 100, old_run);
        delays.schedule(TimerLabel::Countdown, 200, new_run);

        timers.advance(500);
        assert!(!old_fired.get());
        assert!(new_fired.get());
    }

    #[test]
    fn cancel_removes_a_single_label() {
        let timers = TestTimers::default();
        let mut delays = DelaySet::new(timers.clone());
        let (countdown_fired, countdown_run) = flag();
        let (recover_fired, recover_run) = flag();

        delays.schedule(TimerLabel::Countdown, 100, countdown_run);
        delays.schedule(TimerLabel::RecoverCue, 100, recover_run);
        delays.cancel(TimerLabel::Countdown);

        timers.advance(500);
        assert!(!countdown_fired.get());
        assert!(recover_fired.get());
    }

    #[test]
    fn cancel_all_clears_every_label() {
        let timers = TestTimers::default();
        let mut delays = DelaySet::new(timers.clone());
        let (first_fired, first_run) = flag();
        let (second_fired, second_run) = flag();

        delays.schedule(TimerLabel::Countdown, 100, first_run);
        delays.schedule(TimerLabel::IterationBoundary, 200, second_run);
        delays.cancel_all();

        assert_eq!(delays.pending_count(), 0);
        timers.advance(1_000);
        assert!(!first_fired.get());
        assert!(!second_fired.get());
    }

    #[test]
    fn ties_fire_in_scheduling_order() {
        let timers = TestTimers::default();
        let order = Rc::new(RefCellOrder::default());

        let first = Rc::clone(&order);
        let _a = timers.schedule(100, Box::new(move || first.push("first")));
        let second = Rc::clone(&order);
        let _b = timers.schedule(100, Box::new(move || second.push("second")));

        timers.advance(100);
        assert_eq!(order.take(), vec!["first", "second"]);
    }

    #[derive(Default)]
    struct RefCellOrder(std::cell::RefCell<Vec<&'static str>>);

    impl RefCellOrder {
        fn push(&self, name: &'static str) {
            self.0.borrow_mut().push(name);
        }

        fn take(&self) -> Vec<&'static str> {
            self.0.borrow_mut().drain(..).collect()
        }
    }
}
