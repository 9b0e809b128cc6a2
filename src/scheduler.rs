//! Repeating stroke-cycle sequencer.
//!
//! Runs a countdown and then one iteration per stroke: audio cues and
//! phase highlights at offsets derived from the current pace. Everything
//! is built on cancellable labeled delays so one stop call tears the
//! whole run down, leaving no stale timer to fire afterwards.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::timer::{DelayHost, DelaySet, TimerLabel};
use crate::PaceSettings;

/// Delay between pressing start and the first stroke, covering the
/// countdown cue.
pub const COUNTDOWN_MS: u32 = 3300;

/// How long the catch/finish highlight stays on the figure.
pub const HIGHLIGHT_MS: u32 = 250;

/// Audio cues the scheduler can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Countdown,
    Catch,
    Recover,
}

/// Momentary stroke positions highlighted on the rower figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokePhase {
    Catch,
    Finish,
}

/// Side effects the scheduler triggers but does not implement.
pub trait StrokeEffects {
    /// Play one audio cue from its start.
    fn play_cue(&self, cue: Cue);

    /// Pause any cue currently playing.
    fn halt_cues(&self);

    /// Highlight a stroke phase, or clear the highlight with `None`.
    fn set_phase(&self, phase: Option<StrokePhase>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Countdown,
    Cycling,
}

struct Inner<E, H: DelayHost> {
    state: RunState,
    pace: PaceSettings,
    effects: E,
    timers: DelaySet<H>,
}

/// Cancellable repeating stroke sequence.
///
/// Cheap to clone; clones share one underlying run, so UI callbacks can
/// each hold their own copy.
pub struct CycleScheduler<E, H>
where
    E: StrokeEffects + 'static,
    H: DelayHost + 'static,
{
    inner: Rc<RefCell<Inner<E, H>>>,
}

impl<E, H> Clone for CycleScheduler<E, H>
where
    E: StrokeEffects + 'static,
    H: DelayHost + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E, H> CycleScheduler<E, H>
where
    E: StrokeEffects + 'static,
    H: DelayHost + 'static,
{
    pub fn new(effects: E, host: H) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                state: RunState::Idle,
                pace: PaceSettings::default(),
                effects,
                timers: DelaySet::new(host),
            })),
        }
    }

    /// Begin a run at `pace`. No-op unless idle and the pace is complete;
    /// a toggle control that wants restart semantics calls
    /// [`stop`](Self::stop) first.
    pub fn start(&self, pace: PaceSettings) {
        let mut inner = self.inner.borrow_mut();
        if inner.state != RunState::Idle || !pace.is_complete() {
            return;
        }
        debug!("starting stroke cycle at {:.2} spm", pace.cadence);
        inner.state = RunState::Countdown;
        inner.pace = pace;
        inner.effects.play_cue(Cue::Countdown);

        let shared = Rc::clone(&self.inner);
        inner.timers.schedule(
            TimerLabel::Countdown,
            COUNTDOWN_MS,
            Box::new(move || begin_cycling(&shared)),
        );
    }

    /// Cancel every pending delay, silence cues, clear the highlight and
    /// return to idle. Safe from any state, including idle.
    pub fn stop(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.state != RunState::Idle {
            debug!("stopping stroke cycle");
        }
        inner.timers.cancel_all();
        inner.effects.halt_cues();
        inner.effects.set_phase(None);
        inner.state = RunState::Idle;
    }

    pub fn is_running(&self) -> bool {
        self.inner.borrow().state != RunState::Idle
    }
}

fn begin_cycling<E, H>(inner: &Rc<RefCell<Inner<E, H>>>)
where
    E: StrokeEffects + 'static,
    H: DelayHost + 'static,
{
    {
        let mut guard = inner.borrow_mut();
        if guard.state != RunState::Countdown {
            return;
        }
        guard.state = RunState::Cycling;
    }
    run_iteration(inner);
}

/// One iteration boundary: re-trigger the sound and highlight
/// sub-sequences, then arm the next boundary one cycle period out. The
/// sub-sequences run concurrently and none waits for another.
fn run_iteration<E, H>(inner: &Rc<RefCell<Inner<E, H>>>)
where
    E: StrokeEffects + 'static,
    H: DelayHost + 'static,
{
    let mut guard = inner.borrow_mut();
    if guard.state != RunState::Cycling {
        return;
    }

    let drive_ms = to_millis(guard.pace.drive_time);
    let period_ms = to_millis(60.0 / guard.pace.cadence);

    // Sound: catch now, recover once the drive is done.
    guard.effects.play_cue(Cue::Catch);
    let shared = Rc::clone(inner);
    guard.timers.schedule(
        TimerLabel::RecoverCue,
        drive_ms,
        Box::new(move || shared.borrow_mut().effects.play_cue(Cue::Recover)),
    );

    // Catch highlight: on now, off after the highlight window.
    guard.effects.set_phase(Some(StrokePhase::Catch));
    let shared = Rc::clone(inner);
    guard.timers.schedule(
        TimerLabel::CatchHighlightEnd,
        HIGHLIGHT_MS,
        Box::new(move || shared.borrow_mut().effects.set_phase(None)),
    );

    // Finish highlight: on at the end of the drive, off shortly after.
    let shared = Rc::clone(inner);
    guard.timers.schedule(
        TimerLabel::FinishHighlight,
        drive_ms,
        Box::new(move || {
            let clear = Rc::clone(&shared);
            let mut guard = shared.borrow_mut();
            guard.effects.set_phase(Some(StrokePhase::Finish));
            guard.timers.schedule(
                TimerLabel::FinishHighlightEnd,
                HIGHLIGHT_MS,
                Box::new(move || clear.borrow_mut().effects.set_phase(None)),
            );
        }),
    );

    // The boundary is self-timed: one full cycle after this one.
    let shared = Rc::clone(inner);
    guard.timers.schedule(
        TimerLabel::IterationBoundary,
        period_ms,
        Box::new(move || run_iteration(&shared)),
    );
}

fn to_millis(seconds: f64) -> u32 {
    (seconds * 1000.0).round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::testing::TestTimers;

    #[derive(Debug, Clone, PartialEq)]
    enum Effect {
        Cue(Cue),
        Phase(Option<StrokePhase>),
        Halt,
    }

    #[derive(Clone, Default)]
    struct RecordingEffects {
        seen: Rc<RefCell<Vec<Effect>>>,
    }

    impl RecordingEffects {
        fn take(&self) -> Vec<Effect> {
            self.seen.borrow_mut().drain(..).collect()
        }
    }

    impl StrokeEffects for RecordingEffects {
        fn play_cue(&self, cue: Cue) {
            self.seen.borrow_mut().push(Effect::Cue(cue));
        }

        fn halt_cues(&self) {
            self.seen.borrow_mut().push(Effect::Halt);
        }

        fn set_phase(&self, phase: Option<StrokePhase>) {
            self.seen.borrow_mut().push(Effect::Phase(phase));
        }
    }

    /// Cadence 20 spm, 1 s drive, 2 s recover: a 3 s cycle.
    fn test_pace() -> PaceSettings {
        PaceSettings {
            cadence: 20.0,
            drive_time: 1.0,
            recover_time: 2.0,
        }
    }

    fn harness() -> (
        CycleScheduler<RecordingEffects, TestTimers>,
        RecordingEffects,
        TestTimers,
    ) {
        let effects = RecordingEffects::default();
        let timers = TestTimers::default();
        let scheduler = CycleScheduler::new(effects.clone(), timers.clone());
        (scheduler, effects, timers)
    }

    #[test]
    fn start_requires_a_complete_pace() {
        let (scheduler, effects, timers) = harness();
        scheduler.start(PaceSettings {
            cadence: 20.0,
            drive_time: 0.0,
            recover_time: 2.0,
        });
        assert!(!scheduler.is_running());
        assert_eq!(effects.take(), vec![]);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn countdown_precedes_the_first_stroke() {
        let (scheduler, effects, timers) = harness();
        scheduler.start(test_pace());
        assert!(scheduler.is_running());
        assert_eq!(effects.take(), vec![Effect::Cue(Cue::Countdown)]);

        timers.advance(u64::from(COUNTDOWN_MS) - 1);
        assert_eq!(effects.take(), vec![]);

        timers.advance(1);
        assert_eq!(
            effects.take(),
            vec![
                Effect::Cue(Cue::Catch),
                Effect::Phase(Some(StrokePhase::Catch)),
            ]
        );
    }

    #[test]
    fn iteration_timeline_follows_the_pace() {
        let (scheduler, effects, timers) = harness();
        scheduler.start(test_pace());
        timers.advance(u64::from(COUNTDOWN_MS));
        effects.take();

        // Catch highlight clears after the highlight window.
        timers.advance(250);
        assert_eq!(effects.take(), vec![Effect::Phase(None)]);

        // End of the drive: recover cue first, then the finish highlight.
        timers.advance(750);
        assert_eq!(
            effects.take(),
            vec![
                Effect::Cue(Cue::Recover),
                Effect::Phase(Some(StrokePhase::Finish)),
            ]
        );

        timers.advance(250);
        assert_eq!(effects.take(), vec![Effect::Phase(None)]);

        // Next boundary, one full cycle period after the first.
        timers.advance(1750);
        assert_eq!(
            effects.take(),
            vec![
                Effect::Cue(Cue::Catch),
                Effect::Phase(Some(StrokePhase::Catch)),
            ]
        );
    }

    #[test]
    fn cycle_repeats_until_stopped() {
        let (scheduler, effects, timers) = harness();
        scheduler.start(test_pace());
        timers.advance(u64::from(COUNTDOWN_MS) + 9_000);

        let catches = effects
            .take()
            .iter()
            .filter(|effect| **effect == Effect::Cue(Cue::Catch))
            .count();
        assert_eq!(catches, 4); // boundaries at 0 s, 3 s, 6 s and 9 s
    }

    #[test]
    fn stop_cancels_every_pending_delay() {
        let (scheduler, effects, timers) = harness();
        scheduler.start(test_pace());
        timers.advance(u64::from(COUNTDOWN_MS) + 100);
        effects.take();

        scheduler.stop();
        assert!(!scheduler.is_running());
        assert_eq!(effects.take(), vec![Effect::Halt, Effect::Phase(None)]);
        assert_eq!(timers.pending(), 0);

        // Past the original due times of everything that was in flight.
        timers.advance(60_000);
        assert_eq!(effects.take(), vec![]);
    }

    #[test]
    fn stop_during_countdown_cancels_the_run() {
        let (scheduler, effects, timers) = harness();
        scheduler.start(test_pace());
        effects.take();

        scheduler.stop();
        effects.take();

        timers.advance(60_000);
        assert_eq!(effects.take(), vec![]);
    }

    #[test]
    fn start_while_running_is_a_no_op() {
        let (scheduler, effects, timers) = harness();
        scheduler.start(test_pace());
        effects.take();

        scheduler.start(test_pace());
        assert_eq!(effects.take(), vec![]);

        // The original countdown still completes on schedule.
        timers.advance(u64::from(COUNTDOWN_MS));
        assert_eq!(
            effects.take(),
            vec![
                Effect::Cue(Cue::Catch),
                Effect::Phase(Some(StrokePhase::Catch)),
            ]
        );
    }

    #[test]
    fn stop_when_idle_is_safe() {
        let (scheduler, effects, _timers) = harness();
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());
        assert_eq!(
            effects.take(),
            vec![
                Effect::Halt,
                Effect::Phase(None),
                Effect::Halt,
                Effect::Phase(None),
            ]
        );
    }

    #[test]
    fn restart_after_stop_runs_a_fresh_countdown() {
        let (scheduler, effects, timers) = harness();
        scheduler.start(test_pace());
        timers.advance(u64::from(COUNTDOWN_MS) + 500);
        scheduler.stop();
        effects.take();

        scheduler.start(test_pace());
        assert_eq!(effects.take(), vec![Effect::Cue(Cue::Countdown)]);
        timers.advance(u64::from(COUNTDOWN_MS));
        assert_eq!(
            effects.take(),
            vec![
                Effect::Cue(Cue::Catch),
                Effect::Phase(Some(StrokePhase::Catch)),
            ]
        );
    }
}
