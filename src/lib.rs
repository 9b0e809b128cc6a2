//! Pace-derivation core for the stroke tempo metronome.
//!
//! Owns the three pace values (cadence, drive time, recover time), tracks
//! which two the user supplied most recently, and computes the third so that
//! `cadence == 60 / (drive_time + recover_time)` holds to two decimal
//! places. The repeating stroke cycle itself lives in [`scheduler`], built
//! on the cancellable timers in [`timer`].

use log::{error, warn};
use std::collections::VecDeque;
use std::fmt;

/// One of the three user-editable pace fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaceField {
    /// Strokes per minute.
    Cadence,
    /// Seconds spent in the propulsion phase of one stroke.
    DriveTime,
    /// Seconds spent in the return phase of one stroke.
    RecoverTime,
}

impl PaceField {
    pub const ALL: [PaceField; 3] = [
        PaceField::Cadence,
        PaceField::DriveTime,
        PaceField::RecoverTime,
    ];

    /// Name used in logs and user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            PaceField::Cadence => "cadence",
            PaceField::DriveTime => "drive time",
            PaceField::RecoverTime => "recover time",
        }
    }
}

/// Error cases for pace derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaceError {
    /// The two supplied values are numerically inconsistent: the third
    /// would come out negative or unbounded. Recoverable; the model has
    /// already reset itself by the time this is returned.
    InvalidPace,
    /// The recency tracker and the settings record disagree about which
    /// field is derivable. A precondition violation in the calling code,
    /// fatal under debug assertions.
    Internal,
}

impl fmt::Display for PaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaceError::InvalidPace => {
                write!(f, "pace values are inconsistent; all fields were cleared")
            }
            PaceError::Internal => write!(f, "pace model is in an inconsistent state"),
        }
    }
}

impl std::error::Error for PaceError {}

/// The three pace values. Times are seconds, cadence is strokes per
/// minute. Zero means "not yet known".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PaceSettings {
    pub cadence: f64,
    pub drive_time: f64,
    pub recover_time: f64,
}

impl PaceSettings {
    pub fn get(&self, field: PaceField) -> f64 {
        match field {
            PaceField::Cadence => self.cadence,
            PaceField::DriveTime => self.drive_time,
            PaceField::RecoverTime => self.recover_time,
        }
    }

    pub fn set(&mut self, field: PaceField, value: f64) {
        match field {
            PaceField::Cadence => self.cadence = value,
            PaceField::DriveTime => self.drive_time = value,
            PaceField::RecoverTime => self.recover_time = value,
        }
    }

    /// True once all three values are known.
    pub fn is_complete(&self) -> bool {
        self.cadence > 0.0 && self.drive_time > 0.0 && self.recover_time > 0.0
    }
}

/// Ordered buffer of the last two distinct fields the user edited.
///
/// The field *not* in the buffer is the one to derive. Entries are always
/// distinct; re-editing the most recent field leaves the buffer unchanged.
#[derive(Debug, Clone, Default)]
pub struct RecencyTracker {
    entries: VecDeque<PaceField>,
}

impl RecencyTracker {
    pub fn record(&mut self, field: PaceField) {
        if self.entries.back() == Some(&field) {
            return;
        }
        self.entries.retain(|entry| *entry != field);
        self.entries.push_back(field);
        if self.entries.len() > 2 {
            self.entries.pop_front();
        }
    }

    /// True once two distinct fields have been edited.
    pub fn is_full(&self) -> bool {
        self.entries.len() == 2
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn contains(&self, field: PaceField) -> bool {
        self.entries.contains(&field)
    }
}

/// Parse a raw input-field string. Junk, empty, negative, and non-finite
/// inputs all collapse to 0 ("not yet known").
pub fn parse_field_input(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .unwrap_or(0.0)
}

/// Round to two decimal places, ties away from zero.
///
/// The tie must be decided on the decimal value: `(value * 100.0).round()`
/// resolves it on the binary approximation instead (2.675 × 100 lands just
/// under 267.5), so the value is re-read with a shifted decimal exponent
/// before rounding.
pub fn round_to_hundredths(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let shifted: f64 = format!("{value}e2").parse().unwrap_or(value * 100.0);
    shifted.round() / 100.0
}

/// Owns the pace values and the edit-recency tracker; derives the one
/// field the user did not supply.
#[derive(Debug, Clone, Default)]
pub struct PaceModel {
    settings: PaceSettings,
    recency: RecencyTracker,
}

impl PaceModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> PaceSettings {
        self.settings
    }

    /// Store a raw user edit. Never derives on its own; callers check
    /// [`ready_to_derive`](Self::ready_to_derive) first.
    pub fn record_edit(&mut self, field: PaceField, raw: &str) {
        let value = parse_field_input(raw);
        self.settings.set(field, value);
        self.recency.record(field);
    }

    /// True once two distinct fields have been edited, so the third can
    /// be computed.
    pub fn ready_to_derive(&self) -> bool {
        self.recency.is_full()
    }

    /// Compute the one field absent from the recency tracker.
    ///
    /// On [`PaceError::InvalidPace`] the model has fully reset itself; it
    /// is never observed partially updated.
    pub fn derive_remaining(&mut self) -> Result<PaceField, PaceError> {
        let missing: Vec<PaceField> = PaceField::ALL
            .into_iter()
            .filter(|field| !self.recency.contains(*field))
            .collect();
        let derived = match missing[..] {
            [field] => field,
            _ => {
                debug_assert!(false, "recency tracker out of sync with the settings record");
                error!("pace model in an inconsistent state; resetting");
                self.reset();
                return Err(PaceError::Internal);
            }
        };

        let value = match derived {
            PaceField::Cadence => self.derive_cadence(),
            PaceField::DriveTime => self.derive_split(self.settings.recover_time),
            PaceField::RecoverTime => self.derive_split(self.settings.drive_time),
        };
        match value {
            Some(value) => {
                self.settings.set(derived, value);
                Ok(derived)
            }
            None => {
                warn!(
                    "inconsistent pace input for {}; clearing all fields",
                    derived.label()
                );
                self.reset();
                Err(PaceError::InvalidPace)
            }
        }
    }

    fn derive_cadence(&self) -> Option<f64> {
        let iteration = self.settings.drive_time + self.settings.recover_time;
        if iteration <= 0.0 {
            return None;
        }
        Some(round_to_hundredths(60.0 / iteration))
    }

    /// Remaining share of one stroke after subtracting the other phase.
    fn derive_split(&self, other_phase: f64) -> Option<f64> {
        if self.settings.cadence <= 0.0 {
            return None;
        }
        let value = round_to_hundredths(60.0 / self.settings.cadence - other_phase);
        (value >= 0.0).then_some(value)
    }

    /// Zero all fields and forget the edit history. Idempotent.
    pub fn reset(&mut self) {
        self.settings = PaceSettings::default();
        self.recency.clear();
    }
}

/// The two numeric parameters the CSS stroke animation needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeKeyframes {
    /// Seconds per full stroke cycle.
    pub cycle_secs: f64,
    /// Percentage of the cycle spent in the drive phase.
    pub drive_pct: f64,
}

/// Animation parameters for the current pace, or `None` while any value
/// is still unknown.
pub fn stroke_keyframes(settings: &PaceSettings) -> Option<StrokeKeyframes> {
    if !settings.is_complete() {
        return None;
    }
    Some(StrokeKeyframes {
        cycle_secs: 60.0 / settings.cadence,
        drive_pct: 100.0 * settings.drive_time / (settings.drive_time + settings.recover_time),
    })
}

pub mod scheduler;
pub mod timer;
