//! Display formatting helpers for the pace fields and the rower figure.

use stroke_tempo::StrokeKeyframes;

/// Shortest decimal form of a pace value for an input field. Zero renders
/// as an empty field ("not yet known").
pub fn format_pace_value(value: f64) -> String {
    if value == 0.0 {
        String::new()
    } else {
        format!("{value}")
    }
}

/// Inline style carrying the stroke animation parameters as CSS custom
/// properties; empty until the pace is complete.
pub fn keyframe_style(keyframes: Option<StrokeKeyframes>) -> String {
    match keyframes {
        Some(keyframes) => format!(
            "--stroke-cycle:{:.2}s;--drive-pct:{:.1}%;",
            keyframes.cycle_secs, keyframes.drive_pct
        ),
        None => String::new(),
    }
}
