//! Application-level configuration constants.

// Element id shared between the view and the DOM effect layer.
pub const ROWER_ID: &str = "rower-figure";

// Audio cue sources, relative to the served root.
pub const COUNTDOWN_CUE_SRC: &str = "audio/countdown.mp3";
pub const CATCH_CUE_SRC: &str = "audio/catch.mp3";
pub const RECOVER_CUE_SRC: &str = "audio/recover.mp3";

// Input field ids.
pub const CADENCE_INPUT_ID: &str = "cadence-input";
pub const DRIVE_INPUT_ID: &str = "drive-time-input";
pub const RECOVER_INPUT_ID: &str = "recover-time-input";
