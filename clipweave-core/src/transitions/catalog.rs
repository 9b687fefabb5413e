//! Transition catalog and request knob normalization.
//!
//! The catalog is closed: every request-level transition name maps to one
//! [`TransitionKind`], and each kind (except `None`) maps to an ffmpeg `xfade`
//! transition identifier. Unknown names are rejected, numeric knobs are clamped.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shortest transition the planner will produce, in seconds.
pub const MIN_TRANSITION_DURATION: f64 = 0.2;

/// Longest transition a request may ask for, in seconds.
pub const MAX_TRANSITION_DURATION: f64 = 5.0;

/// Transition duration used when the request does not specify one.
pub const DEFAULT_TRANSITION_DURATION: f64 = 0.8;

pub const MIN_WHIP_PAN_SFX_GAIN_DB: f64 = -60.0;
pub const MAX_WHIP_PAN_SFX_GAIN_DB: f64 = 6.0;
pub const DEFAULT_WHIP_PAN_SFX_GAIN_DB: f64 = -6.0;

pub const MIN_TRANSITION_SFX_TRACK_ID: i64 = 0;
pub const MAX_TRANSITION_SFX_TRACK_ID: i64 = 15;

/// One entry of the transition catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    None,
    Fade,
    FadeBlack,
    WipeLeft,
    WipeRight,
    SmoothLeft,
    SmoothRight,
    WhipPan,
    CircleOpen,
    CircleClose,
    Pixelize,
}

impl TransitionKind {
    /// Every catalog entry, in declaration order.
    pub const ALL: [TransitionKind; 11] = [
        TransitionKind::None,
        TransitionKind::Fade,
        TransitionKind::FadeBlack,
        TransitionKind::WipeLeft,
        TransitionKind::WipeRight,
        TransitionKind::SmoothLeft,
        TransitionKind::SmoothRight,
        TransitionKind::WhipPan,
        TransitionKind::CircleOpen,
        TransitionKind::CircleClose,
        TransitionKind::Pixelize,
    ];

    /// Request-level key for this transition.
    pub fn key(self) -> &'static str {
        match self {
            TransitionKind::None => "none",
            TransitionKind::Fade => "fade",
            TransitionKind::FadeBlack => "fade_black",
            TransitionKind::WipeLeft => "wipe_left",
            TransitionKind::WipeRight => "wipe_right",
            TransitionKind::SmoothLeft => "smooth_left",
            TransitionKind::SmoothRight => "smooth_right",
            TransitionKind::WhipPan => "whip_pan",
            TransitionKind::CircleOpen => "circle_open",
            TransitionKind::CircleClose => "circle_close",
            TransitionKind::Pixelize => "pixelize",
        }
    }

    /// The ffmpeg `xfade` transition this kind renders with.
    ///
    /// Whip pan uses `slideleft` as its sharp base layer before the blur blend.
    pub fn xfade_name(self) -> Option<&'static str> {
        match self {
            TransitionKind::None => None,
            TransitionKind::Fade => Some("fade"),
            TransitionKind::FadeBlack => Some("fadeblack"),
            TransitionKind::WipeLeft => Some("wipeleft"),
            TransitionKind::WipeRight => Some("wiperight"),
            TransitionKind::SmoothLeft => Some("smoothleft"),
            TransitionKind::SmoothRight => Some("smoothright"),
            TransitionKind::WhipPan => Some("slideleft"),
            TransitionKind::CircleOpen => Some("circleopen"),
            TransitionKind::CircleClose => Some("circleclose"),
            TransitionKind::Pixelize => Some("pixelize"),
        }
    }

    pub fn is_none(self) -> bool {
        self == TransitionKind::None
    }

    /// Sorted, comma-separated list of valid keys for error messages.
    pub fn valid_keys() -> String {
        let mut keys: Vec<&str> = Self::ALL.iter().map(|kind| kind.key()).collect();
        keys.sort_unstable();
        keys.join(", ")
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Resolves a request-level transition name. Empty names fall back to `none`.
pub fn normalize_type(requested: &str) -> CoreResult<TransitionKind> {
    let key = requested.trim().to_lowercase();
    if key.is_empty() {
        return Ok(TransitionKind::None);
    }

    TransitionKind::ALL
        .iter()
        .copied()
        .find(|kind| kind.key() == key)
        .ok_or_else(|| CoreError::UnsupportedTransition {
            requested: requested.to_string(),
            valid: TransitionKind::valid_keys(),
        })
}

/// Clamps a transition duration into `[MIN_TRANSITION_DURATION, MAX_TRANSITION_DURATION]`.
pub fn normalize_duration(duration: f64) -> CoreResult<f64> {
    clamp_finite(
        duration,
        MIN_TRANSITION_DURATION,
        MAX_TRANSITION_DURATION,
        "transition_duration",
    )
}

/// Clamps the whip pan sound effect gain into `[-60, 6]` dB.
pub fn normalize_gain(gain_db: f64) -> CoreResult<f64> {
    clamp_finite(
        gain_db,
        MIN_WHIP_PAN_SFX_GAIN_DB,
        MAX_WHIP_PAN_SFX_GAIN_DB,
        "whip_pan_sfx_gain_db",
    )
}

/// Clamps a dedicated SFX track id into `[0, 15]`; `None` means "mix into main audio".
pub fn normalize_track_id(track_id: Option<i64>) -> Option<u8> {
    track_id.map(|id| id.clamp(MIN_TRANSITION_SFX_TRACK_ID, MAX_TRANSITION_SFX_TRACK_ID) as u8)
}

fn clamp_finite(value: f64, min: f64, max: f64, name: &str) -> CoreResult<f64> {
    if !value.is_finite() {
        return Err(CoreError::InvalidInput(format!("{name} must be a number")));
    }
    Ok(value.clamp(min, max))
}
