//! Per-boundary timing.
//!
//! A transition overlaps the tail of the running composite with the head of
//! the next clip, so it may never be longer than either side. The resolver
//! keeps a small safety margin below that bound so cross-fades never read
//! past a clip's last frame.

use super::catalog::MIN_TRANSITION_DURATION;
use crate::error::{CoreError, CoreResult};

/// Gap kept between a transition and the shorter adjacent clip's length.
pub const TRANSITION_SAFETY_MARGIN: f64 = 0.05;

/// Where a transition starts on the running composite and how long it lasts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryTiming {
    pub offset: f64,
    pub duration: f64,
}

/// Computes the transition length actually used at one boundary.
///
/// Fails with `TransitionTooLong` when the request exceeds either adjacent
/// clip, or when the clips are too short to fit even the minimum transition
/// inside the safety margin.
pub fn effective_duration(
    requested: f64,
    previous_tail: f64,
    next_clip: f64,
) -> CoreResult<f64> {
    let too_long = || CoreError::TransitionTooLong {
        requested,
        previous_tail,
        next_clip,
    };

    let max_allowed = previous_tail.min(next_clip);
    if requested > max_allowed {
        return Err(too_long());
    }

    let safe_cap = (max_allowed - TRANSITION_SAFETY_MARGIN).max(MIN_TRANSITION_DURATION);
    let effective = requested.min(safe_cap);

    if effective < MIN_TRANSITION_DURATION || effective > max_allowed - TRANSITION_SAFETY_MARGIN {
        return Err(too_long());
    }
    Ok(effective)
}

/// Timeline position where a transition of `effective` seconds starts.
pub fn offset(cumulative_duration: f64, effective: f64) -> f64 {
    (cumulative_duration - effective).max(0.0)
}

/// Fold state carried across boundaries while building the composite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineCursor {
    cumulative_duration: f64,
    trailing_clip_duration: f64,
}

impl TimelineCursor {
    /// Starts the fold with the first clip.
    pub fn new(first_clip_duration: f64) -> Self {
        Self {
            cumulative_duration: first_clip_duration,
            trailing_clip_duration: first_clip_duration,
        }
    }

    /// Resolves the next boundary and moves the cursor past it.
    pub fn advance(&mut self, requested: f64, next_clip_duration: f64) -> CoreResult<BoundaryTiming> {
        let duration =
            effective_duration(requested, self.trailing_clip_duration, next_clip_duration)?;
        let timing = BoundaryTiming {
            offset: offset(self.cumulative_duration, duration),
            duration,
        };

        self.cumulative_duration += next_clip_duration - duration;
        self.trailing_clip_duration = next_clip_duration;
        Ok(timing)
    }

    /// Appends a clip with no overlap (hard cut).
    pub fn append(&mut self, next_clip_duration: f64) {
        self.cumulative_duration += next_clip_duration;
        self.trailing_clip_duration = next_clip_duration;
    }

    /// Length of the composite built so far.
    pub fn cumulative_duration(&self) -> f64 {
        self.cumulative_duration
    }
}
