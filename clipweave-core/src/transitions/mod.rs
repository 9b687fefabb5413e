// ============================================================================
// clipweave-core/src/transitions/mod.rs
// ============================================================================
//
// TRANSITIONS: Catalog, Planning and Timing
//
// This module turns the request-level transition knobs into something the
// graph builder can fold over: a closed catalog of transition kinds, a plan
// with one entry per clip boundary, and the timing rules that keep every
// cross-fade inside the clips it joins.
//
// KEY COMPONENTS:
// - TransitionKind: closed catalog with xfade mappings
// - build_plan: default/explicit sequence expansion
// - TimelineCursor: offset and effective duration per boundary

pub mod catalog;
pub mod plan;
pub mod timing;

pub use catalog::{
    DEFAULT_TRANSITION_DURATION, DEFAULT_WHIP_PAN_SFX_GAIN_DB, MAX_TRANSITION_DURATION,
    MIN_TRANSITION_DURATION, TransitionKind, normalize_duration, normalize_gain,
    normalize_track_id, normalize_type,
};
pub use plan::{TransitionPlan, build_plan};
pub use timing::{BoundaryTiming, TimelineCursor, effective_duration, offset};
