//! Per-boundary transition plans.

use super::catalog::{TransitionKind, normalize_type};
use crate::error::{CoreError, CoreResult};

/// One transition per clip boundary, in timeline order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransitionPlan {
    entries: Vec<TransitionKind>,
}

impl TransitionPlan {
    pub fn entries(&self) -> &[TransitionKind] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when at least one boundary needs graph synthesis.
    ///
    /// A plan of only `none` entries (or no entries) is a plain concatenation.
    pub fn requires_transitions(&self) -> bool {
        self.entries.iter().any(|kind| !kind.is_none())
    }

    /// True when any boundary uses the whip pan compositor.
    pub fn uses_whip_pan(&self) -> bool {
        self.entries.contains(&TransitionKind::WhipPan)
    }
}

/// Expands a request into one transition per boundary.
///
/// Without an explicit sequence every boundary gets `default_kind`. An explicit
/// sequence must name exactly one real transition per boundary; short lists are
/// rejected rather than padded.
pub fn build_plan<S: AsRef<str>>(
    clip_count: usize,
    default_kind: TransitionKind,
    explicit_sequence: Option<&[S]>,
) -> CoreResult<TransitionPlan> {
    let boundaries = clip_count.saturating_sub(1);

    let Some(sequence) = explicit_sequence else {
        return Ok(TransitionPlan {
            entries: vec![default_kind; boundaries],
        });
    };

    if sequence.len() != boundaries {
        return Err(CoreError::LengthMismatch {
            expected: boundaries,
            actual: sequence.len(),
        });
    }

    let entries = sequence
        .iter()
        .enumerate()
        .map(|(index, requested)| {
            let kind = normalize_type(requested.as_ref())?;
            if kind.is_none() {
                return Err(CoreError::InvalidSequenceEntry {
                    index,
                    entry: requested.as_ref().to_string(),
                });
            }
            Ok(kind)
        })
        .collect::<CoreResult<Vec<_>>>()?;

    Ok(TransitionPlan { entries })
}
