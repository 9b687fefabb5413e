//! Whip pan compositor.
//!
//! The visual effect is a `slideleft` cross-fade whose output is split into a
//! sharp copy and a heavily blurred copy, blended with a half-sine weight that
//! peaks at the middle of the transition. The audio side is an optional whoosh
//! sound trimmed, attenuated and delayed to the transition window.

use super::{Filter, FilterGraph, GraphInput, Label, MediaKind, Pad};
use crate::transitions::{BoundaryTiming, TransitionKind};
use crate::utils::format_decimal;
use std::path::Path;

/// Horizontal blur strength of the motion-blur layer.
pub const WHIP_PAN_BLUR_SIGMA: u32 = 100;

/// Whether the whip pan sound effect fired for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SoundEffectStatus {
    /// No boundary used the whip pan transition.
    #[default]
    NotRequested,
    /// The sound effect was placed at `events` boundaries.
    Applied { events: usize },
    /// Whip pan was used but the sound asset was not available; the video
    /// composite and plain audio cross-fade were still produced.
    AssetMissing,
}

/// Blend expression: sharp outside the window, half-sine towards blur inside it.
pub fn blend_expression(offset: f64, duration: f64) -> String {
    let start = format_decimal(offset);
    let length = format_decimal(duration);
    let end = format_decimal(offset + duration);
    format!("if(between(T,{start},{end}),A+(B-A)*sin((T-{start})/{length}*3.14159),A)")
}

/// Adds the whip pan video composite of `leading` into `trailing`.
pub fn composite_video(
    graph: &mut FilterGraph,
    leading: Pad,
    trailing: Pad,
    timing: BoundaryTiming,
) -> Label {
    let base = graph.apply(
        &[leading, trailing],
        Filter::new("xfade")
            .arg("transition", TransitionKind::WhipPan.xfade_name().unwrap_or("slideleft"))
            .decimal("duration", timing.duration)
            .decimal("offset", timing.offset),
        MediaKind::Video,
    );

    let layers = graph.apply_multi(
        &[base.into()],
        Filter::new("split"),
        &[MediaKind::Video, MediaKind::Video],
    );
    let (sharp, blur_source) = (layers[0].clone(), layers[1].clone());

    let blurred = graph.apply(
        &[blur_source.into()],
        Filter::new("gblur")
            .arg("sigma", WHIP_PAN_BLUR_SIGMA.to_string())
            .arg("steps", "1")
            .arg("sigmaV", "0"),
        MediaKind::Video,
    );

    graph.apply(
        &[sharp.into(), blurred.into()],
        Filter::new("blend").arg("all_expr", blend_expression(timing.offset, timing.duration)),
        MediaKind::Video,
    )
}

/// Adds the whoosh asset as a new input and returns the trimmed, delayed chain.
///
/// Gain is applied as a linear factor only when non-zero; the delay is only
/// inserted when the transition does not start at the very beginning.
pub fn sound_effect(
    graph: &mut FilterGraph,
    asset: &Path,
    offset: f64,
    duration: f64,
    gain_db: f64,
) -> Label {
    let input = graph.add_input(GraphInput::file(asset));

    let trimmed = graph.apply(
        &[Pad::audio(input)],
        Filter::new("atrim").arg("start", "0").decimal("duration", duration),
        MediaKind::Audio,
    );
    let mut effect = graph.apply(
        &[trimmed.into()],
        Filter::new("asetpts").positional("PTS-STARTPTS"),
        MediaKind::Audio,
    );

    if gain_db != 0.0 {
        let linear_gain = 10f64.powf(gain_db / 20.0);
        effect = graph.apply(
            &[effect.into()],
            Filter::new("volume").positional(format_decimal(linear_gain)),
            MediaKind::Audio,
        );
    }

    let delay_ms = (offset * 1000.0).round().max(0.0) as u64;
    if delay_ms > 0 {
        effect = graph.apply(
            &[effect.into()],
            Filter::new("adelay").positional(format!("{delay_ms}|{delay_ms}")),
            MediaKind::Audio,
        );
    }

    effect
}

/// Mixes the whoosh into an already cross-faded main audio stream.
pub fn mix_into(graph: &mut FilterGraph, main_audio: Label, effect: Label) -> Label {
    graph.apply(
        &[main_audio.into(), effect.into()],
        Filter::new("amix")
            .arg("inputs", "2")
            .arg("dropout_transition", "0"),
        MediaKind::Audio,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Weight the blend expression gives the blurred frame at time `t`.
    fn blur_weight(t: f64, offset: f64, duration: f64) -> f64 {
        if t < offset || t > offset + duration || duration <= 0.0 {
            return 0.0;
        }
        ((t - offset) / duration * std::f64::consts::PI).sin()
    }

    #[test]
    fn test_blend_expression() {
        assert_eq!(
            blend_expression(1.5, 0.5),
            "if(between(T,1.5,2),A+(B-A)*sin((T-1.5)/0.5*3.14159),A)"
        );
    }

    #[test]
    fn test_blur_weight_envelope() {
        assert_eq!(blur_weight(0.5, 1.0, 1.0), 0.0);
        assert_eq!(blur_weight(2.5, 1.0, 1.0), 0.0);
        assert!(blur_weight(1.0, 1.0, 1.0).abs() < 1e-12);
        assert!((blur_weight(1.5, 1.0, 1.0) - 1.0).abs() < 1e-12);
        assert!(blur_weight(2.0, 1.0, 1.0).abs() < 1e-12);
        assert!(blur_weight(1.25, 1.0, 1.0) > 0.5);
    }

    #[test]
    fn test_composite_video_chain() {
        let mut graph = FilterGraph::new("s");
        let timing = BoundaryTiming {
            offset: 1.5,
            duration: 0.5,
        };
        let out = composite_video(&mut graph, Pad::video(0), Pad::video(1), timing);

        assert_eq!(out.name(), "s4");
        assert_eq!(
            graph.render(),
            "[0:v][1:v]xfade=transition=slideleft:duration=0.5:offset=1.5[s0];\
             [s0]split[s1][s2];\
             [s2]gblur=sigma=100:steps=1:sigmaV=0[s3];\
             [s1][s3]blend=all_expr=if(between(T\\,1.5\\,2)\\,A+(B-A)*sin((T-1.5)/0.5*3.14159)\\,A)[s4]"
        );
    }

    #[test]
    fn test_sound_effect_with_gain_and_delay() {
        let mut graph = FilterGraph::new("s");
        let out = sound_effect(&mut graph, Path::new("/assets/whoosh.wav"), 1.5, 0.5, -6.0);

        assert_eq!(graph.inputs().len(), 1);
        assert_eq!(out.kind(), MediaKind::Audio);
        assert_eq!(
            graph.render(),
            "[0:a]atrim=start=0:duration=0.5[s0];\
             [s0]asetpts=PTS-STARTPTS[s1];\
             [s1]volume=0.501187[s2];\
             [s2]adelay=1500|1500[s3]"
        );
    }

    #[test]
    fn test_sound_effect_skips_unity_gain_and_zero_delay() {
        let mut graph = FilterGraph::new("s");
        sound_effect(&mut graph, Path::new("/assets/whoosh.wav"), 0.0, 0.3, 0.0);
        let rendered = graph.render();
        assert!(!rendered.contains("volume"));
        assert!(!rendered.contains("adelay"));
    }
}
