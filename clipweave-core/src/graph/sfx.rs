//! Dedicated sound effect track.
//!
//! When a separate SFX track is requested, whip pan boundaries only record
//! [`SfxEvent`]s. After the main graph is folded, the events are rendered into
//! their own graph over a silence bus that spans the whole composite, and that
//! graph is merged into the main one under the `sfx` sentinel label.

use super::whip_pan::sound_effect;
use super::{Filter, FilterGraph, GraphOutput, Label, MediaKind, silence};
use crate::error::{CoreError, CoreResult};
use log::{debug, error};
use std::path::PathBuf;

/// Label namespace of the sound effect graph.
pub const SFX_NAMESPACE: &str = "sfx";

/// Fixed label of the sound effect stream in the merged graph.
pub const SFX_SENTINEL_LABEL: &str = "sfx";

/// One placement of the whoosh sound on the composite timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SfxEvent {
    pub source: PathBuf,
    pub offset: f64,
    pub duration: f64,
    pub gain_db: f64,
}

/// Builds the silence bus of `total_duration` seconds and mixes every event in.
///
/// The mix takes its length from the silence bus so late events never extend
/// the track past the composite.
pub fn build_sfx_bus(events: &[SfxEvent], total_duration: f64, sample_rate: u32) -> FilterGraph {
    let mut graph = FilterGraph::new(SFX_NAMESPACE);
    let base = silence(&mut graph, total_duration, sample_rate);

    if events.is_empty() {
        return graph;
    }

    let mut streams = vec![base.into()];
    for event in events {
        let effect = sound_effect(
            &mut graph,
            &event.source,
            event.offset,
            event.duration,
            event.gain_db,
        );
        streams.push(effect.into());
    }

    graph.apply(
        &streams,
        Filter::new("amix")
            .arg("inputs", streams.len().to_string())
            .arg("duration", "first")
            .arg("dropout_transition", "0"),
        MediaKind::Audio,
    );
    graph
}

/// Splices the SFX bus into the main graph and returns the three-track output.
///
/// `video` and `audio` must be terminals of `main`. Any inconsistency is a
/// `GraphMergeFailure`; there is no fallback to a two-track output.
pub fn merge_sfx_bus(
    main: &mut FilterGraph,
    video: Label,
    audio: Label,
    bus: FilterGraph,
) -> CoreResult<GraphOutput> {
    for (label, expected) in [(&video, MediaKind::Video), (&audio, MediaKind::Audio)] {
        if label.kind() != expected || !main.is_terminal(label) {
            let err = CoreError::GraphMergeFailure(format!(
                "{label} is not a terminal {expected:?} stream of the main graph"
            ));
            error!("{err}; main graph: {}", main.render());
            return Err(err);
        }
    }

    let bus_render = bus.render();
    let sfx = main.merge(bus, SFX_SENTINEL_LABEL).inspect_err(|err| {
        error!(
            "{err}; main graph: {}; sfx graph: {bus_render}",
            main.render()
        );
    })?;

    if sfx.kind() != MediaKind::Audio {
        let err = CoreError::GraphMergeFailure(format!("{sfx} is not an audio stream"));
        error!("{err}; merged graph: {}", main.render());
        return Err(err);
    }

    debug!("Merged SFX bus into main graph as {sfx}");
    Ok(GraphOutput::MultiTrack { video, audio, sfx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphInput, Pad};

    fn event(offset: f64) -> SfxEvent {
        SfxEvent {
            source: PathBuf::from("/assets/whoosh.wav"),
            offset,
            duration: 0.5,
            gain_db: -6.0,
        }
    }

    fn main_graph() -> (FilterGraph, Label, Label) {
        let mut graph = FilterGraph::new("s");
        let a = graph.add_input(GraphInput::file("/clips/a.mp4"));
        let b = graph.add_input(GraphInput::file("/clips/b.mp4"));
        let video = graph.apply(
            &[Pad::video(a), Pad::video(b)],
            Filter::new("xfade").arg("transition", "fade"),
            MediaKind::Video,
        );
        let audio = graph.apply(
            &[Pad::audio(a), Pad::audio(b)],
            Filter::new("acrossfade").decimal("d", 0.5),
            MediaKind::Audio,
        );
        (graph, video, audio)
    }

    #[test]
    fn test_bus_mixes_every_event_over_silence() {
        let bus = build_sfx_bus(&[event(1.5), event(3.0)], 4.5, 48000);
        let rendered = bus.render();

        assert_eq!(bus.inputs().len(), 2);
        assert!(rendered.starts_with(
            "anullsrc=channel_layout=stereo:sample_rate=48000[sfx0];[sfx0]atrim=duration=4.5[sfx1]"
        ));
        assert!(rendered.ends_with("amix=inputs=3:duration=first:dropout_transition=0[sfx11]"));
        assert_eq!(bus.terminals().len(), 1);
    }

    #[test]
    fn test_merge_produces_three_maps() {
        let (mut graph, video, audio) = main_graph();
        let bus = build_sfx_bus(&[event(1.5)], 3.5, 48000);

        let output = merge_sfx_bus(&mut graph, video, audio, bus).unwrap();
        assert_eq!(
            output.map_args(),
            vec!["-map", "[s0]", "-map", "[s1]", "-map", "[sfx]"]
        );
        assert_eq!(graph.inputs().len(), 3);
        assert!(graph.render().contains("[2:a]atrim=start=0:duration=0.5"));
    }

    #[test]
    fn test_merge_rejects_non_terminal_main_label() {
        let (mut graph, video, audio) = main_graph();
        let consumed = graph.apply(&[video.clone().into()], Filter::new("null"), MediaKind::Video);
        let bus = build_sfx_bus(&[event(1.0)], 3.0, 48000);

        let result = merge_sfx_bus(&mut graph, video, audio, bus);
        assert!(matches!(result, Err(CoreError::GraphMergeFailure(_))));
        assert_eq!(consumed.name(), "s2");
    }

    #[test]
    fn test_merge_rejects_swapped_kinds() {
        let (mut graph, video, audio) = main_graph();
        let bus = build_sfx_bus(&[event(1.0)], 3.0, 48000);
        assert!(matches!(
            merge_sfx_bus(&mut graph, audio, video, bus),
            Err(CoreError::GraphMergeFailure(_))
        ));
    }
}
