//! Main graph construction.
//!
//! Folds left to right over the probed clips: the running composite starts as
//! the first clip's video and audio (or generated silence when the clip has no
//! audio track), and every boundary combines it with the next clip using the
//! transition named by the plan.

use super::sfx::{SfxEvent, build_sfx_bus, merge_sfx_bus};
use super::whip_pan::{self, SoundEffectStatus};
use super::{
    Filter, FilterGraph, GraphInput, GraphOutput, Label, MAIN_NAMESPACE, MediaKind, Pad, silence,
};
use crate::error::{CoreError, CoreResult};
use crate::external::ffprobe_executor::Clip;
use crate::transitions::{TimelineCursor, TransitionKind, TransitionPlan};
use log::{debug, warn};
use std::path::PathBuf;

/// Inputs of the compositor that do not come from the clips themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorSettings {
    /// Requested transition duration for every boundary, in seconds.
    pub transition_duration: f64,
    /// Sample rate of generated silence.
    pub sample_rate: u32,
    /// Whoosh sound asset for whip pan boundaries.
    pub sfx_asset: Option<PathBuf>,
    pub sfx_gain_db: f64,
    /// Dedicated SFX track id; `None` mixes the whoosh into the main audio.
    pub sfx_track: Option<u8>,
}

/// Result of folding a plan into a graph.
#[derive(Debug, Clone)]
pub struct BuiltGraph {
    pub graph: FilterGraph,
    pub output: GraphOutput,
    /// Planned length of the composite, in seconds.
    pub duration: f64,
    pub sound_effect: SoundEffectStatus,
    /// Events routed to the dedicated track (empty when mixed inline).
    pub sfx_events: Vec<SfxEvent>,
}

/// Builds the filtergraph joining `clips` with the transitions of `plan`.
pub fn build_transition_graph(
    clips: &[Clip],
    plan: &TransitionPlan,
    settings: &CompositorSettings,
) -> CoreResult<BuiltGraph> {
    if clips.len() < 2 {
        return Err(CoreError::InvalidInput(format!(
            "at least two clips are required to build transitions, got {}",
            clips.len()
        )));
    }
    if plan.len() != clips.len() - 1 {
        return Err(CoreError::LengthMismatch {
            expected: clips.len() - 1,
            actual: plan.len(),
        });
    }

    let mut graph = FilterGraph::new(MAIN_NAMESPACE);
    let streams: Vec<(Pad, Pad)> = clips
        .iter()
        .map(|clip| {
            let input = graph.add_input(GraphInput::file(&clip.path));
            let audio = if clip.has_audio {
                Pad::audio(input)
            } else {
                debug!("{} has no audio, using silence", clip.path.display());
                silence(&mut graph, clip.duration, settings.sample_rate).into()
            };
            (Pad::video(input), audio)
        })
        .collect();

    let asset = settings.sfx_asset.as_deref().filter(|path| path.is_file());
    if plan.uses_whip_pan() && asset.is_none() {
        warn!("Whip pan sound effect asset is not available, skipping the sound effect");
    }

    let (mut video, mut audio) = streams[0].clone();
    let mut cursor = TimelineCursor::new(clips[0].duration);
    let mut sfx_events = Vec::new();
    let mut inline_effects = 0usize;

    for (index, kind) in plan.entries().iter().copied().enumerate() {
        let next = &clips[index + 1];
        let (next_video, next_audio) = streams[index + 1].clone();

        if kind == TransitionKind::None {
            let joined = graph.apply_multi(
                &[video, audio, next_video, next_audio],
                Filter::new("concat")
                    .arg("n", "2")
                    .arg("v", "1")
                    .arg("a", "1"),
                &[MediaKind::Video, MediaKind::Audio],
            );
            video = joined[0].clone().into();
            audio = joined[1].clone().into();
            cursor.append(next.duration);
            continue;
        }

        let timing = cursor.advance(settings.transition_duration, next.duration)?;
        debug!(
            "Boundary {index} ({kind}): offset {:.3}s, duration {:.3}s",
            timing.offset, timing.duration
        );

        let faded_audio = graph.apply(
            &[audio, next_audio],
            Filter::new("acrossfade").decimal("d", timing.duration),
            MediaKind::Audio,
        );

        if kind == TransitionKind::WhipPan {
            video = whip_pan::composite_video(&mut graph, video, next_video, timing).into();
            audio = match (asset, settings.sfx_track) {
                (Some(source), Some(_)) => {
                    sfx_events.push(SfxEvent {
                        source: source.to_path_buf(),
                        offset: timing.offset,
                        duration: timing.duration,
                        gain_db: settings.sfx_gain_db,
                    });
                    faded_audio.into()
                }
                (Some(source), None) => {
                    let effect = whip_pan::sound_effect(
                        &mut graph,
                        source,
                        timing.offset,
                        timing.duration,
                        settings.sfx_gain_db,
                    );
                    inline_effects += 1;
                    whip_pan::mix_into(&mut graph, faded_audio, effect).into()
                }
                (None, _) => faded_audio.into(),
            };
        } else {
            let transition = kind.xfade_name().ok_or_else(|| {
                CoreError::OperationFailed(format!("transition '{kind}' has no xfade mapping"))
            })?;
            video = graph
                .apply(
                    &[video, next_video],
                    Filter::new("xfade")
                        .arg("transition", transition)
                        .decimal("duration", timing.duration)
                        .decimal("offset", timing.offset),
                    MediaKind::Video,
                )
                .into();
            audio = faded_audio.into();
        }
    }

    let duration = cursor.cumulative_duration();
    let video = into_label(video)?;
    let audio = into_label(audio)?;

    let sound_effect = if !plan.uses_whip_pan() {
        SoundEffectStatus::NotRequested
    } else if asset.is_none() {
        SoundEffectStatus::AssetMissing
    } else {
        SoundEffectStatus::Applied {
            events: inline_effects + sfx_events.len(),
        }
    };

    let output = if settings.sfx_track.is_some() && !sfx_events.is_empty() {
        let bus = build_sfx_bus(&sfx_events, duration, settings.sample_rate);
        merge_sfx_bus(&mut graph, video, audio, bus)?
    } else {
        GraphOutput::Combined { video, audio }
    };

    Ok(BuiltGraph {
        graph,
        output,
        duration,
        sound_effect,
        sfx_events,
    })
}

fn into_label(pad: Pad) -> CoreResult<Label> {
    match pad {
        Pad::Label(label) => Ok(label),
        Pad::Stream { .. } | Pad::Track { .. } => Err(CoreError::OperationFailed(
            "composite stream was never produced by a filter".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transitions::build_plan;
    use std::path::Path;
    use tempfile::TempDir;

    const NO_SEQUENCE: Option<&[&str]> = None;

    fn clip(name: &str, duration: f64, has_audio: bool) -> Clip {
        Clip {
            path: PathBuf::from(format!("/clips/{name}.mp4")),
            duration,
            has_audio,
        }
    }

    fn settings(asset: Option<&Path>, sfx_track: Option<u8>) -> CompositorSettings {
        CompositorSettings {
            transition_duration: 0.5,
            sample_rate: 48000,
            sfx_asset: asset.map(Path::to_path_buf),
            sfx_gain_db: -3.0,
            sfx_track,
        }
    }

    fn whoosh(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("whoosh.wav");
        std::fs::write(&path, b"RIFF").unwrap();
        path
    }

    #[test]
    fn test_fade_black_between_two_clips() {
        let clips = [clip("a", 2.0, true), clip("b", 2.0, true)];
        let plan = build_plan(2, TransitionKind::FadeBlack, NO_SEQUENCE).unwrap();
        let built = build_transition_graph(&clips, &plan, &settings(None, None)).unwrap();

        assert_eq!(
            built.graph.render(),
            "[0:a][1:a]acrossfade=d=0.5[s0];[0:v][1:v]xfade=transition=fadeblack:duration=0.5:offset=1.5[s1]"
        );
        assert!((built.duration - 3.5).abs() < 1e-9);
        assert_eq!(built.sound_effect, SoundEffectStatus::NotRequested);
        assert_eq!(built.output.map_args(), vec!["-map", "[s1]", "-map", "[s0]"]);
    }

    #[test]
    fn test_clip_without_audio_gets_silence() {
        let clips = [clip("a", 2.0, false), clip("b", 3.0, true)];
        let plan = build_plan(2, TransitionKind::Fade, NO_SEQUENCE).unwrap();
        let built = build_transition_graph(&clips, &plan, &settings(None, None)).unwrap();

        let rendered = built.graph.render();
        assert!(rendered.starts_with("anullsrc=channel_layout=stereo:sample_rate=48000[s0];[s0]atrim=duration=2[s1]"));
        assert!(rendered.contains("[s2][1:a]acrossfade=d=0.5"));
    }

    #[test]
    fn test_whip_pan_inline_mix_with_asset() {
        let dir = TempDir::new().unwrap();
        let asset = whoosh(&dir);
        let clips = [clip("a", 2.0, true), clip("b", 2.0, true)];
        let plan = build_plan(2, TransitionKind::None, Some(&["whip_pan"][..])).unwrap();
        let built = build_transition_graph(&clips, &plan, &settings(Some(&asset), None)).unwrap();

        let rendered = built.graph.render();
        assert_eq!(built.graph.inputs().len(), 3);
        assert!(rendered.contains("gblur=sigma=100:steps=1:sigmaV=0"));
        assert!(rendered.contains("[2:a]atrim=start=0:duration=0.5"));
        assert!(rendered.contains("adelay=1500|1500"));
        assert!(rendered.contains("amix=inputs=2:dropout_transition=0"));
        assert_eq!(built.sound_effect, SoundEffectStatus::Applied { events: 1 });
        assert_eq!(built.output.stream_count(), 2);
    }

    #[test]
    fn test_whip_pan_without_asset_is_silently_skipped() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.wav");
        let clips = [clip("a", 2.0, true), clip("b", 2.0, true)];
        let plan = build_plan(2, TransitionKind::WhipPan, NO_SEQUENCE).unwrap();
        let built =
            build_transition_graph(&clips, &plan, &settings(Some(&missing), Some(0))).unwrap();

        assert_eq!(built.sound_effect, SoundEffectStatus::AssetMissing);
        assert!(built.sfx_events.is_empty());
        assert_eq!(built.graph.inputs().len(), 2);
        assert!(matches!(built.output, GraphOutput::Combined { .. }));
        assert!(built.graph.render().contains("blend=all_expr="));
    }

    #[test]
    fn test_dedicated_track_spans_whole_composite() {
        let dir = TempDir::new().unwrap();
        let asset = whoosh(&dir);
        let clips: Vec<Clip> = (0..13).map(|i| clip(&format!("c{i}"), 2.0, true)).collect();
        let plan = build_plan(13, TransitionKind::WhipPan, NO_SEQUENCE).unwrap();
        let built =
            build_transition_graph(&clips, &plan, &settings(Some(&asset), Some(0))).unwrap();

        assert!((built.duration - (2.0 * 13.0 - 0.5 * 12.0)).abs() < 1e-9);
        assert_eq!(built.sfx_events.len(), 12);
        assert_eq!(built.output.stream_count(), 3);
        assert_eq!(built.graph.inputs().len(), 13 + 12);

        let rendered = built.graph.render();
        assert!(rendered.contains("[sfx0]atrim=duration=20[sfx1]"));
        assert!(rendered.contains("amix=inputs=13:duration=first:dropout_transition=0[sfx]"));
        assert!(rendered.contains("[13:a]atrim=start=0:duration=0.5"));
        assert!(!rendered.contains("amix=inputs=2"));
    }

    #[test]
    fn test_non_whip_plan_with_track_id_stays_two_streams() {
        let dir = TempDir::new().unwrap();
        let asset = whoosh(&dir);
        let clips = [clip("a", 2.0, true), clip("b", 2.0, true), clip("c", 2.0, true)];
        let plan = build_plan(3, TransitionKind::WipeLeft, NO_SEQUENCE).unwrap();
        let built =
            build_transition_graph(&clips, &plan, &settings(Some(&asset), Some(3))).unwrap();

        assert!(matches!(built.output, GraphOutput::Combined { .. }));
        assert_eq!(built.sound_effect, SoundEffectStatus::NotRequested);
    }

    #[test]
    fn test_transition_longer_than_clips_fails() {
        let clips = [clip("a", 1.0, true), clip("b", 1.0, true)];
        let plan = build_plan(2, TransitionKind::Fade, NO_SEQUENCE).unwrap();
        let mut long = settings(None, None);
        long.transition_duration = 5.0;

        assert!(matches!(
            build_transition_graph(&clips, &plan, &long),
            Err(CoreError::TransitionTooLong { .. })
        ));
    }

    #[test]
    fn test_plan_length_must_match_clips() {
        let clips = [clip("a", 2.0, true), clip("b", 2.0, true), clip("c", 2.0, true)];
        let plan = build_plan(2, TransitionKind::Fade, NO_SEQUENCE).unwrap();
        assert!(matches!(
            build_transition_graph(&clips, &plan, &settings(None, None)),
            Err(CoreError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }
}
