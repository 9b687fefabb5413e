// clipweave-core/tests/graph_scenario_tests.rs
//
// End-to-end graph synthesis for the documented concatenation scenarios.
// Everything here stops short of running ffmpeg.

use clipweave_core::config::ConcatConfig;
use clipweave_core::graph::{
    CompositorSettings, GraphOutput, SoundEffectStatus, build_transition_graph,
};
use clipweave_core::transitions::{TransitionKind, build_plan};
use clipweave_core::utils::format_decimal;
use clipweave_core::{Clip, CoreError, EngineCommand};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn clips(durations: &[f64]) -> Vec<Clip> {
    durations
        .iter()
        .enumerate()
        .map(|(index, duration)| Clip {
            path: PathBuf::from(format!("/jobs/job_input_{index}.mp4")),
            duration: *duration,
            has_audio: true,
        })
        .collect()
}

fn settings(duration: f64, sfx_asset: Option<&Path>, sfx_track: Option<u8>) -> CompositorSettings {
    CompositorSettings {
        transition_duration: duration,
        sample_rate: 48000,
        sfx_asset: sfx_asset.map(Path::to_path_buf),
        sfx_gain_db: -3.0,
        sfx_track,
    }
}

#[test]
fn test_fade_black_between_two_clips() {
    let clips = clips(&[2.0, 2.0]);
    let plan = build_plan::<&str>(2, TransitionKind::FadeBlack, None).unwrap();
    let built = build_transition_graph(&clips, &plan, &settings(0.5, None, None)).unwrap();

    assert!(built.duration > 3.0 && built.duration < 4.0);
    assert!(matches!(built.output, GraphOutput::Combined { .. }));
    assert_eq!(built.sound_effect, SoundEffectStatus::NotRequested);

    let command = EngineCommand::for_transitions(
        &built.graph,
        &built.output,
        &ConcatConfig::default(),
        "/out/job.mp4",
    );
    let args = command.to_args();
    assert_eq!(args.iter().filter(|a| *a == "-i").count(), 2);
    assert!(
        command
            .filter_complex()
            .unwrap()
            .contains("xfade=transition=fadeblack:duration=0.5:offset=1.5")
    );
    assert!(args.windows(2).any(|w| w == ["-pix_fmt", "yuv420p"]));
}

#[test]
fn test_whip_pan_succeeds_with_and_without_asset() {
    let dir = tempdir().unwrap();
    let asset = dir.path().join("whoosh.wav");
    std::fs::write(&asset, b"RIFF").unwrap();

    let clips = clips(&[2.0, 2.0]);
    let plan = build_plan(2, TransitionKind::WhipPan, Some(["whip_pan"].as_slice())).unwrap();

    let with_asset =
        build_transition_graph(&clips, &plan, &settings(0.8, Some(&asset), None)).unwrap();
    assert!(with_asset.duration > 3.0);
    assert_eq!(
        with_asset.sound_effect,
        SoundEffectStatus::Applied { events: 1 }
    );
    let rendered = with_asset.graph.render();
    assert!(rendered.contains("gblur=sigma=100"));
    assert!(rendered.contains("amix=inputs=2"));
    assert_eq!(with_asset.graph.inputs().len(), 3);

    let missing = dir.path().join("gone.wav");
    let without_asset =
        build_transition_graph(&clips, &plan, &settings(0.8, Some(&missing), None)).unwrap();
    assert_eq!(without_asset.duration, with_asset.duration);
    assert_eq!(without_asset.sound_effect, SoundEffectStatus::AssetMissing);
    assert!(!without_asset.graph.render().contains("amix"));
    assert_eq!(without_asset.graph.inputs().len(), 2);
}

#[test]
fn test_thirteen_whip_pans_on_dedicated_track() {
    let dir = tempdir().unwrap();
    let asset = dir.path().join("whoosh.wav");
    std::fs::write(&asset, b"RIFF").unwrap();

    let durations = [2.0, 3.5, 1.8, 2.2, 4.0, 2.0, 1.5, 2.7, 3.1, 2.0, 1.9, 2.4, 5.0];
    let clips = clips(&durations);
    let plan = build_plan::<&str>(13, TransitionKind::WhipPan, None).unwrap();
    let built = build_transition_graph(&clips, &plan, &settings(0.8, Some(&asset), Some(0)))
        .unwrap();

    assert_eq!(built.output.stream_count(), 3);
    assert_eq!(built.sfx_events.len(), 12);
    assert_eq!(built.sound_effect, SoundEffectStatus::Applied { events: 12 });

    let rendered = built.graph.render();
    // The bus is exactly as long as the composite and never extended by events.
    assert!(rendered.contains(&format!("atrim=duration={}", format_decimal(built.duration))));
    assert!(rendered.contains("amix=inputs=13:duration=first:dropout_transition=0[sfx]"));

    let args = built.output.map_args();
    assert_eq!(args.iter().filter(|a| *a == "-map").count(), 3);
    assert_eq!(args.last().map(String::as_str), Some("[sfx]"));

    // Sound effect inputs follow the clips.
    assert_eq!(built.graph.inputs().len(), 13 + 12);
    assert!(rendered.contains("[13:a]"));
    assert!(rendered.contains("[24:a]"));
}

#[test]
fn test_track_id_without_whip_pan_keeps_two_streams() {
    let clips = clips(&[2.0, 2.0, 2.0]);
    let plan = build_plan::<&str>(3, TransitionKind::CircleOpen, None).unwrap();
    let built = build_transition_graph(&clips, &plan, &settings(0.8, None, Some(4))).unwrap();
    assert_eq!(built.output.stream_count(), 2);
    assert!(built.sfx_events.is_empty());
}

#[test]
fn test_too_long_transition_fails() {
    let clips = clips(&[1.0, 1.0]);
    let plan = build_plan::<&str>(2, TransitionKind::Fade, None).unwrap();
    assert!(matches!(
        build_transition_graph(&clips, &plan, &settings(5.0, None, None)),
        Err(CoreError::TransitionTooLong { .. })
    ));
}

#[test]
fn test_mixed_sequence_renders_each_boundary() {
    let clips = clips(&[3.0, 3.0, 3.0, 3.0]);
    let sequence = ["wipe_right", "smooth_left", "circle_close"];
    let plan = build_plan(4, TransitionKind::None, Some(sequence.as_slice())).unwrap();
    let built = build_transition_graph(&clips, &plan, &settings(1.0, None, None)).unwrap();

    let rendered = built.graph.render();
    for name in ["wiperight", "smoothleft", "circleclose"] {
        assert!(rendered.contains(&format!("xfade=transition={name}")), "{name}");
    }
    assert_eq!(rendered.matches("acrossfade=d=1").count(), 3);
    assert!((built.duration - 9.0).abs() < 1e-9);
}

#[test]
fn test_plain_concat_is_stream_copy() {
    let command = EngineCommand::for_concat_list(
        Path::new("/jobs/job_concat_list.txt"),
        true,
        "/out/job.mp4",
    );
    let args = command.to_args();
    assert!(command.filter_complex().is_none());
    assert!(args.windows(2).any(|w| w == ["-c", "copy"]));
    assert!(!args.iter().any(|a| a.starts_with("-c:v")));
}
