//! Engine command synthesis
//!
//! An [`EngineCommand`] is the flat token list handed to ffmpeg: global
//! options, then per-input options with `-i <path>` pairs, then an optional
//! `-filter_complex` description, then output mappings/codec options and the
//! destination path. It is rendered once and can be turned into an
//! `ffmpeg-sidecar` command or printed for a dry run.

use crate::config::ConcatConfig;
use crate::graph::{FilterGraph, GraphInput, GraphOutput};
use crate::merge_tracks::MERGED_AUDIO_BITRATE;
use ffmpeg_sidecar::command::FfmpegCommand;
use std::fmt;
use std::path::{Path, PathBuf};

/// A fully synthesized ffmpeg invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    global_options: Vec<String>,
    inputs: Vec<GraphInput>,
    filter_complex: Option<String>,
    output_options: Vec<String>,
    output_path: PathBuf,
}

impl EngineCommand {
    /// Creates an empty command writing to `output_path`.
    #[must_use]
    pub fn new(output_path: impl Into<PathBuf>, overwrite: bool) -> Self {
        let overwrite_flag = if overwrite { "-y" } else { "-n" };
        Self {
            global_options: vec![overwrite_flag.to_string(), "-hide_banner".to_string()],
            inputs: Vec::new(),
            filter_complex: None,
            output_options: Vec::new(),
            output_path: output_path.into(),
        }
    }

    /// Adds an input with its per-input options.
    #[must_use]
    pub fn with_input(mut self, input: GraphInput) -> Self {
        self.inputs.push(input);
        self
    }

    /// Sets the `-filter_complex` description. Empty descriptions are ignored.
    #[must_use]
    pub fn with_filter_complex(mut self, description: String) -> Self {
        if !description.is_empty() {
            self.filter_complex = Some(description);
        }
        self
    }

    /// Appends output options (mappings, codecs, flags).
    #[must_use]
    pub fn with_output_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_options.extend(options.into_iter().map(Into::into));
        self
    }

    /// Command rendering a transition graph with the configured encoders.
    ///
    /// Video is encoded for broad compatibility with a fast-start container;
    /// every mapped audio stream uses the configured lossy codec.
    pub fn for_transitions(
        graph: &FilterGraph,
        output: &GraphOutput,
        config: &ConcatConfig,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        graph
            .inputs()
            .iter()
            .cloned()
            .fold(Self::new(output_path, config.overwrite), Self::with_input)
            .with_filter_complex(graph.render())
            .with_output_options(output.map_args())
            .with_output_options([
                "-c:v",
                config.video_codec.as_str(),
                "-pix_fmt",
                config.pixel_format.as_str(),
                "-movflags",
                "+faststart",
                "-c:a",
                config.audio_codec.as_str(),
            ])
    }

    /// Command replacing the audio of a file with a merged graph output.
    ///
    /// Video streams are copied; the merged track uses the configured audio
    /// codec at a fixed bit rate.
    pub fn for_audio_merge(
        graph: &FilterGraph,
        output: &GraphOutput,
        config: &ConcatConfig,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        graph
            .inputs()
            .iter()
            .cloned()
            .fold(Self::new(output_path, config.overwrite), Self::with_input)
            .with_filter_complex(graph.render())
            .with_output_options(output.map_args())
            .with_output_options([
                "-c:v",
                "copy",
                "-c:a",
                config.audio_codec.as_str(),
                "-b:a",
                MERGED_AUDIO_BITRATE,
            ])
    }

    /// Command joining the clips listed in a concat demuxer file by stream copy.
    pub fn for_concat_list(
        list_path: &Path,
        overwrite: bool,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self::new(output_path, overwrite)
            .with_input(GraphInput::with_options(
                list_path,
                vec![
                    "-f".to_string(),
                    "concat".to_string(),
                    "-safe".to_string(),
                    "0".to_string(),
                ],
            ))
            .with_output_options(["-c", "copy"])
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn filter_complex(&self) -> Option<&str> {
        self.filter_complex.as_deref()
    }

    /// The complete argument list, without the program name.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = self.global_options.clone();
        for input in &self.inputs {
            args.extend(input.to_args());
        }
        if let Some(description) = &self.filter_complex {
            args.push("-filter_complex".to_string());
            args.push(description.clone());
        }
        args.extend(self.output_options.iter().cloned());
        args.push(self.output_path.to_string_lossy().into_owned());
        args
    }

    /// Converts into an `ffmpeg-sidecar` command ready to spawn.
    pub fn to_ffmpeg_command(&self) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new();
        cmd.args(self.to_args());
        cmd
    }
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ffmpeg")?;
        for arg in self.to_args() {
            write!(f, " {}", shell_quote(&arg))?;
        }
        Ok(())
    }
}

fn shell_quote(arg: &str) -> String {
    let needs_quotes = arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || "'\"\\;[]|&$()*?<>`#!".contains(c));
    if needs_quotes {
        format!("'{}'", arg.replace('\'', "'\\''"))
    } else {
        arg.to_string()
    }
}
