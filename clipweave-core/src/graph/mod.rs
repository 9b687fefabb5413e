// ============================================================================
// clipweave-core/src/graph/mod.rs
// ============================================================================
//
// PROCESSING GRAPH: Arena-Allocated Filtergraph Representation
//
// This module holds the in-memory form of an ffmpeg `-filter_complex`
// description. Every filter node gets its output labels from the owning
// graph's namespace at creation time, so two graphs built independently can
// be spliced together without rewriting any text: the guest graph's input
// indices are shifted and its single terminal label is renamed in place.
//
// KEY COMPONENTS:
// - FilterGraph: arena of inputs and filter nodes with a label namespace
// - Pad / Label: references to input streams and intermediate streams
// - Filter: filter name plus ordered, escaped arguments
// - GraphOutput: the streams an engine command maps to the output file
//
// SUBMODULES:
// - builder: folds clips and a transition plan into the main graph
// - whip_pan: blur-blend composite and whoosh sound effect chain
// - sfx: dedicated sound effect bus and the merge into the main graph

pub mod builder;
pub mod sfx;
pub mod whip_pan;

pub use builder::{BuiltGraph, CompositorSettings, build_transition_graph};
pub use sfx::{SFX_SENTINEL_LABEL, SfxEvent, build_sfx_bus, merge_sfx_bus};
pub use whip_pan::SoundEffectStatus;

use crate::error::{CoreError, CoreResult};
use crate::utils::{escape_graph_value, escape_option_value, format_decimal};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// Label namespace of the main video/audio graph.
pub const MAIN_NAMESPACE: &str = "s";

/// Kind of media carried by a pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    fn specifier(self) -> &'static str {
        match self {
            MediaKind::Video => "v",
            MediaKind::Audio => "a",
        }
    }
}

/// Name of an intermediate stream produced by a filter node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    name: String,
    kind: MediaKind,
}

impl Label {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// The `-map` argument selecting this stream.
    pub fn map_arg(&self) -> String {
        format!("[{}]", self.name)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.name)
    }
}

/// A filter input: a stream of a graph input or a labelled stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pad {
    /// Default stream of the given kind (`[k:v]`, `[k:a]`).
    Stream { input: usize, kind: MediaKind },
    /// The n-th stream of the given kind (`[k:a:n]`).
    Track {
        input: usize,
        kind: MediaKind,
        index: usize,
    },
    Label(Label),
}

impl Pad {
    pub fn video(input: usize) -> Self {
        Pad::Stream {
            input,
            kind: MediaKind::Video,
        }
    }

    pub fn audio(input: usize) -> Self {
        Pad::Stream {
            input,
            kind: MediaKind::Audio,
        }
    }

    pub fn audio_track(input: usize, index: usize) -> Self {
        Pad::Track {
            input,
            kind: MediaKind::Audio,
            index,
        }
    }
}

impl From<Label> for Pad {
    fn from(label: Label) -> Self {
        Pad::Label(label)
    }
}

impl From<&Label> for Pad {
    fn from(label: &Label) -> Self {
        Pad::Label(label.clone())
    }
}

impl fmt::Display for Pad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pad::Stream { input, kind } => write!(f, "[{}:{}]", input, kind.specifier()),
            Pad::Track { input, kind, index } => {
                write!(f, "[{}:{}:{}]", input, kind.specifier(), index)
            }
            Pad::Label(label) => label.fmt(f),
        }
    }
}

/// One `-i` input of the engine command with its per-input options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphInput {
    pub options: Vec<String>,
    pub path: PathBuf,
}

impl GraphInput {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            options: Vec::new(),
            path: path.into(),
        }
    }

    pub fn with_options(path: impl Into<PathBuf>, options: Vec<String>) -> Self {
        Self {
            options,
            path: path.into(),
        }
    }

    /// Tokens for this input: options followed by `-i <path>`.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = self.options.clone();
        args.push("-i".to_string());
        args.push(self.path.to_string_lossy().into_owned());
        args
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FilterArg {
    Positional(String),
    Named(String, String),
}

/// A filter invocation: name plus ordered arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    name: String,
    args: Vec<FilterArg>,
}

impl Filter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Adds a `key=value` option.
    #[must_use]
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push(FilterArg::Named(key.into(), value.into()));
        self
    }

    /// Adds a numeric option rendered with [`format_decimal`].
    #[must_use]
    pub fn decimal(self, key: impl Into<String>, value: f64) -> Self {
        self.arg(key, format_decimal(value))
    }

    /// Adds a positional (unnamed) option.
    #[must_use]
    pub fn positional(mut self, value: impl Into<String>) -> Self {
        self.args.push(FilterArg::Positional(value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn render(&self) -> String {
        if self.args.is_empty() {
            return self.name.clone();
        }
        let options = self
            .args
            .iter()
            .map(|arg| match arg {
                FilterArg::Positional(value) => escape_option_value(value),
                FilterArg::Named(key, value) => format!("{key}={}", escape_option_value(value)),
            })
            .collect::<Vec<_>>()
            .join(":");
        format!("{}={}", self.name, escape_graph_value(&options))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct FilterNode {
    inputs: Vec<Pad>,
    filter: Filter,
    outputs: Vec<Label>,
}

impl FilterNode {
    fn render(&self) -> String {
        let mut rendered = String::new();
        for pad in &self.inputs {
            rendered.push_str(&pad.to_string());
        }
        rendered.push_str(&self.filter.render());
        for label in &self.outputs {
            rendered.push_str(&label.to_string());
        }
        rendered
    }
}

/// Arena of inputs and filter nodes sharing one label namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGraph {
    namespace: String,
    next_label: usize,
    inputs: Vec<GraphInput>,
    nodes: Vec<FilterNode>,
}

impl FilterGraph {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            next_label: 0,
            inputs: Vec::new(),
            nodes: Vec::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn inputs(&self) -> &[GraphInput] {
        &self.inputs
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Registers an engine input and returns its index.
    pub fn add_input(&mut self, input: GraphInput) -> usize {
        self.inputs.push(input);
        self.inputs.len() - 1
    }

    /// Adds a single-output filter node. Source filters take no inputs.
    pub fn apply(&mut self, inputs: &[Pad], filter: Filter, kind: MediaKind) -> Label {
        let label = self.allocate_label(kind);
        self.nodes.push(FilterNode {
            inputs: inputs.to_vec(),
            filter,
            outputs: vec![label.clone()],
        });
        label
    }

    /// Adds a filter node with one output per entry of `kinds`.
    pub fn apply_multi(&mut self, inputs: &[Pad], filter: Filter, kinds: &[MediaKind]) -> Vec<Label> {
        let outputs: Vec<Label> = kinds.iter().map(|kind| self.allocate_label(*kind)).collect();
        self.nodes.push(FilterNode {
            inputs: inputs.to_vec(),
            filter,
            outputs: outputs.clone(),
        });
        outputs
    }

    fn allocate_label(&mut self, kind: MediaKind) -> Label {
        let name = format!("{}{}", self.namespace, self.next_label);
        self.next_label += 1;
        Label { name, kind }
    }

    /// Every label produced by a node of this graph.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.nodes.iter().flat_map(|node| node.outputs.iter())
    }

    /// Labels produced by some node and consumed by none, in creation order.
    pub fn terminals(&self) -> Vec<Label> {
        let consumed: HashSet<&Label> = self
            .nodes
            .iter()
            .flat_map(|node| node.inputs.iter())
            .filter_map(|pad| match pad {
                Pad::Label(label) => Some(label),
                Pad::Stream { .. } | Pad::Track { .. } => None,
            })
            .collect();

        self.labels()
            .filter(|label| !consumed.contains(label))
            .cloned()
            .collect()
    }

    pub fn is_terminal(&self, label: &Label) -> bool {
        self.terminals().contains(label)
    }

    /// Appends `guest` to this graph and renames its only terminal to `sentinel`.
    ///
    /// Guest input indices are shifted past this graph's inputs. The two
    /// namespaces must be disjoint and the guest must end in exactly one
    /// unconsumed stream; otherwise the merge fails with `GraphMergeFailure`.
    pub fn merge(&mut self, mut guest: FilterGraph, sentinel: &str) -> CoreResult<Label> {
        if guest.namespace == self.namespace {
            return Err(CoreError::GraphMergeFailure(format!(
                "both graphs use the label namespace '{}'",
                self.namespace
            )));
        }

        let host_labels: HashSet<&str> = self.labels().map(Label::name).collect();
        if host_labels.contains(sentinel) {
            return Err(CoreError::GraphMergeFailure(format!(
                "sentinel label '{sentinel}' is already used by the main graph"
            )));
        }
        if let Some(clash) = guest.labels().find(|label| host_labels.contains(label.name())) {
            return Err(CoreError::GraphMergeFailure(format!(
                "label {clash} exists in both graphs"
            )));
        }

        let terminal = match guest.terminals().as_slice() {
            [single] => single.clone(),
            [] => {
                return Err(CoreError::GraphMergeFailure(
                    "the SFX graph has no terminal label".to_string(),
                ));
            }
            many => {
                return Err(CoreError::GraphMergeFailure(format!(
                    "the SFX graph has {} terminal labels, expected one",
                    many.len()
                )));
            }
        };

        let renamed = Label {
            name: sentinel.to_string(),
            kind: terminal.kind,
        };
        let shift = self.inputs.len();
        for node in &mut guest.nodes {
            for pad in &mut node.inputs {
                if let Pad::Stream { input, .. } | Pad::Track { input, .. } = pad {
                    *input += shift;
                }
            }
            for output in &mut node.outputs {
                if *output == terminal {
                    *output = renamed.clone();
                }
            }
        }

        self.inputs.append(&mut guest.inputs);
        self.nodes.append(&mut guest.nodes);
        Ok(renamed)
    }

    /// Renders the `-filter_complex` description.
    pub fn render(&self) -> String {
        self.nodes
            .iter()
            .map(FilterNode::render)
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Streams an engine command maps into the output container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphOutput {
    /// One video stream and one audio stream.
    Combined { video: Label, audio: Label },
    /// Video, main audio, and a separate sound effect track.
    MultiTrack {
        video: Label,
        audio: Label,
        sfx: Label,
    },
    /// Only an audio stream from the graph, with video copied from input 0 if present.
    AudioOnly { audio: Label },
}

impl GraphOutput {
    /// The `-map` arguments for this output, in stream order.
    pub fn map_args(&self) -> Vec<String> {
        let maps = match self {
            GraphOutput::Combined { video, audio } => vec![video.map_arg(), audio.map_arg()],
            GraphOutput::MultiTrack { video, audio, sfx } => {
                vec![video.map_arg(), audio.map_arg(), sfx.map_arg()]
            }
            GraphOutput::AudioOnly { audio } => vec!["0:v?".to_string(), audio.map_arg()],
        };
        maps.into_iter()
            .flat_map(|target| ["-map".to_string(), target])
            .collect()
    }

    pub fn stream_count(&self) -> usize {
        match self {
            GraphOutput::Combined { .. } | GraphOutput::AudioOnly { .. } => 2,
            GraphOutput::MultiTrack { .. } => 3,
        }
    }
}

/// Adds a silent stereo track of `duration` seconds to `graph`.
pub fn silence(graph: &mut FilterGraph, duration: f64, sample_rate: u32) -> Label {
    let source = graph.apply(
        &[],
        Filter::new("anullsrc")
            .arg("channel_layout", "stereo")
            .arg("sample_rate", sample_rate.to_string()),
        MediaKind::Audio,
    );
    let trimmed = graph.apply(
        &[source.into()],
        Filter::new("atrim").decimal("duration", duration),
        MediaKind::Audio,
    );
    graph.apply(
        &[trimmed.into()],
        Filter::new("asetpts").positional("N/SR/TB"),
        MediaKind::Audio,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_rendering_escapes_both_levels() {
        let filter = Filter::new("blend").arg("all_expr", "if(between(T,1,2),A,B)");
        assert_eq!(filter.render(), "blend=all_expr=if(between(T\\,1\\,2)\\,A\\,B)");

        let filter = Filter::new("drawtext").arg("text", "a:b");
        assert_eq!(filter.render(), "drawtext=text=a\\\\:b");

        assert_eq!(Filter::new("split").render(), "split");
        assert_eq!(
            Filter::new("adelay").positional("500|500").render(),
            "adelay=500|500"
        );
    }

    #[test]
    fn test_labels_are_allocated_from_namespace() {
        let mut graph = FilterGraph::new("s");
        let input = graph.add_input(GraphInput::file("/clips/a.mp4"));
        let first = graph.apply(&[Pad::video(input)], Filter::new("null"), MediaKind::Video);
        let split = graph.apply_multi(
            &[first.clone().into()],
            Filter::new("split"),
            &[MediaKind::Video, MediaKind::Video],
        );

        assert_eq!(first.name(), "s0");
        assert_eq!(split[0].name(), "s1");
        assert_eq!(split[1].name(), "s2");
        assert_eq!(graph.render(), "[0:v]null[s0];[s0]split[s1][s2]");
        assert_eq!(graph.terminals(), split);
    }

    #[test]
    fn test_silence_is_a_source_chain() {
        let mut graph = FilterGraph::new("s");
        let label = silence(&mut graph, 2.5, 48000);
        assert_eq!(
            graph.render(),
            "anullsrc=channel_layout=stereo:sample_rate=48000[s0];[s0]atrim=duration=2.5[s1];[s1]asetpts=N/SR/TB[s2]"
        );
        assert_eq!(label.kind(), MediaKind::Audio);
        assert!(graph.inputs().is_empty());
    }

    #[test]
    fn test_merge_shifts_inputs_and_renames_terminal() {
        let mut host = FilterGraph::new("s");
        let a = host.add_input(GraphInput::file("/clips/a.mp4"));
        let b = host.add_input(GraphInput::file("/clips/b.mp4"));
        host.apply(
            &[Pad::audio(a), Pad::audio(b)],
            Filter::new("acrossfade").decimal("d", 0.5),
            MediaKind::Audio,
        );

        let mut guest = FilterGraph::new("sfx");
        let whoosh = guest.add_input(GraphInput::file("/assets/whoosh.wav"));
        let base = silence(&mut guest, 3.5, 48000);
        guest.apply(
            &[base.into(), Pad::audio(whoosh)],
            Filter::new("amix").arg("inputs", "2"),
            MediaKind::Audio,
        );

        let sentinel = host.merge(guest, "sfx").unwrap();
        assert_eq!(sentinel.name(), "sfx");
        assert_eq!(host.inputs().len(), 3);
        let rendered = host.render();
        assert!(rendered.contains("[sfx2][2:a]amix=inputs=2[sfx]"));
        assert!(rendered.starts_with("[0:a][1:a]acrossfade=d=0.5[s0];"));
    }

    #[test]
    fn test_merge_rejects_same_namespace() {
        let mut host = FilterGraph::new("s");
        silence(&mut host, 1.0, 48000);
        let mut guest = FilterGraph::new("s");
        silence(&mut guest, 1.0, 48000);
        assert!(matches!(
            host.merge(guest, "sfx"),
            Err(CoreError::GraphMergeFailure(_))
        ));
    }

    #[test]
    fn test_merge_rejects_guest_without_single_terminal() {
        let mut host = FilterGraph::new("s");
        silence(&mut host, 1.0, 48000);

        let empty = FilterGraph::new("sfx");
        assert!(matches!(
            host.merge(empty, "sfx"),
            Err(CoreError::GraphMergeFailure(_))
        ));

        let mut forked = FilterGraph::new("sfx");
        silence(&mut forked, 1.0, 48000);
        silence(&mut forked, 2.0, 48000);
        assert!(matches!(
            host.merge(forked, "sfx"),
            Err(CoreError::GraphMergeFailure(_))
        ));
    }

    #[test]
    fn test_output_map_args() {
        let mut graph = FilterGraph::new("s");
        let video = graph.apply(&[Pad::video(0)], Filter::new("null"), MediaKind::Video);
        let audio = graph.apply(&[Pad::audio(0)], Filter::new("anull"), MediaKind::Audio);
        let output = GraphOutput::Combined { video, audio };
        assert_eq!(output.map_args(), vec!["-map", "[s0]", "-map", "[s1]"]);
        assert_eq!(output.stream_count(), 2);
    }
}
