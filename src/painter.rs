//! Attribute streams and the painter that turns merged steps into pixels

use crate::alignment::MergedStep;
use crate::error::{AlignError, Result};
use crate::viewport::Pixel;

/// Which attribute of a merged step a stream shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Decoded amino acid
    Amino,
    /// One nucleotide of the decoded codon, level 0..3
    Codon,
    /// One character of the emitted query fragment, level 0..5
    Query,
    /// First letter of the decoder state
    State,
    /// Aligner `CS` row
    ModelCs,
    /// Aligner model row residue
    TargetCs,
    /// Aligner match row
    Match,
    /// Aligner target row residue
    Target,
    /// Aligner `PP` row
    Confidence,
}

impl StreamKind {
    pub fn name(&self) -> &'static str {
        match self {
            StreamKind::Amino => "amino",
            StreamKind::Codon => "codon",
            StreamKind::Query => "query",
            StreamKind::State => "state",
            StreamKind::ModelCs => "model_cs",
            StreamKind::TargetCs => "model",
            StreamKind::Match => "match",
            StreamKind::Target => "target",
            StreamKind::Confidence => "pp",
        }
    }

    /// Number of levels a stream of this kind has
    pub fn levels(&self) -> usize {
        match self {
            StreamKind::Codon => 3,
            StreamKind::Query => crate::decode_path::MAX_FRAGMENT_LEN,
            _ => 1,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "amino" => StreamKind::Amino,
            "codon" => StreamKind::Codon,
            "query" => StreamKind::Query,
            "state" => StreamKind::State,
            "model_cs" | "h3hmm_cs" => StreamKind::ModelCs,
            "model" | "h3query_cs" => StreamKind::TargetCs,
            "match" | "h3match" => StreamKind::Match,
            "target" | "h3query" => StreamKind::Target,
            "pp" | "h3score" => StreamKind::Confidence,
            _ => return None,
        };
        Some(kind)
    }
}

/// A stream kind together with its level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stream {
    kind: StreamKind,
    level: usize,
}

impl Stream {
    pub fn new(kind: StreamKind, level: usize) -> Result<Self> {
        let stream = Stream { kind, level };
        if level >= kind.levels() {
            return Err(AlignError::invalid_stream(stream.to_string()));
        }
        Ok(stream)
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Every stream, every level, in display order
    pub fn all() -> Vec<Stream> {
        [
            StreamKind::ModelCs,
            StreamKind::TargetCs,
            StreamKind::Match,
            StreamKind::Target,
            StreamKind::Confidence,
            StreamKind::State,
            StreamKind::Amino,
            StreamKind::Codon,
            StreamKind::Query,
        ]
        .into_iter()
        .flat_map(|kind| (0..kind.levels()).map(move |level| Stream { kind, level }))
        .collect()
    }
}

impl std::str::FromStr for Stream {
    type Err = AlignError;

    /// `name` or `name:level`
    fn from_str(s: &str) -> Result<Self> {
        let (name, level) = match s.split_once(':') {
            Some((name, level)) => {
                let level = level
                    .parse()
                    .map_err(|_| AlignError::invalid_stream(s))?;
                (name, level)
            }
            None => (s, 0),
        };
        let kind = StreamKind::from_name(name).ok_or_else(|| AlignError::invalid_stream(s))?;
        Stream::new(kind, level)
    }
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.kind.levels() > 1 || self.level > 0 {
            write!(f, "{}:{}", self.kind.name(), self.level)
        } else {
            write!(f, "{}", self.kind.name())
        }
    }
}

/// Paints one pixel per step for a chosen stream
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    blank: char,
}

impl Default for Painter {
    fn default() -> Self {
        Painter { blank: ' ' }
    }
}

impl Painter {
    pub fn new(blank: char) -> Self {
        Painter { blank }
    }

    /// Character `stream` shows for `step`, if the step has it
    pub fn extract(stream: &Stream, step: &MergedStep) -> Option<char> {
        let level = stream.level;
        match stream.kind {
            StreamKind::Amino => step.decode.as_ref()?.amino_char(),
            StreamKind::Codon => step.decode.as_ref()?.codon_char(level),
            StreamKind::Query => step.decode.as_ref()?.fragment_char(level),
            StreamKind::State => step.decode.as_ref().map(|d| d.state_letter()),
            StreamKind::ModelCs => step.aligner.map(|a| a.model_cs),
            StreamKind::TargetCs => step.aligner.map(|a| a.target_cs),
            StreamKind::Match => step.aligner.map(|a| a.match_symbol),
            StreamKind::Target => step.aligner.map(|a| a.target),
            StreamKind::Confidence => step.aligner.map(|a| a.confidence),
        }
    }

    /// One pixel per step; steps lacking the attribute get the blank character
    pub fn draw(&self, stream: &Stream, steps: &[MergedStep]) -> Vec<Pixel> {
        steps
            .iter()
            .map(|step| Pixel::new(step.point, Self::extract(stream, step).unwrap_or(self.blank)))
            .collect()
    }

    /// Pixels only for the steps that carry the attribute
    pub fn draw_present(stream: &Stream, steps: &[MergedStep]) -> Vec<Pixel> {
        steps
            .iter()
            .filter_map(|step| Self::extract(stream, step).map(|ch| Pixel::new(step.point, ch)))
            .collect()
    }
}
