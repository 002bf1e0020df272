/// Decoding path produced by the profile decoder
///
/// The payload is a `;`-separated list of `fragment,state,codon,amino` quads,
/// one per decoder step. States starting with `M`, `I` or `D` are core states
/// (they consume a profile column); anything else (`S`, `N`, `B`, `E`, `C`,
/// `T`, ...) is flanking.
use nom::{
    bytes::complete::take_till,
    character::complete::char,
    combinator::all_consuming,
    multi::separated_list0,
    sequence::{terminated, tuple},
    IResult,
};

use crate::coords::{CoordArena, CoordId, Interval};
use crate::error::{AlignError, Result};

/// Longest query fragment a single decoder step may emit
pub const MAX_FRAGMENT_LEN: usize = 5;

/// One decoder step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeStep {
    pub fragment: String,
    pub state: String,
    pub codon: String,
    pub amino: String,
    /// Sum of the fragment lengths of all preceding steps
    pub query_offset: usize,
    /// Number of preceding steps that emitted an amino acid
    pub amino_index: usize,
}

impl DecodeStep {
    pub fn is_core(&self) -> bool {
        matches!(self.state.chars().next(), Some('M' | 'I' | 'D'))
    }

    /// A mute step emits no amino acid
    pub fn is_mute(&self) -> bool {
        self.amino.is_empty()
    }

    /// Profile column of a core state, e.g. 12 for `M12`
    pub fn match_position(&self) -> Option<usize> {
        if !self.is_core() {
            return None;
        }
        self.state[1..].parse().ok()
    }

    pub fn state_letter(&self) -> char {
        self.state.chars().next().unwrap_or(' ')
    }

    pub fn has_codon(&self) -> bool {
        !self.codon.is_empty()
    }

    pub fn codon_char(&self, level: usize) -> Option<char> {
        self.codon.chars().nth(level)
    }

    pub fn amino_char(&self) -> Option<char> {
        self.amino.chars().next()
    }

    pub fn fragment_char(&self, level: usize) -> Option<char> {
        self.fragment.chars().nth(level)
    }

    fn validate(&self, idx: usize) -> Result<()> {
        let fail = |what: String| Err(AlignError::parse(1, format!("step {idx}: {what}")));
        if self.state.is_empty() {
            return fail("empty state label".to_string());
        }
        let codon_len = self.codon.chars().count();
        if codon_len != 0 && codon_len != 3 {
            return fail(format!("codon must have 0 or 3 characters, got {codon_len}"));
        }
        let amino_len = self.amino.chars().count();
        if amino_len > 1 {
            return fail(format!("amino must have 0 or 1 character, got {amino_len}"));
        }
        let fragment_len = self.fragment.chars().count();
        if fragment_len > MAX_FRAGMENT_LEN {
            return fail(format!(
                "fragment longer than {MAX_FRAGMENT_LEN} characters: {}",
                self.fragment
            ));
        }
        Ok(())
    }
}

/// Contiguous run of a path, matched when it is made of core states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub interval: Interval,
    pub matched: bool,
}

type Quad<'a> = (&'a str, &'a str, &'a str, &'a str);

fn field(input: &str) -> IResult<&str, &str> {
    take_till(|c| c == ',' || c == ';')(input)
}

fn quad(input: &str) -> IResult<&str, Quad<'_>> {
    tuple((
        terminated(field, char(',')),
        terminated(field, char(',')),
        terminated(field, char(',')),
        field,
    ))(input)
}

fn quads(input: &str) -> IResult<&str, Vec<Quad<'_>>> {
    all_consuming(separated_list0(char(';'), quad))(input)
}

/// Parsed decoder path with its own root coordinate frame
#[derive(Debug, Clone)]
pub struct DecodePath {
    steps: Vec<DecodeStep>,
    arena: CoordArena,
    coord: CoordId,
}

impl DecodePath {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let (_, quads) = quads(text).map_err(|err| match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => AlignError::parse(
                1,
                format!(
                    "malformed decode step at byte {}",
                    text.len() - e.input.len()
                ),
            ),
            nom::Err::Incomplete(_) => AlignError::parse(1, "truncated decode path"),
        })?;

        let mut steps = Vec::with_capacity(quads.len());
        let mut query_offset = 0;
        let mut amino_index = 0;
        for (idx, (fragment, state, codon, amino)) in quads.into_iter().enumerate() {
            let step = DecodeStep {
                fragment: fragment.to_string(),
                state: state.to_string(),
                codon: codon.to_string(),
                amino: amino.to_string(),
                query_offset,
                amino_index,
            };
            step.validate(idx)?;
            query_offset += step.fragment.chars().count();
            if !step.is_mute() {
                amino_index += 1;
            }
            steps.push(step);
        }

        let mut arena = CoordArena::new();
        let coord = arena.root(steps.len());
        log::debug!("parsed decode path with {} steps", steps.len());
        Ok(DecodePath {
            steps,
            arena,
            coord,
        })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[DecodeStep] {
        &self.steps
    }

    pub fn arena(&self) -> &CoordArena {
        &self.arena
    }

    pub fn coord(&self) -> CoordId {
        self.coord
    }

    /// Steps covered by an interval of this path's frame
    pub fn slice(&self, interval: Interval) -> Result<&[DecodeStep]> {
        let local = self.arena.project_interval(interval, self.coord)?;
        Ok(&self.steps[local.start()..local.end()])
    }

    /// The concatenated query sequence
    pub fn query(&self) -> String {
        self.steps.iter().map(|s| s.fragment.as_str()).collect()
    }

    /// Partition into alternating unmatched/matched runs
    ///
    /// A new segment starts whenever core-ness flips. The last segment is always
    /// unmatched, and is empty when the path ends inside a matched run.
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut start = 0;
        let mut matched = false;

        let mut push = |start: usize, end: usize, matched: bool| {
            if let Ok(interval) = self.arena.interval(self.coord, start, end) {
                segments.push(Segment { interval, matched });
            }
        };

        for (i, step) in self.steps.iter().enumerate() {
            if step.is_core() != matched {
                if i > start {
                    push(start, i, matched);
                }
                start = i;
                matched = step.is_core();
            }
        }

        let n = self.steps.len();
        push(start, n, matched);
        if matched {
            push(n, n, false);
        }
        segments
    }
}

impl std::str::FromStr for DecodePath {
    type Err = AlignError;

    fn from_str(s: &str) -> Result<Self> {
        DecodePath::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(segments: &[Segment]) -> Vec<(usize, usize, bool)> {
        segments
            .iter()
            .map(|s| (s.interval.start(), s.interval.end(), s.matched))
            .collect()
    }

    #[test]
    fn test_parse_steps() {
        let path = DecodePath::parse("ACG,M1,ACG,T;,N,,;GGT,M2,GGT,G").unwrap();
        assert_eq!(path.len(), 3);

        let first = &path.steps()[0];
        assert_eq!(first.fragment, "ACG");
        assert_eq!(first.state, "M1");
        assert_eq!(first.codon, "ACG");
        assert_eq!(first.amino, "T");
        assert!(first.is_core());
        assert!(!first.is_mute());
        assert_eq!(first.match_position(), Some(1));

        let second = &path.steps()[1];
        assert!(!second.is_core());
        assert!(second.is_mute());
        assert_eq!(second.match_position(), None);
        assert_eq!(second.fragment_char(0), None);

        let third = &path.steps()[2];
        assert_eq!(third.query_offset, 3);
        assert_eq!(third.amino_index, 1);
        assert_eq!(path.query(), "ACGGGT");
    }

    #[test]
    fn test_segments_example() {
        let path = DecodePath::parse("ACG,M1,ACG,T;,N,,;GGT,M2,GGT,G").unwrap();
        assert_eq!(
            bounds(&path.segments()),
            vec![(0, 1, true), (1, 2, false), (2, 3, true), (3, 3, false)]
        );
    }

    #[test]
    fn test_segments_without_core_states() {
        let path = DecodePath::parse(",S,,;AC,N,,;,B,,").unwrap();
        assert_eq!(bounds(&path.segments()), vec![(0, 3, false)]);
    }

    #[test]
    fn test_segments_with_flanks() {
        let path = DecodePath::parse(",S,,;AAA,M1,AAA,K;AC,I1,,;,D2,,;,E,,;,T,,").unwrap();
        assert_eq!(
            bounds(&path.segments()),
            vec![(0, 1, false), (1, 4, true), (4, 6, false)]
        );
    }

    #[test]
    fn test_empty_path() {
        let path = DecodePath::parse("  \n").unwrap();
        assert!(path.is_empty());
        assert_eq!(bounds(&path.segments()), vec![(0, 0, false)]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            DecodePath::parse("ACG,M1,AC,T"),
            Err(AlignError::Parse { .. })
        ));
        assert!(DecodePath::parse("ACG,M1,ACG,TT").is_err());
        assert!(DecodePath::parse("ACGTAC,M1,ACG,T").is_err());
        assert!(DecodePath::parse("ACG,,ACG,T").is_err());
        assert!(DecodePath::parse("ACG,M1,ACG").is_err());
        assert!(DecodePath::parse("ACG,M1,ACG,T;").is_err());
    }

    #[test]
    fn test_slice_segment() {
        let path = DecodePath::parse(",S,,;AAA,M1,AAA,K;CCC,M2,CCC,P;,E,,").unwrap();
        let segments = path.segments();
        let hit = path.slice(segments[1].interval).unwrap();
        let states: Vec<&str> = hit.iter().map(|s| s.state.as_str()).collect();
        assert_eq!(states, vec!["M1", "M2"]);
    }
}
