/// Merged decoder/aligner path on one shared position axis
///
/// Unmatched decoder segments pass through one step per decoder step. Each
/// matched segment is paired, in order, with the next aligner domain block and
/// the two are interleaved by a [`RightJoin`]. All merged steps are then laid
/// out on a single root frame, and each decoder segment keeps the interval it
/// now occupies there.
use crate::aligner_report::{parse_report, AlignStep, DomainBlock};
use crate::coords::{CoordArena, CoordId, Interval, Point};
use crate::decode_path::{DecodePath, DecodeStep};
use crate::error::{AlignError, Result};
use crate::right_join::RightJoin;

/// One position of the merged path; at least one side is always present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedStep {
    pub decode: Option<DecodeStep>,
    pub aligner: Option<AlignStep>,
    pub point: Point,
}

impl MergedStep {
    pub fn both(&self) -> bool {
        self.decode.is_some() && self.aligner.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedSegment {
    pub interval: Interval,
    pub matched: bool,
    /// Domain block merged into this segment, for matched segments
    pub block: Option<usize>,
}

/// An aligner column is an insertion against the decoder when the decoder
/// step emits a residue but the aligner reports a gap
pub fn is_insertion(decode: &DecodeStep, aligner: &AlignStep) -> bool {
    !decode.is_mute() && aligner.is_gap()
}

/// 1-based inclusive range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub first: usize,
    pub last: usize,
}

impl Bounds {
    fn over<I: Iterator<Item = (usize, usize)>>(mut spans: I) -> Option<Bounds> {
        let (first, mut last) = spans.next()?;
        if let Some((_, end)) = spans.last() {
            last = end;
        }
        Some(Bounds { first, last })
    }
}

/// Query, amino acid and profile-state coordinates covered by a run of steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpanBounds {
    pub query: Option<Bounds>,
    pub amino: Option<Bounds>,
    pub state: Option<Bounds>,
}

impl SpanBounds {
    pub fn of(steps: &[MergedStep]) -> Self {
        let decoded = || steps.iter().filter_map(|s| s.decode.as_ref());
        SpanBounds {
            query: Bounds::over(decoded().filter(|d| !d.fragment.is_empty()).map(|d| {
                (
                    d.query_offset + 1,
                    d.query_offset + d.fragment.chars().count(),
                )
            })),
            amino: Bounds::over(
                decoded()
                    .filter(|d| !d.is_mute())
                    .map(|d| (d.amino_index + 1, d.amino_index + 1)),
            ),
            state: Bounds::over(decoded().filter_map(|d| d.match_position()).map(|p| (p, p))),
        }
    }
}

/// A matched segment together with the domain block merged into it
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub segment: &'a MergedSegment,
    pub block: &'a DomainBlock,
    pub steps: &'a [MergedStep],
}

impl Hit<'_> {
    pub fn interval(&self) -> Interval {
        self.segment.interval
    }

    pub fn header(&self) -> &str {
        &self.block.header
    }
}

#[derive(Debug, Clone)]
pub struct MergedPath {
    arena: CoordArena,
    coord: CoordId,
    steps: Vec<MergedStep>,
    segments: Vec<MergedSegment>,
    blocks: Vec<DomainBlock>,
}

impl MergedPath {
    /// Merge a decoder path with the domain blocks reported for it
    ///
    /// Blocks pair with matched segments in order, so their counts must agree.
    pub fn build(decode: &DecodePath, blocks: Vec<DomainBlock>) -> Result<Self> {
        let segments = decode.segments();
        let matched = segments.iter().filter(|s| s.matched).count();
        if matched != blocks.len() {
            return Err(AlignError::BlockCountMismatch {
                segments: matched,
                blocks: blocks.len(),
            });
        }

        let mut pairs: Vec<(Option<DecodeStep>, Option<AlignStep>)> = Vec::new();
        let mut layout: Vec<(usize, bool, Option<usize>)> = Vec::with_capacity(segments.len());
        let mut next_block = 0;

        for segment in &segments {
            let steps = decode.slice(segment.interval)?;
            if !segment.matched {
                pairs.extend(steps.iter().cloned().map(|s| (Some(s), None)));
                layout.push((steps.len(), false, None));
                continue;
            }

            let block = &blocks[next_block];
            let join = RightJoin::new(steps.len(), block.len(), |i, j| {
                is_insertion(&steps[i], &block.steps[j])
            });
            log::debug!(
                "segment {} merges {} decoder steps with {} aligner columns into {}",
                segment.interval,
                steps.len(),
                block.len(),
                join.len()
            );
            pairs.extend(join.zip(steps.iter().cloned(), block.steps.iter().copied()));
            layout.push((join.len(), true, Some(next_block)));
            next_block += 1;
        }

        let mut arena = CoordArena::new();
        let coord = arena.root(pairs.len());
        let full = arena.full(coord)?;

        let mut merged_segments = Vec::with_capacity(layout.len());
        let mut start = 0;
        for (len, matched, block) in layout {
            merged_segments.push(MergedSegment {
                interval: arena.interval(coord, start, start + len)?,
                matched,
                block,
            });
            start += len;
        }

        let steps = pairs
            .into_iter()
            .zip(full.points())
            .map(|((decode, aligner), point)| MergedStep {
                decode,
                aligner,
                point,
            })
            .collect();

        Ok(MergedPath {
            arena,
            coord,
            steps,
            segments: merged_segments,
            blocks,
        })
    }

    pub fn arena(&self) -> &CoordArena {
        &self.arena
    }

    pub fn coord(&self) -> CoordId {
        self.coord
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[MergedStep] {
        &self.steps
    }

    pub fn segments(&self) -> &[MergedSegment] {
        &self.segments
    }

    pub fn blocks(&self) -> &[DomainBlock] {
        &self.blocks
    }

    /// Steps inside `interval`, which may live in any frame related to this path's
    pub fn steps_within(&self, interval: Interval) -> Result<&[MergedStep]> {
        let local = self.arena.project_interval(interval, self.coord)?;
        Ok(&self.steps[local.start()..local.end()])
    }

    pub fn hits(&self) -> Vec<Hit<'_>> {
        self.segments
            .iter()
            .filter_map(|segment| {
                let block = &self.blocks[segment.block?];
                let steps = &self.steps[segment.interval.start()..segment.interval.end()];
                Some(Hit {
                    segment,
                    block,
                    steps,
                })
            })
            .collect()
    }
}

/// Parse both payloads and merge them
pub fn build_alignment(decode_text: &str, aligner_text: &str) -> Result<MergedPath> {
    let decode = DecodePath::parse(decode_text)?;
    let blocks = parse_report(aligner_text)?;
    let path = MergedPath::build(&decode, blocks)?;
    log::info!(
        "merged {} decoder steps into {} positions ({} hits)",
        decode.len(),
        path.len(),
        path.blocks().len()
    );
    Ok(path)
}
