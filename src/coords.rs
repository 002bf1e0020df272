/// Nested coordinate frames and the intervals and points addressed in them
///
/// Frames live in an arena and refer to their parent by index. A child frame is
/// the window `[offset, offset + length)` of its parent. Projecting a point or an
/// interval between two frames rebases it through their nearest common ancestor:
/// offsets are added walking up from the source and subtracted walking down to
/// the target.
///
/// Every arena gets its own id, and a [`CoordId`] records the arena that
/// allocated it. A clone gets a fresh id but still resolves the frames it
/// copied, so frames added to one clone are unknown to its siblings. Looking up
/// a frame an arena does not hold is an [`AlignError::UnrelatedSpace`].
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{AlignError, Result};

static NEXT_ARENA: AtomicUsize = AtomicUsize::new(0);

fn next_arena_id() -> usize {
    NEXT_ARENA.fetch_add(1, Ordering::Relaxed)
}

/// Handle to a frame inside a [`CoordArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordId {
    arena: usize,
    index: usize,
}

#[derive(Debug, Clone)]
struct CoordNode {
    length: usize,
    parent: Option<CoordId>,
    offset: usize, // 0 for roots
}

/// Arena owning every frame of one render request
#[derive(Debug)]
pub struct CoordArena {
    id: usize,
    // (arena id, frames copied from it) for each arena this one was cloned from
    inherited: Vec<(usize, usize)>,
    nodes: Vec<CoordNode>,
}

impl Default for CoordArena {
    fn default() -> Self {
        CoordArena {
            id: next_arena_id(),
            inherited: Vec::new(),
            nodes: Vec::new(),
        }
    }
}

impl Clone for CoordArena {
    fn clone(&self) -> Self {
        let mut inherited = self.inherited.clone();
        inherited.push((self.id, self.nodes.len()));
        CoordArena {
            id: next_arena_id(),
            inherited,
            nodes: self.nodes.clone(),
        }
    }
}

/// A single position, `0 <= pos < length` of its frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    coord: CoordId,
    pos: usize,
}

impl Point {
    pub fn coord(&self) -> CoordId {
        self.coord
    }

    pub fn pos(&self) -> usize {
        self.pos
    }
}

/// Half-open range `[start, end)` with `0 <= start <= end <= length` of its frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    coord: CoordId,
    start: usize,
    end: usize,
}

impl Interval {
    pub fn coord(&self) -> CoordId {
        self.coord
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Sub-interval given relative to this interval's start
    pub fn sub(&self, start: usize, end: usize) -> Result<Interval> {
        if start > end || end > self.len() {
            return Err(AlignError::invalid_range(start as i64, end as i64, self.len()));
        }
        Ok(Interval {
            coord: self.coord,
            start: self.start + start,
            end: self.start + end,
        })
    }

    /// Points covered by this interval, in order
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (self.start..self.end).map(move |pos| Point {
            coord: self.coord,
            pos,
        })
    }

    /// Split into contiguous pieces of at most `size` positions; the last may be shorter
    pub fn chunks(&self, size: usize) -> Result<Vec<Interval>> {
        if size == 0 {
            return Err(AlignError::invalid_range(0, 0, self.len()));
        }
        Ok((self.start..self.end)
            .step_by(size)
            .map(|start| Interval {
                coord: self.coord,
                start,
                end: (start + size).min(self.end),
            })
            .collect())
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

impl CoordArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames allocated so far
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a parentless frame
    pub fn root(&mut self, length: usize) -> CoordId {
        self.push(CoordNode {
            length,
            parent: None,
            offset: 0,
        })
    }

    /// Allocate the window `[offset, offset + length)` of `parent` as a new frame
    pub fn make_child(&mut self, parent: CoordId, offset: usize, length: usize) -> Result<CoordId> {
        let parent_length = self.length(parent)?;
        if offset + length > parent_length {
            return Err(AlignError::invalid_range(
                offset as i64,
                (offset + length) as i64,
                parent_length,
            ));
        }
        Ok(self.push(CoordNode {
            length,
            parent: Some(parent),
            offset,
        }))
    }

    /// Allocate a zero-based frame spanning exactly `interval`
    pub fn frame(&mut self, interval: Interval) -> Result<CoordId> {
        self.make_child(interval.coord, interval.start, interval.len())
    }

    fn push(&mut self, node: CoordNode) -> CoordId {
        self.nodes.push(node);
        CoordId {
            arena: self.id,
            index: self.nodes.len() - 1,
        }
    }

    /// Whether `id` names a frame of this arena
    pub fn holds(&self, id: CoordId) -> bool {
        let known = if id.arena == self.id {
            self.nodes.len()
        } else {
            match self.inherited.iter().find(|(arena, _)| *arena == id.arena) {
                Some(&(_, count)) => count,
                None => 0,
            }
        };
        id.index < known
    }

    fn node(&self, id: CoordId) -> Result<&CoordNode> {
        if !self.holds(id) {
            return Err(AlignError::UnrelatedSpace);
        }
        self.nodes.get(id.index).ok_or(AlignError::UnrelatedSpace)
    }

    pub fn length(&self, id: CoordId) -> Result<usize> {
        Ok(self.node(id)?.length)
    }

    pub fn offset(&self, id: CoordId) -> Result<usize> {
        Ok(self.node(id)?.offset)
    }

    pub fn parent(&self, id: CoordId) -> Result<Option<CoordId>> {
        Ok(self.node(id)?.parent)
    }

    /// The whole frame as an interval
    pub fn full(&self, id: CoordId) -> Result<Interval> {
        Ok(Interval {
            coord: id,
            start: 0,
            end: self.length(id)?,
        })
    }

    pub fn point(&self, id: CoordId, pos: usize) -> Result<Point> {
        let length = self.length(id)?;
        if pos >= length {
            return Err(AlignError::invalid_range(pos as i64, pos as i64 + 1, length));
        }
        Ok(Point { coord: id, pos })
    }

    pub fn interval(&self, id: CoordId, start: usize, end: usize) -> Result<Interval> {
        let length = self.length(id)?;
        if start > end || end > length {
            return Err(AlignError::invalid_range(start as i64, end as i64, length));
        }
        Ok(Interval { coord: id, start, end })
    }

    /// `id` followed by each of its ancestors up to the root
    fn lineage(&self, id: CoordId) -> Result<Vec<CoordId>> {
        let mut chain = vec![id];
        let mut node = self.node(id)?;
        while let Some(parent) = node.parent {
            chain.push(parent);
            node = self.node(parent)?;
        }
        Ok(chain)
    }

    pub fn common_ancestor(&self, a: CoordId, b: CoordId) -> Result<CoordId> {
        let chain = self.lineage(a)?;
        self.lineage(b)?
            .into_iter()
            .find(|x| chain.contains(x))
            .ok_or(AlignError::UnrelatedSpace)
    }

    /// Sum of offsets from `from` up to, but excluding, `ancestor`
    fn offset_to(&self, from: CoordId, ancestor: CoordId) -> Result<usize> {
        self.lineage(from)?
            .into_iter()
            .take_while(|&x| x != ancestor)
            .map(|x| self.offset(x))
            .sum()
    }

    pub fn project_point(&self, point: Point, target: CoordId) -> Result<Point> {
        let ancestor = self.common_ancestor(point.coord, target)?;
        if point.coord == target {
            return Ok(point);
        }
        let pos = (point.pos + self.offset_to(point.coord, ancestor)?) as i64
            - self.offset_to(target, ancestor)? as i64;
        let length = self.length(target)?;
        if pos < 0 || pos >= length as i64 {
            return Err(AlignError::invalid_range(pos, pos + 1, length));
        }
        Ok(Point {
            coord: target,
            pos: pos as usize,
        })
    }

    pub fn project_interval(&self, interval: Interval, target: CoordId) -> Result<Interval> {
        let ancestor = self.common_ancestor(interval.coord, target)?;
        if interval.coord == target {
            return Ok(interval);
        }
        let shift = self.offset_to(interval.coord, ancestor)? as i64
            - self.offset_to(target, ancestor)? as i64;
        let start = interval.start as i64 + shift;
        let end = interval.end as i64 + shift;
        let length = self.length(target)?;
        if start < 0 || end > length as i64 {
            return Err(AlignError::invalid_range(start, end, length));
        }
        Ok(Interval {
            coord: target,
            start: start as usize,
            end: end as usize,
        })
    }

    /// Whether `point` falls inside `interval`, compared in their common ancestor
    pub fn contains(&self, interval: Interval, point: Point) -> Result<bool> {
        let ancestor = self.common_ancestor(interval.coord, point.coord)?;
        let shift = self.offset_to(interval.coord, ancestor)?;
        let pos = point.pos + self.offset_to(point.coord, ancestor)?;
        Ok(interval.start + shift <= pos && pos < interval.end + shift)
    }
}
