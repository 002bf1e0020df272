/// Fixed-width text rendering of pixels placed on a coordinate frame
use crate::coords::{CoordArena, CoordId, Interval, Point};
use crate::error::Result;

/// One character pinned to a position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixel {
    pub point: Point,
    pub ch: char,
}

impl Pixel {
    pub fn new(point: Point, ch: char) -> Self {
        Pixel { point, ch }
    }
}

/// Turns pixels into a padded string as wide as its frame
///
/// Only pixels falling inside both the frame and the mask are drawn; the rest
/// are dropped. When two pixels land on the same column the later one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    coord: CoordId,
    padding: char,
    mask: Interval,
}

impl Viewport {
    pub fn new(arena: &CoordArena, coord: CoordId, padding: char) -> Result<Self> {
        Ok(Viewport {
            coord,
            padding,
            mask: arena.full(coord)?,
        })
    }

    pub fn coord(&self) -> CoordId {
        self.coord
    }

    pub fn padding(&self) -> char {
        self.padding
    }

    pub fn mask_interval(&self) -> Interval {
        self.mask
    }

    /// New viewport over a zero-based frame spanning `interval`
    pub fn cut(&self, arena: &mut CoordArena, interval: Interval) -> Result<Viewport> {
        let local = arena.project_interval(interval, self.coord)?;
        let frame = arena.frame(local)?;
        log::debug!("viewport cut to {local}");
        Viewport::new(arena, frame, self.padding)
    }

    /// Same width, but only columns inside `interval` may be drawn
    pub fn mask(&self, interval: Interval) -> Viewport {
        Viewport {
            mask: interval,
            ..*self
        }
    }

    pub fn display<I>(&self, arena: &CoordArena, pixels: I) -> Result<String>
    where
        I: IntoIterator<Item = Pixel>,
    {
        let frame = arena.full(self.coord)?;
        let mut row = vec![self.padding; frame.len()];
        for pixel in pixels {
            if arena.contains(frame, pixel.point)? && arena.contains(self.mask, pixel.point)? {
                let local = arena.project_point(pixel.point, self.coord)?;
                row[local.pos()] = pixel.ch;
            }
        }
        Ok(row.into_iter().collect())
    }
}
