// Library exports for pathmerge
pub mod aligner_report;
pub mod alignment;
pub mod coords;
pub mod decode_path;
pub mod error;
pub mod input;
pub mod painter;
pub mod render;
pub mod right_join;
pub mod viewport;

pub use alignment::{build_alignment, MergedPath, MergedSegment, MergedStep};
pub use coords::{CoordArena, CoordId, Interval, Point};
pub use error::{AlignError, Result};
pub use painter::{Stream, StreamKind};
pub use render::{render, RenderConfig, Renderer};
