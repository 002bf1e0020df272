//! Rendering merged paths as text: per-stream lines, wrapped layouts and the
//! per-domain alignment table

use rayon::prelude::*;

use crate::alignment::{Bounds, MergedPath, MergedStep, SpanBounds};
use crate::coords::{CoordArena, Interval};
use crate::error::Result;
use crate::painter::{Painter, Stream, StreamKind};
use crate::viewport::Viewport;

/// Columns per row group of the domain table
pub const TABLE_WIDTH: usize = 88;
/// Fill for table cells a step has nothing to show for
pub const TABLE_PADDING: char = '.';

/// Rendering options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Fill for viewport positions no pixel reaches
    pub padding: char,
    /// What a step lacking a stream's side is painted with
    pub blank: char,
    /// Wrap layouts into blocks of this many columns
    pub width: Option<usize>,
    /// Prefix layout rows with their stream name
    pub labels: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            padding: ' ',
            blank: ' ',
            width: None,
            labels: true,
        }
    }
}

impl RenderConfig {
    pub fn with_padding(mut self, padding: char) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_blank(mut self, blank: char) -> Self {
        self.blank = blank;
        self
    }

    pub fn with_width(mut self, width: Option<usize>) -> Self {
        self.width = width;
        self
    }

    pub fn with_labels(mut self, labels: bool) -> Self {
        self.labels = labels;
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Renderer { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// One line per stream, over `range` when given or the whole path otherwise
    pub fn render(
        &self,
        path: &MergedPath,
        streams: &[Stream],
        range: Option<Interval>,
    ) -> Result<Vec<String>> {
        self.render_window(path, streams, range, None)
    }

    /// One full-width line per stream with only `mask` drawn
    pub fn render_masked(
        &self,
        path: &MergedPath,
        streams: &[Stream],
        mask: Interval,
    ) -> Result<Vec<String>> {
        self.render_window(path, streams, None, Some(mask))
    }

    /// Labelled rows wrapped to the configured width
    ///
    /// Each wrapped block holds one row per stream; blocks are separated by an
    /// empty line. An empty range renders as a single block of empty rows.
    pub fn layout(
        &self,
        path: &MergedPath,
        streams: &[Stream],
        range: Option<Interval>,
        mask: Option<Interval>,
    ) -> Result<Vec<String>> {
        let range = match range {
            Some(range) => range,
            None => path.arena().full(path.coord())?,
        };
        let mut chunks = match self.config.width {
            Some(width) => range.chunks(width)?,
            None => Vec::new(),
        };
        // An empty range still gets one row per stream
        if chunks.is_empty() {
            chunks.push(range);
        }

        let labels: Vec<String> = streams.iter().map(Stream::to_string).collect();
        let label_width = labels.iter().map(String::len).max().unwrap_or(0);

        let mut out = Vec::new();
        for (i, chunk) in chunks.into_iter().enumerate() {
            if i > 0 {
                out.push(String::new());
            }
            let lines = self.render_window(path, streams, Some(chunk), mask)?;
            for (label, line) in labels.iter().zip(lines) {
                if self.config.labels {
                    out.push(format!("{label:<label_width$} {line}"));
                } else {
                    out.push(line);
                }
            }
        }
        Ok(out)
    }

    /// Alignment table of every hit, wrapped at the configured width
    /// (88 columns by default)
    pub fn domain_table(
        &self,
        path: &MergedPath,
        seq_name: &str,
        profile_name: &str,
    ) -> Result<String> {
        let width = self.config.width.unwrap_or(TABLE_WIDTH);
        let mut arena = path.arena().clone();
        let viewport = Viewport::new(&arena, path.coord(), TABLE_PADDING)?;

        let mut txt = String::from("Alignments for each domain:\n");
        for hit in path.hits() {
            txt.push_str(hit.header());
            txt.push('\n');

            let mut table: Vec<[String; 4]> = Vec::new();
            for chunk in hit.interval().chunks(width)? {
                let view = viewport.cut(&mut arena, chunk)?;
                let steps = path.steps_within(chunk)?;
                let bounds = SpanBounds::of(steps);
                let show = |kind: StreamKind, level: usize| -> Result<String> {
                    let stream = Stream::new(kind, level)?;
                    view.display(&arena, Painter::draw_present(&stream, steps))
                };
                let (state_l, state_r) = bound_cells(bounds.state);
                let (amino_l, amino_r) = bound_cells(bounds.amino);
                let (query_l, query_r) = bound_cells(bounds.query);

                table.push(row("", "", show(StreamKind::ModelCs, 0)?, "CS"));
                table.push(row(profile_name, &state_l, show(StreamKind::TargetCs, 0)?, &state_r));
                table.push(row("", "", show(StreamKind::Match, 0)?, ""));
                table.push(row(seq_name, &amino_l, show(StreamKind::Amino, 0)?, &amino_r));
                table.push(row("", &query_l, show(StreamKind::Query, 0)?, &query_r));
                for level in 1..StreamKind::Query.levels() {
                    table.push(row("", "", show(StreamKind::Query, level)?, ""));
                }
                table.push(row("", "", show(StreamKind::Confidence, 0)?, "PP"));
                table.push(row("", "", String::new(), ""));
            }
            txt.push_str(&format_table(&table));
        }
        Ok(txt)
    }

    fn render_window(
        &self,
        path: &MergedPath,
        streams: &[Stream],
        range: Option<Interval>,
        mask: Option<Interval>,
    ) -> Result<Vec<String>> {
        let mut arena = path.arena().clone();
        let mut view = Viewport::new(&arena, path.coord(), self.config.padding)?;
        let steps = match range {
            Some(range) => {
                view = view.cut(&mut arena, range)?;
                path.steps_within(range)?
            }
            None => path.steps(),
        };
        if let Some(mask) = mask {
            view = view.mask(mask);
        }
        self.paint(&arena, &view, streams, steps)
    }

    fn paint(
        &self,
        arena: &CoordArena,
        view: &Viewport,
        streams: &[Stream],
        steps: &[MergedStep],
    ) -> Result<Vec<String>> {
        let painter = Painter::new(self.config.blank);
        streams
            .par_iter()
            .map(|stream| view.display(arena, painter.draw(stream, steps)))
            .collect()
    }
}

fn row(name: &str, left: &str, seq: String, right: &str) -> [String; 4] {
    [name.to_string(), left.to_string(), seq, right.to_string()]
}

fn bound_cells(bounds: Option<Bounds>) -> (String, String) {
    match bounds {
        Some(b) => (b.first.to_string(), b.last.to_string()),
        None => (String::new(), String::new()),
    }
}

/// Name and left-bound columns right-aligned, the rest left-aligned
fn format_table(rows: &[[String; 4]]) -> String {
    let mut widths = [0usize; 4];
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let [w0, w1, w2, _] = widths;

    let mut out = String::new();
    for [name, left, seq, right] in rows {
        let line = format!("{name:>w0$} {left:>w1$} {seq:<w2$} {right}");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Render `streams` of `path` with the default configuration
pub fn render(
    path: &MergedPath,
    streams: &[Stream],
    range: Option<Interval>,
) -> Result<Vec<String>> {
    Renderer::default().render(path, streams, range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::build_alignment;
    use crate::error::AlignError;
    use pretty_assertions::assert_eq;

    const REPORT: &str = "\
== domain 1
         CE CS
    m  1 kp 2
         k-
    s 10 KP 11
         9* PP
";

    fn path() -> MergedPath {
        build_alignment("GT,N,,;AAA,M1,AAA,K;,T,,", REPORT).unwrap()
    }

    fn streams(names: &[&str]) -> Vec<Stream> {
        names.iter().map(|n| n.parse().unwrap()).collect()
    }

    #[test]
    fn test_render_whole_path() {
        let path = path();
        let lines = render(&path, &streams(&["state", "match", "amino"]), None).unwrap();
        assert_eq!(lines, vec!["NM T", " k- ", " K  "]);
    }

    #[test]
    fn test_render_segment() {
        let path = path();
        let hit = path.segments()[1].interval;
        let lines = render(&path, &streams(&["target", "state"]), Some(hit)).unwrap();
        assert_eq!(lines, vec!["KP", "M "]);
    }

    #[test]
    fn test_render_masked_keeps_width() {
        let path = path();
        let hit = path.segments()[1].interval;
        let renderer = Renderer::new(RenderConfig::default().with_padding('~'));
        let lines = renderer
            .render_masked(&path, &streams(&["state", "match"]), hit)
            .unwrap();
        assert_eq!(lines, vec!["~M ~", "~k-~"]);
    }

    #[test]
    fn test_layout_wraps_with_labels() {
        let path = path();
        let renderer = Renderer::new(RenderConfig::default().with_width(Some(3)));
        let lines = renderer
            .layout(&path, &streams(&["state", "codon:0"]), None, None)
            .unwrap();
        assert_eq!(
            lines,
            vec![
                "state   NM ",
                "codon:0  A ",
                "",
                "state   T",
                "codon:0  ",
            ]
        );

        let bare = Renderer::new(RenderConfig::default().with_labels(false));
        assert_eq!(
            bare.layout(&path, &streams(&["state"]), None, None).unwrap(),
            vec!["NM T"]
        );
    }

    #[test]
    fn test_layout_of_empty_range() {
        let path = path();
        let empty = path.arena().interval(path.coord(), 2, 2).unwrap();
        let names = streams(&["state", "amino"]);
        let expected = vec!["state ", "amino "];
        for width in [None, Some(3)] {
            let renderer = Renderer::new(RenderConfig::default().with_width(width));
            assert_eq!(
                renderer.layout(&path, &names, Some(empty), None).unwrap(),
                expected
            );
        }
    }

    #[test]
    fn test_zero_width_layout() {
        let path = path();
        let renderer = Renderer::new(RenderConfig::default().with_width(Some(0)));
        assert!(matches!(
            renderer.layout(&path, &streams(&["state"]), None, None),
            Err(AlignError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_domain_table() {
        let report = "\
== domain 1  score: 5.0 bits
         CCE CS
    m  1 k.p 2
         k p
    s 10 KAP 11
         9.* PP
";
        let path = build_alignment(",S,,;AAA,M1,AAA,K;AC,I1,,;CCC,M2,CCC,P;,E,,", report).unwrap();
        let table = Renderer::default()
            .domain_table(&path, "seq", "prof")
            .unwrap();
        let expected = "\
Alignments for each domain:
== domain 1  score: 5.0 bits
       CCE CS
prof 1 k.p 2
       k p
 seq 1 K.P 2
     1 AAC 8
       ACC
       A.C
       ...
       ...
       9.* PP

";
        assert_eq!(table, expected);
    }
}
