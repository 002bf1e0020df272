/// Domain alignment report produced by the external profile aligner
///
/// A report is a sequence of domain blocks. Each block opens with a header line
/// starting with `==` and holds one or more wrapped groups of five rows:
///
/// ```text
///   == domain 1  score: 22.1 bits;  conditional E-value: 3.1e-07
///                     CCCCEEEEE CS
///          PF00069  1 yelleklGe 9
///                     y+l e+lG
///      seq1        12 YKLGEALGK 20
///                     789****** PP
/// ```
///
/// The match row keeps its spaces, so it is read by column under the model
/// row's sequence. Every row of a group must span the same number of columns.
/// A group lacking its `CS` row gets `?` in that column.
use crate::error::{AlignError, Result};

/// Match-row symbol marking a column with no counterpart on the decoder side
pub const GAP: char = '-';

/// One aligned column of a domain block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignStep {
    /// Consensus structure of the model (`CS` row)
    pub model_cs: char,
    /// Consensus residue of the aligned profile row
    pub target_cs: char,
    pub match_symbol: char,
    pub target: char,
    /// Posterior probability (`PP` row)
    pub confidence: char,
}

impl AlignStep {
    pub fn is_gap(&self) -> bool {
        self.match_symbol == GAP
    }
}

/// One `==` block of the report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainBlock {
    pub header: String,
    pub model_name: String,
    pub model_start: usize,
    pub model_end: usize,
    pub target_name: String,
    pub target_start: usize,
    pub target_end: usize,
    pub steps: Vec<AlignStep>,
}

impl DomainBlock {
    fn new(header: String) -> Self {
        DomainBlock {
            header,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

fn is_header(line: &str) -> bool {
    line.trim_start().starts_with("==")
}

/// `[name] start sequence end`, with the byte column where the sequence starts
struct SequenceRow<'a> {
    name: &'a str,
    start: usize,
    seq: &'a str,
    end: usize,
    column: usize,
}

fn sequence_row(line: &str, lineno: usize) -> Result<SequenceRow<'_>> {
    let fail = || {
        AlignError::parse(
            lineno,
            format!("expected `[name] start sequence end` row, got `{}`", line.trim()),
        )
    };

    let trimmed = line.trim_end();
    let (rest, end) = trimmed.rsplit_once(char::is_whitespace).ok_or_else(fail)?;
    let (before, seq) = rest
        .trim_end()
        .rsplit_once(char::is_whitespace)
        .ok_or_else(fail)?;
    let column = before.len() + 1;
    let before = before.trim_end();
    let (name, start) = match before.rsplit_once(char::is_whitespace) {
        Some((name, start)) => (name.trim(), start),
        None => ("", before.trim_start()),
    };

    Ok(SequenceRow {
        name,
        start: start.parse().map_err(|_| fail())?,
        seq,
        end: end.parse().map_err(|_| fail())?,
        column,
    })
}

/// Row content in front of a trailing `CS`/`PP` tag
fn tagged_row<'a>(line: &'a str, tag: &str, lineno: usize) -> Result<&'a str> {
    line.trim_end()
        .strip_suffix(tag)
        .filter(|body| body.is_empty() || body.ends_with(char::is_whitespace))
        .map(str::trim)
        .ok_or_else(|| {
            AlignError::parse(
                lineno,
                format!("expected row ending in `{tag}`, got `{}`", line.trim()),
            )
        })
}

/// `width` characters of `line` starting at byte `column`, space padded
///
/// A row ending before `column` is all spaces; a `column` that splits a
/// character is a parse error.
fn column_slice(line: &str, column: usize, width: usize, lineno: usize) -> Result<String> {
    let rest = if column >= line.len() {
        ""
    } else {
        line.get(column..).ok_or_else(|| {
            AlignError::parse(
                lineno,
                format!("match row is not aligned with the model row at byte {column}"),
            )
        })?
    };
    let mut out: String = rest.chars().take(width).collect();
    let missing = width - out.chars().count();
    out.extend(std::iter::repeat(' ').take(missing));
    Ok(out)
}

fn next_line<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
    after: usize,
    what: &str,
) -> Result<(usize, &'a str)> {
    lines.next().ok_or_else(|| {
        AlignError::parse(
            after + 1,
            format!("unexpected end of report, expected {what} row"),
        )
    })
}

fn next_nonblank<'a>(lines: &mut impl Iterator<Item = (usize, &'a str)>) -> Option<(usize, &'a str)> {
    lines.find(|(_, line)| !line.trim().is_empty())
}

fn read_group<'a>(
    block: &mut DomainBlock,
    (first_lineno, first_line): (usize, &'a str),
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
) -> Result<()> {
    // The CS row is optional; without it the model row comes first
    let (cs, model_lineno, line) = match tagged_row(first_line, "CS", first_lineno) {
        Ok(cs) => {
            let (model_lineno, line) = next_line(lines, first_lineno, "model")?;
            (Some(cs), model_lineno, line)
        }
        Err(_) => (None, first_lineno, first_line),
    };
    let model = sequence_row(line, model_lineno)?;

    let (match_lineno, match_line) = next_line(lines, model_lineno, "match")?;

    let (target_lineno, line) = next_line(lines, match_lineno, "target")?;
    let target = sequence_row(line, target_lineno)?;

    let (pp_lineno, line) = next_line(lines, target_lineno, "posterior probability")?;
    let pp = tagged_row(line, "PP", pp_lineno)?;

    let width = model.seq.chars().count();
    let matches = column_slice(match_line, model.column, width, match_lineno)?;
    let cs = match cs {
        Some(cs) if !cs.is_empty() => cs.to_string(),
        _ => {
            log::warn!("line {model_lineno}: domain group has no CS row, using `?`");
            "?".repeat(width)
        }
    };
    for (name, row, lineno) in [
        ("CS", cs.as_str(), first_lineno),
        ("target", target.seq, target_lineno),
        ("PP", pp, pp_lineno),
    ] {
        let len = row.chars().count();
        if len != width {
            return Err(AlignError::parse(
                lineno,
                format!("{name} row has {len} columns, model row has {width}"),
            ));
        }
    }

    if block.steps.is_empty() {
        block.model_name = model.name.to_string();
        block.model_start = model.start;
        block.target_name = target.name.to_string();
        block.target_start = target.start;
    }
    block.model_end = model.end;
    block.target_end = target.end;
    block.steps.extend(
        cs.chars()
            .zip(model.seq.chars())
            .zip(matches.chars())
            .zip(target.seq.chars())
            .zip(pp.chars())
            .map(|((((model_cs, target_cs), match_symbol), target), confidence)| AlignStep {
                model_cs,
                target_cs,
                match_symbol,
                target,
                confidence,
            }),
    );
    Ok(())
}

/// Parse every domain block of a report, in document order
///
/// Anything before the first header is ignored. Blank text yields no blocks;
/// non-blank text without any header is an error.
pub fn parse_report(text: &str) -> Result<Vec<DomainBlock>> {
    let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line));

    let mut header = lines
        .by_ref()
        .find(|(_, line)| is_header(line))
        .map(|(lineno, line)| (lineno, line.trim().to_string()));

    if header.is_none() && !text.trim().is_empty() {
        return Err(AlignError::parse(1, "no domain block header (`==`) found"));
    }

    let mut blocks = Vec::new();
    while let Some((header_lineno, title)) = header.take() {
        let mut block = DomainBlock::new(title);
        while let Some((lineno, line)) = next_nonblank(&mut lines) {
            if is_header(line) {
                header = Some((lineno, line.trim().to_string()));
                break;
            }
            read_group(&mut block, (lineno, line), &mut lines)?;
        }
        if block.is_empty() {
            return Err(AlignError::parse(
                header_lineno,
                "domain block has no alignment rows",
            ));
        }
        log::debug!(
            "domain block {} spans {} columns",
            blocks.len() + 1,
            block.len()
        );
        blocks.push(block);
    }
    Ok(blocks)
}

/// Header lines of every domain block
pub fn report_headers(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|line| is_header(line))
        .map(str::trim)
        .collect()
}
