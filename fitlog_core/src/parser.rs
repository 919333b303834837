//! Workout log parser.
//!
//! A workout log is a sequence of detail groups, one per exercise:
//!
//! ```text
//! #Legs
//! #Squat
//! #3 sets 10 reps
//! #80kg
//! #30min
//! ```
//!
//! Input is first split on the segment separator (`;` by default). A segment
//! spanning several lines is a block of its own; runs of single-line segments
//! are pooled into one block, so `#Legs;#Squat;#3 sets 10 reps;#80kg;#30min`
//! reads the same as the multi-line form. Each block is then consumed five
//! lines at a time. Every line must start with the marker character.
//!
//! Parsing is all-or-nothing: the first bad group rejects the whole log.

use crate::config::ParserConfig;
use crate::error::{Field, ParseError, ParseErrorKind};
use crate::WorkoutEntry;

/// Lines following the category marker in every detail group
pub const DETAIL_LINES: usize = 4;

const GROUP_LINES: usize = DETAIL_LINES + 1;

/// A non-empty, trimmed input line and its 1-based position
#[derive(Clone, Copy, Debug)]
struct Line<'a> {
    number: usize,
    text: &'a str,
}

/// Parser for workout log text
#[derive(Clone, Debug)]
pub struct LogParser {
    marker: char,
    separator: char,
}

impl Default for LogParser {
    fn default() -> Self {
        Self::from_config(&ParserConfig::default())
    }
}

impl LogParser {
    pub fn new(marker: char, separator: char) -> Self {
        Self { marker, separator }
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new(config.marker, config.segment_separator)
    }

    /// Parse a workout log into entries in input order.
    ///
    /// Calories are left at zero; see [`crate::estimator::price`].
    pub fn parse(&self, raw: &str) -> Result<Vec<WorkoutEntry>, ParseError> {
        let blocks = self.blocks(raw);
        if blocks.is_empty() {
            return Err(ParseError {
                group: 1,
                line: 1,
                kind: ParseErrorKind::Empty,
            });
        }

        let entries = blocks
            .iter()
            .flat_map(|block| block.chunks(GROUP_LINES))
            .enumerate()
            .try_fold(Vec::new(), |mut entries, (index, group)| {
                entries.push(self.parse_group(index + 1, group)?);
                Ok::<_, ParseError>(entries)
            })?;

        tracing::debug!("Parsed {} workout entries", entries.len());
        Ok(entries)
    }

    fn blocks<'a>(&self, raw: &'a str) -> Vec<Vec<Line<'a>>> {
        let mut blocks = Vec::new();
        let mut pooled = Vec::new();
        let mut number = 0;

        for segment in raw.split(self.separator) {
            let lines: Vec<Line<'a>> = segment
                .lines()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(|text| {
                    number += 1;
                    Line { number, text }
                })
                .collect();

            match lines.len() {
                0 => {}
                1 => pooled.extend(lines),
                _ => {
                    if !pooled.is_empty() {
                        blocks.push(std::mem::take(&mut pooled));
                    }
                    blocks.push(lines);
                }
            }
        }

        if !pooled.is_empty() {
            blocks.push(pooled);
        }
        blocks
    }

    fn parse_group<'a>(
        &self,
        group: usize,
        lines: &[Line<'a>],
    ) -> Result<WorkoutEntry, ParseError> {
        let fail = |line: &Line<'a>, kind: ParseErrorKind| ParseError {
            group,
            line: line.number,
            kind,
        };

        let header = &lines[0];
        let category = self.strip_marker(header).map_err(|kind| fail(header, kind))?;

        if lines.len() < GROUP_LINES {
            let last = &lines[lines.len() - 1];
            return Err(fail(
                last,
                ParseErrorKind::IncompleteGroup {
                    found: lines.len() - 1,
                },
            ));
        }
        if category.is_empty() {
            return Err(fail(header, ParseErrorKind::EmptyField(Field::Category)));
        }

        let detail = |line: &Line<'a>| self.strip_marker(line).map_err(|kind| fail(line, kind));

        let name = detail(&lines[1])?;
        if name.is_empty() {
            return Err(fail(&lines[1], ParseErrorKind::EmptyField(Field::Name)));
        }

        let (sets, reps) =
            parse_sets_reps(detail(&lines[2])?).map_err(|kind| fail(&lines[2], kind))?;
        let weight_kg = parse_quantity(detail(&lines[3])?, "kg", Field::Weight)
            .map_err(|kind| fail(&lines[3], kind))?;
        let duration_min = parse_quantity(detail(&lines[4])?, "min", Field::Duration)
            .map_err(|kind| fail(&lines[4], kind))?;

        Ok(WorkoutEntry {
            category: category.to_string(),
            name: name.to_string(),
            sets,
            reps,
            weight_kg,
            duration_min,
            calories_burned: 0.0,
        })
    }

    fn strip_marker<'a>(&self, line: &Line<'a>) -> Result<&'a str, ParseErrorKind> {
        line.text
            .strip_prefix(self.marker)
            .map(str::trim)
            .ok_or_else(|| ParseErrorKind::MissingMarker {
                marker: self.marker,
                found: line.text.to_string(),
            })
    }
}

/// Parse a workout log with the default `#` marker and `;` separator
pub fn parse(raw: &str) -> Result<Vec<WorkoutEntry>, ParseError> {
    LogParser::default().parse(raw)
}

/// `<N> sets <M> reps`, keywords matched case-insensitively
fn parse_sets_reps(text: &str) -> Result<(u32, u32), ParseErrorKind> {
    let lower = text.to_ascii_lowercase();
    let (sets, rest) = lower
        .split_once("sets")
        .ok_or_else(|| ParseErrorKind::InvalidSetsReps(text.to_string()))?;
    let reps = rest
        .trim()
        .strip_suffix("reps")
        .ok_or_else(|| ParseErrorKind::InvalidSetsReps(text.to_string()))?;

    Ok((parse_count(sets, Field::Sets)?, parse_count(reps, Field::Reps)?))
}

fn parse_count(text: &str, field: Field) -> Result<u32, ParseErrorKind> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseErrorKind::EmptyField(field));
    }
    let invalid = || ParseErrorKind::InvalidNumber {
        field,
        value: text.to_string(),
    };

    let value: i64 = text.parse().map_err(|_| invalid())?;
    if value < 0 {
        return Err(ParseErrorKind::Negative {
            field,
            value: value as f64,
        });
    }
    u32::try_from(value).map_err(|_| invalid())
}

/// A non-negative decimal with an optional unit suffix, e.g. `80kg` or `30`
fn parse_quantity(text: &str, unit: &str, field: Field) -> Result<f64, ParseErrorKind> {
    let lower = text.to_ascii_lowercase();
    let number = lower.strip_suffix(unit).unwrap_or(&lower).trim();
    if number.is_empty() {
        return Err(ParseErrorKind::EmptyField(field));
    }

    let value: f64 = number
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| ParseErrorKind::InvalidNumber {
            field,
            value: text.to_string(),
        })?;
    if value < 0.0 {
        return Err(ParseErrorKind::Negative { field, value });
    }
    Ok(value)
}
