//! Parser for the cabled drivers table.
//!
//! The table is plain text laid out in fixed-width columns. Header names may
//! contain single spaces, so only runs of two or more spaces separate them,
//! and each header name's offset marks where its column starts. Data rows are
//! cut at those offsets, which keeps blank cells in place. A row with a blank
//! designator cell continues the previous designator with one more reader type.

use gapfill_model::InstrumentRef;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::error::CatalogError;

pub const REFDES_COLUMN: &str = "Reference Designator";
pub const TYPE_COLUMN: &str = "Type";
pub const DRIVER_COLUMN: &str = "Driver";

/// Placeholder meaning "the designator is its own reader type".
const SELF_TYPE_SENTINEL: &str = "None";
/// Placeholder meaning "no reader type".
const NO_TYPE_SENTINEL: &str = "nan";

static COLUMN_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s{2,}").expect("column separator regex should compile")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct CatalogRow {
    pub instrument: InstrumentRef,
    pub driver: String,
    pub reader_type: Option<String>,
}

/// Column layout taken from the header line.
#[derive(Debug, Clone)]
struct Columns {
    /// Byte offset of every header field, ascending.
    starts: Vec<usize>,
    refdes: usize,
    reader: usize,
    driver: usize,
}

impl Columns {
    fn from_header(line: &str) -> Result<Self, CatalogError> {
        let fields = header_fields(line);
        let find = |name: &'static str| {
            fields
                .iter()
                .position(|(_, candidate)| *candidate == name)
                .ok_or(CatalogError::MissingColumn(name))
        };
        Ok(Self {
            refdes: find(REFDES_COLUMN)?,
            reader: find(TYPE_COLUMN)?,
            driver: find(DRIVER_COLUMN)?,
            starts: fields.iter().map(|(start, _)| *start).collect(),
        })
    }

    /// Trimmed text of `column` in `line`; empty when the row is too short.
    fn cell<'l>(&self, line: &'l str, column: usize) -> &'l str {
        let start = snap(line, self.starts[column]);
        let end = self
            .starts
            .get(column + 1)
            .map_or(line.len(), |&next| snap(line, next));
        line.get(start..end.max(start)).unwrap_or_default().trim()
    }
}

/// Header names with their byte offsets.
fn header_fields(line: &str) -> Vec<(usize, &str)> {
    let body_start = line.len() - line.trim_start().len();
    let body_end = line.trim_end().len();
    let mut fields = Vec::new();
    let mut start = body_start;
    for sep in COLUMN_SEPARATOR.find_iter(&line[body_start..body_end]) {
        let sep_start = body_start + sep.start();
        fields.push((start, &line[start..sep_start]));
        start = body_start + sep.end();
    }
    if start < body_end {
        fields.push((start, &line[start..body_end]));
    }
    fields
}

/// Column boundary at `offset`, clamped to the line. A value wider than its
/// column moves the boundary to the end of that value.
fn snap(line: &str, offset: usize) -> usize {
    let mut pos = offset.min(line.len());
    while !line.is_char_boundary(pos) {
        pos += 1;
    }
    let inside_value = line[..pos].ends_with(|c: char| !c.is_whitespace())
        && line[pos..].starts_with(|c: char| !c.is_whitespace());
    if inside_value {
        pos += line[pos..].find(char::is_whitespace).unwrap_or(line.len() - pos);
    }
    pos
}

fn reader_for(raw: &str, instrument: &InstrumentRef) -> Option<String> {
    match raw.trim() {
        "" | SELF_TYPE_SENTINEL => Some(instrument.as_str().to_string()),
        NO_TYPE_SENTINEL => None,
        other => Some(other.to_string()),
    }
}

pub(super) fn parse(text: &str) -> Result<Vec<CatalogRow>, CatalogError> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let header = lines
        .next()
        .ok_or(CatalogError::MissingColumn(REFDES_COLUMN))?;
    let columns = Columns::from_header(header)?;

    let mut rows: Vec<CatalogRow> = Vec::new();
    for (line_no, line) in lines.enumerate() {
        let refdes = columns.cell(line, columns.refdes);
        let reader = columns.cell(line, columns.reader);
        let driver = columns.cell(line, columns.driver);

        if refdes.is_empty() {
            let Some(previous) = rows.last() else {
                warn!(line = line_no + 2, "continuation row without a designator");
                continue;
            };
            let instrument = previous.instrument.clone();
            let driver = if driver.is_empty() {
                previous.driver.clone()
            } else {
                driver.to_string()
            };
            rows.push(CatalogRow {
                reader_type: reader_for(reader, &instrument),
                instrument,
                driver,
            });
            continue;
        }

        let instrument = match InstrumentRef::parse(refdes) {
            Ok(instrument) => instrument,
            Err(err) => {
                warn!(line = line_no + 2, error = %err, "skipping catalog row");
                continue;
            }
        };
        rows.push(CatalogRow {
            reader_type: reader_for(reader, &instrument),
            driver: driver.to_string(),
            instrument,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_located_by_name() {
        let text = "\
Driver                        Reference Designator          Type
mi.instrument.a.driver        RS01SLBS-LJ01A-05-HYDLFA101   hydlf_raw
";
        let rows = parse(text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].instrument.as_str(), "RS01SLBS-LJ01A-05-HYDLFA101");
        assert_eq!(rows[0].driver, "mi.instrument.a.driver");
        assert_eq!(rows[0].reader_type.as_deref(), Some("hydlf_raw"));
    }

    #[test]
    fn missing_trailing_type_uses_designator() {
        let text = "\
Reference Designator          Driver                   Type
RS01SLBS-LJ01A-05-HYDLFA101   mi.instrument.a.driver
";
        let rows = parse(text).unwrap();
        assert_eq!(
            rows[0].reader_type.as_deref(),
            Some("RS01SLBS-LJ01A-05-HYDLFA101")
        );
    }

    #[test]
    fn blank_type_cell_between_columns_stays_in_place() {
        let text = "\
Reference Designator          Type                  Driver
RS01SLBS-LJ01A-05-HYDLFA101                         mi.instrument.hydrophone.driver
";
        let rows = parse(text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].reader_type.as_deref(),
            Some("RS01SLBS-LJ01A-05-HYDLFA101")
        );
        assert_eq!(rows[0].driver, "mi.instrument.hydrophone.driver");
    }

    #[test]
    fn wide_value_overruns_its_column() {
        let text = "\
Reference Designator      Type          Driver
RS01SLBS-LJ01A-05-HYDLFA101 hydlf_raw   mi.instrument.hydrophone.driver
";
        let rows = parse(text).unwrap();
        assert_eq!(rows[0].instrument.as_str(), "RS01SLBS-LJ01A-05-HYDLFA101");
        assert_eq!(rows[0].reader_type.as_deref(), Some("hydlf_raw"));
        assert_eq!(rows[0].driver, "mi.instrument.hydrophone.driver");
    }

    #[test]
    fn continuation_rows_extend_previous_designator() {
        let text = "\
Reference Designator          Driver                   Type
RS01SLBS-LJ01A-05-HYDLFA101   mi.instrument.a.driver   hydlf_raw
                                                       hydlf_status
";
        let rows = parse(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].instrument, rows[0].instrument);
        assert_eq!(rows[1].driver, "mi.instrument.a.driver");
        assert_eq!(rows[1].reader_type.as_deref(), Some("hydlf_status"));
    }

    #[test]
    fn malformed_designators_are_skipped() {
        let text = "\
Reference Designator          Driver                   Type
not-a-ref                     mi.instrument.a.driver   x
RS01SLBS-LJ01A-05-HYDLFA101   mi.instrument.a.driver   hydlf_raw
";
        let rows = parse(text).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = parse("Reference Designator   Driver\n").unwrap_err();
        assert!(matches!(err, CatalogError::MissingColumn(TYPE_COLUMN)));
    }
}
