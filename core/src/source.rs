//! Record sources: where raw rider rows come from.
//!
//! RULE: the ledger never knows about sheets, rows or columns. A source
//! locates the data region from its `SourceLayout` and hands over
//! already-extracted `RawRow`s.

use crate::{
    config::SourceLayout,
    error::{SettleError, SettleResult},
    raw::RawRow,
};
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::{
    io::{Cursor, Read, Seek},
    path::Path,
};

/// Anything that can produce a batch of raw rider rows.
pub trait RecordSource {
    fn read_rows(&mut self) -> SettleResult<Vec<RawRow>>;
}

/// Rows already in memory, e.g. from a test or another front end.
impl RecordSource for Vec<RawRow> {
    fn read_rows(&mut self) -> SettleResult<Vec<RawRow>> {
        Ok(self.clone())
    }
}

/// Reads one designated sheet of an Excel workbook.
pub struct XlsxSource<RS: Read + Seek> {
    workbook: Sheets<RS>,
    layout:   SourceLayout,
}

impl XlsxSource<std::io::BufReader<std::fs::File>> {
    pub fn open(path: impl AsRef<Path>, layout: SourceLayout) -> SettleResult<Self> {
        let path = path.as_ref();
        log::debug!("source: opening workbook {}", path.display());
        let workbook = open_workbook_auto(path)?;
        Ok(Self { workbook, layout })
    }
}

impl XlsxSource<Cursor<Vec<u8>>> {
    pub fn from_bytes(bytes: Vec<u8>, layout: SourceLayout) -> SettleResult<Self> {
        let workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        Ok(Self { workbook, layout })
    }
}

impl<RS: Read + Seek> XlsxSource<RS> {
    pub fn layout(&self) -> &SourceLayout {
        &self.layout
    }
}

impl<RS: Read + Seek> RecordSource for XlsxSource<RS> {
    fn read_rows(&mut self) -> SettleResult<Vec<RawRow>> {
        let sheet = &self.layout.sheet_name;
        if !self.workbook.sheet_names().iter().any(|s| s == sheet) {
            log::warn!("source: sheet '{sheet}' not found");
            return Err(SettleError::MissingSourceSection { sheet: sheet.clone() });
        }
        let range = self.workbook.worksheet_range(sheet)?;
        let rows = extract_rows(&range, &self.layout)?;
        log::info!("source: read {} rider rows from '{sheet}'", rows.len());
        Ok(rows)
    }
}

/// Resolved 0-based column positions for every mapped field.
#[derive(Debug, Clone, Copy)]
struct ColumnIndexes {
    id:                     u32,
    name:                   u32,
    process_count:          u32,
    delivery_fee:           u32,
    additional_payment:     u32,
    hourly_insurance:       u32,
    employment_insurance:   u32,
    accident_insurance:     u32,
    employment_retroactive: u32,
    accident_retroactive:   u32,
}

impl ColumnIndexes {
    fn resolve(layout: &SourceLayout) -> SettleResult<Self> {
        let c = &layout.columns;
        Ok(Self {
            id:                     column_index(&c.id)?,
            name:                   column_index(&c.name)?,
            process_count:          column_index(&c.process_count)?,
            delivery_fee:           column_index(&c.delivery_fee)?,
            additional_payment:     column_index(&c.additional_payment)?,
            hourly_insurance:       column_index(&c.hourly_insurance)?,
            employment_insurance:   column_index(&c.employment_insurance)?,
            accident_insurance:     column_index(&c.accident_insurance)?,
            employment_retroactive: column_index(&c.employment_retroactive)?,
            accident_retroactive:   column_index(&c.accident_retroactive)?,
        })
    }
}

/// Walk the sheet from the layout's start row until the first row with
/// neither id nor name, or the end of the used range.
pub fn extract_rows(range: &Range<Data>, layout: &SourceLayout) -> SettleResult<Vec<RawRow>> {
    if layout.start_row == 0 {
        return Err(SettleError::InvalidLayout {
            reason: "start_row is 1-based and must be at least 1".into(),
        });
    }
    let cols = ColumnIndexes::resolve(layout)?;
    let last_row = match range.end() {
        Some((row, _)) => row,
        None => return Ok(Vec::new()),
    };

    let mut rows = Vec::new();
    for row in (layout.start_row - 1)..=last_row {
        let text = |col: u32| range.get_value((row, col)).and_then(cell_text);
        let number = |col: u32| range.get_value((row, col)).and_then(cell_number);

        let raw = RawRow {
            id:                     text(cols.id),
            name:                   text(cols.name),
            process_count:          number(cols.process_count),
            delivery_fee:           number(cols.delivery_fee),
            additional_payment:     number(cols.additional_payment),
            hourly_insurance:       number(cols.hourly_insurance),
            employment_insurance:   number(cols.employment_insurance),
            accident_insurance:     number(cols.accident_insurance),
            employment_retroactive: number(cols.employment_retroactive),
            accident_retroactive:   number(cols.accident_retroactive),
        };
        if !raw.has_identity() {
            break;
        }
        rows.push(raw);
    }
    Ok(rows)
}

/// "A" -> 0, "B" -> 1, "Z" -> 25, "AA" -> 26.
pub fn column_index(letters: &str) -> SettleResult<u32> {
    let letters = letters.trim();
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(SettleError::InvalidLayout {
            reason: format!("'{letters}' is not a column letter"),
        });
    }
    let mut index: u32 = 0;
    for c in letters.chars() {
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        index = index
            .checked_mul(26)
            .and_then(|i| i.checked_add(digit))
            .ok_or_else(|| SettleError::InvalidLayout {
                reason: format!("column '{letters}' is out of range"),
            })?;
    }
    Ok(index - 1)
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::String(v) => v.trim().to_string(),
        Data::Float(v) if v.fract() == 0.0 && v.is_finite() => format!("{}", *v as i64),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(v) => Some(*v),
        Data::Int(v) => Some(*v as f64),
        Data::String(v) => {
            let cleaned: String = v.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    }
}
