//! Override spreadsheet codec
//!
//! The sheet is exchanged as an .xlsx workbook with a fixed column contract.
//! Export paints each header with its column group's colour and writes
//! identifiers as text so leading zeros survive a round trip through Excel.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use rust_xlsxwriter::{Color, Format, Workbook, XlsxError};
use serde::Serialize;
use shared::models::{OverrideRow, PhysicalInventoryBaseRow};
use shared::validation::{join_serial_cell, parse_flag, parse_identifier, parse_quantity, split_serial_cell};
use shared::workflow::{RowError, RowErrorKind};

use crate::error::{ClientError, ClientResult};

/// How a column is presented and whether operators edit it
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ColumnGroup {
    /// System-generated identifiers; must not be edited
    System,
    /// Names shown for orientation
    Reference,
    Quantity,
    Serial,
}

impl ColumnGroup {
    /// Header fill colour (0xRRGGBB)
    pub fn header_color(&self) -> u32 {
        match self {
            ColumnGroup::System => 0xD9D9D9,
            ColumnGroup::Reference => 0xDDEBF7,
            ColumnGroup::Quantity => 0xE2EFDA,
            ColumnGroup::Serial => 0xFFF2CC,
        }
    }

    fn header_format(&self) -> Format {
        Format::new()
            .set_bold()
            .set_background_color(Color::RGB(self.header_color()))
    }

    pub fn editable(&self) -> bool {
        matches!(self, ColumnGroup::Quantity | ColumnGroup::Serial)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub group: ColumnGroup,
}

const fn column(name: &'static str, group: ColumnGroup) -> Column {
    Column { name, group }
}

pub const PRODUCT_ID: &str = "productId";
pub const LOCATION_ID: &str = "locationId";
pub const PRODUCT_NAME: &str = "productName";
pub const LOCATION_NAME: &str = "locationName";
pub const HAS_SERIAL: &str = "hasSerial";
pub const GOOD_QUANTITY: &str = "goodQuantity";
pub const SOLD_QUANTITY: &str = "soldQuantity";
pub const BAD_QUANTITY: &str = "badQuantity";
pub const GOOD_SERIALS: &str = "goodSerials";
pub const SOLD_SERIALS: &str = "soldSerials";
pub const BAD_SERIALS: &str = "badSerials";

/// The column contract, in order
pub const COLUMNS: [Column; 11] = [
    column(PRODUCT_ID, ColumnGroup::System),
    column(LOCATION_ID, ColumnGroup::System),
    column(PRODUCT_NAME, ColumnGroup::Reference),
    column(LOCATION_NAME, ColumnGroup::Reference),
    column(HAS_SERIAL, ColumnGroup::Reference),
    column(GOOD_QUANTITY, ColumnGroup::Quantity),
    column(SOLD_QUANTITY, ColumnGroup::Quantity),
    column(BAD_QUANTITY, ColumnGroup::Quantity),
    column(GOOD_SERIALS, ColumnGroup::Serial),
    column(SOLD_SERIALS, ColumnGroup::Serial),
    column(BAD_SERIALS, ColumnGroup::Serial),
];

/// Worksheet name used on export; import reads the first sheet whatever its name
pub const SHEET_NAME: &str = "Physical Inventory";

/// Columns an upload cannot do without
const REQUIRED: [&str; 6] = [
    PRODUCT_ID,
    LOCATION_ID,
    HAS_SERIAL,
    GOOD_QUANTITY,
    SOLD_QUANTITY,
    BAD_QUANTITY,
];

fn write_error(err: XlsxError) -> ClientError {
    ClientError::Validation(format!("Could not write the sheet: {}", err))
}

fn read_error(err: impl std::fmt::Display) -> ClientError {
    ClientError::Validation(format!("Could not read the sheet: {}", err))
}

/// Write the current base in the column contract
pub fn export_sheet(rows: &[PhysicalInventoryBaseRow]) -> ClientResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(write_error)?;

    for (col, column) in COLUMNS.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, column.name, &column.group.header_format())
            .map_err(write_error)?;
    }
    sheet.set_freeze_panes(1, 0).map_err(write_error)?;

    let text = Format::new().set_num_format("@");
    for (index, row) in rows.iter().enumerate() {
        let r = index as u32 + 1;
        sheet
            .write_string_with_format(r, 0, row.product_id.to_string().as_str(), &text)
            .map_err(write_error)?;
        sheet
            .write_string_with_format(r, 1, row.location_id.to_string().as_str(), &text)
            .map_err(write_error)?;
        sheet
            .write_string(r, 2, row.product_name.as_str())
            .map_err(write_error)?;
        sheet
            .write_string(r, 3, row.location_name.as_str())
            .map_err(write_error)?;
        sheet.write_boolean(r, 4, row.has_serial).map_err(write_error)?;
        sheet
            .write_number(r, 5, row.good_quantity as f64)
            .map_err(write_error)?;
        sheet
            .write_number(r, 6, row.sold_quantity as f64)
            .map_err(write_error)?;
        sheet
            .write_number(r, 7, row.bad_quantity as f64)
            .map_err(write_error)?;

        for (col, serials) in [(8u16, &row.good_serials), (9, &row.sold_serials), (10, &row.bad_serials)] {
            if !serials.is_empty() {
                sheet
                    .write_string(r, col, join_serial_cell(serials).as_str())
                    .map_err(write_error)?;
            }
        }
    }

    workbook.save_to_buffer().map_err(write_error)
}

/// Rows read from an upload plus the cells that could not be read
#[derive(Debug, Clone, Default)]
pub struct ParsedSheet {
    pub rows: Vec<OverrideRow>,
    pub errors: Vec<RowError>,
}

/// Cell text as an operator would read it; whole numbers lose their ".0"
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.trim().to_string(),
        Data::Float(value) if value.fract() == 0.0 => format!("{}", *value as i64),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        other => other.to_string().trim().to_string(),
    }
}

struct RowReader<'a> {
    cells: Vec<String>,
    positions: &'a HashMap<String, usize>,
    row_number: usize,
    errors: Vec<RowError>,
}

impl RowReader<'_> {
    fn cell(&self, name: &str) -> &str {
        self.positions
            .get(&name.to_lowercase())
            .and_then(|i| self.cells.get(*i))
            .map(String::as_str)
            .unwrap_or("")
    }

    fn fail(&mut self, name: &str, message: &str) {
        self.errors.push(RowError {
            row_number: self.row_number,
            product_id: None,
            location_id: None,
            kind: RowErrorKind::Parse {
                column: name.to_string(),
                message: message.to_string(),
            },
        });
    }

    fn identifier(&mut self, name: &str) -> Option<i64> {
        match parse_identifier(self.cell(name)) {
            Ok(value) => Some(value),
            Err(message) => {
                self.fail(name, message);
                None
            }
        }
    }

    fn quantity(&mut self, name: &str) -> i64 {
        match parse_quantity(self.cell(name)) {
            Ok(value) => value,
            Err(message) => {
                self.fail(name, message);
                0
            }
        }
    }

    fn flag(&mut self, name: &str) -> bool {
        match parse_flag(self.cell(name)) {
            Ok(value) => value,
            Err(message) => {
                self.fail(name, message);
                false
            }
        }
    }
}

/// Read an uploaded workbook's first sheet.
///
/// A file that is not a workbook, or a missing required column, fails the
/// whole upload; bad cells become row errors.
pub fn import_sheet(data: &[u8]) -> ClientResult<ParsedSheet> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(data)).map_err(read_error)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ClientError::Validation("The workbook has no sheets".to_string()))?
        .map_err(read_error)?;

    let mut lines = range.rows();
    let header = lines
        .next()
        .ok_or_else(|| ClientError::Validation("The sheet is empty".to_string()))?;
    let positions: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| (cell_text(cell).to_lowercase(), i))
        .collect();

    let missing: Vec<&str> = REQUIRED
        .iter()
        .copied()
        .filter(|name| !positions.contains_key(&name.to_lowercase()))
        .collect();
    if !missing.is_empty() {
        return Err(ClientError::Validation(format!(
            "The sheet is missing column(s): {}",
            missing.join(", ")
        )));
    }

    // 1-based sheet row of the header
    let header_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

    let mut sheet = ParsedSheet::default();
    for (offset, line) in lines.enumerate() {
        let cells: Vec<String> = line.iter().map(cell_text).collect();
        if cells.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let row_number = header_row + offset + 1;
        let mut cells = RowReader {
            cells,
            positions: &positions,
            row_number,
            errors: Vec::new(),
        };

        let product_id = cells.identifier(PRODUCT_ID);
        let location_id = cells.identifier(LOCATION_ID);
        let has_serial = cells.flag(HAS_SERIAL);
        let good_quantity = cells.quantity(GOOD_QUANTITY);
        let sold_quantity = cells.quantity(SOLD_QUANTITY);
        let bad_quantity = cells.quantity(BAD_QUANTITY);

        let row = match (product_id, location_id) {
            (Some(product_id), Some(location_id)) if cells.errors.is_empty() => OverrideRow {
                row_number,
                product_id,
                location_id,
                product_name: cells.cell(PRODUCT_NAME).to_string(),
                location_name: cells.cell(LOCATION_NAME).to_string(),
                has_serial,
                good_quantity,
                sold_quantity,
                bad_quantity,
                good_serials: split_serial_cell(cells.cell(GOOD_SERIALS)),
                sold_serials: split_serial_cell(cells.cell(SOLD_SERIALS)),
                bad_serials: split_serial_cell(cells.cell(BAD_SERIALS)),
            },
            _ => {
                let mut errors = cells.errors;
                for error in &mut errors {
                    error.product_id = product_id;
                    error.location_id = location_id;
                }
                sheet.errors.extend(errors);
                continue;
            }
        };
        sheet.rows.push(row);
    }

    tracing::debug!(
        rows = sheet.rows.len(),
        errors = sheet.errors.len(),
        "Override sheet parsed"
    );
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Workbook whose cells are all text; empty cells are left unwritten
    fn workbook(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, cells) in rows.iter().enumerate() {
            for (c, cell) in cells.iter().enumerate() {
                if !cell.is_empty() {
                    sheet.write_string(r as u32, c as u16, *cell).unwrap();
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    const SHORT_HEADER: &[&str] = &[
        "productId", "locationId", "hasSerial", "goodQuantity", "soldQuantity", "badQuantity",
    ];

    fn base_row() -> PhysicalInventoryBaseRow {
        PhysicalInventoryBaseRow {
            product_id: 20,
            product_name: "Handheld Scanner".to_string(),
            location_id: 1,
            location_name: "Main Warehouse".to_string(),
            has_serial: true,
            good_quantity: 2,
            sold_quantity: 0,
            bad_quantity: 1,
            good_serials: vec!["SC-1".to_string(), "LOT-7;A".to_string()],
            sold_serials: vec![],
            bad_serials: vec!["SC-3".to_string()],
        }
    }

    #[test]
    fn test_column_groups() {
        let editable: Vec<&str> = COLUMNS
            .iter()
            .filter(|c| c.group.editable())
            .map(|c| c.name)
            .collect();
        assert_eq!(
            editable,
            vec![GOOD_QUANTITY, SOLD_QUANTITY, BAD_QUANTITY, GOOD_SERIALS, SOLD_SERIALS, BAD_SERIALS]
        );
        assert_eq!(COLUMNS[0].group.header_color(), 0xD9D9D9);
    }

    #[test]
    fn test_export_is_a_workbook_that_reads_back() {
        let bytes = export_sheet(&[base_row()]).unwrap();
        assert_eq!(&bytes[..2], b"PK");

        let sheet = import_sheet(&bytes).unwrap();
        assert!(sheet.errors.is_empty());
        let row = &sheet.rows[0];
        assert_eq!((row.product_id, row.location_id, row.row_number), (20, 1, 2));
        assert!(row.has_serial);
        assert_eq!((row.good_quantity, row.bad_quantity), (2, 1));
        assert_eq!(row.good_serials, vec!["SC-1", "LOT-7;A"]);
        assert!(row.sold_serials.is_empty());
    }

    #[test]
    fn test_import_accepts_padded_identifiers_and_mixed_separators() {
        let data = workbook(&[
            &[
                "productId", "locationId", "productName", "locationName", "hasSerial",
                "goodQuantity", "soldQuantity", "badQuantity", "goodSerials", "soldSerials",
                "badSerials",
            ],
            &["'0020", "001", "Scanner", "Main", "TRUE", "2", "0", "1", "SC-1; SC-2", "", "SC-3"],
        ]);
        let sheet = import_sheet(&data).unwrap();
        assert!(sheet.errors.is_empty());
        let row = &sheet.rows[0];
        assert_eq!((row.product_id, row.location_id), (20, 1));
        assert_eq!(row.row_number, 2);
        assert_eq!(row.good_serials, vec!["SC-1", "SC-2"]);
        assert_eq!(row.bad_serials, vec!["SC-3"]);
    }

    #[test]
    fn test_bad_cells_become_row_errors() {
        let data = workbook(&[
            SHORT_HEADER,
            &["10", "1", "no", "-3", "0", "0"],
            &["x", "1", "no", "1", "0", "0"],
        ]);
        let sheet = import_sheet(&data).unwrap();
        assert!(sheet.rows.is_empty());
        assert_eq!(sheet.errors.len(), 2);
        assert_eq!(sheet.errors[0].row_number, 2);
        assert_eq!(sheet.errors[0].product_id, Some(10));
        assert_eq!(sheet.errors[1].row_number, 3);
        assert_eq!(sheet.errors[1].product_id, None);
    }

    #[test]
    fn test_missing_required_column_fails_file() {
        let data = workbook(&[&["productId", "goodQuantity"], &["1", "2"]]);
        let err = import_sheet(&data).unwrap_err();
        assert!(err.user_message().contains("locationId"));
    }

    #[test]
    fn test_non_workbook_upload_is_rejected() {
        let err = import_sheet(b"productId,locationId\n1,1\n").unwrap_err();
        assert!(err.is_client_side());
        assert!(err.user_message().starts_with("Could not read the sheet"));
    }

    #[test]
    fn test_blank_rows_are_skipped_and_numbering_follows_the_sheet() {
        let data = workbook(&[
            SHORT_HEADER,
            &[],
            &["10", "1", "FALSE", "4", "", ""],
        ]);
        let sheet = import_sheet(&data).unwrap();
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].row_number, 3);
        assert_eq!(sheet.rows[0].sold_quantity, 0);
    }
}
