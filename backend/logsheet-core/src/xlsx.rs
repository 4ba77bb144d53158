// src/xlsx.rs
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;
use tracing::{debug, info};

use crate::timesheet::{ExportError, RenderedSheet, SheetOptions, SheetRow, COLUMN_HEADERS};

pub const SHEET_NAME: &str = "Sheet1";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// Sheet-wide default font reaches A..Z, like the original template.
const DEFAULT_FONT_LAST_COLUMN: u16 = 25;

const DATE_COL: u16 = 0;
const DURATION_COL: u16 = 1;
const DETAIL_COL: u16 = 2;

struct SheetFormats {
    default: Format,
    month_label: Format,
    header: Format,
    duration: Format,
}

impl SheetFormats {
    fn new(options: &SheetOptions) -> Self {
        let default = Format::new()
            .set_font_name(options.font_name.as_str())
            .set_font_size(options.font_size);

        let month_label = default.clone().set_bold();

        let header = default
            .clone()
            .set_bold()
            .set_border(FormatBorder::Thin)
            .set_border_color(Color::Black)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        let duration = default
            .clone()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        Self {
            default,
            month_label,
            header,
            duration,
        }
    }
}

/// Serializes a rendered sheet into an in-memory `.xlsx` workbook.
pub fn write_xlsx(sheet: &RenderedSheet, options: &SheetOptions) -> Result<Vec<u8>, ExportError> {
    let mut workbook = build_workbook(sheet, options)?;
    let buffer = workbook.save_to_buffer()?;
    debug!("Serialized workbook: {} bytes", buffer.len());
    Ok(buffer)
}

pub fn save_xlsx(
    sheet: &RenderedSheet,
    options: &SheetOptions,
    path: &Path,
) -> Result<(), ExportError> {
    let mut workbook = build_workbook(sheet, options)?;
    workbook.save(path)?;
    info!("Excel file created: {}", path.display());
    Ok(())
}

fn build_workbook(sheet: &RenderedSheet, options: &SheetOptions) -> Result<Workbook, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    if options.styled {
        write_styled(worksheet, sheet, &SheetFormats::new(options), options)?;
    } else {
        write_plain(worksheet, sheet)?;
    }
    Ok(workbook)
}

fn write_plain(worksheet: &mut Worksheet, sheet: &RenderedSheet) -> Result<(), ExportError> {
    for (number, row) in sheet.numbered_rows() {
        let r = number - 1;
        match row {
            SheetRow::Blank => {}
            SheetRow::MonthLabel(label) => {
                worksheet.write_string(r, DATE_COL, label)?;
            }
            SheetRow::ColumnHeader => {
                for (col, header) in (0u16..).zip(COLUMN_HEADERS) {
                    worksheet.write_string(r, col, header)?;
                }
            }
            SheetRow::Data {
                date,
                duration,
                detail,
            } => {
                worksheet.write_string(r, DATE_COL, date)?;
                worksheet.write_number(r, DURATION_COL, f64::from(*duration))?;
                worksheet.write_string(r, DETAIL_COL, detail)?;
            }
        }
    }
    Ok(())
}

fn write_styled(
    worksheet: &mut Worksheet,
    sheet: &RenderedSheet,
    formats: &SheetFormats,
    options: &SheetOptions,
) -> Result<(), ExportError> {
    for col in 0..=DEFAULT_FONT_LAST_COLUMN {
        worksheet.set_column_format(col, &formats.default)?;
    }
    for col in [DATE_COL, DURATION_COL, DETAIL_COL] {
        worksheet.set_column_width(col, options.column_width)?;
    }

    for (number, row) in sheet.numbered_rows() {
        let r = number - 1;
        match row {
            SheetRow::Blank => {}
            SheetRow::MonthLabel(label) => {
                worksheet.write_string_with_format(r, DATE_COL, label, &formats.month_label)?;
            }
            SheetRow::ColumnHeader => {
                for (col, header) in (0u16..).zip(COLUMN_HEADERS) {
                    worksheet.write_string_with_format(r, col, header, &formats.header)?;
                }
            }
            SheetRow::Data {
                date,
                duration,
                detail,
            } => {
                worksheet.write_string_with_format(r, DATE_COL, date, &formats.default)?;
                worksheet.write_number_with_format(
                    r,
                    DURATION_COL,
                    f64::from(*duration),
                    &formats.duration,
                )?;
                worksheet.write_string_with_format(r, DETAIL_COL, detail, &formats.default)?;
            }
        }
    }
    Ok(())
}
