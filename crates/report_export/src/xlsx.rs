//! Spreadsheet export
//!
//! One worksheet: title, period subheader, localized header row, one row per
//! account and a bold totals row. Arabic workbooks are laid out right to
//! left.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet};

use crate::error::ExportError;
use crate::labels::Labels;
use crate::ReportDocument;

const AMOUNT_FORMAT: &str = "#,##0.00";
const HEADER_ROW: u32 = 3;

/// Renders the report as an `.xlsx` workbook
///
/// # Errors
///
/// Returns `ExportError::Xlsx` if the workbook cannot be assembled
pub fn render(document: &ReportDocument<'_>, labels: &Labels) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(&labels.sheet_name)?;
    if labels.language.is_rtl() {
        sheet.set_right_to_left(true);
    }

    let title = Format::new().set_bold().set_font_size(14);
    let header = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_background_color(Color::RGB(0xD9E1F2));
    let text = Format::new().set_border(FormatBorder::Thin);
    let amount = Format::new().set_border(FormatBorder::Thin).set_num_format(AMOUNT_FORMAT);
    let total_text = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_background_color(Color::RGB(0xF2F2F2));
    let total_amount = total_text.clone().set_num_format(AMOUNT_FORMAT);

    sheet.write_string_with_format(0, 0, &labels.title, &title)?;
    sheet.write_string(1, 0, &labels.period)?;

    for (col, label) in labels.columns.iter().enumerate() {
        sheet.write_string_with_format(HEADER_ROW, col as u16, label, &header)?;
    }

    let mut row = HEADER_ROW + 1;
    for line in document.rows {
        sheet.write_string_with_format(row, 0, &line.account_code, &text)?;
        sheet.write_string_with_format(row, 1, line.display_name(labels.language.is_rtl()), &text)?;
        sheet.write_string_with_format(row, 2, labels.account_type(line.account_type), &text)?;
        write_amounts(
            sheet,
            row,
            [
                line.opening_debit,
                line.opening_credit,
                line.period_debit,
                line.period_credit,
                line.closing_debit,
                line.closing_credit,
            ],
            &amount,
        )?;
        row += 1;
    }

    let totals = &document.totals;
    sheet.write_string_with_format(row, 0, "", &total_text)?;
    sheet.write_string_with_format(row, 1, &labels.totals, &total_text)?;
    sheet.write_string_with_format(row, 2, "", &total_text)?;
    write_amounts(
        sheet,
        row,
        [
            totals.opening_debit,
            totals.opening_credit,
            totals.period_debit,
            totals.period_credit,
            totals.closing_debit,
            totals.closing_credit,
        ],
        &total_amount,
    )?;

    sheet.set_column_width(0, 14)?;
    sheet.set_column_width(1, 40)?;
    sheet.set_column_width(2, 14)?;
    for col in 3..9u16 {
        sheet.set_column_width(col, 16)?;
    }
    sheet.set_freeze_panes(HEADER_ROW + 1, 0)?;

    Ok(workbook.save_to_buffer()?)
}

fn write_amounts(
    sheet: &mut Worksheet,
    row: u32,
    amounts: [Decimal; 6],
    format: &Format,
) -> Result<(), ExportError> {
    for (offset, value) in amounts.into_iter().enumerate() {
        let number = value.to_f64().unwrap_or_default();
        sheet.write_number_with_format(row, 3 + offset as u16, number, format)?;
    }
    Ok(())
}
