//! PDF export
//!
//! Landscape A4. Every page repeats the title, the period subheader and the
//! column header row; the highlighted totals row closes the last page.
//!
//! printpdf places glyphs left to right exactly as given, so Arabic text is
//! shaped into presentation forms and reordered into visual order before it
//! reaches a layer. Amounts are never truncated; a figure wider than its
//! column is set in a smaller size instead.

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect, Rgb,
};
use rust_decimal::Decimal;
use unicode_bidi::BidiInfo;

use domain_ledger::{TrialBalanceRow, TrialBalanceTotals};

use crate::error::ExportError;
use crate::labels::Labels;
use crate::ReportDocument;

const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 12.0;
const ROW_HEIGHT: f32 = 6.5;
const CELL_PADDING: f32 = 1.5;
const TABLE_TOP: f32 = PAGE_HEIGHT - MARGIN - 20.0;
const COLUMN_WIDTHS: [f32; 9] = [20.0, 76.0, 27.0, 25.0, 25.0, 25.0, 25.0, 25.0, 25.0];
const TABLE_WIDTH: f32 = 273.0;

const TITLE_SIZE: f32 = 16.0;
const SUBHEADER_SIZE: f32 = 10.0;
const CELL_SIZE: f32 = 8.0;
/// Helvetica digit advance, in ems; used as the width estimate for all text
const GLYPH_EM: f32 = 0.556;
const PT_TO_MM: f32 = 25.4 / 72.0;
/// Columns from here on hold amounts
const FIRST_AMOUNT_COLUMN: usize = 3;

const HEADER_FILL: (f32, f32, f32) = (0.85, 0.88, 0.95);
const TOTALS_FILL: (f32, f32, f32) = (0.9, 0.9, 0.9);

type Cells = [String; 9];

/// A cell's text as it is handed to the layer
#[derive(Debug, Clone, PartialEq)]
struct PlacedText {
    text: String,
    size: f32,
    x: f32,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Renders the report as a paginated PDF table
///
/// Builtin Helvetica is used unless `font` holds a TrueType font, which is
/// then used for every cell.
///
/// # Errors
///
/// Returns `ExportError::Pdf` if a font cannot be embedded or the document
/// cannot be serialized
pub fn render(
    document: &ReportDocument<'_>,
    labels: &Labels,
    font: Option<&[u8]>,
) -> Result<Vec<u8>, ExportError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(labels.title.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Table");

    let fonts = match font {
        Some(bytes) => {
            let external = doc.add_external_font(bytes).map_err(pdf_error)?;
            Fonts {
                regular: external.clone(),
                bold: external,
            }
        }
        None => Fonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?,
        },
    };

    let rtl = labels.language.is_rtl();
    let body: Vec<Cells> = document
        .rows
        .iter()
        .map(|row| row_cells(row, labels, rtl))
        .collect();
    let footer = totals_cells(&document.totals, labels);

    let pages: Vec<&[Cells]> = if body.is_empty() {
        vec![&body[..]]
    } else {
        body.chunks(rows_per_page()).collect()
    };
    let page_count = pages.len();

    for (index, page_rows) in pages.into_iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Table");
            doc.get_page(page).get_layer(layer)
        };

        draw_heading(&layer, labels, &fonts, index + 1, page_count);

        let mut top = TABLE_TOP;
        draw_row(&layer, top, &labels.columns, rtl, &fonts.bold, Some(HEADER_FILL));
        top -= ROW_HEIGHT;

        for cells in page_rows {
            draw_row(&layer, top, cells, rtl, &fonts.regular, None);
            top -= ROW_HEIGHT;
        }

        if index + 1 == page_count {
            draw_row(&layer, top, &footer, rtl, &fonts.bold, Some(TOTALS_FILL));
            top -= ROW_HEIGHT;
        }

        draw_grid(&layer, top);
    }

    doc.save_to_bytes().map_err(pdf_error)
}

/// Body rows that fit under the header, keeping one slot for totals
fn rows_per_page() -> usize {
    let slots = ((TABLE_TOP - MARGIN) / ROW_HEIGHT) as usize;
    slots.saturating_sub(2).max(1)
}

fn row_cells(row: &TrialBalanceRow, labels: &Labels, prefer_arabic: bool) -> Cells {
    [
        row.account_code.clone(),
        row.display_name(prefer_arabic).to_string(),
        labels.account_type(row.account_type).to_string(),
        amount(row.opening_debit),
        amount(row.opening_credit),
        amount(row.period_debit),
        amount(row.period_credit),
        amount(row.closing_debit),
        amount(row.closing_credit),
    ]
}

fn totals_cells(totals: &TrialBalanceTotals, labels: &Labels) -> Cells {
    [
        String::new(),
        labels.totals.clone(),
        String::new(),
        amount(totals.opening_debit),
        amount(totals.opening_credit),
        amount(totals.period_debit),
        amount(totals.period_credit),
        amount(totals.closing_debit),
        amount(totals.closing_credit),
    ]
}

fn amount(value: Decimal) -> String {
    format!("{:.2}", value)
}

/// Estimated rendered width of `text` in millimetres
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * GLYPH_EM * size * PT_TO_MM
}

/// Cuts `text` to what fits in `inner` millimetres at `CELL_SIZE`
fn fit(text: &str, inner: f32) -> String {
    let max_chars = (inner / (GLYPH_EM * CELL_SIZE * PT_TO_MM)) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Shapes Arabic letters and reorders the line for left-to-right placement
fn visual_order(text: &str) -> String {
    let shaped = ar_reshaper::reshape_line(text);
    let bidi = BidiInfo::new(&shaped, None);
    bidi.paragraphs
        .iter()
        .map(|paragraph| bidi.reorder_line(paragraph, paragraph.range.clone()))
        .collect()
}

/// Lays out one cell starting at `left`
///
/// Code, name and type cells are truncated and follow the reading
/// direction. Amount cells are right-aligned and shrink to fit.
fn place_cell(cell: &str, column: usize, left: f32, rtl: bool) -> PlacedText {
    let width = COLUMN_WIDTHS[column];
    let inner = width - 2.0 * CELL_PADDING;
    let right = left + width - CELL_PADDING;

    if column >= FIRST_AMOUNT_COLUMN {
        let text = if rtl { visual_order(cell) } else { cell.to_string() };
        let natural = text_width(&text, CELL_SIZE);
        let size = if natural > inner {
            CELL_SIZE * inner / natural
        } else {
            CELL_SIZE
        };
        let x = right - text_width(&text, size);
        return PlacedText { text, size, x };
    }

    let fitted = fit(cell, inner);
    if rtl {
        let text = visual_order(&fitted);
        let x = (right - text_width(&text, CELL_SIZE)).max(left + CELL_PADDING);
        PlacedText { text, size: CELL_SIZE, x }
    } else {
        PlacedText {
            text: fitted,
            size: CELL_SIZE,
            x: left + CELL_PADDING,
        }
    }
}

fn rgb((r, g, b): (f32, f32, f32)) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn draw_heading(layer: &PdfLayerReference, labels: &Labels, fonts: &Fonts, page: usize, pages: usize) {
    let rtl = labels.language.is_rtl();
    let (title, period) = if rtl {
        (visual_order(&labels.title), visual_order(&labels.period))
    } else {
        (labels.title.clone(), labels.period.clone())
    };
    let counter = format!("{page} / {pages}");

    let start = |text: &str, size: f32| {
        if rtl {
            PAGE_WIDTH - MARGIN - text_width(text, size)
        } else {
            MARGIN
        }
    };
    let counter_x = if rtl {
        MARGIN
    } else {
        PAGE_WIDTH - MARGIN - text_width(&counter, SUBHEADER_SIZE)
    };

    layer.set_fill_color(rgb((0.0, 0.0, 0.0)));
    layer.use_text(
        title.as_str(),
        TITLE_SIZE,
        Mm(start(&title, TITLE_SIZE)),
        Mm(PAGE_HEIGHT - MARGIN - 6.0),
        &fonts.bold,
    );
    layer.use_text(
        period.as_str(),
        SUBHEADER_SIZE,
        Mm(start(&period, SUBHEADER_SIZE)),
        Mm(PAGE_HEIGHT - MARGIN - 14.0),
        &fonts.regular,
    );
    layer.use_text(
        counter,
        SUBHEADER_SIZE,
        Mm(counter_x),
        Mm(PAGE_HEIGHT - MARGIN - 14.0),
        &fonts.regular,
    );
}

fn draw_row(
    layer: &PdfLayerReference,
    top: f32,
    cells: &[String],
    rtl: bool,
    font: &IndirectFontRef,
    fill: Option<(f32, f32, f32)>,
) {
    let bottom = top - ROW_HEIGHT;

    if let Some(fill) = fill {
        layer.set_fill_color(rgb(fill));
        layer.add_rect(
            Rect::new(Mm(MARGIN), Mm(bottom), Mm(MARGIN + TABLE_WIDTH), Mm(top))
                .with_mode(PaintMode::Fill),
        );
    }

    layer.set_fill_color(rgb((0.0, 0.0, 0.0)));
    let mut left = MARGIN;
    for (column, cell) in cells.iter().enumerate() {
        let placed = place_cell(cell, column, left, rtl);
        layer.use_text(placed.text, placed.size, Mm(placed.x), Mm(bottom + 2.0), font);
        left += COLUMN_WIDTHS[column];
    }
}

/// Rules every row boundary from the table top down to `bottom`, and every
/// column boundary
fn draw_grid(layer: &PdfLayerReference, bottom: f32) {
    layer.set_outline_color(rgb((0.4, 0.4, 0.4)));
    layer.set_outline_thickness(0.3);

    let mut y = TABLE_TOP;
    while y >= bottom - 0.01 {
        segment(layer, (MARGIN, y), (MARGIN + TABLE_WIDTH, y));
        y -= ROW_HEIGHT;
    }

    let mut x = MARGIN;
    segment(layer, (x, TABLE_TOP), (x, bottom));
    for width in COLUMN_WIDTHS {
        x += width;
        segment(layer, (x, TABLE_TOP), (x, bottom));
    }
}

fn segment(layer: &PdfLayerReference, from: (f32, f32), to: (f32, f32)) {
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(from.0), Mm(from.1)), false),
            (Point::new(Mm(to.0), Mm(to.1)), false),
        ],
        is_closed: false,
    });
}

fn pdf_error(error: impl std::fmt::Debug) -> ExportError {
    ExportError::pdf(format!("{error:?}"))
}
