// src/export/pdf.rs

use super::{ExportMeta, format_date, format_money};
use crate::error::{QuoteError, Result};
use crate::quote::{OrderLine, QuoteSession};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::fs;
use std::path::Path;
use tracing::info;

// A4 landscape, in points.
const PAGE_W: f64 = 842.0;
const PAGE_H: f64 = 595.0;
const MARGIN: f64 = 28.0;

const TITLE_H: f64 = 28.0;
/// Gap under the title, leaves room for the letterhead.
const TITLE_GAP: f64 = 57.0;
const INFO_H: f64 = 23.0;
const INFO_GAP: f64 = 14.0;
const HEADER_H: f64 = 28.0;
const ROW_H: f64 = 23.0;
const TOTAL_H: f64 = 28.0;
/// Rows never go below this line; the footer lives underneath.
const BODY_BOTTOM: f64 = 85.0;

const CELL_PAD: f64 = 2.8;
const MAX_DESCRIPTION: usize = 90;

const COLUMNS: [(&str, f64); 5] = [
    ("Codigo", 85.0),
    ("Descripcion", 439.0),
    ("Cantidad", 57.0),
    ("Precio Unitario", 85.0),
    ("Importe", 85.0),
];

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
    Italic,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Italic => "F3",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Right,
}

/// Content operations for one page, with a top-down cursor.
struct PageWriter {
    ops: Vec<Operation>,
    cursor: f64,
}

impl PageWriter {
    fn new() -> Self {
        PageWriter {
            ops: Vec::new(),
            cursor: PAGE_H - MARGIN,
        }
    }

    fn fits(&self, height: f64) -> bool {
        self.cursor - height >= BODY_BOTTOM
    }

    fn text(&mut self, font: Font, size: f64, x: f64, baseline: f64, text: &str) {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tf",
            vec![font.resource().into(), pt(size)],
        ));
        self.ops.push(Operation::new("Td", vec![pt(x), pt(baseline)]));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(win_ansi(text))],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    /// A bordered (optionally shaded) box with one line of text, its top
    /// edge at `top`.
    #[allow(clippy::too_many_arguments)]
    fn cell(
        &mut self,
        x: f64,
        top: f64,
        w: f64,
        h: f64,
        text: &str,
        font: Font,
        size: f64,
        align: Align,
        shaded: bool,
    ) {
        let y = top - h;
        if shaded {
            self.ops.push(Operation::new("q", vec![]));
            self.ops.push(Operation::new("g", vec![Object::Real(0.9)]));
            self.ops
                .push(Operation::new("re", vec![pt(x), pt(y), pt(w), pt(h)]));
            self.ops.push(Operation::new("f", vec![]));
            self.ops.push(Operation::new("Q", vec![]));
        }
        self.ops
            .push(Operation::new("re", vec![pt(x), pt(y), pt(w), pt(h)]));
        self.ops.push(Operation::new("S", vec![]));

        let width = text_width(text, size);
        let tx = match align {
            Align::Left => x + CELL_PAD,
            Align::Center => x + (w - width) / 2.0,
            Align::Right => x + w - CELL_PAD - width,
        };
        let baseline = top - h / 2.0 - 0.3 * size;
        self.text(font, size, tx, baseline, text);
    }

    fn title(&mut self, title: &str) {
        let size = 15.0;
        let x = (PAGE_W - text_width(title, size)) / 2.0;
        let baseline = self.cursor - TITLE_H / 2.0 - 0.3 * size;
        self.text(Font::Bold, size, x, baseline, title);
        self.cursor -= TITLE_H + TITLE_GAP;
    }

    fn info_line(&mut self, text: &str) {
        let size = 12.0;
        let baseline = self.cursor - INFO_H / 2.0 - 0.3 * size;
        self.text(Font::Bold, size, MARGIN, baseline, text);
        self.cursor -= INFO_H;
    }

    fn table_header(&mut self) {
        let mut x = MARGIN;
        for (name, w) in COLUMNS {
            self.cell(x, self.cursor, w, HEADER_H, name, Font::Bold, 10.0, Align::Center, true);
            x += w;
        }
        self.cursor -= HEADER_H;
    }

    fn row(&mut self, line: &OrderLine) {
        let description = truncate_description(&line.description);
        let quantity = line.quantity.to_string();
        let unit_price = format_money(line.unit_price);
        let amount = format_money(line.amount());
        let values: [(&str, Align); 5] = [
            (line.code.as_str(), Align::Center),
            (description.as_str(), Align::Left),
            (quantity.as_str(), Align::Center),
            (unit_price.as_str(), Align::Right),
            (amount.as_str(), Align::Right),
        ];

        let mut x = MARGIN;
        for ((text, align), (_, w)) in values.into_iter().zip(COLUMNS) {
            self.cell(x, self.cursor, w, ROW_H, text, Font::Regular, 9.0, align, false);
            x += w;
        }
        self.cursor -= ROW_H;
    }

    fn total(&mut self, total: f64) {
        let table_w: f64 = COLUMNS.iter().map(|(_, w)| w).sum();
        let amount_w = COLUMNS[COLUMNS.len() - 1].1;
        let top = self.cursor;
        self.cell(MARGIN, top, table_w - amount_w, TOTAL_H, "Total", Font::Bold, 12.0, Align::Right, false);
        self.cell(
            MARGIN + table_w - amount_w,
            top,
            amount_w,
            TOTAL_H,
            &format_money(total),
            Font::Bold,
            12.0,
            Align::Right,
            false,
        );
        self.cursor -= TOTAL_H;
    }

    fn footer(&mut self, agent: &str, validity_note: &str, page_no: usize) {
        // Two bold lines 25mm from the bottom, page number 15mm from it.
        self.text(Font::Bold, 8.0, MARGIN, 71.0 - 8.0, &format!("Atendido por: {agent}"));
        self.text(Font::Bold, 8.0, MARGIN, 71.0 - 19.0, validity_note);
        let page = format!("Página {page_no}");
        let x = (PAGE_W - text_width(&page, 8.0)) / 2.0;
        self.text(Font::Italic, 8.0, x, 42.0 - 14.0 - 2.4, &page);
    }
}

/// Lay the quote out as a landscape table and return the PDF bytes.
pub fn render_quote_pdf(session: &QuoteSession, meta: &ExportMeta) -> Result<Vec<u8>> {
    if session.is_empty() {
        return Err(QuoteError::EmptyQuote);
    }

    let mut pages = Vec::new();
    let mut page = PageWriter::new();
    page.title(&meta.title);
    page.info_line(&format!("Cliente: {}", session.client()));
    page.info_line(&format!("Fecha: {}", format_date(meta.date)));
    page.cursor -= INFO_GAP;
    page.table_header();

    for line in session.lines() {
        if !page.fits(ROW_H) {
            pages.push(page);
            page = PageWriter::new();
            page.title(&meta.title);
            page.table_header();
        }
        page.row(line);
    }

    if !page.fits(TOTAL_H) {
        pages.push(page);
        page = PageWriter::new();
        page.title(&meta.title);
    }
    page.total(session.total());
    pages.push(page);

    for (i, page) in pages.iter_mut().enumerate() {
        page.footer(session.agent(), &meta.validity_note, i + 1);
    }

    let bytes = assemble(pages)?;
    info!(
        lines = session.lines().len(),
        bytes = bytes.len(),
        "Quote PDF rendered"
    );
    Ok(bytes)
}

/// Render and write the PDF to `path`.
pub fn save_quote_pdf(session: &QuoteSession, meta: &ExportMeta, path: &Path) -> Result<()> {
    let bytes = render_quote_pdf(session, meta)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| QuoteError::io(dir, e))?;
    }
    fs::write(path, bytes).map_err(|e| QuoteError::io(path, e))?;
    info!(path = %path.display(), "Quote PDF saved");
    Ok(())
}

fn assemble(pages: Vec<PageWriter>) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font = |doc: &mut Document, base: &str| {
        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base,
            "Encoding" => "WinAnsiEncoding",
        })
    };
    let regular = font(&mut doc, "Helvetica");
    let bold = font(&mut doc, "Helvetica-Bold");
    let italic = font(&mut doc, "Helvetica-Oblique");

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
            "F3" => italic,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page.ops,
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![pt(0.0), pt(0.0), pt(PAGE_W), pt(PAGE_H)],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).map_err(QuoteError::PdfWrite)?;
    Ok(buf)
}

/// Whole points are plenty for this layout.
fn pt(v: f64) -> Object {
    Object::Integer(v.round() as i64)
}

fn truncate_description(description: &str) -> String {
    if description.chars().count() > MAX_DESCRIPTION {
        let head: String = description.chars().take(MAX_DESCRIPTION - 3).collect();
        format!("{head}...")
    } else {
        description.to_string()
    }
}

/// Encode for the standard fonts' WinAnsiEncoding. Latin-1 maps through
/// unchanged; anything else outside it becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u8,
            '€' => 0x80,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

/// Approximate Helvetica advance width, good enough for alignment.
fn text_width(text: &str, size: f64) -> f64 {
    let units: u32 = text
        .chars()
        .map(|c| match c {
            'i' | 'j' | 'l' => 222,
            ' ' | ',' | '.' | ':' | '/' | '!' | 'I' | 'f' | 't' => 278,
            'r' | '-' => 333,
            'm' | 'M' => 833,
            'W' => 944,
            'w' => 722,
            'A'..='Z' => 667,
            _ => 556,
        })
        .sum();
    units as f64 * size / 1000.0
}
