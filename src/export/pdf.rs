//! A4 PDF layout for classified correction blocks.
//!
//! Uses the built-in Helvetica faces so export works without any font files
//! on disk. Width metrics for built-in fonts are not available here, so
//! line wrapping uses an average-advance estimate — good enough for body
//! text, and the page is sized with generous margins to absorb the error.
//! Exact styling is a presentation choice, not a contract.

use crate::error::GradeError;
use crate::export::parse::{self, Block, Span, SpanStyle};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 18.0;
const TOP_MM: f32 = 22.0;
const BOTTOM_MM: f32 = 20.0;

const BODY_PT: f32 = 11.0;
const PT_TO_MM: f32 = 0.352_778;
/// Average Helvetica glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f32 = 0.5;
const BULLET_INDENT_MM: f32 = 6.0;

/// Render correction Markdown as a PDF byte stream.
///
/// Pure and deterministic: the same text produces the same bytes, apart
/// from the creation-date and document-id metadata embedded by the format.
/// Arbitrary printable text renders as plain paragraphs; this function only
/// fails if the PDF backend itself does.
pub fn render_pdf(markdown: &str) -> Result<Vec<u8>, GradeError> {
    let blocks = parse::parse_blocks(markdown);

    let (doc, page, layer) =
        PdfDocument::new("Corrections", Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "content");
    let faces = Faces {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(export_err)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(export_err)?,
        oblique: doc.add_builtin_font(BuiltinFont::HelveticaOblique).map_err(export_err)?,
    };

    {
        let mut cursor = Cursor {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            y: PAGE_HEIGHT_MM - TOP_MM,
        };

        for block in &blocks {
            match block {
                Block::Heading { level, spans } => {
                    let size = match level {
                        1 => 17.0,
                        2 => 14.5,
                        _ => 12.5,
                    };
                    cursor.advance(2.0);
                    draw_wrapped(&mut cursor, spans, size, &faces, true, MARGIN_MM);
                    cursor.advance(1.5);
                }
                Block::Paragraph { spans } => {
                    draw_wrapped(&mut cursor, spans, BODY_PT, &faces, false, MARGIN_MM);
                }
                Block::Bullet { spans } => {
                    cursor.ensure_room(line_height(BODY_PT));
                    cursor.layer.use_text(
                        "\u{2022}",
                        BODY_PT,
                        Mm(MARGIN_MM),
                        Mm(cursor.y),
                        &faces.regular,
                    );
                    draw_wrapped(
                        &mut cursor,
                        spans,
                        BODY_PT,
                        &faces,
                        false,
                        MARGIN_MM + BULLET_INDENT_MM,
                    );
                }
                Block::Rule => {
                    cursor.ensure_room(6.0);
                    cursor.advance(2.5);
                    draw_rule(&cursor);
                    cursor.advance(3.5);
                }
                Block::Blank => cursor.advance(2.4),
            }
        }
    }

    doc.save_to_bytes().map_err(export_err)
}

struct Faces {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

impl Faces {
    fn for_style(&self, style: SpanStyle, heading: bool) -> &IndirectFontRef {
        if heading {
            return &self.bold;
        }
        match style {
            SpanStyle::Regular => &self.regular,
            SpanStyle::Bold => &self.bold,
            SpanStyle::Italic => &self.oblique,
        }
    }
}

/// Write position on the current page; starts a fresh A4 page when a block
/// would cross the bottom margin.
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl Cursor<'_> {
    fn ensure_room(&mut self, needed_mm: f32) {
        if self.y - needed_mm < BOTTOM_MM {
            let (page, layer) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "content");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - TOP_MM;
        }
    }

    fn advance(&mut self, mm: f32) {
        self.y -= mm;
    }
}

fn line_height(size_pt: f32) -> f32 {
    size_pt * PT_TO_MM * 1.45
}

fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * PT_TO_MM * GLYPH_ADVANCE
}

/// Wrap the spans to the content width and draw each line as one or more
/// styled runs. Words never straddle a style boundary, and inter-word
/// spaces live inside the emitted strings so extracted text reads normally.
fn draw_wrapped(cursor: &mut Cursor<'_>, spans: &[Span], size_pt: f32, faces: &Faces, heading: bool, x_start: f32) {
    let max_width = PAGE_WIDTH_MM - MARGIN_MM - x_start;
    for line in wrap_words(&flatten_words(spans), size_pt, max_width) {
        cursor.ensure_room(line_height(size_pt));

        let mut x = x_start;
        for (text, style) in merge_runs(&line) {
            let font = faces.for_style(style, heading);
            let width = text_width_mm(&text, size_pt);
            cursor.layer.use_text(text, size_pt, Mm(x), Mm(cursor.y), font);
            x += width;
        }

        cursor.advance(line_height(size_pt));
    }
}

/// Split span text into (word, style) pairs for wrapping.
fn flatten_words(spans: &[Span]) -> Vec<(String, SpanStyle)> {
    spans
        .iter()
        .flat_map(|span| {
            span.text
                .split_whitespace()
                .map(move |w| (w.to_string(), span.style))
        })
        .collect()
}

/// Greedy fill: pack words until the estimated line width is exceeded.
/// A single word wider than the line gets a line of its own.
fn wrap_words(
    words: &[(String, SpanStyle)],
    size_pt: f32,
    max_width_mm: f32,
) -> Vec<Vec<(String, SpanStyle)>> {
    let space = text_width_mm(" ", size_pt);
    let mut lines: Vec<Vec<(String, SpanStyle)>> = Vec::new();
    let mut current: Vec<(String, SpanStyle)> = Vec::new();
    let mut width = 0.0;

    for (word, style) in words {
        let word_width = text_width_mm(word, size_pt);
        let needed = if current.is_empty() {
            word_width
        } else {
            width + space + word_width
        };
        if !current.is_empty() && needed > max_width_mm {
            lines.push(std::mem::take(&mut current));
            width = word_width;
        } else {
            width = needed;
        }
        current.push((word.clone(), *style));
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Merge consecutive same-style words into single strings, attaching the
/// separating space to the run it follows.
fn merge_runs(line: &[(String, SpanStyle)]) -> Vec<(String, SpanStyle)> {
    let mut runs: Vec<(String, SpanStyle)> = Vec::new();
    for (word, style) in line {
        if let Some((text, last_style)) = runs.last_mut() {
            if last_style == style {
                text.push(' ');
                text.push_str(word);
                continue;
            }
            text.push(' ');
        }
        runs.push((word.clone(), *style));
    }
    runs
}

fn draw_rule(cursor: &Cursor<'_>) {
    cursor
        .layer
        .set_outline_color(Color::Rgb(Rgb::new(0.78, 0.78, 0.78, None)));
    cursor.layer.set_outline_thickness(0.6);
    cursor.layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN_MM), Mm(cursor.y)), false),
            (Point::new(Mm(PAGE_WIDTH_MM - MARGIN_MM), Mm(cursor.y)), false),
        ],
        is_closed: false,
    });
}

fn export_err(e: impl std::fmt::Display) -> GradeError {
    GradeError::ExportFailed {
        detail: e.to_string(),
    }
}
