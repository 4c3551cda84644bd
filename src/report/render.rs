//! PDF output for [`DocumentDescription`]s.
//!
//! Layout is a single top-down pass. Text widths are estimated from the font
//! size rather than measured from glyph metrics, which is close enough for
//! the fixed forms printed here.

use printpdf::image_crate::{self, DynamicImage, Rgb as ImageRgb, RgbImage};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, LineDashPattern, Mm,
    PdfDocument, PdfDocumentReference, PdfLayerReference, Point, Rect, Rgb,
};
use std::io::{BufWriter, Cursor};
use std::sync::Arc;
use thiserror::Error;

use super::assets::{decode_data_uri, FontFaces};
use super::document::{
    Align, Block, Cell, Column, ColumnContent, DocumentDescription, Paragraph, Span, Table,
    TableLines, TextStyle, Watermark,
};

const LINE_SPACING: f32 = 1.2;
const CELL_PADDING: f32 = 3.0;
const RULE_THICKNESS: f32 = 0.5;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("font error: {0}")]
    Font(String),

    #[error("image error: {0}")]
    Image(String),

    #[error("write error: {0}")]
    Write(String),
}

/// Turns a document description into a finished file.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, doc: &DocumentDescription) -> Result<Vec<u8>, RenderError>;

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }
}

#[derive(Clone, Default)]
pub struct PdfRenderer {
    fonts: Option<Arc<FontFaces>>,
}

impl PdfRenderer {
    /// Renderer using the built-in Helvetica faces. These cannot show Thai
    /// script; characters outside Latin-1 print as `?`.
    pub fn builtin() -> Self {
        Self { fonts: None }
    }

    pub fn with_fonts(fonts: FontFaces) -> Self {
        Self {
            fonts: Some(Arc::new(fonts)),
        }
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, doc: &DocumentDescription) -> Result<Vec<u8>, RenderError> {
        let (pdf, page, layer) = PdfDocument::new(
            doc.title.as_str(),
            mm(doc.page_size.width),
            mm(doc.page_size.height),
            "Layer 1",
        );
        let fonts = FontSet::load(&pdf, self.fonts.as_deref())?;
        let watermark = doc
            .watermark
            .as_ref()
            .map(|w| faded_image(w).map(|img| (w, img)))
            .transpose()?;

        let layer = pdf.get_page(page).get_layer(layer);
        let mut pen = Pen {
            pdf: &pdf,
            doc,
            fonts: &fonts,
            watermark: watermark.as_ref(),
            layer,
            y: doc.margins.top,
        };
        pen.decorate_page();
        for block in &doc.content {
            pen.block(block)?;
        }

        let mut writer = BufWriter::new(Vec::new());
        pdf.save(&mut writer)
            .map_err(|e| RenderError::Write(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| RenderError::Write(e.to_string()))
    }
}

/// Points to printpdf millimetres.
fn mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb(Rgb::new(
        channel(0)? as f32 / 255.0,
        channel(2)? as f32 / 255.0,
        channel(4)? as f32 / 255.0,
        None,
    )))
}

/// Logo blended onto white at the watermark opacity.
fn faded_image(watermark: &Watermark) -> Result<DynamicImage, RenderError> {
    let bytes = decode_data_uri(&watermark.image).map_err(|e| RenderError::Image(e.to_string()))?;
    let source = image_crate::load_from_memory(&bytes)
        .map_err(|e| RenderError::Image(e.to_string()))?
        .to_rgba8();
    let opacity = watermark.opacity.clamp(0.0, 1.0);
    let faded = RgbImage::from_fn(source.width(), source.height(), |x, y| {
        let px = source.get_pixel(x, y).0;
        let alpha = px[3] as f32 / 255.0 * opacity;
        let blend = |c: u8| (255.0 - (255.0 - c as f32) * alpha).round() as u8;
        ImageRgb([blend(px[0]), blend(px[1]), blend(px[2])])
    });
    Ok(DynamicImage::ImageRgb8(faded))
}

fn decode_image(source: &str) -> Result<DynamicImage, RenderError> {
    let bytes = decode_data_uri(source).map_err(|e| RenderError::Image(e.to_string()))?;
    let image = image_crate::load_from_memory(&bytes).map_err(|e| RenderError::Image(e.to_string()))?;
    Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
}

struct FontSet {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    bold_italic: IndirectFontRef,
    /// Average advance as a fraction of the font size.
    advance: f32,
    latin_only: bool,
}

impl FontSet {
    fn load(pdf: &PdfDocumentReference, faces: Option<&FontFaces>) -> Result<Self, RenderError> {
        let font_err = |e: printpdf::Error| RenderError::Font(e.to_string());
        match faces {
            Some(faces) => {
                let external = |bold, italic| {
                    pdf.add_external_font(Cursor::new(faces.face(bold, italic)))
                        .map_err(font_err)
                };
                Ok(Self {
                    regular: external(false, false)?,
                    bold: external(true, false)?,
                    italic: external(false, true)?,
                    bold_italic: external(true, true)?,
                    advance: 0.42,
                    latin_only: false,
                })
            }
            None => Ok(Self {
                regular: pdf.add_builtin_font(BuiltinFont::Helvetica).map_err(font_err)?,
                bold: pdf.add_builtin_font(BuiltinFont::HelveticaBold).map_err(font_err)?,
                italic: pdf.add_builtin_font(BuiltinFont::HelveticaOblique).map_err(font_err)?,
                bold_italic: pdf
                    .add_builtin_font(BuiltinFont::HelveticaBoldOblique)
                    .map_err(font_err)?,
                advance: 0.52,
                latin_only: true,
            }),
        }
    }

    fn font(&self, style: TextStyle) -> &IndirectFontRef {
        match (style.bold, style.italic) {
            (false, false) => &self.regular,
            (true, false) => &self.bold,
            (false, true) => &self.italic,
            (true, true) => &self.bold_italic,
        }
    }

    fn width(&self, text: &str, style: TextStyle) -> f32 {
        text.chars().count() as f32 * style.font_size * self.advance
    }

    fn printable(&self, text: &str) -> String {
        if self.latin_only {
            text.chars()
                .map(|c| if (c as u32) < 0x100 { c } else { '?' })
                .collect()
        } else {
            text.to_string()
        }
    }
}

struct Run {
    text: String,
    style: TextStyle,
}

#[derive(Default)]
struct TextLine {
    runs: Vec<Run>,
    width: f32,
    size: f32,
}

impl TextLine {
    fn height(&self, fallback: f32) -> f32 {
        let size = if self.size > 0.0 { self.size } else { fallback };
        size * LINE_SPACING
    }

    fn push(&mut self, text: String, style: TextStyle, width: f32) {
        self.width += width;
        self.size = self.size.max(style.font_size);
        match self.runs.last_mut() {
            Some(last) if last.style == style => last.text.push_str(&text),
            _ => self.runs.push(Run { text, style }),
        }
    }
}

/// Splits `text` into words, each keeping its trailing whitespace.
fn words(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_space = false;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            in_space = true;
        } else if in_space {
            out.push(&text[start..i]);
            start = i;
            in_space = false;
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

struct Pen<'a> {
    pdf: &'a PdfDocumentReference,
    doc: &'a DocumentDescription,
    fonts: &'a FontSet,
    watermark: Option<&'a (&'a Watermark, DynamicImage)>,
    layer: PdfLayerReference,
    /// Distance from the top edge of the current page, in points.
    y: f32,
}

impl<'a> Pen<'a> {
    fn page_height(&self) -> f32 {
        self.doc.page_size.height
    }

    fn content_width(&self) -> f32 {
        self.doc.page_size.width - self.doc.margins.left - self.doc.margins.right
    }

    fn bottom_limit(&self) -> f32 {
        self.page_height() - self.doc.margins.bottom
    }

    fn new_page(&mut self) {
        let (page, layer) = self.pdf.add_page(
            mm(self.doc.page_size.width),
            mm(self.doc.page_size.height),
            "Layer 1",
        );
        self.layer = self.pdf.get_page(page).get_layer(layer);
        self.y = self.doc.margins.top;
        self.decorate_page();
    }

    fn ensure_room(&mut self, height: f32) {
        let fresh_page = self.y <= self.doc.margins.top;
        if self.y + height > self.bottom_limit() && !fresh_page {
            self.new_page();
        }
    }

    fn decorate_page(&self) {
        if let Some((mark, image)) = self.watermark {
            self.image(image, mark.x, mark.y, mark.width, mark.height);
        }
        self.layer.set_fill_color(black());
        self.layer.set_outline_color(black());
        self.layer.set_outline_thickness(RULE_THICKNESS);
    }

    fn block(&mut self, block: &Block) -> Result<(), RenderError> {
        match block {
            Block::Paragraph(p) => {
                let x = self.doc.margins.left;
                let width = self.content_width();
                self.flow_paragraph(p, x, width);
            }
            Block::Columns { columns, gap } => self.columns(columns, *gap)?,
            Block::Table(table) => self.table(table),
            Block::Positioned { x, y, paragraphs } => {
                let width = self.doc.page_size.width - x - self.doc.margins.right;
                let mut top = *y;
                for p in paragraphs {
                    top += self.draw_paragraph(p, *x, top, width);
                }
            }
            Block::Spacer { height } => self.y += height,
        }
        Ok(())
    }

    fn wrap(&self, spans: &[Span], width: f32) -> Vec<TextLine> {
        let mut lines = vec![TextLine::default()];
        for span in spans {
            let style = self.doc.style(span.style.as_deref());
            for (i, piece) in span.text.split('\n').enumerate() {
                if i > 0 {
                    lines.push(TextLine::default());
                }
                for word in words(piece) {
                    self.place_word(&mut lines, word, style, width);
                }
            }
        }
        lines
    }

    fn place_word(&self, lines: &mut Vec<TextLine>, word: &str, style: TextStyle, width: f32) {
        let word_width = self.fonts.width(word, style);
        let fits = |line: &TextLine| line.width + word_width <= width || line.runs.is_empty();
        if !lines.last().map(fits).unwrap_or(true) {
            lines.push(TextLine::default());
        }
        if word_width <= width {
            if let Some(line) = lines.last_mut() {
                line.push(word.to_string(), style, word_width);
            }
            return;
        }
        // Unbreakable run (Thai has no spaces): split by character.
        for c in word.chars() {
            let w = self.fonts.width(c.encode_utf8(&mut [0; 4]), style);
            let needs_break = lines
                .last()
                .map(|l| l.width + w > width && !l.runs.is_empty())
                .unwrap_or(false);
            if needs_break {
                lines.push(TextLine::default());
            }
            if let Some(line) = lines.last_mut() {
                line.push(c.to_string(), style, w);
            }
        }
    }

    fn paragraph_height(&self, p: &Paragraph, width: f32) -> f32 {
        let fallback = self.doc.default_style.font_size;
        self.wrap(&p.spans, width)
            .iter()
            .map(|l| l.height(fallback))
            .sum::<f32>()
            + p.margin_bottom
    }

    /// Draws a paragraph in the flow, breaking pages between lines.
    fn flow_paragraph(&mut self, p: &Paragraph, x: f32, width: f32) {
        let fallback = self.doc.default_style.font_size;
        for line in self.wrap(&p.spans, width) {
            let height = line.height(fallback);
            self.ensure_room(height);
            self.draw_line(&line, p.align, x, self.y, width);
            self.y += height;
        }
        self.y += p.margin_bottom;
    }

    /// Draws a paragraph at a fixed position; returns the height used.
    fn draw_paragraph(&self, p: &Paragraph, x: f32, top: f32, width: f32) -> f32 {
        self.draw_spans(&p.spans, p.align, x, top, width) + p.margin_bottom
    }

    fn draw_spans(&self, spans: &[Span], align: Align, x: f32, top: f32, width: f32) -> f32 {
        let fallback = self.doc.default_style.font_size;
        let mut y = top;
        for line in self.wrap(spans, width) {
            self.draw_line(&line, align, x, y, width);
            y += line.height(fallback);
        }
        y - top
    }

    fn draw_line(&self, line: &TextLine, align: Align, x: f32, top: f32, width: f32) {
        let mut cursor = match align {
            Align::Left => x,
            Align::Center => x + (width - line.width).max(0.0) / 2.0,
            Align::Right => x + (width - line.width).max(0.0),
        };
        let baseline = top + line.size;
        for run in &line.runs {
            let text = self.fonts.printable(&run.text);
            if !text.trim().is_empty() {
                self.layer.use_text(
                    text,
                    run.style.font_size,
                    mm(cursor),
                    mm(self.page_height() - baseline),
                    self.fonts.font(run.style),
                );
            }
            cursor += self.fonts.width(&run.text, run.style);
        }
    }

    fn image(&self, image: &DynamicImage, x: f32, top: f32, width: f32, height: f32) {
        let (px_w, px_h) = (image.width().max(1) as f32, image.height().max(1) as f32);
        let transform = ImageTransform {
            translate_x: Some(mm(x)),
            translate_y: Some(mm(self.page_height() - top - height)),
            dpi: Some(72.0),
            scale_x: Some(width / px_w),
            scale_y: Some(height / px_h),
            ..Default::default()
        };
        Image::from_dynamic_image(image).add_to_layer(self.layer.clone(), transform);
    }

    fn columns(&mut self, columns: &[Column], gap: f32) -> Result<(), RenderError> {
        let total = self.content_width();
        let fixed: f32 = columns.iter().filter_map(|c| c.width).sum();
        let flexible = columns.iter().filter(|c| c.width.is_none()).count().max(1) as f32;
        let gaps = gap * columns.len().saturating_sub(1) as f32;
        let share = ((total - fixed - gaps) / flexible).max(0.0);

        let mut heights = Vec::with_capacity(columns.len());
        for column in columns {
            let width = column.width.unwrap_or(share);
            heights.push(match &column.content {
                ColumnContent::Image { height, .. } => *height,
                ColumnContent::Text { paragraphs } => paragraphs
                    .iter()
                    .map(|p| self.paragraph_height(p, width))
                    .sum(),
            });
        }
        let row_height = heights.iter().copied().fold(0.0, f32::max);
        self.ensure_room(row_height);

        let mut x = self.doc.margins.left;
        for column in columns {
            let width = column.width.unwrap_or(share);
            match &column.content {
                ColumnContent::Image {
                    source,
                    width: w,
                    height: h,
                } => {
                    let image = decode_image(source)?;
                    self.image(&image, x, self.y, *w, *h);
                }
                ColumnContent::Text { paragraphs } => {
                    let mut top = self.y;
                    for p in paragraphs {
                        top += self.draw_paragraph(p, x, top, width);
                    }
                }
            }
            x += width + gap;
        }
        self.y += row_height;
        Ok(())
    }

    fn table(&mut self, table: &Table) {
        let total: f32 = table.widths.iter().sum();
        let available = self.content_width();
        let scale = if total > available && total > 0.0 {
            available / total
        } else {
            1.0
        };
        let widths: Vec<f32> = table.widths.iter().map(|w| w * scale).collect();
        let left = self.doc.margins.left;
        let right = left + widths.iter().sum::<f32>();

        let mut first_on_page = true;
        let last = table.rows.len().saturating_sub(1);
        for (index, row) in table.rows.iter().enumerate() {
            let height = self.row_height(row, &widths);
            let before = self.y;
            self.ensure_room(height);
            if self.y < before {
                first_on_page = true;
            }
            let top = self.y;

            let mut x = left;
            for (cell, width) in row.iter().zip(&widths) {
                self.cell(cell, x, top, *width, height);
                x += width;
            }

            let bottom = top + height;
            match table.lines {
                TableLines::None => {}
                TableLines::TopRule => {
                    if index == 0 {
                        self.rule(left, right, top, false);
                    }
                }
                TableLines::HorizontalRules => {
                    self.rule(left, right, top, false);
                    self.rule(left, right, bottom, false);
                }
                TableLines::Grid => {
                    self.rule(left, right, top, false);
                    self.rule(left, right, bottom, false);
                    self.verticals(left, &widths, top, bottom);
                }
                TableLines::DashedInner => {
                    let header_edge = index + 1 == table.header_rows;
                    if first_on_page || index == 0 {
                        self.rule(left, right, top, false);
                    }
                    let dashed = index != last && !header_edge;
                    self.rule(left, right, bottom, dashed);
                    self.verticals(left, &widths, top, bottom);
                }
            }
            self.y = bottom;
            first_on_page = false;
        }
        self.y += table.margin_bottom;
    }

    fn row_height(&self, row: &[Cell], widths: &[f32]) -> f32 {
        let fallback = self.doc.default_style.font_size;
        row.iter()
            .zip(widths)
            .map(|(cell, width)| {
                self.wrap(&cell.spans, (width - 2.0 * CELL_PADDING).max(1.0))
                    .iter()
                    .map(|l| l.height(fallback))
                    .sum::<f32>()
            })
            .fold(fallback * LINE_SPACING, f32::max)
            + 2.0 * CELL_PADDING
    }

    fn cell(&self, cell: &Cell, x: f32, top: f32, width: f32, height: f32) {
        if let Some(fill) = cell.fill.as_deref().and_then(hex_color) {
            self.layer.set_fill_color(fill);
            self.layer.add_rect(Rect::new(
                mm(x),
                mm(self.page_height() - top - height),
                mm(x + width),
                mm(self.page_height() - top),
            ));
            self.layer.set_fill_color(black());
        }
        self.draw_spans(
            &cell.spans,
            cell.align,
            x + CELL_PADDING,
            top + CELL_PADDING,
            (width - 2.0 * CELL_PADDING).max(1.0),
        );
    }

    fn rule(&self, x1: f32, x2: f32, y: f32, dashed: bool) {
        if dashed {
            self.layer.set_line_dash_pattern(LineDashPattern {
                dash_1: Some(5),
                gap_1: Some(2),
                ..Default::default()
            });
        }
        self.segment(x1, y, x2, y);
        if dashed {
            self.layer.set_line_dash_pattern(LineDashPattern::default());
        }
    }

    fn verticals(&self, left: f32, widths: &[f32], top: f32, bottom: f32) {
        let mut x = left;
        self.segment(x, top, x, bottom);
        for width in widths {
            x += width;
            self.segment(x, top, x, bottom);
        }
    }

    fn segment(&self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let h = self.page_height();
        self.layer.add_line(Line {
            points: vec![
                (Point::new(mm(x1), mm(h - y1)), false),
                (Point::new(mm(x2), mm(h - y2)), false),
            ],
            is_closed: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::document::{Margins, PageSize, DEFAULT_FONT_FAMILY, HEADER_FILL};
    use chrono::NaiveDate;
    use printpdf::image_crate::ImageFormat;
    use std::collections::BTreeMap;

    fn png_data_uri() -> String {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, ImageRgb([200, 10, 10])));
        let mut buf = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode png");
        format!("data:image/png;base64,{}", STANDARD.encode(buf))
    }

    fn doc(content: Vec<Block>, watermark: Option<Watermark>) -> DocumentDescription {
        let mut styles = BTreeMap::new();
        styles.insert("key".to_string(), TextStyle::bold(10.0));
        DocumentDescription {
            title: "test".into(),
            page_size: PageSize::a4(),
            margins: Margins::uniform(20.0),
            watermark,
            default_font: DEFAULT_FONT_FAMILY.into(),
            default_style: TextStyle::regular(10.0),
            styles,
            generated_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .expect("valid"),
            content,
        }
    }

    #[test]
    fn renders_pdf_bytes() {
        let table = Table::new(vec![170.0, 170.0, 170.0])
            .header(vec![
                Cell::text("Pathogens", "key").filled(HEADER_FILL),
                Cell::text("Result", "key").filled(HEADER_FILL),
                Cell::text("Remark", "key").filled(HEADER_FILL),
            ])
            .row(vec![Cell::text("A", "key"), Cell::text("Detected", "key"), Cell::empty()])
            .row(vec![Cell::text("B", "key"), Cell::text("Not detected", "key"), Cell::empty()])
            .lines(TableLines::DashedInner);
        let description = doc(
            vec![
                Block::Paragraph(Paragraph::text("Laboratory report", "key").aligned(Align::Center)),
                Block::Table(table),
                Block::Positioned {
                    x: 30.0,
                    y: 750.0,
                    paragraphs: vec![Paragraph::text("Reported by : ทดสอบ", "key")],
                },
            ],
            None,
        );

        let bytes = PdfRenderer::builtin().render(&description).expect("renders");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn embeds_logo_and_watermark() {
        let logo = png_data_uri();
        let description = doc(
            vec![Block::Columns {
                columns: vec![
                    Column {
                        width: Some(100.0),
                        content: ColumnContent::Image {
                            source: logo.clone(),
                            width: 100.0,
                            height: 100.0,
                        },
                    },
                    Column {
                        width: None,
                        content: ColumnContent::Text {
                            paragraphs: vec![Paragraph::text("Institute", "key")],
                        },
                    },
                ],
                gap: 10.0,
            }],
            Some(Watermark {
                image: logo,
                x: 200.0,
                y: 300.0,
                width: 200.0,
                height: 200.0,
                opacity: 0.4,
            }),
        );

        let bytes = PdfRenderer::builtin().render(&description).expect("renders");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_content_breaks_onto_more_pages() {
        let rows = (0..120).fold(Table::new(vec![200.0, 200.0]), |t, i| {
            t.row(vec![Cell::text(format!("row {}", i), "key"), Cell::empty()])
        });
        let long = doc(vec![Block::Table(rows.lines(TableLines::Grid))], None);
        let short = doc(vec![Block::Paragraph(Paragraph::text("row 0", "key"))], None);

        let renderer = PdfRenderer::builtin();
        let long = renderer.render(&long).expect("renders");
        let short = renderer.render(&short).expect("renders");
        assert!(long.starts_with(b"%PDF"));
        assert!(long.len() > short.len());
    }

    #[test]
    fn broken_image_is_an_image_error() {
        let description = doc(
            vec![],
            Some(Watermark {
                image: "data:image/png;base64,AAAA".into(),
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
                opacity: 0.4,
            }),
        );
        let err = PdfRenderer::builtin().render(&description).unwrap_err();
        assert!(matches!(err, RenderError::Image(_)));
    }

    #[test]
    fn words_keep_trailing_space() {
        assert_eq!(words("Name : value"), vec!["Name ", ": ", "value"]);
        assert_eq!(words("ชื่อภาษาไทย"), vec!["ชื่อภาษาไทย"]);
        assert!(words("").is_empty());
    }

    #[test]
    fn hex_colors_parse() {
        assert!(hex_color("#D7D7D7").is_some());
        assert!(hex_color("D7D7D7").is_none());
        assert!(hex_color("#D7D7").is_none());
    }
}
