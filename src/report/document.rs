//! Renderer-neutral description of a report page.
//!
//! Layout builders produce a [`DocumentDescription`]; a
//! [`DocumentRenderer`](super::render::DocumentRenderer) turns it into bytes.
//! The description is plain data and serializes deterministically, which is
//! what [`DocumentDescription::fingerprint`] relies on.

use chrono::NaiveDateTime;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// A4 in PostScript points.
pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;

pub const DEFAULT_FONT_FAMILY: &str = "THSarabun";
pub const HEADER_FILL: &str = "#D7D7D7";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageSize {
    pub name: &'static str,
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn a4() -> Self {
        Self {
            name: "A4",
            width: A4_WIDTH_PT,
            height: A4_HEIGHT_PT,
        }
    }
}

/// Page margins in points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Margins {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Margins {
    pub fn uniform(pt: f32) -> Self {
        Self {
            left: pt,
            top: pt,
            right: pt,
            bottom: pt,
        }
    }
}

/// Faded image drawn behind the content of every page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Watermark {
    pub image: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub opacity: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TextStyle {
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
}

impl TextStyle {
    pub fn regular(font_size: f32) -> Self {
        Self {
            font_size,
            ..Default::default()
        }
    }

    pub fn bold(font_size: f32) -> Self {
        Self {
            font_size,
            bold: true,
            italic: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// A run of text in one named style. `None` uses the document default.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Span {
    pub text: String,
    pub style: Option<String>,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    pub fn styled(text: impl Into<String>, style: &str) -> Self {
        Self {
            text: text.into(),
            style: Some(style.to_string()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Paragraph {
    pub spans: Vec<Span>,
    pub align: Align,
    pub margin_bottom: f32,
}

impl Paragraph {
    pub fn new(spans: Vec<Span>) -> Self {
        Self {
            spans,
            ..Default::default()
        }
    }

    pub fn text(text: impl Into<String>, style: &str) -> Self {
        Self::new(vec![Span::styled(text, style)])
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn spaced(mut self, margin_bottom: f32) -> Self {
        self.margin_bottom = margin_bottom;
        self
    }

    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Cell {
    pub spans: Vec<Span>,
    pub align: Align,
    pub fill: Option<String>,
}

impl Cell {
    pub fn new(spans: Vec<Span>) -> Self {
        Self {
            spans,
            ..Default::default()
        }
    }

    pub fn text(text: impl Into<String>, style: &str) -> Self {
        Self::new(vec![Span::styled(text, style)])
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn filled(mut self, color: &str) -> Self {
        self.fill = Some(color.to_string());
        self
    }

    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Grid drawing for a table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableLines {
    #[default]
    None,
    /// A single rule above the first row.
    TopRule,
    /// Rules above and below every row, no verticals.
    HorizontalRules,
    /// Solid outer frame and header rule, dashed rules between body rows.
    DashedInner,
    /// Solid lines around every cell.
    Grid,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Table {
    /// Column widths in points.
    pub widths: Vec<f32>,
    pub header_rows: usize,
    pub rows: Vec<Vec<Cell>>,
    pub lines: TableLines,
    pub margin_bottom: f32,
}

impl Table {
    pub fn new(widths: Vec<f32>) -> Self {
        Self {
            widths,
            ..Default::default()
        }
    }

    pub fn header(mut self, row: Vec<Cell>) -> Self {
        self.rows.insert(self.header_rows, row);
        self.header_rows += 1;
        self
    }

    pub fn row(mut self, row: Vec<Cell>) -> Self {
        self.rows.push(row);
        self
    }

    pub fn lines(mut self, lines: TableLines) -> Self {
        self.lines = lines;
        self
    }

    pub fn spaced(mut self, margin_bottom: f32) -> Self {
        self.margin_bottom = margin_bottom;
        self
    }

    pub fn body(&self) -> &[Vec<Cell>] {
        &self.rows[self.header_rows.min(self.rows.len())..]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnContent {
    Image { source: String, width: f32, height: f32 },
    Text { paragraphs: Vec<Paragraph> },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Column {
    /// Fixed width in points; `None` shares the remaining width.
    pub width: Option<f32>,
    pub content: ColumnContent,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph(Paragraph),
    Columns { columns: Vec<Column>, gap: f32 },
    Table(Table),
    /// Paragraphs at an absolute page position, outside the flow.
    Positioned { x: f32, y: f32, paragraphs: Vec<Paragraph> },
    Spacer { height: f32 },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DocumentDescription {
    pub title: String,
    pub page_size: PageSize,
    pub margins: Margins,
    pub watermark: Option<Watermark>,
    pub default_font: String,
    pub default_style: TextStyle,
    pub styles: BTreeMap<String, TextStyle>,
    pub generated_at: NaiveDateTime,
    pub content: Vec<Block>,
}

/// The printed part of a [`DocumentDescription`].
#[derive(Serialize)]
struct PrintedContent<'a> {
    title: &'a str,
    page_size: &'a PageSize,
    margins: &'a Margins,
    watermark: Option<&'a Watermark>,
    default_font: &'a str,
    default_style: &'a TextStyle,
    styles: &'a BTreeMap<String, TextStyle>,
    content: &'a [Block],
}

impl<'a> From<&'a DocumentDescription> for PrintedContent<'a> {
    fn from(doc: &'a DocumentDescription) -> Self {
        Self {
            title: &doc.title,
            page_size: &doc.page_size,
            margins: &doc.margins,
            watermark: doc.watermark.as_ref(),
            default_font: &doc.default_font,
            default_style: &doc.default_style,
            styles: &doc.styles,
            content: &doc.content,
        }
    }
}

impl DocumentDescription {
    pub fn style(&self, name: Option<&str>) -> TextStyle {
        name.and_then(|n| self.styles.get(n).copied())
            .unwrap_or(self.default_style)
    }

    /// Hex SHA-256 of everything that reaches the page. `generated_at` is
    /// left out, so re-rendering an unchanged case keeps its fingerprint.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(&PrintedContent::from(self))?;
        Ok(hex::encode(Sha256::digest(&json)))
    }

    /// Every piece of text in the flow, in order. Used for assertions and logs.
    pub fn texts(&self) -> Vec<String> {
        let mut out = Vec::new();
        for block in &self.content {
            match block {
                Block::Paragraph(p) => out.push(p.plain_text()),
                Block::Columns { columns, .. } => {
                    for column in columns {
                        if let ColumnContent::Text { paragraphs } = &column.content {
                            out.extend(paragraphs.iter().map(Paragraph::plain_text));
                        }
                    }
                }
                Block::Table(table) => {
                    for row in &table.rows {
                        out.extend(row.iter().map(Cell::plain_text));
                    }
                }
                Block::Positioned { paragraphs, .. } => {
                    out.extend(paragraphs.iter().map(Paragraph::plain_text))
                }
                Block::Spacer { .. } => {}
            }
        }
        out
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.content.iter().filter_map(|block| match block {
            Block::Table(table) => Some(table),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> DocumentDescription {
        let generated_at = NaiveDate::from_ymd_opt(2024, 3, 15)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .expect("valid timestamp");
        let mut styles = BTreeMap::new();
        styles.insert("header".to_string(), TextStyle::bold(14.0));
        DocumentDescription {
            title: "Laboratory report".into(),
            page_size: PageSize::a4(),
            margins: Margins::uniform(40.0),
            watermark: None,
            default_font: DEFAULT_FONT_FAMILY.into(),
            default_style: TextStyle::regular(10.0),
            styles,
            generated_at,
            content: vec![
                Block::Paragraph(Paragraph::text("Laboratory report", "header")),
                Block::Table(
                    Table::new(vec![100.0, 100.0])
                        .header(vec![Cell::text("Pathogens", "cell"), Cell::text("Result", "cell")])
                        .row(vec![Cell::text("SARS-CoV-2", "value"), Cell::text("Detected", "value")]),
                ),
            ],
        }
    }

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        let a = sample();
        let b = sample();
        let fa = a.fingerprint().expect("serializable");
        assert_eq!(fa, b.fingerprint().expect("serializable"));
        assert_eq!(fa.len(), 64);

        let mut c = sample();
        c.title.push('!');
        assert_ne!(fa, c.fingerprint().expect("serializable"));
    }

    #[test]
    fn fingerprint_ignores_generation_time() {
        let a = sample();
        let mut b = sample();
        b.generated_at += chrono::Duration::minutes(5);
        assert_ne!(a, b);
        assert_eq!(
            a.fingerprint().expect("serializable"),
            b.fingerprint().expect("serializable")
        );
    }

    #[test]
    fn unknown_style_falls_back_to_default() {
        let doc = sample();
        assert_eq!(doc.style(Some("header")), TextStyle::bold(14.0));
        assert_eq!(doc.style(Some("missing")), TextStyle::regular(10.0));
        assert_eq!(doc.style(None), TextStyle::regular(10.0));
    }

    #[test]
    fn header_rows_stay_ahead_of_body() {
        let table = Table::new(vec![10.0])
            .row(vec![Cell::text("body", "value")])
            .header(vec![Cell::text("head", "cell")]);
        assert_eq!(table.header_rows, 1);
        assert_eq!(table.rows[0][0].plain_text(), "head");
        assert_eq!(table.body().len(), 1);
    }

    #[test]
    fn texts_walks_every_block() {
        let texts = sample().texts();
        assert_eq!(texts[0], "Laboratory report");
        assert!(texts.contains(&"SARS-CoV-2".to_string()));
    }
}
