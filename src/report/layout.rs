//! Report layouts.
//!
//! Each form is assembled from the same handful of builders (letterhead,
//! revision strip, demographic table, results table, signature and notes);
//! the per-form functions only choose labels, widths and which values go
//! where.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use super::document::{
    Align, Block, Cell, Column, ColumnContent, DocumentDescription, Margins, PageSize, Paragraph,
    Span, Table, TableLines, TextStyle, Watermark, DEFAULT_FONT_FAMILY, HEADER_FILL,
};
use super::fields::{pathogen_rows, PathogenRow, ReportData};
use super::template::TemplateVariant;
use crate::models::{LabRecord, Patient};
use crate::utils::{or_empty, thai_date_of, thai_date_time};

pub const STYLE_HEADER: &str = "header";
pub const STYLE_SUBHEADER: &str = "subheader";
pub const STYLE_KEY: &str = "key";
pub const STYLE_VALUE: &str = "value";
pub const STYLE_CELL: &str = "cell";

const PAGE_MARGIN: f32 = 20.0;
const LOGO_SIZE: f32 = 100.0;

const THAI_INSTITUTE: &str = "กลุ่มห้องปฏิบัติการสาธารณสุข สถาบันป้องกันควบคุมโรคเขตเมือง ";
const THAI_ADDRESS: &str = "24/56 ม.3 ถนนพหลโยธิน แขวงอนุสาวรีย์ เขตบางเขน กรุงเทพฯ 10220 \nโทรศัพท์ 0 2972 9606, E-MAIL: LABIUDCBKK@GMAIL.COM";
const ENGLISH_INSTITUTE: &str =
    "Public Health Laboratory, Institute for Urban Disease Control and Prevention ";
const ENGLISH_ADDRESS: &str = "24/56 Phahonyothin Rd, Anusawari, Bang-khen. Bangkok 10770 \nTel +66 2972 9606, +66 96 0966075, E-mail: labiudcbkk@gmail.com";

/// Inputs that do not come from the store.
#[derive(Clone, Copy, Debug)]
pub struct LayoutContext<'a> {
    /// Logo as a `data:` URI; `None` omits the letterhead image and watermark.
    pub logo: Option<&'a str>,
    pub generated_at: NaiveDateTime,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Letterhead {
    Thai,
    English,
}

/// Builds the document for `variant`. Pure: the same inputs always give an
/// identical description.
pub fn build(variant: TemplateVariant, data: &ReportData, ctx: &LayoutContext<'_>) -> DocumentDescription {
    let rows = pathogen_rows(variant, &data.lab, &data.tests);
    let content = match variant {
        TemplateVariant::CovidMp => covid_mp(data, &rows, ctx),
        TemplateVariant::Monkeypox => monkeypox(data, &rows, ctx),
        TemplateVariant::RespiratoryPanel => respiratory_panel(data, &rows, ctx),
        TemplateVariant::Igra => igra(data, &rows, ctx),
        TemplateVariant::Immunology => immunology(data, &rows, ctx),
        TemplateVariant::Generic => generic(data, &rows, ctx),
    };

    DocumentDescription {
        title: format!("{} {}", variant, or_empty(data.lab.case_no.as_deref())).trim().to_string(),
        page_size: PageSize::a4(),
        margins: Margins::uniform(PAGE_MARGIN),
        watermark: ctx.logo.map(|logo| Watermark {
            image: logo.to_string(),
            x: 200.0,
            y: 300.0,
            width: 200.0,
            height: 200.0,
            opacity: 0.4,
        }),
        default_font: DEFAULT_FONT_FAMILY.to_string(),
        default_style: TextStyle::regular(10.0),
        styles: styles(variant),
        generated_at: ctx.generated_at,
        content,
    }
}

fn styles(variant: TemplateVariant) -> BTreeMap<String, TextStyle> {
    let field_size = match variant {
        TemplateVariant::RespiratoryPanel => 8.0,
        _ => 10.0,
    };
    [
        (STYLE_HEADER, TextStyle::bold(14.0)),
        (STYLE_SUBHEADER, TextStyle::bold(12.0)),
        (STYLE_KEY, TextStyle::bold(field_size)),
        (STYLE_VALUE, TextStyle::regular(field_size)),
        (STYLE_CELL, TextStyle::bold(11.0)),
    ]
    .into_iter()
    .map(|(name, style)| (name.to_string(), style))
    .collect()
}

// Shared builders

fn letterhead(kind: Letterhead, logo: Option<&str>) -> Block {
    let (institute, address) = match kind {
        Letterhead::Thai => (THAI_INSTITUTE, THAI_ADDRESS),
        Letterhead::English => (ENGLISH_INSTITUTE, ENGLISH_ADDRESS),
    };
    let mut columns = Vec::with_capacity(2);
    if let Some(logo) = logo {
        columns.push(Column {
            width: Some(LOGO_SIZE),
            content: ColumnContent::Image {
                source: logo.to_string(),
                width: LOGO_SIZE,
                height: LOGO_SIZE,
            },
        });
    }
    columns.push(Column {
        width: None,
        content: ColumnContent::Text {
            paragraphs: vec![
                Paragraph::text(institute, STYLE_HEADER).spaced(10.0),
                Paragraph::new(vec![Span::plain(address)]),
            ],
        },
    });
    Block::Columns { columns, gap: 10.0 }
}

/// Top-right strip: the form code, and for revisable forms the revision
/// count and the date of the last update.
fn revision_strip(variant: TemplateVariant, lab: Option<&LabRecord>) -> Block {
    let mut spans = vec![Span::styled(variant.form_code().unwrap_or_default(), STYLE_KEY)];
    if let Some(lab) = lab {
        let count = lab.count_update.map(|c| c.to_string()).unwrap_or_default();
        spans.push(Span::styled(
            format!(" แก้ไขครั้งที่ {} ({})", count, thai_date_of(lab.updated_at)),
            STYLE_KEY,
        ));
    }
    Block::Positioned {
        x: 30.0,
        y: 0.0,
        paragraphs: vec![Paragraph::new(spans).aligned(Align::Right)],
    }
}

fn title(text: &str, style: &str) -> Block {
    Block::Paragraph(Paragraph::text(text, style).aligned(Align::Center))
}

/// `Key : value` lines stacked in one cell.
fn key_values(pairs: &[(&str, String)]) -> Cell {
    let mut spans = Vec::with_capacity(pairs.len() * 3);
    for (i, (key, value)) in pairs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::plain("\n"));
        }
        spans.push(Span::styled(*key, STYLE_KEY));
        spans.push(Span::styled(value.clone(), STYLE_VALUE));
    }
    Cell::new(spans)
}

fn demographics(widths: Vec<f32>, columns: Vec<Vec<(&str, String)>>) -> Block {
    let row = columns.iter().map(|pairs| key_values(pairs)).collect();
    Block::Table(
        Table::new(widths)
            .row(row)
            .lines(TableLines::HorizontalRules)
            .spaced(15.0),
    )
}

fn results_table(headers: &[&str], widths: Vec<f32>, rows: Vec<Vec<String>>) -> Block {
    let header = headers
        .iter()
        .map(|h| Cell::text(*h, STYLE_CELL).aligned(Align::Center).filled(HEADER_FILL))
        .collect();
    let table = rows.into_iter().fold(Table::new(widths).header(header), |table, row| {
        table.row(row.into_iter().map(|v| Cell::text(v, STYLE_CELL)).collect())
    });
    Block::Table(table.lines(TableLines::DashedInner).spaced(10.0))
}

fn pathogen_table(rows: &[PathogenRow], third: &str) -> Block {
    results_table(
        &["Pathogens", "Result", third],
        vec![170.0, 170.0, 170.0],
        rows.iter()
            .map(|r| vec![r.name.clone(), r.result.clone(), r.remark.clone()])
            .collect(),
    )
}

fn labelled(key: &str, value: impl Into<String>) -> Vec<Span> {
    vec![Span::styled(key, STYLE_KEY), Span::styled(value, STYLE_VALUE)]
}

fn detection_method(lab: &LabRecord, comment_label: Option<&str>) -> Block {
    let mut spans = labelled("Detection Method : ", or_empty(lab.detection_method.as_deref()));
    if let Some(label) = comment_label {
        spans.push(Span::plain("\n\n"));
        spans.push(Span::styled(label, STYLE_VALUE));
        spans.push(Span::styled(or_empty(lab.comment.as_deref()), STYLE_VALUE));
    }
    Block::Paragraph(Paragraph::new(spans).spaced(10.0))
}

fn signature_lines(lines: &[(&str, String)]) -> Paragraph {
    let mut spans = Vec::new();
    for (i, (key, value)) in lines.iter().enumerate() {
        if i > 0 {
            spans.push(Span::plain("\n"));
        }
        spans.extend(labelled(key, value.clone()));
    }
    Paragraph::new(spans)
}

fn notes(heading: &str, lines: &[&str], style: &str) -> Paragraph {
    let mut spans = vec![Span::styled(heading, STYLE_KEY)];
    for line in lines {
        spans.push(Span::plain("\n"));
        spans.push(Span::styled(*line, style));
    }
    Paragraph::new(spans)
}

fn rule() -> Block {
    Block::Table(Table::new(vec![500.0]).row(vec![Cell::empty()]).lines(TableLines::TopRule))
}

fn patient(lab: &LabRecord) -> Patient {
    lab.patient.clone().unwrap_or_default()
}

fn report_date_time(lab: &LabRecord) -> String {
    thai_date_time(lab.report_date, lab.report_time.as_deref())
}

fn approve_date_time(lab: &LabRecord) -> String {
    thai_date_time(lab.approve_date, lab.approve_time.as_deref())
}

fn collected(p: &Patient) -> String {
    thai_date_time(p.collected_date, p.collected_time.as_deref())
}

fn received(p: &Patient) -> String {
    thai_date_time(p.received_date, p.received_time.as_deref())
}

fn years(p: &Patient) -> String {
    match p.age {
        Some(age) => format!("{} Years", age),
        None => String::new(),
    }
}

/// Thai label for the recorded gender; anything unrecognised prints blank.
fn thai_sex(gender: Option<&str>) -> &'static str {
    match gender.map(str::trim) {
        Some(g) if g.eq_ignore_ascii_case("male") => "ชาย",
        Some(g) if g.eq_ignore_ascii_case("female") => "หญิง",
        _ => "",
    }
}

fn result_label(lab: &LabRecord) -> String {
    lab.result_code().map(|c| c.label().to_string()).unwrap_or_default()
}

// Forms

const GENERIC_REMARKS: [&str; 6] = [
    "1. ใบรายงานผล รองรับเฉพาะตัวอย่างที่ได้รับการทดสอบในครั้งนี้เท่านั้น",
    "2. ผล Positive ให้ทำการตรวจยืนยันด้วยวิธี RT -PCR และให้กลับไปกักตัวที่บ้านจนกว่าจะทราบผลการตรวจ RT-PCR",
    "3. ผล Negative : ไม่พบเชื้อ",
    "3.1 หากเป็นผู้สัมผัสใกล้ชิดผู้สงสัยสัมผัส แนะนำกักตัว 14 วัน แยกของใช้ส่วนตัวทุกชนิด เช่น จานช้อน แก้ว ผ้าขนหนู โทรศัพท์ โดยไม่ใช้ร่วมกับผู้อื่น",
    "3.2 สังเกตอาการตนเอง หากพบอาการผิดปกติ มีไข้ ไอ เจ็บคอ มีน้ำมูก จมูกไม่ได้กลิ่น ลิ้นไม่รับรส หรือมีความเสี่ยงที่จะติดเชื้อ ให้เข้ารับการตรวจด้วยวิธี RT-PCR",
    "4. ผู้ติดเชื้อโควิด-19 รายใหม่ ที่ต้องการเข้า ระบบการดูแลที่บ้าน (Home Isolation) สามารถลงทะเบียนทางเว็บ สปสช.สแกน QR Code และ ทางไลน์",
];

fn generic(data: &ReportData, rows: &[PathogenRow], ctx: &LayoutContext<'_>) -> Vec<Block> {
    let lab = &data.lab;
    let p = patient(lab);
    vec![
        letterhead(Letterhead::Thai, ctx.logo),
        title("รายงานผลการทดสอบ (Laboratory report)", STYLE_SUBHEADER),
        demographics(
            vec![170.0, 170.0, 170.0],
            vec![
                vec![
                    ("Name : ", p.full_name()),
                    ("Lab No : ", or_empty(lab.case_no.as_deref())),
                    ("ID Card / PASSPORT : ", or_empty(p.id_card.as_deref())),
                    ("Organization : ", lab.hospital_name().to_string()),
                    ("Specimens : ", lab.specimen_name().to_string()),
                ],
                vec![
                    ("AGE : ", p.age_text()),
                    ("SAT ID : ", or_empty(p.sat_id.as_deref())),
                ],
                vec![
                    ("Sex : ", or_empty(p.gender.as_deref())),
                    ("HN : ", or_empty(p.hn.as_deref())),
                    ("Collect Date : ", collected(&p)),
                    ("Received Date : ", received(&p)),
                    ("Report Date : ", thai_date_of(lab.report_date)),
                ],
            ],
        ),
        pathogen_table(rows, "Remark"),
        detection_method(lab, Some("COMMENT :  ")),
        Block::Spacer { height: 70.0 },
        rule(),
        Block::Paragraph(signature_lines(&[
            ("Reported by : ", data.reporter.clone()),
            ("Approved by : ", data.approver.clone()),
        ])),
        Block::Spacer { height: 30.0 },
        Block::Paragraph(notes("remark", &GENERIC_REMARKS, STYLE_VALUE)),
    ]
}

const COVID_NOTES: [&str; 3] = [
    "1. Detected (ผลบวก พบสารพันธุกรรมเชื่อ SARs-CoV-2) เมื่อค่า Ct น้อยกว่า 40",
    "2. Not Detected (ผลลบ ไม่พบสารพันธุกรรมเชื้อ SARs-Cov-2) เมื่อค่า Ct มากกว่าหรือเท่ากับ 40",
    "3. NPS = Nasopharyngeal Swab",
];

fn covid_mp(data: &ReportData, rows: &[PathogenRow], ctx: &LayoutContext<'_>) -> Vec<Block> {
    let lab = &data.lab;
    let p = patient(lab);
    vec![
        revision_strip(TemplateVariant::CovidMp, None),
        letterhead(Letterhead::English, ctx.logo),
        title("Laboratory report", STYLE_SUBHEADER),
        title("Detection of Genetic Substances of COVID-19", STYLE_SUBHEADER),
        demographics(
            vec![200.0, 150.0, 160.0],
            vec![
                vec![
                    ("Name : ", p.full_name()),
                    ("Age : ", p.age_text()),
                    ("Organization : ", lab.hospital_name().to_string()),
                    ("Register Date : ", received(&p)),
                ],
                vec![
                    ("Lab Number : ", or_empty(lab.case_no.as_deref())),
                    ("Sex : ", or_empty(p.gender.as_deref())),
                ],
                vec![("ID : ", or_empty(p.id_card.as_deref()))],
            ],
        ),
        pathogen_table(rows, "Remark"),
        detection_method(lab, Some("Comment : ")),
        Block::Spacer { height: 30.0 },
        Block::Paragraph(notes("หมายเหตุ", &COVID_NOTES, STYLE_KEY)),
        Block::Positioned {
            x: 30.0,
            y: 750.0,
            paragraphs: vec![signature_lines(&[
                ("Reported by : ", data.reporter.clone()),
                ("Approved by : ", data.approver.clone()),
                ("Report Date : ", report_date_time(lab)),
            ])],
        },
    ]
}

const MONKEYPOX_LOD: &str = "Limit od detected (LOD): ชุดน้ำยามี limit of detected ในการตรวจหาเชื้อ Monkeypox Virus ทั้งสองสายพันธุ์เท่ากับ 200 copies/mL";

const MONKEYPOX_INTERPRETATION: [&str; 2] = [
    "- ผล Monkeypox virus; Central African clade detected หมายถึง พบสารพันธุกรรมของโรคฝีดาษวานร สายพันธุ์ Central African",
    "- ผล Monkeypox virus; West African clade detected หมายถึง พบสารพันธุกรรมของโรคฝีดาษวานร สายพันธุ์ West African",
];

fn monkeypox(data: &ReportData, rows: &[PathogenRow], ctx: &LayoutContext<'_>) -> Vec<Block> {
    let lab = &data.lab;
    let p = patient(lab);
    vec![
        revision_strip(TemplateVariant::Monkeypox, Some(lab)),
        letterhead(Letterhead::Thai, ctx.logo),
        title("รายงานผลการทดสอบ (Laboratory report)", STYLE_SUBHEADER),
        title(
            "การตรวจหาสารพันธุกรรมของโรคฝีดาษวานร (Mokeypox Virus)",
            STYLE_SUBHEADER,
        ),
        demographics(
            vec![200.0, 200.0, 110.0],
            vec![
                vec![
                    ("Name : ", p.full_name()),
                    ("Date of Birth (DOB) : ", thai_date_of(p.date_of_birth)),
                    ("Lab No : ", or_empty(lab.case_no.as_deref())),
                    ("ID Card/Passport : ", or_empty(p.id_card.as_deref())),
                    ("Specimens : ", lab.specimen_name().to_string()),
                ],
                vec![
                    ("Organization : ", lab.hospital_name().to_string()),
                    ("Age : ", years(&p)),
                    ("Collected Date : ", collected(&p)),
                    ("Received Date : ", received(&p)),
                    ("Reported Date : ", report_date_time(lab)),
                ],
                vec![("Gender : ", or_empty(p.gender.as_deref()))],
            ],
        ),
        pathogen_table(rows, "Remark"),
        Block::Paragraph(
            Paragraph::new(vec![
                Span::styled(MONKEYPOX_LOD, STYLE_VALUE),
                Span::plain("\n"),
                Span::styled(or_empty(lab.detection_method.as_deref()), STYLE_VALUE),
            ])
            .spaced(10.0),
        ),
        Block::Spacer { height: 40.0 },
        Block::Paragraph(signature_lines(&[
            ("Reported By: ", data.reporter.clone()),
            ("Approved By: ", data.approver.clone()),
        ])),
        Block::Positioned {
            x: 30.0,
            y: 750.0,
            paragraphs: vec![notes("การแปรผล", &MONKEYPOX_INTERPRETATION, STYLE_KEY)],
        },
    ]
}

fn respiratory_panel(data: &ReportData, rows: &[PathogenRow], ctx: &LayoutContext<'_>) -> Vec<Block> {
    let lab = &data.lab;
    let p = patient(lab);
    let dotted = |key: &str, name: &str, date: String| {
        Cell::new(vec![
            Span::styled(key, STYLE_KEY),
            Span::styled(name, STYLE_VALUE),
            Span::plain("\n"),
            Span::styled("Date ", STYLE_KEY),
            Span::styled(date, STYLE_VALUE),
        ])
    };
    vec![
        revision_strip(TemplateVariant::RespiratoryPanel, Some(lab)),
        letterhead(Letterhead::Thai, ctx.logo),
        title("รายงานผลการทดสอบ (Laboratory report)", STYLE_SUBHEADER),
        title(
            "การตรวจหาสารพันธุกรรมของเชื้อไวรัสและแบคทีเรียก่อโรคในระบบทางเดินหายใจ",
            STYLE_SUBHEADER,
        ),
        demographics(
            vec![127.5, 128.0, 127.5, 127.0],
            vec![
                vec![
                    ("Name : ", p.full_name()),
                    ("Organization : ", lab.hospital_name().to_string()),
                    ("Specimens : ", lab.specimen_name().to_string()),
                ],
                vec![
                    ("AGE : ", years(&p)),
                    ("Collected Date : ", collected(&p)),
                ],
                vec![
                    ("HN : ", or_empty(p.hn.as_deref())),
                    ("Recevied Date : ", received(&p)),
                ],
                vec![("Lab No : ", or_empty(lab.case_no.as_deref()))],
            ],
        ),
        pathogen_table(rows, "Ct.value"),
        detection_method(lab, Some("COMMENT :  ")),
        Block::Table(
            Table::new(vec![250.0, 280.0])
                .row(vec![
                    dotted("Reported by ......", &data.reporter, report_date_time(lab)),
                    dotted("Approved by ......", &data.approver, approve_date_time(lab)),
                ])
                .spaced(10.0),
        ),
    ]
}

const IGRA_REFERENCE_HEADER: [&str; 6] = [
    "Nil (IU/ml)",
    "TB1-Nil(IU/ml)",
    "TB2-Nil(IU/ml)",
    "Mitogen-Nil(IU/ml)",
    "QFT-Plus Result",
    "Report/Interpretation",
];

const IGRA_LOW: &str = "< 0.35 or ≥ 0.35 and\n< 25% of Nil value";
const IGRA_HIGH: &str = "≥ 0.35 and\n≥ 25% of Nil value";
const TB_LIKELY: &str = "M. tuberculosis infection likely";
const TB_UNDETERMINED: &str = "Likelihood of M. tuberculosis infection cannot be determined";

const IGRA_REFERENCE_ROWS: [[&str; 6]; 5] = [
    ["≤ 8.0", IGRA_HIGH, "Any", "Any", "Positive", TB_LIKELY],
    ["≤ 8.0", IGRA_LOW, IGRA_HIGH, "Any", "Positive", TB_LIKELY],
    ["≤ 8.0", IGRA_LOW, IGRA_LOW, "≥ 0.5", "Negative", "M. tuberculosis infection NOT likely"],
    ["≤ 8.0", IGRA_LOW, IGRA_LOW, "< 0.5", "Indeterminate", TB_UNDETERMINED],
    ["> 8.0", "Any", "Any", "Any", "Indeterminate", TB_UNDETERMINED],
];

fn igra(data: &ReportData, rows: &[PathogenRow], ctx: &LayoutContext<'_>) -> Vec<Block> {
    let lab = &data.lab;
    let p = patient(lab);
    let first = rows.first();
    let reference = IGRA_REFERENCE_ROWS.iter().fold(
        Table::new(vec![50.0, 80.0, 80.0, 100.0, 70.0, 110.0]).header(
            IGRA_REFERENCE_HEADER
                .iter()
                .map(|h| Cell::text(*h, STYLE_KEY).aligned(Align::Center).filled(HEADER_FILL))
                .collect(),
        ),
        |table, row| {
            table.row(
                row.iter()
                    .map(|v| Cell::text(*v, STYLE_VALUE).aligned(Align::Center))
                    .collect(),
            )
        },
    );
    vec![
        revision_strip(TemplateVariant::Igra, Some(lab)),
        letterhead(Letterhead::Thai, ctx.logo),
        title("รายงานผลการทดสอบ (Laboratory report)", STYLE_SUBHEADER),
        title(
            "การตรวจการติดเชื้อวัณโรคระยะแฝงด้วยวิธี Interfer Gamma Release Assay (IGRAs)",
            STYLE_SUBHEADER,
        ),
        demographics(
            vec![200.0, 200.0, 110.0],
            vec![
                vec![
                    ("Name : ", p.full_name()),
                    ("Date of Birth (DOB) : ", thai_date_of(p.date_of_birth)),
                    ("Lab NO. : ", or_empty(lab.case_no.as_deref())),
                    ("ID Card/Passport : ", or_empty(p.id_card.as_deref())),
                    ("Specimens : ", lab.specimen_name().to_string()),
                ],
                vec![
                    ("Organization : ", lab.hospital_name().to_string()),
                    ("Age : ", years(&p)),
                    ("Collected Date : ", collected(&p)),
                    ("Received Date : ", received(&p)),
                ],
                vec![("Gender : ", or_empty(p.gender.as_deref()))],
            ],
        ),
        results_table(
            &["QuantiFERON-TB Result", "Remark (IU/ml)", "Interpretation"],
            vec![170.0, 170.0, 170.0],
            vec![vec![
                first.map(|r| r.result.clone()).unwrap_or_default(),
                first.map(|r| r.remark.clone()).unwrap_or_default(),
                result_label(lab),
            ]],
        ),
        detection_method(lab, None),
        Block::Paragraph(Paragraph::text("หมายเหตุ (ค่าอ้างอิงการรายงานผล)", STYLE_KEY)),
        Block::Table(reference.lines(TableLines::Grid).spaced(20.0)),
        Block::Table(
            Table::new(vec![220.0, 220.0])
                .row(vec![
                    key_values(&[("Reported By : ", data.reporter.clone())]),
                    key_values(&[("Approved By : ", data.approver.clone())]),
                ])
                .row(vec![
                    key_values(&[("Reported Date : ", report_date_time(lab))]),
                    key_values(&[("Approved Date : ", approve_date_time(lab))]),
                ]),
        ),
    ]
}

fn immunology(data: &ReportData, rows: &[PathogenRow], ctx: &LayoutContext<'_>) -> Vec<Block> {
    let lab = &data.lab;
    let p = patient(lab);
    let sex = thai_sex(p.gender.as_deref());
    let method = or_empty(lab.detection_method.as_deref());
    vec![
        letterhead(Letterhead::English, ctx.logo),
        title("รายงานผลการทดสอบ (Laboratory report)", STYLE_SUBHEADER),
        demographics(
            vec![170.0, 250.0, 170.0],
            vec![
                vec![
                    ("Name : ", p.full_name()),
                    ("Age : ", p.age_text()),
                    ("Sex : ", sex.to_string()),
                ],
                vec![
                    ("HN : ", or_empty(p.hn.as_deref())),
                    ("Request By : ", data.reporter.clone()),
                    ("Receive By : ", String::new()),
                ],
                vec![
                    ("Order Department : ", String::new()),
                    ("Visit Type : ", or_empty(p.visit_type.as_deref())),
                    ("Receive Time : ", received(&p)),
                ],
            ],
        ),
        results_table(
            &["Parameter", "Result", "Reference Range", "Method"],
            vec![127.5, 127.5, 127.5, 127.5],
            rows.iter()
                .map(|r| vec![r.name.clone(), r.result.clone(), method.clone(), String::new()])
                .collect(),
        ),
        Block::Paragraph(Paragraph::new(labelled("Lab note: ", result_label(lab))).spaced(30.0)),
        Block::Table(
            Table::new(vec![255.0, 255.0])
                .row(vec![
                    key_values(&[("Reported by: ", data.reporter.clone())]),
                    key_values(&[("Date: ", report_date_time(lab))]),
                ])
                .row(vec![
                    key_values(&[("Approved by: ", data.approver.clone())]),
                    key_values(&[("Date: ", approve_date_time(lab))]),
                ]),
        ),
        revision_strip(TemplateVariant::Immunology, Some(lab)),
    ]
}
