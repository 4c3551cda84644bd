//! Lab report generation: choosing a form, collecting its fields, laying it
//! out and rendering it.

pub mod assets;
pub mod document;
pub mod fields;
pub mod layout;
pub mod panel;
pub mod render;
pub mod template;

pub use document::DocumentDescription;
pub use fields::{PathogenRow, ReportData};
pub use render::{DocumentRenderer, PdfRenderer, RenderError};
pub use template::TemplateVariant;
