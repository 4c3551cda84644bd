//! Choosing the report layout for a lab case.
//!
//! The machine attached to a case doubles as the report form to print. Its
//! display name starts with a form code such as `FM 02-001(C)`, followed by a
//! free-text label. Only the code is significant for layout selection, so a
//! machine can be relabelled without changing the report it produces.

use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateVariant {
    CovidMp,
    Monkeypox,
    RespiratoryPanel,
    Igra,
    Immunology,
    Generic,
}

/// Form code → layout. Anything not listed prints with the generic layout.
const FORM_CODES: [(&str, TemplateVariant); 5] = [
    ("FM 02-001(C)", TemplateVariant::CovidMp),
    ("FM 02-015(B)", TemplateVariant::Monkeypox),
    ("FM 02-007(A)", TemplateVariant::RespiratoryPanel),
    ("FM 02-000(A)", TemplateVariant::Igra),
    ("FM 02-005(A)", TemplateVariant::Immunology),
];

impl TemplateVariant {
    /// Layout for a machine display name; `None` or an unknown code yields
    /// `Generic`.
    pub fn select(machine_name: Option<&str>) -> Self {
        machine_name
            .and_then(form_code)
            .and_then(|code| {
                FORM_CODES
                    .iter()
                    .find(|(known, _)| *known == code)
                    .map(|(_, variant)| *variant)
            })
            .unwrap_or(TemplateVariant::Generic)
    }

    /// Form code printed in the revision strip, if the layout has one.
    pub fn form_code(self) -> Option<&'static str> {
        FORM_CODES
            .iter()
            .find(|(_, variant)| *variant == self)
            .map(|(code, _)| *code)
    }

    pub fn name(self) -> &'static str {
        match self {
            TemplateVariant::CovidMp => "COVID-19-MP",
            TemplateVariant::Monkeypox => "Monkeypox",
            TemplateVariant::RespiratoryPanel => "Respiratory-Pathogen-Panel",
            TemplateVariant::Igra => "IGRA",
            TemplateVariant::Immunology => "Immunology",
            TemplateVariant::Generic => "Generic",
        }
    }
}

impl fmt::Display for TemplateVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Leading form code of a machine name, up to and including the first `)`.
pub fn form_code(machine_name: &str) -> Option<&str> {
    let trimmed = machine_name.trim_start();
    let end = trimmed.find(')')?;
    Some(trimmed[..=end].trim_end())
}
