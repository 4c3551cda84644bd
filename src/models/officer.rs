use serde::{Deserialize, Serialize};

use crate::utils::join_words;

pub const UNKNOWN_OFFICER: &str = "Unknown";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Officer {
    pub id: i32,
    pub title_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Officer {
    pub fn full_name(&self) -> String {
        join_words([
            self.title_name.as_deref().unwrap_or_default(),
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default(),
        ])
    }
}

/// Name printed in a signature line. A missing officer, or one whose name
/// parts are all blank, prints as "Unknown".
pub fn display_name(officer: Option<&Officer>) -> String {
    match officer.map(Officer::full_name) {
        Some(name) if !name.is_empty() => name,
        _ => UNKNOWN_OFFICER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn officer(title: &str, first: &str, last: &str) -> Officer {
        Officer {
            id: 1,
            title_name: Some(title.into()),
            first_name: Some(first.into()),
            last_name: Some(last.into()),
        }
    }

    #[test]
    fn joins_title_and_names() {
        let o = officer("นางสาว", "Malee", "Suksan");
        assert_eq!(display_name(Some(&o)), "นางสาว Malee Suksan");
    }

    #[test]
    fn blank_title_does_not_leave_double_space() {
        let o = officer("", "Malee", "Suksan");
        assert_eq!(display_name(Some(&o)), "Malee Suksan");
    }

    #[test]
    fn missing_or_blank_officer_is_unknown() {
        assert_eq!(display_name(None), UNKNOWN_OFFICER);
        let blank = officer(" ", "", "");
        assert_eq!(display_name(Some(&blank)), UNKNOWN_OFFICER);
    }
}
