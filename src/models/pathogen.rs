use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Pathogen {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl Pathogen {
    pub fn new(id: i32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: None,
        }
    }
}
