//! Survey question records kept in the question store.

use serde::{Deserialize, Serialize};

/// A survey question as persisted to `preguntas.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier of the form `q<n>`
    pub id: String,
    pub texto: String,
    /// Answer widget kind, e.g. `opciones`, `checkbox`, `texto`
    pub tipo: String,
    /// Comma separated choices, empty for free-text questions
    #[serde(default)]
    pub opciones: String,
}

/// Client-supplied fields for creating or replacing a question.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionDraft {
    pub texto: Option<String>,
    pub tipo: Option<String>,
    pub opciones: Option<String>,
}

impl Question {
    /// Numeric suffix of the id, used to allocate the next one
    pub fn sequence(&self) -> Option<u64> {
        self.id.strip_prefix('q').and_then(|n| n.parse().ok())
    }
}
