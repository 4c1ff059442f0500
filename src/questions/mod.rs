//! JSON-file-backed question store.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::models::{Question, QuestionDraft};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuestionError {
    #[error("Texto y tipo de pregunta son requeridos.")]
    MissingFields,

    #[error("Pregunta no encontrada.")]
    NotFound(String),
}

struct Inner {
    questions: Vec<Question>,
    next_id: u64,
}

impl Inner {
    fn new(questions: Vec<Question>) -> Self {
        let next_id = questions.iter().filter_map(Question::sequence).max().unwrap_or(0) + 1;
        Self { questions, next_id }
    }
}

/// Questions held in memory and written back to disk after every change.
///
/// Write failures are logged; the in-memory change is kept.
pub struct QuestionStore {
    path: PathBuf,
    inner: RwLock<Inner>,
}

impl QuestionStore {
    /// Load from `path`, falling back to the default questions when the file
    /// is missing, empty or unreadable (the defaults are then written out).
    pub async fn load(path: &Path) -> Self {
        let loaded = match tokio::fs::read_to_string(path).await {
            Ok(text) => match serde_json::from_str::<Vec<Question>>(&text) {
                Ok(questions) if !questions.is_empty() => {
                    info!("Loaded {} questions from {}", questions.len(), path.display());
                    Some(questions)
                }
                Ok(_) => {
                    info!("{} is empty, using default questions", path.display());
                    None
                }
                Err(e) => {
                    error!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("{} does not exist, creating it with default questions", path.display());
                None
            }
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                None
            }
        };

        let needs_save = loaded.is_none();
        let store = Self {
            path: path.to_path_buf(),
            inner: RwLock::new(Inner::new(loaded.unwrap_or_else(default_questions))),
        };

        if needs_save {
            let questions = store.list().await;
            store.save(&questions).await;
        }
        store
    }

    pub async fn list(&self) -> Vec<Question> {
        self.inner.read().await.questions.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Question> {
        self.inner
            .read()
            .await
            .questions
            .iter()
            .find(|q| q.id == id)
            .cloned()
    }

    pub async fn create(&self, draft: QuestionDraft) -> Result<Question, QuestionError> {
        let texto = required(draft.texto)?;
        let tipo = required(draft.tipo)?;

        let mut inner = self.inner.write().await;
        let question = Question {
            id: format!("q{}", inner.next_id),
            texto,
            tipo,
            opciones: draft.opciones.unwrap_or_default(),
        };
        inner.next_id += 1;
        inner.questions.push(question.clone());
        self.save(&inner.questions).await;

        Ok(question)
    }

    /// Replace a question's fields; absent `texto`/`tipo` keep their values.
    pub async fn update(&self, id: &str, draft: QuestionDraft) -> Result<Question, QuestionError> {
        let mut inner = self.inner.write().await;
        let question = inner
            .questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| QuestionError::NotFound(id.to_string()))?;

        if let Some(texto) = draft.texto {
            question.texto = texto;
        }
        if let Some(tipo) = draft.tipo {
            question.tipo = tipo;
        }
        question.opciones = draft.opciones.unwrap_or_default();

        let updated = question.clone();
        self.save(&inner.questions).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), QuestionError> {
        let mut inner = self.inner.write().await;
        let before = inner.questions.len();
        inner.questions.retain(|q| q.id != id);
        if inner.questions.len() == before {
            return Err(QuestionError::NotFound(id.to_string()));
        }
        self.save(&inner.questions).await;
        Ok(())
    }

    async fn save(&self, questions: &[Question]) {
        let json = match serde_json::to_string_pretty(questions) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize questions: {}", e);
                return;
            }
        };
        match tokio::fs::write(&self.path, json).await {
            Ok(()) => info!("Questions saved to {}", self.path.display()),
            Err(e) => error!("Failed to save questions to {}: {}", self.path.display(), e),
        }
    }
}

fn required(value: Option<String>) -> Result<String, QuestionError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(QuestionError::MissingFields)
}

fn default_questions() -> Vec<Question> {
    let question = |id: &str, texto: &str, tipo: &str, opciones: &str| Question {
        id: id.to_string(),
        texto: texto.to_string(),
        tipo: tipo.to_string(),
        opciones: opciones.to_string(),
    };

    vec![
        question("q1", "¿Cuál es tu color favorito?", "opciones", "Rojo, Azul, Verde, Amarillo"),
        question(
            "q2",
            "¿Qué servicios ofrecemos?",
            "checkbox",
            "Desarrollo Web, Diseño Gráfico, Consultoría SEO",
        ),
        question("q3", "Por favor, describe tu problema.", "texto", ""),
    ]
}
