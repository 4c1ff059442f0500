//! Append-only sink for classified survey answers.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{Category, Classification};

#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("failed to write survey log: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode survey record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One persisted line
#[derive(Debug, Clone, Serialize)]
pub struct SurveyRecord {
    pub recorded_at: DateTime<Utc>,
    pub question_id: String,
    pub answer: String,
    pub keywords: Vec<String>,
    pub categories: Vec<Category>,
}

impl SurveyRecord {
    pub fn new(question_id: &str, answer: &str, classification: &Classification) -> Self {
        Self {
            recorded_at: Utc::now(),
            question_id: question_id.to_string(),
            answer: answer.to_string(),
            keywords: classification.detected_keywords.clone(),
            categories: classification.categories.clone(),
        }
    }
}

/// JSON lines file; appends are serialized so lines never interleave
pub struct SurveySink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SurveySink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, records: &[SurveyRecord]) -> Result<(), SurveyError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut buf = Vec::new();
        for record in records {
            serde_json::to_writer(&mut buf, record)?;
            buf.push(b'\n');
        }

        let _guard = self.lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&buf).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::classify;

    #[tokio::test]
    async fn test_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let sink = SurveySink::new(dir.path().join("respuestas.jsonl"));

        let classification = classify("Excelente servicio");
        let record = SurveyRecord::new("q12", "Excelente servicio", &classification);
        sink.append(&[record.clone()]).await.unwrap();
        sink.append(&[record]).await.unwrap();
        sink.append(&[]).await.unwrap();

        let content = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["question_id"], "q12");
        assert_eq!(value["keywords"][0], "excelente");
        assert_eq!(value["categories"][0], "satisfaccion");
    }
}
