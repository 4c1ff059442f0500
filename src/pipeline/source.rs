//! CSV record source for location ingestion.

use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder};
use thiserror::Error;

use crate::models::RawRecord;

/// Source-level failures. Any of these aborts the rebuild that hit it.
#[derive(Debug, Error)]
pub enum RecordSourceError {
    #[error("location source not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read location source {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV header: {0}")]
    Header(#[from] csv::Error),
}

/// A row that could not be turned into a `RawRecord`
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRow {
    pub raw: String,
    pub reason: String,
}

/// One data row, numbered from 1 in source order
#[derive(Debug)]
pub struct SourceRow {
    pub row: usize,
    pub record: Result<RawRecord, MalformedRow>,
}

impl SourceRow {
    pub fn new(row: usize, record: RawRecord) -> Self {
        Self {
            row,
            record: Ok(record),
        }
    }
}

/// The whole CSV file held in memory, ready to be iterated row by row.
pub struct CsvSource {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl CsvSource {
    pub async fn open(path: &Path) -> Result<Self, RecordSourceError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RecordSourceError::NotFound(path.to_path_buf())
            } else {
                RecordSourceError::Read {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            bytes,
        })
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: PathBuf::from("<memory>"),
            bytes: bytes.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Iterate data rows. Fails only if the header row itself is unreadable.
    pub fn rows(&self) -> Result<SourceRows<'_>, RecordSourceError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(self.bytes.as_slice());

        let headers = reader.byte_headers()?.clone();

        Ok(SourceRows {
            reader,
            headers,
            row: 0,
        })
    }
}

/// Streaming iterator over CSV data rows
pub struct SourceRows<'a> {
    reader: csv::Reader<&'a [u8]>,
    headers: ByteRecord,
    row: usize,
}

impl Iterator for SourceRows<'_> {
    type Item = SourceRow;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = ByteRecord::new();
        let read = self.reader.read_byte_record(&mut record);
        self.row += 1;

        let parsed = match read {
            Ok(false) => return None,
            Ok(true) => record
                .deserialize::<RawRecord>(Some(&self.headers))
                .map_err(|e| MalformedRow {
                    raw: raw_content(&record),
                    reason: e.to_string(),
                }),
            Err(e) => Err(MalformedRow {
                raw: raw_content(&record),
                reason: e.to_string(),
            }),
        };

        Some(SourceRow {
            row: self.row,
            record: parsed,
        })
    }
}

fn raw_content(record: &ByteRecord) -> String {
    record
        .iter()
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_numbered_from_one() {
        let source = CsvSource::from_bytes(
            "id,nombre,geometry\nr1,Uno,POINT (1 2)\nr2,Dos,POINT (3 4)\n",
        );
        let rows: Vec<SourceRow> = source.rows().unwrap().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row, 1);
        assert_eq!(rows[1].row, 2);
        assert_eq!(rows[1].record.as_ref().unwrap().id.as_deref(), Some("r2"));
    }

    #[test]
    fn test_short_rows_are_tolerated() {
        let source = CsvSource::from_bytes("id,nombre,geometry\nr1\n");
        let rows: Vec<SourceRow> = source.rows().unwrap().collect();
        let record = rows[0].record.as_ref().unwrap();
        assert_eq!(record.id.as_deref(), Some("r1"));
        assert_eq!(record.geometry, None);
    }

    #[test]
    fn test_invalid_utf8_row_is_malformed_not_fatal() {
        let mut bytes = b"id,geometry\n".to_vec();
        bytes.extend_from_slice(b"\xff\xfe,POINT (1 2)\n");
        bytes.extend_from_slice(b"r2,POINT (3 4)\n");

        let source = CsvSource::from_bytes(bytes);
        let rows: Vec<SourceRow> = source.rows().unwrap().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].record.is_err());
        assert!(rows[1].record.is_ok());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvSource::open(&dir.path().join("arca_data.csv"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, RecordSourceError::NotFound(_)));
    }
}
