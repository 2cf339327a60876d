//! CSV record source
//!
//! Turns raw CSV text into [`Record`]s keyed by the header row. Records come
//! out lazily and in file order; deduplication relies on that order.

use tracing::debug;

use super::models::Record;
use crate::error::{EtlError, Result};

/// Lazy, single-pass iterator over the records of a CSV document
pub struct CsvRecordSource<'a> {
    headers: Vec<String>,
    rows: csv::StringRecordsIntoIter<&'a [u8]>,
}

impl<'a> CsvRecordSource<'a> {
    /// Read the header row of `content` using `,` as delimiter
    pub fn new(content: &'a str) -> Result<Self> {
        Self::with_delimiter(content, b',')
    }

    pub fn with_delimiter(content: &'a str, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        if headers.iter().all(String::is_empty) {
            return Err(EtlError::parse("missing header row"));
        }

        debug!(columns = headers.len(), "Read CSV header");

        Ok(Self {
            headers,
            rows: reader.into_records(),
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Drain the source, failing on the first malformed row
    pub fn collect_records(self) -> Result<Vec<Record>> {
        self.collect()
    }
}

impl Iterator for CsvRecordSource<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        Some(
            row.map_err(EtlError::from).map(|row| {
                self.headers
                    .iter()
                    .zip(row.iter())
                    .map(|(h, v)| (h.as_str(), v))
                    .collect()
            }),
        )
    }
}
