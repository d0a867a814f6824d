// ============================================================
// CSV DECODER
// ============================================================
// Delimited text with a header row, delimiter auto-detection

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::domain::dataset::Row;
use crate::domain::error::{AppError, Result};

/// Delimited-text decoder
pub struct CsvDecoder {
    /// Fixed delimiter; detected from the content when unset
    delimiter: Option<u8>,

    /// Whether to trim whitespace from headers and values
    trim: bool,
}

impl Default for CsvDecoder {
    fn default() -> Self {
        Self {
            delimiter: None,
            trim: true,
        }
    }
}

impl CsvDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed delimiter instead of detecting one
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Decode raw bytes. A UTF-8 BOM is dropped and invalid sequences are
    /// replaced rather than rejected.
    pub fn decode(&self, payload: &[u8]) -> Result<Vec<Row>> {
        let (content, _, had_errors) = encoding_rs::UTF_8.decode(payload);
        if had_errors {
            debug!("CSV payload contained invalid UTF-8, decoded lossily");
        }
        self.decode_str(&content)
    }

    pub fn decode_str(&self, content: &str) -> Result<Vec<Row>> {
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| Self::detect_delimiter(content));

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::Decode(format!("Failed to read CSV headers: {}", e)))?
            .clone();

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::Decode(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            rows.push(Self::to_row(&headers, &record));
        }

        debug!(
            rows = rows.len(),
            columns = headers.len(),
            delimiter = %(delimiter as char).escape_default(),
            "Decoded delimited payload"
        );

        Ok(rows)
    }

    /// Cells past the end of a short record are left out of the row.
    fn to_row(headers: &StringRecord, record: &StringRecord) -> Row {
        headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect()
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe).
    /// Only separators outside quoted spans count, and a candidate must
    /// split the header line.
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];
        let sample_lines: Vec<&str> = content.lines().take(10).collect();

        let Some(header) = sample_lines.first() else {
            return b',';
        };

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        for &delimiter in &candidates {
            if count_unquoted(header, delimiter) == 0 {
                continue;
            }

            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| count_unquoted(line, delimiter))
                .collect();

            // Score by consistency (low standard deviation) and frequency
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;

            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }
}

/// Occurrences of `delimiter` outside double-quoted spans of one line.
fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for byte in line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
        } else if byte == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_simple_csv() {
        let rows = CsvDecoder::new()
            .decode(b"name,age,city\nAlice,30,NYC\nBob,25,LA")
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[0]["name"], "Alice");
        assert_eq!(rows[1]["age"], "25");
        let columns: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["name", "age", "city"]);
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let rows = CsvDecoder::new().decode(b"amt,label\n").unwrap();
        assert!(rows.is_empty());

        let rows = CsvDecoder::new().decode(b"").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_quoted_fields_and_bom() {
        let payload = "\u{feff}city,amount\n\"Portland, OR\",\"1,5\"\nSalem,2\n";
        let rows = CsvDecoder::new().with_delimiter(b',').decode(payload.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains_key("city"));
        assert_eq!(rows[0]["city"], "Portland, OR");
        assert_eq!(rows[0]["amount"], "1,5");
    }

    #[test]
    fn test_short_rows_leave_cells_absent() {
        let rows = CsvDecoder::new().decode(b"a,b,c\n1,2,3\n4\n").unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("a").map(String::as_str), Some("4"));
        assert!(rows[1].get("b").is_none());
    }

    #[test]
    fn test_semicolon_file() {
        let rows = CsvDecoder::new()
            .decode(b"item;price\nbolt;0,5\nnut;1\n")
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["price"], "1");
    }

    #[test]
    fn test_quoted_separators_do_not_win_detection() {
        let payload = b"amt,tags\n10,\"a|b|c|d|e|f|g|h\"\n20,\"a|b|c|d|e|f|g|h\"\n";
        let rows = CsvDecoder::new().decode(payload).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["amt"], "10");
        assert_eq!(rows[1]["tags"], "a|b|c|d|e|f|g|h");

        let rows = CsvDecoder::new()
            .decode(b"id,note\n1,\"x;y;z;w\"\n2,\"p;q;r;s\"\n")
            .unwrap();
        assert_eq!(rows[1]["note"], "p;q;r;s");
    }

    #[test]
    fn test_detection_requires_header_separator() {
        // pipes only in data lines cannot split the single-column header
        assert_eq!(CsvDecoder::detect_delimiter("amt\n1|2\n3|4"), b',');
        assert_eq!(count_unquoted("a,\"b,c\",d", b','), 2);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(CsvDecoder::detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(CsvDecoder::detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(CsvDecoder::detect_delimiter("a\tb\nc\td"), b'\t');
        assert_eq!(CsvDecoder::detect_delimiter("amt\n10\n20"), b',');
    }

    #[test]
    fn test_values_are_trimmed() {
        let rows = CsvDecoder::new().decode(b"amt , note\n 10 , hello \n").unwrap();
        assert_eq!(rows[0]["amt"], "10");
        assert_eq!(rows[0]["note"], "hello");

        let rows = CsvDecoder::new()
            .with_trim(false)
            .decode(b"amt\n 10 \n")
            .unwrap();
        assert_eq!(rows[0]["amt"], " 10 ");
    }
}
