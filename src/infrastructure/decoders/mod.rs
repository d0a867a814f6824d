// ============================================================
// ROW DECODERS
// ============================================================
// Turn a raw payload into rows of named text fields

mod csv_decoder;
mod xlsx_decoder;

pub use csv_decoder::CsvDecoder;
pub use xlsx_decoder::XlsxDecoder;

use crate::domain::dataset::{InputFormat, Row};
use crate::domain::error::Result;

/// Decode `payload` as `format`. An input with a header and no data rows
/// yields an empty vector.
pub fn decode(format: InputFormat, payload: &[u8]) -> Result<Vec<Row>> {
    match format {
        InputFormat::Delimited => CsvDecoder::new().decode(payload),
        InputFormat::Spreadsheet => XlsxDecoder::new().decode(payload),
    }
}
