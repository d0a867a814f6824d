// ============================================================
// XLSX DECODER
// ============================================================
// First worksheet of a workbook, first row as header

use std::io::Cursor;

use calamine::{Data, DataType, Range, Reader, Xlsx};
use tracing::debug;

use crate::domain::dataset::Row;
use crate::domain::error::{AppError, Result};

/// Spreadsheet decoder. Only the first sheet is read.
#[derive(Default)]
pub struct XlsxDecoder;

impl XlsxDecoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(&self, payload: &[u8]) -> Result<Vec<Row>> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(payload))
            .map_err(|e| AppError::Decode(format!("Failed to open Excel workbook: {}", e)))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::Decode("No worksheet found".to_string()))?
            .map_err(|e| AppError::Decode(format!("Failed to read Excel range: {}", e)))?;

        let rows = Self::rows_from_range(&range);

        debug!(
            rows = rows.len(),
            sheet_width = range.width(),
            "Decoded spreadsheet payload"
        );

        Ok(rows)
    }

    /// Header from the first row; rows whose cells are all empty are skipped.
    fn rows_from_range(range: &Range<Data>) -> Vec<Row> {
        let mut sheet_rows = range.rows();
        let Some(header_cells) = sheet_rows.next() else {
            return Vec::new();
        };

        let headers: Vec<String> = header_cells
            .iter()
            .map(|cell| cell_to_string(cell).trim().to_string())
            .collect();

        sheet_rows
            .filter(|cells| cells.iter().any(|cell| !cell.is_empty()))
            .map(|cells| {
                headers
                    .iter()
                    .zip(cells.iter())
                    .map(|(header, cell)| (header.clone(), cell_to_string(cell)))
                    .collect()
            })
            .collect()
    }
}

/// Stringify a cell the same way for every sheet so numeric parsing stays
/// in the profiler. Error cells become empty text.
pub(crate) fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        other => other
            .as_string()
            .unwrap_or_else(|| format!("{}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::CompressionMethod;

    /// Minimal single-sheet workbook with inline string cells
    fn build_xlsx(sheet_rows: &[Vec<&str>]) -> Vec<u8> {
        fn column_letter(index: usize) -> char {
            (b'A' + index as u8) as char
        }

        let mut sheet_data = String::new();
        for (r, cells) in sheet_rows.iter().enumerate() {
            sheet_data.push_str(&format!("<row r=\"{}\">", r + 1));
            for (c, value) in cells.iter().enumerate() {
                let reference = format!("{}{}", column_letter(c), r + 1);
                if value.parse::<f64>().is_ok() {
                    sheet_data.push_str(&format!("<c r=\"{}\"><v>{}</v></c>", reference, value));
                } else {
                    sheet_data.push_str(&format!(
                        "<c r=\"{}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                        reference, value
                    ));
                }
            }
            sheet_data.push_str("</row>");
        }

        let files = [
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#
                    .to_string(),
            ),
            (
                "_rels/.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
                    .to_string(),
            ),
            (
                "xl/workbook.xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#
                    .to_string(),
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#
                    .to_string(),
            ),
            (
                "xl/worksheets/sheet1.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
                    sheet_data
                ),
            ),
        ];

        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options: FileOptions<'_, ()> =
                FileOptions::default().compression_method(CompressionMethod::Stored);
            for (name, content) in files.iter() {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_decode_first_sheet_with_header() {
        let payload = build_xlsx(&[
            vec!["region", "revenue"],
            vec!["north", "10"],
            vec!["south", "20.5"],
        ]);

        let rows = XlsxDecoder::new().decode(&payload).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["region"], "north");
        assert_eq!(rows[0]["revenue"], "10");
        assert_eq!(rows[1]["revenue"], "20.5");
    }

    #[test]
    fn test_header_only_sheet() {
        let payload = build_xlsx(&[vec!["region", "revenue"]]);
        let rows = XlsxDecoder::new().decode(&payload).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_garbage_payload_is_decode_error() {
        let result = XlsxDecoder::new().decode(b"definitely not a zip archive");
        assert!(matches!(result, Err(AppError::Decode(_))));
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Float(10.0)), "10");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
        assert_eq!(cell_to_string(&Data::String("abc".to_string())), "abc");
        assert_eq!(cell_to_string(&Data::Bool(true)), "true");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }
}
