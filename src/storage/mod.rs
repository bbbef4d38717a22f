use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;
use tracing::info;

use crate::error::{Result, ScraperError};
use crate::scraper::article::ArticleRecord;

const SHEET_NAME: &str = "News";

/// Write all records to the workbook at `path`, sheet "News": a bold
/// header row plus one row per record, columns in record field order.
/// An existing workbook at the same path is replaced outright.
pub fn save_records(records: &[ArticleRecord], path: &Path) -> Result<()> {
    write_workbook(records, path).map_err(|e| ScraperError::SaveToExcelFailed(e.to_string()))?;
    info!("Saved {} record(s) to Excel workbook at {:?}", records.len(), path);
    Ok(())
}

fn write_workbook(records: &[ArticleRecord], path: &Path) -> std::result::Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let header_format = Format::new().set_bold();
    for (col, header) in ArticleRecord::column_headers().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, &record.title)?;
        worksheet.write_string(row, 1, &record.date)?;
        worksheet.write_string(row, 2, &record.description)?;
        worksheet.write_string(row, 3, &record.image_name)?;
        worksheet.write_number(row, 4, record.search_phrase_count as f64)?;
        worksheet.write_boolean(row, 5, record.contains_money)?;
        worksheet.write_string(row, 6, &record.news_url)?;
    }

    workbook.save(path)?;
    Ok(())
}
