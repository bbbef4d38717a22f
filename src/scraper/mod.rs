pub mod article;
pub mod extract;
pub mod images;
pub mod pagination;
pub mod site;
pub mod text;

pub use article::{ArticleRecord, SearchConfig, NOT_AVAILABLE};
pub use extract::Extraction;
pub use site::NewsScraper;

use std::path::Path;
use tracing::{error, info, warn};

use crate::browser::BrowserSession;
use crate::config::Config;
use crate::error::Result;
use crate::storage;
use crate::workitems::{self, WorkItem, WorkItemWriter};

/// Process every input work item in order. A failed item is reported and
/// the run moves on to the next one.
pub async fn process_work_items(config: &Config) -> Result<()> {
    let items = workitems::load_work_items(&config.workitems.input_file)?;
    let writer = WorkItemWriter::new(config.workitems_output_path());

    info!("Processing {} work item(s)", items.len());
    for item in items {
        match run_single_item(config, &item, &writer).await {
            Ok(count) => {
                writer.mark_done(item.id)?;
                info!("Work item {} done, {} article(s) extracted", item.id, count);
            }
            Err(e) => {
                error!("Work item {} failed [{}]: {}", item.id, e.code(), e);
                writer.report_failure(item.id, &e)?;
            }
        }
    }
    Ok(())
}

/// One full scrape for one work item: fresh browser session, search,
/// sort, paginate, extract, then both output sinks.
async fn run_single_item(
    config: &Config,
    item: &WorkItem,
    writer: &WorkItemWriter,
) -> Result<usize> {
    let search = SearchConfig::from_payload(&item.payload);
    info!(
        "Configured scraper with search_phrase: '{}' and max_results: {}",
        search.search_phrase, search.max_results
    );

    let session = BrowserSession::launch(
        config.browser.headless,
        config.wait_timeout(),
        config.poll_interval(),
    )
    .await?;
    let scraper = NewsScraper::new(
        session,
        search,
        config.site.base_url.clone(),
        config.output.directory.clone(),
    );

    let outcome = scrape(&scraper).await;
    let extraction = match outcome {
        Ok(extraction) => extraction,
        Err(e) => {
            // best-effort close so a failed item does not leak a browser
            if let Err(close_err) = scraper.close().await {
                warn!("Browser cleanup after failure also failed: {}", close_err);
            }
            return Err(e);
        }
    };

    // per-entry failures were swallowed during extraction; surface them
    // to the work item system without failing the item
    for entry_err in &extraction.errors {
        writer.report_error(item.id, entry_err)?;
    }

    deliver_records(&extraction.records, writer, &config.excel_path())?;
    scraper.close().await?;

    Ok(extraction.records.len())
}

/// Fan one record list out to both sinks: one emitted output item per
/// record, in record order, then the same list into the workbook.
fn deliver_records(
    records: &[ArticleRecord],
    writer: &WorkItemWriter,
    excel_path: &Path,
) -> Result<()> {
    for record in records {
        writer.emit_output(record)?;
        info!("Work item created for news: {}", record.title);
    }

    ensure_parent_dir(excel_path)?;
    storage::save_records(records, excel_path)
}

async fn scrape(scraper: &NewsScraper) -> Result<Extraction> {
    scraper.open_site().await?;
    scraper.dismiss_cookie_banner().await;
    scraper.initiate_search().await?;
    scraper.search_news().await?;
    scraper.filter_and_sort().await?;
    scraper.ensure_loaded().await?;
    scraper.extract_articles().await
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workitems::OutputLine;
    use tempfile::tempdir;

    fn record(title: &str) -> ArticleRecord {
        ArticleRecord {
            title: title.to_string(),
            date: "N/A".to_string(),
            description: "desc".to_string(),
            image_name: "N/A".to_string(),
            search_phrase_count: 1,
            contains_money: false,
            news_url: format!("https://example.com/{}", title),
        }
    }

    #[test]
    fn test_both_sinks_receive_identical_record_sequence() {
        let temp_dir = tempdir().unwrap();
        let writer = WorkItemWriter::new(temp_dir.path().join("work-items-output.json"));
        let excel_path = temp_dir.path().join("task_extracted.xlsx");

        let records = vec![record("first"), record("second"), record("third")];
        deliver_records(&records, &writer, &excel_path).unwrap();

        // the workbook got written from the same list...
        assert!(excel_path.exists());

        // ...and every record came back out of the queue, in order,
        // field for field
        let emitted: Vec<ArticleRecord> = writer
            .read_lines()
            .unwrap()
            .into_iter()
            .filter_map(|line| match line {
                OutputLine::Output { payload, .. } => Some(payload),
                _ => None,
            })
            .collect();
        assert_eq!(emitted, records);
    }
}
