//! JSON document output
//!
//! The document is an array with one entry per category, each an array of
//! product objects, in crawl order.

use crate::catalog::CrawlResult;
use crate::output::OutputResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes the crawl result to `output_path`
///
/// # Arguments
///
/// * `result` - The crawl result
/// * `output_path` - Path where the JSON document should be written
/// * `pretty` - Indent the document for human readers
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the document
/// * `Err(OutputError)` - Failed to serialize or write
pub fn write_json(result: &CrawlResult, output_path: &Path, pretty: bool) -> OutputResult<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);

    if pretty {
        serde_json::to_writer_pretty(&mut writer, result)?;
    } else {
        serde_json::to_writer(&mut writer, result)?;
    }
    writer.flush()?;

    Ok(())
}

/// Serializes the crawl result to a string
pub fn to_json_string(result: &CrawlResult, pretty: bool) -> OutputResult<String> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}
