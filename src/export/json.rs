//! JSON rendering of the export document.

use crate::BenchResult;
use crate::core::schema::ExportDocument;

/// Render `doc` as pretty-printed UTF-8 JSON.
pub fn to_json(doc: &ExportDocument) -> BenchResult<Vec<u8>> {
    let mut json = serde_json::to_vec_pretty(doc)?;
    json.push(b'\n');
    Ok(json)
}
