//! Flat demand lists.
//!
//! The second upstream shape: demand records already carrying their planned
//! order id, either as a JSON array or as a CSV export with a header row.
//!
//! ```text
//! materialNumber;quantity;plannedOrderId;reservationNumber
//! 123456701;2;VH_0001;4711
//! 123456701;3;VH_0001;
//! ```

use serde::Deserialize;
use serde_json::Value;
use std::io::Read;
use std::path::Path;

use crate::error::PayloadResult;
use crate::models::{DemandRecord, Passthrough};

/// Read a JSON array of demand records.
pub fn parse_demand_json(value: Value) -> PayloadResult<Vec<DemandRecord>> {
    Ok(serde_json::from_value(value)?)
}

/// One row of a CSV demand export.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvDemandRow {
    material_number: String,
    quantity: u64,
    planned_order_id: String,
    #[serde(default)]
    reservation_number: Option<String>,
    #[serde(default)]
    reservation_item: Option<String>,
    #[serde(default)]
    item_category: Option<String>,
    #[serde(default)]
    pegged_requirement: Option<String>,
    #[serde(default)]
    material_group_top_level: Option<String>,
}

impl From<CsvDemandRow> for DemandRecord {
    fn from(row: CsvDemandRow) -> Self {
        DemandRecord::new(row.material_number, row.quantity, row.planned_order_id).with_passthrough(
            Passthrough {
                reservation_number: row.reservation_number,
                reservation_item: row.reservation_item,
                item_category: row.item_category,
                pegged_requirement: row.pegged_requirement,
                material_group_top_level: row.material_group_top_level,
            },
        )
    }
}

/// Detect the delimiter by counting occurrences in the header line.
pub fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");

    let mut best = b';';
    let mut best_count = 0;
    for sep in [b';', b',', b'\t', b'|'] {
        let count = first_line.bytes().filter(|&b| b == sep).count();
        if count > best_count {
            best_count = count;
            best = sep;
        }
    }
    best
}

/// Read a CSV demand export. The delimiter is detected from the header line.
pub fn parse_demand_csv<R: Read>(mut reader: R) -> PayloadResult<Vec<DemandRecord>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(&content))
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut records: Vec<DemandRecord> = Vec::new();
    for row in csv_reader.deserialize::<CsvDemandRow>() {
        records.push(row?.into());
    }
    Ok(records)
}

/// Read a CSV demand export from disk.
pub fn parse_demand_csv_file(path: impl AsRef<Path>) -> PayloadResult<Vec<DemandRecord>> {
    let file = std::fs::File::open(path)?;
    parse_demand_csv(file)
}
