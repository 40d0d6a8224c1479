//! CSV parser for scraped auction snapshots.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Read;

use crate::records::{DataSource, RawRecord};

/// One CSV row as scraped. Columns may be missing; extras are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRow {
    model: Option<String>,
    title: Option<String>,
    make: Option<String>,
    views: Option<String>,
    bids: Option<String>,
    comments: Option<String>,
    sale_amount: Option<String>,
    scraped_date: Option<String>,
    sale_date: Option<String>,
    end_date: Option<String>,
    year: Option<String>,
    data_source: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl RawRow {
    fn into_record(self, default_source: &DataSource) -> RawRecord {
        let source = present(self.data_source)
            .map(DataSource::from)
            .unwrap_or_else(|| default_source.clone());
        let title = present(self.title);
        RawRecord {
            source,
            model: present(self.model).or_else(|| title.clone()),
            title,
            make: present(self.make),
            views: present(self.views),
            bids: present(self.bids),
            comments: present(self.comments),
            sale_amount: present(self.sale_amount),
            scraped_date: present(self.scraped_date),
            sale_date: present(self.sale_date),
            end_date: present(self.end_date),
            year: present(self.year),
        }
    }
}

/// Reads every row of a snapshot CSV into [`RawRecord`]s.
///
/// Rows without a `data_source` value are tagged with `default_source`.
///
/// # Errors
///
/// Returns an error if the CSV is malformed.
pub fn read_raw_records<R: Read>(reader: R, default_source: DataSource) -> Result<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut records = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let row: RawRow = result.with_context(|| format!("malformed snapshot row {}", line + 1))?;
        records.push(row.into_record(&default_source));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_known_columns() {
        let csv = "model,make,views,bids,sale_amount,scraped_date,unused\n\
                   2015 BMW M3 Competition,BMW,\"3,120\",41,\"$61,500\",2025-04-10,x\n";
        let records = read_raw_records(csv.as_bytes(), DataSource::BringATrailer).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.source, DataSource::BringATrailer);
        assert_eq!(r.model.as_deref(), Some("2015 BMW M3 Competition"));
        assert_eq!(r.views.as_deref(), Some("3,120"));
        assert_eq!(r.sale_amount.as_deref(), Some("$61,500"));
        assert_eq!(r.comments, None);
        assert_eq!(r.end_date, None);
    }

    #[test]
    fn test_title_fallback_and_blank_cells() {
        let csv = "title,model,views\n1973 Porsche 911,,\n";
        let records = read_raw_records(csv.as_bytes(), DataSource::CarsAndBids).unwrap();
        let r = &records[0];
        assert_eq!(r.model.as_deref(), Some("1973 Porsche 911"));
        assert_eq!(r.title.as_deref(), Some("1973 Porsche 911"));
        assert_eq!(r.views, None);
        assert_eq!(r.source, DataSource::CarsAndBids);
    }

    #[test]
    fn test_data_source_column_overrides_default() {
        let csv = "model,data_source\nBMW M3,CNB\nBMW M4,\n";
        let records = read_raw_records(csv.as_bytes(), DataSource::BringATrailer).unwrap();
        assert_eq!(records[0].source, DataSource::CarsAndBids);
        assert_eq!(records[1].source, DataSource::BringATrailer);
    }

    #[test]
    fn test_header_only_is_empty() {
        let records = read_raw_records("model,views\n".as_bytes(), DataSource::BringATrailer).unwrap();
        assert!(records.is_empty());
    }
}
