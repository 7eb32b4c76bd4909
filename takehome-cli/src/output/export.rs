use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use takehome_core::FlatResultRecord;
use tracing::info;

/// Writes flat result records as CSV with a header row.
pub fn write_records<W: Write>(
    writer: W,
    records: &[FlatResultRecord],
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Exports flat result records to `path`, replacing any existing file.
pub fn export_records(
    path: &Path,
    records: &[FlatResultRecord],
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create export: {}", path.display()))?;
    write_records(file, records)
        .with_context(|| format!("Failed to write export: {}", path.display()))?;

    info!(path = %path.display(), rows = records.len(), "Exported results");
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use takehome_core::{EngineConfig, TaxCalculationParams, TaxEngine};

    use super::*;

    #[test]
    fn records_have_header_and_one_row_each() {
        let engine = TaxEngine::with_built_ins(EngineConfig::default()).unwrap();
        let records: Vec<FlatResultRecord> = ["GB", "ZZ"]
            .iter()
            .map(|key| {
                let params = TaxCalculationParams::new(dec!(60000), key.parse().unwrap(), 2025);
                engine.calculate_tax(&params).unwrap().to_flat_record()
            })
            .collect();
        let mut buf = Vec::new();

        write_records(&mut buf, &records).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("jurisdiction,resolved_jurisdiction,currency,year,regime,"));
        let read_back: Vec<FlatResultRecord> = csv::Reader::from_reader(text.as_bytes())
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(read_back, records);
        assert_eq!(read_back[0].total_tax, dec!(14642.60));
        assert_eq!(read_back[1].coverage, "generic");
        assert!(read_back[1].is_estimate);
    }
}
