use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use prefbench_core::{ExperimentRecord, PrefResult};

/// Write all records as a 4-space indented JSON array, replacing any existing file.
pub fn write_results(path: &Path, records: &[ExperimentRecord]) -> PrefResult<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut ser)?;
    buf.push(b'\n');

    let mut file = std::fs::File::create(path)?;
    file.write_all(&buf)?;
    info!("saved {} records to {}", records.len(), path.display());
    Ok(())
}

pub fn read_results(path: &Path) -> PrefResult<Vec<ExperimentRecord>> {
    let content = std::fs::read_to_string(path)?;
    let records: Vec<ExperimentRecord> = serde_json::from_str(&content)?;
    Ok(records)
}
