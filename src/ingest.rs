//! # Result File Ingest
//!
//! Experiment nodes write one line per worker thread, each line a
//! comma-separated list of operation-completion timestamps in nanoseconds.
//! There is no header row and lines may have different lengths.
//!
//! Parsing rules:
//! - whitespace around a field is ignored
//! - empty fields (for example a trailing comma) are skipped
//! - blank lines are not records
//! - any other field must parse as a `u64`, otherwise `MalformedInput`
//!   names the record and field (both 0-based)
//!
//! Values are re-sorted per worker no matter what order the file holds them
//! in; window and percentile math both depend on ascending order.

use crate::error::{AnalysisError, Result};
use crate::series::ExperimentSample;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Read a per-worker timestamp file into an `ExperimentSample`.
pub fn read_series<P: AsRef<Path>>(path: P) -> Result<ExperimentSample> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let sample = parse_series(file, &path.display().to_string())?;
    info!(
        "Loaded {} worker series ({} samples) from {:?}",
        sample.num_workers(),
        sample.total_ops(),
        path
    );
    Ok(sample)
}

/// Parse per-worker series from any reader. `origin` names the source in
/// error messages.
pub fn parse_series<R: Read>(reader: R, origin: &str) -> Result<ExperimentSample> {
    let mut series = Vec::new();
    let records = for_each_record(reader, origin, |index, values| {
        if values.is_empty() {
            return Err(AnalysisError::EmptySeries { index });
        }
        series.push(values);
        Ok(())
    })?;

    if records == 0 {
        return Err(AnalysisError::EmptySample {
            origin: origin.to_string(),
        });
    }
    ExperimentSample::new(series)
}

/// Read every value of every record, in file order, into one flat pool.
///
/// Used for latency files where per-worker structure is not meaningful.
/// Records without values are allowed here.
pub fn read_flat_values<P: AsRef<Path>>(path: P) -> Result<Vec<u64>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let values = parse_flat_values(file, &path.display().to_string())?;
    info!("Loaded {} latency samples from {:?}", values.len(), path);
    Ok(values)
}

pub fn parse_flat_values<R: Read>(reader: R, origin: &str) -> Result<Vec<u64>> {
    let mut pool = Vec::new();
    let records = for_each_record(reader, origin, |_, values| {
        pool.extend(values);
        Ok(())
    })?;

    if records == 0 {
        return Err(AnalysisError::EmptySample {
            origin: origin.to_string(),
        });
    }
    Ok(pool)
}

/// Feed each parsed record to `visit`, returning how many records were seen.
fn for_each_record<R, F>(reader: R, origin: &str, mut visit: F) -> Result<usize>
where
    R: Read,
    F: FnMut(usize, Vec<u64>) -> Result<()>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut index = 0;
    for record in csv_reader.records() {
        let record = record.map_err(|source| AnalysisError::Csv {
            path: PathBuf::from(origin),
            source,
        })?;

        // blank line
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }

        let mut values = Vec::with_capacity(record.len());
        for (field, raw) in record.iter().enumerate() {
            if raw.is_empty() {
                continue;
            }
            let value = raw
                .parse::<u64>()
                .map_err(|_| AnalysisError::MalformedInput {
                    origin: origin.to_string(),
                    record: index,
                    field,
                    value: raw.to_string(),
                })?;
            values.push(value);
        }

        debug!(record = index, values = values.len(), "parsed record");
        visit(index, values)?;
        index += 1;
    }

    Ok(index)
}
