//! Parquet export of the two run artifacts.
//!
//! RULE: Only export.rs writes files. Column names and types here
//! are the contract with the downstream scoring layer.

use crate::{
    engine::Dataset,
    error::GenResult,
    profile_stage::UserProfile,
    record::TransactionRecord,
    summary::RunSummary,
};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const TRANSACTIONS_FILE: &str = "raw_transactions.parquet";
pub const PROFILES_FILE: &str = "user_profiles.parquet";
pub const SUMMARY_FILE: &str = "summary.json";

/// Rows per Parquet row group / Arrow batch.
const BATCH_ROWS: usize = 64 * 1024;

/// Paths of everything written by one export.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub transactions: PathBuf,
    pub profiles:     PathBuf,
    pub summary:      PathBuf,
}

pub fn transactions_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("transaction_id", DataType::Utf8, false),
        Field::new("user_id", DataType::Utf8, false),
        Field::new("timestamp", DataType::Timestamp(TimeUnit::Microsecond, None), false),
        Field::new("amount", DataType::Float64, false),
        Field::new("merchant_name", DataType::Utf8, false),
        Field::new("merchant_category", DataType::Utf8, false),
        Field::new("city", DataType::Utf8, false),
        Field::new("country", DataType::Utf8, false),
        Field::new("latitude", DataType::Float64, false),
        Field::new("longitude", DataType::Float64, false),
        Field::new("is_fraud", DataType::Boolean, false),
        Field::new("fraud_type", DataType::Utf8, true),
    ]))
}

pub fn profiles_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("user_id", DataType::Utf8, false),
        Field::new("home_city", DataType::Utf8, false),
        Field::new("home_country", DataType::Utf8, false),
        Field::new("home_lat", DataType::Float64, false),
        Field::new("home_lon", DataType::Float64, false),
        Field::new("avg_amount", DataType::Float64, false),
        Field::new("std_amount", DataType::Float64, false),
    ]))
}

pub fn transactions_batch(rows: &[TransactionRecord]) -> GenResult<RecordBatch> {
    let strings = |f: fn(&TransactionRecord) -> &str| -> ArrayRef {
        Arc::new(rows.iter().map(f).map(Some).collect::<StringArray>())
    };
    let floats = |f: fn(&TransactionRecord) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<f64>>()))
    };

    let columns: Vec<ArrayRef> = vec![
        strings(|r| r.transaction_id.as_str()),
        strings(|r| r.user_id.as_str()),
        Arc::new(TimestampMicrosecondArray::from(
            rows.iter()
                .map(|r| r.timestamp.and_utc().timestamp_micros())
                .collect::<Vec<i64>>(),
        )),
        floats(|r| r.amount),
        strings(|r| r.merchant_name.as_str()),
        strings(|r| r.merchant_category.as_str()),
        strings(|r| r.city.as_str()),
        strings(|r| r.country.as_str()),
        floats(|r| r.latitude),
        floats(|r| r.longitude),
        Arc::new(BooleanArray::from(
            rows.iter().map(|r| r.is_fraud).collect::<Vec<bool>>(),
        )),
        Arc::new(
            rows.iter()
                .map(|r| r.fraud_type.map(|a| a.as_str()))
                .collect::<StringArray>(),
        ),
    ];
    Ok(RecordBatch::try_new(transactions_schema(), columns)?)
}

pub fn profiles_batch(rows: &[UserProfile]) -> GenResult<RecordBatch> {
    let strings = |f: fn(&UserProfile) -> &str| -> ArrayRef {
        Arc::new(rows.iter().map(f).map(Some).collect::<StringArray>())
    };
    let floats = |f: fn(&UserProfile) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<f64>>()))
    };

    let columns: Vec<ArrayRef> = vec![
        strings(|p| p.user_id.as_str()),
        strings(|p| p.home_city.as_str()),
        strings(|p| p.home_country.as_str()),
        floats(|p| p.home_lat),
        floats(|p| p.home_lon),
        floats(|p| p.avg_amount),
        floats(|p| p.std_amount),
    ];
    Ok(RecordBatch::try_new(profiles_schema(), columns)?)
}

fn write_parquet<T>(
    path: &Path,
    schema: SchemaRef,
    rows: &[T],
    to_batch: fn(&[T]) -> GenResult<RecordBatch>,
) -> GenResult<()> {
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_max_row_group_size(BATCH_ROWS)
        .build();
    let mut writer = ArrowWriter::try_new(File::create(path)?, schema, Some(props))?;
    for chunk in rows.chunks(BATCH_ROWS) {
        writer.write(&to_batch(chunk)?)?;
    }
    writer.close()?;
    Ok(())
}

/// Write transactions, profiles and the run summary into `out_dir`.
pub fn write_dataset(dataset: &Dataset, out_dir: &Path) -> GenResult<ExportPaths> {
    std::fs::create_dir_all(out_dir)?;
    let paths = ExportPaths {
        transactions: out_dir.join(TRANSACTIONS_FILE),
        profiles:     out_dir.join(PROFILES_FILE),
        summary:      out_dir.join(SUMMARY_FILE),
    };

    write_parquet(&paths.profiles, profiles_schema(), &dataset.profiles, profiles_batch)?;
    log::info!("export: {} profiles -> {}", dataset.profiles.len(), paths.profiles.display());

    write_parquet(
        &paths.transactions,
        transactions_schema(),
        &dataset.transactions,
        transactions_batch,
    )?;
    log::info!(
        "export: {} transactions -> {}",
        dataset.transactions.len(),
        paths.transactions.display()
    );

    let summary = RunSummary::from_dataset(dataset);
    std::fs::write(&paths.summary, serde_json::to_string_pretty(&summary)?)?;

    Ok(paths)
}
