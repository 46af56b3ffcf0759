use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::transaction::{
    flatten_record, CustomerId, FlatTransactionRow, ProductId, TransactionRecord,
};

pub type LoyaltyScore = u32;

/// File expected inside every transactions source directory.
pub const TRANSACTIONS_FILE_NAME: &str = "transactions.json";

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CustomerRef {
    #[serde(deserialize_with = "trim_string")]
    pub customer_id: CustomerId,
    #[serde(default, deserialize_with = "trim_and_parse_optional_u32")]
    pub loyalty_score: Option<LoyaltyScore>,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ProductRef {
    #[serde(deserialize_with = "trim_string")]
    pub product_id: ProductId,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub product_category: Option<String>,
}

pub fn read_customers<P: AsRef<Path>>(path: P) -> Result<Vec<CustomerRef>> {
    read_csv(path)
}

pub fn read_products<P: AsRef<Path>>(path: P) -> Result<Vec<ProductRef>> {
    read_csv(path)
}

fn read_csv<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>> {
    let file = File::open(path)?;
    // The CSV reader is buffered automatically; unknown columns are ignored by serde.
    let mut rdr = csv::Reader::from_reader(file);

    let records = rdr.deserialize::<T>().collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(records)
}

/// Flattened rows read from one `transactions.json`, plus the lines that were skipped.
#[derive(Debug)]
pub struct SourceLoad {
    pub path: PathBuf,
    pub rows: Vec<FlatTransactionRow>,
    pub skipped: Vec<Error>,
}

/// Every immediate subdirectory of `root` holding a transactions file, sorted by name.
pub fn list_transaction_sources<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("transactions directory not found: {}", root.display()),
        )));
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let candidate = entry.path().join(TRANSACTIONS_FILE_NAME);
        if entry.file_type().is_dir() && candidate.is_file() {
            sources.push(candidate);
        } else {
            tracing::debug!("Skipping {:?}: no {}", entry.path(), TRANSACTIONS_FILE_NAME);
        }
    }

    Ok(sources)
}

/// Read one line-delimited JSON file. Malformed lines are collected, never fatal.
pub fn read_transaction_source<P: AsRef<Path>>(path: P) -> Result<SourceLoad> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);

    let mut rows = Vec::new();
    let mut skipped = Vec::new();
    // raw bytes, so a badly encoded line is skipped like any other malformed one
    for (idx, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let parsed = serde_json::from_slice::<TransactionRecord>(&line)
            .map_err(|e| Error::malformed(e.to_string()))
            .and_then(flatten_record);
        match parsed {
            Ok(flat) => rows.extend(flat),
            Err(e) => skipped.push(e.at_line(idx + 1)),
        }
    }

    if let Some(first) = skipped.first() {
        tracing::warn!(
            source = %path.display(),
            skipped = skipped.len(),
            "Skipped malformed transaction lines, first: {}",
            first
        );
    }

    Ok(SourceLoad {
        path: path.to_path_buf(),
        rows,
        skipped,
    })
}

fn trim_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = String::deserialize(deserializer)?;
    Ok(s.trim().to_owned())
}

fn trim_optional_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = String::deserialize(deserializer)?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_owned()))
    }
}

fn trim_and_parse_optional_u32<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = String::deserialize(deserializer)?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        trimmed.parse::<u32>().map(Some).map_err(serde::de::Error::custom)
    }
}
