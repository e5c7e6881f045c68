//! Record store: CSV ingestion with position-based identifiers.

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{ReconError, Result};
use crate::model::{DatasetTag, NormalizedRecord, RawRow, RecordId, Table};
use crate::normalize::normalize;

/// Parse CSV text into a header and data rows. Rows may be ragged.
pub fn parse_table(input: &str, label: &str) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input.as_bytes());

    let mut records = reader.records();
    let header: RawRow = match records.next() {
        Some(record) => record?.iter().map(str::to_string).collect(),
        None => return Err(ReconError::malformed(label, "no header row")),
    };

    let rows = records
        .map(|record| record.map(|r| r.iter().map(str::to_string).collect::<RawRow>()))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Table { header, rows })
}

/// Normalized records of one dataset, addressed by row position.
#[derive(Debug, Clone)]
pub struct RecordStore {
    tag: Option<DatasetTag>,
    header: RawRow,
    records: Vec<NormalizedRecord>,
}

impl RecordStore {
    pub fn tag(&self) -> Option<DatasetTag> {
        self.tag
    }

    pub fn label(&self) -> &'static str {
        label_for(self.tag)
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn id_at(&self, index: usize) -> RecordId {
        RecordId::new(index, self.tag)
    }

    /// True when `id` belongs to this dataset and is within range.
    pub fn contains(&self, id: &RecordId) -> bool {
        id.tag() == self.tag && id.index() < self.records.len()
    }

    pub fn get(&self, id: &RecordId) -> Option<&NormalizedRecord> {
        if id.tag() != self.tag {
            return None;
        }
        self.records.get(id.index())
    }

    /// Records in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &NormalizedRecord)> {
        let tag = self.tag;
        self.records
            .iter()
            .enumerate()
            .map(move |(i, r)| (RecordId::new(i, tag), r))
    }

    /// Rename `from[i]` to `to[i]` in every record, dropping other fields.
    /// Used to present the second dataset of a link under the first
    /// dataset's field names.
    pub fn remap_fields(&self, from: &[String], to: &[String]) -> Self {
        let renames: Vec<(&str, &str)> = from
            .iter()
            .zip(to)
            .map(|(f, t)| (f.as_str(), t.as_str()))
            .collect();
        Self {
            tag: self.tag,
            header: self.header.clone(),
            records: self.records.iter().map(|r| r.project(&renames)).collect(),
        }
    }
}

fn label_for(tag: Option<DatasetTag>) -> &'static str {
    tag.map(|t| t.as_str()).unwrap_or("input")
}

/// Ingest CSV text into a [`RecordStore`].
///
/// Row `i` of the data (header excluded) gets identifier `i`, tagged with
/// `tag` when given. Every header column is normalized into the record;
/// each of `field_names` must be present in the header.
pub fn ingest(input: &str, field_names: &[String], tag: Option<DatasetTag>) -> Result<RecordStore> {
    let label = label_for(tag);
    let table = parse_table(input, label)?;

    if let Some(missing) = field_names.iter().find(|f| !table.header.contains(f)) {
        return Err(ReconError::MissingField {
            field: missing.clone(),
            input: label.into(),
        });
    }

    let records = table
        .rows
        .iter()
        .map(|row| {
            table
                .header
                .iter()
                .enumerate()
                .map(|(col, name)| {
                    let cell = row.get(col).map(String::as_str).unwrap_or("");
                    (name.clone(), normalize(cell))
                })
                .collect::<NormalizedRecord>()
        })
        .collect::<Vec<_>>();

    debug!(input = label, rows = records.len(), "ingested records");

    Ok(RecordStore {
        tag,
        header: table.header,
        records,
    })
}

/// Read a source file as text. `-` reads standard input. Bytes that are not
/// valid UTF-8 are decoded as Windows-1252, the usual encoding of
/// spreadsheet exports.
pub fn read_source(path: &Path) -> Result<String> {
    let mut bytes = Vec::new();
    if path.as_os_str() == "-" {
        std::io::stdin()
            .read_to_end(&mut bytes)
            .map_err(|e| ReconError::io(path, e))?;
    } else {
        bytes = std::fs::read(path).map_err(|e| ReconError::io(path, e))?;
    }

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}
