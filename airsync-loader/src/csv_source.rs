//! Record Loader (CSV).
//!
//! Reads a header-delimited file into a [`RecordSet`]. The identifier and
//! timestamp columns are required; passthrough columns are copied when present.
//! Any bad row aborts the load with its row and line number.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use airsync_core::{
    timestamp::parse_timestamp, FieldMapping, Identifier, Record, RecordError, RecordSet,
};

use crate::error::{csv_err, LoadError};

const BOM: char = '\u{feff}';

/// Load the CSV file at `path`.
pub fn load_csv(path: &Path, fields: &FieldMapping) -> Result<RecordSet, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let set = load_csv_from_reader(file, path, fields)?;
    tracing::info!(path = %path.display(), records = set.len(), "loaded CSV records");
    Ok(set)
}

/// Load CSV content from any reader; `path` is used only in error messages.
pub fn load_csv_from_reader<R: Read>(
    reader: R,
    path: &Path,
    fields: &FieldMapping,
) -> Result<RecordSet, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| csv_err(path, e))?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches(BOM) == name)
    };
    let require = |name: &str| {
        column(name).ok_or_else(|| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })
    };

    let id_col = require(&fields.identifier)?;
    let ts_col = require(&fields.timestamp)?;
    let passthrough: Vec<(&str, usize)> = fields
        .passthrough
        .iter()
        .filter_map(|name| column(name).map(|idx| (name.as_str(), idx)))
        .collect();

    let source_name = path.display().to_string();
    let mut set = RecordSet::new();
    for (idx, result) in rdr.records().enumerate() {
        let row = result.map_err(|e| csv_err(path, e))?;
        let location = match row.position() {
            Some(pos) => format!("row {} (line {})", idx + 1, pos.line()),
            None => format!("row {}", idx + 1),
        };
        let record_err = |source: RecordError| LoadError::Record {
            source_name: source_name.clone(),
            location: location.clone(),
            source,
        };

        let identifier = Identifier::parse(row.get(id_col).unwrap_or_default()).map_err(record_err)?;
        let updated_at = parse_timestamp(row.get(ts_col).unwrap_or_default()).map_err(record_err)?;

        let mut record = Record::new(identifier, updated_at);
        for (name, col) in &passthrough {
            if let Some(value) = row.get(*col) {
                record = record.with_field(*name, value.trim());
            }
        }
        set.insert(record).map_err(record_err)?;
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn load(content: &str) -> Result<RecordSet, LoadError> {
        load_csv_from_reader(
            content.as_bytes(),
            &PathBuf::from("people.csv"),
            &FieldMapping::default(),
        )
    }

    #[test]
    fn loads_records_with_passthrough_fields() {
        let set = load(
            "email,first_name,last_name,updated_at\n\
             ana@example.com,Ana,Lima,2024-01-05T10:00:00Z\n\
             Bob@Example.com,Bob,Stone,2024-01-03T10:00:00.000Z\n",
        )
        .expect("load");

        assert_eq!(set.len(), 2);
        let bob = set.get("bob@example.com").expect("bob normalized");
        assert_eq!(bob.fields.get("first_name").map(String::as_str), Some("Bob"));
        assert_eq!(bob.updated_at.to_rfc3339(), "2024-01-03T10:00:00+00:00");
    }

    #[test]
    fn header_only_file_is_an_empty_set() {
        let set = load("email,updated_at\n").expect("load");
        assert!(set.is_empty());
    }

    #[test]
    fn passthrough_columns_are_optional() {
        let set = load("updated_at,email\n2024-01-01,ana@example.com\n").expect("load");
        assert!(set.get("ana@example.com").expect("ana").fields.is_empty());
    }

    #[test]
    fn leading_bom_and_padded_headers_are_tolerated() {
        let set = load("\u{feff}email , updated_at\nana@example.com,2024-01-01\n").expect("load");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn quoted_values_with_delimiters_parse() {
        let set = load(
            "email,first_name,updated_at\n\"ana@example.com\",\"Lima, Ana\",2024-01-01T00:00:00Z\n",
        )
        .expect("load");
        let ana = set.get("ana@example.com").expect("ana");
        assert_eq!(ana.fields.get("first_name").map(String::as_str), Some("Lima, Ana"));
    }

    #[test]
    fn missing_timestamp_column_names_column_and_path() {
        let err = load("email,first_name\nana@example.com,Ana\n").unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { .. }), "got: {err}");
        assert_eq!(
            err.to_string(),
            "people.csv is missing required column 'updated_at'"
        );
    }

    #[test]
    fn bad_timestamp_names_the_row() {
        let err = load(
            "email,updated_at\n\
             ana@example.com,2024-01-01T00:00:00Z\n\
             bob@example.com,last tuesday\n",
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("row 2 (line 3)"), "got: {msg}");
        assert!(msg.contains("last tuesday"), "got: {msg}");
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let err = load(
            "email,updated_at\n\
             ana@example.com,2024-01-01\n\
             ANA@example.com ,2024-02-01\n",
        )
        .unwrap_err();
        match err {
            LoadError::Record {
                source: RecordError::DuplicateIdentifier { identifier },
                location,
                ..
            } => {
                assert_eq!(identifier.as_str(), "ana@example.com");
                assert!(location.starts_with("row 2"));
            }
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn blank_email_is_rejected() {
        let err = load("email,updated_at\n  ,2024-01-01\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Record {
                source: RecordError::EmptyIdentifier,
                ..
            }
        ));
    }

    #[test]
    fn ragged_row_is_a_csv_error() {
        let err = load("email,updated_at\nana@example.com\n").unwrap_err();
        assert!(matches!(err, LoadError::Csv { .. }), "got: {err}");
    }
}
