//! CSV loading into Polars frames and schema extraction.

use std::path::Path;

use polars::prelude::{CsvReadOptions, DataFrame, DataType, SerReader};
use tracing::debug;

use dq_model::SourceSchema;

use crate::error::{IngestError, Result};

/// Read a whole CSV file into a DataFrame with header-based schema
/// inference.
pub fn load_frame(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvRead {
            path: path.to_path_buf(),
            source: e,
        })?
        .finish()
        .map_err(|e| IngestError::CsvRead {
            path: path.to_path_buf(),
            source: e,
        })?;
    debug!(path = %path.display(), rows = df.height(), columns = df.width(), "loaded frame");
    Ok(df)
}

/// Column listing with friendly type names, for the generation prompt.
pub fn frame_schema(name: &str, frame: &DataFrame) -> SourceSchema {
    let mut schema = SourceSchema::new(name);
    for column in frame.get_columns() {
        schema
            .columns
            .push(dq_model::ColumnSchema::new(
                column.name().to_string(),
                declared_type_name(column.dtype()),
            ));
    }
    schema
}

/// Friendly, SQL-flavored type names so frame and table schemas read the
/// same way in the prompt.
pub fn declared_type_name(dtype: &DataType) -> String {
    match dtype {
        DataType::String => "text".to_string(),
        DataType::Boolean => "boolean".to_string(),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => "integer".to_string(),
        DataType::Float32 | DataType::Float64 => "float".to_string(),
        DataType::Date => "date".to_string(),
        DataType::Datetime(_, _) => "timestamp".to_string(),
        other => other.to_string(),
    }
}
