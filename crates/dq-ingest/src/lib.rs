pub mod any_value;
pub mod discovery;
pub mod error;
pub mod loader;

pub use any_value::{any_to_f64, any_to_string, format_numeric, is_missing};
pub use discovery::{list_csv_files, resolve_source, source_map};
pub use error::{IngestError, Result};
pub use loader::{declared_type_name, frame_schema, load_frame};
