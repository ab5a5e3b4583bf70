//! Check engines and the rule dispatcher.
//!
//! Two engines evaluate the same rule vocabulary: an in-memory engine
//! over Polars frames and a relational engine that runs checks in SQL
//! against live Postgres tables. [`dispatch`] resolves a validated rule
//! to the right engine, applies the regex type-coercion special case,
//! persists artifacts and normalizes the result.

mod checks;
mod dispatch;
mod error;
mod frame;
mod relational;

pub use dispatch::{SourceHandle, dispatch};
pub use error::{DispatchError, EngineError};
pub use frame::FrameSource;
pub use relational::{
    CastView, TableSource, cast_view_name, connect, is_text_type, list_tables, quote_ident,
};
