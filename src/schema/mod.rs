//! Schema subsystem
//!
//! Field declarations, the rules they carry, model schemas built from them
//! and per-model options.
//!
//! # Design Principles
//!
//! - Fields are registered explicitly and keep declaration order
//! - Derived schemas are composed from bases, never mutated in place
//! - Schemas are immutable after construction
//! - Unknown options fail construction

mod errors;
mod field;
mod model_schema;
mod options;
mod swap;
mod types;

pub use errors::{FieldError, FieldErrorKind, ModelError, ModelResult};
pub use field::{FieldDef, UNIQUE_ID_KEY};
pub use model_schema::{ModelSchema, ModelSchemaBuilder};
pub use options::{ModelOptions, KNOWN_OPTIONS};
pub use swap::{diff_id_field, swap_field, ID_FIELD};
pub use types::{is_blank_value, is_empty_value, FieldType, Pattern, Violation};
