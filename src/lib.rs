//! modelkit - Declarative data models with typed fields and validation
//!
//! A [`ModelSchema`] declares typed fields, a [`Model`] collects values for
//! them, and validation checks types and required-field presence.
//!
//! ```ignore
//! use modelkit::{FieldDef, Model, ModelSchema};
//! use serde_json::json;
//!
//! let person = ModelSchema::builder("Person")
//!     .field("name", FieldDef::string().required())
//!     .field("age", FieldDef::int())
//!     .build()?;
//!
//! let p = Model::new(&person, [("name", json!("A"))]);
//! p.validate_all()?;
//! ```

pub mod model;
pub mod schema;

pub use model::{Model, ValuesValidator};
pub use schema::{
    diff_id_field, swap_field, FieldDef, FieldError, FieldErrorKind, FieldType, ModelError,
    ModelOptions, ModelResult, ModelSchema,
};
