//! Field swapping
//!
//! Lets a base schema be adapted to a different identifier type per storage
//! backend without touching the base definition.

use std::sync::Arc;
use tracing::trace;

use super::errors::ModelResult;
use super::field::{FieldDef, UNIQUE_ID_KEY};
use super::model_schema::ModelSchema;

/// Name of the field marked as unique identifier when swapped
pub const ID_FIELD: &str = "id";

/// Builds a derived schema where each field in `names` is replaced by a
/// fresh declaration from `new_field`.
///
/// The `id` field is marked as the unique identifier (`uniq_field = "_id"`).
/// Names missing from `schema` are added. `schema` itself is not modified.
///
/// # Errors
///
/// `InvalidField` if a replacement's alternate key names another field.
pub fn swap_field<F>(
    schema: &ModelSchema,
    new_field: F,
    names: &[&str],
) -> ModelResult<Arc<ModelSchema>>
where
    F: Fn() -> FieldDef,
{
    let replacements = names
        .iter()
        .map(|&name| {
            let mut field = new_field();
            field.name = name.to_string();
            field.owner_model = Some(schema.name().to_string());
            if name == ID_FIELD {
                field.uniq_field = Some(UNIQUE_ID_KEY.to_string());
            }
            field
        })
        .collect();

    let derived = schema.derive_with(replacements)?;
    trace!(model = %schema.name(), swapped = ?names, "swapped fields");
    Ok(Arc::new(derived))
}

/// Decorator form of [`swap_field`]: returns a function that applies the
/// same swap to any schema.
pub fn diff_id_field<F>(
    new_field: F,
    names: &[&str],
) -> impl Fn(&ModelSchema) -> ModelResult<Arc<ModelSchema>>
where
    F: Fn() -> FieldDef,
{
    let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    move |schema: &ModelSchema| {
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        swap_field(schema, &new_field, &refs)
    }
}
