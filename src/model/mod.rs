//! Model instances and validation
//!
//! An instance collects values for the fields of one schema. Validation is
//! explicit: construction never rejects values, `validate_first` and
//! `validate_all` report what is wrong.

mod instance;
mod validator;
mod values;

pub use instance::Model;
pub use values::ValuesValidator;
