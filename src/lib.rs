//! Form state for the AgriLink web client: field values, validation errors,
//! touched flags and submission tracking, independent of any renderer.

pub mod form;
pub mod prelude;
