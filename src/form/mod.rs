mod binding;
mod controller;
mod diagnostics;
mod options;
mod rules;
mod validation;
mod value;


pub use binding::{FieldProps, InputEvent};
pub use controller::{FormController, FormError, FormId, FormResult, FormSnapshot, SubmitOutcome};
pub use diagnostics::{DiagnosticSink, TracingDiagnostics};
pub use options::{FormOptions, SubmitPolicy, ValidationMode};
pub use rules::{Rules, is_email};
pub use validation::{BoxedSubmitFuture, FormValidator, SubmitHandler, ValidationError};
pub use value::{FieldErrors, FieldKey, FieldKind, FieldValue, FormValues, form_values};
