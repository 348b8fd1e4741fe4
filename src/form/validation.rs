use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::controller::{FormController, FormResult, SharedValidator, read_lock, write_lock};
use super::diagnostics::DiagnosticSink;
use super::value::{FieldErrors, FormValues};

pub trait ValidationError: Clone + Send + Sync + 'static {
    fn message(&self) -> Cow<'_, str>;
}

impl ValidationError for String {
    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl ValidationError for &'static str {
    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed(*self)
    }
}

/// Pure, synchronous check over a subset of the form values.
///
/// Called with a single-field map on blur and with every field on submit.
/// A missing key in the result means that field is valid. Implementations
/// must not call back into the controller that owns them.
pub trait FormValidator<E>: Send + Sync
where
    E: ValidationError,
{
    fn validate(&self, values: &FormValues) -> FieldErrors<E>;
}

impl<E, F> FormValidator<E> for F
where
    E: ValidationError,
    F: Fn(&FormValues) -> FieldErrors<E> + Send + Sync,
{
    fn validate(&self, values: &FormValues) -> FieldErrors<E> {
        (self)(values)
    }
}

pub type BoxedSubmitFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

/// The side effect a form performs once its values pass validation.
pub trait SubmitHandler: Send + Sync + 'static {
    fn submit(&self, values: FormValues) -> BoxedSubmitFuture;
}

impl<F, Fut> SubmitHandler for F
where
    F: Fn(FormValues) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn submit(&self, values: FormValues) -> BoxedSubmitFuture {
        Box::pin((self)(values))
    }
}

impl<E> FormController<E>
where
    E: ValidationError,
{
    /// Installs the form's validator, replacing any previous one.
    pub fn register_validator<V>(&self, validator: V) -> FormResult<()>
    where
        V: FormValidator<E> + 'static,
    {
        let validator: SharedValidator<E> = Arc::new(validator);
        let mut slot = write_lock(&self.validator, "registering validator")?;
        *slot = Some(validator);
        Ok(())
    }

    pub fn clear_validator(&self) -> FormResult<()> {
        write_lock(&self.validator, "clearing validator")?.take();
        Ok(())
    }

    pub fn register_diagnostic_sink<S>(&self, sink: S) -> FormResult<()>
    where
        S: DiagnosticSink,
    {
        let sink: Arc<dyn DiagnosticSink> = Arc::new(sink);
        *write_lock(&self.diagnostics, "registering diagnostic sink")? = sink;
        Ok(())
    }

    pub(super) fn validator(&self) -> FormResult<Option<SharedValidator<E>>> {
        Ok(read_lock(&self.validator, "reading validator")?.clone())
    }
}
