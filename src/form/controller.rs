use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::diagnostics::{DiagnosticSink, TracingDiagnostics};
use super::options::{FormOptions, SubmitPolicy, ValidationMode};
use super::validation::{FormValidator, SubmitHandler, ValidationError};
use super::value::{FieldErrors, FieldKey, FieldKind, FieldValue, FormValues};

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    /// Validation reported errors; the submit handler was not called.
    Invalid,
    Submitted,
    /// The submit handler failed; the error went to the diagnostic sink.
    Failed,
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),
    #[error("unknown form field `{0}`")]
    UnknownField(FieldKey),
    #[error("field `{field}` holds {expected:?} values, got {actual:?}")]
    FieldKindMismatch {
        field: FieldKey,
        expected: FieldKind,
        actual: FieldKind,
    },
    #[error("form submit is already in progress")]
    AlreadySubmitting,
    #[error("invalid form options: {0}")]
    InvalidOptions(String),
}

pub type FormResult<T> = Result<T, FormError>;

#[derive(Clone, Debug)]
pub struct FormSnapshot<E> {
    pub values: FormValues,
    pub errors: FieldErrors<E>,
    pub touched: BTreeMap<FieldKey, bool>,
    pub is_submitting: bool,
    pub is_dirty: bool,
    pub is_valid: bool,
    pub submit_count: u32,
    pub last_outcome: Option<SubmitOutcome>,
}

pub(super) type SharedValidator<E> = Arc<dyn FormValidator<E>>;

pub(super) struct FormState<E> {
    pub(super) id: FormId,
    pub(super) initial: FormValues,
    pub(super) values: FormValues,
    pub(super) errors: FieldErrors<E>,
    pub(super) touched: BTreeMap<FieldKey, bool>,
    pub(super) dirty: BTreeSet<FieldKey>,
    pub(super) submits_in_flight: u32,
    pub(super) submit_count: u32,
    pub(super) last_outcome: Option<SubmitOutcome>,
}

impl<E> FormState<E> {
    pub(super) fn current_value(&self, key: &FieldKey) -> FormResult<&FieldValue> {
        self.values
            .get(key)
            .ok_or_else(|| FormError::UnknownField(key.clone()))
    }
}

/// Owns one form's values, errors, touched flags and submitting flag.
///
/// Cloning yields another handle to the same form, so every callback a
/// renderer wires up can hold its own copy.
#[derive(Clone)]
pub struct FormController<E = String>
where
    E: ValidationError,
{
    pub(super) options: FormOptions,
    pub(super) state: Arc<RwLock<FormState<E>>>,
    pub(super) validator: Arc<RwLock<Option<SharedValidator<E>>>>,
    pub(super) submit_handler: Arc<dyn SubmitHandler>,
    pub(super) diagnostics: Arc<RwLock<Arc<dyn DiagnosticSink>>>,
}

impl<E> FormController<E>
where
    E: ValidationError,
{
    /// The key set of `initial` is fixed for the lifetime of the form.
    pub fn new(initial: FormValues, options: FormOptions, on_submit: impl SubmitHandler) -> Self {
        let id = FormId::next();
        let sink: Arc<dyn DiagnosticSink> = Arc::new(TracingDiagnostics);
        tracing::debug!(form_id = id.0, fields = initial.len(), "form created");
        Self {
            options,
            state: Arc::new(RwLock::new(FormState {
                id,
                initial: initial.clone(),
                values: initial,
                errors: BTreeMap::new(),
                touched: BTreeMap::new(),
                dirty: BTreeSet::new(),
                submits_in_flight: 0,
                submit_count: 0,
                last_outcome: None,
            })),
            validator: Arc::new(RwLock::new(None)),
            submit_handler: Arc::new(on_submit),
            diagnostics: Arc::new(RwLock::new(sink)),
        }
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    pub fn form_id(&self) -> FormResult<FormId> {
        Ok(read_lock(&self.state, "reading form id")?.id)
    }

    /// Stores `value` for `field` and drops any error the field carried.
    /// No validation runs on change.
    pub fn on_field_change(
        &self,
        field: impl Into<FieldKey>,
        value: impl Into<FieldValue>,
    ) -> FormResult<()> {
        let key = field.into();
        let value = value.into();
        let mut state = write_lock(&self.state, "changing field value")?;
        let expected = state.current_value(&key)?.kind();
        if expected != value.kind() {
            return Err(FormError::FieldKindMismatch {
                field: key,
                expected,
                actual: value.kind(),
            });
        }

        if state.initial.get(&key) == Some(&value) {
            state.dirty.remove(&key);
        } else {
            state.dirty.insert(key.clone());
        }
        let cleared_error = state.errors.remove(&key).is_some();
        state.values.insert(key.clone(), value);
        tracing::trace!(form_id = state.id.0, field = %key, cleared_error, "field changed");
        Ok(())
    }

    /// Marks `field` touched and, in [`ValidationMode::OnBlur`], validates it
    /// in isolation. Errors reported for other fields are ignored.
    pub fn on_field_blur(&self, field: impl Into<FieldKey>) -> FormResult<()> {
        let key = field.into();
        let validator = match self.options.validate_mode {
            ValidationMode::OnBlur => self.validator()?,
            ValidationMode::OnSubmit => None,
        };

        let mut state = write_lock(&self.state, "blurring field")?;
        let value = state.current_value(&key)?.clone();
        state.touched.insert(key.clone(), true);

        let Some(validator) = validator else {
            return Ok(());
        };
        let subset = FormValues::from([(key.clone(), value)]);
        let mut result = validator.validate(&subset);
        if let Some(error) = result.remove(&key).filter(|error| !error.message().is_empty()) {
            tracing::debug!(form_id = state.id.0, field = %key, "field failed validation on blur");
            state.errors.insert(key, error);
        }
        Ok(())
    }

    /// Validates every field and, when nothing failed, awaits the submit
    /// handler. A handler failure is reported to the diagnostic sink and
    /// surfaces only as [`SubmitOutcome::Failed`].
    pub async fn submit(&self) -> FormResult<SubmitOutcome> {
        let validator = self.validator()?;
        let sink = read_lock(&self.diagnostics, "reading diagnostic sink")?.clone();

        let (form_id, values) = {
            let mut state = write_lock(&self.state, "preparing submit")?;
            if state.submits_in_flight > 0
                && self.options.submit_policy == SubmitPolicy::RejectWhileSubmitting
            {
                return Err(FormError::AlreadySubmitting);
            }
            state.submit_count = state.submit_count.saturating_add(1);

            if let Some(validator) = validator {
                let result = validator.validate(&state.values);
                let errors = retain_known_errors(state.id, &state.values, result);
                state.errors = errors;
                if !state.errors.is_empty() {
                    tracing::debug!(
                        form_id = state.id.0,
                        invalid_fields = state.errors.len(),
                        "submit blocked by validation"
                    );
                    state.last_outcome = Some(SubmitOutcome::Invalid);
                    return Ok(SubmitOutcome::Invalid);
                }
            }

            state.submits_in_flight += 1;
            (state.id, state.values.clone())
        };

        let in_flight = InFlightSubmit {
            state: self.state.as_ref(),
        };
        tracing::debug!(form_id = form_id.0, "submitting form");
        let outcome = match self.submit_handler.submit(values).await {
            Ok(()) => SubmitOutcome::Submitted,
            Err(error) => {
                sink.submission_failed(form_id, &error);
                SubmitOutcome::Failed
            }
        };
        in_flight.finish(outcome);
        Ok(outcome)
    }

    /// Restores the initial values and clears errors, touched and dirty
    /// state. An in-flight submit keeps running.
    pub fn reset(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "resetting form")?;
        state.values = state.initial.clone();
        state.errors.clear();
        state.touched.clear();
        state.dirty.clear();
        state.submit_count = 0;
        state.last_outcome = None;
        tracing::debug!(form_id = state.id.0, "form reset");
        Ok(())
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot<E>> {
        let state = read_lock(&self.state, "creating form snapshot")?;
        Ok(FormSnapshot {
            values: state.values.clone(),
            errors: state.errors.clone(),
            touched: state.touched.clone(),
            is_submitting: state.submits_in_flight > 0,
            is_dirty: !state.dirty.is_empty(),
            is_valid: state.errors.is_empty(),
            submit_count: state.submit_count,
            last_outcome: state.last_outcome,
        })
    }

    pub fn values(&self) -> FormResult<FormValues> {
        Ok(read_lock(&self.state, "reading form values")?.values.clone())
    }

    pub fn value(&self, field: impl Into<FieldKey>) -> FormResult<FieldValue> {
        let key = field.into();
        Ok(read_lock(&self.state, "reading field value")?
            .current_value(&key)?
            .clone())
    }

    pub fn error(&self, field: impl Into<FieldKey>) -> FormResult<Option<E>> {
        let key = field.into();
        let state = read_lock(&self.state, "reading field error")?;
        state.current_value(&key)?;
        Ok(state.errors.get(&key).cloned())
    }

    pub fn errors(&self) -> FormResult<FieldErrors<E>> {
        Ok(read_lock(&self.state, "reading form errors")?.errors.clone())
    }

    pub fn is_touched(&self, field: impl Into<FieldKey>) -> FormResult<bool> {
        let key = field.into();
        let state = read_lock(&self.state, "reading touched flag")?;
        state.current_value(&key)?;
        Ok(state.touched.get(&key).copied().unwrap_or(false))
    }

    pub fn is_field_dirty(&self, field: impl Into<FieldKey>) -> FormResult<bool> {
        let key = field.into();
        let state = read_lock(&self.state, "reading field dirty flag")?;
        state.current_value(&key)?;
        Ok(state.dirty.contains(&key))
    }

    pub fn is_dirty(&self) -> FormResult<bool> {
        Ok(!read_lock(&self.state, "reading dirty flag")?.dirty.is_empty())
    }

    pub fn is_submitting(&self) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading submitting flag")?.submits_in_flight > 0)
    }

    pub fn is_valid(&self) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading validity")?.errors.is_empty())
    }
}

/// Clears one unit of the submitting flag when dropped, so the flag resets
/// even if the submit future is abandoned mid-flight.
struct InFlightSubmit<'a, E> {
    state: &'a RwLock<FormState<E>>,
}

impl<E> InFlightSubmit<'_, E> {
    fn finish(self, outcome: SubmitOutcome) {
        let mut state = recover_write(self.state);
        state.last_outcome = Some(outcome);
        tracing::debug!(form_id = state.id.0, ?outcome, "submit finished");
    }
}

impl<E> Drop for InFlightSubmit<'_, E> {
    fn drop(&mut self) {
        let mut state = recover_write(self.state);
        state.submits_in_flight = state.submits_in_flight.saturating_sub(1);
    }
}

/// Drops errors for fields the form does not have and errors with an empty
/// message.
pub(super) fn retain_known_errors<E: ValidationError>(
    form_id: FormId,
    values: &FormValues,
    errors: FieldErrors<E>,
) -> FieldErrors<E> {
    errors
        .into_iter()
        .filter(|(key, error)| {
            if !values.contains_key(key) {
                tracing::debug!(form_id = form_id.0, field = %key, "ignoring error for unknown field");
                return false;
            }
            !error.message().is_empty()
        })
        .collect()
}

fn recover_write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
