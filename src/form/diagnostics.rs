use super::controller::FormId;

/// Receives submission failures the controller swallows.
pub trait DiagnosticSink: Send + Sync + 'static {
    fn submission_failed(&self, form_id: FormId, error: &anyhow::Error);
}

impl<F> DiagnosticSink for F
where
    F: Fn(FormId, &anyhow::Error) + Send + Sync + 'static,
{
    fn submission_failed(&self, form_id: FormId, error: &anyhow::Error) {
        (self)(form_id, error)
    }
}

/// Default sink: reports through the `tracing` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn submission_failed(&self, form_id: FormId, error: &anyhow::Error) {
        let message = format!("{error:#}");
        tracing::error!(form_id = form_id.0, error = %message, "form submission failed");
    }
}
