use crate::error::{SecurityError, ValidationError};

/// Request-scoped structured logging for parameter access.
///
/// Every event carries the request id and the parameter name. Raw parameter
/// values are never logged: they are untrusted and may hold personal data.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RequestLog<'a> {
    request_id: &'a str,
}

impl<'a> RequestLog<'a> {
    pub(crate) fn new(request_id: Option<&'a str>) -> Self {
        Self {
            request_id: request_id.unwrap_or("-"),
        }
    }

    /// A parameter was missing or failed conversion.
    pub(crate) fn rejected(&self, err: &ValidationError) {
        tracing::debug!(
            request_id = %self.request_id,
            param = %err.param(),
            kind = %err.kind(),
            "parameter rejected"
        );
    }

    /// A parameter violated a security constraint.
    pub(crate) fn blocked(&self, err: &SecurityError) {
        tracing::warn!(
            request_id = %self.request_id,
            param = %err.param(),
            kind = %err.kind(),
            "unsafe parameter blocked"
        );
    }

    /// A default value stood in for a missing parameter.
    pub(crate) fn defaulted(&self, param: &str) {
        tracing::trace!(request_id = %self.request_id, param = %param, "using default value");
    }

    /// Rendering failed because of a programming error such as an unregistered label.
    pub(crate) fn render_failed(&self, err: &ValidationError) {
        tracing::error!(
            request_id = %self.request_id,
            param = %err.param(),
            kind = %err.kind(),
            "cannot render parameter"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SecurityErrorKind, ValidationErrorKind};

    #[test]
    fn missing_request_id_uses_placeholder() {
        assert_eq!(RequestLog::new(None).request_id, "-");
        assert_eq!(RequestLog::new(Some("req-9")).request_id, "req-9");
    }

    #[test]
    fn logging_without_subscriber_is_harmless() {
        let log = RequestLog::new(Some("req-1"));

        log.rejected(&ValidationError::new(ValidationErrorKind::Missing, "a", "required"));
        log.blocked(&SecurityError::new(SecurityErrorKind::AbsoluteUrl, "b"));
        log.defaulted("c");
        log.render_failed(&ValidationError::new(ValidationErrorKind::UnknownLabel, "d", "x"));
    }

    #[test]
    fn events_reach_a_subscriber() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let log = RequestLog::new(Some("req-1"));
            log.blocked(&SecurityError::new(SecurityErrorKind::ProtocolRelativeUrl, "next"));
            log.defaulted("page");
        });
    }
}
