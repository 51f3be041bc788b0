//! Structured errors for font preparation, styling, measurement, and translation.

use core::fmt;

use crate::host::HostError;

/// Pipeline phase where an error originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorPhase {
    /// Host document traversal.
    Scan,
    /// Font availability preparation.
    Fonts,
    /// Style run extraction, remapping, and application.
    Styling,
    /// Isolated-copy overflow measurement.
    Measure,
    /// Batch translation collaborator.
    Translate,
}

impl ErrorPhase {
    /// Stable lowercase name used in rendered messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Fonts => "fonts",
            Self::Styling => "styling",
            Self::Measure => "measure",
            Self::Translate => "translate",
        }
    }
}

impl fmt::Display for ErrorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error for audit operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditError {
    /// Processing phase where this error originated.
    pub phase: ErrorPhase,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: Box<str>,
    /// Optional host node context.
    pub node_id: Option<Box<str>>,
    /// Optional target locale context.
    pub locale: Option<Box<str>>,
}

impl AuditError {
    /// Create an error for the given phase and stable code.
    pub fn new(phase: ErrorPhase, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            phase,
            code,
            message: message.into().into_boxed_str(),
            node_id: None,
            locale: None,
        }
    }

    /// Lift a host primitive failure into a phase-tagged error.
    pub fn from_host(phase: ErrorPhase, code: &'static str, err: HostError) -> Self {
        Self::new(phase, code, err.message)
    }

    /// Attach host node context.
    pub fn with_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into().into_boxed_str());
        self
    }

    /// Attach target locale context.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into().into_boxed_str());
        self
    }
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.phase, self.code, self.message)?;
        if let Some(node_id) = self.node_id.as_deref() {
            write!(f, " [node={}]", node_id)?;
        }
        if let Some(locale) = self.locale.as_deref() {
            write!(f, " [locale={}]", locale)?;
        }
        Ok(())
    }
}

impl std::error::Error for AuditError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_phase_code_and_context() {
        let err = AuditError::new(ErrorPhase::Measure, "MEASURE_NOT_TEXT", "node is a frame")
            .with_node("12:7")
            .with_locale("de");
        assert_eq!(
            err.to_string(),
            "measure:MEASURE_NOT_TEXT: node is a frame [node=12:7] [locale=de]"
        );
    }

    #[test]
    fn host_errors_keep_their_message() {
        let err = AuditError::from_host(
            ErrorPhase::Styling,
            "STYLE_RUN_INVALID",
            HostError::new("range 3..9 out of bounds"),
        );
        assert_eq!(err.phase, ErrorPhase::Styling);
        assert_eq!(err.message.as_ref(), "range 3..9 out of bounds");
        assert!(err.node_id.is_none());
    }
}
