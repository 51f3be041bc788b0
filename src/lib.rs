//! # overflow-audit
//!
//! Localization overflow audits for design documents.
//!
//! Given text elements from a host document, the engine substitutes translated
//! text into a hidden copy of each element, keeps the original per-character
//! styling by proportional remapping, and measures the result under the
//! element's auto-resize policy. A measurement-free estimator and a severity
//! classifier cover previews and ranking.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use overflow_audit::{AuditOptions, Auditor};
//!
//! let mut auditor = Auditor::new(font_loader, AuditOptions::default());
//! let nodes = auditor.scan(&host, &roots);
//! let report = auditor.run(&mut host, &translator, &nodes).await?;
//! println!("{}", report.summary());
//! ```
//!
//! The host document and translation backend are supplied by the caller
//! through [`TextHost`], [`FontLoader`], and [`Translator`].

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

pub mod audit;
pub mod engine;
pub mod error;
pub mod estimate;
pub mod fonts;
pub mod host;
pub mod locale;
pub mod measure;
pub mod model;
pub mod options;
pub mod severity;
pub mod styles;
pub mod translate;

pub use audit::{scan_text_nodes, AuditReport, AuditResult, Auditor, SeverityFilter, TextNodeInfo};
pub use engine::OverflowEngine;
pub use error::{AuditError, ErrorPhase};
pub use estimate::{estimate, OverflowEstimate};
pub use fonts::{FontAvailabilityGuard, FontCache, FontPreparation, FontStatus};
pub use host::{FontLoader, HostError, Mixed, NodeId, NodeKind, TextHost};
pub use locale::{is_rtl, LocaleInfo, SUPPORTED_LOCALES};
pub use measure::{compare_geometry, MeasureOutcome, MeasureRequest};
pub use model::{
    AutoResizePolicy, BoxGeometry, CharStyle, Fill, FontName, FontRef, OverflowVerdict,
    ParentGeometry, StyleSegment, TextRun, OVERFLOW_TOLERANCE,
};
pub use options::{AuditMode, AuditOptions, EngineOptions};
pub use severity::{classify_severity, SeverityTier, CRITICAL_PERCENT};
pub use styles::{remap_styles, StyleApplyReport};
pub use translate::{TranslationRequest, TranslationResponse, Translator};
