//! Post-session evaluation
//!
//! At session termination the final transcript is rendered into a
//! speaker-labelled document, scored by an external service and the
//! result forwarded to persistence. All of it runs detached from the
//! session state machine; failures are logged, never propagated.

mod dispatcher;
mod document;
mod result;

pub use dispatcher::{DispatchOutcome, EvaluationDispatcher, PerformanceStore, Scorer};
pub use document::{render_document, DOCUMENT_HEADER};
pub use result::EvaluationResult;
