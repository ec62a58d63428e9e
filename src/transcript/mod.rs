//! Transcript model and utterance consolidation
//!
//! Streaming speech recognition delivers progressively longer partial
//! hypotheses for the same utterance. This module folds that fragment
//! stream into finalized speaker turns:
//! - `Fragment` - one raw piece of streamed text with a speaker tag
//! - `Utterance` - one finalized, consolidated speaker turn
//! - `Transcript` - ordered, append-only sequence of utterances
//! - `UtteranceConsolidator` - the merge algorithm

mod consolidator;
mod types;

pub use consolidator::UtteranceConsolidator;
pub use types::{Fragment, Speaker, Transcript, Utterance};
