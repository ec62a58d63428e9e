use super::types::{Fragment, Speaker, Transcript, Utterance};
use tracing::debug;

/// The turn currently accumulating text
#[derive(Debug, Clone)]
struct OpenTurn {
    role: Speaker,
    text: String,
}

/// Folds an ordered fragment stream into a transcript of speaker turns
///
/// Holds at most one open turn. The open turn always carries the role of
/// the most recently accepted fragment. Fragments must be fed in arrival
/// order; the consolidator never reorders.
#[derive(Debug, Default)]
pub struct UtteranceConsolidator {
    open: Option<OpenTurn>,
    transcript: Transcript,
    last_seq: Option<u64>,
}

impl UtteranceConsolidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all accumulated state (session start)
    pub fn reset(&mut self) {
        self.open = None;
        self.transcript = Transcript::new();
        self.last_seq = None;
    }

    /// Feed one fragment into the consolidator
    pub fn ingest(&mut self, fragment: Fragment) {
        if fragment.text.trim().is_empty() {
            return;
        }

        if let Some(last) = self.last_seq {
            if fragment.arrival_seq <= last {
                debug!(
                    "Fragment seq {} arrived after seq {}; consuming in delivery order",
                    fragment.arrival_seq, last
                );
            }
        }
        self.last_seq = Some(fragment.arrival_seq);

        let Fragment { role, text, .. } = fragment;

        match self.open.as_mut() {
            None => {
                self.open = Some(OpenTurn { role, text });
            }
            Some(open) if open.role == role => {
                if text.len() > open.text.len() && text.starts_with(open.text.trim()) {
                    // Progressive refinement of the same utterance
                    open.text = text;
                } else if !open.text.contains(text.as_str()) {
                    // New clause from the same speaker
                    open.text.push(' ');
                    open.text.push_str(&text);
                } else {
                    debug!("Discarding stale {:?} fragment: {}", role, text);
                }
            }
            Some(_) => {
                self.close_open_turn();
                self.open = Some(OpenTurn { role, text });
            }
        }
    }

    /// Finalize the open turn, if any. Safe to call repeatedly.
    pub fn flush(&mut self) {
        self.close_open_turn();
    }

    /// Whether a turn is still accumulating
    pub fn has_open_turn(&self) -> bool {
        self.open.is_some()
    }

    /// Role of the open turn, if any
    pub fn open_role(&self) -> Option<Speaker> {
        self.open.as_ref().map(|open| open.role)
    }

    /// Finalized utterances so far (excludes the open turn)
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Flush and hand over the finished transcript
    pub fn finish(mut self) -> Transcript {
        self.flush();
        self.transcript
    }

    fn close_open_turn(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };

        let text = open.text.trim();
        if text.is_empty() {
            return;
        }

        let duplicate = self
            .transcript
            .last()
            .is_some_and(|last| last.role == open.role && last.text == text);
        if duplicate {
            debug!("Suppressing duplicate {:?} utterance", open.role);
            return;
        }

        self.transcript.push(Utterance::new(open.role, text));
    }
}
