use serde::{Deserialize, Serialize};

/// Who produced a piece of speech
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The voice assistant conducting the interview
    Interviewer,
    /// The person being interviewed
    Candidate,
}

impl Speaker {
    /// Label used when rendering the evaluation document
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Interviewer => "AI INTERVIEWER",
            Speaker::Candidate => "CANDIDATE",
        }
    }
}

/// A raw piece of streamed transcript text
///
/// Ordering by `arrival_seq` is the only ordering guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub role: Speaker,
    pub text: String,
    pub arrival_seq: u64,
}

impl Fragment {
    pub fn new(role: Speaker, text: impl Into<String>, arrival_seq: u64) -> Self {
        Self {
            role,
            text: text.into(),
            arrival_seq,
        }
    }
}

/// A finalized speaker turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub role: Speaker,
    pub text: String,
}

impl Utterance {
    pub fn new(role: Speaker, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Ordered sequence of finalized utterances for one session
///
/// Insertion order is finalization order. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    utterances: Vec<Utterance>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    pub fn last(&self) -> Option<&Utterance> {
        self.utterances.last()
    }

    pub(crate) fn push(&mut self, utterance: Utterance) {
        self.utterances.push(utterance);
    }
}

impl From<Vec<Utterance>> for Transcript {
    fn from(utterances: Vec<Utterance>) -> Self {
        Self { utterances }
    }
}
