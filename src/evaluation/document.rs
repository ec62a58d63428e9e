use crate::transcript::Transcript;

/// First line of every evaluation document
pub const DOCUMENT_HEADER: &str = "INTERVIEW TRANSCRIPT";

/// Render a transcript into the scoring-ready document
///
/// A header line followed by one `LABEL: text` line per utterance,
/// blocks separated by blank lines. Deterministic for a given transcript.
pub fn render_document(transcript: &Transcript) -> String {
    let mut document = String::from(DOCUMENT_HEADER);

    for utterance in transcript.utterances() {
        document.push_str("\n\n");
        document.push_str(utterance.role.label());
        document.push_str(": ");
        document.push_str(&utterance.text);
    }

    document
}
