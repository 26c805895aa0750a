//! Ordered record of everything a conversation rendered.
//!
//! The transcript captures the observable output stream (pages, choice
//! sets, and the selections taken through them) plus the final
//! termination, in presentation order. Events carry the buffer offset
//! they came from so a transcript line can be traced back to the room
//! data. The CLI writes it out as pretty JSON for regression diffing.

use serde::{Deserialize, Serialize};

use crate::host::{ChoiceView, Presenter};
use crate::session::TerminationReason;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptEvent {
    Page {
        offset: usize,
        speaker: u8,
        lines: Vec<String>,
    },
    ChoiceSet {
        offset: usize,
        choices: Vec<ChoiceView>,
    },
    Selected {
        index: usize,
        offset: usize,
    },
    Terminated {
        reason: TerminationReason,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub events: Vec<TranscriptEvent>,
}

impl Transcript {
    pub fn page_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, TranscriptEvent::Page { .. }))
            .count()
    }
}

/// Presenter wrapper that records every render call while forwarding it to
/// an inner presenter.
pub struct RecordingPresenter<P> {
    inner: P,
    events: Vec<TranscriptEvent>,
    cursor: usize,
}

impl<P: Presenter> RecordingPresenter<P> {
    pub fn new(inner: P) -> Self {
        RecordingPresenter {
            inner,
            events: Vec::new(),
            cursor: 0,
        }
    }

    pub fn events(&self) -> &[TranscriptEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<TranscriptEvent> {
        self.events
    }

    /// Close the recording with the session's end state.
    pub fn into_transcript(mut self, reason: TerminationReason) -> Transcript {
        self.events.push(TranscriptEvent::Terminated { reason });
        Transcript {
            events: self.events,
        }
    }
}

impl<P: Presenter> Presenter for RecordingPresenter<P> {
    fn render_page(&mut self, lines: &[String], speaker: u8) {
        self.events.push(TranscriptEvent::Page {
            offset: self.cursor,
            speaker,
            lines: lines.to_vec(),
        });
        self.inner.render_page(lines, speaker);
    }

    fn render_choice_set(&mut self, choices: &[ChoiceView]) {
        self.events.push(TranscriptEvent::ChoiceSet {
            offset: self.cursor,
            choices: choices.to_vec(),
        });
        self.inner.render_choice_set(choices);
    }

    fn note_cursor(&mut self, offset: usize) {
        self.cursor = offset;
        self.inner.note_cursor(offset);
    }

    fn note_selection(&mut self, index: usize, offset: usize) {
        self.events.push(TranscriptEvent::Selected { index, offset });
        self.inner.note_selection(index, offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullPresenter;

    #[test]
    fn records_render_calls_in_order() {
        let mut presenter = RecordingPresenter::new(NullPresenter);
        presenter.note_cursor(0x10);
        presenter.render_page(&["ONE".to_string()], 2);
        presenter.note_cursor(0x20);
        presenter.render_choice_set(&[ChoiceView {
            label: "PICK".to_string(),
            enabled: true,
        }]);
        presenter.note_selection(0, 0x20);
        let transcript = presenter.into_transcript(TerminationReason::EndOfConversation);
        assert_eq!(transcript.events.len(), 4);
        assert_eq!(transcript.page_count(), 1);
        assert!(matches!(
            transcript.events[0],
            TranscriptEvent::Page { offset: 0x10, .. }
        ));
        assert!(matches!(
            transcript.events[1],
            TranscriptEvent::ChoiceSet { offset: 0x20, .. }
        ));
        assert!(matches!(
            transcript.events[2],
            TranscriptEvent::Selected {
                index: 0,
                offset: 0x20
            }
        ));
        assert!(matches!(
            transcript.events.last(),
            Some(TranscriptEvent::Terminated {
                reason: TerminationReason::EndOfConversation
            })
        ));
    }

    #[test]
    fn transcript_round_trips_through_json() {
        let transcript = Transcript {
            events: vec![
                TranscriptEvent::Page {
                    offset: 0,
                    speaker: 0,
                    lines: vec!["HI".to_string()],
                },
                TranscriptEvent::Selected {
                    index: 1,
                    offset: 0x2A,
                },
                TranscriptEvent::Terminated {
                    reason: TerminationReason::EndOfBuffer,
                },
            ],
        };
        let json = serde_json::to_string_pretty(&transcript).expect("serializes");
        let parsed: Transcript = serde_json::from_str(&json).expect("parses back");
        assert_eq!(parsed, transcript);
    }
}
