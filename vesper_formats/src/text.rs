//! Text-block decoder for the conversation stream.
//!
//! A text block is a run of printable bytes, optionally prefixed by a
//! speaker-id marker or a choice-record header, terminated by any control
//! byte. The terminator is never consumed; callers branch on it.

use crate::codes;

/// One decoded run of dialogue text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    /// Decoded text bytes: printable range only, with line continuations
    /// and page breaks already collapsed to single spaces.
    pub text: Vec<u8>,
    /// Speaker tag attributed to this run.
    pub speaker: u8,
    /// Offset of the terminating control byte (unconsumed), or the buffer
    /// length when the run ended at end of data.
    pub next: usize,
}

impl TextBlock {
    /// Display form of the run, with the accent block mapped through the
    /// codepage table.
    pub fn display_text(&self) -> String {
        self.text
            .iter()
            .filter_map(|&byte| codes::display_char(byte))
            .collect()
    }

    /// Runs of one character or less are stray bytes misparsed as text and
    /// must not be rendered.
    pub fn is_trivial(&self) -> bool {
        self.text.len() <= 1
    }
}

/// Decode the text block starting at `start`.
///
/// All reads are bounds-checked; a truncated buffer yields a (possibly
/// empty) block whose `next` equals the buffer length.
pub fn decode_text_block(buf: &[u8], start: usize) -> TextBlock {
    let mut pos = start.min(buf.len());

    while pos < buf.len() && codes::is_ignorable(buf[pos]) {
        pos += 1;
    }

    let mut speaker = codes::PROTAGONIST;
    match buf.get(pos) {
        Some(&codes::SPEAKER) => {
            // Marker plus the tag byte. A marker on the last byte of the
            // buffer is treated as end of data.
            match buf.get(pos + 1) {
                Some(&tag) => {
                    speaker = tag;
                    pos += 2;
                }
                None => pos = buf.len(),
            }
        }
        Some(&marker) if codes::is_choice_marker(marker) => {
            // Marker, choice index, two reserved bytes. Choice labels are
            // always spoken by the protagonist.
            pos = (pos + 4).min(buf.len());
        }
        _ => {}
    }

    let mut text = Vec::new();
    while pos < buf.len() {
        let byte = buf[pos];
        if codes::is_text_stop(byte) {
            break;
        }
        if byte == codes::LINE_CONT || byte == codes::PAGE_BREAK {
            text.push(b' ');
        } else if codes::is_printable(byte) {
            text.push(byte);
        }
        pos += 1;
    }

    TextBlock {
        text,
        speaker,
        next: pos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::*;

    #[test]
    fn stops_at_control_byte_without_consuming_it() {
        let buf = [b'H', b'I', TEXT_END, b'X'];
        let block = decode_text_block(&buf, 0);
        assert_eq!(block.text, b"HI");
        assert_eq!(block.next, 2);
        assert_eq!(buf[block.next], TEXT_END);
    }

    #[test]
    fn consumes_speaker_marker_and_tag() {
        let buf = [SPEAKER, 0x03, b'Y', b'O', CONVO_END];
        let block = decode_text_block(&buf, 0);
        assert_eq!(block.speaker, 0x03);
        assert_eq!(block.text, b"YO");
        assert_eq!(block.next, 4);
    }

    #[test]
    fn choice_header_forces_protagonist_tag() {
        // Marker, choice index, two reserved bytes, then label text. The
        // reserved bytes past the consumed header are unprintable and
        // silently dropped.
        let buf = [CHOICE, 0x02, 0x00, 0x00, 0x00, 0x00, b'M', b'E', TEXT_END];
        let block = decode_text_block(&buf, 0);
        assert_eq!(block.speaker, PROTAGONIST);
        assert_eq!(block.text, b"ME");
        assert_eq!(block.next, 8);
    }

    #[test]
    fn skips_leading_ignorable_markers() {
        let buf = [ALT_END_1, TERMINATOR, BACK_REF, b'O', b'K', TEXT_END];
        let block = decode_text_block(&buf, 0);
        assert_eq!(block.text, b"OK");
        assert_eq!(block.next, 5);
    }

    #[test]
    fn continuation_and_page_break_become_spaces() {
        let buf = [b'A', LINE_CONT, b'B', PAGE_BREAK, b'C', TEXT_END];
        let block = decode_text_block(&buf, 0);
        assert_eq!(block.text, b"A B C");
    }

    #[test]
    fn accent_bytes_survive_and_display() {
        let buf = [b'N', 0xA4, b'U', TEXT_END];
        let block = decode_text_block(&buf, 0);
        assert_eq!(block.text, vec![b'N', 0xA4, b'U']);
        assert_eq!(block.display_text(), "NñU");
    }

    #[test]
    fn truncated_speaker_marker_ends_cleanly() {
        let buf = [SPEAKER];
        let block = decode_text_block(&buf, 0);
        assert!(block.text.is_empty());
        assert_eq!(block.next, buf.len());
    }

    #[test]
    fn start_past_end_is_empty() {
        let buf = [b'A', TEXT_END];
        let block = decode_text_block(&buf, 10);
        assert!(block.text.is_empty());
        assert_eq!(block.next, buf.len());
    }

    #[test]
    fn never_reads_past_buffer_length() {
        // Exhaustive-ish sweep over hostile prefixes of a real-looking blob.
        let blob = [
            SPEAKER, 0x01, b'H', b'E', b'Y', LINE_CONT, TEXT_END, CHOICE, 0x01, 0x00, 0x00, 0x00,
            0x00, b'S', b'O', CONVO_END,
        ];
        for end in 0..=blob.len() {
            for start in 0..=end + 2 {
                let block = decode_text_block(&blob[..end], start);
                assert!(block.next <= end);
            }
        }
    }

    #[test]
    fn trivial_guard_matches_single_byte_runs() {
        let buf = [b'A', TEXT_END];
        assert!(decode_text_block(&buf, 0).is_trivial());
        let buf = [b'A', b'B', TEXT_END];
        assert!(!decode_text_block(&buf, 0).is_trivial());
    }
}
