//! Choice-table scanner.
//!
//! A branch point is a run of dialogue/choice records sharing one level
//! byte. The scanner collects every same-level record reachable from a
//! start offset, stopping at a lower-level record (it belongs to an
//! earlier, already-consumed branch) or at any end marker.

use serde::Serialize;

use crate::codes;

/// One scanned dialogue/choice record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceRecord {
    /// Branch level shared by every record in the set.
    pub level: u8,
    /// Offset of the record's marker byte; re-decoding from here yields the
    /// choice's own dialogue body.
    pub offset: usize,
    /// Decoded label text.
    pub label: String,
    /// False when the record used the disabled marker variant.
    pub enabled: bool,
}

/// Result of one forward scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceScan {
    pub records: Vec<ChoiceRecord>,
    /// Offset at which the scan stopped.
    pub next: usize,
}

impl ChoiceScan {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Scan forward from `start` and collect the choice set anchored there.
///
/// An empty result means no branch point before the next end marker: more
/// linear dialogue follows. Never reads past the buffer.
pub fn scan_choices(buf: &[u8], start: usize) -> ChoiceScan {
    let mut pos = start.min(buf.len());
    let mut records: Vec<ChoiceRecord> = Vec::new();
    let mut set_level: Option<u8> = None;

    while pos < buf.len() {
        let byte = buf[pos];

        if codes::is_choice_marker(byte) {
            let Some(&level) = buf.get(pos + 1) else {
                // Record truncated right after the marker byte.
                pos = buf.len();
                break;
            };

            match set_level {
                Some(current) if level < current => break,
                Some(current) if level > current => {
                    // A deeper branch body between our records; step over
                    // its label and keep scanning.
                    pos = skip_label(buf, pos);
                    continue;
                }
                _ => {}
            }

            set_level = Some(level);
            let (label, after) = decode_label(buf, pos);
            records.push(ChoiceRecord {
                level,
                offset: pos,
                label,
                enabled: byte != codes::CHOICE_OFF,
            });
            pos = after;
            continue;
        }

        if matches!(
            byte,
            codes::BRANCH_END
                | codes::CONVO_END
                | codes::ALT_END_1
                | codes::ALT_END_2
                | codes::ALT_END_3
        ) {
            break;
        }

        pos += 1;
    }

    ChoiceScan { records, next: pos }
}

/// Decode a record's label. The label starts [`codes::CHOICE_LABEL_SKIP`]
/// bytes past the marker (level byte plus four reserved bytes) and runs to
/// the next stopping control byte; continuation and page-break bytes read
/// as spaces, same as in dialogue bodies. A byte is kept only if the
/// codepage table gives it a display form; everything else is dropped.
fn decode_label(buf: &[u8], marker_pos: usize) -> (String, usize) {
    let mut pos = (marker_pos + codes::CHOICE_LABEL_SKIP).min(buf.len());
    let mut label = String::new();
    while pos < buf.len() {
        let byte = buf[pos];
        if byte == codes::LINE_CONT || byte == codes::PAGE_BREAK {
            label.push(' ');
            pos += 1;
            continue;
        }
        if codes::is_control(byte) {
            break;
        }
        if let Some(ch) = codes::display_char(byte) {
            label.push(ch);
        }
        pos += 1;
    }
    (label, pos)
}

fn skip_label(buf: &[u8], marker_pos: usize) -> usize {
    decode_label(buf, marker_pos).1
}
