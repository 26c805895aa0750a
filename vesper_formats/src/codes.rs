//! Control-code grammar for the room conversation stream.
//!
//! A conversation blob is a flat byte sequence with no record boundaries;
//! structure comes entirely from the reserved marker bytes below. Every
//! decoder in this crate branches on these constants rather than on inline
//! magic so the grammar lives in exactly one place.

/// End of one text unit; the current page run stops here.
pub const TEXT_END: u8 = 0xF1;
/// End of the whole conversation.
pub const CONVO_END: u8 = 0xF2;
/// Host-side action trigger; terminates text like [`TEXT_END`].
pub const ACTION: u8 = 0xF3;
/// End of a dialogue branch.
pub const BRANCH_END: u8 = 0xF4;
/// Dialogue/choice record marker.
pub const CHOICE: u8 = 0xF5;
/// Equivalent record marker for a choice that starts out disabled.
pub const CHOICE_OFF: u8 = 0xF6;
/// Stream terminator.
pub const TERMINATOR: u8 = 0xF7;
/// Alternate end markers. `ALT_END_3` is only meaningful while scanning
/// choice tables.
pub const ALT_END_1: u8 = 0xF8;
pub const ALT_END_2: u8 = 0xF9;
pub const ALT_END_3: u8 = 0xFA;
/// Back-reference to an earlier record.
pub const BACK_REF: u8 = 0xFB;
/// Speaker-id marker; the following byte is the speaker tag.
pub const SPEAKER: u8 = 0xFC;
/// Soft line continuation inside a text unit; decodes to a single space.
pub const LINE_CONT: u8 = 0xFD;
/// Internal page break; also decodes to a single space so the word on
/// either side keeps its boundary.
pub const PAGE_BREAK: u8 = 0xFE;

/// Speaker tag for the player character. Choice labels are always spoken
/// by the protagonist regardless of any surrounding speaker marker.
pub const PROTAGONIST: u8 = 0x00;

/// Character budget of one rendered line.
pub const LINE_WIDTH: usize = 40;
/// Lines per page before a fresh page is required.
pub const PAGE_HEIGHT: usize = 3;

/// Number of bytes between a choice marker and its label text:
/// level byte, two reserved bytes, two more reserved bytes.
pub const CHOICE_LABEL_SKIP: usize = 6;

const ACCENT_BASE: u8 = 0x80;

/// Display forms for the extended accent block `0x80..=0xA5`, following the
/// DOS codepage the room assets were authored against.
const ACCENT_TABLE: [char; 38] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', 'É', 'æ', 'Æ',
    'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', 'á', 'í', 'ó', 'ú', 'ñ', 'Ñ',
];

/// True for every reserved marker byte.
pub fn is_control(byte: u8) -> bool {
    (TEXT_END..=PAGE_BREAK).contains(&byte)
}

/// Markers that may be skipped wherever the stream allows padding:
/// the alternate end markers, the terminator, and back-references.
pub fn is_ignorable(byte: u8) -> bool {
    matches!(byte, ALT_END_1 | ALT_END_2 | TERMINATOR | BACK_REF)
}

/// Either encoding of a dialogue/choice record marker.
pub fn is_choice_marker(byte: u8) -> bool {
    matches!(byte, CHOICE | CHOICE_OFF)
}

/// Control bytes that terminate a text unit. Line continuations and page
/// breaks are not in this set; they decode to spaces instead.
pub fn is_text_stop(byte: u8) -> bool {
    matches!(
        byte,
        TEXT_END
            | CONVO_END
            | ACTION
            | BRANCH_END
            | CHOICE
            | CHOICE_OFF
            | TERMINATOR
            | ALT_END_1
            | ALT_END_2
            | BACK_REF
            | SPEAKER
    )
}

/// Bytes carried verbatim into a decoded text run: plain ASCII plus the
/// extended accent block.
pub fn is_printable(byte: u8) -> bool {
    (0x20..=0x7E).contains(&byte) || accent_char(byte).is_some()
}

fn accent_char(byte: u8) -> Option<char> {
    if byte < ACCENT_BASE {
        return None;
    }
    ACCENT_TABLE.get((byte - ACCENT_BASE) as usize).copied()
}

/// Display form of a decoded text byte, or `None` for anything that has no
/// printable representation.
pub fn display_char(byte: u8) -> Option<char> {
    if (0x20..=0x7E).contains(&byte) {
        return Some(byte as char);
    }
    accent_char(byte)
}
