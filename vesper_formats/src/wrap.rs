//! Word-wrap and pagination of decoded dialogue text.
//!
//! Layout is budgeted in characters: [`codes::LINE_WIDTH`] per line,
//! [`codes::PAGE_HEIGHT`] lines per page. A word is a run of non-space
//! characters together with the spaces that directly follow it; an embedded
//! [`codes::TEXT_END`] byte marks the end of the unit and occupies three
//! trailing spaces of layout width without producing any output characters.

use crate::codes;

/// One screen of dialogue text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub lines: Vec<String>,
}

struct Word {
    rendered: String,
    width: usize,
    end_marker: bool,
    next: usize,
}

fn next_word(text: &[u8], start: usize) -> Word {
    let mut pos = start;
    let mut rendered = String::new();
    let mut width = 0usize;

    while pos < text.len() && text[pos] != b' ' && text[pos] != codes::TEXT_END {
        if let Some(ch) = codes::display_char(text[pos]) {
            rendered.push(ch);
            width += 1;
        }
        pos += 1;
    }
    while pos < text.len() && text[pos] == b' ' {
        rendered.push(' ');
        width += 1;
        pos += 1;
    }

    let mut end_marker = false;
    if pos < text.len() && text[pos] == codes::TEXT_END {
        // Layout-equivalent to three trailing spaces, zero output chars.
        width += 3;
        pos += 1;
        end_marker = true;
    }

    Word {
        rendered,
        width,
        end_marker,
        next: pos,
    }
}

/// Split a decoded text run into pages. An empty run yields zero pages and
/// must not be rendered by the caller.
pub fn paginate(text: &[u8]) -> Vec<Page> {
    let mut pages: Vec<Page> = Vec::new();
    let mut page: Vec<String> = Vec::new();
    let mut words: Vec<String> = Vec::new();
    let mut budget = codes::LINE_WIDTH;
    let mut pos = 0;

    while pos < text.len() {
        let word = next_word(text, pos);
        pos = word.next;

        if word.width > budget {
            flush_line(&mut words, &mut page, &mut pages);
            budget = codes::LINE_WIDTH;
        }

        words.push(word.rendered);
        budget = budget.saturating_sub(word.width);

        if word.end_marker {
            if budget == 0 {
                // The unit ends exactly on the line boundary: flush the line
                // with its trailing spaces stripped and carry those spaces
                // into a line of their own, mirroring a mid-sentence page
                // split.
                let line: String = words.concat();
                words.clear();
                let trimmed = line.trim_end_matches(' ');
                let trailing = line.len() - trimmed.len();
                if !trimmed.is_empty() {
                    push_line(trimmed.to_string(), &mut page, &mut pages);
                }
                if trailing > 0 {
                    words.push(" ".repeat(trailing));
                }
            }
            break;
        }
    }

    flush_line(&mut words, &mut page, &mut pages);
    if !page.is_empty() {
        pages.push(Page { lines: page });
    }
    pages
}

fn flush_line(words: &mut Vec<String>, page: &mut Vec<String>, pages: &mut Vec<Page>) {
    if words.is_empty() {
        return;
    }
    let line: String = words.concat();
    words.clear();
    if line.is_empty() {
        return;
    }
    push_line(line, page, pages);
}

fn push_line(line: String, page: &mut Vec<String>, pages: &mut Vec<Page>) {
    page.push(line);
    if page.len() == codes::PAGE_HEIGHT {
        pages.push(Page {
            lines: std::mem::take(page),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::{LINE_WIDTH, PAGE_HEIGHT, TEXT_END};

    #[test]
    fn empty_run_yields_zero_pages() {
        assert!(paginate(b"").is_empty());
    }

    #[test]
    fn end_marker_only_yields_zero_pages() {
        assert!(paginate(&[TEXT_END]).is_empty());
    }

    #[test]
    fn short_run_with_end_marker_is_one_line() {
        let mut text = b"HELLO".to_vec();
        text.push(TEXT_END);
        let pages = paginate(&text);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].lines, vec!["HELLO".to_string()]);
    }

    #[test]
    fn wraps_when_word_exceeds_budget() {
        // Ten 9-wide words (8 chars + trailing space): four fit per 40-char
        // line, so the fifth starts a new line.
        let text: Vec<u8> = std::iter::repeat(&b"ABCDEFGH "[..])
            .take(10)
            .flatten()
            .copied()
            .collect();
        let pages = paginate(&text);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].lines.len(), 3);
        assert_eq!(pages[0].lines[0], "ABCDEFGH ".repeat(4));
        assert_eq!(pages[0].lines[2], "ABCDEFGH ".repeat(2));
    }

    #[test]
    fn page_flushes_at_height_limit() {
        // Each word fills a whole line, so every PAGE_HEIGHT words make a
        // page.
        let word = vec![b'X'; LINE_WIDTH];
        let mut text = Vec::new();
        for _ in 0..PAGE_HEIGHT + 1 {
            text.extend_from_slice(&word);
            text.push(b' ');
        }
        let pages = paginate(&text);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].lines.len(), PAGE_HEIGHT);
        assert_eq!(pages[1].lines.len(), 1);
    }

    #[test]
    fn exact_budget_end_marker_reseeds_trailing_spaces() {
        // 35 chars + 2 spaces + end marker (worth 3): exactly LINE_WIDTH.
        let mut text = vec![b'A'; 35];
        text.extend_from_slice(b"  ");
        text.push(TEXT_END);
        let pages = paginate(&text);
        assert_eq!(pages.len(), 1);
        assert_eq!(
            pages[0].lines,
            vec!["A".repeat(35), "  ".to_string()],
            "stripped trailing spaces should re-seed the next line"
        );
    }

    #[test]
    fn content_round_trips_without_spacing() {
        let text = b"THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG AND KEEPS RUNNING UNTIL IT DROPS";
        let pages = paginate(text);
        let mut joined = String::new();
        for page in &pages {
            for line in &page.lines {
                joined.push_str(line);
            }
        }
        let squashed: String = joined.chars().filter(|c| *c != ' ').collect();
        let original: String = text
            .iter()
            .map(|&b| b as char)
            .filter(|c| *c != ' ')
            .collect();
        assert_eq!(squashed, original);
    }

    #[test]
    fn oversized_word_still_lands_on_its_own_line() {
        let mut text = vec![b'W'; LINE_WIDTH + 5];
        text.push(b' ');
        text.extend_from_slice(b"TAIL");
        let pages = paginate(&text);
        assert_eq!(pages[0].lines.len(), 2);
        assert_eq!(pages[0].lines[0].trim_end(), "W".repeat(LINE_WIDTH + 5));
        assert_eq!(pages[0].lines[1], "TAIL");
    }

    #[test]
    fn accent_bytes_render_through_codepage() {
        let text = [0x90, b'T', b'E', TEXT_END];
        let pages = paginate(&text);
        assert_eq!(pages[0].lines, vec!["ÉTE".to_string()]);
    }
}
