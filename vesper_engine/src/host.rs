//! Host-side collaborators of the conversation session.
//!
//! The session itself only renders through [`Presenter`] and waits on
//! [`InputSource`]; everything about layout, positioning, and real input
//! devices lives behind these seams.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// One selectable entry as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceView {
    pub label: String,
    pub enabled: bool,
}

/// Rendering half of the presentation adapter.
pub trait Presenter {
    /// Display one page of dialogue. Called once per page; the adapter
    /// positions the text relative to the speaking character.
    fn render_page(&mut self, lines: &[String], speaker: u8);

    /// Display a choice set on entering selection. Disabled entries are
    /// expected to be visibly marked.
    fn render_choice_set(&mut self, choices: &[ChoiceView]);

    /// Buffer offset the next render call originates from. Pure display
    /// implementations can ignore this; the transcript recorder uses it to
    /// stamp events.
    fn note_cursor(&mut self, _offset: usize) {}

    /// A choice was taken (by the user or as forced dialogue): its index
    /// within the presented set and the offset of the chosen record.
    fn note_selection(&mut self, _index: usize, _offset: usize) {}
}

/// Input half of the presentation adapter, polled once per frame.
pub trait InputSource {
    /// Edge event: the user asked for the next page.
    fn advance_signal(&mut self) -> bool;

    /// Selection made this frame, if any. The pending choice set is passed
    /// in so policy-driven sources can pick without seeing real input.
    fn selection_signal(&mut self, choices: &[ChoiceView]) -> Option<usize>;

    /// Global shutdown signal, checked at every suspension point.
    fn quit_requested(&self) -> bool {
        false
    }
}

/// What [`ScriptedInput`] does once its selection script runs dry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Pick the first enabled choice (first choice overall when every entry
    /// is disabled).
    FirstEnabled,
    /// Stall; the source then raises `quit_requested` so the session aborts
    /// instead of spinning forever.
    Abort,
}

/// Non-interactive input: always advances, answers branch points from a
/// pre-seeded selection list.
#[derive(Debug)]
pub struct ScriptedInput {
    script: VecDeque<usize>,
    fallback: Fallback,
    stalled: bool,
}

impl ScriptedInput {
    pub fn new<I: IntoIterator<Item = usize>>(script: I, fallback: Fallback) -> Self {
        ScriptedInput {
            script: script.into_iter().collect(),
            fallback,
            stalled: false,
        }
    }

    pub fn auto() -> Self {
        Self::new([], Fallback::FirstEnabled)
    }
}

impl InputSource for ScriptedInput {
    fn advance_signal(&mut self) -> bool {
        true
    }

    fn selection_signal(&mut self, choices: &[ChoiceView]) -> Option<usize> {
        if let Some(index) = self.script.pop_front() {
            return Some(index);
        }
        match self.fallback {
            Fallback::FirstEnabled => {
                let first_enabled = choices.iter().position(|c| c.enabled);
                Some(first_enabled.unwrap_or(0))
            }
            Fallback::Abort => {
                self.stalled = true;
                None
            }
        }
    }

    fn quit_requested(&self) -> bool {
        self.stalled
    }
}

/// Terminal presenter used by the CLI player.
#[derive(Debug, Default)]
pub struct StdoutPresenter;

impl Presenter for StdoutPresenter {
    fn render_page(&mut self, lines: &[String], speaker: u8) {
        let mut prefix = format!("[{speaker:02x}]");
        for line in lines {
            println!("{prefix} {line}");
            prefix = "    ".to_string();
        }
        println!();
    }

    fn render_choice_set(&mut self, choices: &[ChoiceView]) {
        for (index, choice) in choices.iter().enumerate() {
            if choice.enabled {
                println!("  {index}) {}", choice.label);
            } else {
                println!("  -) {}", choice.label);
            }
        }
        println!();
    }
}

/// Presenter that discards everything; handy for sessions that only need
/// traversal, not display.
#[derive(Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn render_page(&mut self, _lines: &[String], _speaker: u8) {}
    fn render_choice_set(&mut self, _choices: &[ChoiceView]) {}
}
