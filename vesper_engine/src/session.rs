//! Conversation traversal.
//!
//! One [`Conversation`] owns the cursor state over a borrowed room buffer
//! and is pumped from the host frame loop via [`Conversation::tick`]. A
//! tick performs work up to the next suspension point (a page waiting for
//! an advance, a choice set waiting for a selection) and returns; the
//! surrounding loop keeps rendering and polling while the conversation
//! holds still. Anomalies never escape as errors: malformed data, level
//! breaks, and truncation all degrade to a terminated conversation.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use vesper_formats::choice::{scan_choices, ChoiceRecord};
use vesper_formats::codes;
use vesper_formats::text::decode_text_block;
use vesper_formats::wrap::{paginate, Page};

use crate::host::{ChoiceView, InputSource, Presenter};

/// Why a conversation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The end-of-conversation marker was reached.
    EndOfConversation,
    /// The buffer ran out mid-stream; authored data for unreachable
    /// branches is often incomplete, so this is a normal end.
    EndOfBuffer,
    /// A scanned choice set did not continue at the expected branch depth.
    LevelMismatch,
    /// The host raised its quit signal at a suspension point.
    Aborted,
}

/// Result of one frame tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Finished(TerminationReason),
}

/// A resolved branch point. A single record is forced dialogue and plays
/// without prompting; only a real set of alternatives is offered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Branch {
    Forced(ChoiceRecord),
    Offered(Vec<ChoiceRecord>),
}

/// Split scanner output into the forced/offered cases. `None` means no
/// branch point: more linear dialogue follows.
pub fn classify_branch(mut records: Vec<ChoiceRecord>) -> Option<Branch> {
    match records.len() {
        0 => None,
        1 => Some(Branch::Forced(records.remove(0))),
        _ => Some(Branch::Offered(records)),
    }
}

/// Action decided by inspecting the current phase; applied outside the
/// phase borrow.
enum Step {
    Suspend,
    Continue,
    DecodeText,
    FinishText(usize),
    Select(usize, ChoiceRecord),
    Finished(TerminationReason),
}

enum Phase {
    AwaitingText,
    DisplayingText {
        pages: VecDeque<Page>,
        speaker: u8,
        /// Offset the run was decoded from.
        start: usize,
        /// Offset of the control byte that ended the run.
        after: usize,
        rendered: bool,
    },
    AwaitingSelection {
        records: Vec<ChoiceRecord>,
        presented: bool,
    },
    Terminated(TerminationReason),
}

/// Traversal state over one conversation buffer. At most one conversation
/// runs at a time; the buffer stays read-only for its whole lifetime.
pub struct Conversation<'a> {
    buf: &'a [u8],
    pos: usize,
    level: Option<u8>,
    phase: Phase,
}

impl<'a> Conversation<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        let mut pos = 0;
        while pos < buf.len() && codes::is_ignorable(buf[pos]) {
            pos += 1;
        }
        Conversation {
            buf,
            pos,
            level: None,
            phase: Phase::AwaitingText,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Branch level of the most recent selection, if any.
    pub fn current_level(&self) -> Option<u8> {
        self.level
    }

    pub fn termination(&self) -> Option<TerminationReason> {
        match self.phase {
            Phase::Terminated(reason) => Some(reason),
            _ => None,
        }
    }

    /// Advance the conversation by one frame. Runs decode work up to the
    /// next suspension point; returns [`Status::Running`] while suspended.
    pub fn tick(&mut self, input: &mut dyn InputSource, presenter: &mut dyn Presenter) -> Status {
        if input.quit_requested() && !matches!(self.phase, Phase::Terminated(_)) {
            log::debug!("conversation aborted by host at offset {:#06x}", self.pos);
            self.phase = Phase::Terminated(TerminationReason::Aborted);
        }

        loop {
            let step = match &mut self.phase {
                Phase::Terminated(reason) => Step::Finished(*reason),

                Phase::AwaitingText => Step::DecodeText,

                Phase::DisplayingText {
                    pages,
                    speaker,
                    start,
                    after,
                    rendered,
                } => {
                    if !*rendered {
                        match pages.front() {
                            Some(page) => {
                                presenter.note_cursor(*start);
                                presenter.render_page(&page.lines, *speaker);
                                *rendered = true;
                                Step::Suspend
                            }
                            None => Step::FinishText(*after),
                        }
                    } else if !input.advance_signal() {
                        Step::Suspend
                    } else {
                        pages.pop_front();
                        *rendered = false;
                        Step::Continue
                    }
                }

                Phase::AwaitingSelection { records, presented } => {
                    let views: Vec<ChoiceView> = records
                        .iter()
                        .map(|record| ChoiceView {
                            label: record.label.clone(),
                            enabled: record.enabled,
                        })
                        .collect();
                    if !*presented {
                        presenter.note_cursor(records[0].offset);
                        presenter.render_choice_set(&views);
                        *presented = true;
                        Step::Suspend
                    } else {
                        match input.selection_signal(&views) {
                            None => Step::Suspend,
                            Some(index) => match records.get(index) {
                                Some(record) => Step::Select(index, record.clone()),
                                None => {
                                    log::warn!("selection index {index} out of range, ignoring");
                                    Step::Suspend
                                }
                            },
                        }
                    }
                }
            };

            match step {
                Step::Finished(reason) => return Status::Finished(reason),
                Step::Suspend => return Status::Running,
                Step::Continue => {}
                Step::DecodeText => self.step_text(presenter),
                Step::FinishText(after) => self.finish_text(presenter, after),
                Step::Select(index, record) => self.select(presenter, index, &record),
            }
        }
    }

    /// Pump to completion with a non-interactive input source.
    pub fn run(
        &mut self,
        input: &mut dyn InputSource,
        presenter: &mut dyn Presenter,
    ) -> TerminationReason {
        loop {
            if let Status::Finished(reason) = self.tick(input, presenter) {
                return reason;
            }
        }
    }

    /// Decode the text run at the cursor and either queue its pages for
    /// display or, for trivial runs, go straight to terminator handling.
    fn step_text(&mut self, presenter: &mut dyn Presenter) {
        let block = decode_text_block(self.buf, self.pos);
        if !block.is_trivial() {
            let pages = paginate(&block.text);
            if !pages.is_empty() {
                self.phase = Phase::DisplayingText {
                    pages: pages.into(),
                    speaker: block.speaker,
                    start: self.pos,
                    after: block.next,
                    rendered: false,
                };
                return;
            }
        }
        self.finish_text(presenter, block.next);
    }

    /// Handle the control byte that ended a text run.
    fn finish_text(&mut self, presenter: &mut dyn Presenter, after: usize) {
        let Some(&code) = self.buf.get(after) else {
            self.terminate(TerminationReason::EndOfBuffer);
            return;
        };
        match code {
            codes::CONVO_END => self.terminate(TerminationReason::EndOfConversation),
            codes::TEXT_END | codes::ACTION | codes::BRANCH_END => {
                self.resume_at(presenter, after + 1)
            }
            _ => self.resume_at(presenter, after),
        }
    }

    /// Peek past ignorable bytes and decide between more linear dialogue
    /// and a branch point.
    fn resume_at(&mut self, presenter: &mut dyn Presenter, start: usize) {
        let mut pos = start.min(self.buf.len());
        while pos < self.buf.len() && codes::is_ignorable(self.buf[pos]) {
            pos += 1;
        }
        let Some(&next) = self.buf.get(pos) else {
            self.terminate(TerminationReason::EndOfBuffer);
            return;
        };

        if next == codes::CONVO_END {
            self.terminate(TerminationReason::EndOfConversation);
            return;
        }
        if !codes::is_choice_marker(next) {
            self.pos = pos;
            self.phase = Phase::AwaitingText;
            return;
        }

        let scan = scan_choices(self.buf, pos);
        match classify_branch(scan.records) {
            None => {
                // No usable records at the marker; treat as linear dialogue.
                self.pos = pos;
                self.phase = Phase::AwaitingText;
            }
            Some(branch) => self.enter_branch(presenter, branch),
        }
    }

    fn enter_branch(&mut self, presenter: &mut dyn Presenter, branch: Branch) {
        let set_level = match &branch {
            Branch::Forced(record) => record.level,
            Branch::Offered(records) => records[0].level,
        };
        if let Some(current) = self.level {
            let continues = current
                .checked_add(1)
                .map(|expected| expected == set_level)
                .unwrap_or(false);
            if !continues {
                log::warn!(
                    "choice set at level {set_level} does not continue depth {current}, ending conversation"
                );
                self.terminate(TerminationReason::LevelMismatch);
                return;
            }
        }

        match branch {
            Branch::Forced(record) => self.select(presenter, 0, &record),
            Branch::Offered(records) => {
                self.phase = Phase::AwaitingSelection {
                    records,
                    presented: false,
                };
            }
        }
    }

    fn select(&mut self, presenter: &mut dyn Presenter, index: usize, record: &ChoiceRecord) {
        log::debug!(
            "selected level {} record at {:#06x}",
            record.level,
            record.offset
        );
        presenter.note_selection(index, record.offset);
        self.pos = record.offset;
        self.level = Some(record.level);
        self.phase = Phase::AwaitingText;
    }

    fn terminate(&mut self, reason: TerminationReason) {
        log::debug!("conversation terminated: {reason:?} at offset {:#06x}", self.pos);
        self.phase = Phase::Terminated(reason);
    }
}
