pub mod host;
pub mod session;
pub mod transcript;

pub use host::{ChoiceView, InputSource, Presenter, ScriptedInput, StdoutPresenter};
pub use session::{Conversation, Status, TerminationReason};
pub use transcript::{RecordingPresenter, Transcript, TranscriptEvent};
