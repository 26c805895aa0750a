pub mod choice;
pub mod codes;
pub mod text;
pub mod wrap;

pub use choice::{scan_choices, ChoiceRecord, ChoiceScan};
pub use text::{decode_text_block, TextBlock};
pub use wrap::{paginate, Page};
