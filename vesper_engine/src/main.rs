use std::fs;

use anyhow::{Context, Result};

use vesper_engine::host::{Fallback, ScriptedInput, StdoutPresenter};
use vesper_engine::session::Conversation;
use vesper_engine::transcript::RecordingPresenter;

mod cli;

fn main() -> Result<()> {
    env_logger::init();
    let args = cli::parse();

    let bytes = fs::read(&args.convo)
        .with_context(|| format!("reading conversation blob {}", args.convo.display()))?;
    let script = args.selection_script()?;

    let fallback = if args.auto {
        Fallback::FirstEnabled
    } else {
        Fallback::Abort
    };
    let mut input = ScriptedInput::new(script, fallback);
    let mut presenter = RecordingPresenter::new(StdoutPresenter);

    let mut conversation = Conversation::new(&bytes);
    let reason = conversation.run(&mut input, &mut presenter);

    let transcript = presenter.into_transcript(reason);
    println!(
        "conversation ended: {} pages, reason {:?}",
        transcript.page_count(),
        reason
    );

    if let Some(path) = args.transcript_json.as_ref() {
        let json = serde_json::to_string_pretty(&transcript)
            .context("serializing conversation transcript to JSON")?;
        fs::write(path, &json)
            .with_context(|| format!("writing conversation transcript to {}", path.display()))?;
        println!("Saved conversation transcript to {}", path.display());
    }

    Ok(())
}
