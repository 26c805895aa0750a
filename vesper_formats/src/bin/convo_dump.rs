use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use vesper_formats::choice::{scan_choices, ChoiceRecord};
use vesper_formats::codes;
use vesper_formats::text::decode_text_block;

/// Inspect a room conversation blob and list its text blocks and choice
/// tables without playing it.
#[derive(Parser)]
struct Args {
    /// Path to the conversation blob to inspect
    path: PathBuf,

    /// Write the walk as a JSON manifest instead of the table view
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum DumpEntry {
    Text {
        offset: usize,
        speaker: u8,
        text: String,
    },
    ChoiceTable {
        offset: usize,
        level: u8,
        records: Vec<ChoiceRecord>,
    },
    End {
        offset: usize,
        marker: u8,
    },
}

#[derive(Serialize)]
struct DumpManifest {
    size: usize,
    entries: Vec<DumpEntry>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let bytes = fs::read(&args.path)
        .with_context(|| format!("reading conversation blob {}", args.path.display()))?;

    let manifest = walk(&bytes);

    if args.json {
        let json = serde_json::to_string_pretty(&manifest)
            .context("serializing conversation manifest to JSON")?;
        println!("{json}");
        return Ok(());
    }

    println!("conversation: {} bytes", manifest.size);
    for entry in &manifest.entries {
        match entry {
            DumpEntry::Text {
                offset,
                speaker,
                text,
            } => {
                println!("{offset:#06x}  text    [{speaker:02x}] {text}");
            }
            DumpEntry::ChoiceTable {
                offset,
                level,
                records,
            } => {
                println!("{offset:#06x}  choices level {level}");
                for record in records {
                    let flag = if record.enabled { ' ' } else { '-' };
                    println!("         {flag} {:#06x} {}", record.offset, record.label);
                }
            }
            DumpEntry::End { offset, marker } => {
                println!("{offset:#06x}  end     marker {marker:#04x}");
            }
        }
    }

    Ok(())
}

/// Static walk of the blob: every text block in stream order, each choice
/// table expanded in place. Branch levels are not enforced here; this is a
/// listing, not a playthrough.
fn walk(buf: &[u8]) -> DumpManifest {
    let mut entries = Vec::new();
    let mut pos = 0usize;

    while pos < buf.len() {
        if codes::is_choice_marker(buf[pos]) {
            let scan = scan_choices(buf, pos);
            if let Some(first) = scan.records.first() {
                entries.push(DumpEntry::ChoiceTable {
                    offset: pos,
                    level: first.level,
                    records: scan.records,
                });
                pos = scan.next.max(pos + 1);
                continue;
            }
            // Truncated record; fall through to the text decoder, which is
            // bounds-safe.
        }

        let block = decode_text_block(buf, pos);
        if !block.text.is_empty() {
            entries.push(DumpEntry::Text {
                offset: pos,
                speaker: block.speaker,
                text: block.display_text(),
            });
        }

        match buf.get(block.next) {
            None => break,
            Some(&codes::CONVO_END) => {
                entries.push(DumpEntry::End {
                    offset: block.next,
                    marker: codes::CONVO_END,
                });
                break;
            }
            Some(&marker) if codes::is_choice_marker(marker) => {
                pos = block.next;
            }
            Some(_) => {
                pos = (block.next + 1).max(pos + 1);
            }
        }
    }

    DumpManifest {
        size: buf.len(),
        entries,
    }
}
