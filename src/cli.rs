// ============================================================================
// PhotoFE CLI — headless editing session via command-line arguments
// ============================================================================
//
// Usage examples:
//   photofe --input photo.png --effect grayscale --output result.png
//   photofe -i photo.jpg -e sepia -e blur --save
//   photofe --load 1724680000000 -e invert -o restored.png
//   photofe --list-saved
//   photofe --clear-saved --yes
//
// All processing runs synchronously on the current thread; every operation
// completes (or fails) before the next one is issued.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use crate::error::EditorError;
use crate::gateway::FilterGateway;
use crate::ops::effects::Effect;
use crate::session::SessionController;
use crate::store::SnapshotStore;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// PhotoFE headless photo editor.
///
/// Load an image, apply pixel effects with full undo/redo, and archive
/// snapshots to the local store — no browser required.
#[derive(Parser, Debug)]
#[command(
    name = "photofe",
    about = "PhotoFE headless photo editing session",
    long_about = "Load an image, apply effects (grayscale, sepia, cold-inverse,\n\
                  spectral-glow, invert, blur) with undo/redo, write the result,\n\
                  and archive or browse saved snapshots.\n\n\
                  Example:\n  \
                  photofe --input photo.png --effect grayscale --output result.png\n  \
                  photofe -i photo.jpg -e sepia -e blur --save"
)]
pub struct CliArgs {
    /// Input image to load into the session (PNG, JPEG, WEBP, BMP).
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Saved record id to load instead of --input.
    #[arg(long, value_name = "ID", conflicts_with = "input")]
    pub load: Option<i64>,

    /// Effect(s) to apply, in order. May be repeated.
    /// One of: grayscale, sepia, cold-inverse, spectral-glow, invert, blur.
    #[arg(short, long = "effect", value_name = "EFFECT")]
    pub effects: Vec<String>,

    /// Undo this many steps after applying the effects.
    #[arg(long, default_value_t = 0, value_name = "N")]
    pub undo: usize,

    /// Redo this many steps after undoing.
    #[arg(long, default_value_t = 0, value_name = "N")]
    pub redo: usize,

    /// Write the final canvas to this file as PNG.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Archive the final canvas to the snapshot store and end the session.
    #[arg(long)]
    pub save: bool,

    /// List saved snapshots (newest first) and exit.
    #[arg(long)]
    pub list_saved: bool,

    /// Delete every saved snapshot. Irreversible; requires --yes.
    #[arg(long)]
    pub clear_saved: bool,

    /// Confirm destructive operations without prompting.
    #[arg(long)]
    pub yes: bool,

    /// Snapshot store directory (defaults to the OS data dir).
    #[arg(long, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,

    /// Print per-step progress information.
    #[arg(short, long)]
    pub verbose: bool,
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run the CLI session and return an OS exit code.
/// `0` = success, `1` = any operation failed.
pub fn run(args: CliArgs) -> ExitCode {
    match run_inner(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_inner(args: &CliArgs) -> Result<(), String> {
    let store = match &args.store_dir {
        Some(dir) => SnapshotStore::open(dir),
        None => SnapshotStore::open_default(),
    }
    .map_err(|e| e.to_string())?;

    let mut session = SessionController::new(store, FilterGateway::native());

    // -- Store inspection / maintenance modes ---------------------------
    if args.list_saved {
        return list_saved(&session);
    }
    if args.clear_saved {
        if !args.yes {
            return Err(
                "refusing to clear the snapshot store without --yes (this is irreversible)"
                    .to_string(),
            );
        }
        let removed = session.clear_saved().map_err(|e| e.to_string())?;
        println!("cleared {} saved snapshot(s)", removed);
        return Ok(());
    }

    // -- Session setup ---------------------------------------------------
    if let Some(id) = args.load {
        let record = session
            .saved_images()
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| format!("no saved snapshot with id {}", id))?;
        session
            .load_saved(&record.content)
            .map_err(|e| e.to_string())?;
        if args.verbose {
            println!("loaded saved snapshot {}", id);
        }
    } else if let Some(input) = &args.input {
        let bytes = std::fs::read(input)
            .map_err(|e| format!("could not read '{}': {}", input.display(), e))?;
        session.ingest(&bytes).map_err(|e| e.to_string())?;
        if args.verbose {
            println!(
                "loaded {} -> {}x{}",
                input.display(),
                session.canvas().width(),
                session.canvas().height()
            );
        }
    } else {
        return Err("nothing to do: pass --input, --load, --list-saved or --clear-saved".to_string());
    }

    // -- Effect chain ----------------------------------------------------
    for name in &args.effects {
        let effect = Effect::parse(name).ok_or_else(|| {
            let known: Vec<&str> = Effect::all().iter().map(|e| e.name()).collect();
            format!(
                "unknown effect '{}' (expected one of: {})",
                name,
                known.join(", ")
            )
        })?;
        session.apply_effect(effect).map_err(|e| e.to_string())?;
        if args.verbose {
            println!("applied {}", effect);
        }
    }

    // -- Undo / redo -----------------------------------------------------
    for _ in 0..args.undo {
        if !step(&mut session, true)? {
            if args.verbose {
                println!("nothing left to undo");
            }
            break;
        }
    }
    for _ in 0..args.redo {
        if !step(&mut session, false)? {
            if args.verbose {
                println!("nothing left to redo");
            }
            break;
        }
    }

    // -- Output ----------------------------------------------------------
    if let Some(output) = &args.output {
        let snapshot = session.canvas().snapshot().map_err(|e| e.to_string())?;
        std::fs::write(output, &snapshot.content)
            .map_err(|e| format!("could not write '{}': {}", output.display(), e))?;
        println!("wrote {}", output.display());
    }

    if args.save {
        let record = session.save().map_err(|e| e.to_string())?;
        println!(
            "saved snapshot {} ({} bytes)",
            record.id,
            record.content.len()
        );
    }

    Ok(())
}

fn step(session: &mut SessionController, undo: bool) -> Result<bool, String> {
    let moved = if undo { session.undo() } else { session.redo() };
    moved.map_err(|e: EditorError| e.to_string())
}

fn list_saved(session: &SessionController) -> Result<(), String> {
    let records = session.saved_images();
    if records.is_empty() {
        println!("no saved snapshots");
        return Ok(());
    }
    for record in records {
        println!(
            "{}  {}  {} bytes",
            record.id,
            format_timestamp(record.created_at_ms),
            record.content.len()
        );
    }
    Ok(())
}

/// Compact timestamp display. Unix seconds plus time of day — enough to
/// tell records apart without a date-time dependency.
fn format_timestamp(ms: i64) -> String {
    let secs = ms / 1000;
    let (h, m, s) = ((secs % 86400) / 3600, (secs % 3600) / 60, secs % 60);
    format!("unix {} ({:02}:{:02}:{:02} UTC)", secs, h, m, s)
}
