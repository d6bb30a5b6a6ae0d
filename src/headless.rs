//! Console mode: commands from stdin, frames written to a PNG file

use crate::acquisition::{Acquisition, CommandSource, DisplaySink};
use crate::api::SnapshotSource;
use crate::error::ViewerError;
use crate::models::{Command, Frame};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Parse one console line.
///
/// `q`, `n`, `p` map to their commands; `m <id>` jumps directly, a bare `m`
/// means the next line is the id. Blank lines are ignored.
pub fn parse_line(line: &str) -> Result<Option<LineCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut parts = line.splitn(2, char::is_whitespace);
    let word = parts.next().unwrap_or_default();
    let rest = parts.next().map(str::trim).unwrap_or_default();

    let mut letters = word.chars();
    let (Some(letter), None) = (letters.next(), letters.next()) else {
        return Err(format!("unknown command '{}'", word));
    };

    if letter.eq_ignore_ascii_case(&'m') {
        return Ok(Some(if rest.is_empty() {
            LineCommand::PromptChannel
        } else {
            LineCommand::Run(Command::JumpManual(rest.to_string()))
        }));
    }

    Command::from_key(letter)
        .map(|c| Some(LineCommand::Run(c)))
        .ok_or_else(|| format!("unknown command '{}'", word))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineCommand {
    Run(Command),
    /// Bare `m`: read the channel id from the next line
    PromptChannel,
}

/// Commands typed on stdin, read by a background thread
pub struct LineCommands {
    lines: Receiver<String>,
    awaiting_channel: bool,
}

impl LineCommands {
    pub fn stdin() -> Self {
        let (tx, rx) = channel();
        thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self::from_receiver(rx)
    }

    pub fn from_receiver(lines: Receiver<String>) -> Self {
        Self {
            lines,
            awaiting_channel: false,
        }
    }
}

impl CommandSource for LineCommands {
    fn poll(&mut self, timeout: Duration) -> Option<Command> {
        let line = match self.lines.recv_timeout(timeout) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => return None,
            // stdin closed
            Err(RecvTimeoutError::Disconnected) => return Some(Command::Quit),
        };

        if self.awaiting_channel {
            self.awaiting_channel = false;
            let id = line.trim();
            return (!id.is_empty()).then(|| Command::JumpManual(id.to_string()));
        }

        match parse_line(&line) {
            Ok(Some(LineCommand::Run(command))) => Some(command),
            Ok(Some(LineCommand::PromptChannel)) => {
                self.awaiting_channel = true;
                print!("Channel ID: ");
                let _ = io::stdout().flush();
                None
            }
            Ok(None) => None,
            Err(e) => {
                eprintln!("{} (use q, n, p or m <id>)", e);
                None
            }
        }
    }
}

/// Writes every frame to one PNG path, replacing the previous one
pub struct FileSink {
    path: PathBuf,
    frames_written: usize,
}

impl FileSink {
    /// Fails when the output directory cannot be created
    pub fn new(path: &Path) -> Result<Self, ViewerError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            frames_written: 0,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    fn write(&self, frame: &Frame) -> Result<(), String> {
        let image = image::RgbImage::from_raw(frame.width, frame.height, frame.pixels.clone())
            .ok_or_else(|| "pixel buffer does not match frame size".to_string())?;
        // Write beside the target and rename so readers never see a partial file
        let tmp = self.path.with_extension("tmp.png");
        image
            .save_with_format(&tmp, image::ImageFormat::Png)
            .map_err(|e| e.to_string())?;
        fs::rename(&tmp, &self.path).map_err(|e| e.to_string())
    }
}

impl DisplaySink for FileSink {
    fn show(&mut self, frame: &Frame, overlay: &str) {
        match self.write(frame) {
            Ok(()) => {
                self.frames_written += 1;
                log::info!("{} -> {}", overlay, self.path.display());
            }
            Err(e) => log::warn!("Could not write {}: {}", self.path.display(), e),
        }
    }

    fn close(&mut self) {
        log::info!("Wrote {} frames to {}", self.frames_written, self.path.display());
    }

    fn report(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Run the acquisition loop against stdin and a PNG file until `q` or EOF
pub fn run<S: SnapshotSource>(mut acquisition: Acquisition<S>, output: &Path) -> Result<(), ViewerError> {
    let mut sink = FileSink::new(output)?;
    let mut commands = LineCommands::stdin();
    println!(
        "Writing snapshots to {}. Commands: q quit, n next, p previous, m <id> channel",
        output.display()
    );
    acquisition.run(&mut commands, &mut sink);
    Ok(())
}
