//! Interactive camera selection on the terminal

use crate::error::StoreError;
use crate::models::{parse_port, ConnectionRecord};
use crate::store::CredentialStore;
use std::io::{self, BufRead, Write};

/// Open the camera saved as `name`, falling back to the menu when none was
/// given or it cannot be loaded
pub fn open_or_choose<R: BufRead, W: Write>(
    store: &CredentialStore,
    name: Option<&str>,
    input: &mut R,
    output: &mut W,
) -> io::Result<ConnectionRecord> {
    if let Some(name) = name {
        match store.load(name) {
            Ok(record) => return Ok(record),
            Err(e) if e.is_storage() => {
                log::warn!("Saved camera '{}' unusable: {}", name, e);
                writeln!(output, "Could not read saved camera: {}", e)?;
            }
            Err(e) => writeln!(output, "{}", e)?,
        }
    }
    choose_camera(store, input, output)
}

/// Offer saved cameras by number, otherwise ask for connection details.
///
/// Store failures never abort the flow; they only skip straight to manual entry.
pub fn choose_camera<R: BufRead, W: Write>(
    store: &CredentialStore,
    input: &mut R,
    output: &mut W,
) -> io::Result<ConnectionRecord> {
    let names = match store.list() {
        Ok(names) => names,
        Err(e) => {
            log::warn!("Could not list saved cameras in {}: {}", store.dir().display(), e);
            Vec::new()
        }
    };

    if !names.is_empty() {
        writeln!(output, "Saved cameras:")?;
        for (i, name) in names.iter().enumerate() {
            writeln!(output, "{}: {}", i + 1, name)?;
        }
        let choice = ask(input, output, "Select a camera by number or press Enter to input manually: ")?;
        let picked = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| names.get(i));
        if let Some(name) = picked {
            match store.load(name) {
                Ok(record) => return Ok(record),
                Err(e) => writeln!(output, "Could not load '{}': {}", name, e)?,
            }
        }
    }

    let record = enter_manually(input, output)?;

    let save = ask(input, output, "Save this camera? (y/n): ")?;
    if save.eq_ignore_ascii_case("y") {
        loop {
            let name = ask(input, output, "Enter a name for this camera: ")?;
            match store.save(&name, &record) {
                Ok(()) => {
                    writeln!(output, "Camera '{}' saved successfully!", name)?;
                    break;
                }
                Err(e) => {
                    writeln!(output, "Could not save camera: {}", e)?;
                    // Only a bad name is worth asking again for
                    if !matches!(e, StoreError::InvalidName(_)) {
                        break;
                    }
                }
            }
        }
    }

    Ok(record)
}

fn enter_manually<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<ConnectionRecord> {
    let host = loop {
        let host = ask(input, output, "IP: ")?;
        if !host.is_empty() {
            break host;
        }
    };
    let port = loop {
        let raw = ask(input, output, "HTTP Port: ")?;
        match parse_port(&raw) {
            Ok(port) => break port,
            Err(e) => writeln!(output, "{}", e)?,
        }
    };
    let username = loop {
        let username = ask(input, output, "Username: ")?;
        if !username.is_empty() {
            break username;
        }
    };
    let password = ask_raw(input, output, "Password: ")?;

    Ok(ConnectionRecord {
        host,
        port,
        username,
        password,
    })
}

/// Prompt and read one trimmed line; EOF is an error so loops cannot spin
fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<String> {
    ask_raw(input, output, prompt).map(|s| s.trim().to_string())
}

/// Like `ask` but keeps surrounding spaces (passwords)
fn ask_raw<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<String> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
    }
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
