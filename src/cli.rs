//! CLI argument parsing

use crate::config::MIN_REFRESH_INTERVAL_SECS;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    /// Saved camera to open without the selection menu
    pub camera: Option<String>,
    /// Write frames to this PNG instead of opening a window
    pub output: Option<PathBuf>,
    pub interval_secs: Option<f64>,
    pub fallback_channels: Option<usize>,
    pub help: bool,
    pub version: bool,
}

/// Parse command line arguments (`args[0]` is the program name)
pub fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => cli.help = true,
            "--version" | "-V" => cli.version = true,
            "--camera" | "-c" => {
                cli.camera = Some(value(args, &mut i, "--camera requires a camera name")?.to_string());
            }
            "--output" | "-o" => {
                cli.output = Some(PathBuf::from(value(args, &mut i, "--output requires a file path")?));
            }
            "--interval" => {
                let secs: f64 = value(args, &mut i, "--interval requires a value")?
                    .parse()
                    .map_err(|_| "--interval must be a number of seconds".to_string())?;
                if !secs.is_finite() || secs < MIN_REFRESH_INTERVAL_SECS {
                    return Err(format!(
                        "--interval must be at least {} seconds",
                        MIN_REFRESH_INTERVAL_SECS
                    ));
                }
                cli.interval_secs = Some(secs);
            }
            "--channels" => {
                let count: usize = value(args, &mut i, "--channels requires a value")?
                    .parse()
                    .map_err(|_| "--channels must be a number".to_string())?;
                if count == 0 {
                    return Err("--channels must be at least 1".to_string());
                }
                cli.fallback_channels = Some(count);
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
        i += 1;
    }

    Ok(cli)
}

fn value<'a>(args: &'a [String], i: &mut usize, missing: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i).map(String::as_str).ok_or_else(|| missing.to_string())
}
