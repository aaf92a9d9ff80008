//! Command-line arguments.
//!
//! ```text
//! simsims-headless [--config PATH] [--frames N] [WIDTH HEIGHT [SAVE_DIR]]
//! ```
//!
//! Anything not given falls back to the configuration file.

use crate::error::HeadlessError;
use std::path::PathBuf;

pub const USAGE: &str =
    "simsims-headless [--config PATH] [--frames N] [WIDTH HEIGHT [SAVE_DIR]]";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Args {
    pub config: Option<PathBuf>,
    pub frames: Option<u64>,
    pub surface: Option<(u32, u32)>,
    pub save_dir: Option<PathBuf>,
}

fn usage(detail: impl std::fmt::Display) -> HeadlessError {
    HeadlessError::Usage(format!("{detail}\n  {USAGE}"))
}

fn number<T: std::str::FromStr>(name: &str, value: Option<String>) -> Result<T, HeadlessError> {
    let value = value.ok_or_else(|| usage(format!("missing value for {name}")))?;
    value
        .parse()
        .map_err(|_| usage(format!("{name} must be a number, got '{value}'")))
}

impl Args {
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, HeadlessError> {
        let mut parsed = Args::default();
        let mut positional = Vec::new();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            if arg == "--config" {
                let path = args.next().ok_or_else(|| usage("missing value for --config"))?;
                parsed.config = Some(PathBuf::from(path));
            } else if arg == "--frames" {
                parsed.frames = Some(number("--frames", args.next())?);
            } else if arg.starts_with("--") {
                return Err(usage(format!("unknown flag {arg}")));
            } else {
                positional.push(arg);
            }
        }

        let mut positional = positional.into_iter();
        match (positional.next(), positional.next()) {
            (None, _) => {}
            (Some(_), None) => return Err(usage("WIDTH given without HEIGHT")),
            (width, height) => {
                parsed.surface = Some((number("WIDTH", width)?, number("HEIGHT", height)?));
            }
        }
        parsed.save_dir = positional.next().map(PathBuf::from);
        if let Some(extra) = positional.next() {
            return Err(usage(format!("unexpected argument '{extra}'")));
        }
        Ok(parsed)
    }
}
