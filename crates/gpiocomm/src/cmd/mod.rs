use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use gpiocomm_frame::MessageTag;
use gpiocomm_host::config::DEFAULT_SERVICE_ROOT;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod run;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one message and print the response.
    Send(SendArgs),
    /// Run a script of messages against one session.
    Run(RunArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, session: &SessionArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, session, format),
        Command::Run(args) => run::run(args, session, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OverflowArg {
    /// Read at most 127 body bytes.
    #[default]
    Clamp,
    /// Drop the frame and answer with size 0.
    Reject,
}

/// Host session settings shared by every command.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// JSON file holding the stored replay and host id. In-memory when unset.
    #[arg(long, value_name = "PATH", env = "GPIOCOMM_STATE_FILE", global = true)]
    pub state_file: Option<PathBuf>,

    /// Base URL of the score service.
    #[arg(
        long,
        value_name = "URL",
        env = "GPIOCOMM_SERVICE_ROOT",
        default_value = DEFAULT_SERVICE_ROOT,
        global = true
    )]
    pub service_root: String,

    /// Score service request timeout, also the bound on `poll` (e.g. 10s, 500ms).
    #[arg(long, value_name = "DURATION", default_value = "10s", global = true)]
    pub request_timeout: String,

    /// What to do with a declared size above 127.
    #[arg(long, value_name = "POLICY", default_value = "clamp", global = true)]
    pub overflow: OverflowArg,
}

impl SessionArgs {
    pub fn request_timeout(&self) -> CliResult<Duration> {
        parse_duration(&self.request_timeout)
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Message tag, by name (e.g. initialize, checkScores) or number.
    #[arg(value_parser = parse_tag)]
    pub tag: u8,
    /// Payload bytes, decimal or 0x-prefixed hex.
    #[arg(value_parser = parse_byte)]
    pub bytes: Vec<u8>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Script file, one message per line.
    pub script: PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_tag(input: &str) -> Result<u8, String> {
    match input.parse::<MessageTag>() {
        Ok(tag) => Ok(tag.as_u8()),
        Err(err) => input.parse::<u8>().map_err(|_| err.to_string()),
    }
}

pub fn parse_byte(input: &str) -> Result<u8, String> {
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse::<u8>(),
    };
    parsed.map_err(|_| format!("invalid byte: {input}"))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
