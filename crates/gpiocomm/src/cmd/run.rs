use std::fs;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::bridge::Bridge;
use crate::cmd::{parse_byte, parse_duration, parse_tag, RunArgs, SessionArgs};
use crate::exit::{io_error, CliError, CliResult, SUCCESS, TIMEOUT, USAGE};
use crate::output::{print_exchange, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// One line of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    /// Send a message once.
    Send(Vec<u8>),
    /// Sleep between messages.
    Wait(Duration),
    /// Resend until the response carries a payload.
    Poll(Vec<u8>),
}

pub fn run(args: RunArgs, session: &SessionArgs, format: OutputFormat) -> CliResult<i32> {
    let text = fs::read_to_string(&args.script).map_err(|err| {
        io_error(&format!("failed reading {}", args.script.display()), err)
    })?;
    let steps = parse_script(&text)?;

    let mut bridge = Bridge::open(session)?;
    for step in steps {
        match step {
            Step::Send(request) => {
                let exchange = bridge.exchange(&request)?;
                print_exchange(&exchange, format);
            }
            Step::Wait(duration) => thread::sleep(duration),
            Step::Poll(request) => poll(&mut bridge, &request, format)?,
        }
    }
    bridge.finish();

    Ok(SUCCESS)
}

fn poll(bridge: &mut Bridge, request: &[u8], format: OutputFormat) -> CliResult<()> {
    let timeout = bridge.request_timeout();
    let start = Instant::now();
    let mut attempts = 0usize;
    loop {
        attempts += 1;
        let exchange = bridge.exchange(request)?;
        if !exchange.response_payload().is_empty() {
            debug!(attempts, "poll answered");
            print_exchange(&exchange, format);
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(CliError::new(
                TIMEOUT,
                format!("no response payload after {attempts} attempts"),
            ));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn parse_script(text: &str) -> CliResult<Vec<Step>> {
    let mut steps = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step = parse_line(line)
            .map_err(|err| CliError::new(USAGE, format!("line {}: {err}", number + 1)))?;
        steps.push(step);
    }
    Ok(steps)
}

fn parse_line(line: &str) -> Result<Step, String> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Err("empty line".to_string());
    };

    match first {
        "wait" => {
            let duration = words.next().ok_or("wait needs a duration")?;
            if words.next().is_some() {
                return Err("wait takes one duration".to_string());
            }
            parse_duration(duration)
                .map(Step::Wait)
                .map_err(|err| err.message)
        }
        "poll" => {
            let tag = words.next().ok_or("poll needs a tag")?;
            message(tag, words).map(Step::Poll)
        }
        tag => message(tag, words).map(Step::Send),
    }
}

fn message<'a>(tag: &str, payload: impl Iterator<Item = &'a str>) -> Result<Vec<u8>, String> {
    let mut body = vec![parse_tag(tag)?];
    for word in payload {
        body.push(parse_byte(word)?);
    }
    Ok(body)
}
