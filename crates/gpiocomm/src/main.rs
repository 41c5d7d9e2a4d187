mod bridge;
mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{Command, SessionArgs};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "gpiocomm", version, about = "PICO-8 GPIO host bridge CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(flatten)]
    session: SessionArgs,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, &cli.session, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::OverflowArg;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from(["gpiocomm", "send", "endRecord", "100", "0", "0", "0", "1", "2", "3"])
            .expect("send args should parse");

        let Command::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert_eq!(args.tag, 5);
        assert_eq!(args.bytes, vec![100, 0, 0, 0, 1, 2, 3]);
    }

    #[test]
    fn session_flags_are_global() {
        let cli = Cli::try_parse_from([
            "gpiocomm",
            "run",
            "script.txt",
            "--overflow",
            "reject",
            "--service-root",
            "http://127.0.0.1:9",
            "--request-timeout",
            "2s",
        ])
        .expect("run args should parse");

        assert!(matches!(cli.command, Command::Run(_)));
        assert_eq!(cli.session.overflow, OverflowArg::Reject);
        assert_eq!(cli.session.service_root, "http://127.0.0.1:9");
        assert_eq!(
            cli.session.request_timeout().unwrap(),
            std::time::Duration::from_secs(2)
        );
    }

    #[test]
    fn rejects_out_of_range_bytes() {
        let err = Cli::try_parse_from(["gpiocomm", "send", "recordFrame", "256"])
            .expect_err("byte above 255 should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
