use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use gpiocomm_frame::tag_name;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One message and the response the host laid out for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub request: Vec<u8>,
    pub response: Vec<u8>,
}

impl Exchange {
    pub fn tag(&self) -> Option<u8> {
        self.request.first().copied()
    }

    /// Response bytes after the echoed tag.
    pub fn response_payload(&self) -> &[u8] {
        self.response.get(1..).unwrap_or_default()
    }
}

#[derive(Serialize)]
struct ExchangeOutput<'a> {
    tag: Option<u8>,
    tag_name: &'a str,
    request: &'a [u8],
    response_size: usize,
    response: &'a [u8],
}

pub fn print_exchange(exchange: &Exchange, format: OutputFormat) {
    let name = exchange.tag().map(tag_name).unwrap_or("empty");
    match format {
        OutputFormat::Json => {
            let out = ExchangeOutput {
                tag: exchange.tag(),
                tag_name: name,
                request: &exchange.request,
                response_size: exchange.response.len(),
                response: &exchange.response,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TAG", "REQUEST", "SIZE", "RESPONSE"])
                .add_row(vec![
                    name.to_string(),
                    hex_bytes(&exchange.request),
                    exchange.response.len().to_string(),
                    hex_bytes(&exchange.response),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} [{}] -> size={} [{}]",
                name,
                hex_bytes(&exchange.request),
                exchange.response.len(),
                hex_bytes(&exchange.response)
            );
        }
        OutputFormat::Raw => {
            print_raw(&exchange.response);
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn hex_bytes(data: &[u8]) -> String {
    data.iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
