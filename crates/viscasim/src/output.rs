use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use viscasim_frame::{Reply, ReplyKind, TERMINATOR};

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

/// One message sent by `send` and the replies collected after it.
pub struct Exchange {
    pub request: Vec<u8>,
    pub replies: Vec<Reply>,
}

#[derive(Serialize)]
struct ReplyOutput {
    request: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<u8>,
    broadcast: bool,
    reply: String,
}

impl ReplyOutput {
    fn new(request: &[u8], reply: &Reply) -> Self {
        let kind = reply.kind();
        Self {
            request: hex::encode(request),
            kind: kind.name(),
            error_code: match kind {
                ReplyKind::Error(code) => Some(code),
                _ => None,
            },
            broadcast: reply.is_broadcast(),
            reply: hex::encode(encode_wire(reply)),
        }
    }
}

pub fn print_exchanges(exchanges: &[Exchange], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for exchange in exchanges {
                for reply in &exchange.replies {
                    let out = ReplyOutput::new(&exchange.request, reply);
                    println!(
                        "{}",
                        serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                    );
                }
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["REQUEST", "KIND", "REPLY"]);
            for exchange in exchanges {
                for reply in &exchange.replies {
                    let out = ReplyOutput::new(&exchange.request, reply);
                    let label = kind_label(&out);
                    table.add_row(vec![out.request, label, out.reply]);
                }
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for exchange in exchanges {
                println!("> {}", spaced_hex(&exchange.request));
                if exchange.replies.is_empty() {
                    println!("  (no reply)");
                }
                for reply in &exchange.replies {
                    let out = ReplyOutput::new(&exchange.request, reply);
                    println!("< {}  {}", spaced_hex(&encode_wire(reply)), kind_label(&out));
                }
            }
        }
        OutputFormat::Raw => {
            let mut data = Vec::new();
            for exchange in exchanges {
                for reply in &exchange.replies {
                    data.extend_from_slice(&encode_wire(reply));
                }
            }
            print_raw(&data);
        }
    }
}

fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn kind_label(out: &ReplyOutput) -> String {
    match out.error_code {
        Some(code) => format!("{} {code:#04x}", out.kind),
        None if out.broadcast => format!("{} (broadcast)", out.kind),
        None => out.kind.to_string(),
    }
}

fn spaced_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Wire form of `reply`, terminator included.
fn encode_wire(reply: &Reply) -> Vec<u8> {
    let mut buf = Vec::with_capacity(reply.wire_size());
    buf.push(reply.header());
    buf.extend_from_slice(reply.body());
    buf.push(TERMINATOR);
    buf
}
