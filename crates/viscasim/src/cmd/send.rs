use std::time::Duration;

use viscasim_device::Controller;
use viscasim_frame::{ReplyKind, TERMINATOR};

use crate::cmd::SendArgs;
use crate::exit::{device_error, CliError, CliResult, FAILURE, SUCCESS, USAGE};
use crate::output::{print_exchanges, Exchange, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let wait_timeout = parse_duration(&args.wait_timeout)?;
    let connect_timeout = parse_duration(&args.timeout)?;
    let messages = args
        .messages
        .iter()
        .map(String::as_str)
        .map(parse_message)
        .collect::<CliResult<Vec<_>>>()?;

    let mut controller = Controller::connect(args.addr, connect_timeout)
        .map_err(|err| device_error("connect failed", err))?;

    let mut exchanges = Vec::with_capacity(messages.len());
    for request in messages {
        controller
            .send(&request)
            .map_err(|err| device_error("send failed", err))?;
        let replies = controller
            .recv_replies(wait_timeout)
            .map_err(|err| device_error("receive failed", err))?;
        exchanges.push(Exchange { request, replies });
    }

    print_exchanges(&exchanges, format);

    let rejected = exchanges
        .iter()
        .flat_map(|exchange| &exchange.replies)
        .any(|reply| matches!(reply.kind(), ReplyKind::Error(_)));
    Ok(if rejected { FAILURE } else { SUCCESS })
}

/// Parse one hex message, ignoring whitespace and `:` separators and
/// appending the terminator when missing.
fn parse_message(text: &str) -> CliResult<Vec<u8>> {
    let digits: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);

    let mut bytes = hex::decode(digits)
        .map_err(|err| CliError::new(USAGE, format!("invalid hex message {text:?}: {err}")))?;
    if bytes.len() < 2 {
        return Err(CliError::new(
            USAGE,
            format!("message {text:?} needs an address byte and at least one payload byte"),
        ));
    }
    if bytes.last() != Some(&TERMINATOR) {
        bytes.push(TERMINATOR);
    }
    Ok(bytes)
}

fn parse_duration(input: &str) -> CliResult<Duration> {
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
