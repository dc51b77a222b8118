use std::time::Duration;

use dstack::frame::{Params, PushResult};
use dstack::FrameBuilder;
use serde::Serialize;
use serde_json::Value;

use crate::cmd::{Context, PushArgs};
use crate::exit::{dstack_error, frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct PushOutput<'a> {
    stack: &'a str,
    id: &'a str,
    url: &'a str,
    attachments: usize,
}

pub fn run(args: PushArgs, context: &Context) -> CliResult<i32> {
    let params = parse_params(&args.param)?;
    let timeout = parse_duration(&args.timeout)?;

    let mut builder = FrameBuilder::new(&args.stack)
        .config(context.config_factory())
        .profile(&args.profile)
        .timeout(timeout)
        .check_access(!args.no_check_access);
    if let Some(access) = &args.access {
        builder = builder.access(access);
    }
    let mut frame = builder
        .build()
        .map_err(|err| dstack_error("cannot create frame", err))?;

    let description = args.description.as_deref();
    let committed = if let Some(path) = &args.file {
        if !path.is_file() {
            return Err(CliError::new(
                USAGE,
                format!("--file {} is not a readable file", path.display()),
            ));
        }
        frame.commit(path, description, params)
    } else if let Some(json) = &args.json {
        let value: Value = serde_json::from_str(json)
            .map_err(|err| CliError::new(USAGE, format!("--json is not valid JSON: {err}")))?;
        frame.commit(&value, description, params)
    } else if let Some(text) = &args.text {
        frame.commit(text, description, params)
    } else {
        return Err(CliError::new(USAGE, "one of --file, --text or --json is required"));
    };
    committed.map_err(|err| frame_error("commit failed", err))?;

    let result = match &args.message {
        Some(message) => frame.push_with_message(message),
        None => frame.push(),
    }
    .map_err(|err| frame_error("push failed", err))?;

    print_result(frame.stack(), &result, frame.attachments().len(), context.format);
    Ok(SUCCESS)
}

fn print_result(stack: &str, result: &PushResult, attachments: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&PushOutput {
            stack,
            id: &result.id,
            url: &result.url,
            attachments,
        }),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("pushed {stack} ({attachments} attachment(s)): {result}")
        }
        OutputFormat::Raw => println!("{result}"),
    }
}

/// Parse `KEY=VALUE` pairs. Numbers and booleans keep their JSON type,
/// anything else is a string.
fn parse_params(pairs: &[String]) -> CliResult<Option<Params>> {
    if pairs.is_empty() {
        return Ok(None);
    }

    let mut params = Params::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| CliError::new(USAGE, format!("--param '{pair}' is not KEY=VALUE")))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::new(USAGE, format!("--param '{pair}' has an empty key")));
        }
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(value @ (Value::Number(_) | Value::Bool(_))) => value,
            _ => Value::String(raw.to_string()),
        };
        params.insert(key.to_string(), value);
    }
    Ok(Some(params))
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
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
