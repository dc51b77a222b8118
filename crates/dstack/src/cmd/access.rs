use dstack::FrameBuilder;
use serde::Serialize;

use crate::cmd::push::parse_duration;
use crate::cmd::{AccessArgs, Context};
use crate::exit::{dstack_error, CliResult, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct AccessOutput<'a> {
    stack: &'a str,
    profile: &'a str,
    granted: bool,
}

pub fn run(args: AccessArgs, context: &Context) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let frame = FrameBuilder::new(&args.stack)
        .config(context.config_factory())
        .profile(&args.profile)
        .timeout(timeout)
        .build()
        .map_err(|err| dstack_error("access check failed", err))?;

    let output = AccessOutput {
        stack: frame.stack(),
        profile: &args.profile,
        granted: true,
    };
    match context.format {
        OutputFormat::Json => print_json(&output),
        OutputFormat::Table | OutputFormat::Pretty => println!(
            "access granted to {} for profile '{}'",
            output.stack, output.profile
        ),
        OutputFormat::Raw => println!("{}", output.stack),
    }
    Ok(SUCCESS)
}
