use dstack::config::{Config, FileConfig, Profile, DEFAULT_SERVER};
use serde::Serialize;
use tracing::info;

use crate::cmd::{ConfigAddArgs, ConfigCommand, ConfigRemoveArgs, Context};
use crate::exit::{config_error, CliError, CliResult, CONFIG, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct ProfileOutput {
    name: String,
    user: String,
    server: String,
    token: String,
}

impl From<&Profile> for ProfileOutput {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.name().to_string(),
            user: profile.user().to_string(),
            server: profile.server().to_string(),
            token: profile.masked_token(),
        }
    }
}

#[derive(Serialize)]
struct ConfigListOutput {
    path: String,
    profiles: Vec<ProfileOutput>,
}

#[derive(Serialize)]
struct ConfigChangeOutput<'a> {
    action: &'a str,
    profile: &'a str,
    path: String,
}

pub fn run(command: ConfigCommand, context: &Context) -> CliResult<i32> {
    match command {
        ConfigCommand::List => list(context),
        ConfigCommand::Add(args) => add(args, context),
        ConfigCommand::Remove(args) => remove(args, context),
    }
}

fn open(context: &Context) -> CliResult<FileConfig> {
    let path = context
        .config_factory()
        .writable_path()
        .map_err(|err| config_error("cannot locate configuration", err))?;
    FileConfig::load_or_default(&path)
        .map_err(|err| config_error("cannot load configuration", err))
}

fn list(context: &Context) -> CliResult<i32> {
    let config = open(context)?;
    let output = ConfigListOutput {
        path: config.path().display().to_string(),
        profiles: config.list_profiles().iter().map(ProfileOutput::from).collect(),
    };

    match context.format {
        OutputFormat::Json => print_json(&output),
        OutputFormat::Table => print_table(
            &["PROFILE", "USER", "SERVER", "TOKEN"],
            output
                .profiles
                .into_iter()
                .map(|p| vec![p.name, p.user, p.server, p.token]),
        ),
        OutputFormat::Pretty => {
            println!("profiles in {}\n", output.path);
            for profile in &output.profiles {
                println!(
                    "  {:<12} user={} server={} token={}",
                    profile.name, profile.user, profile.server, profile.token
                );
            }
        }
        OutputFormat::Raw => {
            for profile in &output.profiles {
                println!("{}", profile.name);
            }
        }
    }
    Ok(SUCCESS)
}

fn add(args: ConfigAddArgs, context: &Context) -> CliResult<i32> {
    let mut config = open(context)?;
    let server = args.server.as_deref().unwrap_or(DEFAULT_SERVER);
    let profile = Profile::new(&args.profile, &args.user, &args.token, server)
        .map_err(|err| config_error("invalid profile", err))?;

    config.add_or_replace_profile(profile);
    config
        .save()
        .map_err(|err| config_error("cannot save configuration", err))?;
    info!(profile = %args.profile, path = ?config.path(), "profile saved");

    print_change("saved", &args.profile, &config, context.format);
    Ok(SUCCESS)
}

fn remove(args: ConfigRemoveArgs, context: &Context) -> CliResult<i32> {
    let mut config = open(context)?;
    if config.remove_profile(&args.profile).is_none() {
        return Err(CliError::new(
            CONFIG,
            format!("profile '{}' not found in {}", args.profile, config.path().display()),
        ));
    }
    config
        .save()
        .map_err(|err| config_error("cannot save configuration", err))?;
    info!(profile = %args.profile, path = ?config.path(), "profile removed");

    print_change("removed", &args.profile, &config, context.format);
    Ok(SUCCESS)
}

fn print_change(action: &str, profile: &str, config: &FileConfig, format: OutputFormat) {
    let output = ConfigChangeOutput {
        action,
        profile,
        path: config.path().display().to_string(),
    };
    match format {
        OutputFormat::Json => print_json(&output),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("{} profile '{}' in {}", output.action, output.profile, output.path)
        }
        OutputFormat::Raw => println!("{}", output.profile),
    }
}
