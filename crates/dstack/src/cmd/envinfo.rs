use std::collections::BTreeMap;

use dstack::config::DEFAULT_SERVER;
use serde::Serialize;

use crate::cmd::{Context, EnvinfoArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct PlatformInfo {
    os: String,
    arch: String,
}

#[derive(Serialize)]
struct EnvInfoOutput {
    version: String,
    target: String,
    rust_version: String,
    git_hash: String,
    platform: PlatformInfo,
    default_server: &'static str,
    config_candidates: Vec<String>,
    config_file: Option<String>,
    dependencies: BTreeMap<String, String>,
    environment: BTreeMap<String, Option<String>>,
}

pub fn run(_args: EnvinfoArgs, context: &Context) -> CliResult<i32> {
    let mut deps = BTreeMap::new();
    deps.insert("clap".to_string(), "4.5".to_string());
    deps.insert("reqwest".to_string(), "0.12".to_string());
    deps.insert("toml".to_string(), "0.8".to_string());
    deps.insert("aes-gcm".to_string(), "0.10".to_string());

    let mut env = BTreeMap::new();
    env.insert(
        "DSTACK_CONFIG".to_string(),
        std::env::var("DSTACK_CONFIG").ok(),
    );
    env.insert("HOME".to_string(), std::env::var("HOME").ok());
    env.insert("RUST_LOG".to_string(), std::env::var("RUST_LOG").ok());

    let factory = context.config_factory();
    let output = EnvInfoOutput {
        version: env!("CARGO_PKG_VERSION").to_string(),
        target: target_triple(),
        rust_version: option_env!("RUSTC_VERSION")
            .unwrap_or("unknown")
            .to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        platform: PlatformInfo {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        },
        default_server: DEFAULT_SERVER,
        config_candidates: factory
            .candidates()
            .iter()
            .map(|path| path.display().to_string())
            .collect(),
        config_file: factory.locate().map(|path| path.display().to_string()),
        dependencies: deps,
        environment: env,
    };

    print_envinfo(&output, context.format);
    Ok(SUCCESS)
}

fn target_triple() -> String {
    if let Some(target) = option_env!("DSTACK_BUILD_TARGET") {
        return target.to_string();
    }

    match (std::env::consts::ARCH, std::env::consts::OS) {
        ("aarch64", "macos") => "aarch64-apple-darwin".to_string(),
        ("x86_64", "macos") => "x86_64-apple-darwin".to_string(),
        ("aarch64", "linux") => "aarch64-unknown-linux-gnu".to_string(),
        ("x86_64", "linux") => "x86_64-unknown-linux-gnu".to_string(),
        ("x86_64", "windows") => "x86_64-pc-windows-msvc".to_string(),
        (arch, os) => format!("{arch}-unknown-{os}"),
    }
}

fn print_envinfo(output: &EnvInfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(output),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("dstack environment\n");
            println!("  Version:    {}", output.version);
            println!("  Target:     {}", output.target);
            println!("  Rust:       {}", output.rust_version);
            println!("  Git hash:   {}", output.git_hash);
            println!(
                "  Platform:   {} ({})",
                output.platform.os, output.platform.arch
            );
            println!("  Server:     {}", output.default_server);
            println!(
                "  Config:     {}",
                output.config_file.as_deref().unwrap_or("(none found)")
            );
            println!("\n  Config lookup:");
            for candidate in &output.config_candidates {
                println!("    {candidate}");
            }
            println!("\n  Dependencies:");
            for (k, v) in &output.dependencies {
                println!("    {:<12} {}", k, v);
            }
            println!("\n  Environment:");
            for (k, v) in &output.environment {
                println!("    {:<20} {}", k, v.as_deref().unwrap_or("(not set)"));
            }
        }
        OutputFormat::Raw => println!("{}", output.version),
    }
}
