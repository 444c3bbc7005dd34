// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! xhrgate CLI
//!
//! Issues a single request through the client and prints the unwrapped
//! payload. Configuration comes from `XHRGATE_*` environment variables.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;
use xhrgate::{ClientConfig, Error, HttpClient, Notifier, Request};

/// Prints notices to stderr
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn show(&self, message: &str) {
        eprintln!("[!] {}", message);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("xhrgate=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "get" | "post" | "put" | "delete" => {
            if args.len() < 3 {
                eprintln!("Usage: xhrgate {} <path> [json]", args[1]);
                return ExitCode::from(1);
            }
            match build_request(&args[1], &args[2], args.get(3).map(String::as_str)) {
                Ok(request) => run(request).await,
                Err(e) => {
                    eprintln!("Invalid arguments: {:#}", e);
                    ExitCode::from(1)
                }
            }
        }
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("xhrgate {}", xhrgate::VERSION);
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"xhrgate - Deduplicating HTTP client for envelope APIs

USAGE:
    xhrgate <COMMAND> <path> [json]

COMMANDS:
    get <path> [query]      GET with optional JSON query parameters
    post <path> [body]      POST with optional JSON body
    put <path> [body]       PUT with optional JSON body
    delete <path>           DELETE
    help                    Show this help message
    version                 Show version information

ENVIRONMENT:
    XHRGATE_BASE_URL          Base URL for relative paths
    XHRGATE_TIMEOUT_SECS      Request timeout (default 120)
    XHRGATE_WITH_CREDENTIALS  Send cookies cross-origin (default true)
    XHRGATE_CSRF_COOKIE       Anti-forgery cookie name (default csrftoken)
    XHRGATE_LOCALE            Message locale: en | zh
    XHRGATE_PROXY             Proxy URL

EXAMPLES:
    XHRGATE_BASE_URL=https://app.example.com/api/ xhrgate get projects '{{"page":2}}'
    xhrgate post https://app.example.com/api/projects '{{"name":"demo"}}'
"#
    );
}

fn build_request(command: &str, path: &str, json: Option<&str>) -> anyhow::Result<Request> {
    let payload: Option<Value> = json
        .map(serde_json::from_str::<Value>)
        .transpose()
        .context("argument is not valid JSON")?;

    let request = match (command, payload) {
        ("get", Some(query)) => Request::get(path).query(&query)?,
        ("get", None) => Request::get(path),
        ("post", Some(body)) => Request::post(path).json(&body)?,
        ("post", None) => Request::post(path),
        ("put", Some(body)) => Request::put(path).json(&body)?,
        ("put", None) => Request::put(path),
        ("delete", _) => Request::delete(path),
        (other, _) => anyhow::bail!("unsupported command {}", other),
    };
    Ok(request)
}

async fn run(request: Request) -> ExitCode {
    let config = match ClientConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::from(1);
        }
    };
    let notice_delay = config.notice_delay;

    let client = match HttpClient::builder(config)
        .notifier(Arc::new(StderrNotifier))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return ExitCode::from(1);
        }
    };

    match client.execute(request).await {
        Ok(payload) => {
            match serde_json::to_string_pretty(&payload) {
                Ok(text) => println!("{}", text),
                Err(_) => println!("{}", payload),
            }
            ExitCode::SUCCESS
        }
        Err(Error::Rejected(_)) => {
            // Let the pending notice print before exiting
            tokio::time::sleep(notice_delay * 2).await;
            ExitCode::from(1)
        }
        Err(Error::ReauthRequired { login_url }) => {
            eprintln!(
                "Session expired, log in again{}",
                login_url.map(|u| format!(": {}", u)).unwrap_or_default()
            );
            ExitCode::from(3)
        }
        Err(e) => {
            eprintln!("Request failed: {}", e);
            ExitCode::from(1)
        }
    }
}
