//! ferrokv CLI Client
//!
//! Sends one command to a server and prints the reply.

use std::process::ExitCode;

use clap::Parser;
use ferrokv::network::Client;
use ferrokv::Value;

/// ferrokv CLI
#[derive(Parser, Debug)]
#[command(name = "ferrokv-cli")]
#[command(about = "CLI for the ferrokv key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    server: String,

    /// Command and arguments, e.g. `SET greeting hello`
    #[arg(required = true, num_args = 1..)]
    command: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let reply = Client::connect(&args.server).and_then(|mut client| client.call(&args.command));

    match reply {
        Ok(value) => {
            let failed = value.is_error();
            print!("{}", render(&value, 0));
            if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Could not talk to {}: {}", args.server, e);
            ExitCode::FAILURE
        }
    }
}

/// redis-cli style rendering
fn render(value: &Value, indent: usize) -> String {
    match value {
        Value::SimpleString(s) => format!("{}\n", s),
        Value::Error(s) => format!("(error) {}\n", s),
        Value::Integer(n) => format!("(integer) {}\n", n),
        Value::BulkString(b) => format!("\"{}\"\n", b.escape_ascii()),
        Value::Null => "(nil)\n".to_string(),
        Value::Array(items) if items.is_empty() => "(empty array)\n".to_string(),
        Value::Array(items) => {
            let mut out = String::new();
            for (i, item) in items.iter().enumerate() {
                let prefix = format!("{}) ", i + 1);
                let pad = if i == 0 { String::new() } else { " ".repeat(indent) };
                out.push_str(&pad);
                out.push_str(&prefix);
                out.push_str(&render(item, indent + prefix.len()));
            }
            out
        }
    }
}
