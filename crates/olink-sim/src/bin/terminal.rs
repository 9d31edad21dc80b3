//! Interactive terminal process for one user id. Commands are read
//! from stdin; log output goes to stderr so the menu stays readable.

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use olink_core::MAX_USER_ID;
use olink_sim::{SimConfig, TerminalRuntime};

#[derive(Parser, Debug)]
#[command(name = "olink-terminal", about = "OFDMA link user terminal")]
struct Args {
    /// User id of this terminal.
    #[arg(value_parser = clap::value_parser!(u8).range(0..=MAX_USER_ID as i64))]
    user_id: u8,

    /// Config file; defaults to OLINK_CONFIG or ./olink.yaml.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SimConfig::load_from(path)?,
        None => SimConfig::load()?,
    };

    let mut runtime = TerminalRuntime::new(&config, args.user_id)?;
    println!("terminal up for user {}", runtime.user_id());

    loop {
        if let Err(e) = runtime.poll_inbox() {
            warn!(error = %e, "inbox poll failed");
        }
        if runtime.pending_messages() > 0 {
            println!("[{} new message(s), use read]", runtime.pending_messages());
        }

        let line = match prompt("command (req/send/dealloc/read/exit): ")? {
            Some(line) => line,
            None => break,
        };
        match line.as_str() {
            "req" => handle_request(&mut runtime)?,
            "send" => handle_send(&mut runtime)?,
            "dealloc" => {
                if let Err(e) = runtime.send_deallocate() {
                    warn!(error = %e, "deallocate failed");
                } else {
                    println!("deallocation sent");
                }
            }
            "read" => match runtime.next_message() {
                Some(message) => println!("message: {message}"),
                None => println!("no messages"),
            },
            "exit" => break,
            "" => {}
            other => println!("unknown command {other:?}"),
        }
        thread::sleep(runtime.poll_interval());
    }
    Ok(())
}

fn handle_request(runtime: &mut TerminalRuntime) -> Result<(), Box<dyn Error>> {
    let line = match prompt("bins to request (1-3): ")? {
        Some(line) => line,
        None => return Ok(()),
    };
    let bins: u8 = match line.parse() {
        Ok(bins) => bins,
        Err(_) => {
            println!("enter a number between 1 and 3");
            return Ok(());
        }
    };
    if let Err(e) = runtime.request_bins(bins) {
        warn!(error = %e, "request failed");
    } else {
        println!("request sent, poll with read for the grant");
    }
    Ok(())
}

fn handle_send(runtime: &mut TerminalRuntime) -> Result<(), Box<dyn Error>> {
    let Some(max) = runtime.max_payload() else {
        println!("no bins allocated, use req first");
        return Ok(());
    };

    let dest = match prompt(&format!("destination user (0-{MAX_USER_ID}): "))? {
        Some(line) => match line.parse::<u8>() {
            Ok(dest) if dest <= MAX_USER_ID => dest,
            _ => {
                println!("enter a user id between 0 and {MAX_USER_ID}");
                return Ok(());
            }
        },
        None => return Ok(()),
    };

    let payload = match prompt(&format!("payload (0-{max}): "))? {
        Some(line) => match line.parse::<u32>() {
            Ok(payload) => payload,
            Err(_) => {
                println!("enter a non-negative number");
                return Ok(());
            }
        },
        None => return Ok(()),
    };

    match runtime.send_data(dest, payload) {
        Ok(true) => println!("data sent to user {dest}"),
        Ok(false) => println!("no bins allocated, use req first"),
        Err(e) => warn!(error = %e, "send failed"),
    }
    Ok(())
}

/// Print a prompt and read one trimmed line. `None` means stdin hit
/// end of file.
fn prompt(label: &str) -> io::Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
