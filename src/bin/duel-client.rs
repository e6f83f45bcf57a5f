//! Console client for the duel-room coordinator
//!
//! Connects to a coordinator, prints every server line, and forwards stdin
//! lines as replies. One background task reads the server stream; when that
//! stream ends the whole process exits.
//!
//! Usage:
//!   cargo run --bin duel-client -- [host] [port]

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Console client for the duel-room coordinator
#[derive(Parser)]
#[command(
    name = "duel-client",
    version,
    about = "Interactive console client for the duel-room match coordinator"
)]
struct Args {
    /// Coordinator host
    #[arg(value_name = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Coordinator port
    #[arg(value_name = "PORT", default_value_t = 5000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let stream = match TcpStream::connect((args.host.as_str(), args.port)).await {
        Ok(stream) => {
            println!("Connected to {}:{}", args.host, args.port);
            stream
        }
        Err(e) => {
            eprintln!("Failed to connect to {}:{}: {}", args.host, args.port, e);
            std::process::exit(1);
        }
    };
    stream.set_nodelay(true)?;

    let (read_half, mut write_half) = stream.into_split();

    // Background reader: print server lines until the stream ends, then stop
    // the whole process
    tokio::spawn(async move {
        let mut lines = BufReader::new(read_half).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            println!("{}", line);
        }
        println!("[Disconnected]");
        std::process::exit(0);
    });

    // Main loop: forward user input to the coordinator
    let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = stdin_lines.next_line().await {
        if write_half
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .is_err()
        {
            break;
        }
    }

    Ok(())
}
