use std::path::PathBuf;

use clap::{Parser, Subcommand};
use payment_gate::payments::{JsonFileStore, PaymentStateStore};
use reqwest::StatusCode;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Management CLI for the payment gate", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the payment status
    Status,
    /// Download the bundle archive
    Download {
        /// Output file (defaults to the server-provided name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the locally persisted payment state
    State {
        #[arg(short, long, default_value = "payment_state.json")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/api/payment-status", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Download { output } => {
            let res = client.get(format!("{}/download/bundle", cli.url))
                .send()
                .await?;
            download(res, output).await?;
        }
        Commands::State { path } => {
            match JsonFileStore::new(&path).load() {
                Some(state) => println!("{}", serde_json::to_string_pretty(&state)?),
                None => println!("No persisted payment in {}", path.display()),
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    // The status endpoint answers JSON even on 503.
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => {
            eprintln!("Error: server returned status {}", status);
            eprintln!("Response: {}", text);
        }
    }
    Ok(())
}

async fn download(
    res: reqwest::Response,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if status == StatusCode::FORBIDDEN {
        eprintln!("Locked: {}", res.text().await.unwrap_or_default());
        return Ok(());
    }
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let path = output.unwrap_or_else(|| PathBuf::from(attachment_name(&res)));
    let bytes = res.bytes().await?;
    std::fs::write(&path, &bytes)?;
    println!("Saved {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn attachment_name(res: &reqwest::Response) -> String {
    res.headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split("filename=").nth(1))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty() && !name.contains('/'))
        .unwrap_or_else(|| "bundle.tar.gz".to_string())
}
