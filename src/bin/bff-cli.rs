use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "bff-cli")]
#[command(about = "Management CLI for the BFF gateway admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long)]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// List registered frontends in registration order
    List,
    /// Show one frontend
    Get { name: String },
    /// Add or replace a frontend
    Put {
        name: String,
        /// Absolute URI the frontend is served on, e.g. https://shop.example.com
        #[arg(long)]
        host: Option<String>,
        /// Path prefix, e.g. /app
        #[arg(long)]
        path: Option<String>,
        /// Index page source URI
        #[arg(long)]
        index_html: Option<String>,
        /// Static asset source URI
        #[arg(long)]
        static_assets: Option<String>,
    },
    /// Remove a frontend
    Remove { name: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );
    let frontends = format!("{}/admin/frontends", cli.url);

    let request = match cli.command {
        Commands::Status => client.get(format!("{}/admin/status", cli.url)),
        Commands::List => client.get(frontends),
        Commands::Get { name } => client.get(format!("{frontends}/{name}")),
        Commands::Put {
            name,
            host,
            path,
            index_html,
            static_assets,
        } => {
            let mut body = Map::new();
            for (key, value) in [
                ("host", host),
                ("path", path),
                ("index_html", index_html),
                ("static_assets", static_assets),
            ] {
                if let Some(value) = value {
                    body.insert(key.to_string(), json!(value));
                }
            }
            client.put(format!("{frontends}/{name}")).json(&Value::Object(body))
        }
        Commands::Remove { name } => client.delete(format!("{frontends}/{name}")),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }
    if status == StatusCode::NO_CONTENT {
        println!("Done");
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
