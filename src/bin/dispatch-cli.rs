use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "dispatch-cli")]
#[command(about = "Management CLI for web-dispatch", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8066")]
    url: String,

    #[arg(short, long, env = "DISPATCH_ADMIN_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server status and config generation
    Status,
    /// Show the live configuration
    Config,
    /// Enable or disable Strict-Transport-Security
    Hsts {
        #[arg(long, conflicts_with = "disable")]
        enable: bool,
        #[arg(long)]
        disable: bool,
        /// max-age in seconds
        #[arg(long)]
        max_age: Option<u64>,
        #[arg(long)]
        include_subdomains: Option<bool>,
    },
    /// Change the site URL
    SiteUrl { url: String },
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

    let service_url = format!("{}/admin/config/service", cli.url);
    let res = match cli.command {
        Commands::Status => {
            client.get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Config => {
            client.get(format!("{}/admin/config", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Hsts { enable, disable, max_age, include_subdomains } => {
            let mut patch = serde_json::Map::new();
            if enable || disable {
                patch.insert("tls_strict_transport".into(), json!(enable));
            }
            if let Some(max_age) = max_age {
                patch.insert("tls_strict_transport_max_age".into(), json!(max_age));
            }
            if let Some(include) = include_subdomains {
                patch.insert("tls_strict_transport_include_subdomains".into(), json!(include));
            }
            client.patch(service_url)
                .headers(headers)
                .json(&Value::Object(patch))
                .send()
                .await?
        }
        Commands::SiteUrl { url } => {
            client.patch(service_url)
                .headers(headers)
                .json(&json!({ "site_url": url }))
                .send()
                .await?
        }
    };

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

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
