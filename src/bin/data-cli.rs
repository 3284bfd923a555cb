use clap::{Parser, Subcommand};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

#[derive(Parser)]
#[command(name = "data-cli")]
#[command(about = "Read request resources and write response resources of a handler", long_about = None)]
struct Cli {
    /// Base URL of the data API.
    #[arg(short, long, env = "DATA_API_URL", default_value = "http://127.0.0.1:8082")]
    url: String,

    /// Handler the calls are addressed to.
    #[arg(long = "handler", env = "DATA_API_HANDLER_ID")]
    handler_id: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a resource, e.g. `request/headers/Accept`
    Get { resource_path: String },
    /// Write a resource, e.g. `response/status 404`; reads stdin when no value is given
    Set {
        resource_path: String,
        value: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Get { resource_path } => {
            client
                .get(resource_url(&cli.url, &cli.handler_id, &resource_path))
                .send()
                .await?
        }
        Commands::Set {
            resource_path,
            value,
        } => {
            let body = match value {
                Some(value) => reqwest::Body::from(value),
                None => reqwest::Body::wrap_stream(ReaderStream::new(tokio::io::stdin())),
            };
            client
                .put(resource_url(&cli.url, &cli.handler_id, &resource_path))
                .body(body)
                .send()
                .await?
        }
    };

    print_response(res).await
}

fn resource_url(base: &str, handler_id: &str, resource_path: &str) -> String {
    format!(
        "{}/handlers/{}/{}",
        base.trim_end_matches('/'),
        urlencoding::encode(handler_id),
        resource_path.trim_start_matches('/')
    )
}

async fn print_response(mut res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: data API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let mut stdout = tokio::io::stdout();
    while let Some(chunk) = res.chunk().await? {
        stdout.write_all(&chunk).await?;
    }
    stdout.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_url() {
        assert_eq!(
            resource_url("http://127.0.0.1:8082/", "HANDLER_1", "/request/headers/Accept"),
            "http://127.0.0.1:8082/handlers/HANDLER_1/request/headers/Accept"
        );
        assert_eq!(
            resource_url("http://localhost:1", "a b", "response/status"),
            "http://localhost:1/handlers/a%20b/response/status"
        );
    }
}
