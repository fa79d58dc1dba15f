//! Streamed completion read with `recv()`.
//!
//! Run with:
//! ```bash
//! export OPENAI_API_KEY="your-api-key"
//! RUST_LOG=oaiclient=debug cargo run --example completion_stream
//! ```

use std::io::Write;

use oaiclient::api::completion::CompletionRequest;
use oaiclient::model::GPT3_DOT5_TURBO_INSTRUCT;
use oaiclient::{Client, ClientConfig, RequestContext};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = Client::with_config(ClientConfig::from_env()?)?;
    let ctx = RequestContext::with_timeout(std::time::Duration::from_secs(60));

    let request = CompletionRequest::new(
        GPT3_DOT5_TURBO_INSTRUCT,
        "Write a haiku about Rust programming.",
    )
    .with_max_tokens(64);

    let mut stream = client.create_completion_stream(&ctx, request).await?;
    println!("Streaming response...\n");

    loop {
        match stream.recv().await {
            Ok(Some(chunk)) => {
                if let Some(choice) = chunk.choices.first() {
                    print!("{}", choice.text);
                    std::io::stdout().flush()?;
                }
            }
            Ok(None) => {
                println!("\n\n=== Stream finished ===");
                break;
            }
            Err(e) => {
                eprintln!("\nStream error: {}", e);
                break;
            }
        }
    }

    stream.close();
    Ok(())
}
