//! Unary completion request.
//!
//! Run with:
//! ```bash
//! export OPENAI_API_KEY="your-api-key"
//! cargo run --example completion
//! ```

use oaiclient::api::completion::CompletionRequest;
use oaiclient::model::GPT3_DOT5_TURBO_INSTRUCT;
use oaiclient::{Client, ClientConfig, RequestContext};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let client = Client::with_config(ClientConfig::from_env()?)?;
    let ctx = RequestContext::with_timeout(std::time::Duration::from_secs(30));

    let request = CompletionRequest::new(GPT3_DOT5_TURBO_INSTRUCT, "The capital of France is")
        .with_max_tokens(10)
        .with_temperature(0.0);

    println!("Sending completion request...");

    match client.create_completion(&ctx, request).await {
        Ok(response) => {
            println!("\n=== Response ===");
            for choice in &response.choices {
                println!("[{}] {}", choice.index, choice.text.trim());
            }
            if let Some(usage) = &response.usage {
                println!("Total tokens: {}", usage.total_tokens);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
