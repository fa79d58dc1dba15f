//! Streamed chat completion consumed as a `futures::Stream`, with Ctrl-C
//! cancelling the request.
//!
//! Run with:
//! ```bash
//! export OPENAI_API_KEY="your-api-key"
//! cargo run --example chat_stream
//! ```

use std::io::Write;

use futures::StreamExt;
use oaiclient::api::chat::{ChatCompletionMessage, ChatCompletionRequest};
use oaiclient::model::GPT4O_MINI;
use oaiclient::{Client, ClientConfig, RequestContext};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let client = Client::with_config(ClientConfig::from_env()?)?;
    let ctx = RequestContext::background();

    let token = ctx.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let request = ChatCompletionRequest::new(
        GPT4O_MINI,
        vec![
            ChatCompletionMessage::system("You are a terse assistant."),
            ChatCompletionMessage::user("Explain ownership in Rust in three sentences."),
        ],
    );

    let stream = client.create_chat_completion_stream(&ctx, request).await?;
    let stream = stream.into_stream();
    futures::pin_mut!(stream);

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => {
                for choice in &chunk.choices {
                    if let Some(content) = &choice.delta.content {
                        print!("{}", content);
                    }
                }
                std::io::stdout().flush()?;
            }
            Err(e) if e.is_timeout() => {
                eprintln!("\nCancelled");
                break;
            }
            Err(e) => {
                eprintln!("\nStream error: {}", e);
                return Err(e.into());
            }
        }
    }

    println!();
    Ok(())
}
