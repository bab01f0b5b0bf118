//! Chat demo - escaping, extraction and a live call
//!
//! Shows how a prompt is embedded in the request body and how content is
//! pulled back out of a response. When `KEY` is set, also sends the prompt
//! to the configured endpoint.
//!
//! Run with: KEY=sk-... cargo run --example chat_demo

use chatllm_core::extract::{extract_content, ExtractionMode};
use chatllm_core::protocol::ChatRequest;
use chatllm_core::{ChatClient, ClientConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    chatllm_core::logging::init("chatllm_core=info");

    println!("\n🚀 ChatLLM Demo\n");

    // Example 1: request body
    println!("📝 Example 1: Request Body");
    println!("──────────────────────────");
    let request = ChatRequest::new("gpt-4o-mini", "Say \"hi\"\nthen stop.", 0.7);
    println!("{}\n", request.to_json_body());

    // Example 2: content extraction
    println!("📝 Example 2: Content Extraction");
    println!("────────────────────────────────");
    let body = r#"{"id":"chatcmpl-1","choices":[{"index":0,"message":{"role":"assistant","content":"hello \"world\"\n"}}]}"#;
    println!("positional: {:?}", extract_content(body));
    println!("structured: {:?}\n", ExtractionMode::Structured.extract(body));

    // Example 3: live call
    println!("📝 Example 3: Live Call");
    println!("───────────────────────");
    let config = ClientConfig::from_env()?;
    if config.credential().is_none() {
        println!("KEY is not set; skipping.");
        return Ok(());
    }

    println!("Endpoint: {}", config.endpoint_url());
    let client = ChatClient::new(config)?;
    match client
        .try_chat("Name the RTSP methods in one line.", "gpt-4o-mini", 3, 0.7)
        .await
    {
        Ok(outcome) => {
            println!("✅ {} attempt(s)", outcome.attempts);
            println!("{}", outcome.content);
        }
        Err(err) => println!("❌ {}", err),
    }

    Ok(())
}
