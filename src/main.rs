//! Terminal chat frontend
//!
//! Minimal REPL around the context core: read a line, append it, reduce the
//! history with the configured policy, stream the reply, append it back.

use chat_context::{ChatSession, Config, OpenAiClient, Result};
use futures::StreamExt;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    chat_context::logging::init(&config.logging);

    let client = OpenAiClient::new(config.completion.clone())?;
    let mut session = ChatSession::with_system(
        config.context.strategy(),
        config.context.system_prompt.as_str(),
    );

    info!(
        session = %session.id(),
        model = %config.completion.model,
        policy = ?config.context.policy,
        "chat session started"
    );
    println!(
        "Chat with {} — type 'exit' to quit.",
        config.completion.model
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" {
            break;
        }

        session.push_user(input);
        let window = session.context();

        match client.complete_stream(&window).await {
            Ok(stream) => {
                let mut stream = Box::pin(stream);
                let mut reply = String::new();
                while let Some(delta) = stream.next().await {
                    match delta {
                        Ok(text) => {
                            print!("{}", text);
                            std::io::stdout().flush()?;
                            reply.push_str(&text);
                        }
                        Err(e) => {
                            error!(error = %e, "reply stream interrupted");
                            break;
                        }
                    }
                }
                println!();
                session.push_assistant(reply);
            }
            Err(e) => {
                error!(error = %e, "completion request failed");
                eprintln!("request failed: {}", e);
            }
        }
    }

    info!(messages = session.len(), "chat session ended");
    Ok(())
}
