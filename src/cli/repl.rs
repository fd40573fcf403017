//! Interactive chat loop.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use super::console::ConsoleCommand;
use super::render::render_event;
use super::Cli;
use crate::error::TaraError;
use crate::realtime::{RealtimeEvent, RealtimeSession};

/// Connect, chat until the user quits or the stream closes, then disconnect.
pub async fn run(cli: Cli) -> Result<(), TaraError> {
    let config = cli.resolve_config()?;

    println!("🌸 Welcome to TARA - Your AI Mental Health Companion");
    println!("{}", "=".repeat(50));

    let mut session = RealtimeSession::new(config);
    session.connect().await?;
    print_help();

    let outcome = chat_loop(&mut session).await;
    let closed = session.disconnect().await;
    println!("👋 Disconnected from TARA");
    outcome.and(closed)
}

fn print_help() {
    println!("\n💬 You can now chat with TARA!");
    println!("Commands:");
    println!("  - Type your message and press Enter");
    println!("  - Type 'voice' to start voice recording");
    println!("  - Type 'quit' to exit");
    println!("{}", "-".repeat(50));
}

fn prompt() {
    print!("\n💭 You: ");
    let _ = std::io::stdout().flush();
}

async fn chat_loop(session: &mut RealtimeSession) -> Result<(), TaraError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();

    loop {
        tokio::select! {
            event = session.next_event() => {
                let Some(event) = event else { break };
                for line in render_event(&event) {
                    println!("{line}");
                }
                if matches!(event, RealtimeEvent::Closed { .. }) {
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if session.is_recording() {
                    println!("🎤 Stopping audio recording...");
                    match session.stop_recording().await {
                        Ok(Some(summary)) if summary.sent => println!("🎵 Sending audio to TARA..."),
                        Ok(_) => {}
                        Err(error) if !error.is_fatal() => eprintln!("❌ {error}"),
                        Err(error) => return Err(error),
                    }
                    prompt();
                    continue;
                }
                match ConsoleCommand::parse(&line) {
                    ConsoleCommand::Quit => break,
                    ConsoleCommand::Voice => match session.start_recording().await {
                        Ok(()) => {
                            print!("🎤 Recording... Press Enter to stop");
                            let _ = std::io::stdout().flush();
                            continue;
                        }
                        Err(error) => {
                            warn!(error = %error, "could not start recording");
                            eprintln!("❌ {error}");
                        }
                    },
                    ConsoleCommand::Message(text) => {
                        if !session.send_text(&text) {
                            eprintln!("❌ Not connected to TARA");
                        }
                    }
                    ConsoleCommand::Empty => {}
                }
                prompt();
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}
