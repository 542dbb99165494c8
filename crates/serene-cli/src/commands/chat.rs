use anyhow::{Context, Result};
use serene_application::{CannedResponder, ChatService};
use serene_core::config::ChatConfig;
use serene_core::session::{ResponseState, SessionEvent, Turn, TurnAuthor};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

const QUIT_COMMAND: &str = "/quit";

pub async fn run(config: &ChatConfig) -> Result<()> {
    let responder = Arc::new(CannedResponder::new(config.canned_response.clone()));
    let chat = ChatService::open_in_memory(config, responder).await;

    println!("💬 Chat session started. Type {} to leave.", QUIT_COMMAND);
    println!("   Remember: this is an AI assistant. For crisis support, contact emergency services.\n");
    for turn in chat.list().await {
        print_turn(&turn);
    }

    let mut events = chat.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::TurnCommitted { turn }) if turn.is_counterpart() => {
                    print_turn(&turn)
                }
                Ok(SessionEvent::SessionClosed { .. }) | Err(RecvError::Closed) => break,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Chat] Display lagged, skipped {} event(s)", skipped);
                }
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut quit = false;
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim() == QUIT_COMMAND {
            quit = true;
            break;
        }
        match chat.submit_local(&line).await {
            Ok(_) => {}
            Err(e) if e.is_input_error() => println!("   ({}, type a message first)", e),
            Err(e) => return Err(e.into()),
        }
    }

    // On end of input, let the outstanding reply arrive before closing
    if !quit {
        let poll = Duration::from_millis(50);
        while chat
            .pending()
            .await
            .is_some_and(|p| p.state == ResponseState::Scheduled)
        {
            tokio::time::sleep(poll).await;
        }
    }

    let transcript = chat.close().await;
    join_display(printer).await;
    println!("\n👋 Session ended after {} message(s).", transcript.len());
    Ok(())
}

/// Waits for the display task; returns false if it panicked or was aborted.
async fn join_display(handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("[Chat] Display task failed: {}", e);
            false
        }
    }
}

fn print_turn(turn: &Turn) {
    let speaker = match turn.author {
        TurnAuthor::Local => "You",
        TurnAuthor::Counterpart => "Serene",
    };
    println!(
        "[{}] {}: {}",
        turn.created_at.format("%-I:%M %p"),
        speaker,
        turn.text
    );
}
