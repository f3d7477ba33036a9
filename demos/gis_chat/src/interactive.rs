use colored::*;
use geoagent::core::protocol::Event;
use geoagent::core::session::{Session, SessionOutcome, EXIT_KEYWORDS};
use geoagent::startup::Started;
use geoagent::SessionError;
use log::debug;
use std::future::Future;
use std::io;
use tokio::io::BufReader;
use tokio::sync::mpsc;

pub async fn run_interactive_session(started: Started) -> Result<(), SessionError> {
    let tool_names = started.tool_names();
    println!(
        "{}",
        format!("Loaded {} GIS tools: {}", tool_names.len(), tool_names.join(", ")).green()
    );
    println!(
        "Ask about geometries, projections or measurements. Type '{}' to leave.\n",
        EXIT_KEYWORDS.join("', '")
    );

    let mut session =
        Session::new(started.orchestrator).with_history_mode(started.config.history_mode);
    debug!("History mode: {}", session.history_mode());

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = io::stdout();

    let outcome = session.run(stdin, &mut stdout, interrupted()).await?;
    if outcome == SessionOutcome::Interrupted {
        println!("Interrupted. Goodbye!");
        // The blocking stdin reader would keep the runtime alive until Enter.
        std::process::exit(0);
    }
    Ok(())
}

/// Runs `work` unless `interrupt` resolves first.
pub async fn until_interrupted<W, I>(work: W, interrupt: I) -> Option<W::Output>
where
    W: Future,
    I: Future<Output = ()>,
{
    tokio::select! {
        output = work => Some(output),
        _ = interrupt => None,
    }
}

pub async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler: never report an interrupt.
        std::future::pending::<()>().await;
    }
}

pub fn handle_events(mut rx: mpsc::Receiver<Event>) {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                Event::ToolCallRequested {
                    tool_name,
                    arguments,
                    ..
                } => {
                    println!(
                        "{}",
                        format!("Tool Call Started: {tool_name} with args: {arguments}").green()
                    );
                }
                Event::ToolCallCompleted {
                    tool_name, result, ..
                } => {
                    println!(
                        "{}",
                        format!("Tool Call Completed: {tool_name} - Result: {result}").green()
                    );
                }
                Event::ToolCallFailed {
                    tool_name, error, ..
                } => {
                    println!(
                        "{}",
                        format!("Tool Call Failed: {tool_name} - Error: {error}").red()
                    );
                }
                Event::TurnStarted {
                    turn_number,
                    max_turns,
                } => debug!("Turn {}/{max_turns} started", turn_number + 1),
                Event::TurnCompleted {
                    turn_number,
                    final_turn,
                } => debug!("Turn {} completed (final: {final_turn})", turn_number + 1),
            }
        }
    });
}
