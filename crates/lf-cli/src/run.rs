//! Flow run command handling for the CLI

use anyhow::{Context, Result};
use lf_api_contract::{RunRequest, StreamEvent, Tweaks};
use lf_core::{RunOutcome, SessionController};
use lf_rest_client::ClientConfig;
use tokio::sync::mpsc;
use tracing::warn;

use crate::{Cli, USAGE};

impl Cli {
    /// Client configuration from the connection flags
    pub fn client_config(&self) -> Result<ClientConfig> {
        let token = self
            .token
            .as_deref()
            .context("an application token is required (--token or LANGFLOW_APPLICATION_TOKEN)")?;
        ClientConfig::from_url(&self.base_url, token)
            .with_context(|| format!("invalid base URL {}", self.base_url))
    }

    /// Run request for `message` from the positional and flow flags
    pub fn run_request(&self, message: &str) -> Result<RunRequest> {
        let flow_id = self
            .flow_id
            .as_deref()
            .context("a flow id is required (--flow-id or LANGFLOW_FLOW_ID)")?;
        let namespace_id = self
            .namespace_id
            .as_deref()
            .context("a workflow namespace id is required (--namespace-id or LANGFLOW_ID)")?;

        let tweaks: Tweaks = self.tweaks.iter().cloned().collect();

        Ok(RunRequest::new(flow_id, namespace_id, message)
            .with_input_type(self.input_type.clone().unwrap_or_default())
            .with_output_type(self.output_type.clone().unwrap_or_default())
            .with_tweaks(tweaks)
            .with_stream(self.streaming()))
    }

    /// Run the flow and print its output
    pub async fn run(self) -> Result<()> {
        let Some(message) = self.message.as_deref() else {
            eprintln!("{USAGE}");
            return Ok(());
        };

        let request = self.run_request(message)?;
        let controller = SessionController::rest(self.client_config()?)?;

        let (events, mut rx) = mpsc::unbounded_channel();
        let outcome = controller.run(&request, events).await;
        let stream = outcome.as_ref().and_then(|o| o.stream.clone());

        // Ends once the handler is dropped: right away for non-streaming
        // runs, after the terminal event otherwise.
        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => print_event(&event),
                    None => break,
                },
                _ = tokio::signal::ctrl_c(), if stream.is_some() => {
                    controller.close_stream();
                }
            }
        }

        if let Some(outcome) = outcome {
            if outcome.stream.is_none() {
                print_final_output(&outcome);
            }
        }

        Ok(())
    }
}

/// Human-readable line for a stream event
pub fn render_event(event: &StreamEvent) -> String {
    match event {
        StreamEvent::Update(payload) => match event.chunk() {
            Some(chunk) => format!("Received: {chunk}"),
            None => format!("Received: {payload}"),
        },
        StreamEvent::Close(reason) => format!("Stream Closed: {reason}"),
        StreamEvent::Error(message) => format!("Error: {message}"),
    }
}

fn print_event(event: &StreamEvent) {
    match event {
        StreamEvent::Error(_) => eprintln!("{}", render_event(event)),
        _ => println!("{}", render_event(event)),
    }
}

fn print_final_output(outcome: &RunOutcome) {
    match outcome.final_text() {
        Ok(text) => println!("Final Output: {text}"),
        Err(err) => {
            warn!(error = %err, "Response carries no final output");
            println!("Response: {}", outcome.response.as_json());
        }
    }
}
