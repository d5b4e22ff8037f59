//! Flow-run CLI library

pub mod run;

// Re-export CLI types for testing
pub use clap::Parser;

use lf_api_contract::IoType;
use lf_rest_client::DEFAULT_BASE_URL;

/// Printed when no input message is given
pub const USAGE: &str =
    r#"Please run the command with the message as an argument: lf "user_message""#;

/// Component override given as `COMPONENT_ID[=JSON_OBJECT]`
pub type TweakArg = (String, serde_json::Map<String, serde_json::Value>);

#[derive(Parser, Debug)]
#[command(name = "lf")]
#[command(about = "Run a hosted flow and print its output")]
#[command(version, author, long_about = None)]
pub struct Cli {
    /// Input message sent to the flow
    pub message: Option<String>,

    /// Input type tag (chat, text, any, debug or any other tag), defaults to chat
    pub input_type: Option<IoType>,

    /// Output type tag (chat, text, any, debug or any other tag), defaults to chat
    pub output_type: Option<IoType>,

    /// Pass `true` to stream incremental output
    pub stream: Option<String>,

    /// Base URL of the flow-run service
    #[arg(long, env = "LANGFLOW_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Application token sent as a bearer credential
    #[arg(long, env = "LANGFLOW_APPLICATION_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Identifier of the flow to run
    #[arg(long, env = "LANGFLOW_FLOW_ID")]
    pub flow_id: Option<String>,

    /// Workflow namespace identifier embedded in the run path
    #[arg(long, env = "LANGFLOW_ID")]
    pub namespace_id: Option<String>,

    /// Component override, repeatable
    #[arg(long = "tweak", value_name = "COMPONENT[=JSON]", value_parser = parse_tweak)]
    pub tweaks: Vec<TweakArg>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Streaming is enabled only by the literal `true`
    pub fn streaming(&self) -> bool {
        self.stream.as_deref() == Some("true")
    }
}

fn parse_tweak(arg: &str) -> Result<TweakArg, String> {
    let (component, overrides) = match arg.split_once('=') {
        Some((component, json)) => {
            let value: serde_json::Value =
                serde_json::from_str(json).map_err(|e| format!("invalid tweak JSON: {e}"))?;
            match value {
                serde_json::Value::Object(map) => (component, map),
                _ => return Err("tweak value must be a JSON object".to_string()),
            }
        }
        None => (arg, serde_json::Map::new()),
    };

    if component.is_empty() {
        return Err("tweak component id cannot be empty".to_string());
    }
    Ok((component.to_string(), overrides))
}
