use lf_api_contract::IoType;
use lf_cli::{Cli, Parser};
use serde_json::json;

fn connection_flags() -> Vec<&'static str> {
    vec![
        "--token",
        "app-token",
        "--flow-id",
        "flow-1",
        "--namespace-id",
        "ns-1",
    ]
}

#[test]
fn test_cli_parsing_message_only() {
    let mut args = vec!["lf", "Hello"];
    args.extend(connection_flags());

    let cli = Cli::try_parse_from(args).unwrap();
    assert_eq!(cli.message.as_deref(), Some("Hello"));
    assert!(!cli.streaming());

    let request = cli.run_request("Hello").unwrap();
    assert_eq!(request.flow_id, "flow-1");
    assert_eq!(request.workflow_namespace_id, "ns-1");
    assert_eq!(request.input_type, IoType::Chat);
    assert_eq!(request.output_type, IoType::Chat);
    assert!(!request.stream);
    assert!(request.tweaks.is_empty());
}

#[test]
fn test_cli_parsing_all_positionals() {
    let mut args = vec!["lf", "Hello", "text", "any", "true"];
    args.extend(connection_flags());

    let cli = Cli::try_parse_from(args).unwrap();
    assert!(cli.streaming());

    let request = cli.run_request("Hello").unwrap();
    assert_eq!(request.input_type, IoType::Text);
    assert_eq!(request.output_type, IoType::Any);
    assert_eq!(request.endpoint(), "/lf/ns-1/api/v1/run/flow-1?stream=true");
}

#[test]
fn test_only_literal_true_enables_streaming() {
    for flag in ["yes", "TRUE", "1", "false"] {
        let cli = Cli::try_parse_from(["lf", "Hello", "chat", "chat", flag]).unwrap();
        assert!(!cli.streaming(), "{flag} should not enable streaming");
    }
}

#[test]
fn test_cli_parsing_tweaks() {
    let mut args = vec![
        "lf",
        "Hello",
        "--tweak",
        "Agent-ohu9V",
        "--tweak",
        r#"ChatInput-VrNAv={"sender_name":"User"}"#,
    ];
    args.extend(connection_flags());

    let cli = Cli::try_parse_from(args).unwrap();
    let request = cli.run_request("Hello").unwrap();

    assert_eq!(request.tweaks.len(), 2);
    assert!(request.tweaks["Agent-ohu9V"].is_empty());
    assert_eq!(
        request.tweaks["ChatInput-VrNAv"].get("sender_name"),
        Some(&json!("User"))
    );
}

#[test]
fn test_missing_message_still_parses() {
    let cli = Cli::try_parse_from(["lf"]).unwrap();
    assert!(cli.message.is_none());
}

#[test]
fn test_client_config_requires_token() {
    let cli = Cli::try_parse_from(["lf", "Hello", "--base-url", "http://localhost:7860"]).unwrap();
    if cli.token.is_none() {
        assert!(cli.client_config().is_err());
    }

    let cli = Cli::try_parse_from([
        "lf",
        "Hello",
        "--base-url",
        "http://localhost:7860",
        "--token",
        "t",
    ])
    .unwrap();
    let config = cli.client_config().unwrap();
    assert_eq!(config.base_url().as_str(), "http://localhost:7860/");
    assert_eq!(config.credential().token(), "t");
}

#[test]
fn test_cli_unknown_io_type_is_forwarded() {
    let mut args = vec!["lf", "Hello", "voice"];
    args.extend(connection_flags());

    let cli = Cli::try_parse_from(args).unwrap();
    let request = cli.run_request("Hello").unwrap();
    assert_eq!(request.input_type, IoType::Other("voice".to_string()));
    assert_eq!(request.output_type, IoType::Chat);
}

#[test]
fn test_cli_empty_io_type_is_rejected() {
    assert!(Cli::try_parse_from(["lf", "Hello", ""]).is_err());
}

#[test]
fn test_cli_invalid_tweak() {
    assert!(Cli::try_parse_from(["lf", "Hello", "--tweak", "X=[1]"]).is_err());
}
