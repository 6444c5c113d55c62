//! calorie CLI: estimate calories from the terminal

use calorie_engine::{
    Config, ConversationEntry, ConversationState, Estimate, EstimationClient, Transition,
    DEFAULT_CONFIG_PATH,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Calorie and macronutrient estimates for meals and ingredients
#[derive(Parser, Debug)]
#[command(name = "calorie")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Base URL of the estimation API (overrides the config file)
    #[arg(long, global = true, env = "CALORIE_API_URL")]
    api_url: Option<String>,

    /// Write logs to this file (the TUI only logs when this is set)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Open the TUI (default when no command specified)
    Tui,

    /// Estimate a single meal or ingredient and print the result
    Estimate {
        /// The meal or ingredient, e.g. "pasta with tomato sauce"
        #[arg(required = true, num_args = 1..)]
        food: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default config file
    Init,

    /// Print the effective configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    if let Err(e) = init_logging(cli.log_file.as_deref(), interactive) {
        eprintln!("Failed to open log file: {e}");
        std::process::exit(1);
    }

    if cli.command == Some(Commands::Init) {
        cmd_init(&cli.config);
        return;
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", cli.config.display());
            std::process::exit(1);
        }
    };

    match cli.command {
        None | Some(Commands::Tui) => {
            let rt = runtime();
            if let Err(e) = rt.block_on(calorie_tui::run_tui(&config)) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Estimate { food, json }) => {
            cmd_estimate(&config, &food.join(" "), json);
        }
        Some(Commands::Config { json }) => {
            cmd_config(&config, json);
        }
        Some(Commands::Init) => {}
    }
}

/// Set up tracing.
///
/// Logs go to `log_file` when given. Without one, one-shot commands log to
/// stderr and the TUI does not log at all, since it owns the terminal.
fn init_logging(log_file: Option<&Path>, interactive: bool) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if interactive => {}
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config, calorie_engine::ConfigError> {
    let mut config = Config::load_or_default(&cli.config)?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_base_url(url.as_str());
    }
    debug!(endpoint = %config.endpoint(), "Loaded configuration");
    Ok(config)
}

fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_init(path: &Path) {
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return;
    }

    match Config::default().save(path) {
        Ok(()) => println!("Created {}", path.display()),
        Err(e) => {
            eprintln!("Failed to write config: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_config(config: &Config, json: bool) {
    if json {
        match serde_json::to_string_pretty(config) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("Failed to serialize config: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("API base URL:  {}", config.api_base_url);
    println!("Estimate path: {}", config.estimate_path);
    println!("Endpoint:      {}", config.endpoint());
    println!("Tick rate:     {}ms", config.tick_rate_ms);
}

fn cmd_estimate(config: &Config, query: &str, json: bool) {
    let client = match EstimationClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let rt = runtime();
    let estimate = match rt.block_on(run_estimate(&client, query)) {
        Ok(estimate) => estimate,
        Err(message) => {
            eprintln!("Error: {message}");
            std::process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&estimate) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("Failed to serialize estimate: {e}");
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", format_estimate(query.trim(), &estimate));
    }
}

/// Run one query through the same conversation transitions the TUI uses.
///
/// Returns the estimate, or the message the TUI would show for the failure.
async fn run_estimate(client: &EstimationClient, query: &str) -> Result<Estimate, String> {
    let step = ConversationState::new().apply(Transition::Submit(query.to_string()));
    let Some((ticket, request)) = step.dispatch() else {
        return Err("nothing to estimate".to_string());
    };
    let request = request.clone();

    let result = client.estimate(&request).await;
    let state = step
        .state
        .apply(Transition::completed(ticket, result, Utc::now()))
        .state;

    match state.log().last() {
        Some(ConversationEntry::EstimationResult(result)) => Ok(result.estimate.clone()),
        Some(ConversationEntry::Error(error)) => Err(error.message.clone()),
        _ => Err(calorie_engine::FALLBACK_ERROR_MESSAGE.to_string()),
    }
}

/// Plain-text rendering of an estimate.
fn format_estimate(query: &str, estimate: &Estimate) -> String {
    let mut out = format!("Nutrition Estimation: {query}\n");
    for (label, value) in estimate.rows() {
        out.push_str(&format!("  {label:<13} {value}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_no_command_opens_tui() {
        let cli = Cli::try_parse_from(["calorie"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn test_estimate_joins_words() {
        let cli = Cli::try_parse_from(["calorie", "estimate", "pasta", "with", "tomato", "sauce"])
            .unwrap();
        match cli.command {
            Some(Commands::Estimate { food, json }) => {
                assert_eq!(food.join(" "), "pasta with tomato sauce");
                assert!(!json);
            }
            other => panic!("expected estimate, got {other:?}"),
        }
    }

    #[test]
    fn test_estimate_requires_food() {
        assert!(Cli::try_parse_from(["calorie", "estimate"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "calorie",
            "config",
            "--json",
            "--api-url",
            "http://10.0.0.5:8080",
            "--config",
            "/tmp/calorie.json",
        ])
        .unwrap();
        assert_eq!(cli.command, Some(Commands::Config { json: true }));
        assert_eq!(cli.api_url.as_deref(), Some("http://10.0.0.5:8080"));
        assert_eq!(cli.config, PathBuf::from("/tmp/calorie.json"));
    }

    #[test]
    fn test_api_url_overrides_config() {
        let cli = Cli::try_parse_from([
            "calorie",
            "--config",
            "/nonexistent/calorie.json",
            "--api-url",
            "https://food.example.com",
            "tui",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(
            config.endpoint(),
            "https://food.example.com/api/estimate-calories"
        );
    }

    async fn server_answering(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/estimate-calories"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    fn client_for(server: &MockServer) -> EstimationClient {
        let config = Config::default().with_api_base_url(server.uri());
        EstimationClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_run_estimate_success() {
        let server = server_answering(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "estimated_serving": "1 medium (182g)",
                "calories": 95,
                "protein": 0.5,
                "carbs": 25,
                "fat": 0.3,
                "confidence": 0.85
            }
        })))
        .await;

        let estimate = run_estimate(&client_for(&server), " apple ").await.unwrap();
        assert_eq!(estimate.serving_size, "1 medium (182g)");
        assert_eq!(estimate.confidence_percent(), "85%");
    }

    #[tokio::test]
    async fn test_run_estimate_server_error() {
        let server = server_answering(
            ResponseTemplate::new(422).set_body_json(json!({ "error": "unknown food item" })),
        )
        .await;

        let err = run_estimate(&client_for(&server), "xyzzy").await.unwrap_err();
        assert_eq!(err, "unknown food item");
    }

    #[tokio::test]
    async fn test_run_estimate_bad_payload_uses_fallback() {
        let server =
            server_answering(ResponseTemplate::new(200).set_body_json(json!({ "data": {} }))).await;

        let err = run_estimate(&client_for(&server), "apple").await.unwrap_err();
        assert_eq!(err, calorie_engine::FALLBACK_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_run_estimate_blank_query() {
        let server = server_answering(ResponseTemplate::new(500)).await;
        let err = run_estimate(&client_for(&server), "   ").await.unwrap_err();
        assert_eq!(err, "nothing to estimate");
    }

    #[test]
    fn test_format_estimate() {
        let estimate = Estimate {
            serving_size: "100g".into(),
            calories: 165.0,
            protein_grams: 31.0,
            carbs_grams: 0.0,
            fat_grams: 3.6,
            confidence: 0.92,
        };
        let out = format_estimate("chicken breast", &estimate);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Nutrition Estimation: chicken breast");
        assert_eq!(lines[1], "  Serving Size  100g");
        assert_eq!(lines[2], "  Calories      165");
        assert_eq!(lines[6], "  Confidence    92%");
        assert_eq!(lines.len(), 7);
    }
}
