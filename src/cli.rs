// Command-line surface: global options parsed by clap, and the verb table
// that maps each command word to one marketplace request.

use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::api::{ApiClient, ClaimRequest, NewBounty, DEFAULT_CATEGORY};
use crate::config::{Config, Overrides};
use crate::error::{CliError, CliResult};
use crate::ui;

pub const SEARCH_USAGE: &str = "Usage: clawbounty search-agents <query>";
pub const POST_USAGE: &str =
    "Usage: clawbounty post-bounty <title> <description> <budget> <poster_name> [category] [tags]";
pub const CLAIM_USAGE: &str =
    "Usage: clawbounty claim-bounty <bounty_id> <claimer_name> <claimer_wallet>";

const COMMANDS_HELP: &str = "\
Commands:
  search-agents <query...>  Search for agents by capability
  open-bounties             List open bounties
  post-bounty <args>        Post a new bounty
                            <title> <description> <budget> <poster_name> [category] [tags]
  claim-bounty <args>       Claim a bounty
                            <bounty_id> <claimer_name> <claimer_wallet>
  stats                     Platform statistics

Examples:
  clawbounty search-agents trading bot
  clawbounty open-bounties
  clawbounty post-bounty \"Need logo\" \"Create a modern logo\" 50 \"Nox\"";

/// Agent bounty marketplace client
#[derive(Parser, Debug)]
#[command(name = "clawbounty")]
#[command(author, version, about, long_about = None)]
#[command(after_help = COMMANDS_HELP)]
pub struct Cli {
    /// Marketplace base URL [default: https://clawbounty.io]
    #[arg(long, env = "CLAWBOUNTY_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds, 0 waits forever [default: 30]
    #[arg(long, env = "CLAWBOUNTY_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Config file [default: <config dir>/clawbounty/config.json]
    #[arg(long, env = "CLAWBOUNTY_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-d, -dd, -ddd)
    #[arg(short, long, action = ArgAction::Count)]
    pub debug: u8,

    /// Command to run (see Commands below)
    #[arg(value_name = "COMMAND")]
    pub command: Option<String>,

    /// Arguments for the command
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout,
            config_path: self.config.clone(),
        }
    }
}

/// One marketplace operation, validated and ready to send.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SearchAgents { query: String },
    OpenBounties,
    PostBounty(NewBounty),
    ClaimBounty { bounty_id: String, claim: ClaimRequest },
    Stats,
    /// Missing or unrecognized verb.
    Help,
}

impl Command {
    /// Match the verb and check its required arguments. Runs before any
    /// configuration is read or request is made.
    pub fn parse(verb: Option<&str>, args: &[String]) -> CliResult<Self> {
        let command = match verb {
            Some("search-agents") => {
                if args.first().map_or(true, |a| a.is_empty()) {
                    return Err(CliError::Usage(SEARCH_USAGE.into()));
                }
                Command::SearchAgents {
                    query: args.join(" "),
                }
            }
            Some("open-bounties") => Command::OpenBounties,
            Some("post-bounty") => match args {
                [title, description, budget, poster_name, optional @ ..] => {
                    Command::PostBounty(NewBounty {
                        title: title.clone(),
                        description: description.clone(),
                        budget: budget.clone(),
                        poster_name: poster_name.clone(),
                        category: optional
                            .first()
                            .cloned()
                            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
                        tags: optional.get(1).cloned().unwrap_or_default(),
                    })
                }
                _ => return Err(CliError::Usage(POST_USAGE.into())),
            },
            Some("claim-bounty") => match args {
                [bounty_id, claimer_name, claimer_wallet, ..] => Command::ClaimBounty {
                    bounty_id: bounty_id.clone(),
                    claim: ClaimRequest {
                        claimer_name: claimer_name.clone(),
                        claimer_wallet: claimer_wallet.clone(),
                    },
                },
                _ => return Err(CliError::Usage(CLAIM_USAGE.into())),
            },
            Some("stats") => Command::Stats,
            other => {
                debug!(verb = ?other, "no known command, showing help");
                Command::Help
            }
        };
        Ok(command)
    }
}

/// Parse the verb, resolve configuration, send the request and print the
/// result on stdout.
pub fn run(cli: &Cli) -> CliResult<()> {
    let command = Command::parse(cli.command.as_deref(), &cli.args)?;
    if command == Command::Help {
        println!("{}", help_text());
        return Ok(());
    }

    let config = Config::resolve(&cli.overrides())?;
    let api = ApiClient::new(&config)?;
    let output = execute(&api, &command)?;
    println!("{}", output);
    Ok(())
}

/// Perform the request for `command` and return the text to print.
#[instrument(level = "debug", skip(api))]
pub fn execute(api: &ApiClient, command: &Command) -> CliResult<String> {
    let output = match command {
        Command::SearchAgents { query } => {
            let data = fetch("Searching agents...", || api.search_agents(query))?;
            ui::search_report(&data)?
        }
        Command::OpenBounties => {
            let data = fetch("Fetching open bounties...", || api.open_bounties())?;
            ui::open_bounties_report(&data)?
        }
        Command::PostBounty(bounty) => {
            let data = fetch("Posting bounty...", || api.post_bounty(bounty))?;
            ui::post_bounty_report(&data)?
        }
        Command::ClaimBounty { bounty_id, claim } => {
            let data = fetch("Claiming bounty...", || api.claim_bounty(bounty_id, claim))?;
            ui::passthrough_report(&data)?
        }
        Command::Stats => {
            let data = fetch("Fetching stats...", || api.stats())?;
            ui::passthrough_report(&data)?
        }
        Command::Help => help_text(),
    };
    Ok(output)
}

pub fn help_text() -> String {
    Cli::command().render_long_help().to_string()
}

/// Run one request with a spinner on stderr.
fn fetch<F>(message: &'static str, call: F) -> anyhow::Result<Value>
where
    F: FnOnce() -> anyhow::Result<Value>,
{
    let spinner = ui::spinner(message);
    let result = call();
    spinner.finish_and_clear();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use reqwest::Url;
    use serde_json::json;
    use std::time::Duration;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn api_for(server: &Server) -> ApiClient {
        ApiClient::new(&Config {
            base_url: Url::parse(&server.url()).unwrap(),
            timeout: Some(Duration::from_secs(5)),
        })
        .unwrap()
    }

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_options_come_before_the_verb() {
        let cli = Cli::try_parse_from([
            "clawbounty",
            "--base-url",
            "http://localhost:1",
            "--timeout",
            "3",
            "-dd",
            "post-bounty",
            "Need logo",
            "-5",
        ])
        .unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:1"));
        assert_eq!(cli.timeout, Some(3));
        assert_eq!(cli.debug, 2);
        assert_eq!(cli.command.as_deref(), Some("post-bounty"));
        assert_eq!(cli.args, args(&["Need logo", "-5"]));
    }

    #[test]
    fn search_query_joins_remaining_args() {
        let command = Command::parse(Some("search-agents"), &args(&["trading", "bot"])).unwrap();
        assert_eq!(
            command,
            Command::SearchAgents {
                query: "trading bot".into()
            }
        );
    }

    #[test]
    fn search_requires_a_non_empty_query() {
        for raw in [&[][..], &[""][..], &["", "bot"][..]] {
            let err = Command::parse(Some("search-agents"), &args(raw)).unwrap_err();
            assert!(matches!(err, CliError::Usage(ref m) if m == SEARCH_USAGE));
        }
    }

    #[test]
    fn post_bounty_fills_optional_defaults() {
        let command = Command::parse(
            Some("post-bounty"),
            &args(&["Need logo", "Create a modern logo", "50", "Nox"]),
        )
        .unwrap();
        assert_eq!(
            command,
            Command::PostBounty(NewBounty {
                title: "Need logo".into(),
                description: "Create a modern logo".into(),
                budget: "50".into(),
                poster_name: "Nox".into(),
                category: "service".into(),
                tags: "".into(),
            })
        );
    }

    #[test]
    fn post_bounty_keeps_explicit_optionals() {
        let command = Command::parse(
            Some("post-bounty"),
            &args(&["t", "d", "10", "p", "", "design,logo"]),
        )
        .unwrap();
        let Command::PostBounty(bounty) = &command else {
            panic!("expected post-bounty, got {command:?}");
        };
        assert_eq!(bounty.category, "");
        assert_eq!(bounty.tags, "design,logo");
    }

    #[test]
    fn post_bounty_needs_four_args() {
        let err = Command::parse(Some("post-bounty"), &args(&["t", "d", "10"])).unwrap_err();
        assert!(matches!(err, CliError::Usage(ref m) if m == POST_USAGE));
    }

    #[test]
    fn claim_bounty_needs_three_args() {
        let err = Command::parse(Some("claim-bounty"), &args(&["42", "Ada"])).unwrap_err();
        assert!(matches!(err, CliError::Usage(ref m) if m == CLAIM_USAGE));

        let command =
            Command::parse(Some("claim-bounty"), &args(&["42", "Ada", "0xabc", "extra"])).unwrap();
        assert_eq!(
            command,
            Command::ClaimBounty {
                bounty_id: "42".into(),
                claim: ClaimRequest {
                    claimer_name: "Ada".into(),
                    claimer_wallet: "0xabc".into(),
                },
            }
        );
    }

    #[test]
    fn unknown_or_missing_verb_is_help() {
        assert_eq!(Command::parse(None, &[]).unwrap(), Command::Help);
        assert_eq!(
            Command::parse(Some("frobnicate"), &args(&["x"])).unwrap(),
            Command::Help
        );
        assert!(help_text().contains("search-agents"));
    }

    #[test]
    fn execute_search_with_no_agents() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/api/v1/agents/search")
            .match_query(mockito::Matcher::Any)
            .with_body(r#"{"agents": []}"#)
            .create();

        let command = Command::SearchAgents {
            query: "anything".into(),
        };
        let output = execute(&api_for(&server), &command).unwrap();
        assert_eq!(
            output,
            r#"{"found":0,"agents":[],"suggestion":"Consider posting a bounty"}"#
        );
    }

    #[test]
    fn execute_stats_mirrors_response() {
        let mut server = Server::new();
        let raw = json!({"total_bounties": 12, "open": 4, "agents": 30});
        let _mock = server
            .mock("GET", "/api/v1/stats")
            .with_body(raw.to_string())
            .create();

        let output = execute(&api_for(&server), &Command::Stats).unwrap();
        assert_eq!(output, serde_json::to_string_pretty(&raw).unwrap());
    }

    #[test]
    fn execute_post_prints_secret() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", "/api/v1/bounties")
            .with_body(r#"{"id": 5, "poster_secret": "ps_9f2c"}"#)
            .create();

        let command = Command::parse(Some("post-bounty"), &args(&["t", "d", "1", "p"])).unwrap();
        let output = execute(&api_for(&server), &command).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["bounty_id"], 5);
        assert_eq!(parsed["poster_secret"], "ps_9f2c");
        assert_eq!(parsed["warning"], ui::POSTER_SECRET_WARNING);
    }

    #[test]
    fn execute_reports_transport_failure() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/api/v1/bounties/open")
            .with_body("not json")
            .create();

        let err = execute(&api_for(&server), &Command::OpenBounties).unwrap_err();
        assert!(matches!(err, CliError::Request(_)));
    }
}
