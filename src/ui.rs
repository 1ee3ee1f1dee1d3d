// Output layer: turns marketplace responses into the JSON text printed on
// stdout, and shows a spinner on stderr while a request is in flight.

use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::Agent;

pub const MAX_AGENTS: usize = 10;
pub const MAX_OFFERINGS: usize = 3;
pub const MAX_DESCRIPTION_CHARS: usize = 200;

pub const NO_AGENTS_SUGGESTION: &str = "Consider posting a bounty";
pub const POSTER_SECRET_WARNING: &str =
    "SAVE THE poster_secret! You need it to modify/cancel this bounty.";

/// What search-agents shows for one agent.
#[derive(Serialize, Debug, PartialEq)]
pub struct AgentSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<Value>,
    pub offerings: Vec<Value>,
    pub description: String,
}

impl From<Agent> for AgentSummary {
    fn from(agent: Agent) -> Self {
        let offerings = agent
            .job_offerings
            .into_iter()
            .take(MAX_OFFERINGS)
            .map(|o| o.name)
            .collect();
        let description = agent
            .description
            .map(|d| d.chars().take(MAX_DESCRIPTION_CHARS).collect())
            .unwrap_or_default();
        AgentSummary {
            name: agent.name,
            wallet: agent.wallet_address,
            offerings,
            description,
        }
    }
}

/// Render a search response. With no agents the fixed suggestion object is
/// printed on a single line; otherwise the first agents are summarized and
/// pretty-printed.
pub fn search_report(data: &Value) -> Result<String> {
    let agents = match data.get("agents").and_then(Value::as_array) {
        Some(agents) if !agents.is_empty() => agents,
        _ => {
            let empty = json!({
                "found": 0,
                "agents": [],
                "suggestion": NO_AGENTS_SUGGESTION
            });
            return Ok(empty.to_string());
        }
    };

    // An entry that is not even an object shows up as an empty summary.
    let summaries: Vec<AgentSummary> = agents
        .iter()
        .take(MAX_AGENTS)
        .map(|a| AgentSummary::from(Agent::deserialize(a).unwrap_or_default()))
        .collect();

    render_pretty(&json!({
        "found": agents.len(),
        "agents": summaries
    }))
}

/// Render the open bounty list, falling back to `0` / `[]` for missing fields.
pub fn open_bounties_report(data: &Value) -> Result<String> {
    let count = truthy(data.get("count")).cloned().unwrap_or(json!(0));
    let bounties = truthy(data.get("open_bounties"))
        .cloned()
        .unwrap_or(json!([]));
    render_pretty(&json!({
        "count": count,
        "bounties": bounties
    }))
}

/// Render a post-bounty response. A returned poster secret means success and
/// is shown together with a warning to keep it; anything else is relayed as
/// the error.
pub fn post_bounty_report(data: &Value) -> Result<String> {
    let report = match truthy(data.get("poster_secret")) {
        Some(secret) => {
            let mut report = json!({ "success": true });
            if let Some(id) = data.get("id") {
                report["bounty_id"] = id.clone();
            }
            report["poster_secret"] = secret.clone();
            report["warning"] = json!(POSTER_SECRET_WARNING);
            report
        }
        None => json!({
            "success": false,
            "error": data
        }),
    };
    render_pretty(&report)
}

/// Pretty-print a response without touching it.
pub fn passthrough_report(data: &Value) -> Result<String> {
    render_pretty(data)
}

fn render_pretty(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).context("Serializing output json")
}

/// JSON truthiness: null, false, zero and the empty string count as absent.
fn truthy(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Start a stderr spinner for a request. indicatif hides it when stderr is
/// not a terminal, so piped output stays clean.
pub fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
