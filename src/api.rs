// API client module: a small blocking HTTP client that talks to the
// ClawBounty marketplace. Each call sends one request and returns the
// decoded JSON body as-is; reshaping it for display is left to `ui`.

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;

/// Category sent with a new bounty when the caller gives none.
pub const DEFAULT_CATEGORY: &str = "service";

/// Blocking client bound to one marketplace base URL.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

/// A marketplace participant as returned by agent search. The server owns
/// the schema: every field may be missing or carry an unexpected type, and
/// none of that is an error.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Agent {
    #[serde(default)]
    pub id: Value,
    /// `None` when the key is absent; an explicit `null` is kept.
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub wallet_address: Option<Value>,
    /// Non-string descriptions are treated as absent.
    #[serde(default, deserialize_with = "text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "offerings")]
    pub job_offerings: Vec<JobOffering>,
}

/// A service an agent offers for hire.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct JobOffering {
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub price: Value,
    #[serde(default)]
    pub description: Value,
}

fn present<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<Value>, D::Error> {
    Value::deserialize(d).map(Some)
}

fn text<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn offerings<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<JobOffering>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .iter()
            .map(|item| JobOffering::deserialize(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

/// Form payload for creating a bounty. Field order is the order sent on the
/// wire.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewBounty {
    pub title: String,
    pub description: String,
    /// Passed through as typed by the user; the server parses it.
    pub budget: String,
    pub poster_name: String,
    pub category: String,
    /// Comma-separated by convention.
    pub tags: String,
}

/// JSON payload for claiming a bounty.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ClaimRequest {
    pub claimer_name: String,
    pub claimer_wallet: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("clawbounty/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// `GET /api/v1/agents/search?q=<query>`
    pub fn search_agents(&self, query: &str) -> Result<Value> {
        let url = self.endpoint(&["api", "v1", "agents", "search"])?;
        debug!(%url, query, "searching agents");
        let res = self
            .client
            .get(url)
            .query(&[("q", query)])
            .send()
            .context("Failed to send agent search request")?;
        decode(res, "agent search")
    }

    /// `GET /api/v1/bounties/open`
    pub fn open_bounties(&self) -> Result<Value> {
        let url = self.endpoint(&["api", "v1", "bounties", "open"])?;
        debug!(%url, "listing open bounties");
        let res = self
            .client
            .get(url)
            .send()
            .context("Failed to send open bounties request")?;
        decode(res, "open bounties")
    }

    /// `POST /api/v1/bounties` with a form-encoded body.
    pub fn post_bounty(&self, bounty: &NewBounty) -> Result<Value> {
        let url = self.endpoint(&["api", "v1", "bounties"])?;
        debug!(%url, title = %bounty.title, "posting bounty");
        let res = self
            .client
            .post(url)
            .form(bounty)
            .send()
            .context("Failed to send post bounty request")?;
        decode(res, "post bounty")
    }

    /// `POST /api/bounties/{bounty_id}/claim` with a JSON body.
    pub fn claim_bounty(&self, bounty_id: &str, claim: &ClaimRequest) -> Result<Value> {
        let url = self.endpoint(&["api", "bounties", bounty_id, "claim"])?;
        debug!(%url, claimer = %claim.claimer_name, "claiming bounty");
        let res = self
            .client
            .post(url)
            .json(claim)
            .send()
            .context("Failed to send claim bounty request")?;
        decode(res, "claim bounty")
    }

    /// `GET /api/v1/stats`
    pub fn stats(&self) -> Result<Value> {
        let url = self.endpoint(&["api", "v1", "stats"])?;
        debug!(%url, "fetching stats");
        let res = self
            .client
            .get(url)
            .send()
            .context("Failed to send stats request")?;
        decode(res, "stats")
    }

    /// Append path segments to the base URL. Segments are percent-encoded, so
    /// a bounty id can never escape its path position.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("base URL {} cannot carry a path", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Read the body and parse it as JSON. The HTTP status is only logged: the
/// marketplace reports application errors as JSON bodies, and those are
/// relayed to the user unchanged.
fn decode(res: Response, what: &str) -> Result<Value> {
    let status = res.status();
    debug!(%status, url = %res.url(), "{} response", what);
    let body = res
        .text()
        .with_context(|| format!("Failed to read {} response", what))?;
    let data: Value = serde_json::from_str(&body)
        .with_context(|| format!("Parsing {} response json (HTTP {})", what, status))?;
    if !status.is_success() {
        warn!(%status, "{} request was not successful", what);
    }
    Ok(data)
}
