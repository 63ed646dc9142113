//! Client for the external AI insight endpoint.
//!
//! The endpoint receives the four domain snapshots and answers with a short
//! list of insights. Anything other than a usable list (no endpoint, HTTP
//! error, unparsable body, a lone `system` notice) becomes
//! [`InsightOutcome::Unavailable`]. There is no automatic retry; the next
//! cycle simply asks again.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::InsightsConfig;
use crate::domain::{
    DomainSnapshots, FitnessSnapshot, PlanningSnapshot, RoutineSnapshot, WorkSnapshot,
};
use crate::error::InsightError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Work,
    Fitness,
    Routine,
    Planning,
    General,
    /// Explanation from the endpoint itself, e.g. missing credentials.
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub text: String,
    pub category: InsightCategory,
}

/// Request body sent to the endpoint.
#[derive(Debug, Serialize)]
pub struct InsightRequest<'a> {
    pub work: &'a WorkSnapshot,
    pub fitness: &'a FitnessSnapshot,
    pub routine: &'a RoutineSnapshot,
    pub planning: &'a PlanningSnapshot,
}

impl<'a> InsightRequest<'a> {
    pub fn from_snapshots(snapshots: &'a DomainSnapshots) -> Self {
        Self {
            work: &snapshots.work,
            fitness: &snapshots.fitness,
            routine: &snapshots.routine,
            planning: &snapshots.planning,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InsightsResponse {
    insights: Vec<Insight>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Result of one insights cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightOutcome {
    Available(Vec<Insight>),
    Unavailable(Unavailable),
}

/// Why no insights are shown this cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    NotConfigured,
    /// The endpoint explained itself with a single system insight.
    Notice(String),
    Status { status: u16, message: String },
    Malformed,
    Transport(String),
}

impl From<InsightError> for Unavailable {
    fn from(err: InsightError) -> Self {
        match err {
            InsightError::NotConfigured => Unavailable::NotConfigured,
            InsightError::Transport(e) => Unavailable::Transport(e.to_string()),
            InsightError::Status { status, message } => Unavailable::Status { status, message },
            InsightError::Malformed(_) => Unavailable::Malformed,
        }
    }
}

impl InsightOutcome {
    pub fn insights(&self) -> &[Insight] {
        match self {
            InsightOutcome::Available(insights) => insights,
            InsightOutcome::Unavailable(_) => &[],
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, InsightOutcome::Available(_))
    }

    fn from_insights(insights: Vec<Insight>) -> Self {
        if insights.len() == 1 && insights[0].category == InsightCategory::System {
            let notice = insights[0].text.clone();
            return InsightOutcome::Unavailable(Unavailable::Notice(notice));
        }
        InsightOutcome::Available(insights)
    }
}

/// Interpret a raw HTTP response.
///
/// # Errors
/// Non-2xx statuses become [`InsightError::Status`], using the body's
/// `error` field when present. A 2xx body that does not decode in full
/// becomes [`InsightError::Malformed`].
pub fn parse_response(status: u16, body: &str) -> Result<Vec<Insight>, InsightError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| body.trim().to_string());
        return Err(InsightError::Status { status, message });
    }
    let parsed: InsightsResponse = serde_json::from_str(body)?;
    Ok(parsed.insights)
}

pub struct InsightsClient {
    endpoint: Option<Url>,
    http: reqwest::Client,
}

impl InsightsClient {
    pub fn new(endpoint: Url, timeout: Duration) -> Self {
        Self {
            endpoint: Some(endpoint),
            http: build_http(timeout),
        }
    }

    /// Client that always reports [`Unavailable::NotConfigured`].
    pub fn disabled() -> Self {
        Self {
            endpoint: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &InsightsConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        match config.endpoint.as_deref().map(Url::parse) {
            Some(Ok(endpoint)) => Self::new(endpoint, timeout),
            Some(Err(e)) => {
                warn!(error = %e, "ignoring invalid insights endpoint");
                Self::disabled()
            }
            None => Self::disabled(),
        }
    }

    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    /// Ask the endpoint for insights once.
    pub async fn fetch(&self, snapshots: &DomainSnapshots) -> InsightOutcome {
        match self.try_fetch(snapshots).await {
            Ok(insights) => {
                debug!(count = insights.len(), "insights received");
                InsightOutcome::from_insights(insights)
            }
            Err(InsightError::NotConfigured) => {
                InsightOutcome::Unavailable(Unavailable::NotConfigured)
            }
            Err(e) => {
                warn!(error = %e, "insights unavailable this cycle");
                InsightOutcome::Unavailable(e.into())
            }
        }
    }

    /// [`fetch`](Self::fetch) on a private current-thread runtime, for
    /// synchronous shells. Must not be called from inside a tokio runtime.
    pub fn fetch_blocking(&self, snapshots: &DomainSnapshots) -> InsightOutcome {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => return InsightOutcome::Unavailable(Unavailable::Transport(e.to_string())),
        };
        runtime.block_on(self.fetch(snapshots))
    }

    async fn try_fetch(&self, snapshots: &DomainSnapshots) -> Result<Vec<Insight>, InsightError> {
        let endpoint = self.endpoint.as_ref().ok_or(InsightError::NotConfigured)?;
        let resp = self
            .http
            .post(endpoint.clone())
            .json(&InsightRequest::from_snapshots(snapshots))
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        parse_response(status, &body)
    }
}

fn build_http(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "falling back to default HTTP client");
            reqwest::Client::new()
        })
}
