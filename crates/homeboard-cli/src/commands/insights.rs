use clap::Subcommand;
use homeboard_core::{Config, DomainSnapshots, InsightOutcome, InsightsClient, Unavailable};
use serde_json::json;

use super::{open_session, print_json, CmdResult};

#[derive(Subcommand)]
pub enum InsightsAction {
    /// Send the current snapshots to the insights endpoint and print the result
    Fetch,
}

pub fn run(action: InsightsAction) -> CmdResult {
    match action {
        InsightsAction::Fetch => {
            let config = Config::load()?;
            let registry = open_session(&config)?;
            let snapshots = DomainSnapshots::read(&registry);
            let client = InsightsClient::from_config(&config.insights);

            let report = match client.fetch_blocking(&snapshots) {
                InsightOutcome::Available(insights) => json!({
                    "available": true,
                    "insights": insights,
                }),
                InsightOutcome::Unavailable(reason) => json!({
                    "available": false,
                    "reason": describe(&reason),
                }),
            };
            print_json(&report)
        }
    }
}

fn describe(reason: &Unavailable) -> String {
    match reason {
        Unavailable::NotConfigured => "no insights endpoint configured".to_string(),
        Unavailable::Notice(text) => text.clone(),
        Unavailable::Status { status, message } => format!("endpoint returned {status}: {message}"),
        Unavailable::Malformed => "endpoint returned an unreadable response".to_string(),
        Unavailable::Transport(e) => format!("request failed: {e}"),
    }
}
