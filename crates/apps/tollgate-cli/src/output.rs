//! Output formatting for CLI.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use tollgate_client::{CallEnvelope, CallSuccess, FREE_NOTE};
use tollgate_ledger::BudgetStatus;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use 'human' or 'json'.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Trait for renderable output.
pub trait Render {
    /// Render as human-readable string.
    fn render_human(&self) -> String;

    /// Render as JSON string.
    fn render_json(&self) -> String;

    /// Render in the specified format.
    fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Human => self.render_human(),
            OutputFormat::Json => self.render_json(),
        }
    }
}

// =============================================================================
// Output Types
// =============================================================================

/// Output for a successful call.
#[derive(Debug, Clone)]
pub struct CallOutput {
    pub success: CallSuccess,
}

impl Render for CallOutput {
    fn render_human(&self) -> String {
        let header = match &self.success.payment {
            Some(receipt) => format!(
                "{} {} on {} (spent today: {})",
                "Paid".green().bold(),
                receipt.price_usd,
                receipt.network,
                receipt.spent_today
            ),
            None => format!("{} {}", "Free:".green().bold(), FREE_NOTE),
        };
        format!("{}\n{}", header, render_data(&self.success.data))
    }

    fn render_json(&self) -> String {
        CallEnvelope::from(self.success.clone()).to_json_pretty()
    }
}

/// Response data for a terminal: strings as-is, everything else as pretty JSON.
fn render_data(data: &Value) -> String {
    match data {
        Value::String(text) => text.clone(),
        Value::Null => "(empty response)".dimmed().to_string(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Output for the budget command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetOutput {
    #[serde(flatten)]
    pub status: BudgetStatus,
    pub state_file: PathBuf,
}

impl Render for BudgetOutput {
    fn render_human(&self) -> String {
        let remaining = if self.status.remaining.is_zero() {
            self.status.remaining.to_string().red().to_string()
        } else {
            self.status.remaining.to_string().green().to_string()
        };
        [
            format!("{} {} (UTC)", "Date:".bold(), self.status.date),
            format!("{} {}", "Spent today:".bold(), self.status.spent),
            format!("{} {}", "Remaining:".bold(), remaining),
            format!("{} {}", "Daily limit:".bold(), self.status.daily_limit),
            format!("{} {}", "Per-call limit:".bold(), self.status.per_call_limit),
            format!("{} {}", "State file:".bold(), self.state_file.display()),
        ]
        .join("\n")
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Output for a passing self-test.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfTestOutput {
    pub ok: bool,
    pub api_base: String,
    pub wallets: Vec<String>,
    pub reachability_checked: bool,
}

impl Render for SelfTestOutput {
    fn render_human(&self) -> String {
        "OK".green().bold().to_string()
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tollgate_client::{PaymentReceipt, TerminalState};
    use tollgate_types::{ChainNamespace, UsdAmount};

    fn paid_success() -> CallSuccess {
        CallSuccess {
            state: TerminalState::PaidOk,
            url: "https://1ly.store/api/link/joe/weather".into(),
            data: json!({"temp": 21}),
            payment: Some(PaymentReceipt {
                network: "solana:devnet".into(),
                namespace: ChainNamespace::solana(),
                pay_to: "Recipient1111".into(),
                amount_minor_units: 10_000,
                price_usd: UsdAmount::from_micros(10_000),
                spent_today: UsdAmount::from_micros(30_000),
            }),
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_call_output_paid() {
        let output = CallOutput {
            success: paid_success(),
        };

        let human = output.render(OutputFormat::Human);
        assert!(human.contains("$0.01"));
        assert!(human.contains("solana:devnet"));
        assert!(human.contains("$0.03"));
        assert!(human.contains("\"temp\": 21"));

        let value: Value = serde_json::from_str(&output.render(OutputFormat::Json)).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["data"]["temp"], 21);
        assert_eq!(value["meta"]["state"], "PAID_OK");
        assert_eq!(value["meta"]["payment"]["priceUsd"], 0.01);
    }

    #[test]
    fn test_call_output_free_text_body() {
        let output = CallOutput {
            success: CallSuccess {
                state: TerminalState::FreeOk,
                url: "http://x".into(),
                data: json!("plain text"),
                payment: None,
            },
        };
        let human = output.render(OutputFormat::Human);
        assert!(human.contains(FREE_NOTE));
        assert!(human.ends_with("plain text"));
    }
}
