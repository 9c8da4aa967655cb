//! Sales-funnel categories assigned to inbound lead replies.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Category assigned to an SMS reply from a lead.
///
/// Serialized as the exact label the CRM expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "New")]
    New,
    #[serde(rename = "Working With Someone Else")]
    WorkingWithSomeoneElse,
    #[serde(rename = "Not Interested")]
    NotInterested,
    #[serde(rename = "Garden Lead - Send Quote")]
    GardenLeadSendQuote,
    #[serde(rename = "Who are you?")]
    WhoAreYou,
    #[serde(rename = "Already Closed")]
    AlreadyClosed,
    #[serde(rename = "Holding Off")]
    HoldingOff,
    #[serde(rename = "Not Licensed in State/Loan Product Not Available")]
    NotLicensedInState,
    #[serde(rename = "HELOC / No Cash-Out Interest")]
    HelocNoCashOut,
    #[serde(rename = "Ask For LE / Already In Process")]
    AskForLe,
    #[serde(rename = "Land Loan")]
    LandLoan,
    #[serde(rename = "Wrong Number")]
    WrongNumber,
    #[serde(rename = "Already in Process")]
    AlreadyInProcess,
    #[serde(rename = "Spanish")]
    Spanish,
    #[serde(rename = "Hard DNC Language")]
    HardDnc,
    /// Fallback when classification fails.
    #[serde(rename = "Uncategorized")]
    Uncategorized,
}

/// Strips wrapping the model sometimes adds around a bare label.
static LABEL_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*(?:[-*•]\s*)?(?:category\s*:\s*)?["'`*]*\s*(.*?)\s*["'`*]*\s*\.?\s*$"#)
        .expect("label regex is valid")
});

impl Category {
    /// Every category the model may assign, in prompt order.
    pub const ALL: [Category; 15] = [
        Category::New,
        Category::WorkingWithSomeoneElse,
        Category::NotInterested,
        Category::GardenLeadSendQuote,
        Category::WhoAreYou,
        Category::AlreadyClosed,
        Category::HoldingOff,
        Category::NotLicensedInState,
        Category::HelocNoCashOut,
        Category::AskForLe,
        Category::LandLoan,
        Category::WrongNumber,
        Category::AlreadyInProcess,
        Category::Spanish,
        Category::HardDnc,
    ];

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::WorkingWithSomeoneElse => "Working With Someone Else",
            Self::NotInterested => "Not Interested",
            Self::GardenLeadSendQuote => "Garden Lead - Send Quote",
            Self::WhoAreYou => "Who are you?",
            Self::AlreadyClosed => "Already Closed",
            Self::HoldingOff => "Holding Off",
            Self::NotLicensedInState => "Not Licensed in State/Loan Product Not Available",
            Self::HelocNoCashOut => "HELOC / No Cash-Out Interest",
            Self::AskForLe => "Ask For LE / Already In Process",
            Self::LandLoan => "Land Loan",
            Self::WrongNumber => "Wrong Number",
            Self::AlreadyInProcess => "Already in Process",
            Self::Spanish => "Spanish",
            Self::HardDnc => "Hard DNC Language",
            Self::Uncategorized => "Uncategorized",
        }
    }

    /// Parse a model completion into a category.
    ///
    /// Uses the first non-empty line, drops a `Category:` prefix, list
    /// bullets, quotes and a trailing period, then matches labels
    /// case-insensitively. `Uncategorized` is never returned here.
    pub fn parse_label(raw: &str) -> Option<Category> {
        let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
        let cleaned = LABEL_NOISE
            .captures(line)
            .and_then(|c| c.get(1))
            .map_or(line, |m| m.as_str());

        Self::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(cleaned))
            // The model sometimes drops the question mark.
            .or_else(|| {
                cleaned
                    .eq_ignore_ascii_case("who are you")
                    .then_some(Category::WhoAreYou)
            })
    }

    /// True for the fallback sentinel.
    pub fn is_uncategorized(&self) -> bool {
        matches!(self, Self::Uncategorized)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
