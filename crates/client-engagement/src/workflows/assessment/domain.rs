use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for the external engagement record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EngagementId(pub String);

impl fmt::Display for EngagementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier assigned by the record store when an assessment is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raised when a stored or submitted value falls outside a closed vocabulary.
/// Never coerced to a default tier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownEnumValue {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownEnumValue {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

fn canonical(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

/// Digital-presence maturity declared on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentState {
    Scratch,
    Basics,
    Refresh,
    MarketingOnly,
}

impl CurrentState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scratch => "starting from scratch",
            Self::Basics => "has the basics",
            Self::Refresh => "needs a refresh",
            Self::MarketingOnly => "needs marketing only",
        }
    }
}

impl FromStr for CurrentState {
    type Err = UnknownEnumValue;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match canonical(raw).as_str() {
            "scratch" => Ok(Self::Scratch),
            "basics" => Ok(Self::Basics),
            "refresh" => Ok(Self::Refresh),
            "marketing_only" => Ok(Self::MarketingOnly),
            _ => Err(UnknownEnumValue::new("current_state", raw)),
        }
    }
}

/// Capability tags a client can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Need {
    Brand,
    Website,
    Ecommerce,
    Booking,
    Content,
    Seo,
    SocialMedia,
    EmailMarketing,
    PaidAds,
    Analytics,
}

impl Need {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Website => "website",
            Self::Ecommerce => "ecommerce",
            Self::Booking => "booking",
            Self::Content => "content",
            Self::Seo => "seo",
            Self::SocialMedia => "social_media",
            Self::EmailMarketing => "email_marketing",
            Self::PaidAds => "paid_ads",
            Self::Analytics => "analytics",
        }
    }
}

impl FromStr for Need {
    type Err = UnknownEnumValue;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match canonical(raw).as_str() {
            "brand" | "branding" => Ok(Self::Brand),
            "website" => Ok(Self::Website),
            "ecommerce" | "e_commerce" => Ok(Self::Ecommerce),
            "booking" => Ok(Self::Booking),
            "content" => Ok(Self::Content),
            "seo" => Ok(Self::Seo),
            "social_media" | "social" => Ok(Self::SocialMedia),
            "email_marketing" | "email" => Ok(Self::EmailMarketing),
            "paid_ads" | "ads" => Ok(Self::PaidAds),
            "analytics" => Ok(Self::Analytics),
            _ => Err(UnknownEnumValue::new("need", raw)),
        }
    }
}

/// Website size, ordered from smallest to largest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WebsiteScope {
    Compact,
    Standard,
    Comprehensive,
    Extensive,
}

impl WebsiteScope {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Standard => "standard",
            Self::Comprehensive => "comprehensive",
            Self::Extensive => "extensive",
        }
    }
}

impl FromStr for WebsiteScope {
    type Err = UnknownEnumValue;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match canonical(raw).as_str() {
            "compact" => Ok(Self::Compact),
            "standard" => Ok(Self::Standard),
            "comprehensive" => Ok(Self::Comprehensive),
            "extensive" => Ok(Self::Extensive),
            _ => Err(UnknownEnumValue::new("website_scope", raw)),
        }
    }
}

/// When marketing effort should start relative to the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketingTiming {
    FoundationFirst,
    Together,
    Ongoing,
}

impl MarketingTiming {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FoundationFirst => "foundation first, marketing later",
            Self::Together => "build and market together",
            Self::Ongoing => "ongoing marketing partnership",
        }
    }
}

impl FromStr for MarketingTiming {
    type Err = UnknownEnumValue;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match canonical(raw).as_str() {
            "foundation_first" => Ok(Self::FoundationFirst),
            "together" => Ok(Self::Together),
            "ongoing" => Ok(Self::Ongoing),
            _ => Err(UnknownEnumValue::new("marketing_timing", raw)),
        }
    }
}

/// Declared budget band. The intake also submits numeric tiers (`1`..`3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetRange {
    FoundationBudget,
    GrowthBudget,
    PerformanceBudget,
    Unsure,
}

impl BudgetRange {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FoundationBudget => "foundation budget",
            Self::GrowthBudget => "growth budget",
            Self::PerformanceBudget => "performance budget",
            Self::Unsure => "budget not yet decided",
        }
    }
}

impl FromStr for BudgetRange {
    type Err = UnknownEnumValue;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match canonical(raw).as_str() {
            "foundation_budget" | "1" | "tier_1" | "tier1" => Ok(Self::FoundationBudget),
            "growth_budget" | "2" | "tier_2" | "tier2" => Ok(Self::GrowthBudget),
            "performance_budget" | "3" | "tier_3" | "tier3" => Ok(Self::PerformanceBudget),
            "unsure" | "not_sure" | "0" => Ok(Self::Unsure),
            _ => Err(UnknownEnumValue::new("budget_range", raw)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineExpectation {
    Asap,
    Normal,
    Patient,
    SpecificDate,
}

impl TimelineExpectation {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Asap => "as soon as possible",
            Self::Normal => "normal pace",
            Self::Patient => "flexible timeline",
            Self::SpecificDate => "fixed launch date",
        }
    }
}

impl FromStr for TimelineExpectation {
    type Err = UnknownEnumValue;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match canonical(raw).as_str() {
            "asap" => Ok(Self::Asap),
            "normal" => Ok(Self::Normal),
            "patient" | "flexible" => Ok(Self::Patient),
            "specific_date" => Ok(Self::SpecificDate),
            _ => Err(UnknownEnumValue::new("timeline_expectation", raw)),
        }
    }
}

/// Canonical, validated intake answers. Built by the normalizer only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationInput {
    pub current_state: CurrentState,
    pub needs: BTreeSet<Need>,
    pub website_scope: WebsiteScope,
    pub marketing_timing: MarketingTiming,
    pub budget_range: BudgetRange,
    pub timeline_expectation: TimelineExpectation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
}

/// Packages offered to clients, ordered by size.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageTier {
    Foundation,
    Growth,
    Performance,
}

impl PackageTier {
    pub const fn ordered() -> [Self; 3] {
        [Self::Foundation, Self::Growth, Self::Performance]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Foundation => "Foundation",
            Self::Growth => "Growth",
            Self::Performance => "Performance",
        }
    }
}

impl FromStr for PackageTier {
    type Err = UnknownEnumValue;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match canonical(raw).as_str() {
            "foundation" => Ok(Self::Foundation),
            "growth" => Ok(Self::Growth),
            "performance" => Ok(Self::Performance),
            _ => Err(UnknownEnumValue::new("package", raw)),
        }
    }
}

/// Three-level confidence. The percentage form is display-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub const fn percentage(self) -> u8 {
        match self {
            Self::High => 85,
            Self::Medium => 60,
            Self::Low => 35,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Incompatibility between budget, scope and timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MismatchType {
    BudgetScope,
    ScopeTooLarge,
    TimelineUnrealistic,
}

impl MismatchType {
    /// Higher is more severe; used to pick the single reported cause.
    pub const fn severity(self) -> u8 {
        match self {
            Self::BudgetScope => 1,
            Self::ScopeTooLarge => 2,
            Self::TimelineUnrealistic => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::BudgetScope => "budget does not cover the recommended scope",
            Self::ScopeTooLarge => "website scope exceeds the recommended package",
            Self::TimelineUnrealistic => "timeline is unrealistic for this scope",
        }
    }
}

/// Presentation-only explanation of a recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reasoning {
    pub primary_factor: String,
    pub budget_fit: String,
    pub scope_fit: String,
    pub timeline_fit: String,
}

/// Result of scoring an input. Recomputed on every submit or remedy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationOutput {
    pub recommended_package: PackageTier,
    pub confidence_level: ConfidenceLevel,
    pub confidence_percent: u8,
    pub budget_aligned: bool,
    pub has_mismatch: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mismatch_type: Option<MismatchType>,
    pub show_mismatch_screen: bool,
    pub reasoning: Reasoning,
    pub internal_notes: String,
}
