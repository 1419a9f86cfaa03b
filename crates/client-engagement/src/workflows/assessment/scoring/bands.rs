use super::super::domain::{BudgetRange, MarketingTiming, PackageTier, WebsiteScope};

impl PackageTier {
    /// Marketing timing is the dominant signal for tier selection.
    pub const fn from_timing(timing: MarketingTiming) -> Self {
        match timing {
            MarketingTiming::FoundationFirst => Self::Foundation,
            MarketingTiming::Together => Self::Growth,
            MarketingTiming::Ongoing => Self::Performance,
        }
    }

    /// Smallest website scope the package is sized for.
    pub const fn scope_floor(self) -> WebsiteScope {
        match self {
            Self::Foundation | Self::Performance => WebsiteScope::Compact,
            Self::Growth => WebsiteScope::Standard,
        }
    }

    /// Largest website scope the package can deliver.
    pub const fn scope_ceiling(self) -> WebsiteScope {
        match self {
            Self::Foundation => WebsiteScope::Standard,
            Self::Growth => WebsiteScope::Comprehensive,
            Self::Performance => WebsiteScope::Extensive,
        }
    }

    pub const fn budget_band_label(self) -> &'static str {
        match self {
            Self::Foundation => "entry investment",
            Self::Growth => "mid-range investment",
            Self::Performance => "premium, open-ended investment",
        }
    }

    /// How many bands `self` sits above `other`; zero when at or below it.
    pub(crate) const fn bands_above(self, other: PackageTier) -> u8 {
        (self as u8).saturating_sub(other as u8)
    }

    /// Budget declaration matching this package's band.
    pub const fn matching_budget(self) -> BudgetRange {
        match self {
            Self::Foundation => BudgetRange::FoundationBudget,
            Self::Growth => BudgetRange::GrowthBudget,
            Self::Performance => BudgetRange::PerformanceBudget,
        }
    }
}

impl BudgetRange {
    /// Package band the declared budget can pay for. `None` for `unsure`.
    pub const fn band(self) -> Option<PackageTier> {
        match self {
            Self::FoundationBudget => Some(PackageTier::Foundation),
            Self::GrowthBudget => Some(PackageTier::Growth),
            Self::PerformanceBudget => Some(PackageTier::Performance),
            Self::Unsure => None,
        }
    }

    /// Next band up, saturating at the top. `unsure` stays undecided.
    pub const fn raised(self) -> Self {
        match self {
            Self::FoundationBudget => Self::GrowthBudget,
            Self::GrowthBudget | Self::PerformanceBudget => Self::PerformanceBudget,
            Self::Unsure => Self::Unsure,
        }
    }
}

impl WebsiteScope {
    /// Lowest package band whose budget can pay for a site of this size.
    pub const fn budget_demand(self) -> PackageTier {
        match self {
            Self::Compact | Self::Standard => PackageTier::Foundation,
            Self::Comprehensive => PackageTier::Growth,
            Self::Extensive => PackageTier::Performance,
        }
    }

    pub const fn is_large(self) -> bool {
        matches!(self, Self::Comprehensive | Self::Extensive)
    }
}
