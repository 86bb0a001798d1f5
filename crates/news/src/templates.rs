//! Scripted event templates and the catalog that groups them into pools.
//!
//! This module provides [`TemplateCatalog`], which maps each
//! [`EventCategory`] to its weighted pool of [`EventTemplate`]s and keeps a
//! reverse index from headline to template (used to recognise stored rows).
//!
//! The catalog is a plain value: build it once at startup and hand it to the
//! generator and the schema mapper. Tests build catalogs with custom pools.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use types::EventCategory;

// =============================================================================
// EventTemplate
// =============================================================================

/// A scripted market event.
///
/// Sampling is uniform within a pool, so repeating a template in a pool
/// weights it proportionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTemplate {
    /// Template identifier (e.g. `macro-1`).
    pub id: String,
    pub category: EventCategory,
    /// Headline shown to players.
    pub title: String,
    /// Central impact estimate as a signed fraction.
    pub base_impact_pct: f64,
    pub icon: String,
    pub tags: Vec<String>,
    /// Long-form explanation (black swans).
    pub details: Option<String>,
}

impl EventTemplate {
    pub fn new(
        id: impl Into<String>,
        category: EventCategory,
        title: impl Into<String>,
        base_impact_pct: f64,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            title: title.into(),
            base_impact_pct,
            icon: icon.into(),
            tags: Vec::new(),
            details: None,
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

// =============================================================================
// TemplateCatalog
// =============================================================================

/// Pools of templates by category, plus a headline index.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    pools: HashMap<EventCategory, Vec<EventTemplate>>,

    /// Headline to (category, index in pool). First registration wins.
    by_title: HashMap<String, (EventCategory, usize)>,
}

impl TemplateCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template to the pool of its category.
    pub fn add(&mut self, template: EventTemplate) {
        let pool = self.pools.entry(template.category).or_default();
        self.by_title
            .entry(template.title.clone())
            .or_insert((template.category, pool.len()));
        pool.push(template);
    }

    /// Builder form of [`TemplateCatalog::add`].
    pub fn with(mut self, template: EventTemplate) -> Self {
        self.add(template);
        self
    }

    /// Templates of one category (empty slice if none).
    pub fn pool(&self, category: EventCategory) -> &[EventTemplate] {
        self.pools
            .get(&category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Template whose headline is exactly `title`.
    pub fn find_by_title(&self, title: &str) -> Option<&EventTemplate> {
        let (category, index) = self.by_title.get(title)?;
        self.pools.get(category)?.get(*index)
    }

    /// Total number of templates across all pools.
    pub fn len(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The built-in game catalog: 15 macro, 18 micro and 8 black swan templates.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for template in macro_pool()
            .into_iter()
            .chain(micro_pool())
            .chain(black_swan_pool())
        {
            catalog.add(template);
        }
        catalog
    }
}

// =============================================================================
// Built-in Pools
// =============================================================================

fn macro_pool() -> Vec<EventTemplate> {
    use EventCategory::Macro;
    vec![
        EventTemplate::new("macro-1", Macro, "Fed hikes rates by 25 bps", -0.012, "🏦")
            .with_tags(&["rates", "fed"]),
        EventTemplate::new("macro-2", Macro, "CPI cools below expectations", 0.015, "🧾")
            .with_tags(&["inflation", "cpi"]),
        EventTemplate::new("macro-3", Macro, "Oil jumps on OPEC+ cuts", 0.009, "🛢️")
            .with_tags(&["energy", "opec"]),
        EventTemplate::new("macro-4", Macro, "Unemployment rate drops to 3.5%", 0.011, "📊")
            .with_tags(&["employment", "labor"]),
        EventTemplate::new("macro-5", Macro, "GDP growth exceeds forecasts", 0.013, "📈")
            .with_tags(&["gdp", "growth"]),
        EventTemplate::new("macro-6", Macro, "Trade deficit widens unexpectedly", -0.010, "🌍")
            .with_tags(&["trade", "deficit"]),
        EventTemplate::new("macro-7", Macro, "Housing starts surge 15%", 0.008, "🏠")
            .with_tags(&["housing", "construction"]),
        EventTemplate::new("macro-8", Macro, "Retail sales decline for third month", -0.009, "🛒")
            .with_tags(&["retail", "consumption"]),
        EventTemplate::new("macro-9", Macro, "Manufacturing PMI hits 18-month high", 0.012, "🏭")
            .with_tags(&["manufacturing", "pmi"]),
        EventTemplate::new(
            "macro-10",
            Macro,
            "Dollar strengthens against major currencies",
            -0.007,
            "💵",
        )
        .with_tags(&["currency", "dollar"]),
        EventTemplate::new("macro-11", Macro, "Consumer confidence index plummets", -0.011, "😟")
            .with_tags(&["confidence", "consumer"]),
        EventTemplate::new("macro-12", Macro, "Central bank signals dovish pivot", 0.014, "🕊️")
            .with_tags(&["monetary", "policy"]),
        EventTemplate::new("macro-13", Macro, "Bond yields spike on inflation fears", -0.013, "📉")
            .with_tags(&["bonds", "yields"]),
        EventTemplate::new("macro-14", Macro, "Jobless claims hit record low", 0.010, "✅")
            .with_tags(&["employment", "claims"]),
        EventTemplate::new("macro-15", Macro, "Industrial production falls 2.3%", -0.012, "⚙️")
            .with_tags(&["industrial", "production"]),
    ]
}

fn micro_pool() -> Vec<EventTemplate> {
    use EventCategory::Micro;
    vec![
        EventTemplate::new("micro-1", Micro, "TechCo beats; raises guidance", 0.035, "💻")
            .with_tags(&["earnings", "tech"]),
        EventTemplate::new("micro-2", Micro, "BioHealth drug fails Phase 3", -0.028, "🧪")
            .with_tags(&["trial", "biotech"]),
        EventTemplate::new("micro-3", Micro, "AutoCo announces $5B buyback", 0.02, "🚗")
            .with_tags(&["buyback", "auto"]),
        EventTemplate::new("micro-4", Micro, "RetailGiant misses revenue targets", -0.022, "🏪")
            .with_tags(&["earnings", "retail"]),
        EventTemplate::new("micro-5", Micro, "EnergyCorp discovers major oil field", 0.025, "⛽")
            .with_tags(&["discovery", "energy"]),
        EventTemplate::new("micro-6", Micro, "BankInc reports record profits", 0.018, "🏛️")
            .with_tags(&["earnings", "banking"]),
        EventTemplate::new("micro-7", Micro, "PharmaCo gets FDA approval", 0.030, "💊")
            .with_tags(&["approval", "pharma"]),
        EventTemplate::new("micro-8", Micro, "Airlines face pilot shortage crisis", -0.015, "✈️")
            .with_tags(&["labor", "airlines"]),
        EventTemplate::new("micro-9", Micro, "StreamCo adds 10M subscribers", 0.022, "📺")
            .with_tags(&["growth", "media"]),
        EventTemplate::new(
            "micro-10",
            Micro,
            "ChipMaker announces factory expansion",
            0.019,
            "🔌",
        )
        .with_tags(&["expansion", "semiconductors"]),
        EventTemplate::new(
            "micro-11",
            Micro,
            "FoodChain faces supply chain disruption",
            -0.016,
            "🍔",
        )
        .with_tags(&["supply", "retail"]),
        EventTemplate::new("micro-12", Micro, "CloudCo signs $2B enterprise deal", 0.027, "☁️")
            .with_tags(&["contract", "tech"]),
        EventTemplate::new("micro-13", Micro, "AutoMaker recalls 500K vehicles", -0.024, "🚙")
            .with_tags(&["recall", "auto"]),
        EventTemplate::new("micro-14", Micro, "SocialMedia launches new ad platform", 0.021, "📱")
            .with_tags(&["product", "tech"]),
        EventTemplate::new("micro-15", Micro, "ShippingCo reports record losses", -0.020, "🚢")
            .with_tags(&["earnings", "logistics"]),
        EventTemplate::new("micro-16", Micro, "GamingCo releases blockbuster title", 0.023, "🎮")
            .with_tags(&["product", "gaming"]),
        EventTemplate::new(
            "micro-17",
            Micro,
            "MiningCorp faces environmental lawsuit",
            -0.017,
            "⛏️",
        )
        .with_tags(&["legal", "mining"]),
        EventTemplate::new("micro-18", Micro, "EVMaker doubles production capacity", 0.026, "🔋")
            .with_tags(&["expansion", "ev"]),
    ]
}

fn black_swan_pool() -> Vec<EventTemplate> {
    use EventCategory::BlackSwan;
    vec![
        EventTemplate::new("bs-1", BlackSwan, "Flash Crash: Liquidity Vacuum", -0.12, "⚠️")
            .with_details(
                "Severe market dislocation detected. Liquidity has evaporated across major exchanges.",
            ),
        EventTemplate::new(
            "bs-2",
            BlackSwan,
            "Geopolitical Shock: Sanctions Escalation",
            -0.08,
            "🛑",
        )
        .with_details("Major geopolitical event triggers widespread market uncertainty."),
        EventTemplate::new(
            "bs-3",
            BlackSwan,
            "Exchange Outage: Price Discovery Stalls",
            -0.06,
            "🧯",
        )
        .with_details("Critical exchange infrastructure failure disrupts trading operations."),
        EventTemplate::new("bs-4", BlackSwan, "Cyber Attack: Major Bank Breach", -0.10, "💻")
            .with_details(
                "Sophisticated cyber attack compromises major financial institution's systems.",
            ),
        EventTemplate::new(
            "bs-5",
            BlackSwan,
            "Natural Disaster: Supply Chain Collapse",
            -0.09,
            "🌊",
        )
        .with_details("Catastrophic natural disaster disrupts global supply chains."),
        EventTemplate::new(
            "bs-6",
            BlackSwan,
            "Regulatory Bombshell: Industry Shakeup",
            -0.11,
            "📜",
        )
        .with_details("Unexpected regulatory changes threaten entire industry sectors."),
        EventTemplate::new(
            "bs-7",
            BlackSwan,
            "Currency Crisis: Emerging Market Crash",
            -0.07,
            "💸",
        )
        .with_details("Major emerging market currency collapses, triggering global contagion."),
        EventTemplate::new(
            "bs-8",
            BlackSwan,
            "Commodity Shock: Resource Shortage",
            -0.085,
            "⚡",
        )
        .with_details("Critical resource shortage creates widespread economic disruption."),
    ]
}

// =============================================================================
// Tests
// =============================================================================
