use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    Stocks,
    Crypto,
    Predictions,
    SportsCards,
    Pokemon,
    Collectibles,
    Art,
    RealEstate,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Stocks,
        Category::Crypto,
        Category::Predictions,
        Category::SportsCards,
        Category::Pokemon,
        Category::Collectibles,
        Category::Art,
        Category::RealEstate,
    ];

    /// Wire tag sent to the proxy.
    pub fn id(self) -> &'static str {
        match self {
            Category::Stocks => "stocks",
            Category::Crypto => "crypto",
            Category::Predictions => "predictions",
            Category::SportsCards => "sports_cards",
            Category::Pokemon => "pokemon",
            Category::Collectibles => "collectibles",
            Category::Art => "art",
            Category::RealEstate => "real_estate",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Stocks => "Stocks",
            Category::Crypto => "Crypto",
            Category::Predictions => "Predictions",
            Category::SportsCards => "Cards",
            Category::Pokemon => "Pokémon",
            Category::Collectibles => "Collectibles",
            Category::Art => "Art",
            Category::RealEstate => "Real Estate",
        }
    }

    pub fn examples(self) -> &'static str {
        match self {
            Category::Stocks => "NVDA, TSLA, AAPL",
            Category::Crypto => "BTC, ETH, SOL",
            Category::Predictions => "Daytona 500, Fed Rate Cut",
            Category::SportsCards => "Wemby RC, Luka Prizm",
            Category::Pokemon => "Base Set Zard",
            Category::Collectibles => "Funko, LEGO",
            Category::Art => "Basquiat, KAWS",
            Category::RealEstate => "Austin TX, Miami",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.id() == wanted || c.label().to_lowercase() == wanted)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Progress captions shown while a scan is in flight.
pub const PHASES: [&str; 8] = [
    "Initializing signals",
    "Scanning social layer",
    "Analyzing search velocity",
    "Mapping influence networks",
    "Clustering narratives",
    "Tracking capital flows",
    "Computing momentum",
    "Generating report",
];

/// Highest phase index the cosmetic counter reaches.
pub const LAST_PHASE: usize = PHASES.len() - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickPick {
    pub asset: &'static str,
    pub category: Category,
    pub hook: &'static str,
}

/// Suggestions on the home view before anything has been scanned.
pub const QUICK_PICKS: [QuickPick; 5] = [
    QuickPick { asset: "NVDA", category: Category::Stocks, hook: "AI chip narrative at fever pitch" },
    QuickPick { asset: "BTC", category: Category::Crypto, hook: "Post-halving momentum cycle" },
    QuickPick { asset: "TSLA", category: Category::Stocks, hook: "Robotaxi narrative building" },
    QuickPick { asset: "SOL", category: Category::Crypto, hook: "DeFi volume surge" },
    QuickPick { asset: "Wemby RC", category: Category::SportsCards, hook: "Generational talent hype" },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!("crypto".parse::<Category>().unwrap(), Category::Crypto);
        assert_eq!("Real Estate".parse::<Category>().unwrap(), Category::RealEstate);
        assert_eq!(" SPORTS_CARDS ".parse::<Category>().unwrap(), Category::SportsCards);
        assert!("bonds".parse::<Category>().is_err());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<_> = Category::ALL.iter().map(|c| c.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn test_last_phase() {
        assert_eq!(LAST_PHASE, 7);
        assert_eq!(PHASES[LAST_PHASE], "Generating report");
    }
}
