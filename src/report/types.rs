use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A heat report as returned by the model, normalized so that every field is
/// optional. Wrongly-typed fields read as absent rather than failing the
/// whole report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default, deserialize_with = "lenient::text")]
    pub asset: Option<String>,
    /// Display name; compare sides use it instead of `asset`.
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub heat_index: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub heat_label: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub sentiment: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub trend_direction: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub one_liner: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub narrative_summary: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub key_narrative: Option<String>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub confidence: Option<Confidence>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub regime: Option<Regime>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub primary_driver: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub supporting_signals: Vec<Evidence>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub contradictions: Vec<Evidence>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub price_lag: Option<PriceLag>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub timeline: Vec<TimelinePoint>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub narrative_arc: Vec<ArcEvent>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub signals: Option<Signals>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub twitter_intel: Option<TwitterIntel>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub betting_edge: Option<BettingEdge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    #[serde(default, deserialize_with = "lenient::number")]
    pub score_0_100: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Regime {
    #[serde(default, deserialize_with = "lenient::text")]
    pub trend: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub volatility: Option<String>,
}

/// A supporting signal or a contradiction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(default, deserialize_with = "lenient::text")]
    pub signal: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub evidence: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceLag {
    #[serde(default, deserialize_with = "lenient::text")]
    pub avg_lag_hours: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub confidence: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub pattern: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub current_signal: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    #[serde(default, deserialize_with = "lenient::text")]
    pub period: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub heat: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArcEvent {
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub heat_shift: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub event: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Social,
    Search,
    Influence,
    News,
    Flow,
    Momentum,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Social,
        Dimension::Search,
        Dimension::Influence,
        Dimension::News,
        Dimension::Flow,
        Dimension::Momentum,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Social => "Social",
            Dimension::Search => "Search",
            Dimension::Influence => "Influence",
            Dimension::News => "News",
            Dimension::Flow => "Flow",
            Dimension::Momentum => "Momentum",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    #[serde(default, deserialize_with = "lenient::number")]
    pub social: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub search: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub influence: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub news: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub flow: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub momentum: Option<f64>,
}

impl Signals {
    pub fn get(&self, dim: Dimension) -> Option<f64> {
        match dim {
            Dimension::Social => self.social,
            Dimension::Search => self.search,
            Dimension::Influence => self.influence,
            Dimension::News => self.news,
            Dimension::Flow => self.flow,
            Dimension::Momentum => self.momentum,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TwitterIntel {
    #[serde(default, deserialize_with = "lenient::text")]
    pub volume_level: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub estimated_mentions_24h: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub platform_sentiment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BettingEdge {
    #[serde(default, deserialize_with = "lenient::number")]
    pub edge_rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub reasoning: Option<String>,
}

impl Report {
    /// Normalize a model payload. Anything that is not an object yields an
    /// empty report.
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    /// Signal strength for one dimension; absent reads as zero.
    pub fn signal(&self, dim: Dimension) -> f64 {
        self.signals
            .as_ref()
            .and_then(|s| s.get(dim))
            .unwrap_or(0.0)
    }

    /// `one_liner`, falling back to `narrative_summary`.
    pub fn summary(&self) -> Option<&str> {
        self.one_liner
            .as_deref()
            .or(self.narrative_summary.as_deref())
    }

    /// `name` for compare sides, `asset` otherwise.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.asset.as_deref())
    }

    pub fn confidence_score(&self) -> f64 {
        self.confidence
            .as_ref()
            .and_then(|c| c.score_0_100)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompareReport {
    #[serde(default, deserialize_with = "lenient::object")]
    pub asset_a: Option<Report>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub asset_b: Option<Report>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub narrative_flow: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub alpha_signal: Option<String>,
}

impl CompareReport {
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

/// Field deserializers that never fail: a value of the wrong shape is
/// treated as absent.
mod lenient {
    use super::*;

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
            _ => None,
        })
    }

    pub fn object<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(d)? {
            v @ Value::Object(_) => serde_json::from_value(v).ok(),
            _ => None,
        })
    }

    pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_report() {
        let report = Report::from_value(&json!({
            "asset": "BTC",
            "heat_index": 91,
            "heat_label": "EUPHORIC"
        }));

        assert_eq!(report.asset.as_deref(), Some("BTC"));
        assert_eq!(report.heat_index, Some(91.0));
        assert_eq!(report.heat_label.as_deref(), Some("EUPHORIC"));
        assert!(report.price_lag.is_none());
        assert!(report.supporting_signals.is_empty());
        assert_eq!(report.signal(Dimension::Flow), 0.0);
    }

    #[test]
    fn test_full_report() {
        let report = Report::from_value(&json!({
            "asset": "NVDA",
            "category": "stocks",
            "heat_index": 78,
            "sentiment": "BULLISH",
            "one_liner": "AI capex narrative keeps compounding",
            "confidence": {"score_0_100": 72, "reasoning": "Consistent across sources"},
            "regime": {"trend": "up", "volatility": "high"},
            "supporting_signals": [{"signal": "Search spike", "evidence": "+40% WoW"}],
            "price_lag": {"avg_lag_hours": 36, "confidence": "MEDIUM", "pattern": "Search leads", "current_signal": "LEADING UP"},
            "timeline": [{"period": "W1", "heat": 40}, {"period": "W2", "heat": 78}],
            "narrative_arc": [{"date": "Jan 12 2025", "heat_shift": -8, "source": "news", "event": "Export rules"}],
            "signals": {"social": 80, "search": "65", "news": 70},
            "twitter_intel": {"volume_level": "HIGH", "estimated_mentions_24h": 120000},
            "betting_edge": {"edge_rating": 64, "reasoning": "Priced in partially"}
        }));

        assert_eq!(report.confidence_score(), 72.0);
        assert_eq!(report.regime.as_ref().unwrap().trend.as_deref(), Some("up"));
        assert_eq!(report.price_lag.as_ref().unwrap().avg_lag_hours.as_deref(), Some("36"));
        assert_eq!(report.timeline.len(), 2);
        assert_eq!(report.narrative_arc[0].heat_shift, Some(-8.0));
        assert_eq!(report.signal(Dimension::Search), 65.0);
        assert_eq!(report.signal(Dimension::Momentum), 0.0);
        assert_eq!(
            report.twitter_intel.as_ref().unwrap().estimated_mentions_24h.as_deref(),
            Some("120000")
        );
        assert_eq!(report.summary(), Some("AI capex narrative keeps compounding"));
    }

    #[test]
    fn test_wrong_types_degrade_to_absent() {
        let report = Report::from_value(&json!({
            "asset": ["not", "a", "string"],
            "heat_index": "very hot",
            "confidence": "high",
            "supporting_signals": "none",
            "contradictions": [{"signal": "Insider selling"}, 7, null],
            "signals": [1, 2, 3]
        }));

        assert_eq!(report.asset, None);
        assert_eq!(report.heat_index, None);
        assert_eq!(report.confidence, None);
        assert!(report.supporting_signals.is_empty());
        assert_eq!(report.contradictions.len(), 1);
        assert_eq!(report.signals, None);
    }

    #[test]
    fn test_non_object_is_empty_report() {
        assert_eq!(Report::from_value(&json!([1, 2])), Report::default());
        assert_eq!(Report::from_value(&json!("text")), Report::default());
    }

    #[test]
    fn test_summary_fallback_and_display_name() {
        let report = Report::from_value(&json!({
            "asset": "SOL",
            "one_liner": "",
            "narrative_summary": "DeFi volume surge"
        }));
        assert_eq!(report.summary(), Some("DeFi volume surge"));
        assert_eq!(report.display_name(), Some("SOL"));

        let side = Report::from_value(&json!({"name": "Solana", "asset": "SOL"}));
        assert_eq!(side.display_name(), Some("Solana"));
    }

    #[test]
    fn test_compare_report() {
        let compare = CompareReport::from_value(&json!({
            "asset_a": {"name": "NVDA", "heat_index": 88, "signals": {"social": 90}},
            "asset_b": "missing",
            "narrative_flow": "Attention rotating from TSLA into NVDA",
            "alpha_signal": "Fade TSLA hype"
        }));

        assert_eq!(compare.asset_a.as_ref().unwrap().signal(Dimension::Social), 90.0);
        assert_eq!(compare.asset_b, None);
        assert_eq!(compare.alpha_signal.as_deref(), Some("Fade TSLA hype"));
    }
}
