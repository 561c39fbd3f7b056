use ratatui::style::Color;
use std::fmt;

/// Named colours of the dashboard palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Hot,
    Blaze,
    Warm,
    Lime,
    Accent,
    Blue,
    Cool,
    Purple,
    Gold,
    Muted,
}

impl Tone {
    pub fn hex(self) -> &'static str {
        match self {
            Tone::Hot => "#ff3d71",
            Tone::Blaze => "#ff6b35",
            Tone::Warm => "#ffaa00",
            Tone::Lime => "#c8d640",
            Tone::Accent => "#00e5c7",
            Tone::Blue => "#4a8fe7",
            Tone::Cool => "#636e8a",
            Tone::Purple => "#b07ce8",
            Tone::Gold => "#e8e0c7",
            Tone::Muted => "#4a5168",
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Tone::Hot => (255, 61, 113),
            Tone::Blaze => (255, 107, 53),
            Tone::Warm => (255, 170, 0),
            Tone::Lime => (200, 214, 64),
            Tone::Accent => (0, 229, 199),
            Tone::Blue => (74, 143, 231),
            Tone::Cool => (99, 110, 138),
            Tone::Purple => (176, 124, 232),
            Tone::Gold => (232, 224, 199),
            Tone::Muted => (74, 81, 104),
        }
    }

    /// Terminal colour for widgets.
    pub fn color(self) -> Color {
        let (r, g, b) = self.rgb();
        Color::Rgb(r, g, b)
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hex())
    }
}

/// Seven severity buckets, closed at the lower bound.
pub fn heat_tone(heat: f64) -> Tone {
    if heat >= 85.0 {
        Tone::Hot
    } else if heat >= 70.0 {
        Tone::Blaze
    } else if heat >= 55.0 {
        Tone::Warm
    } else if heat >= 40.0 {
        Tone::Lime
    } else if heat >= 25.0 {
        Tone::Accent
    } else if heat >= 12.0 {
        Tone::Blue
    } else {
        Tone::Cool
    }
}

pub fn sentiment_tone(sentiment: Option<&str>) -> Tone {
    match sentiment {
        Some("EUPHORIC" | "BULLISH" | "SURGING") => Tone::Accent,
        Some("BEARISH" | "FADING") => Tone::Hot,
        _ => Tone::Warm,
    }
}

pub fn confidence_tone(score: f64) -> Tone {
    if score >= 80.0 {
        Tone::Accent
    } else if score >= 55.0 {
        Tone::Warm
    } else {
        Tone::Hot
    }
}

pub fn regime_tone(trend: Option<&str>) -> Tone {
    match trend {
        Some("up") => Tone::Accent,
        Some("down") => Tone::Hot,
        _ => Tone::Warm,
    }
}

/// Price-lag "current signal" text such as `LEADING UP` or `DIVERGING DOWN`.
pub fn lag_signal_tone(signal: Option<&str>) -> Tone {
    match signal {
        Some(s) if s.contains("UP") => Tone::Accent,
        Some(s) if s.contains("DOWN") => Tone::Hot,
        _ => Tone::Warm,
    }
}

/// Price-lag confidence such as `HIGH`, `MODERATE` or `LOW`.
pub fn lag_confidence_tone(confidence: Option<&str>) -> Tone {
    match confidence {
        Some("HIGH") => Tone::Accent,
        Some("MODERATE") => Tone::Warm,
        _ => Tone::Cool,
    }
}

pub fn shift_tone(shift: f64) -> Tone {
    if shift > 0.0 {
        Tone::Accent
    } else {
        Tone::Hot
    }
}

/// Edge ratings without a value are shown as middling.
pub fn edge_tone(rating: Option<f64>) -> Tone {
    heat_tone(rating.filter(|r| *r != 0.0).unwrap_or(50.0))
}

/// Integers print without a trailing `.0`.
pub fn format_score(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Narrative-arc shift with an explicit `+` on gains.
pub fn format_shift(shift: f64) -> String {
    if shift > 0.0 {
        format!("+{}", format_score(shift))
    } else {
        format_score(shift)
    }
}
