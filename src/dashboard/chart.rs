use crate::report::display::{heat_tone, shift_tone, Tone};
use crate::report::types::{ArcEvent, TimelinePoint};

// Chart canvas is 400x140 with the plot area between x 24..376 and y 26..108.
const LEFT: f64 = 24.0;
const WIDTH: f64 = 352.0;
const BASELINE: f64 = 108.0;
const HEIGHT: f64 = 82.0;
const FILL_FLOOR: f64 = 112.0;

const MARKER_START: f64 = 55.0;
const MARKER_STEP: f64 = 105.0;
const MARKER_LIMIT: usize = 3;
const MARKER_DATE_CHARS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    pub heat: f64,
    pub period: String,
}

/// A dashed vertical marker for one narrative-arc event.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcMarker {
    pub x: f64,
    pub label: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatChart {
    pub tone: Tone,
    pub points: Vec<ChartPoint>,
    pub markers: Vec<ArcMarker>,
}

/// Lay out a timeline. `None` when there is nothing to plot. `heat` picks
/// the line colour.
pub fn heat_chart(timeline: &[TimelinePoint], heat: f64, arc: &[ArcEvent]) -> Option<HeatChart> {
    if timeline.is_empty() {
        return None;
    }

    let span = timeline.len().saturating_sub(1);
    let points = timeline
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let value = point.heat.unwrap_or(0.0);
            let x = if span == 0 {
                LEFT
            } else {
                LEFT + (i as f64 / span as f64) * WIDTH
            };
            ChartPoint {
                x,
                y: BASELINE - (value / 100.0) * HEIGHT,
                heat: value,
                period: point.period.clone().unwrap_or_default(),
            }
        })
        .collect();

    let markers = arc
        .iter()
        .take(MARKER_LIMIT)
        .enumerate()
        .map(|(i, event)| ArcMarker {
            x: MARKER_START + i as f64 * MARKER_STEP,
            label: event
                .date
                .as_deref()
                .unwrap_or("")
                .chars()
                .take(MARKER_DATE_CHARS)
                .collect(),
            tone: shift_tone(event.heat_shift.unwrap_or(0.0)),
        })
        .collect();

    Some(HeatChart {
        tone: heat_tone(heat),
        points,
        markers,
    })
}

impl HeatChart {
    /// `M x,y L x,y ...` through every point.
    pub fn line_path(&self) -> String {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}{},{}", if i == 0 { "M" } else { "L" }, p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The line closed down to the floor, for the gradient fill.
    pub fn area_path(&self) -> String {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return String::new();
        };
        format!(
            "{} L{},{} L{},{} Z",
            self.line_path(),
            last.x,
            FILL_FLOOR,
            first.x,
            FILL_FLOOR
        )
    }

    pub fn svg(&self) -> String {
        let colour = self.tone.hex();
        let mut out = String::from(r#"<svg viewBox="0 0 400 140" xmlns="http://www.w3.org/2000/svg">"#);
        out.push_str(&format!(
            r#"<path d="{}" fill="{}" fill-opacity="0.18"/>"#,
            self.area_path(),
            colour
        ));
        out.push_str(&format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="2" stroke-linecap="round"/>"#,
            self.line_path(),
            colour
        ));
        for p in &self.points {
            out.push_str(&format!(r#"<circle cx="{}" cy="{}" r="3" fill="{}"/>"#, p.x, p.y, colour));
        }
        for m in &self.markers {
            out.push_str(&format!(
                r#"<line x1="{x}" y1="22" x2="{x}" y2="{b}" stroke="{c}" stroke-dasharray="3,3" opacity="0.4"/>"#,
                x = m.x,
                b = BASELINE,
                c = m.tone.hex()
            ));
        }
        out.push_str("</svg>");
        out
    }

    /// Heat per point on a 0..=100 scale, for a terminal sparkline.
    pub fn sparkline_data(&self) -> Vec<u64> {
        self.points
            .iter()
            .map(|p| p.heat.clamp(0.0, 100.0).round() as u64)
            .collect()
    }

    pub fn periods(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.period.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline(heats: &[f64]) -> Vec<TimelinePoint> {
        heats
            .iter()
            .enumerate()
            .map(|(i, h)| TimelinePoint {
                period: Some(format!("W{}", i + 1)),
                heat: Some(*h),
            })
            .collect()
    }

    #[test]
    fn test_empty_timeline_has_no_chart() {
        assert!(heat_chart(&[], 80.0, &[]).is_none());
    }

    #[test]
    fn test_point_geometry() {
        let chart = heat_chart(&timeline(&[0.0, 50.0, 100.0]), 91.0, &[]).unwrap();

        let xs: Vec<f64> = chart.points.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = chart.points.iter().map(|p| p.y).collect();
        assert_eq!(xs, [24.0, 200.0, 376.0]);
        assert_eq!(ys, [108.0, 67.0, 26.0]);
        assert_eq!(chart.tone, Tone::Hot);
        assert_eq!(chart.line_path(), "M24,108 L200,67 L376,26");
        assert_eq!(chart.area_path(), "M24,108 L200,67 L376,26 L376,112 L24,112 Z");
    }

    #[test]
    fn test_single_point_sits_at_left_edge() {
        let chart = heat_chart(&timeline(&[50.0]), 50.0, &[]).unwrap();
        assert_eq!(chart.points[0].x, 24.0);
        assert_eq!(chart.points[0].y, 67.0);
    }

    #[test]
    fn test_first_three_arc_events_are_marked() {
        let arc: Vec<ArcEvent> = [12.0, -8.0, 5.0, 20.0]
            .iter()
            .map(|shift| ArcEvent {
                date: Some("Jan 14 2025".into()),
                heat_shift: Some(*shift),
                ..Default::default()
            })
            .collect();
        let chart = heat_chart(&timeline(&[10.0, 20.0]), 20.0, &arc).unwrap();

        assert_eq!(chart.markers.len(), 3);
        assert_eq!(chart.markers[1].x, 160.0);
        assert_eq!(chart.markers[2].x, 265.0);
        assert_eq!(chart.markers[0].label, "Jan 14");
        assert_eq!(chart.markers[0].tone, Tone::Accent);
        assert_eq!(chart.markers[1].tone, Tone::Hot);
    }

    #[test]
    fn test_sparkline() {
        let chart = heat_chart(&timeline(&[0.0, 50.0, 100.0, 150.0]), 60.0, &[]).unwrap();
        assert_eq!(chart.sparkline_data(), [0, 50, 100, 100]);
        assert_eq!(chart.periods(), ["W1", "W2", "W3", "W4"]);
    }
}
