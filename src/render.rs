use std::sync::Arc;
use std::time::Duration;

use crate::domain::{AnalysisResult, Coordinate, RiskBand, RiskDetails, TransactionPayload};

/// Counter/bar animation runs for a fixed second, in fixed frames.
pub const ANIMATION_MS: u64 = 1_000;
pub const ANIMATION_STEPS: u32 = 20;

// Radar axis normalization, all clamped to the chart's 0-100 range except
// the model sub-score, which is already on that scale.
const AMOUNT_SCALE: f64 = 20.0;
const VELOCITY_SCALE: f64 = 20.0;
const DISTANCE_DIVISOR: f64 = 10.0;

const SAFE_COLOR: &str = "#2ea043";
const FRAUD_COLOR: &str = "#ff4757";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandStyle {
    pub label: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
}

pub fn band_style(band: RiskBand) -> BandStyle {
    match band {
        RiskBand::Low => BandStyle {
            label: "Low risk",
            color: "#2ea043",
            icon: "shield-checkmark",
        },
        RiskBand::Moderate => BandStyle {
            label: "Moderate risk",
            color: "#ffa900",
            icon: "eye",
        },
        RiskBand::High => BandStyle {
            label: "High risk",
            color: "#da3633",
            icon: "hand-left",
        },
    }
}

/// Maps a backend risk-factor code to display text. Unrecognized codes fall
/// back to the raw text.
pub fn translate_factor(raw: &str) -> String {
    if raw.contains("Impossible Location") {
        return "Card used in two distant places at once".to_string();
    }
    if raw.contains("High Transaction Frequency") {
        return "Transactions arriving faster than a person could make them".to_string();
    }
    if raw.contains("Spending Spike") {
        return "Amount far beyond this card's usual spending".to_string();
    }
    raw.to_string()
}

fn verdict_color(is_fraud: bool) -> &'static str {
    if is_fraud {
        FRAUD_COLOR
    } else {
        SAFE_COLOR
    }
}

// --- animation utilities (pure, unit-testable) ---

/// Linear progress, clamped to [0, 1]. Monotonic in `elapsed_ms`.
pub fn progress(elapsed_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 1.0;
    }
    (elapsed_ms as f64 / duration_ms as f64).min(1.0)
}

/// Counter values for the 0 -> score animation, one per frame, final frame
/// exactly `score`.
pub fn counter_frames(score: u8, steps: u32) -> Vec<u8> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            let p = progress(u64::from(i), u64::from(steps));
            (p * f64::from(score)).floor() as u8
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct VerdictView {
    pub band: RiskBand,
    pub style: BandStyle,
    pub score: u8,
    pub is_fraud: bool,
    /// Translated factor bullets; empty means no list is rendered.
    pub factors: Vec<String>,
}

impl VerdictView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let band = RiskBand::from_score(result.risk_score);
        Self {
            band,
            style: band_style(band),
            score: result.risk_score,
            is_fraud: result.is_fraud,
            factors: result
                .risk_factors
                .iter()
                .map(|f| translate_factor(f))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarAxes {
    pub amount: f64,
    pub velocity: f64,
    pub distance: f64,
    pub model: f64,
}

pub fn radar_axes(details: &RiskDetails, submitted_amount: f64, ml_score: Option<f64>) -> RadarAxes {
    let baseline = if details.avg_spending > 0.0 {
        details.avg_spending
    } else {
        1.0
    };
    RadarAxes {
        amount: ((submitted_amount / baseline) * AMOUNT_SCALE).min(100.0),
        velocity: (details.velocity * VELOCITY_SCALE).min(100.0),
        distance: (details.dist_km / DISTANCE_DIVISOR).min(100.0),
        model: ml_score.unwrap_or(0.0),
    }
}

// --- capability surfaces ---

pub trait VerdictSurface: Send + Sync {
    fn show_verdict(&self, view: &VerdictView);
    /// One animation frame: the eased counter value doubles as the bar fill
    /// percentage.
    fn set_progress(&self, value: u8);
}

pub trait MapSurface: Send + Sync {
    fn clear_trajectory(&self);
    fn draw_point(&self, at: Coordinate, color: &'static str);
    fn draw_path(&self, from: Coordinate, to: Coordinate, color: &'static str);
    fn fit_bounds(&self, a: Coordinate, b: Coordinate);
    fn center_on(&self, at: Coordinate);
}

pub trait RadarSurface: Send + Sync {
    fn update(&self, axes: RadarAxes, color: &'static str);
}

pub trait BusySurface: Send + Sync {
    fn set_busy(&self, busy: bool);
}

/// Fans one applied result out to whichever surfaces exist. Each update is
/// independent: a missing surface or a missing data block skips that update
/// without touching the others.
#[derive(Default, Clone)]
pub struct RenderFanout {
    verdict: Option<Arc<dyn VerdictSurface>>,
    map: Option<Arc<dyn MapSurface>>,
    radar: Option<Arc<dyn RadarSurface>>,
}

impl RenderFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verdict(mut self, surface: Arc<dyn VerdictSurface>) -> Self {
        self.verdict = Some(surface);
        self
    }

    pub fn with_map(mut self, surface: Arc<dyn MapSurface>) -> Self {
        self.map = Some(surface);
        self
    }

    pub fn with_radar(mut self, surface: Arc<dyn RadarSurface>) -> Self {
        self.radar = Some(surface);
        self
    }

    pub fn apply(&self, result: &AnalysisResult, payload: &TransactionPayload) {
        self.apply_verdict(result);
        self.apply_map(result);
        self.apply_radar(result, payload);
    }

    fn apply_verdict(&self, result: &AnalysisResult) {
        let Some(surface) = &self.verdict else {
            return;
        };
        let view = VerdictView::from_result(result);
        surface.show_verdict(&view);

        // Counter runs 0 -> score over ANIMATION_MS on its own task; frames
        // are monotonic so overlapping animations still settle on the latest
        // final value last.
        let surface = Arc::clone(surface);
        let score = result.risk_score;
        tokio::spawn(async move {
            let step = Duration::from_millis(ANIMATION_MS / u64::from(ANIMATION_STEPS));
            for frame in counter_frames(score, ANIMATION_STEPS) {
                surface.set_progress(frame);
                tokio::time::sleep(step).await;
            }
        });
    }

    fn apply_map(&self, result: &AnalysisResult) {
        let Some(surface) = &self.map else {
            return;
        };
        // No trajectory block: leave the surface as it was, do not clear.
        let Some(trajectory) = &result.location_data else {
            return;
        };
        let color = verdict_color(result.is_fraud);
        surface.clear_trajectory();
        surface.draw_point(trajectory.current, color);
        match trajectory.previous {
            Some(previous) => {
                surface.draw_path(previous, trajectory.current, color);
                surface.fit_bounds(previous, trajectory.current);
            }
            None => surface.center_on(trajectory.current),
        }
    }

    fn apply_radar(&self, result: &AnalysisResult, payload: &TransactionPayload) {
        let Some(surface) = &self.radar else {
            return;
        };
        let Some(details) = &result.details else {
            return;
        };
        let axes = radar_axes(details, payload.amount, result.ml_score);
        surface.update(axes, verdict_color(result.is_fraud));
    }
}
