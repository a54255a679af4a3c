use tracing::{debug, info, trace};

use crate::domain::Coordinate;
use crate::render::{BusySurface, MapSurface, RadarAxes, RadarSurface, VerdictSurface, VerdictView};

// Terminal rendition of the dashboard: every surface update becomes a
// structured log line.

pub struct LogVerdictSurface;

impl VerdictSurface for LogVerdictSurface {
    fn show_verdict(&self, view: &VerdictView) {
        info!(
            label = view.style.label,
            icon = view.style.icon,
            color = view.style.color,
            score = view.score,
            fraud = view.is_fraud,
            factors = ?view.factors,
            "surface.verdict"
        );
    }

    fn set_progress(&self, value: u8) {
        trace!(value, "surface.verdict_progress");
    }
}

pub struct LogMapSurface;

impl MapSurface for LogMapSurface {
    fn clear_trajectory(&self) {
        debug!("surface.map_clear");
    }

    fn draw_point(&self, at: Coordinate, color: &'static str) {
        info!(lat = at.lat, long = at.long, color, "surface.map_point");
    }

    fn draw_path(&self, from: Coordinate, to: Coordinate, color: &'static str) {
        info!(
            from_lat = from.lat,
            from_long = from.long,
            to_lat = to.lat,
            to_long = to.long,
            color,
            "surface.map_path"
        );
    }

    fn fit_bounds(&self, a: Coordinate, b: Coordinate) {
        debug!(
            a_lat = a.lat,
            a_long = a.long,
            b_lat = b.lat,
            b_long = b.long,
            "surface.map_fit"
        );
    }

    fn center_on(&self, at: Coordinate) {
        debug!(lat = at.lat, long = at.long, "surface.map_center");
    }
}

pub struct LogRadarSurface;

impl RadarSurface for LogRadarSurface {
    fn update(&self, axes: RadarAxes, color: &'static str) {
        info!(
            amount = axes.amount,
            velocity = axes.velocity,
            distance = axes.distance,
            model = axes.model,
            color,
            "surface.radar"
        );
    }
}

pub struct LogBusySurface;

impl BusySurface for LogBusySurface {
    fn set_busy(&self, busy: bool) {
        debug!(busy, "surface.busy");
    }
}
