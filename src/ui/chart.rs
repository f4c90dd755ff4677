//! Energy chart drawn with the ImGui window draw list.
//!
//! Axes plus three monotone-smoothed series (kinetic, potential, total). The
//! scale and curve maths are plain functions so they can be tested without an
//! ImGui context.

use crate::scene::palette::{self, hex};
use crate::state::{EnergyDataPoint, EnergyHistory};

pub const CHART_WIDTH: f32 = 300.0;
pub const CHART_HEIGHT: f32 = 200.0;
pub const MARGIN_TOP: f32 = 20.0;
pub const MARGIN_RIGHT: f32 = 20.0;
pub const MARGIN_BOTTOM: f32 = 40.0;
pub const MARGIN_LEFT: f32 = 50.0;
pub const TICK_COUNT: usize = 5;

const AXIS: [f32; 4] = hex(0x4b5563);
const TICK_LABEL: [f32; 4] = hex(0x9ca3af);
const LEGEND_LABEL: [f32; 4] = hex(0xe5e7eb);
const SAMPLES_PER_SEGMENT: usize = 8;

/// Maps `domain` linearly onto `range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f32, f32),
    pub range: (f32, f32),
}

impl LinearScale {
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, value: f32) -> f32 {
        let span = self.domain.1 - self.domain.0;
        if span.abs() < f32::EPSILON {
            return self.range.0;
        }
        let t = (value - self.domain.0) / span;
        self.range.0 + t * (self.range.1 - self.range.0)
    }

    /// Round-number ticks inside the domain, roughly `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f32> {
        let (lo, hi) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };
        let step = tick_step(lo, hi, count);
        if step <= 0.0 || !step.is_finite() {
            return vec![lo];
        }
        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        (first..=last).map(|i| i as f32 * step).collect()
    }
}

fn tick_step(lo: f32, hi: f32, count: usize) -> f32 {
    let raw = (hi - lo) / count.max(1) as f32;
    if raw <= 0.0 {
        return 0.0;
    }
    let power = 10f32.powf(raw.log10().floor());
    let error = raw / power;
    let factor = if error >= 50f32.sqrt() {
        10.0
    } else if error >= 10f32.sqrt() {
        5.0
    } else if error >= 2f32.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * power
}

/// Value axis domain covering every series and zero, with 20% headroom
/// above (and below, when energies go negative).
pub fn y_domain(points: &[EnergyDataPoint]) -> (f32, f32) {
    let values = points
        .iter()
        .flat_map(|p| [p.kinetic_energy, p.potential_energy, p.total_energy]);
    let (lo, hi) = values.fold((0.0f32, 0.0f32), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if hi - lo < f32::EPSILON {
        return (lo, lo + 10.0);
    }
    let pad = (hi - lo) * 0.2;
    let lo = if lo < 0.0 { lo - pad } else { lo };
    (lo, hi + pad)
}

/// Samples a monotone cubic (Fritsch-Carlson) through `points`, which must be
/// sorted by x. The curve never overshoots between neighbouring points.
pub fn monotone_x(points: &[[f32; 2]], samples_per_segment: usize) -> Vec<[f32; 2]> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let tangents = monotone_tangents(points);
    let samples = samples_per_segment.max(1);
    let mut curve = Vec::with_capacity((points.len() - 1) * samples + 1);
    curve.push(points[0]);

    for i in 0..points.len() - 1 {
        let [x0, y0] = points[i];
        let [x1, y1] = points[i + 1];
        let h = x1 - x0;
        let (m0, m1) = (tangents[i], tangents[i + 1]);
        for step in 1..=samples {
            let t = step as f32 / samples as f32;
            let t2 = t * t;
            let t3 = t2 * t;
            let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
            let h10 = t3 - 2.0 * t2 + t;
            let h01 = -2.0 * t3 + 3.0 * t2;
            let h11 = t3 - t2;
            curve.push([
                x0 + t * h,
                h00 * y0 + h10 * h * m0 + h01 * y1 + h11 * h * m1,
            ]);
        }
    }
    curve
}

fn monotone_tangents(points: &[[f32; 2]]) -> Vec<f32> {
    let n = points.len();
    let secants: Vec<f32> = points
        .windows(2)
        .map(|pair| {
            let h = pair[1][0] - pair[0][0];
            if h.abs() < f32::EPSILON {
                0.0
            } else {
                (pair[1][1] - pair[0][1]) / h
            }
        })
        .collect();

    let mut tangents = vec![0.0; n];
    for i in 1..n - 1 {
        let (s0, s1) = (secants[i - 1], secants[i]);
        let h0 = points[i][0] - points[i - 1][0];
        let h1 = points[i + 1][0] - points[i][0];
        let p = if h0 + h1 > 0.0 {
            (s0 * h1 + s1 * h0) / (h0 + h1)
        } else {
            0.0
        };
        tangents[i] = (sign(s0) + sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
    }
    tangents[0] = endpoint_tangent(secants[0], tangents[1]);
    tangents[n - 1] = endpoint_tangent(secants[n - 2], tangents[n - 2]);
    tangents
}

fn endpoint_tangent(secant: f32, neighbour: f32) -> f32 {
    (3.0 * secant - neighbour) / 2.0
}

fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Draws the chart at the cursor. Nothing is drawn until two samples exist.
pub fn energy_chart(ui: &imgui::Ui, history: &EnergyHistory) {
    ui.text("System Energy");
    ui.separator();

    let points: Vec<EnergyDataPoint> = history.iter().copied().collect();
    if points.len() < 2 {
        return;
    }

    let origin = ui.cursor_screen_pos();
    let left = origin[0] + MARGIN_LEFT;
    let top = origin[1] + MARGIN_TOP;
    let right = origin[0] + CHART_WIDTH - MARGIN_RIGHT;
    let bottom = origin[1] + CHART_HEIGHT - MARGIN_BOTTOM;

    let t0 = points[0].time;
    let elapsed = |p: &EnergyDataPoint| (p.time - t0) as f32;
    let x = LinearScale::new((0.0, elapsed(&points[points.len() - 1])), (left, right));
    let y = LinearScale::new(y_domain(&points), (bottom, top));

    let draw_list = ui.get_window_draw_list();

    draw_list.add_line([left, bottom], [right, bottom], AXIS).build();
    draw_list.add_line([left, top], [left, bottom], AXIS).build();

    for tick in x.ticks(TICK_COUNT) {
        let px = x.map(tick);
        draw_list.add_line([px, bottom], [px, bottom + 4.0], AXIS).build();
        draw_list.add_text([px - 8.0, bottom + 6.0], TICK_LABEL, format!("{tick:.0}s"));
    }
    for tick in y.ticks(TICK_COUNT) {
        let py = y.map(tick);
        draw_list.add_line([left - 4.0, py], [left, py], AXIS).build();
        draw_list.add_text([origin[0] + 2.0, py - 7.0], TICK_LABEL, format!("{tick:.0}"));
    }

    let series: [(&str, [f32; 4], fn(&EnergyDataPoint) -> f32); 3] = [
        ("Kinetic", palette::KINETIC, |p| p.kinetic_energy),
        ("Potential", palette::POTENTIAL, |p| p.potential_energy),
        ("Total", palette::TOTAL, |p| p.total_energy),
    ];

    for (_, color, value) in series.iter() {
        let screen: Vec<[f32; 2]> = points
            .iter()
            .map(|p| [x.map(elapsed(p)), y.map(value(p))])
            .collect();
        let curve = monotone_x(&screen, SAMPLES_PER_SEGMENT);
        draw_list.add_polyline(curve, *color).thickness(2.0).build();
    }

    let legend_y = bottom + 22.0;
    for (i, (label, color, _)) in series.iter().enumerate() {
        let lx = left + i as f32 * 80.0;
        draw_list
            .add_rect([lx, legend_y], [lx + 12.0, legend_y + 12.0], *color)
            .filled(true)
            .build();
        draw_list.add_text([lx + 18.0, legend_y - 1.0], LEGEND_LABEL, label);
    }

    ui.dummy([CHART_WIDTH, CHART_HEIGHT]);
}
