use farm_atlas::{BoundarySelection, GeoPoint, MapSurface, SelectedPoint};
use ratatui::layout::Rect as TuiRect;
use ratatui::style::Color;
use ratatui::widgets::canvas::{Canvas, Line, Points};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

/// Default latitude/longitude span of the view, roughly a farm-sized window.
const DEFAULT_SPAN_DEG: f64 = 0.01;

/// Cursor moves this fraction of the span per key press.
const CURSOR_STEPS: f64 = 40.0;

#[derive(Clone, Copy, Debug)]
struct Pan {
    from: GeoPoint,
    to: GeoPoint,
    duration_ms: u64,
    started_ms: Option<u64>,
}

/// Terminal map surface: a lat/lon canvas with a tap cursor.
pub struct MapView {
    center: GeoPoint,
    span_deg: f64,
    cursor: GeoPoint,
    pan: Option<Pan>,
    points: Vec<SelectedPoint>,
    boundary: Option<Vec<(f64, f64)>>,
}

impl MapView {
    pub fn new(center: GeoPoint) -> Self {
        Self {
            center,
            // wide view until the user's location is known
            span_deg: 40.0,
            cursor: center,
            pan: None,
            points: Vec::new(),
            boundary: None,
        }
    }

    pub fn cursor(&self) -> GeoPoint {
        self.cursor
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    /// Advances a running pan. Linear, the camera lands on the target.
    pub fn update(&mut self, now_ms: u64) {
        let Some(pan) = self.pan.as_mut() else { return };
        let started = *pan.started_ms.get_or_insert(now_ms);
        let elapsed = now_ms.saturating_sub(started);
        if pan.duration_ms == 0 || elapsed >= pan.duration_ms {
            self.center = pan.to;
            self.cursor = pan.to;
            self.span_deg = DEFAULT_SPAN_DEG;
            self.pan = None;
            return;
        }
        let t = elapsed as f64 / pan.duration_ms as f64;
        self.center = GeoPoint::new(
            pan.from.latitude + (pan.to.latitude - pan.from.latitude) * t,
            pan.from.longitude + (pan.to.longitude - pan.from.longitude) * t,
        );
        self.cursor = self.center;
        self.span_deg = 40.0 + (DEFAULT_SPAN_DEG - 40.0) * t;
    }

    /// Moves the cursor by whole steps, clamped to the visible window.
    pub fn move_cursor(&mut self, d_lat: i32, d_lon: i32) {
        let step = self.span_deg / CURSOR_STEPS;
        let half = self.span_deg / 2.0;
        let lat = (self.cursor.latitude + d_lat as f64 * step)
            .clamp(self.center.latitude - half, self.center.latitude + half);
        let lon = (self.cursor.longitude + d_lon as f64 * step)
            .clamp(self.center.longitude - half, self.center.longitude + half);
        self.cursor = GeoPoint::new(lat, lon);
    }

    fn x_bounds(&self) -> [f64; 2] {
        let half = self.span_deg / 2.0;
        [self.center.longitude - half, self.center.longitude + half]
    }

    fn y_bounds(&self) -> [f64; 2] {
        let half = self.span_deg / 2.0;
        [self.center.latitude - half, self.center.latitude + half]
    }

    /// Draws the tapped points, the closed boundary and the cursor.
    pub fn render(&self, f: &mut Frame, area: TuiRect, title: &str, boundary_color: Color) {
        let canvas = Canvas::default()
            .block(Block::default().title(title.to_string()).borders(Borders::ALL))
            .x_bounds(self.x_bounds())
            .y_bounds(self.y_bounds())
            .paint(|ctx| {
                // 1) boundary in tap order, closing edge last
                if let Some(ring) = &self.boundary {
                    for window in ring.windows(2) {
                        let (a, b) = (window[0], window[1]);
                        ctx.draw(&Line { x1: a.0, y1: a.1, x2: b.0, y2: b.1, color: boundary_color });
                    }
                    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
                        ctx.draw(&Line { x1: last.0, y1: last.1, x2: first.0, y2: first.1, color: boundary_color });
                    }
                }

                // 2) markers with their labels
                let coords: Vec<(f64, f64)> = self
                    .points
                    .iter()
                    .map(|p| (p.point().longitude, p.point().latitude))
                    .collect();
                ctx.draw(&Points { coords: &coords, color: Color::Yellow });
                for p in &self.points {
                    ctx.print(p.point().longitude, p.point().latitude, p.label());
                }

                // 3) cursor
                ctx.draw(&Points {
                    coords: &[(self.cursor.longitude, self.cursor.latitude)],
                    color: Color::Red,
                });
            });
        f.render_widget(canvas, area);
    }
}

impl MapSurface for MapView {
    fn animate_to(&mut self, center: GeoPoint, duration_ms: u64) {
        self.pan = Some(Pan {
            from: self.center,
            to: center,
            duration_ms,
            started_ms: None,
        });
    }

    fn show_selection(&mut self, selection: &BoundarySelection) {
        self.points = selection.points().to_vec();
        self.boundary = selection.polygon().map(|poly| {
            let mut ring: Vec<(f64, f64)> = poly.exterior().0.iter().map(|c| (c.x, c.y)).collect();
            // drop the repeated closing coordinate, render() closes the ring
            ring.pop();
            ring
        });
    }
}
