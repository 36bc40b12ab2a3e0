use serde::{Deserialize, Serialize};

/// Maximum number of taps that make up a boundary.
pub const BOUNDARY_POINTS: usize = 4;

/// Region shown before the user's location is known.
pub const INDIA_CENTER: GeoPoint = GeoPoint::new(20.5937, 78.9629);

/// Fallback used when location permission is denied or lookup fails.
pub const MUMBAI_FALLBACK: GeoPoint = GeoPoint::new(19.0760, 72.8777);

/// Plain latitude/longitude pair in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl From<GeoPoint> for geo::Coord<f64> {
    fn from(p: GeoPoint) -> Self {
        geo::Coord { x: p.longitude, y: p.latitude }
    }
}

/// A tapped point with its 1-based tap order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectedPoint {
    point: GeoPoint,
    sequence_index: usize,
}

impl SelectedPoint {
    pub fn point(&self) -> GeoPoint {
        self.point
    }

    pub fn sequence_index(&self) -> usize {
        self.sequence_index
    }

    /// Marker label, e.g. "Point 3".
    pub fn label(&self) -> String {
        format!("Point {}", self.sequence_index)
    }
}

/// Points in tap order, never more than [`BOUNDARY_POINTS`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundarySelection {
    points: Vec<SelectedPoint>,
}

impl BoundarySelection {
    pub fn new() -> Self {
        Self { points: Vec::with_capacity(BOUNDARY_POINTS) }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.points.len() == BOUNDARY_POINTS
    }

    /// Appends a point and returns its sequence index, or `None` once full.
    pub(crate) fn push(&mut self, point: GeoPoint) -> Option<usize> {
        if self.is_complete() {
            return None;
        }
        let sequence_index = self.points.len() + 1;
        self.points.push(SelectedPoint { point, sequence_index });
        Some(sequence_index)
    }

    /// The four corners in tap order once the boundary is complete.
    pub fn corners(&self) -> Option<[GeoPoint; BOUNDARY_POINTS]> {
        match self.points.as_slice() {
            [a, b, c, d] => Some([a.point, b.point, c.point, d.point]),
            _ => None,
        }
    }

    pub fn points(&self) -> &[SelectedPoint] {
        &self.points
    }

    pub fn coordinates(&self) -> Vec<GeoPoint> {
        self.points.iter().map(SelectedPoint::point).collect()
    }

    /// Closed polygon in tap order. No hull reordering, so a crossed
    /// boundary stays crossed.
    pub fn polygon(&self) -> Option<geo::Polygon<f64>> {
        if !self.is_complete() {
            return None;
        }
        let ring: Vec<geo::Coord<f64>> = self.points.iter().map(|p| p.point.into()).collect();
        // geo closes the ring itself
        Some(geo::Polygon::new(geo::LineString::from(ring), vec![]))
    }
}

/// One named stage of the post-selection analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStep {
    pub title: String,
    /// Hex colour, `#RRGGBB`.
    #[serde(default = "default_step_color")]
    pub color: String,
}

fn default_step_color() -> String {
    "#10B981".to_string()
}

impl AnalysisStep {
    pub fn new(title: &str, color: &str) -> Self {
        Self { title: title.to_string(), color: color.to_string() }
    }

    /// Parses `color` into RGB, `None` if malformed.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.color.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some((channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Five-step catalog used when the settings file does not override it.
pub fn default_analysis_steps() -> Vec<AnalysisStep> {
    vec![
        AnalysisStep::new("Analyzing Farm Land", "#10B981"),
        AnalysisStep::new("Analyzing Soil Conditions", "#8B4513"),
        AnalysisStep::new("Fetching Nearby Mandi Prices", "#F59E0B"),
        AnalysisStep::new("Getting Latest Weather Updates", "#3B82F6"),
        AnalysisStep::new("Finalizing Personalized Insights", "#8B5CF6"),
    ]
}
