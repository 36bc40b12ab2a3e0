//! Seams to the host: location lookup, the map surface and navigation.

use crate::controller::SessionResult;
use crate::data::{BoundarySelection, GeoPoint};
use crate::error::LocationError;

pub trait LocationProvider {
    /// Current position of the user.
    fn current_location(&mut self) -> Result<GeoPoint, LocationError>;

    /// Current position, or `fallback` when permission is denied or the
    /// lookup fails. The flag is true when the fallback was used.
    fn initial_center(&mut self, fallback: GeoPoint) -> (GeoPoint, bool) {
        match self.current_location() {
            Ok(point) => (point, false),
            Err(e) => {
                log::warn!("using fallback center: {}", e);
                (fallback, true)
            }
        }
    }
}

/// Location taken from settings. `None` behaves like a denied permission.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLocation {
    point: Option<GeoPoint>,
}

impl ConfiguredLocation {
    pub fn new(point: Option<GeoPoint>) -> Self {
        Self { point }
    }
}

impl LocationProvider for ConfiguredLocation {
    fn current_location(&mut self) -> Result<GeoPoint, LocationError> {
        match self.point {
            Some(p) if p.latitude.is_finite() && p.longitude.is_finite() => Ok(p),
            Some(p) => Err(LocationError::Unavailable(format!(
                "non-finite coordinate {:?}",
                p
            ))),
            None => Err(LocationError::PermissionDenied),
        }
    }
}

pub trait MapSurface {
    /// Pans the camera to `center` over `duration_ms`.
    fn animate_to(&mut self, center: GeoPoint, duration_ms: u64);

    /// Redraws the tapped points and, once complete, the boundary.
    fn show_selection(&mut self, selection: &BoundarySelection);
}

/// Receives the single terminal side effect of a session.
pub trait Navigator {
    fn on_analysis_complete(&mut self, result: &SessionResult);
}

impl<F: FnMut(&SessionResult)> Navigator for F {
    fn on_analysis_complete(&mut self, result: &SessionResult) {
        self(result)
    }
}
