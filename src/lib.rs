//! Farm boundary selection: tap four points on a map, get the enclosed area
//! in acres, then run a timed analysis sequence before handing off to the
//! results screen.

pub mod area;
pub mod clock;
pub mod collaborators;
pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod export;
pub mod splash;
pub mod timer;

pub use area::{compute_area_acres, geodesic_area_acres};
pub use clock::{Clock, ManualClock, SystemClock};
pub use collaborators::{ConfiguredLocation, LocationProvider, MapSurface, Navigator};
pub use config::Settings;
pub use controller::{
    BoundarySelectionController, FireOutcome, IgnoreReason, PointOutcome, SessionResult,
    SessionState, SessionStatus, Timings,
};
pub use data::{AnalysisStep, BoundarySelection, GeoPoint, SelectedPoint};
pub use error::{BoundaryError, ExportError, LocationError};
