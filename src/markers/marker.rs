use s2::cellid::CellID;
use s2::latlng::LatLng;
use s2::point::Point;

/// A named point tested against every feature covering.
///
/// Markers are immutable; containment labels live in a
/// [`LabelCollector`](super::LabelCollector).
#[derive(Debug, Clone)]
pub struct Marker {
    name: String,
    lat: f64,
    lng: f64,
    cell_id: CellID,
    point: Point,
}

impl Marker {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        let ll = LatLng::from_degrees(lat, lng);
        Self {
            name: name.into(),
            lat,
            lng,
            cell_id: CellID::from(&ll),
            point: Point::from(&ll),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Leaf cell holding the marker.
    pub fn cell_id(&self) -> &CellID {
        &self.cell_id
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn token(&self) -> String {
        self.cell_id.to_token()
    }
}
