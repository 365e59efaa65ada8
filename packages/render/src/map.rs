//! Leaflet circle-marker map of the busiest intersections.

use crash_dashboard_reports_models::TopIntersections;
use serde::{Deserialize, Serialize};

use crate::html_escape;

/// Map centre, downtown San Jose.
pub const SAN_JOSE_CENTER: [f64; 2] = [37.338_2, -121.886_3];
/// Initial zoom level.
pub const DEFAULT_ZOOM: u8 = 12;
/// Largest marker radius in pixels.
pub const MAX_MARKER_RADIUS: f64 = 15.0;
/// Shown instead of the map when the result carried no coordinates.
pub const MAP_UNAVAILABLE: &str = "Map cannot be displayed due to missing location data";

const MARKER_COLOR: &str = "red";
const MARKER_FILL_OPACITY: f64 = 0.7;
const POPUP_MAX_WIDTH: u32 = 300;

/// One circle marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleMarker {
    /// Marker latitude.
    pub latitude: f64,
    /// Marker longitude.
    pub longitude: f64,
    /// Radius in pixels.
    pub radius: f64,
    /// Stroke and fill colour.
    pub color: String,
    /// Fill opacity.
    pub fill_opacity: f64,
    /// Popup HTML.
    pub popup: String,
    /// Popup width limit in pixels.
    pub popup_max_width: u32,
}

/// Everything a Leaflet client needs to draw the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSpec {
    /// `[latitude, longitude]` of the initial view.
    pub center: [f64; 2],
    /// Initial zoom.
    pub zoom: u8,
    /// Markers, busiest first.
    pub markers: Vec<CircleMarker>,
}

/// Marker radius for a crash count: a tenth of the count, capped at
/// [`MAX_MARKER_RADIUS`].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn marker_radius(crash_count: u64) -> f64 {
    (crash_count as f64 / 10.0).min(MAX_MARKER_RADIUS)
}

/// Builds the intersection map, or `None` when the result had no
/// coordinate columns. Intersections with a null mean coordinate get no
/// marker.
#[must_use]
pub fn intersection_map(data: &TopIntersections) -> Option<MapSpec> {
    if !data.has_coordinates {
        return None;
    }

    let markers = data
        .intersections
        .iter()
        .filter_map(|i| {
            let (latitude, longitude) = i.coordinate()?;
            Some(CircleMarker {
                latitude,
                longitude,
                radius: marker_radius(i.crash_count),
                color: MARKER_COLOR.to_string(),
                fill_opacity: MARKER_FILL_OPACITY,
                popup: format!(
                    "<b>{}</b><br>Crashes: {}",
                    html_escape(&i.label()),
                    i.crash_count
                ),
                popup_max_width: POPUP_MAX_WIDTH,
            })
        })
        .collect();

    Some(MapSpec {
        center: SAN_JOSE_CENTER,
        zoom: DEFAULT_ZOOM,
        markers,
    })
}

#[cfg(test)]
mod tests {
    use crash_dashboard_reports_models::IntersectionCount;

    use super::*;

    fn intersection(a: &str, n: u64, coordinate: Option<(f64, f64)>) -> IntersectionCount {
        IntersectionCount {
            street_a: a.to_string(),
            street_b: "MAIN ST".to_string(),
            crash_count: n,
            latitude: coordinate.map(|c| c.0),
            longitude: coordinate.map(|c| c.1),
        }
    }

    #[test]
    fn radius_scales_with_count_up_to_the_cap() {
        assert!((marker_radius(40) - 4.0).abs() < f64::EPSILON);
        assert!((marker_radius(150) - 15.0).abs() < f64::EPSILON);
        assert!((marker_radius(10_000) - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rows_without_coordinates_get_no_marker() {
        let data = TopIntersections {
            intersections: vec![
                intersection("1ST ST", 80, Some((37.33, -121.89))),
                intersection("2ND ST", 60, None),
            ],
            has_coordinates: true,
        };
        let map = intersection_map(&data).unwrap();

        assert_eq!(map.center, SAN_JOSE_CENTER);
        assert_eq!(map.zoom, 12);
        assert_eq!(map.markers.len(), 1);
        assert_eq!(map.markers[0].popup, "<b>1ST ST &amp; MAIN ST</b><br>Crashes: 80");
        assert_eq!(map.markers[0].color, "red");
    }

    #[test]
    fn missing_coordinate_columns_disable_the_map() {
        let data = TopIntersections {
            intersections: vec![intersection("1ST ST", 80, None)],
            has_coordinates: false,
        };
        assert_eq!(intersection_map(&data), None);
    }
}
