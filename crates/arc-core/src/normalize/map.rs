//! Map normalization

use serde_json::Value;

use super::{Aliases, DESCRIPTION, Fields, RawRecord};
use crate::model::{GameMap, MapMarker, MapZone, MarkerType, ZonePoint};

const DEFAULT_ZONE_TYPE: &str = "unknown";

const MAP_IMAGE: Aliases = &["image", "image_url", "map_image"];
const THUMBNAIL: Aliases = &["thumbnail", "thumbnail_url"];
const WIDTH: Aliases = &["width"];
const HEIGHT: Aliases = &["height"];
const MARKERS: Aliases = &["markers", "pois", "points"];
const ZONES: Aliases = &["zones", "areas"];
const EXTRACTIONS: Aliases = &["extractions", "extracts", "exits"];

const MARKER_TYPE: Aliases = &["type", "kind", "category"];
const MARKER_ICON: Aliases = &["icon"];
const MARKER_ITEMS: Aliases = &["items", "loot"];
const MARKER_QUESTS: Aliases = &["quests"];
const POSITION: Aliases = &["position", "coords"];
const X: Aliases = &["x", "lng", "lon"];
const Y: Aliases = &["y", "lat"];

const ZONE_TYPE: Aliases = &["type", "kind"];
const BOUNDS: Aliases = &["bounds", "polygon"];
const THREAT: Aliases = &["threat_level", "threat", "danger"];

/// Map one raw record to a [`GameMap`]. Never fails.
pub fn normalize_map(raw: &RawRecord) -> GameMap {
    let fields = Fields::new(raw);

    GameMap {
        id: fields.id(),
        name: fields.name(),
        description: fields.string(DESCRIPTION),
        image_url: fields.string(MAP_IMAGE),
        thumbnail_url: fields.string(THUMBNAIL),
        width: fields.u32(WIDTH),
        height: fields.u32(HEIGHT),
        markers: fields
            .array(MARKERS)
            .iter()
            .filter_map(|v| marker(v, None))
            .collect(),
        zones: fields.array(ZONES).iter().filter_map(zone).collect(),
        extractions: fields
            .array(EXTRACTIONS)
            .iter()
            .filter_map(|v| marker(v, Some(MarkerType::Extraction)))
            .collect(),
    }
}

fn marker(value: &Value, forced_type: Option<MarkerType>) -> Option<MapMarker> {
    let Value::Object(map) = value else {
        return None;
    };
    let fields = Fields::new(map);
    let (x, y) = coordinates(fields);

    let marker_type = forced_type.unwrap_or_else(|| {
        fields
            .string(MARKER_TYPE)
            .and_then(|t| MarkerType::parse(&t))
            .unwrap_or_default()
    });

    Some(MapMarker {
        id: fields.id(),
        name: fields.name(),
        marker_type,
        x,
        y,
        description: fields.string(DESCRIPTION),
        icon: fields.string(MARKER_ICON),
        items: fields.reference_set(MARKER_ITEMS),
        quests: fields.reference_set(MARKER_QUESTS),
    })
}

/// Coordinates from top-level keys, a nested position object, or a
/// `[x, y]` pair. Missing axes default to 0.
fn coordinates(fields: Fields<'_>) -> (f64, f64) {
    let top = (fields.f64(X), fields.f64(Y));
    if let (Some(x), Some(y)) = top {
        return (x, y);
    }

    match fields.lookup(POSITION) {
        Some(Value::Object(pos)) => {
            let pos = Fields::new(pos);
            (
                top.0.or_else(|| pos.f64(X)).unwrap_or(0.0),
                top.1.or_else(|| pos.f64(Y)).unwrap_or(0.0),
            )
        }
        Some(Value::Array(pair)) => {
            let axis = |i: usize| pair.get(i).and_then(super::value_to_f64);
            (
                top.0.or_else(|| axis(0)).unwrap_or(0.0),
                top.1.or_else(|| axis(1)).unwrap_or(0.0),
            )
        }
        _ => (top.0.unwrap_or(0.0), top.1.unwrap_or(0.0)),
    }
}

fn zone(value: &Value) -> Option<MapZone> {
    let Value::Object(map) = value else {
        return None;
    };
    let fields = Fields::new(map);

    Some(MapZone {
        id: fields.id(),
        name: fields.name(),
        zone_type: fields
            .string(ZONE_TYPE)
            .unwrap_or_else(|| DEFAULT_ZONE_TYPE.to_string()),
        bounds: fields.array(BOUNDS).iter().filter_map(zone_point).collect(),
        threat_level: fields.i64(THREAT),
        description: fields.string(DESCRIPTION),
    })
}

fn zone_point(value: &Value) -> Option<ZonePoint> {
    match value {
        Value::Object(map) => {
            let fields = Fields::new(map);
            Some(ZonePoint {
                x: fields.f64(X)?,
                y: fields.f64(Y)?,
            })
        }
        Value::Array(pair) if pair.len() == 2 => Some(ZonePoint {
            x: super::value_to_f64(&pair[0])?,
            y: super::value_to_f64(&pair[1])?,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::record;
    use serde_json::json;

    #[test]
    fn test_map_with_markers() {
        let map = normalize_map(&record(json!({
            "id": "dam",
            "name": "Dam Battlegrounds",
            "width": 4096,
            "pois": [
                {"id": "m1", "name": "Control Tower", "type": "Loot", "x": 10.5, "y": 20, "items": ["fuse"]},
                {"id": "m2", "name": "Odd Thing", "kind": "anomaly", "position": {"x": 1, "y": 2}},
                {"id": "m3", "name": "Grid", "coords": [3, 4], "quests": [{"id": "q1"}]},
                "not a marker"
            ],
            "extracts": [{"id": "e1", "name": "Elevator", "type": "loot", "lat": 7, "lng": 8}],
            "areas": [{"id": "z1", "name": "Flooded", "danger": 3, "polygon": [[0, 0], {"x": 1, "y": 1}, "bad"]}]
        })));

        assert_eq!(map.width, Some(4096));
        assert_eq!(map.markers.len(), 3);

        assert_eq!(map.markers[0].marker_type, MarkerType::Loot);
        assert_eq!((map.markers[0].x, map.markers[0].y), (10.5, 20.0));
        assert!(map.markers[0].items.contains("fuse"));

        assert_eq!(map.markers[1].marker_type, MarkerType::Landmark);
        assert_eq!((map.markers[1].x, map.markers[1].y), (1.0, 2.0));

        assert_eq!((map.markers[2].x, map.markers[2].y), (3.0, 4.0));
        assert!(map.markers[2].quests.contains("q1"));

        assert_eq!(map.extractions.len(), 1);
        assert_eq!(map.extractions[0].marker_type, MarkerType::Extraction);
        assert_eq!((map.extractions[0].x, map.extractions[0].y), (8.0, 7.0));

        assert_eq!(map.zones.len(), 1);
        assert_eq!(map.zones[0].zone_type, "unknown");
        assert_eq!(map.zones[0].threat_level, Some(3));
        assert_eq!(map.zones[0].bounds.len(), 2);
    }

    #[test]
    fn test_marker_without_coordinates() {
        let map = normalize_map(&record(json!({"id": "m", "markers": [{"name": "Somewhere"}]})));
        let marker = &map.markers[0];
        assert_eq!(marker.id, "unknown");
        assert_eq!((marker.x, marker.y), (0.0, 0.0));
    }
}
