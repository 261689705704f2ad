use geojson::{Feature, GeoJson, Geometry, Value};

/// A ring of (lon, lat) positions
pub type Ring = Vec<(f64, f64)>;

/// Feature property keys that may carry the province name
const NAME_KEYS: [&str; 2] = ["name", "NAME_1"];

/// One province polygon set, keyed by its reference name
#[derive(Debug, Clone)]
pub struct Province {
    pub name: String,
    /// Exterior and hole rings of every polygon of the province
    pub rings: Vec<Ring>,
    /// (min_lon, min_lat, max_lon, max_lat)
    pub bbox: (f64, f64, f64, f64),
}

/// Province geometry used by the choropleth and as the base map outline
#[derive(Debug, Clone, Default)]
pub struct Geography {
    pub provinces: Vec<Province>,
}

impl Geography {
    /// Build from any GeoJSON document. Features without a recognised name or
    /// without polygon geometry are skipped.
    pub fn from_geojson(geojson: &GeoJson) -> Self {
        let mut provinces = Vec::new();
        match geojson {
            GeoJson::FeatureCollection(fc) => {
                for feature in &fc.features {
                    if let Some(province) = province_from_feature(feature) {
                        provinces.push(province);
                    }
                }
            }
            GeoJson::Feature(feature) => {
                if let Some(province) = province_from_feature(feature) {
                    provinces.push(province);
                }
            }
            GeoJson::Geometry(_) => {}
        }
        Self { provinces }
    }

    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&Province> {
        self.provinces.iter().find(|p| p.name == name)
    }
}

/// Name lookup over the possible property keys, first match wins
pub fn feature_name(feature: &Feature) -> Option<String> {
    let props = feature.properties.as_ref()?;
    NAME_KEYS
        .iter()
        .filter_map(|key| props.get(*key))
        .find_map(|v| v.as_str())
        .map(str::to_string)
}

fn province_from_feature(feature: &Feature) -> Option<Province> {
    let name = feature_name(feature)?;
    let geometry = feature.geometry.as_ref()?;

    let mut rings = Vec::new();
    collect_rings(geometry, &mut rings);
    if rings.is_empty() {
        return None;
    }

    let bbox = rings.iter().flatten().fold(
        (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |(min_lon, min_lat, max_lon, max_lat), &(lon, lat)| {
            (min_lon.min(lon), min_lat.min(lat), max_lon.max(lon), max_lat.max(lat))
        },
    );

    Some(Province { name, rings, bbox })
}

fn collect_rings(geometry: &Geometry, rings: &mut Vec<Ring>) {
    match &geometry.value {
        Value::Polygon(polygon) => {
            for ring in polygon {
                rings.push(ring.iter().map(|c| (c[0], c[1])).collect());
            }
        }
        Value::MultiPolygon(polygons) => {
            for polygon in polygons {
                for ring in polygon {
                    rings.push(ring.iter().map(|c| (c[0], c[1])).collect());
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_rings(g, rings);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"name": "Ankara"},
             "geometry": {"type": "Polygon", "coordinates": [[[32.0, 39.0], [33.0, 39.0], [33.0, 40.0], [32.0, 39.0]]]}},
            {"type": "Feature", "properties": {"NAME_1": "İzmir"},
             "geometry": {"type": "MultiPolygon", "coordinates": [[[[26.0, 38.0], [27.0, 38.0], [27.0, 39.0], [26.0, 38.0]]]]}},
            {"type": "Feature", "properties": {"code": 1},
             "geometry": {"type": "Polygon", "coordinates": [[[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 1.0]]]}},
            {"type": "Feature", "properties": {"name": "Point"},
             "geometry": {"type": "Point", "coordinates": [30.0, 40.0]}}
        ]
    }"#;

    #[test]
    fn test_provinces_from_feature_collection() {
        let geojson: GeoJson = SAMPLE.parse().unwrap();
        let geo = Geography::from_geojson(&geojson);
        let names: Vec<&str> = geo.provinces.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ankara", "İzmir"]);

        let ankara = geo.find("Ankara").unwrap();
        assert_eq!(ankara.bbox, (32.0, 39.0, 33.0, 40.0));
        assert_eq!(ankara.rings.len(), 1);
    }
}
