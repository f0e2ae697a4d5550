//! Spatial index over the distinct grid points of a measurement dataset.

use crate::types::lat_lon::LatLon;
use haversine::{distance, Location as HaversineLocation, Units};
use ordered_float::OrderedFloat;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// How many R-tree neighbours are re-ranked by haversine distance.
const CANDIDATE_LIMIT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GridPoint {
    pub id: usize,
    pub latitude: f64,
    pub longitude: f64,
}

impl RTreeObject for GridPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.latitude, self.longitude])
    }
}

/// Squared Euclidean distance in degrees. Good enough to rank neighbours,
/// the haversine distance decides the cut-off.
impl PointDistance for GridPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.latitude - point[0];
        let dy = self.longitude - point[1];
        dx * dx + dy * dy
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GridLocator {
    rtree: RTree<GridPoint>,
}

impl GridLocator {
    pub fn new(points: Vec<GridPoint>) -> Self {
        Self {
            rtree: RTree::bulk_load(points),
        }
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    /// The grid point closest to `target`, with its distance in km, if one lies within `max_distance_km`.
    pub fn nearest(&self, target: LatLon, max_distance_km: f64) -> Option<(GridPoint, f64)> {
        let LatLon(latitude, longitude) = target;
        self.rtree
            .nearest_neighbor_iter(&[latitude, longitude])
            .take(CANDIDATE_LIMIT)
            .map(|point| {
                let dist_km = distance(
                    HaversineLocation {
                        latitude,
                        longitude,
                    },
                    HaversineLocation {
                        latitude: point.latitude,
                        longitude: point.longitude,
                    },
                    Units::Kilometers,
                );
                (*point, dist_km)
            })
            .filter(|(_, dist_km)| *dist_km <= max_distance_km)
            .min_by_key(|(point, dist_km)| (OrderedFloat(*dist_km), point.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator() -> GridLocator {
        GridLocator::new(vec![
            GridPoint { id: 0, latitude: 46.0, longitude: 14.5 },
            GridPoint { id: 1, latitude: 46.5, longitude: 15.5 },
            GridPoint { id: 2, latitude: 45.5, longitude: 13.75 },
        ])
    }

    #[test]
    fn finds_closest_point() {
        let (point, dist_km) = locator().nearest(LatLon(46.05, 14.51), 50.0).unwrap();
        assert_eq!(point.id, 0);
        assert!(dist_km < 10.0);
    }

    #[test]
    fn respects_distance_limit() {
        assert!(locator().nearest(LatLon(40.0, 10.0), 50.0).is_none());
        assert_eq!(locator().len(), 3);
    }
}
