//! Zone membership and nearest-safe-zone resolution.
//!
//! The resolver is pure and stateless: each operation reads only its
//! arguments, performs no I/O, and completes in O(number of zones), so it may
//! be called concurrently without synchronization. The zone collection is
//! supplied by the caller as a consistent snapshot; nothing here persists or
//! mutates it.
//!
//! When overlapping zones contain the same point, the more dangerous
//! classification wins: under-reporting danger is worse than over-reporting
//! it. Within a priority tier the input order of the collection is the
//! tie-break, for both containment and nearest-zone searches.

use crate::geo::{haversine_km, Point};
use crate::zone::{Zone, ZoneCategory};

/// A zone matched by [`nearest_of_category`] together with the great-circle
/// distance from the queried point to its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestZone<'a> {
    pub zone: &'a Zone,
    pub distance_km: f64,
}

/// True iff the point lies within the zone's radius of its center.
///
/// A point exactly on the boundary counts as contained.
pub fn zone_contains(point: Point, zone: &Zone) -> bool {
    haversine_km(point, zone.center()) <= zone.radius_km
}

/// Determine the single active zone for a point, or `None` when no zone
/// contains it.
///
/// Zones are visited in category priority order (high hazard, then medium
/// hazard, then safe); zones of equal priority keep their relative input
/// order. The first containing zone wins. The priority ordering is computed
/// over a local index permutation, leaving the caller's slice untouched.
///
/// An empty collection resolves to `None`.
pub fn resolve_containment<'a>(point: Point, zones: &'a [Zone]) -> Option<&'a Zone> {
    let mut order: Vec<usize> = (0..zones.len()).collect();
    // Stable sort on priority alone; input order is the tie-break.
    order.sort_by_key(|&index| zones[index].category.priority());

    order
        .into_iter()
        .map(|index| &zones[index])
        .find(|zone| zone_contains(point, zone))
}

/// Find the zone of the requested category whose center is nearest to the
/// point.
///
/// Returns `None` when no zone of the category exists; callers must branch on
/// that before reading the distance. Ties on distance keep the zone that
/// appears first in the input collection.
///
/// Used with [`ZoneCategory::Safe`] after [`resolve_containment`] reports a
/// hazardous match, to pick an evacuation target.
pub fn nearest_of_category<'a>(
    point: Point,
    zones: &'a [Zone],
    category: ZoneCategory,
) -> Option<NearestZone<'a>> {
    let mut best: Option<NearestZone<'a>> = None;

    for zone in zones.iter().filter(|zone| zone.category == category) {
        let distance_km = haversine_km(point, zone.center());
        let closer = match &best {
            // Strict comparison keeps the earlier zone on equal distances.
            Some(current) => distance_km < current.distance_km,
            None => true,
        };
        if closer {
            best = Some(NearestZone { zone, distance_km });
        }
    }

    best
}
