//! Walkable Las Vegas Strip landmarks for realistic tour fixtures.
//!
//! Coordinates sourced from OpenStreetMap; all sit within a few kilometers
//! of each other so every pair is a plausible walk.

use tour_planner::waypoint::Waypoint;

/// (id, lat, lng) from the south end of the Strip to the north.
pub const STRIP_LANDMARKS: &[(&str, f64, f64)] = &[
    ("mandalay-bay", 36.0909, -115.1740),
    ("luxor", 36.0955, -115.1761),
    ("excalibur", 36.0987, -115.1754),
    ("new-york-new-york", 36.1021, -115.1746),
    ("mgm-grand", 36.1023654, -115.1688720),
    ("park-mgm", 36.1023, -115.1768),
    ("hard-rock-cafe", 36.1041592, -115.1722166),
    ("cosmopolitan", 36.1097, -115.1740),
    ("planet-hollywood", 36.1099, -115.1711),
    ("bellagio", 36.1126, -115.1767),
    ("paris-eiffel-tower", 36.1125, -115.1722),
    ("caesars-palace", 36.1162, -115.1745),
    ("linq-high-roller", 36.1177, -115.1682),
    ("mirage", 36.1212, -115.1741),
    ("venetian", 36.1212, -115.1697),
    ("treasure-island", 36.1247, -115.1721),
    ("wynn", 36.1263781, -115.1658180),
    ("encore", 36.1289345, -115.1653620),
    ("fashion-show-mall", 36.1275, -115.1707),
    ("sahara", 36.1420, -115.1570),
    ("stratosphere", 36.1475, -115.1566),
    ("circus-circus", 36.1370, -115.1640),
    ("resorts-world", 36.1340, -115.1680),
    ("flamingo", 36.1160, -115.1700),
    ("harrahs", 36.1195, -115.1710),
    ("tropicana", 36.0995, -115.1700),
];

/// The first `count` landmarks as markers.
pub fn strip_markers(count: usize) -> Vec<Waypoint> {
    STRIP_LANDMARKS
        .iter()
        .take(count)
        .map(|(id, lat, lng)| Waypoint::new(*id, *lat, *lng))
        .collect()
}
