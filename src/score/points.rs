use crate::model::{LeaderboardEntry, PointsTable};

/// Points for a finishing position: the table's entry for the position, else
/// its `"default"`, times the competition multiplier. Position 0 (DQ or DNF)
/// earns nothing.
#[must_use]
pub fn points_for_position(position: usize, table: &PointsTable, multiplier: f64) -> Option<f64> {
    if position == 0 {
        return None;
    }
    table.lookup(position).map(|p| f64::from(p) * multiplier)
}

/// Fill in `points` on ranked entries; excluded entries are cleared.
pub fn project_points(entries: &mut [LeaderboardEntry], table: &PointsTable, multiplier: f64) {
    for entry in entries {
        entry.points = points_for_position(entry.position, table, multiplier);
    }
}
