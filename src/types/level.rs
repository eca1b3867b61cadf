/// Activity-point thresholds for each forum level, highest first.
const THRESHOLDS: [(i64, u8); 5] = [(5000, 5), (2000, 4), (500, 3), (100, 2), (10, 1)];

/// Maps accumulated points onto a forum level between 0 and 5.
///
/// Levels are always derived from points at the moment a user record
/// is surfaced; they are never stored, so they cannot drift out of
/// sync with the points balance.
#[must_use]
pub fn level_for(points: i64) -> u8 {
  for (threshold, level) in THRESHOLDS {
    if points >= threshold {
      return level;
    }
  }
  0
}
