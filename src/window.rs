//! which records feed the current view, and what they add up to

use crate::area::Area;
use crate::record::{Category, CategoryGroup, EmotionRecord};

/* ===========================================================
   window selection
   =========================================================== */
/// Records relevant at `depth` under the given regime rules.
///
/// * `Surface` – the whole buried history (`depth >= 0`), since the surface
///   mirrors everything the user has said.
/// * `Underground` – everything within `radius` of the viewer, inclusive.
///   The radius is far larger than the visible band so fog and colour start
///   reacting well before entities come into view.
///
/// `Transition` is resolved by the caller through `area::rules_for`; passed
/// here directly it behaves like `Underground`.
pub fn select_window<'a>(
    records: &'a [EmotionRecord],
    depth: f64,
    area: Area,
    radius: f64,
) -> Vec<&'a EmotionRecord> {
    match area {
        Area::Surface => records.iter().filter(|r| r.is_buried()).collect(),
        Area::Transition | Area::Underground => records
            .iter()
            .filter(|r| (r.depth() - depth).abs() <= radius)
            .collect(),
    }
}

/* ===========================================================
   distribution
   =========================================================== */
/// Strength‑weighted category shares over a window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Distribution {
    shares: [f64; Category::COUNT],
    total: f64,
    pub avg_strength: f64,
    pub count: usize,
}

impl Distribution {
    /// Normalised share of one category; all shares sum to 1 when the
    /// window held any strength, and are all 0 otherwise.
    #[inline]
    pub fn share(&self, category: Category) -> f64 {
        self.shares[category.index()]
    }

    pub fn shares(&self) -> &[f64; Category::COUNT] {
        &self.shares
    }

    /// Sum of the shares of every category in `group`.
    pub fn group_share(&self, group: CategoryGroup) -> f64 {
        Category::ALL
            .into_iter()
            .filter(|c| c.group() == group)
            .map(|c| self.share(c))
            .sum()
    }

    pub fn total_strength(&self) -> f64 {
        self.total
    }

    /// Absolute strength carried by one category.
    pub fn category_strength(&self, category: Category) -> f64 {
        self.share(category) * self.total_strength()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Sum strengths per category and normalise.
pub fn analyze<'a, I>(records: I) -> Distribution
where
    I: IntoIterator<Item = &'a EmotionRecord>,
{
    let mut sums = [0.0f64; Category::COUNT];
    let mut count = 0usize;
    for r in records {
        sums[r.category().index()] += r.strength();
        count += 1;
    }

    let total: f64 = sums.iter().sum();
    let shares = if total > 0.0 {
        sums.map(|s| s / total)
    } else {
        [0.0; Category::COUNT]
    };
    let avg_strength = if count > 0 { total / count as f64 } else { 0.0 };

    Distribution { shares, total, avg_strength, count }
}

#[cfg(test)]
pub(crate) fn distribution_from_shares(
    shares: [f64; Category::COUNT],
    avg_strength: f64,
    count: usize,
) -> Distribution {
    Distribution { shares, total: avg_strength * count as f64, avg_strength, count }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn rec(id: &str, c: Category, s: f64, d: f64) -> EmotionRecord {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        EmotionRecord::new(id, c, s, d, at).unwrap()
    }

    #[test]
    fn underground_window_is_inclusive_radius() {
        let records = vec![
            rec("a", Category::Joy, 0.9, 650.0),
            rec("b", Category::Joy, 0.5, 1400.0),
            rec("c", Category::Peace, 0.5, 1401.0),
            rec("d", Category::Peace, 0.5, -5.0),
        ];
        let ids: Vec<_> = select_window(&records, 600.0, Area::Underground, 800.0)
            .iter()
            .map(|r| r.id())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn surface_window_takes_whole_buried_history() {
        let records = vec![
            rec("deep", Category::Joy, 0.9, 5_000.0),
            rec("ground", Category::Joy, 0.9, 0.0),
            rec("sky", Category::Joy, 0.9, -3.0),
        ];
        let ids: Vec<_> = select_window(&records, -40.0, Area::Surface, 800.0)
            .iter()
            .map(|r| r.id())
            .collect();
        assert_eq!(ids, vec!["deep", "ground"]);
    }

    #[test]
    fn empty_window_is_all_zero() {
        let d = analyze(std::iter::empty());
        assert_eq!(d.count, 0);
        assert_eq!(d.avg_strength, 0.0);
        assert!(d.shares().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn zero_strength_window_is_all_zero_shares() {
        let records = vec![rec("a", Category::Joy, 0.0, 1.0)];
        let d = analyze(&records);
        assert_eq!(d.count, 1);
        assert!(d.shares().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn shares_are_strength_weighted() {
        let records = vec![
            rec("a", Category::Joy, 0.6, 1.0),
            rec("b", Category::Stress, 0.2, 1.0),
            rec("c", Category::Joy, 0.2, 1.0),
        ];
        let d = analyze(&records);
        assert!((d.share(Category::Joy) - 0.8).abs() < 1e-12);
        assert!((d.share(Category::Stress) - 0.2).abs() < 1e-12);
        assert!((d.avg_strength - 1.0 / 3.0).abs() < 1e-12);
        assert!((d.group_share(CategoryGroup::Warm) - 0.8).abs() < 1e-12);
        assert!((d.category_strength(Category::Joy) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn shares_sum_to_one_for_random_windows() {
        let mut rng = StdRng::seed_from_u64(11);
        for round in 0..100 {
            let n = rng.gen_range(1..40);
            let records: Vec<_> = (0..n)
                .map(|i| {
                    let c = Category::ALL[rng.gen_range(0..Category::COUNT)];
                    rec(&format!("{round}-{i}"), c, rng.gen_range(0.01..=1.0), 10.0)
                })
                .collect();
            let d = analyze(&records);
            let sum: f64 = d.shares().iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "sum {sum}");
            assert!(d.shares().iter().all(|&s| s >= 0.0));
        }
    }
}
