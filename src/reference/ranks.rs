use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Emerald,
    Diamond,
    Master,
    Grandmaster,
    Challenger,
}

impl Tier {
    /// Master and above have a single division.
    pub fn is_apex(&self) -> bool {
        matches!(self, Tier::Master | Tier::Grandmaster | Tier::Challenger)
    }

    fn next(&self) -> Option<Tier> {
        match self {
            Tier::Iron => Some(Tier::Bronze),
            Tier::Bronze => Some(Tier::Silver),
            Tier::Silver => Some(Tier::Gold),
            Tier::Gold => Some(Tier::Platinum),
            Tier::Platinum => Some(Tier::Emerald),
            Tier::Emerald => Some(Tier::Diamond),
            Tier::Diamond => Some(Tier::Master),
            Tier::Master => Some(Tier::Grandmaster),
            Tier::Grandmaster => Some(Tier::Challenger),
            Tier::Challenger => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Iron => "Iron",
            Tier::Bronze => "Bronze",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Platinum => "Platinum",
            Tier::Emerald => "Emerald",
            Tier::Diamond => "Diamond",
            Tier::Master => "Master",
            Tier::Grandmaster => "Grandmaster",
            Tier::Challenger => "Challenger",
        }
    }
}

/// Declared lowest first so the derived ordering matches ladder order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Division {
    IV,
    III,
    II,
    I,
}

impl Division {
    fn next_up(&self) -> Option<Division> {
        match self {
            Division::IV => Some(Division::III),
            Division::III => Some(Division::II),
            Division::II => Some(Division::I),
            Division::I => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Division::IV => "IV",
            Division::III => "III",
            Division::II => "II",
            Division::I => "I",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank {
    pub tier: Tier,
    pub division: Division,
}

impl Rank {
    pub fn new(tier: Tier, division: Division) -> Self {
        Rank { tier, division }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tier.is_apex() {
            write!(f, "{}", self.tier.label())
        } else {
            write!(f, "{} {}", self.tier.label(), self.division.label())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankThreshold {
    pub rank: Rank,
    pub min_rating: i32,
}

/// Ascending (tier, division) → minimum-rating table. Static ladder data,
/// injected so tests and per-season updates can swap it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankTable {
    thresholds: Vec<RankThreshold>,
}

impl RankTable {
    pub fn builtin() -> Self {
        let mut thresholds = Vec::with_capacity(31);
        let laddered = [
            (Tier::Iron, 0),
            (Tier::Bronze, 400),
            (Tier::Silver, 800),
            (Tier::Gold, 1200),
            (Tier::Platinum, 1600),
            (Tier::Emerald, 2000),
            (Tier::Diamond, 2400),
        ];
        for (tier, base) in laddered {
            for (step, division) in [Division::IV, Division::III, Division::II, Division::I]
                .into_iter()
                .enumerate()
            {
                thresholds.push(RankThreshold {
                    rank: Rank::new(tier, division),
                    min_rating: base + step as i32 * 100,
                });
            }
        }
        for (tier, min_rating) in [
            (Tier::Master, 2800),
            (Tier::Grandmaster, 3000),
            (Tier::Challenger, 3200),
        ] {
            thresholds.push(RankThreshold {
                rank: Rank::new(tier, Division::I),
                min_rating,
            });
        }
        RankTable { thresholds }
    }

    /// Highest rank whose threshold the rating meets. Ratings below the
    /// floor map to the lowest rank.
    pub fn rating_to_rank(&self, rating: i32) -> Rank {
        // A deserialized table may be empty; fall back to the ladder floor.
        let Some(first) = self.thresholds.first() else {
            return Rank::new(Tier::Iron, Division::IV);
        };
        let mut current = first.rank;
        for entry in &self.thresholds {
            if rating >= entry.min_rating {
                current = entry.rank;
            } else {
                break;
            }
        }
        current
    }

    /// Mid-division rating for a rank; `None` for ranks that do not exist
    /// on the ladder (e.g. Master IV).
    pub fn rank_to_rating(&self, rank: Rank) -> Option<i32> {
        self.thresholds
            .iter()
            .find(|entry| entry.rank == rank)
            .map(|entry| entry.min_rating + 50)
    }

    /// League points within the matched division.
    pub fn rating_to_lp(&self, rating: i32) -> i32 {
        let rank = self.rating_to_rank(rating);
        let floor = self
            .thresholds
            .iter()
            .find(|entry| entry.rank == rank)
            .map(|entry| entry.min_rating)
            .unwrap_or(0);
        (rating - floor).clamp(0, 100)
    }

    /// Next step up the ladder; `None` at the top.
    pub fn next_rank(&self, rank: Rank) -> Option<Rank> {
        if let Some(division) = rank.division.next_up() {
            if !rank.tier.is_apex() {
                return Some(Rank::new(rank.tier, division));
            }
        }
        let tier = rank.tier.next()?;
        let division = if tier.is_apex() {
            Division::I
        } else {
            Division::IV
        };
        Some(Rank::new(tier, division))
    }
}

impl Default for RankTable {
    fn default() -> Self {
        RankTable::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_threshold_maps_to_that_rank() {
        let table = RankTable::builtin();
        assert_eq!(
            table.rating_to_rank(1200),
            Rank::new(Tier::Gold, Division::IV)
        );
        assert_eq!(
            table.rating_to_rank(1199),
            Rank::new(Tier::Silver, Division::I)
        );
        assert_eq!(
            table.rating_to_rank(3200),
            Rank::new(Tier::Challenger, Division::I)
        );
    }

    #[test]
    fn ratings_below_floor_map_to_lowest_rank() {
        let table = RankTable::builtin();
        assert_eq!(
            table.rating_to_rank(-250),
            Rank::new(Tier::Iron, Division::IV)
        );
    }

    #[test]
    fn empty_table_maps_everything_to_the_floor() {
        let table: RankTable = serde_json::from_str(r#"{"thresholds":[]}"#).unwrap();
        assert_eq!(
            table.rating_to_rank(1500),
            Rank::new(Tier::Iron, Division::IV)
        );
        assert_eq!(table.rank_to_rating(Rank::new(Tier::Gold, Division::IV)), None);
    }

    #[test]
    fn rank_to_rating_is_mid_division() {
        let table = RankTable::builtin();
        assert_eq!(
            table.rank_to_rating(Rank::new(Tier::Gold, Division::II)),
            Some(1450)
        );
        assert_eq!(table.rank_to_rating(Rank::new(Tier::Master, Division::IV)), None);
    }

    #[test]
    fn next_rank_walks_divisions_then_tiers() {
        let table = RankTable::builtin();
        assert_eq!(
            table.next_rank(Rank::new(Tier::Gold, Division::IV)),
            Some(Rank::new(Tier::Gold, Division::III))
        );
        assert_eq!(
            table.next_rank(Rank::new(Tier::Gold, Division::I)),
            Some(Rank::new(Tier::Platinum, Division::IV))
        );
        assert_eq!(
            table.next_rank(Rank::new(Tier::Diamond, Division::I)),
            Some(Rank::new(Tier::Master, Division::I))
        );
        assert_eq!(table.next_rank(Rank::new(Tier::Challenger, Division::I)), None);
    }

    #[test]
    fn lp_is_clamped_inside_division() {
        let table = RankTable::builtin();
        assert_eq!(table.rating_to_lp(1275), 75);
        assert_eq!(table.rating_to_lp(1200), 0);
        // Challenger has no ceiling above it.
        assert_eq!(table.rating_to_lp(3350), 100);
    }
}
