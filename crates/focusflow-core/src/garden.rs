//! Gamification counters: leaves on the tree and fish in the pond.
//!
//! Both counters only grow. Feeding the fish has no numeric effect; it is
//! gated by a four hour cooldown and needs at least one fish.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const FEED_COOLDOWN_HOURS: i64 = 4;

/// The persisted `gamification` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Garden {
    pub fish: u64,
    pub leaves: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fed: Option<DateTime<Utc>>,
}

/// Which event grows the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafSource {
    /// One leaf per task marked complete.
    #[default]
    Task,
    /// One leaf per completed focus interval.
    Focus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PondLevel {
    TinyPuddle,
    GrowingPond,
    BeautifulLake,
    VastOcean,
    MysticalWaters,
}

impl PondLevel {
    pub fn description(self) -> &'static str {
        match self {
            PondLevel::TinyPuddle => "Tiny Puddle",
            PondLevel::GrowingPond => "Growing Pond",
            PondLevel::BeautifulLake => "Beautiful Lake",
            PondLevel::VastOcean => "Vast Ocean",
            PondLevel::MysticalWaters => "Mystical Waters",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeStage {
    Seed,
    Sprout,
    Sapling,
    Young,
    Mature,
    Ancient,
}

/// Read-only summary for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GardenStatus {
    pub fish: u64,
    pub leaves: u64,
    pub pond: PondLevel,
    pub pond_description: String,
    pub tree: TreeStage,
    pub can_feed: bool,
    pub next_feed_at: Option<DateTime<Utc>>,
}

impl Garden {
    pub fn add_fish(&mut self, n: u64) {
        self.fish += n;
    }

    pub fn add_leaf(&mut self, n: u64) {
        self.leaves += n;
    }

    pub fn next_feed_at(&self) -> Option<DateTime<Utc>> {
        self.last_fed
            .map(|fed| fed + Duration::hours(FEED_COOLDOWN_HOURS))
    }

    pub fn can_feed(&self, now: DateTime<Utc>) -> bool {
        self.fish > 0 && self.next_feed_at().map_or(true, |next| now >= next)
    }

    /// Feed the fish. Returns false, changing nothing, when there are no
    /// fish or the cooldown has not elapsed.
    pub fn feed(&mut self, now: DateTime<Utc>) -> bool {
        if !self.can_feed(now) {
            return false;
        }
        self.last_fed = Some(now);
        true
    }

    pub fn pond_level(&self) -> PondLevel {
        match self.fish {
            0..=4 => PondLevel::TinyPuddle,
            5..=14 => PondLevel::GrowingPond,
            15..=29 => PondLevel::BeautifulLake,
            30..=59 => PondLevel::VastOcean,
            _ => PondLevel::MysticalWaters,
        }
    }

    pub fn tree_stage(&self) -> TreeStage {
        match self.leaves {
            0 => TreeStage::Seed,
            1..=2 => TreeStage::Sprout,
            3..=7 => TreeStage::Sapling,
            8..=19 => TreeStage::Young,
            20..=39 => TreeStage::Mature,
            _ => TreeStage::Ancient,
        }
    }

    pub fn status(&self, now: DateTime<Utc>) -> GardenStatus {
        let pond = self.pond_level();
        GardenStatus {
            fish: self.fish,
            leaves: self.leaves,
            pond,
            pond_description: pond.description().to_string(),
            tree: self.tree_stage(),
            can_feed: self.can_feed(now),
            next_feed_at: self.next_feed_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cannot_feed_an_empty_pond() {
        let mut garden = Garden::default();
        assert!(!garden.feed(Utc::now()));
        assert!(garden.last_fed.is_none());
    }

    #[test]
    fn second_feed_within_cooldown_is_ignored() {
        let mut garden = Garden::default();
        garden.add_fish(1);
        let t0 = Utc::now();
        assert!(garden.feed(t0));

        let before = garden.clone();
        assert!(!garden.feed(t0 + Duration::hours(3) + Duration::minutes(59)));
        assert_eq!(garden, before);

        assert!(garden.feed(t0 + Duration::hours(4)));
        assert_eq!(garden.last_fed, Some(t0 + Duration::hours(4)));
        assert_eq!(garden.fish, 1);
    }

    #[test]
    fn levels_follow_thresholds() {
        let mut garden = Garden::default();
        assert_eq!(garden.pond_level(), PondLevel::TinyPuddle);
        assert_eq!(garden.tree_stage(), TreeStage::Seed);
        garden.add_fish(15);
        garden.add_leaf(8);
        assert_eq!(garden.pond_level(), PondLevel::BeautifulLake);
        assert_eq!(garden.tree_stage(), TreeStage::Young);
        garden.add_fish(45);
        garden.add_leaf(32);
        assert_eq!(garden.pond_level(), PondLevel::MysticalWaters);
        assert_eq!(garden.tree_stage(), TreeStage::Ancient);
    }

    #[test]
    fn partial_documents_load() {
        let garden: Garden = serde_json::from_str(r#"{"leaves":3}"#).unwrap();
        assert_eq!(garden.fish, 0);
        assert_eq!(garden.leaves, 3);
        assert!(garden.last_fed.is_none());
    }
}
