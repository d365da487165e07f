use rand::Rng;

/// Capsule rarity tiers, rarest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rarity {
    Mythic,
    Legendary,
    Epic,
    Rare,
    Uncommon,
    Common,
}

/// Fixed draw weights out of [`TOTAL_WEIGHT`].
pub const RARITY_WEIGHTS: [(Rarity, i64); 6] = [
    (Rarity::Mythic, 1),
    (Rarity::Legendary, 3),
    (Rarity::Epic, 8),
    (Rarity::Rare, 15),
    (Rarity::Uncommon, 25),
    (Rarity::Common, 48),
];

pub const TOTAL_WEIGHT: i64 = 100;

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Mythic => "mythic",
            Rarity::Legendary => "legendary",
            Rarity::Epic => "epic",
            Rarity::Rare => "rare",
            Rarity::Uncommon => "uncommon",
            Rarity::Common => "common",
        }
    }
}

/// Map a uniform roll in `[0, TOTAL_WEIGHT)` to the first cumulative bucket
/// it falls into.
pub fn rarity_for_roll(roll: i64) -> Rarity {
    let mut cumulative = 0;
    for (rarity, weight) in RARITY_WEIGHTS {
        cumulative += weight;
        if roll < cumulative {
            return rarity;
        }
    }
    Rarity::Common
}

pub fn draw_rarity(rng: &mut impl Rng) -> Rarity {
    rarity_for_roll(rng.gen_range(0..TOTAL_WEIGHT))
}
