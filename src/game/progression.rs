//! Progression engine — pure derivations over `(currency, upgrades)`.
//!
//! Everything in this module is total and deterministic: stage lookup,
//! theme bands, cost curves, and click power are computed from the current
//! state with no I/O and no error paths. The mutation layer keeps currency
//! non-negative; these functions only read it.

use num_bigint::BigUint;

use super::state::{SoundVariant, Upgrades};

/// The click multiplier cost curve is linear: each level costs 5 more
/// coins than the previous one.
const UPGRADE_COST_STEP: u64 = 5;

/// Cost to unlock the next sound tier, indexed by the current sound-pack
/// level. Out-of-table means maxed.
pub const SOUND_PACK_COSTS: &[u64] = &[120, 600];

/// A named progression tier keyed to a cumulative-currency threshold.
#[derive(Debug, PartialEq, Eq)]
pub struct StageDef {
    pub key: &'static str,
    pub name: &'static str,
    pub threshold: u64,
}

/// Stage table, ordered ascending by threshold. The first threshold is 0
/// so a stage always exists; the last stage has no ceiling.
pub const STAGES: &[StageDef] = &[
    StageDef { key: "bronze", name: "Bronze Beginnings", threshold: 0 },
    StageDef { key: "silver", name: "Silver Steps", threshold: 100 },
    StageDef { key: "gold", name: "Golden Groove", threshold: 1_000 },
    StageDef { key: "emerald", name: "Emerald Energy", threshold: 5_000 },
    StageDef { key: "sapphire", name: "Sapphire Surge", threshold: 10_000 },
    StageDef { key: "ruby", name: "Ruby Rush", threshold: 50_000 },
    StageDef { key: "amethyst", name: "Amethyst Arc", threshold: 100_000 },
    StageDef { key: "obsidian", name: "Obsidian Overdrive", threshold: 500_000 },
    StageDef { key: "neon", name: "Neon Nexus", threshold: 1_000_000 },
];

/// Coarse background treatment, on a deliberately different cadence than
/// the stage table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeBand {
    Noir,
    Mirage,
    Ascension,
}

const MIRAGE_MIN: u64 = 10_000;
const ASCENSION_MIN: u64 = 50_000;

impl ThemeBand {
    pub fn label(&self) -> &'static str {
        match self {
            ThemeBand::Noir => "Noir Parade",
            ThemeBand::Mirage => "Chromatic Mirage",
            ThemeBand::Ascension => "Ascension Flux",
        }
    }
}

/// Coins gained per click: base 1 plus one per multiplier level.
pub fn click_power(upgrades: &Upgrades) -> u64 {
    1 + upgrades.click_multiplier as u64
}

/// Cost of the next click-multiplier level.
pub fn upgrade_cost(upgrades: &Upgrades) -> BigUint {
    BigUint::from(UPGRADE_COST_STEP) * (upgrades.click_multiplier as u64 + 1)
}

/// Cost of the next sound tier, or `None` once every tier is unlocked.
pub fn sound_pack_cost(upgrades: &Upgrades) -> Option<BigUint> {
    SOUND_PACK_COSTS
        .get(upgrades.sound_pack as usize)
        .map(|&c| BigUint::from(c))
}

/// The last stage whose threshold is ≤ `amount`.
pub fn stage_for_currency(amount: &BigUint) -> &'static StageDef {
    let mut current = &STAGES[0];
    for stage in STAGES {
        if *amount >= BigUint::from(stage.threshold) {
            current = stage;
        } else {
            break;
        }
    }
    current
}

/// The stage after `current`, or `None` when `current` is the last one.
pub fn next_stage(current: &StageDef) -> Option<&'static StageDef> {
    let idx = STAGES.iter().position(|s| s.key == current.key)?;
    STAGES.get(idx + 1)
}

/// Three-way classification of the background treatment.
pub fn theme_band(amount: &BigUint) -> ThemeBand {
    if *amount >= BigUint::from(ASCENSION_MIN) {
        ThemeBand::Ascension
    } else if *amount >= BigUint::from(MIRAGE_MIN) {
        ThemeBand::Mirage
    } else {
        ThemeBand::Noir
    }
}

/// Display-only fraction of progress from the current stage toward the
/// next one, in `[0, 1]`. Returns 1.0 on the final stage.
pub fn stage_progress(amount: &BigUint) -> f64 {
    let stage = stage_for_currency(amount);
    let next = match next_stage(stage) {
        Some(n) => n,
        None => return 1.0,
    };
    // `amount` is below the next threshold here, so it fits in u64.
    let amount = u64::try_from(amount).unwrap_or(u64::MAX);
    let range = next.threshold - stage.threshold;
    if range == 0 {
        return 1.0;
    }
    let value = (amount.saturating_sub(stage.threshold)) as f64 / range as f64;
    value.clamp(0.0, 1.0)
}

/// The variant a freshly unlocked tier equips, clamped to the last tier.
pub fn variant_for_tier(tier: u8) -> SoundVariant {
    let idx = (tier as usize).min(SoundVariant::ALL.len() - 1);
    SoundVariant::ALL[idx]
}
