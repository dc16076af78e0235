//! Clicker game state definitions.

use num_bigint::BigUint;
use serde::Serialize;

/// A purchasable click-sound tier.
///
/// The order of `ALL` defines the unlock order; the wire format carries
/// the stable string id, never the position, so display metadata can be
/// reordered without breaking saved games.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundVariant {
    Classic,
    Retro,
    Laser,
}

impl SoundVariant {
    /// All variants in unlock order.
    pub const ALL: &'static [SoundVariant] =
        &[SoundVariant::Classic, SoundVariant::Retro, SoundVariant::Laser];

    /// Stable wire id.
    pub fn id(&self) -> &'static str {
        match self {
            SoundVariant::Classic => "classic",
            SoundVariant::Retro => "retro",
            SoundVariant::Laser => "laser",
        }
    }

    /// Parse a wire id. Unknown ids are `None` (the caller decides the
    /// fallback).
    pub fn from_id(id: &str) -> Option<SoundVariant> {
        SoundVariant::ALL.iter().copied().find(|v| v.id() == id)
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            SoundVariant::Classic => "Classic Pulse",
            SoundVariant::Retro => "Retro Chip",
            SoundVariant::Laser => "Neon Laser",
        }
    }

    /// One-line flavor text.
    pub fn tagline(&self) -> &'static str {
        match self {
            SoundVariant::Classic => "The default click, bright and quick.",
            SoundVariant::Retro => "8-bit notes for arcade vibes.",
            SoundVariant::Laser => "A futuristic burst for the late game.",
        }
    }

    /// Unlock tier: position in `ALL`.
    pub fn tier(&self) -> u8 {
        SoundVariant::ALL
            .iter()
            .position(|v| v == self)
            .unwrap_or(0) as u8
    }
}

pub const N_SOUND_VARIANTS: u8 = SoundVariant::ALL.len() as u8;

/// Upgrade levels as stored per user. Serialized field names match the
/// map the persistence endpoint stores.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Upgrades {
    /// Permanent +1-per-level click power. Unbounded.
    pub click_multiplier: u32,
    /// Highest unlocked sound tier, always in `[0, N_SOUND_VARIANTS - 1]`.
    pub sound_pack: u8,
    /// Currently equipped variant, always within the unlocked set.
    pub selected_sound: SoundVariant,
}

impl Default for Upgrades {
    fn default() -> Self {
        Self {
            click_multiplier: 0,
            sound_pack: 0,
            selected_sound: SoundVariant::Classic,
        }
    }
}

impl Upgrades {
    /// Variants unlocked at the current sound-pack level.
    pub fn unlocked_sounds(&self) -> &'static [SoundVariant] {
        let end = (self.sound_pack as usize + 1).min(SoundVariant::ALL.len());
        &SoundVariant::ALL[..end]
    }

    pub fn is_sound_unlocked(&self, variant: SoundVariant) -> bool {
        variant.tier() <= self.sound_pack
    }

    /// The variant the next purchase would unlock, if any tier is left.
    pub fn next_sound(&self) -> Option<SoundVariant> {
        SoundVariant::ALL.get(self.sound_pack as usize + 1).copied()
    }

    pub fn is_sound_maxed(&self) -> bool {
        self.sound_pack as usize + 1 >= SoundVariant::ALL.len()
    }
}

/// A message log entry shown in the side panel.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

/// A floating "+N" particle rising from the coin button.
#[derive(Clone, Debug)]
pub struct Particle {
    pub text: String,
    /// Column offset from the center of the coin display.
    pub col_offset: i16,
    /// Remaining lifetime in ticks.
    pub life: u32,
    pub max_life: u32,
}

/// Full state of one user's clicker session.
///
/// This is the single in-memory source of truth: the UI reads derived
/// values from it every frame and the autosave protocol snapshots it.
pub struct GameState {
    /// Accumulated coins. Arbitrary precision; never negative.
    pub currency: BigUint,
    pub upgrades: Upgrades,
    /// Binds this state to the authenticated user; saves are refused when
    /// it does not match the active session, so a fast account switch
    /// cannot leak one user's progress into another's save slot.
    pub owner_user_id: Option<String>,
    /// Manual clicks this session (display only, not persisted).
    pub total_clicks: u64,
    /// Message log.
    pub log: Vec<LogEntry>,
    /// Click feedback timer (ticks remaining).
    pub click_flash: u32,
    /// Purchase feedback timer.
    pub purchase_flash: u32,
    /// Feedback timer for a rejected purchase.
    pub denied_flash: u32,
    /// Active floating particles.
    pub particles: Vec<Particle>,
    /// Animation frame counter.
    pub anim_frame: u32,
    /// xorshift state for particle spread.
    pub rng_state: u32,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            currency: BigUint::default(),
            upgrades: Upgrades::default(),
            owner_user_id: None,
            total_clicks: 0,
            log: Vec::new(),
            click_flash: 0,
            purchase_flash: 0,
            denied_flash: 0,
            particles: Vec::new(),
            anim_frame: 0,
            rng_state: 0x2545_F491,
        }
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > 50 {
            self.log.remove(0);
        }
    }

    /// xorshift32. Deterministic and good enough for cosmetic jitter.
    pub fn next_random(&mut self) -> u32 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng_state = x;
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_defaults() {
        let state = GameState::new();
        assert_eq!(state.currency, BigUint::default());
        assert_eq!(state.upgrades, Upgrades::default());
        assert!(state.owner_user_id.is_none());
        assert_eq!(state.upgrades.selected_sound, SoundVariant::Classic);
    }

    #[test]
    fn variant_ids_round_trip() {
        for v in SoundVariant::ALL {
            assert_eq!(SoundVariant::from_id(v.id()), Some(*v));
        }
        assert_eq!(SoundVariant::from_id("dubstep"), None);
    }

    #[test]
    fn variant_tiers_follow_declaration_order() {
        assert_eq!(SoundVariant::Classic.tier(), 0);
        assert_eq!(SoundVariant::Retro.tier(), 1);
        assert_eq!(SoundVariant::Laser.tier(), 2);
    }

    #[test]
    fn unlocked_sounds_grow_with_level() {
        let mut u = Upgrades::default();
        assert_eq!(u.unlocked_sounds(), &[SoundVariant::Classic]);
        assert!(!u.is_sound_unlocked(SoundVariant::Retro));

        u.sound_pack = 1;
        assert_eq!(
            u.unlocked_sounds(),
            &[SoundVariant::Classic, SoundVariant::Retro]
        );
        assert_eq!(u.next_sound(), Some(SoundVariant::Laser));
        assert!(!u.is_sound_maxed());

        u.sound_pack = 2;
        assert_eq!(u.unlocked_sounds(), SoundVariant::ALL);
        assert_eq!(u.next_sound(), None);
        assert!(u.is_sound_maxed());
    }

    #[test]
    fn upgrades_serialize_with_wire_names() {
        let u = Upgrades {
            click_multiplier: 3,
            sound_pack: 1,
            selected_sound: SoundVariant::Retro,
        };
        let json = serde_json::to_value(&u).unwrap();
        assert_eq!(json["clickMultiplier"], 3);
        assert_eq!(json["soundPack"], 1);
        assert_eq!(json["selectedSound"], "retro");
    }

    #[test]
    fn log_truncation() {
        let mut state = GameState::new();
        for i in 0..60 {
            state.add_log(&format!("msg {}", i), false);
        }
        assert!(state.log.len() <= 50);
    }

    #[test]
    fn next_random_varies() {
        let mut state = GameState::new();
        let a = state.next_random();
        let b = state.next_random();
        assert_ne!(a, b);
    }
}
