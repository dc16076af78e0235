//! Snapshot encode/decode for the per-user persistence record.
//!
//! The endpoint stores two opaque strings per user: the currency as a
//! decimal string and the upgrades as a serialized JSON map. Every save
//! transmits the full snapshot and the server applies last-write-wins,
//! so duplicate or out-of-order arrivals are harmless.
//!
//! Loading is fail-soft: a malformed currency string degrades to zero, a
//! malformed or missing upgrades payload degrades to defaults, and
//! out-of-range levels are clamped. A bad server record must never take
//! the client down.

pub mod scheduler;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::game::progression::variant_for_tier;
use crate::game::state::{GameState, SoundVariant, Upgrades, N_SOUND_VARIANTS};

/// Wire form of a saved game, exactly as the persistence endpoint
/// returns and accepts it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Currency as a decimal string (arbitrary precision survives JSON).
    pub currency: String,
    /// Upgrades as a JSON-encoded map string.
    #[serde(default)]
    pub upgrades: String,
}

/// Tolerant reading of the upgrades map: unknown fields are ignored,
/// missing fields default, and numeric fields accept any width before
/// clamping.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct UpgradesWire {
    click_multiplier: u64,
    sound_pack: u64,
    selected_sound: Option<String>,
}

/// Capture the persistable part of the state. Presentation bookkeeping
/// (log, flashes, particles) is deliberately not part of the record.
pub fn extract_snapshot(state: &GameState) -> Snapshot {
    Snapshot {
        currency: state.currency.to_string(),
        // The map itself is JSON of plain levels and ids; serialization
        // of these fields cannot fail.
        upgrades: serde_json::to_string(&state.upgrades)
            .unwrap_or_else(|_| "{}".to_string()),
    }
}

/// Restore a remote snapshot into `state`, clamping into valid ranges.
pub fn apply_snapshot(state: &mut GameState, snapshot: &Snapshot) {
    state.currency = parse_currency(&snapshot.currency);
    state.upgrades = parse_upgrades(&snapshot.upgrades);
}

fn parse_currency(s: &str) -> BigUint {
    match s.trim().parse::<BigUint>() {
        Ok(n) => n,
        Err(_) => {
            warn(&format!("discarding malformed saved currency {:?}", s));
            BigUint::default()
        }
    }
}

fn parse_upgrades(s: &str) -> Upgrades {
    let wire: UpgradesWire = if s.trim().is_empty() {
        UpgradesWire::default()
    } else {
        match serde_json::from_str(s) {
            Ok(w) => w,
            Err(e) => {
                warn(&format!("discarding malformed saved upgrades: {}", e));
                UpgradesWire::default()
            }
        }
    };

    let sound_pack = wire.sound_pack.min(N_SOUND_VARIANTS as u64 - 1) as u8;

    // An unknown or locked selection falls back to the highest unlocked
    // variant rather than failing the load.
    let selected = wire
        .selected_sound
        .as_deref()
        .and_then(SoundVariant::from_id)
        .filter(|v| v.tier() <= sound_pack)
        .unwrap_or_else(|| variant_for_tier(sound_pack));

    Upgrades {
        click_multiplier: wire.click_multiplier.min(u32::MAX as u64) as u32,
        sound_pack,
        selected_sound: selected,
    }
}

fn warn(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&msg.into());
    #[cfg(not(target_arch = "wasm32"))]
    let _ = msg;
}
