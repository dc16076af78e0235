//! Clicker mutations — affordability guards and session-boundary ops.
//!
//! Every purchase follows the same pattern: compute the cost through the
//! progression engine, reject with `false` when the player cannot afford
//! it (state untouched, the UI turns that into feedback), otherwise debit
//! and apply. Currency can never go negative.

use num_bigint::BigUint;

use super::progression::{click_power, sound_pack_cost, upgrade_cost, variant_for_tier};
use super::state::{GameState, Particle, SoundVariant};

/// Advance presentation timers by `delta_ticks` (10 ticks/sec).
pub fn tick(state: &mut GameState, delta_ticks: u32) {
    if delta_ticks == 0 {
        return;
    }
    state.anim_frame = state.anim_frame.wrapping_add(delta_ticks);
    state.click_flash = state.click_flash.saturating_sub(delta_ticks);
    state.purchase_flash = state.purchase_flash.saturating_sub(delta_ticks);
    state.denied_flash = state.denied_flash.saturating_sub(delta_ticks);
    for p in &mut state.particles {
        p.life = p.life.saturating_sub(delta_ticks);
    }
    state.particles.retain(|p| p.life > 0);
}

/// Manual click: add the current click power and spawn a "+N" particle.
/// Returns the amount gained.
pub fn click(state: &mut GameState) -> u64 {
    let power = click_power(&state.upgrades);
    add_currency(state, &BigUint::from(power));
    state.total_clicks += 1;
    state.click_flash = 3;

    let col_offset = (state.next_random() % 13) as i16 - 6;
    let life = 8 + (state.next_random() % 5);
    state.particles.push(Particle {
        text: format!("+{}", power),
        col_offset,
        life,
        max_life: life,
    });
    if state.particles.len() > 20 {
        state.particles.remove(0);
    }
    power
}

/// Credit coins. The amount is unsigned and the sum is arbitrary
/// precision, so this can neither underflow nor truncate.
pub fn add_currency(state: &mut GameState, amount: &BigUint) {
    state.currency += amount;
}

/// Buy one click-multiplier level. `false` and no change when the player
/// cannot afford it.
pub fn buy_upgrade(state: &mut GameState) -> bool {
    let cost = upgrade_cost(&state.upgrades);
    if state.currency < cost {
        state.denied_flash = 7;
        state.add_log("Not enough coins for the multiplier.", false);
        return false;
    }
    state.currency -= cost;
    state.upgrades.click_multiplier += 1;
    state.purchase_flash = 5;
    state.add_log(
        &format!(
            "Multiplier level {} — +{} per click!",
            state.upgrades.click_multiplier,
            click_power(&state.upgrades)
        ),
        true,
    );
    true
}

/// Unlock the next sound tier.
///
/// On success the newly unlocked variant is auto-equipped only when the
/// previously selected one was the previous top tier; a player who
/// deliberately switched back to an older sound keeps it.
pub fn buy_sound_pack(state: &mut GameState) -> bool {
    let cost = match sound_pack_cost(&state.upgrades) {
        Some(c) => c,
        None => return false, // already maxed
    };
    if state.currency < cost {
        state.denied_flash = 7;
        state.add_log("Not enough coins for the next sound.", false);
        return false;
    }

    let was_on_latest =
        state.upgrades.selected_sound == variant_for_tier(state.upgrades.sound_pack);

    state.currency -= cost;
    state.upgrades.sound_pack += 1;
    let unlocked = variant_for_tier(state.upgrades.sound_pack);
    if was_on_latest {
        state.upgrades.selected_sound = unlocked;
    }
    state.purchase_flash = 8;
    state.add_log(&format!("Unlocked {}!", unlocked.name()), true);
    true
}

/// Equip a sound variant. Rejected (no change) unless it is unlocked.
pub fn set_sound_variant(state: &mut GameState, variant: SoundVariant) -> bool {
    if !state.upgrades.is_sound_unlocked(variant) {
        return false;
    }
    state.upgrades.selected_sound = variant;
    true
}

/// Session boundary: wipe progress back to defaults. Called before
/// loading a newly authenticated user's snapshot so a previous user's
/// progress is never shown or saved under the wrong account.
pub fn reset(state: &mut GameState) {
    let owner = state.owner_user_id.take();
    *state = GameState::new();
    state.owner_user_id = owner;
}

pub fn set_owner_user_id(state: &mut GameState, id: Option<String>) {
    state.owner_user_id = id;
}

/// Group a non-negative decimal rendering of `n` with commas
/// (e.g. 1234567 → "1,234,567").
pub fn format_coins(n: &BigUint) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.chars().rev().collect()
}
