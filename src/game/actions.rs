//! Semantic action IDs for the clicker's click targets.
//!
//! Each constant represents a distinct clickable action in the UI.
//! These IDs are registered during render and dispatched via
//! `InputEvent::Click`.

// ── Core actions ────────────────────────────────────────────────
pub const CLICK_COIN: u16 = 0;

// ── Purchases ───────────────────────────────────────────────────
pub const BUY_MULTIPLIER: u16 = 100;
pub const BUY_SOUND_PACK: u16 = 101;

// ── Equip a sound variant (base + unlock tier) ──────────────────
pub const SELECT_SOUND_BASE: u16 = 200;

// ── Session ─────────────────────────────────────────────────────
pub const LOGOUT: u16 = 900;
