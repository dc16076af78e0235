//! Coin Clicker — the game screen: input dispatch, tick, and rendering.

pub mod actions;
pub mod logic;
pub mod progression;
pub mod render;
pub mod state;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent};
use crate::save::scheduler::AutosaveScheduler;
use crate::save::Snapshot;

use progression::variant_for_tier;
use state::GameState;

pub struct ClickerGame {
    pub state: GameState,
    scheduler: AutosaveScheduler,
    /// The remote snapshot has not been applied yet; gameplay input is
    /// held off so clicks cannot race the load.
    pub loading: bool,
    /// A scheduler window elapsed; the main loop turns this into a
    /// network save with a snapshot taken at dispatch time.
    pending_save: bool,
    /// The player asked to sign out; the main loop owns the screen
    /// switch and the final save.
    logout_requested: bool,
}

impl ClickerGame {
    pub fn new(owner_user_id: Option<String>) -> Self {
        let mut state = GameState::new();
        logic::set_owner_user_id(&mut state, owner_user_id);
        Self {
            state,
            scheduler: AutosaveScheduler::new(),
            loading: true,
            pending_save: false,
            logout_requested: false,
        }
    }

    /// Apply (or skip, for a fresh account) the remote snapshot and open
    /// the game for input.
    pub fn finish_loading(&mut self, snapshot: Option<&Snapshot>) {
        // Start from defaults so a previous user's progress can never
        // leak through a partially applied load.
        logic::reset(&mut self.state);
        if let Some(snapshot) = snapshot {
            crate::save::apply_snapshot(&mut self.state, snapshot);
        }
        self.loading = false;
        self.state
            .add_log("Welcome back! Every click saves automatically.", true);
        let stage = progression::stage_for_currency(&self.state.currency);
        self.state
            .add_log(&format!("Stage: {}", stage.name), false);
    }

    /// Handle an input event. Returns true if the event was consumed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        if self.loading {
            return false;
        }
        match event {
            InputEvent::Key('c') | InputEvent::Click(actions::CLICK_COIN) => {
                logic::click(&mut self.state);
                self.scheduler.note_change();
                true
            }
            InputEvent::Key('b') | InputEvent::Click(actions::BUY_MULTIPLIER) => {
                if logic::buy_upgrade(&mut self.state) {
                    self.scheduler.note_change();
                }
                true
            }
            InputEvent::Key('s') | InputEvent::Click(actions::BUY_SOUND_PACK) => {
                if logic::buy_sound_pack(&mut self.state) {
                    self.scheduler.note_change();
                }
                true
            }
            InputEvent::Key(c @ '1'..='3') => {
                let tier = *c as u8 - b'1';
                if logic::set_sound_variant(&mut self.state, variant_for_tier(tier)) {
                    self.scheduler.note_change();
                }
                true
            }
            InputEvent::Click(id)
                if (actions::SELECT_SOUND_BASE
                    ..actions::SELECT_SOUND_BASE + state::N_SOUND_VARIANTS as u16)
                    .contains(id) =>
            {
                let tier = (id - actions::SELECT_SOUND_BASE) as u8;
                if logic::set_sound_variant(&mut self.state, variant_for_tier(tier)) {
                    self.scheduler.note_change();
                }
                true
            }
            InputEvent::Key('q') | InputEvent::Click(actions::LOGOUT) => {
                self.logout_requested = true;
                true
            }
            _ => false,
        }
    }

    /// Advance game logic by `delta_ticks` discrete ticks.
    pub fn tick(&mut self, delta_ticks: u32) {
        logic::tick(&mut self.state, delta_ticks);
        if !self.loading && self.scheduler.tick(delta_ticks) {
            self.pending_save = true;
        }
    }

    /// Render the game into the given area.
    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(&self.state, self.loading, f, area, click_state);
    }

    pub fn take_pending_save(&mut self) -> bool {
        std::mem::take(&mut self.pending_save)
    }

    pub fn take_logout_request(&mut self) -> bool {
        std::mem::take(&mut self.logout_requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::scheduler::{DEBOUNCE_TICKS, HEARTBEAT_TICKS};
    use num_bigint::BigUint;
    use super::state::SoundVariant;

    fn ready_game() -> ClickerGame {
        let mut game = ClickerGame::new(Some("u-1".to_string()));
        game.finish_loading(None);
        game
    }

    #[test]
    fn click_via_key_and_target() {
        let mut game = ready_game();
        assert!(game.handle_input(&InputEvent::Key('c')));
        assert!(game.handle_input(&InputEvent::Click(actions::CLICK_COIN)));
        assert_eq!(game.state.currency, BigUint::from(2u32));
        assert_eq!(game.state.total_clicks, 2);
    }

    #[test]
    fn purchase_via_input() {
        let mut game = ready_game();
        logic::add_currency(&mut game.state, &BigUint::from(5u32));
        assert!(game.handle_input(&InputEvent::Click(actions::BUY_MULTIPLIER)));
        assert_eq!(game.state.upgrades.click_multiplier, 1);
    }

    #[test]
    fn equip_sound_via_number_key() {
        let mut game = ready_game();
        game.state.upgrades.sound_pack = 2;
        assert!(game.handle_input(&InputEvent::Key('2')));
        assert_eq!(game.state.upgrades.selected_sound, SoundVariant::Retro);
        assert!(game.handle_input(&InputEvent::Click(actions::SELECT_SOUND_BASE)));
        assert_eq!(game.state.upgrades.selected_sound, SoundVariant::Classic);
    }

    #[test]
    fn locked_sound_click_is_consumed_but_inert() {
        let mut game = ready_game();
        assert!(game.handle_input(&InputEvent::Click(actions::SELECT_SOUND_BASE + 2)));
        assert_eq!(game.state.upgrades.selected_sound, SoundVariant::Classic);
    }

    #[test]
    fn input_blocked_while_loading() {
        let mut game = ClickerGame::new(Some("u-1".to_string()));
        assert!(!game.handle_input(&InputEvent::Key('c')));
        assert_eq!(game.state.currency, BigUint::default());
    }

    #[test]
    fn finish_loading_applies_snapshot() {
        let mut game = ClickerGame::new(Some("u-1".to_string()));
        let snap = Snapshot {
            currency: "250".to_string(),
            upgrades: r#"{"clickMultiplier":2}"#.to_string(),
        };
        game.finish_loading(Some(&snap));
        assert!(!game.loading);
        assert_eq!(game.state.currency, BigUint::from(250u32));
        assert_eq!(game.state.upgrades.click_multiplier, 2);
    }

    #[test]
    fn fresh_account_loads_defaults() {
        let mut game = ClickerGame::new(Some("u-1".to_string()));
        game.finish_loading(None);
        assert!(!game.loading);
        assert_eq!(game.state.currency, BigUint::default());
    }

    #[test]
    fn click_schedules_a_debounced_save() {
        let mut game = ready_game();
        game.handle_input(&InputEvent::Key('c'));
        game.tick(DEBOUNCE_TICKS - 1);
        assert!(!game.take_pending_save());
        game.tick(1);
        assert!(game.take_pending_save());
        // Consumed; no repeat until the next window.
        assert!(!game.take_pending_save());
    }

    #[test]
    fn heartbeat_saves_without_input() {
        let mut game = ready_game();
        game.tick(HEARTBEAT_TICKS);
        assert!(game.take_pending_save());
    }

    #[test]
    fn no_saves_scheduled_while_loading() {
        let mut game = ClickerGame::new(Some("u-1".to_string()));
        game.tick(HEARTBEAT_TICKS * 2);
        assert!(!game.take_pending_save());
    }

    #[test]
    fn logout_request_is_one_shot() {
        let mut game = ready_game();
        assert!(game.handle_input(&InputEvent::Key('q')));
        assert!(game.take_logout_request());
        assert!(!game.take_logout_request());
    }
}
