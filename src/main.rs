mod api;
mod auth;
mod game;
mod input;
mod save;
mod time;
mod widgets;

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::layout::{Alignment, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph};
use ratzilla::ratatui::{Frame, Terminal};
use ratzilla::{DomBackend, WebRenderer};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use auth::{AuthSession, LoginField, LoginForm};
use game::ClickerGame;
use input::{pixel_to_cell, ClickState, InputEvent};
use save::{extract_snapshot, Snapshot};
use time::GameClock;
use widgets::ClickableList;

// ── Login screen action IDs ─────────────────────────────────────
const FOCUS_EMAIL: u16 = 800;
const FOCUS_PASSWORD: u16 = 801;
const FOCUS_USERNAME: u16 = 802;
const SUBMIT_FORM: u16 = 810;
const TOGGLE_MODE: u16 = 811;

/// Top-level screen.
enum Screen {
    Login(LoginForm),
    Game(ClickerGame),
}

struct App {
    screen: Screen,
    session: Option<AuthSession>,
}

impl App {
    fn new(session: Option<AuthSession>) -> Self {
        match session {
            Some(session) => {
                let game = ClickerGame::new(Some(session.user_id.clone()));
                Self {
                    screen: Screen::Game(game),
                    session: Some(session),
                }
            }
            None => Self {
                screen: Screen::Login(LoginForm::new()),
                session: None,
            },
        }
    }

    /// The ownership guard in front of every save: a snapshot leaves the
    /// client only when an authenticated session exists, its user id
    /// matches the state's owner, and the remote load has completed.
    /// Anything else is silently a no-op: a fast account switch must
    /// never push one user's in-flight state into another's save slot.
    fn snapshot_for_save(&self) -> Option<(String, Snapshot)> {
        let session = self.session.as_ref()?;
        let game = match &self.screen {
            Screen::Game(game) => game,
            Screen::Login(_) => return None,
        };
        if game.loading {
            return None;
        }
        if game.state.owner_user_id.as_deref() != Some(session.user_id.as_str()) {
            return None;
        }
        Some((session.token.clone(), extract_snapshot(&game.state)))
    }

    /// Tear down the session: hand back the final save payload, then
    /// return to the login screen with all progress cleared.
    fn sign_out(&mut self) -> Option<(String, Snapshot)> {
        let payload = self.snapshot_for_save();
        self.session = None;
        self.screen = Screen::Login(LoginForm::new());
        payload
    }
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let app = Rc::new(RefCell::new(App::new(auth::load_session())));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let clock = Rc::new(RefCell::new(GameClock::new()));

    if app.borrow().session.is_some() {
        begin_remote_load(app.clone());
    }

    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let app = app.clone();
        move |key_event| handle_key(&app, key_event.code)
    });

    terminal.on_mouse_event({
        let app = app.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }
            let action = {
                let cs = click_state.borrow();
                hit_test_dom(mouse_event.x, mouse_event.y, &cs)
            };
            if let Some(action) = action {
                dispatch(&app, InputEvent::Click(action));
            }
        }
    });

    setup_flush_handlers(app.clone());

    terminal.draw_web({
        let app = app.clone();
        let click_state = click_state.clone();
        move |f| {
            let ticks = clock.borrow_mut().advance(now_ms());
            let mut app_ref = app.borrow_mut();

            let mut logout = false;
            let mut wants_save = false;
            if let Screen::Game(game) = &mut app_ref.screen {
                game.tick(ticks);
                logout = game.take_logout_request();
                wants_save = game.take_pending_save();
            }

            if logout {
                if let Some((token, snapshot)) = app_ref.sign_out() {
                    api::flush_save(&token, &snapshot);
                }
                auth::clear_session();
            } else if wants_save {
                if let Some((token, snapshot)) = app_ref.snapshot_for_save() {
                    spawn_save(token, snapshot);
                }
            }

            render_app(&app_ref, f, &click_state);
        }
    });

    Ok(())
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Convert a browser pixel click to a registered action, using the grid
/// container `DomBackend` creates inside `<body>`.
fn hit_test_dom(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<u16> {
    let document = web_sys::window()?.document()?;
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();
    let (col, row) = pixel_to_cell(
        mouse_x as f64 - rect.left(),
        mouse_y as f64 - rect.top(),
        rect.width(),
        rect.height(),
        cs.terminal_cols,
        cs.terminal_rows,
    )?;
    cs.hit_test(col, row)
}

fn dispatch(app: &Rc<RefCell<App>>, event: InputEvent) {
    let mut submit = false;
    {
        let mut app_ref = app.borrow_mut();
        match &mut app_ref.screen {
            Screen::Game(game) => {
                game.handle_input(&event);
            }
            Screen::Login(form) => {
                if let InputEvent::Click(action) = event {
                    match action {
                        FOCUS_EMAIL => form.focus = LoginField::Email,
                        FOCUS_PASSWORD => form.focus = LoginField::Password,
                        FOCUS_USERNAME => form.focus = LoginField::Username,
                        TOGGLE_MODE => form.toggle_mode(),
                        SUBMIT_FORM => submit = true,
                        _ => {}
                    }
                }
            }
        }
    }
    if submit {
        submit_form(app);
    }
}

fn handle_key(app: &Rc<RefCell<App>>, code: KeyCode) {
    let mut submit = false;
    {
        let mut app_ref = app.borrow_mut();
        match &mut app_ref.screen {
            Screen::Game(game) => {
                if let KeyCode::Char(c) = code {
                    game.handle_input(&InputEvent::Key(c));
                }
            }
            Screen::Login(form) => match code {
                KeyCode::Char(c) => form.type_char(c),
                KeyCode::Backspace => form.backspace(),
                KeyCode::Tab => form.next_field(),
                KeyCode::Esc => form.toggle_mode(),
                KeyCode::Enter => submit = true,
                _ => {}
            },
        }
    }
    if submit {
        submit_form(app);
    }
}

/// Validate locally, then run the register or login+identify flow.
fn submit_form(app: &Rc<RefCell<App>>) {
    let (email, password, register_mode, username) = {
        let mut app_ref = app.borrow_mut();
        let form = match &mut app_ref.screen {
            Screen::Login(form) => form,
            Screen::Game(_) => return,
        };
        if form.busy {
            return;
        }
        if let Err(message) = form.validate() {
            form.error = Some(message);
            return;
        }
        form.busy = true;
        form.error = None;
        form.notice = None;
        (
            form.email.trim().to_string(),
            form.password.clone(),
            form.register_mode,
            form.username_opt().map(str::to_string),
        )
    };

    let app = app.clone();
    wasm_bindgen_futures::spawn_local(async move {
        if register_mode {
            match api::register(&email, &password, username.as_deref()).await {
                Ok(()) => {
                    let mut app_ref = app.borrow_mut();
                    if let Screen::Login(form) = &mut app_ref.screen {
                        form.busy = false;
                        form.register_mode = false;
                        form.password.clear();
                        form.notice = Some("Account created — sign in to play.".to_string());
                    }
                }
                Err(error) => set_form_error(&app, error),
            }
            return;
        }

        match sign_in(&email, &password).await {
            Ok(session) => {
                auth::store_session(&session);
                {
                    let mut app_ref = app.borrow_mut();
                    app_ref.screen =
                        Screen::Game(ClickerGame::new(Some(session.user_id.clone())));
                    app_ref.session = Some(session);
                }
                begin_remote_load(app);
            }
            Err(error) => set_form_error(&app, error),
        }
    });
}

async fn sign_in(email: &str, password: &str) -> Result<AuthSession, api::ApiError> {
    let token = api::login(email, password).await?;
    let me = api::me(&token).await?;
    Ok(AuthSession {
        token,
        user_id: me.user_id,
        username: me.username,
    })
}

fn set_form_error(app: &Rc<RefCell<App>>, error: api::ApiError) {
    let mut app_ref = app.borrow_mut();
    if let Screen::Login(form) = &mut app_ref.screen {
        form.busy = false;
        form.error = Some(error.to_string());
    }
}

/// Fetch the remote snapshot for the active session and hand it to the
/// game. A 404 means a fresh account; an expired token sends the player
/// back to the login screen.
fn begin_remote_load(app: Rc<RefCell<App>>) {
    let token = match &app.borrow().session {
        Some(session) => session.token.clone(),
        None => return,
    };
    wasm_bindgen_futures::spawn_local(async move {
        let result = api::load_game(&token).await;
        let mut app_ref = app.borrow_mut();
        match result {
            Err(api::ApiError::Unauthorized) => {
                app_ref.sign_out();
                auth::clear_session();
                if let Screen::Login(form) = &mut app_ref.screen {
                    form.error = Some("Session expired — sign in again.".to_string());
                }
            }
            result => {
                if let Screen::Game(game) = &mut app_ref.screen {
                    match result {
                        Ok(snapshot) => game.finish_loading(Some(&snapshot)),
                        Err(api::ApiError::NotFound) => game.finish_loading(None),
                        Err(error) => {
                            web_sys::console::warn_1(
                                &format!("failed to load game: {}", error).into(),
                            );
                            game.finish_loading(None);
                        }
                    }
                }
            }
        }
    });
}

fn spawn_save(token: String, snapshot: Snapshot) {
    wasm_bindgen_futures::spawn_local(async move {
        // Swallowed on purpose: the next debounce/heartbeat attempt
        // retries with a fresher snapshot anyway.
        if let Err(error) = api::save_game(&token, &snapshot).await {
            web_sys::console::warn_1(
                &format!("autosave failed (will retry): {}", error).into(),
            );
        }
    });
}

/// Best-effort flush on tab hide and page unload, via keepalive requests
/// that may outlive the page.
fn setup_flush_handlers(app: Rc<RefCell<App>>) {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return,
    };
    let document = match window.document() {
        Some(d) => d,
        None => return,
    };

    let flush = {
        let app = app.clone();
        move || {
            if let Some((token, snapshot)) = app.borrow().snapshot_for_save() {
                api::flush_save(&token, &snapshot);
            }
        }
    };

    {
        let flush = flush.clone();
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                flush();
            }
        });
        let _ = document.add_event_listener_with_callback(
            "visibilitychange",
            closure.as_ref().unchecked_ref(),
        );
        closure.forget();
    }

    {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            flush();
        });
        let _ = window.add_event_listener_with_callback(
            "beforeunload",
            closure.as_ref().unchecked_ref(),
        );
        closure.forget();
    }
}

fn render_app(app: &App, f: &mut Frame, click_state: &Rc<RefCell<ClickState>>) {
    let area = f.area();
    {
        let mut cs = click_state.borrow_mut();
        cs.terminal_cols = area.width;
        cs.terminal_rows = area.height;
        cs.clear_targets();
    }
    match &app.screen {
        Screen::Login(form) => render_login(form, f, area, click_state),
        Screen::Game(game) => game.render(f, area, click_state),
    }
}

fn field_line<'a>(label: &'a str, value: &'a str, masked: bool, focused: bool) -> Line<'a> {
    let shown = if masked {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let cursor = if focused { "█" } else { " " };
    Line::from(vec![
        Span::styled(
            format!(" {:<10}", label),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("{}{}", shown, cursor),
            if focused {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            },
        ),
    ])
}

fn render_login(
    form: &LoginForm,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    // Center a fixed-size card, shrinking to fit small screens.
    let card_height = 14u16.min(area.height);
    let card_width = area.width.min(64);
    let top = area.y + (area.height - card_height) / 2;
    let left = area.x + (area.width - card_width) / 2;
    let card = Rect::new(left, top, card_width, card_height);

    let title = if form.register_mode {
        " Coin Clicker — create account "
    } else {
        " Coin Clicker — sign in "
    };

    let mut cl = ClickableList::new();
    cl.push(Line::from(Span::styled(
        "Click coins. Buy upgrades. Progress is saved per account.",
        Style::default().fg(Color::DarkGray),
    )));
    cl.push(Line::from(""));
    cl.push_clickable(
        field_line("E-mail", &form.email, false, form.focus == LoginField::Email),
        FOCUS_EMAIL,
    );
    cl.push_clickable(
        field_line(
            "Password",
            &form.password,
            true,
            form.focus == LoginField::Password,
        ),
        FOCUS_PASSWORD,
    );
    if form.register_mode {
        cl.push_clickable(
            field_line(
                "Username",
                &form.username,
                false,
                form.focus == LoginField::Username,
            ),
            FOCUS_USERNAME,
        );
    }
    cl.push(Line::from(""));

    let submit_label = if form.busy {
        "Working…"
    } else if form.register_mode {
        "[Enter] Create account"
    } else {
        "[Enter] Sign in"
    };
    cl.push_clickable(
        Line::from(Span::styled(
            submit_label,
            if form.busy {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            },
        )),
        SUBMIT_FORM,
    );
    cl.push_clickable(
        Line::from(Span::styled(
            if form.register_mode {
                "[Esc] Back to sign in"
            } else {
                "[Esc] Need an account? Register"
            },
            Style::default().fg(Color::Cyan),
        )),
        TOGGLE_MODE,
    );

    if let Some(error) = &form.error {
        cl.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    } else if let Some(notice) = &form.notice {
        cl.push(Line::from(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Green),
        )));
    }
    cl.push(Line::from(Span::styled(
        "[Tab] next field",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title)
        .title_alignment(Alignment::Center);

    let mut cs = click_state.borrow_mut();
    cl.register_targets(card, &mut cs, 1, 1);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), card);
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn session(user_id: &str) -> AuthSession {
        AuthSession {
            token: "jwt".to_string(),
            user_id: user_id.to_string(),
            username: "coinlord".to_string(),
        }
    }

    fn ready_app(user_id: &str) -> App {
        let mut app = App::new(Some(session(user_id)));
        if let Screen::Game(game) = &mut app.screen {
            game.finish_loading(None);
        }
        app
    }

    #[test]
    fn app_without_session_starts_on_login() {
        let app = App::new(None);
        assert!(matches!(app.screen, Screen::Login(_)));
        assert!(app.snapshot_for_save().is_none());
    }

    #[test]
    fn app_with_session_starts_loading_game() {
        let app = App::new(Some(session("u-1")));
        match &app.screen {
            Screen::Game(game) => assert!(game.loading),
            Screen::Login(_) => panic!("expected game screen"),
        }
    }

    #[test]
    fn no_save_while_loading() {
        let app = App::new(Some(session("u-1")));
        assert!(app.snapshot_for_save().is_none());
    }

    #[test]
    fn save_payload_carries_current_state() {
        let mut app = ready_app("u-1");
        if let Screen::Game(game) = &mut app.screen {
            game::logic::add_currency(&mut game.state, &BigUint::from(77u32));
        }
        let (token, snapshot) = app.snapshot_for_save().expect("payload");
        assert_eq!(token, "jwt");
        assert_eq!(snapshot.currency, "77");
    }

    #[test]
    fn owner_mismatch_blocks_save() {
        let mut app = ready_app("u-1");
        if let Screen::Game(game) = &mut app.screen {
            // Simulate a stale state from a previous account.
            game.state.owner_user_id = Some("u-0".to_string());
        }
        assert!(app.snapshot_for_save().is_none());
    }

    #[test]
    fn missing_owner_blocks_save() {
        let mut app = ready_app("u-1");
        if let Screen::Game(game) = &mut app.screen {
            game.state.owner_user_id = None;
        }
        assert!(app.snapshot_for_save().is_none());
    }

    #[test]
    fn sign_out_returns_final_payload_and_resets() {
        let mut app = ready_app("u-1");
        if let Screen::Game(game) = &mut app.screen {
            game::logic::add_currency(&mut game.state, &BigUint::from(5u32));
        }
        let payload = app.sign_out();
        assert!(payload.is_some());
        assert!(app.session.is_none());
        assert!(matches!(app.screen, Screen::Login(_)));
        // Nothing left to save after the switch.
        assert!(app.snapshot_for_save().is_none());
    }

    #[test]
    fn sign_out_without_loaded_game_has_no_payload() {
        let mut app = App::new(Some(session("u-1")));
        assert!(app.sign_out().is_none());
    }
}
