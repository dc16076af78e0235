//! Clicker rendering: stage HUD, coin button, upgrade cards, and log.
//!
//! Every interactive element registers a click target while it renders,
//! so taps always match what is on screen.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::ClickableList;

use super::actions;
use super::logic::format_coins;
use super::progression::{
    self, next_stage, sound_pack_cost, stage_for_currency, stage_progress, theme_band,
    upgrade_cost, ThemeBand,
};
use super::state::GameState;

/// Coin art frames cycled by the animation counter.
const COIN_ART: &[&[&str]] = &[
    &[" ╭─────╮ ", " │  ¤  │ ", " ╰─────╯ "],
    &[" ╭─────╮ ", " │  ◎  │ ", " ╰─────╯ "],
];

/// Pressed frame shown during the click flash.
const COIN_CLICK_ART: &[&str] = &[" ╭━━━━━╮ ", " ┃  ¤  ┃ ", " ╰━━━━━╯ "];

/// UI chrome colors for a theme band.
struct Palette {
    border: Color,
    accent: Color,
    glow: Color,
}

fn palette(band: ThemeBand) -> Palette {
    match band {
        ThemeBand::Noir => Palette {
            border: Color::DarkGray,
            accent: Color::White,
            glow: Color::Yellow,
        },
        ThemeBand::Mirage => Palette {
            border: Color::Magenta,
            accent: Color::LightYellow,
            glow: Color::LightMagenta,
        },
        ThemeBand::Ascension => Palette {
            border: Color::Cyan,
            accent: Color::LightCyan,
            glow: Color::LightGreen,
        },
    }
}

pub fn render(
    state: &GameState,
    loading: bool,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    if loading {
        let notice = Paragraph::new("Loading your game…")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(notice, area);
        return;
    }

    let pal = palette(theme_band(&state.currency));

    // Wide screens put the log beside the game; narrow ones stack it.
    let narrow = is_narrow_layout(area.width);
    let (main_area, log_area) = if narrow {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(20), Constraint::Length(6)])
            .split(area);
        (chunks[0], chunks[1])
    } else {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(area);
        (chunks[0], chunks[1])
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // stage HUD
            Constraint::Length(3), // progress gauge
            Constraint::Length(7), // coin button
            Constraint::Min(8),    // upgrade cards
            Constraint::Length(3), // help bar
        ])
        .split(main_area);

    render_hud(state, &pal, f, chunks[0]);
    render_progress(state, &pal, f, chunks[1]);
    render_coin(state, &pal, f, chunks[2], click_state);
    render_cards(state, &pal, f, chunks[3], click_state, narrow);
    render_help(&pal, f, chunks[4], click_state);
    render_log(state, &pal, f, log_area);
}

fn render_hud(state: &GameState, pal: &Palette, f: &mut Frame, area: Rect) {
    let stage = stage_for_currency(&state.currency);
    let band = theme_band(&state.currency);
    let power = progression::click_power(&state.upgrades);

    let mut stage_spans = vec![
        Span::styled(
            format!(" {} ", stage.name),
            Style::default()
                .fg(Color::Black)
                .bg(pal.glow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", band.label()),
            Style::default().fg(pal.border),
        ),
    ];
    if let Some(next) = next_stage(stage) {
        stage_spans.push(Span::styled(
            format!("  next: {}", next.name),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let lines = vec![
        Line::from(stage_spans),
        Line::from(vec![
            Span::styled(
                format!(" {} ", format_coins(&state.currency)),
                Style::default().fg(pal.glow).add_modifier(Modifier::BOLD),
            ),
            Span::styled("coins collected", Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(vec![
            Span::styled(
                format!(" +{} per click", power),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("   {} clicks", state.total_clicks),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(pal.border))
        .title(" Coin Clicker ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_progress(state: &GameState, pal: &Palette, f: &mut Frame, area: Rect) {
    let stage = stage_for_currency(&state.currency);
    let label = match next_stage(stage) {
        Some(next) => format!(
            "{} / {}",
            format_coins(&state.currency),
            format_coins(&num_bigint::BigUint::from(next.threshold))
        ),
        None => format!("{} / max stage", format_coins(&state.currency)),
    };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(pal.border)),
        )
        .gauge_style(Style::default().fg(pal.glow))
        .ratio(stage_progress(&state.currency))
        .label(label);
    f.render_widget(gauge, area);
}

fn render_coin(
    state: &GameState,
    pal: &Palette,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let art: &[&str] = if state.click_flash > 0 {
        COIN_CLICK_ART
    } else {
        COIN_ART[(state.anim_frame / 5) as usize % COIN_ART.len()]
    };

    let power = progression::click_power(&state.upgrades);
    let label_style = if state.click_flash > 0 {
        Style::default()
            .fg(pal.glow)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(pal.glow).add_modifier(Modifier::BOLD)
    };

    let mut lines = vec![particle_line(state, area.width)];
    for (i, row) in art.iter().enumerate() {
        let mut spans = vec![Span::styled(*row, Style::default().fg(pal.accent))];
        if i == 1 {
            // The whole coin panel is a click target, so this hint is
            // tappable even though it is not a ClickableList row.
            let hint = format!(" [C] +{} ", power);
            spans.push(Span::styled(hint, label_style));
        }
        lines.push(Line::from(spans));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if state.click_flash > 0 {
            pal.glow
        } else {
            pal.border
        }))
        .title(" click! ");
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(block),
        area,
    );

    // The whole button area is one big tap target.
    let mut cs = click_state.borrow_mut();
    cs.add_click_target(area, actions::CLICK_COIN);
}

/// One line of floating "+N" particles above the coin art, positioned by
/// column offset and faded by remaining life.
fn particle_line(state: &GameState, width: u16) -> Line<'static> {
    let center = width as i16 / 2;
    let mut spans: Vec<Span> = Vec::new();
    let mut cursor: i16 = 0;
    for p in &state.particles {
        let col = (center + p.col_offset).max(0);
        if col < cursor {
            continue;
        }
        let pad = (col - cursor) as usize;
        if pad > 0 {
            spans.push(Span::raw(" ".repeat(pad)));
        }
        let fading = p.life * 2 < p.max_life;
        spans.push(Span::styled(
            p.text.clone(),
            if fading {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            },
        ));
        cursor = col + p.text.chars().count() as i16;
    }
    Line::from(spans)
}

fn render_cards(
    state: &GameState,
    pal: &Palette,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
    narrow: bool,
) {
    let (mult_area, sound_area) = if narrow {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(6)])
            .split(area);
        (chunks[0], chunks[1])
    } else {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        (chunks[0], chunks[1])
    };

    render_multiplier_card(state, pal, f, mult_area, click_state);
    render_sound_card(state, pal, f, sound_area, click_state);
}

fn buy_style(affordable: bool, denied: bool) -> Style {
    if denied {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else if affordable {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_multiplier_card(
    state: &GameState,
    pal: &Palette,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let cost = upgrade_cost(&state.upgrades);
    let affordable = state.currency >= cost;
    let denied = state.denied_flash > 0;

    let mut cl = ClickableList::new();
    cl.push(Line::from(vec![
        Span::styled("Click Multiplier", Style::default().fg(pal.accent)),
        Span::styled(
            format!("  Lv {}", state.upgrades.click_multiplier),
            Style::default().fg(pal.glow).add_modifier(Modifier::BOLD),
        ),
    ]));
    cl.push(Line::from(Span::styled(
        "Each level adds +1 per click, forever.",
        Style::default().fg(Color::DarkGray),
    )));
    cl.push(Line::from(vec![
        Span::styled("Next cost: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format_coins(&cost),
            Style::default().fg(pal.accent).add_modifier(Modifier::BOLD),
        ),
    ]));
    cl.push_clickable(
        Line::from(Span::styled("[B] Buy upgrade", buy_style(affordable, denied))),
        actions::BUY_MULTIPLIER,
    );

    let border = if state.purchase_flash > 0 { pal.glow } else { pal.border };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" permanent upgrade ");

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

fn render_sound_card(
    state: &GameState,
    pal: &Palette,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let selected = state.upgrades.selected_sound;
    let denied = state.denied_flash > 0;

    let mut cl = ClickableList::new();
    cl.push(Line::from(vec![
        Span::styled("Click Sounds", Style::default().fg(pal.accent)),
        Span::styled(
            format!("  {}", selected.name()),
            Style::default().fg(pal.glow).add_modifier(Modifier::BOLD),
        ),
    ]));
    cl.push(Line::from(Span::styled(
        selected.tagline(),
        Style::default().fg(Color::DarkGray),
    )));

    match (state.upgrades.next_sound(), sound_pack_cost(&state.upgrades)) {
        (Some(next), Some(cost)) => {
            let affordable = state.currency >= cost;
            cl.push(Line::from(vec![
                Span::styled("Next: ", Style::default().fg(Color::DarkGray)),
                Span::styled(next.name(), Style::default().fg(pal.accent)),
                Span::styled(
                    format!(" — {} coins", format_coins(&cost)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
            cl.push_clickable(
                Line::from(Span::styled(
                    "[S] Unlock next sound",
                    buy_style(affordable, denied),
                )),
                actions::BUY_SOUND_PACK,
            );
        }
        _ => {
            cl.push(Line::from(Span::styled(
                "All sounds unlocked — pick your favorite.",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    for variant in state.upgrades.unlocked_sounds() {
        let tier = variant.tier();
        let marker = if *variant == selected { "●" } else { "○" };
        cl.push_clickable(
            Line::from(Span::styled(
                format!("[{}] {} {}", tier + 1, marker, variant.name()),
                if *variant == selected {
                    Style::default().fg(pal.glow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(pal.accent)
                },
            )),
            actions::SELECT_SOUND_BASE + tier as u16,
        );
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(pal.border))
        .title(" sound library ");

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

fn render_help(
    pal: &Palette,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let help = Paragraph::new(Line::from(Span::styled(
        "[C] click · [B] multiplier · [S] sound · [1-3] equip · [Q] sign out",
        Style::default().fg(Color::DarkGray),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(pal.border)),
    );
    f.render_widget(help, area);

    // Tapping the help bar signs out (the only action without its own
    // on-screen element).
    let mut cs = click_state.borrow_mut();
    cs.add_click_target(area, actions::LOGOUT);
}

fn render_log(state: &GameState, pal: &Palette, f: &mut Frame, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let start = state.log.len().saturating_sub(visible);

    let lines: Vec<Line> = state.log[start..]
        .iter()
        .map(|entry| {
            if entry.is_important {
                Line::from(Span::styled(
                    &entry.text,
                    Style::default().fg(pal.glow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::styled(&entry.text, Style::default().fg(Color::Gray)))
            }
        })
        .collect();

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(pal.border))
                .title(" log "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}
