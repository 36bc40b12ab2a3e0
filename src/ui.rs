use farm_atlas::{Clock, SessionStatus, splash::SplashPhase};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use crate::state::{AppState, HELP_TEXT, Screen};

const FARM_GREEN: Color = Color::Rgb(0x10, 0xB9, 0x81);

pub fn draw<C: Clock + Clone>(f: &mut Frame, state: &mut AppState<C>) {
    let now = state.now_ms();

    if let Screen::Splash(preloader) = &state.screen {
        let (word, color) = match preloader.phase(now) {
            SplashPhase::Word { opacity, .. } if opacity < 0.5 => (preloader.word(now), Color::DarkGray),
            _ => (preloader.word(now), FARM_GREEN),
        };
        let area = centered_line(f.area());
        let p = Paragraph::new(word.unwrap_or_default())
            .alignment(Alignment::Center)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD));
        f.render_widget(p, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ].as_ref())
        .split(f.area());

    // Left: session and points
    let session = state.controller.state();
    let mut lines = vec![format!("Status: {:?}", session.status())];
    for p in session.selection().points() {
        lines.push(format!(
            "{}: {:.6}, {:.6}",
            p.label(),
            p.point().latitude,
            p.point().longitude
        ));
    }
    if let Some(area) = session.area_acres() {
        lines.push(String::new());
        lines.push(format!("Farm area: {:.3} acres", area));
    }
    let cursor = state.map.cursor();
    lines.push(String::new());
    lines.push(format!("Cursor: {:.6}, {:.6}", cursor.latitude, cursor.longitude));
    let left = Paragraph::new(lines.join("\n"))
        .block(Block::default().borders(Borders::ALL).title("Boundary"))
        .wrap(Wrap { trim: true });
    f.render_widget(left, chunks[0]);

    // Center: map or results
    match &state.screen {
        Screen::Results(result) => {
            let mut text = format!("Farm area: {:.3} acres\n\n", result.area_acres);
            for (i, p) in result.boundary.iter().enumerate() {
                text.push_str(&format!("Point {}: {:.6}, {:.6}\n", i + 1, p.latitude, p.longitude));
            }
            text.push_str("\nEnter: new boundary   q: quit");
            let p = Paragraph::new(text)
                .block(Block::default().borders(Borders::ALL).title("Your farm"))
                .wrap(Wrap { trim: true });
            f.render_widget(p, chunks[1]);
        }
        _ => {
            let title = if state.map.is_panning() {
                "Centering on your location"
            } else {
                match session.status() {
                    SessionStatus::AwaitingStart => "Press s, then tap 4 points around your farm boundary",
                    SessionStatus::Selecting => "Tap 4 points around your farm boundary",
                    SessionStatus::BoundaryReady => "Boundary ready",
                    SessionStatus::Analyzing => "Analyzing",
                    _ => "Locating",
                }
            };
            state.map.render(f, chunks[1], title, FARM_GREEN);
        }
    }

    // Right: analysis steps + help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(chunks[2]);

    let current = session.current_step_index();
    let analyzing = session.status() == SessionStatus::Analyzing;
    let items: Vec<ListItem> = state.controller.steps()
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let color = step.rgb().map(|(r, g, b)| Color::Rgb(r, g, b)).unwrap_or(Color::White);
            let done = matches!(current, Some(c) if i < c) || session.status() == SessionStatus::Complete;
            let marker = if done { "✓ " } else { "  " };
            ListItem::new(format!("{}{}", marker, step.title)).style(Style::default().fg(color))
        })
        .collect();
    let mut list_state = ListState::default();
    list_state.select(if analyzing { current } else { None });
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Analysis"))
        .highlight_symbol(">> ")
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    f.render_stateful_widget(list, right_chunks[0], &mut list_state);

    let mut info = HELP_TEXT.to_string();
    if let Some(notice) = &state.notice {
        info = format!("{}\n\n{}", notice, info);
    }
    let info_paragraph = Paragraph::new(info)
        .block(Block::default().borders(Borders::ALL).title("Info"))
        .wrap(Wrap { trim: true });
    f.render_widget(info_paragraph, right_chunks[1]);
}

fn centered_line(area: Rect) -> Rect {
    let y = area.y + area.height / 2;
    Rect { x: area.x, y, width: area.width, height: area.height.min(1) }
}
