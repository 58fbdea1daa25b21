//! TUI layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

use super::controls;
use super::runtime::App;
use super::style;
use crate::sim::clock::Clock;
use crate::sim::snapshot::{GeneratorMeter, METER_RATED_VOLTS, Snapshot};
use crate::sim::state::Light;

/// Log lines shown; older entries scroll off.
const LOG_LINES: usize = 64;

/// Renders the full TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let snap = app.snapshot();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(14),   // board + log
            Constraint::Length(3), // generator meter
            Constraint::Length(1), // status
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    render_header(frame, app, &snap, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);
    render_board(frame, &snap, body[0]);
    render_log(frame, &snap, body[1]);

    render_meter(frame, snap.generator_meter.as_ref(), chunks[2]);
    frame.render_widget(Paragraph::new(format!(" {}", app.status)), chunks[3]);
    render_footer(frame, app, chunks[4]);
}

/// Header bar: clock, mode, DG selector, speed, run state.
fn render_header(frame: &mut Frame, app: &App, snap: &Snapshot, area: Rect) {
    let state_label = match (&snap.running, app.paused) {
        (_, true) => String::from("‖ PAUSED"),
        (Some(kind), false) => format!("▶ {kind}"),
        (None, false) => String::from("■ IDLE"),
    };

    let header = Line::from(vec![
        Span::styled(
            " LT-SWITCHOVER ",
            Style::default()
                .fg(style::HEADER_FG)
                .bg(style::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " {} │ {} │ {} │ {}ms/s │ {} ",
            Clock::hms(snap.at_secs),
            app.mode.label(),
            snap.selected_generator,
            app.tick_interval_ms(),
            state_label,
        )),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

/// Element lights and panel sources.
fn render_board(frame: &mut Frame, snap: &Snapshot, area: Rect) {
    let mut lines: Vec<Line> = snap
        .elements
        .iter()
        .map(|e| {
            let mut spans = vec![
                Span::styled("● ", Style::default().fg(style::light_color(e.light))),
                Span::styled(
                    format!("{:<14}", e.id.nameplate()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(e.text.clone()),
            ];
            if let Some(secs) = snap.countdown(e.id) {
                spans.push(Span::styled(
                    format!("  ({secs}s)"),
                    Style::default().fg(style::COUNTDOWN),
                ));
            }
            Line::from(spans)
        })
        .collect();

    lines.push(Line::from(""));
    for p in &snap.panels {
        let light = if p.energized {
            Light::On
        } else {
            Light::Off
        };
        lines.push(Line::from(vec![
            Span::styled("■ ", Style::default().fg(style::light_color(light))),
            Span::styled(
                format!("{:<14}", p.id.to_string()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(p.source_label.clone()),
        ]));
    }

    let block = Block::default().title(" Switchboard ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Event log, newest first.
fn render_log(frame: &mut Frame, snap: &Snapshot, area: Rect) {
    let lines: Vec<Line> = snap
        .event_log
        .iter()
        .take(LOG_LINES)
        .map(|e| {
            Line::from(vec![
                Span::styled(format!("{} ", e.time()), Style::default().fg(style::FOOTER_FG)),
                Span::styled(
                    e.message.clone(),
                    Style::default().fg(style::severity_color(e.severity)),
                ),
            ])
        })
        .collect();

    let block = Block::default().title(" Event Log ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Voltage gauge of a generator running up; empty otherwise.
fn render_meter(frame: &mut Frame, meter: Option<&GeneratorMeter>, area: Rect) {
    let block = Block::default().title(" DG Meter ").borders(Borders::ALL);
    let Some(m) = meter else {
        frame.render_widget(Paragraph::new(" --- V  --- Hz").block(block), area);
        return;
    };
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(style::METER))
        .ratio((m.voltage_v / METER_RATED_VOLTS).clamp(0.0, 1.0))
        .label(format!(
            "{}  {:.0} V  {:.1} Hz",
            m.generator, m.voltage_v, m.frequency_hz
        ));
    frame.render_widget(gauge, area);
}

/// Footer with keybinding hints.
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let footer = Paragraph::new(Line::from(Span::styled(
        controls::hints(app.mode),
        Style::default().fg(style::FOOTER_FG),
    )));
    frame.render_widget(footer, area);
}
