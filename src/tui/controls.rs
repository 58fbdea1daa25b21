//! Keyboard input handling for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::runtime::{App, ControlMode};
use crate::sim::choreography::Scenario;
use crate::sim::manual::ManualAction;

/// Maps a key event to an application action.
///
/// Guards on [`KeyEventKind::Press`] to avoid double-fire on some terminals.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit = true,
        KeyCode::Char(' ') => app.toggle_pause(),
        KeyCode::Char('+' | '=') | KeyCode::Right => app.speed_up(),
        KeyCode::Char('-') | KeyCode::Left => app.speed_down(),
        KeyCode::Char('r') => app.reset(),
        KeyCode::Char('g') => app.toggle_generator(),
        KeyCode::Tab => app.toggle_mode(),
        KeyCode::Char(c) => match app.mode {
            ControlMode::Auto => {
                if let Some(scenario) = scenario_key(c) {
                    app.trigger(scenario);
                }
            }
            ControlMode::Manual => {
                if let Some(action) = manual_key(c) {
                    app.manual(action);
                }
            }
        },
        _ => {}
    }
}

fn scenario_key(c: char) -> Option<Scenario> {
    match c {
        't' => Some(Scenario::TotalEbFail),
        '1' => Some(Scenario::Eb1Fail),
        '2' => Some(Scenario::Eb2Fail),
        'e' => Some(Scenario::EbRestore),
        _ => None,
    }
}

fn manual_key(c: char) -> Option<ManualAction> {
    let action = match c {
        'o' => ManualAction::OpenEbAll,
        'u' => ManualAction::RestoreEbSupply,
        's' => ManualAction::StartGen,
        'k' => ManualAction::StopGen,
        'i' => ManualAction::CloseGenIncomer,
        'j' => ManualAction::OpenGenIncomer,
        '1' => ManualAction::CloseCoupler1,
        '2' => ManualAction::OpenCoupler1,
        '3' => ManualAction::CloseCoupler2,
        '4' => ManualAction::OpenCoupler2,
        '5' => ManualAction::CloseEb1,
        '6' => ManualAction::CloseEb2,
        _ => return None,
    };
    Some(action)
}

/// Key hints for the footer in the given mode.
pub fn hints(mode: ControlMode) -> &'static str {
    match mode {
        ControlMode::Auto => concat!(
            " t:Total EB fail  1/2:EB-1/EB-2 fail  e:Restore  g:DG  Tab:Manual",
            "  r:Reset  Space:Pause  +/-:Speed  q:Quit",
        ),
        ControlMode::Manual => concat!(
            " o:Open EB  u:Restore supply  s/k:Start/Stop DG  i/j:DG in/out  1-4:Couplers",
            "  5/6:Close EB-1/EB-2  g:DG  Tab:Auto  q:Quit",
        ),
    }
}
