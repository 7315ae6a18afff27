use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use super::mode::TuiState;
use crate::deck::{DEFAULT_STATIC_SECONDS, SoundEffect};
use crate::pipeline::pattern::Mood;
use crate::shared::{InputEvent, VOLUME_STEP};

// poll for a key press and resolve it into events for the middle layer
pub fn poll_input(timeout: Duration, ts: &mut TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code, ts));
    }
    Ok(vec![])
}

fn handle_key(code: KeyCode, ts: &mut TuiState) -> Vec<InputEvent> {
    let event = match code {
        KeyCode::Esc | KeyCode::Char('Q') => InputEvent::Quit,
        KeyCode::Char('?') => {
            ts.show_help = !ts.show_help;
            return vec![];
        }

        KeyCode::Char(c @ '0'..='6') => InputEvent::StartMood(mood_for_digit(c)),
        KeyCode::Char('l') => InputEvent::StartDefaultLoop,
        KeyCode::Char('s') => InputEvent::StopLoop,
        KeyCode::Char('a') => InputEvent::ToggleAmbient,
        KeyCode::Char('[') => InputEvent::AmbientVolume(-VOLUME_STEP),
        KeyCode::Char(']') => InputEvent::AmbientVolume(VOLUME_STEP),
        KeyCode::Char('m') => InputEvent::ToggleMute,

        KeyCode::Char(c) => match effect_for_key(c) {
            Some(effect) => InputEvent::Effect(effect),
            None => return vec![],
        },
        _ => return vec![],
    };
    vec![event]
}

// 1-6 walk the canonical moods, 0 is the fallback tape
fn mood_for_digit(c: char) -> Mood {
    c.to_digit(10)
        .and_then(|d| d.checked_sub(1))
        .and_then(|i| Mood::CANONICAL.get(i as usize).copied())
        .unwrap_or(Mood::Neutral)
}

fn effect_for_key(c: char) -> Option<SoundEffect> {
    let effect = match c {
        'b' => SoundEffect::Boot,
        'c' => SoundEffect::Click,
        'h' => SoundEffect::Hover,
        'k' => SoundEffect::KeyStroke,
        'f' => SoundEffect::Flip,
        'i' => SoundEffect::InsertTape,
        'e' => SoundEffect::EjectTape,
        'p' => SoundEffect::PowerDown,
        'd' => SoundEffect::Delete,
        'y' => SoundEffect::Success,
        'x' => SoundEffect::Error,
        'g' => SoundEffect::Processing,
        'n' => SoundEffect::Static { seconds: DEFAULT_STATIC_SECONDS },
        _ => return None,
    };
    Some(effect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_pick_moods() {
        assert_eq!(mood_for_digit('1'), Mood::Happy);
        assert_eq!(mood_for_digit('6'), Mood::Mysterious);
        assert_eq!(mood_for_digit('0'), Mood::Neutral);
    }

    #[test]
    fn test_help_stays_local() {
        let mut ts = TuiState::default();
        assert!(handle_key(KeyCode::Char('?'), &mut ts).is_empty());
        assert!(ts.show_help);
    }

    #[test]
    fn test_keys_resolve() {
        let mut ts = TuiState::default();
        assert_eq!(handle_key(KeyCode::Esc, &mut ts), vec![InputEvent::Quit]);
        assert_eq!(handle_key(KeyCode::Char('a'), &mut ts), vec![InputEvent::ToggleAmbient]);
        assert_eq!(
            handle_key(KeyCode::Char('y'), &mut ts),
            vec![InputEvent::Effect(SoundEffect::Success)]
        );
        assert!(handle_key(KeyCode::Char('z'), &mut ts).is_empty());
    }
}
