use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use log::{debug, warn};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::{Duration, Instant};

/// left-hand side of a qwerty keyboard laid out like the COSMAC hex keypad:
///   1 2 3 4      1 2 3 C
///   q w e r  ->  4 5 6 D
///   a s d f      7 8 9 E
///   z x c v      A 0 B F
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00), // x
    ('1', 0x01), // 1
    ('2', 0x02), // 2
    ('3', 0x03), // 3
    ('q', 0x04), // q
    ('w', 0x05), // w
    ('e', 0x06), // e
    ('a', 0x07), // a
    ('s', 0x08), // s
    ('d', 0x09), // d
    ('z', 0x0a), // z
    ('c', 0x0b), // c
    ('4', 0x0c), // 4
    ('r', 0x0d), // r
    ('f', 0x0e), // f
    ('v', 0x0f), // v
];

/// Terminals only report presses, so releases are guessed from silence.
/// Until a key's first autorepeat arrives it gets the long window, which has
/// to outlast the OS repeat delay (250-660ms is common); once it is
/// repeating, a gap of a few repeat intervals means it was let go.
const KEY_FIRST_REPEAT: Duration = Duration::from_millis(750);
const KEY_REPEAT_GAP: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy)]
struct Held {
    last_seen: Instant,
    repeating: bool,
}

impl Held {
    fn released_by(&self, now: Instant) -> bool {
        let window = if self.repeating {
            KEY_REPEAT_GAP
        } else {
            KEY_FIRST_REPEAT
        };
        now.saturating_duration_since(self.last_seen) >= window
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(u8),
    KeyUp(u8),
    Quit,
}

/// reads keypresses, already translated to keypad ids
pub trait Input {
    /// everything that happened since the last call, without blocking
    fn poll_events(&mut self) -> Result<Vec<InputEvent>, io::Error>;
}

/// Input from the controlling terminal, via crossterm in raw mode
pub struct TermInput {
    keymap: HashMap<char, u8>,
    held: [Option<Held>; 16],
}

impl TermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: [None; 16],
        })
    }

    fn press(&mut self, key: u8, now: Instant, events: &mut Vec<InputEvent>) {
        let slot = &mut self.held[key as usize];
        let repeating = slot.is_some();
        if !repeating {
            events.push(InputEvent::KeyDown(key));
        }
        *slot = Some(Held {
            last_seen: now,
            repeating,
        });
    }

    fn release_stale(&mut self, now: Instant, events: &mut Vec<InputEvent>) {
        for (key, slot) in self.held.iter_mut().enumerate() {
            if let Some(held) = *slot {
                if held.released_by(now) {
                    *slot = None;
                    events.push(InputEvent::KeyUp(key as u8));
                }
            }
        }
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn poll_events(&mut self) -> Result<Vec<InputEvent>, io::Error> {
        let mut events = Vec::new();
        while poll(Duration::from_millis(0))? {
            let now = Instant::now();
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Esc => events.push(InputEvent::Quit),
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        events.push(InputEvent::Quit)
                    }
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(&mapped_key) => self.press(mapped_key, now, &mut events),
                        None => debug!("can't map {:?} to a COSMAC key", key),
                    },
                    code => debug!("ignoring key {:?}", code),
                },
                Event::Resize(..) => {}
                other => warn!("unknown event received: {:?}", other),
            }
        }
        self.release_stale(Instant::now(), &mut events);
        Ok(events)
    }
}

/// dummy Input implementation for testing; hands out one scripted batch per
/// poll, then nothing
pub struct DummyInput {
    batches: VecDeque<Vec<InputEvent>>,
}

impl DummyInput {
    pub fn new(batches: Vec<Vec<InputEvent>>) -> Self {
        DummyInput {
            batches: VecDeque::from(batches),
        }
    }
}

impl Input for DummyInput {
    fn poll_events(&mut self) -> Result<Vec<InputEvent>, io::Error> {
        Ok(self.batches.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keymap_is_unambiguous() {
        let map = HashMap::from(CHIP8_CONVENTIONAL_KEYMAP);
        assert_eq!(map.len(), 16);
        let mut ids: Vec<u8> = map.values().copied().collect();
        ids.sort();
        assert_eq!(ids, (0..16).collect::<Vec<u8>>());
    }

    fn term_input() -> TermInput {
        TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: [None; 16],
        }
    }

    #[test]
    fn test_held_key_survives_autorepeat_delay() {
        let mut input = term_input();
        let mut events = Vec::new();
        let t0 = Instant::now();
        let ms = Duration::from_millis;
        input.press(5, t0, &mut events);
        input.release_stale(t0 + ms(300), &mut events);
        // first autorepeat, then the usual repeat interval
        input.press(5, t0 + ms(500), &mut events);
        input.press(5, t0 + ms(530), &mut events);
        input.release_stale(t0 + ms(600), &mut events);
        assert_eq!(events, vec![InputEvent::KeyDown(5)]);

        input.release_stale(t0 + ms(530) + KEY_REPEAT_GAP, &mut events);
        assert_eq!(events, vec![InputEvent::KeyDown(5), InputEvent::KeyUp(5)]);
    }

    #[test]
    fn test_tap_released_after_first_repeat_window() {
        let mut input = term_input();
        let mut events = Vec::new();
        let t0 = Instant::now();
        input.press(0xa, t0, &mut events);
        input.release_stale(t0 + KEY_FIRST_REPEAT - Duration::from_millis(1), &mut events);
        assert_eq!(events, vec![InputEvent::KeyDown(0xa)]);
        input.release_stale(t0 + KEY_FIRST_REPEAT, &mut events);
        assert_eq!(events, vec![InputEvent::KeyDown(0xa), InputEvent::KeyUp(0xa)]);

        // a fresh press after release is a new key-down
        input.press(0xa, t0 + Duration::from_secs(2), &mut events);
        assert_eq!(events.last(), Some(&InputEvent::KeyDown(0xa)));
    }

    #[test]
    fn test_dummy_input_batches() -> Result<(), io::Error> {
        let mut input = DummyInput::new(vec![
            vec![InputEvent::KeyDown(1), InputEvent::KeyUp(1)],
            vec![InputEvent::Quit],
        ]);
        assert_eq!(input.poll_events()?.len(), 2);
        assert_eq!(input.poll_events()?, vec![InputEvent::Quit]);
        assert!(input.poll_events()?.is_empty());
        Ok(())
    }
}
