use log::warn;

/// keys 0x0-0xf on the COSMAC hex keypad
pub const CHIP8_KEY_COUNT: usize = 16;

/// Progress of the FX0A "wait for key" instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwaitKey {
    Idle,
    AwaitingPress,
    Captured(u8),
}

/// Up/down state of the 16 keys, plus the FX0A capture machine.
#[derive(Debug, Clone)]
pub struct Keypad {
    down: [bool; CHIP8_KEY_COUNT],
    await_key: AwaitKey,
}

impl Keypad {
    pub fn new() -> Self {
        Keypad {
            down: [false; CHIP8_KEY_COUNT],
            await_key: AwaitKey::Idle,
        }
    }

    /// a key went down. only a fresh press (key was up) can satisfy a
    /// pending FX0A, and only the first one before it gets consumed
    pub fn key_down(&mut self, key: u8) {
        let Some(state) = self.down.get_mut(key as usize) else {
            warn!("ignoring key down for unknown key {:#x}", key);
            return;
        };
        let was_down = *state;
        *state = true;
        if !was_down && self.await_key == AwaitKey::AwaitingPress {
            self.await_key = AwaitKey::Captured(key);
        }
    }

    /// a key went up; always clears, whatever FX0A is doing
    pub fn key_up(&mut self, key: u8) {
        match self.down.get_mut(key as usize) {
            Some(state) => *state = false,
            None => warn!("ignoring key up for unknown key {:#x}", key),
        }
    }

    /// None for keys that don't exist on the keypad
    pub fn is_down(&self, key: u8) -> Option<bool> {
        self.down.get(key as usize).copied()
    }

    pub fn await_state(&self) -> AwaitKey {
        self.await_key
    }

    /// drive the FX0A machine one step. Some(key) means the wait is over;
    /// None means the instruction has to be retried
    pub fn poll_await(&mut self) -> Option<u8> {
        match self.await_key {
            AwaitKey::Idle => {
                self.await_key = AwaitKey::AwaitingPress;
                None
            }
            AwaitKey::AwaitingPress => None,
            AwaitKey::Captured(key) => {
                self.await_key = AwaitKey::Idle;
                Some(key)
            }
        }
    }
}

impl Default for Keypad {
    fn default() -> Self {
        Self::new()
    }
}
