use crate::config::Config;
use crate::display::Display;
use crate::error::Error;
use crate::input::{Input, InputEvent};
use crate::interpreter::Chip8Interpreter;
use crate::scheduler::{Clock, Fired, Scheduler};
use crate::sound::Sound;
use log::info;
use std::time::Duration;

/// longest the loop naps between polls, so input stays responsive
const MAX_IDLE: Duration = Duration::from_millis(1);

/// The main loop: drain input, let the scheduler fire whatever is due, keep
/// the beeper in step with the sound timer, repeat until asked to quit.
/// Everything runs on this one thread, one piece at a time.
pub struct Emulator<'a, C: Clock> {
    interpreter: Chip8Interpreter<'a>,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    clock: C,
    scheduler: Scheduler,
    beeping: bool,
    quit: bool,
}

impl<'a, C: Clock> Emulator<'a, C> {
    pub fn new(
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
        mut clock: C,
        config: &Config,
    ) -> Result<Self, Error> {
        let scheduler = Scheduler::new(config, clock.now()?);
        Ok(Emulator {
            interpreter: Chip8Interpreter::new(display, config),
            input,
            sound,
            clock,
            scheduler,
            beeping: false,
            quit: false,
        })
    }

    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Error> {
        self.interpreter.load_program(program)?;
        info!("loaded {} byte program", program.len());
        Ok(())
    }

    pub fn interpreter(&self) -> &Chip8Interpreter<'a> {
        &self.interpreter
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// one pass of the loop
    pub fn run_once(&mut self) -> Result<Fired, Error> {
        for event in self.input.poll_events()? {
            match event {
                InputEvent::KeyDown(key) => self.interpreter.key_down(key),
                InputEvent::KeyUp(key) => self.interpreter.key_up(key),
                InputEvent::Quit => self.quit = true,
            }
        }

        let now = self.clock.now()?;
        let fired = self.scheduler.poll(now, &mut self.interpreter)?;
        self.update_sound()?;
        Ok(fired)
    }

    /// run until the input says quit
    pub fn run(&mut self) -> Result<(), Error> {
        info!("starting");
        self.interpreter.refresh()?;
        while !self.quit {
            self.run_once()?;
            let now = self.clock.now()?;
            let idle = self.scheduler.until_next(now).min(MAX_IDLE);
            if !idle.is_zero() {
                spin_sleep::sleep(idle);
            }
        }
        if self.beeping {
            self.sound.stop().map_err(|e| Error::Sound(e.to_string()))?;
        }
        info!("quit requested, stopping");
        Ok(())
    }

    fn update_sound(&mut self) -> Result<(), Error> {
        let active = self.interpreter.sound_active();
        if active != self.beeping {
            let result = if active {
                self.sound.beep()
            } else {
                self.sound.stop()
            };
            result.map_err(|e| Error::Sound(e.to_string()))?;
            self.beeping = active;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DummyDisplay;
    use crate::input::DummyInput;
    use crate::keypad::AwaitKey;
    use crate::memory::CHIP8_PROGRAM_ADDR;
    use crate::scheduler::ManualClock;
    use crate::sound::Mute;

    fn seeded() -> Config {
        Config {
            seed: Some(1),
            ..Config::default()
        }
    }

    #[test]
    fn test_await_key_across_polls() -> Result<(), Error> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![
            vec![],
            vec![],
            vec![],
            vec![],
            vec![InputEvent::KeyDown(0xc)],
            vec![InputEvent::KeyUp(0xc)],
        ]);
        let mut sound = Mute::new();
        let clock = ManualClock::new();
        let mut emu = Emulator::new(&mut display, &mut input, &mut sound, clock.clone(), &seeded())?;
        emu.load_program(&[0xf5, 0x0a, 0x00, 0xe0])?;

        for _ in 0..4 {
            clock.advance(Duration::from_millis(2));
            assert!(emu.run_once()?.instruction);
            assert_eq!(emu.interpreter().program_counter(), CHIP8_PROGRAM_ADDR);
        }
        assert_eq!(emu.interpreter().await_state(), AwaitKey::AwaitingPress);

        clock.advance(Duration::from_millis(2));
        emu.run_once()?;
        assert_eq!(emu.interpreter().program_counter(), CHIP8_PROGRAM_ADDR + 2);
        assert_eq!(emu.interpreter().register(5), 0xc);
        assert_eq!(emu.interpreter().await_state(), AwaitKey::Idle);
        Ok(())
    }

    #[test]
    fn test_no_instruction_before_period() -> Result<(), Error> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        let mut sound = Mute::new();
        let clock = ManualClock::new();
        let mut emu = Emulator::new(&mut display, &mut input, &mut sound, clock.clone(), &seeded())?;
        emu.load_program(&[0x60, 0x01])?;
        clock.advance(Duration::from_micros(500));
        assert!(!emu.run_once()?.instruction);
        assert_eq!(emu.interpreter().program_counter(), CHIP8_PROGRAM_ADDR);
        Ok(())
    }

    #[test]
    fn test_beeper_follows_sound_timer() -> Result<(), Error> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        let mut sound = Mute::new();
        let clock = ManualClock::new();
        {
            let mut emu =
                Emulator::new(&mut display, &mut input, &mut sound, clock.clone(), &seeded())?;
            // LD V3, 3; LD ST, V3; then spin on a jump
            emu.load_program(&[0x63, 0x03, 0xf3, 0x18, 0x12, 0x04])?;
            for _ in 0..6 {
                clock.advance(Duration::from_millis(20));
                emu.run_once()?;
            }
            assert_eq!(emu.interpreter().sound_timer(), 0);
        }
        assert_eq!(sound.beeps, 1);
        assert_eq!(sound.stops, 1);
        Ok(())
    }

    #[test]
    fn test_quit_ends_run() -> Result<(), Error> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![vec![InputEvent::Quit]]);
        let mut sound = Mute::new();
        let clock = ManualClock::new();
        {
            let mut emu =
                Emulator::new(&mut display, &mut input, &mut sound, clock.clone(), &seeded())?;
            emu.load_program(&[0x12, 0x00])?;
            emu.run()?;
            assert!(emu.quit_requested());
        }
        // the initial frame goes out before the loop starts
        assert_eq!(display.frames, 1);
        Ok(())
    }

    #[test]
    fn test_decoupled_frames() -> Result<(), Error> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        let mut sound = Mute::new();
        let clock = ManualClock::new();
        let config = Config {
            decouple_display: true,
            ..seeded()
        };
        {
            let mut emu = Emulator::new(&mut display, &mut input, &mut sound, clock.clone(), &config)?;
            // CLS forever
            emu.load_program(&[0x00, 0xe0, 0x12, 0x00])?;
            for _ in 0..10 {
                clock.advance(Duration::from_millis(17));
                emu.run_once()?;
            }
        }
        // one present per 60Hz frame, none from the CLS itself
        assert_eq!(display.frames, 10);
        Ok(())
    }
}
