//! # interpreter
//!
//! The CHIP-8 virtual machine proper: sixteen 8-bit V registers (VF doubles
//! as the carry/borrow/collision flag), a 16-bit I pointer, the program
//! counter, the delay and sound timers, a 16-deep call stack and the keypad.
//! Memory, including the display page, lives in a `Chip8MemoryMap`.
//!
//! `step` runs exactly one instruction. Pacing is somebody else's problem;
//! see the scheduler.

use crate::config::{Config, JumpMode, Quirks};
use crate::display;
use crate::error::Error;
use crate::framebuffer::Framebuffer;
use crate::instruction::Instruction;
use crate::keypad::{AwaitKey, Keypad};
use crate::memory::{self, MemoryMap, CHIP8_FONT_GLYPH_BYTES};
use crate::scheduler::Clocked;
use crate::stack::{CallStack, StackFault};
use log::{trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const VF: usize = 0xf;

/// what a single call to `step` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Executed(Instruction),
    /// FX0A is still waiting; the PC has been wound back onto it
    AwaitingKey,
    /// unrecognised word, skipped over
    Ignored(u16),
    /// ran, but the call stack was full (2NNN) or empty (00EE)
    StackFault(Instruction, StackFault),
}

pub struct Chip8Interpreter<'a> {
    memory: memory::Chip8MemoryMap,
    framebuffer: Framebuffer,
    display: &'a mut dyn display::Display,
    stack: CallStack,
    keypad: Keypad,
    v: [u8; 16],
    i: u16,
    program_counter: u16,
    delay_timer: u8,
    sound_timer: u8,
    quirks: Quirks,
    decouple_display: bool,
    rng: StdRng,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(display: &'a mut dyn display::Display, config: &Config) -> Chip8Interpreter<'a> {
        let memory = memory::Chip8MemoryMap::new();
        let framebuffer = Framebuffer::new(memory.display_addr);
        let program_counter = memory.program_addr;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8Interpreter {
            memory,
            framebuffer,
            display,
            stack: CallStack::new(),
            keypad: Keypad::new(),
            v: [0; 16],
            i: 0,
            program_counter,
            delay_timer: 0,
            sound_timer: 0,
            quirks: config.quirks,
            decouple_display: config.decouple_display,
            rng,
        }
    }

    /// load a chip8 program
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Error> {
        self.memory.load_program(program)
    }

    /// push the framebuffer out to the display
    pub fn refresh(&mut self) -> Result<(), Error> {
        self.display.draw(self.framebuffer.data(&self.memory))?;
        Ok(())
    }

    /// count both timers down towards zero
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    pub fn key_down(&mut self, key: u8) {
        self.keypad.key_down(key);
    }

    pub fn key_up(&mut self, key: u8) {
        self.keypad.key_up(key);
    }

    /// VX; only the low nibble of `x` names the register
    pub fn register(&self, x: u8) -> u8 {
        self.v[(x & 0xf) as usize]
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn await_state(&self) -> AwaitKey {
        self.keypad.await_state()
    }

    pub fn framebuffer(&self) -> &[u8] {
        self.framebuffer.data(&self.memory)
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.framebuffer.pixel(&self.memory, x, y)
    }

    /// fetch, decode and execute one instruction
    pub fn step(&mut self) -> Result<Step, Error> {
        let pc = self.program_counter;
        let word = self.memory.get_word(pc);
        self.program_counter = pc.wrapping_add(2);

        let Some(instruction) = Instruction::decode(word) else {
            warn!("ignoring unknown instruction {:#06x} at {:#05x}", word, pc);
            return Ok(Step::Ignored(word));
        };
        trace!("{:#05x}: {:04x}  {}", pc, word, instruction);

        self.dispatch(instruction, word, pc)
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.program_counter = self.program_counter.wrapping_add(2);
        }
    }

    /// look up a key named by a register; None (and a warning) if there's
    /// no such key
    fn key_state(&self, x: u8, word: u16, pc: u16) -> Option<bool> {
        let key = self.v[x as usize];
        let state = self.keypad.is_down(key);
        if state.is_none() {
            warn!(
                "{:#06x} at {:#05x} asked about key {:#04x}, which doesn't exist",
                word, pc, key
            );
        }
        state
    }

    fn dispatch(&mut self, instruction: Instruction, word: u16, pc: u16) -> Result<Step, Error> {
        use Instruction::*;

        match instruction {
            Cls => {
                self.framebuffer.clear(&mut self.memory);
                if !self.decouple_display {
                    self.refresh()?;
                }
            }
            Ret => match self.stack.pop() {
                Ok(addr) => self.program_counter = addr,
                Err(fault) => {
                    warn!("{:?} returning at {:#05x}, jumping to 0", fault, pc);
                    self.program_counter = 0;
                    return Ok(Step::StackFault(instruction, fault));
                }
            },
            Jump(nnn) => self.program_counter = nnn,
            Call(nnn) => {
                let pushed = self.stack.push(self.program_counter);
                self.program_counter = nnn;
                if let Err(fault) = pushed {
                    warn!("{:?} calling {:#05x} from {:#05x}", fault, nnn, pc);
                    return Ok(Step::StackFault(instruction, fault));
                }
            }
            SkipEqImm(x, nn) => self.skip_if(self.v[x as usize] == nn),
            SkipNeImm(x, nn) => self.skip_if(self.v[x as usize] != nn),
            SkipEqReg(x, y) => self.skip_if(self.v[x as usize] == self.v[y as usize]),
            SkipNeReg(x, y) => self.skip_if(self.v[x as usize] != self.v[y as usize]),
            LoadImm(x, nn) => self.v[x as usize] = nn,
            AddImm(x, nn) => self.v[x as usize] = self.v[x as usize].wrapping_add(nn),
            Move(x, y) => self.v[x as usize] = self.v[y as usize],
            Or(x, y) => self.v[x as usize] |= self.v[y as usize],
            And(x, y) => self.v[x as usize] &= self.v[y as usize],
            Xor(x, y) => self.v[x as usize] ^= self.v[y as usize],
            AddReg(x, y) => {
                let (sum, carry) = self.v[x as usize].overflowing_add(self.v[y as usize]);
                self.v[x as usize] = sum;
                self.v[VF] = carry as u8;
            }
            Sub(x, y) => {
                let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
                self.v[x as usize] = vx.wrapping_sub(vy);
                self.v[VF] = (vx >= vy) as u8;
            }
            SubReverse(x, y) => {
                let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
                self.v[x as usize] = vy.wrapping_sub(vx);
                self.v[VF] = (vy >= vx) as u8;
            }
            ShiftRight(x, y) => {
                if self.quirks.shift_copies_source_register {
                    self.v[x as usize] = self.v[y as usize];
                }
                let vx = self.v[x as usize];
                self.v[x as usize] = vx >> 1;
                self.v[VF] = vx & 0x01;
            }
            ShiftLeft(x, y) => {
                if self.quirks.shift_copies_source_register {
                    self.v[x as usize] = self.v[y as usize];
                }
                let vx = self.v[x as usize];
                self.v[x as usize] = vx << 1;
                self.v[VF] = vx >> 7;
            }
            LoadIndex(nnn) => self.i = nnn,
            JumpOffset(x, nnn) => {
                let offset = match self.quirks.jump_with_offset_mode {
                    JumpMode::Legacy => self.v[0],
                    JumpMode::Indexed => self.v[x as usize],
                };
                self.program_counter = nnn + offset as u16;
            }
            Random(x, nn) => self.v[x as usize] = self.rng.gen::<u8>() & nn,
            Draw(x, y, n) => {
                let collision = self.framebuffer.draw_sprite(
                    &mut self.memory,
                    self.v[x as usize],
                    self.v[y as usize],
                    self.i,
                    n,
                );
                self.v[VF] = collision as u8;
                if !self.decouple_display {
                    self.refresh()?;
                }
            }
            SkipKeyDown(x) => {
                if let Some(down) = self.key_state(x, word, pc) {
                    self.skip_if(down);
                }
            }
            SkipKeyUp(x) => {
                if let Some(down) = self.key_state(x, word, pc) {
                    self.skip_if(!down);
                }
            }
            GetDelay(x) => self.v[x as usize] = self.delay_timer,
            SetDelay(x) => self.delay_timer = self.v[x as usize],
            SetSound(x) => self.sound_timer = self.v[x as usize],
            AddIndex(x) => {
                self.i = self.i.wrapping_add(self.v[x as usize] as u16);
                if self.i as usize >= self.memory.size() {
                    self.v[VF] = 1;
                }
            }
            WaitKey(x) => match self.keypad.poll_await() {
                Some(key) => self.v[x as usize] = key,
                None => {
                    self.program_counter = pc;
                    return Ok(Step::AwaitingKey);
                }
            },
            FontChar(x) => {
                self.i = self.memory.font_addr + CHIP8_FONT_GLYPH_BYTES * self.v[x as usize] as u16;
            }
            Bcd(x) => {
                let vx = self.v[x as usize];
                self.memory.write(&[vx / 100, (vx / 10) % 10, vx % 10], self.i);
            }
            Store(x) => {
                for r in 0..=x as usize {
                    self.memory.write_byte(self.i.wrapping_add(r as u16), self.v[r]);
                }
                if self.quirks.load_store_advances_index {
                    self.i = self.i.wrapping_add(x as u16 + 1);
                }
            }
            Load(x) => {
                for r in 0..=x as usize {
                    self.v[r] = self.memory.read_byte(self.i.wrapping_add(r as u16));
                }
                if self.quirks.load_store_advances_index {
                    self.i = self.i.wrapping_add(x as u16 + 1);
                }
            }
        }
        Ok(Step::Executed(instruction))
    }
}

impl<'a> Clocked for Chip8Interpreter<'a> {
    fn execute(&mut self) -> Result<(), Error> {
        self.step().map(|_| ())
    }

    fn tick(&mut self) {
        self.tick_timers();
    }

    fn present(&mut self) -> Result<(), Error> {
        self.refresh()
    }
}
