//!
//! ## Design
//!
//! * bit-exact CHIP-8 arithmetic: VF as carry/borrow/shift-out/collision flag
//! * the display lives in RAM (0xf00-0xfff), packed 8 pixels to the byte,
//!   the way the COSMAC VIP kept it
//! * quirks (shift source, BNNN addressing, FX55/FX65 index advance) are
//!   switches, not forks of the interpreter
//! * abstract display, input and sound so can plug alternatives; starting
//!   with TUI in-console
//! * no threads. one loop owns everything and polls a clock
//!
//! Model
//!
//! ```text
//! Emulator
//!  |-- input, sound, clock, config
//!  |-- interpreter(display, memory, stack, keypad, quirks)
//!  |    |-- instruction set (decode -> Instruction, then dispatch)
//!  |    `-- framebuffer view over the display page
//!  `-- main loop
//!       |-- drain input events into the keypad (FX0A capture happens here)
//!       |-- scheduler.poll(now):
//!       |     instruction gate -> interpreter.step()   (~700Hz)
//!       |     timer gate       -> interpreter.tick_timers() (60Hz)
//!       |     frame gate       -> interpreter.refresh() (only if decoupled)
//!       |-- start/stop the beeper on sound timer edges
//!       `-- nap until the next gate is due (at most 1ms)
//! ```
//!
//! Each gate fires at most once per poll. When the loop falls behind the
//! schedule drifts; nothing is replayed in a burst.
pub mod config;
pub mod display;
pub mod emulator;
pub mod error;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod keypad;
pub mod memory;
pub mod scheduler;
pub mod sound;
pub mod stack;

pub use error::Error;
