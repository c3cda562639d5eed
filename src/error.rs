use std::io;
use thiserror::Error;

/// Faults raised by the things the interpreter talks to. Misbehaving CHIP-8
/// programs never produce one of these; they just get logged.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("time source failed: {0}")]
    Clock(String),

    #[error("sound device failed: {0}")]
    Sound(String),
}
