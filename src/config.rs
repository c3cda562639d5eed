use std::fmt;
use std::str::FromStr;

pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 700;
pub const DEFAULT_TIMER_FREQUENCY: u32 = 60;
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// addressing used by BNNN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum JumpMode {
    /// PC <- NNN + V0, as on the COSMAC VIP
    #[default]
    Legacy,
    /// PC <- XNN + VX, as on the SUPER-CHIP
    Indexed,
}

/// switches between the original interpreter's behaviour and later
/// conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Quirks {
    /// 8XY6/8XYE copy VY into VX before shifting
    pub shift_copies_source_register: bool,
    pub jump_with_offset_mode: JumpMode,
    /// FX55/FX65 leave I pointing past the last register touched
    pub load_store_advances_index: bool,
}

/// 24-bit colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl FromStr for Rgb {
    type Err = String;

    /// accepts `rrggbb` with or without a leading `#`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("expected a colour like #ffff00, got {:?}", s));
        }
        let value = u32::from_str_radix(hex, 16).map_err(|e| e.to_string())?;
        Ok(Rgb((value >> 16) as u8, (value >> 8) as u8, value as u8))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub off: Rgb,
    pub on: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            off: Rgb(0x00, 0x00, 0x00),
            on: Rgb(0xff, 0xff, 0x00),
        }
    }
}

/// Everything tunable about a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub instructions_per_second: u32,
    pub timer_frequency: u32,
    /// only consulted when `decouple_display` is set
    pub frame_rate: u32,
    /// refresh the screen on its own clock instead of after every CLS/DRW
    pub decouple_display: bool,
    pub quirks: Quirks,
    pub palette: Palette,
    /// drive the PC speaker while the sound timer runs
    pub sound: bool,
    /// fixed seed for CXNN, for reproducible runs
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            instructions_per_second: DEFAULT_INSTRUCTIONS_PER_SECOND,
            timer_frequency: DEFAULT_TIMER_FREQUENCY,
            frame_rate: DEFAULT_FRAME_RATE,
            decouple_display: false,
            quirks: Quirks::default(),
            palette: Palette::default(),
            sound: false,
            seed: None,
        }
    }
}
