use anyhow::Context;
use clap::Parser;
use std::fs::{self, File};
use std::path::PathBuf;

use chip8::config::{
    Config, JumpMode, Palette, Quirks, Rgb, DEFAULT_FRAME_RATE, DEFAULT_INSTRUCTIONS_PER_SECOND,
    DEFAULT_TIMER_FREQUENCY,
};
use chip8::display::MonoTermDisplay;
use chip8::emulator::Emulator;
use chip8::framebuffer::{CHIP8_DISPLAY_HEIGHT, CHIP8_DISPLAY_WIDTH};
use chip8::input::TermInput;
use chip8::scheduler::SystemClock;
use chip8::sound::{Mute, SimpleBeep, Sound};

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 interpreter for the terminal", long_about = None)]
struct Args {
    /// ROM file to run
    rom: PathBuf,

    /// Instructions per second
    #[arg(long, default_value_t = DEFAULT_INSTRUCTIONS_PER_SECOND, value_parser = clap::value_parser!(u32).range(1..))]
    ips: u32,

    /// How often the delay and sound timers count down, in Hz
    #[arg(long, default_value_t = DEFAULT_TIMER_FREQUENCY, value_parser = clap::value_parser!(u32).range(1..))]
    timer_hz: u32,

    /// Screen refreshes per second, with --decouple-display
    #[arg(long, default_value_t = DEFAULT_FRAME_RATE, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,

    /// Refresh the screen at --fps instead of after every CLS/DRW
    #[arg(long)]
    decouple_display: bool,

    /// 8XY6/8XYE copy VY into VX before shifting
    #[arg(long)]
    shift_quirk: bool,

    /// BNNN addressing
    #[arg(long, value_enum, default_value_t = JumpMode::Legacy)]
    jump_mode: JumpMode,

    /// FX55/FX65 advance I past the registers they touch
    #[arg(long)]
    load_store_quirk: bool,

    /// Colour of unlit pixels
    #[arg(long, default_value = "#000000")]
    off_color: Rgb,

    /// Colour of lit pixels
    #[arg(long, default_value = "#ffff00")]
    on_color: Rgb,

    /// Beep through the PC speaker while the sound timer runs
    #[arg(long)]
    beep: bool,

    /// Seed for the CXNN random number generator
    #[arg(long)]
    seed: Option<u64>,

    /// Log filter, e.g. "warn" or "chip8=trace"; RUST_LOG wins if set
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Write logs here instead of stderr (which the display scribbles over)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            instructions_per_second: self.ips,
            timer_frequency: self.timer_hz,
            frame_rate: self.fps,
            decouple_display: self.decouple_display,
            quirks: Quirks {
                shift_copies_source_register: self.shift_quirk,
                jump_with_offset_mode: self.jump_mode,
                load_store_advances_index: self.load_store_quirk,
            },
            palette: Palette {
                off: self.off_color,
                on: self.on_color,
            },
            sound: self.beep,
            seed: self.seed,
        }
    }
}

fn init_logging(args: &Args) -> anyhow::Result<()> {
    let env = env_logger::Env::default().default_filter_or(args.log_level.as_str());
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .with_context(|| format!("can't open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args)?;
    let config = args.config();

    // load a program before touching the terminal, so errors stay readable
    let rom = fs::read(&args.rom).with_context(|| format!("can't read {}", args.rom.display()))?;

    // initialise
    let mut display = MonoTermDisplay::new(CHIP8_DISPLAY_WIDTH, CHIP8_DISPLAY_HEIGHT, config.palette)?;
    let mut input = TermInput::new()?;
    let mut beeper = SimpleBeep::new();
    let mut mute = Mute::new();
    let sound: &mut dyn Sound = if config.sound { &mut beeper } else { &mut mute };

    let mut emulator = Emulator::new(
        &mut display,
        &mut input,
        sound,
        SystemClock::new(),
        &config,
    )?;
    emulator.load_program(&rom)?;
    emulator.run()?;
    Ok(())
}
