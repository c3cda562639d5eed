use crate::config::{Palette, Rgb};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// Display is used by the interpreter to present the framebuffer. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work.
pub trait Display {
    /// draw data based on internal resolution of display
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error>;
}

// store useful metadata about the screen: width, height, bitplanes
struct Resolution(usize, usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }
    fn byte_count(&self) -> usize {
        self.0 * self.1 * self.2 / 8
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    fn bitplane_from_data<'a>(
        &self,
        data: &'a [u8],
        bitplane: u8,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let mut count = self.pixel_count();
        let w = self.0;
        std::iter::from_fn(move || {
            while count > 0 {
                count -= 1;
                let bit = 1 & (data[count / 8] >> (7 - count % 8));
                if bit == bitplane {
                    return Some((
                        (count % w) as f64,        // x
                        -1.0 * (count / w) as f64, // y
                    ));
                }
            }
            None
        })
    }
}

fn tui_colour(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
    off: Color,
    on: Color,
}

impl MonoTermDisplay {
    pub fn new(x: usize, y: usize, palette: Palette) -> Result<MonoTermDisplay, io::Error> {
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(x, y, 1),
            off: tui_colour(palette.off),
            on: tui_colour(palette.on),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        // best effort; there's nowhere left to report a failure to
        let _ = self.terminal.show_cursor();
        let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen);
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error> {
        // make sure we're given exactly the right amount of data to draw
        assert_eq!(
            data.len(),
            self.resolution.byte_count(),
            "MonoTermDisplay must have correct-sized data to draw"
        );

        let resolution = &self.resolution;
        let (off, on) = (self.off, self.on);
        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(off)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    // expand each bitplane into x, y float coords, suitable for
                    // rendering with TUI
                    ctx.draw(&Points {
                        coords: &resolution.bitplane_from_data(data, 0).collect::<Vec<_>>(),
                        color: off,
                    });
                    ctx.draw(&Points {
                        coords: &resolution.bitplane_from_data(data, 1).collect::<Vec<_>>(),
                        color: on,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; remembers what it was last shown
pub struct DummyDisplay {
    pub frames: usize,
    pub last: Vec<u8>,
}

impl DummyDisplay {
    pub fn new() -> Self {
        DummyDisplay {
            frames: 0,
            last: Vec::new(),
        }
    }
}

impl Default for DummyDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error> {
        self.frames += 1;
        self.last = data.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_count() {
        let r = Resolution(64, 32, 1);
        assert_eq!(r.pixel_count(), 2048)
    }

    #[test]
    fn test_byte_count() {
        let r = Resolution(64, 32, 1);
        assert_eq!(r.byte_count(), 256)
    }

    #[test]
    fn test_x_bounds() {
        let r = Resolution(64, 32, 1);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let r = Resolution(64, 32, 1);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_bitplanes_partition_pixels() {
        let r = Resolution(64, 32, 1);
        let mut data = [0u8; 256];
        data[0] = 0b1000_0001;
        data[255] = 0b0000_0001;
        let lit: Vec<_> = r.bitplane_from_data(&data, 1).collect();
        assert_eq!(lit, vec![(63.0, -31.0), (7.0, 0.0), (0.0, 0.0)]);
        assert_eq!(r.bitplane_from_data(&data, 0).count(), 2048 - 3);
    }

    #[test]
    fn test_tui_colour() {
        assert_eq!(tui_colour(Rgb(1, 2, 3)), Color::Rgb(1, 2, 3));
    }

    #[test]
    fn test_dummy_records_frames() -> Result<(), io::Error> {
        let mut d = DummyDisplay::new();
        d.draw(&[1, 2, 3])?;
        d.draw(&[4])?;
        assert_eq!(d.frames, 2);
        assert_eq!(d.last, vec![4]);
        Ok(())
    }
}
