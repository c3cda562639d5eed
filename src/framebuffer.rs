use crate::memory::MemoryMap;

pub const CHIP8_DISPLAY_WIDTH: usize = 64;
pub const CHIP8_DISPLAY_HEIGHT: usize = 32;

/// A window onto the display page of memory. Pixels are packed 8 to a byte,
/// MSB first, row-major, so a 64x32 screen is 256 bytes.
#[derive(Debug, Clone, Copy)]
pub struct Framebuffer {
    base: u16,
    width: usize,
    height: usize,
}

impl Framebuffer {
    pub fn new(base: u16) -> Self {
        Framebuffer {
            base,
            width: CHIP8_DISPLAY_WIDTH,
            height: CHIP8_DISPLAY_HEIGHT,
        }
    }

    pub fn byte_count(&self) -> usize {
        self.width * self.height / 8
    }

    /// memory address of the byte holding (x, y), and the bit within it
    pub fn pixel_addr(&self, x: usize, y: usize) -> (u16, u8) {
        let byte = self.base as usize + y * (self.width / 8) + x / 8;
        (byte as u16, 7 - (x % 8) as u8)
    }

    pub fn pixel(&self, mem: &impl MemoryMap, x: usize, y: usize) -> bool {
        let (addr, bit) = self.pixel_addr(x, y);
        (mem.read_byte(addr) >> bit) & 1 == 1
    }

    /// XOR one pixel; true if it was lit beforehand
    fn toggle(&self, mem: &mut impl MemoryMap, x: usize, y: usize) -> bool {
        let (addr, bit) = self.pixel_addr(x, y);
        let byte = mem.read_byte(addr);
        mem.write_byte(addr, byte ^ (1 << bit));
        (byte >> bit) & 1 == 1
    }

    pub fn clear(&self, mem: &mut impl MemoryMap) {
        mem.get_rw_slice(self.base, self.byte_count()).fill(0);
    }

    /// XOR an 8-pixel-wide sprite of `rows` bytes read from `sprite_addr`
    /// onto the screen. The origin wraps, the sprite itself clips at the
    /// right and bottom edges. Returns true if any lit pixel got erased.
    pub fn draw_sprite(
        &self,
        mem: &mut impl MemoryMap,
        x: u8,
        y: u8,
        sprite_addr: u16,
        rows: u8,
    ) -> bool {
        let origin_x = x as usize % self.width;
        let origin_y = y as usize % self.height;
        let mut collision = false;

        for row in 0..rows as usize {
            let py = origin_y + row;
            if py >= self.height {
                break;
            }
            let sprite = mem.read_byte(sprite_addr.wrapping_add(row as u16));
            for col in 0..8 {
                let px = origin_x + col;
                if px >= self.width {
                    break;
                }
                if (sprite >> (7 - col)) & 1 == 1 && self.toggle(mem, px, py) {
                    collision = true;
                }
            }
        }
        collision
    }

    /// raw packed bits, for handing to a renderer
    pub fn data<'a>(&self, mem: &'a impl MemoryMap) -> &'a [u8] {
        mem.get_ro_slice(self.base, self.byte_count())
    }
}
