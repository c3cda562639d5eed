use crate::error::Error;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: u16 = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// offset of the display page from the top of RAM
const CHIP8_DISPLAY_OFFSET: u16 = 0x100;

/// where the hex digit glyphs live
pub const CHIP8_FONT_ADDR: u16 = 0x050;

/// bytes per glyph in the font
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// Represents memory map, ROM, RAM etc.
///
/// Every address is taken modulo the size of the map, the same way the
/// 12-bit address bus on the original hardware silently dropped high bits.
pub trait MemoryMap {
    /// total addressable bytes
    fn size(&self) -> usize;

    /// get a r/w slice of the underlying memory; panics if the range runs
    /// off the end, so only use with ranges checked against the layout
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8];

    /// get a r/o slice of the underlying memory; same caveat as above
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8];

    /// read one byte, wrapping the address
    fn read_byte(&self, addr: u16) -> u8 {
        let a = self.wrap(addr);
        self.get_ro_slice(a, 1)[0]
    }

    /// write one byte, wrapping the address
    fn write_byte(&mut self, addr: u16, value: u8) {
        let a = self.wrap(addr);
        self.get_rw_slice(a, 1)[0] = value;
    }

    /// get a big-endian two-byte word (instruction fetch)
    fn get_word(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.read_byte(addr), self.read_byte(addr.wrapping_add(1))])
    }

    /// write a chunk of bytes, wrapping byte by byte
    fn write(&mut self, data: &[u8], addr: u16) {
        for (offset, byte) in data.iter().enumerate() {
            self.write_byte(addr.wrapping_add(offset as u16), *byte);
        }
    }

    fn wrap(&self, addr: u16) -> u16 {
        (addr as usize % self.size()) as u16
    }
}

/// Defines the CHIP-8 standard memory map, 4K configuration:
///   0x0000-0x004f  unused
///   0x0050-0x009f  font
///   0x0200-0x0eff  program
///   0x0f00-0x0fff  display
///
/// the regions are a convention; programs can scribble anywhere
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    pub program_addr: u16,
    pub font_addr: u16,
    pub display_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn size(&self) -> usize {
        self.bytes.len()
    }
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8] {
        let a = addr as usize;
        &mut self.bytes[a..(a + len)]
    }
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8] {
        let a = addr as usize;
        &self.bytes[a..(a + len)]
    }
}

impl Chip8MemoryMap {
    /// initialises CHIP-8 memory with the font baked in
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES as usize].into_boxed_slice(),
            program_addr: CHIP8_PROGRAM_ADDR,
            font_addr: CHIP8_FONT_ADDR,
            display_addr: CHIP8_RAM_SIZE_BYTES - CHIP8_DISPLAY_OFFSET,
        };
        mm.write(&CHIP8_CONTEMPORARY_FONT, CHIP8_FONT_ADDR);
        mm
    }

    /// largest program that fits between the program base and the top of RAM
    pub fn max_program_size(&self) -> usize {
        self.bytes.len() - self.program_addr as usize
    }

    /// copy a CHIP-8 program verbatim to 0x200
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Error> {
        if program.len() > self.max_program_size() {
            return Err(Error::RomTooLarge {
                size: program.len(),
                max_size: self.max_program_size(),
            });
        }
        let addr = self.program_addr;
        self.get_rw_slice(addr, program.len()).copy_from_slice(program);
        Ok(())
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

const CHIP8_CONTEMPORARY_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        // NB. memory is zeroed from 0x200 because before that we bake in the
        //     font
        assert_eq!(m.bytes[0x200..], [0; 0xe00]);
    }

    #[test]
    fn test_font_loaded() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_ro_slice(0x050, 5), &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        // glyph F is the last one
        assert_eq!(m.get_ro_slice(0x050 + 15 * 5, 5), &[0xF0, 0x80, 0xF0, 0x80, 0x80]);
    }

    #[test]
    fn test_write_slice_ok() {
        let mut dst = Chip8MemoryMap::new();
        dst.write(&[0, 1, 2, 3, 4, 5, 6, 7], 8);
        assert_eq!(
            dst.bytes[..16],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
    }

    #[test]
    fn test_read_ro() {
        let m = Chip8MemoryMap::new();
        let s = m.get_ro_slice(0, 8);
        assert_eq!(s, &[0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_read_word() {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x300);
        assert_eq!(m.get_word(0x304), 0x0405);
    }

    #[test]
    fn test_addresses_wrap() {
        let mut m = Chip8MemoryMap::new();
        m.write_byte(0x1000, 0xab);
        assert_eq!(m.read_byte(0x0000), 0xab);
        m.write(&[0x12, 0x34], 0x0fff);
        assert_eq!(m.read_byte(0x0fff), 0x12);
        assert_eq!(m.get_word(0x0fff), 0x1234);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Error> {
        let mut dst = Chip8MemoryMap::new();
        dst.load_program(&[0x00, 0xe0])?; // clear screen
        assert_eq!(dst.get_ro_slice(0x200, 2), &[0x00, 0xe0]);
        Ok(())
    }

    #[test]
    fn test_program_too_big() {
        let mut dst = Chip8MemoryMap::new();
        let prog = vec![0u8; 0xe01];
        match dst.load_program(&prog) {
            Err(Error::RomTooLarge { size, max_size }) => {
                assert_eq!(size, 0xe01);
                assert_eq!(max_size, 0xe00);
            }
            _ => panic!("oversized program should be rejected"),
        }
    }

    #[test]
    fn test_mem_layout() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.program_addr, 0x0200);
        assert_eq!(m.font_addr, 0x0050);
        assert_eq!(m.display_addr, 0x0f00);
    }
}
