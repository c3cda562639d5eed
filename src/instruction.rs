use std::fmt;

/// One decoded CHIP-8 instruction. Register operands are 4-bit indices,
/// addresses are 12 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipEqImm(u8, u8),
    /// 4XNN
    SkipNeImm(u8, u8),
    /// 5XY0
    SkipEqReg(u8, u8),
    /// 6XNN
    LoadImm(u8, u8),
    /// 7XNN
    AddImm(u8, u8),
    /// 8XY0
    Move(u8, u8),
    /// 8XY1
    Or(u8, u8),
    /// 8XY2
    And(u8, u8),
    /// 8XY3
    Xor(u8, u8),
    /// 8XY4
    AddReg(u8, u8),
    /// 8XY5
    Sub(u8, u8),
    /// 8XY6
    ShiftRight(u8, u8),
    /// 8XY7
    SubReverse(u8, u8),
    /// 8XYE
    ShiftLeft(u8, u8),
    /// 9XY0
    SkipNeReg(u8, u8),
    /// ANNN
    LoadIndex(u16),
    /// BNNN; X is only meaningful in indexed jump mode
    JumpOffset(u8, u16),
    /// CXNN
    Random(u8, u8),
    /// DXYN
    Draw(u8, u8, u8),
    /// EX9E
    SkipKeyDown(u8),
    /// EXA1
    SkipKeyUp(u8),
    /// FX07
    GetDelay(u8),
    /// FX0A
    WaitKey(u8),
    /// FX15
    SetDelay(u8),
    /// FX18
    SetSound(u8),
    /// FX1E
    AddIndex(u8),
    /// FX29
    FontChar(u8),
    /// FX33
    Bcd(u8),
    /// FX55
    Store(u8),
    /// FX65
    Load(u8),
}

impl Instruction {
    /// decode a big-endian instruction word; None for anything the machine
    /// doesn't know
    pub fn decode(word: u16) -> Option<Instruction> {
        use Instruction::*;

        let x = ((word & 0x0f00) >> 8) as u8;
        let y = ((word & 0x00f0) >> 4) as u8;
        let n = (word & 0x000f) as u8;
        let nn = (word & 0x00ff) as u8;
        let nnn = word & 0x0fff;

        let instruction = match word >> 12 {
            0x0 => match word {
                0x00e0 => Cls,
                0x00ee => Ret,
                _ => return None,
            },
            0x1 => Jump(nnn),
            0x2 => Call(nnn),
            0x3 => SkipEqImm(x, nn),
            0x4 => SkipNeImm(x, nn),
            0x5 if n == 0 => SkipEqReg(x, y),
            0x6 => LoadImm(x, nn),
            0x7 => AddImm(x, nn),
            0x8 => match n {
                0x0 => Move(x, y),
                0x1 => Or(x, y),
                0x2 => And(x, y),
                0x3 => Xor(x, y),
                0x4 => AddReg(x, y),
                0x5 => Sub(x, y),
                0x6 => ShiftRight(x, y),
                0x7 => SubReverse(x, y),
                0xe => ShiftLeft(x, y),
                _ => return None,
            },
            0x9 if n == 0 => SkipNeReg(x, y),
            0xa => LoadIndex(nnn),
            0xb => JumpOffset(x, nnn),
            0xc => Random(x, nn),
            0xd => Draw(x, y, n),
            0xe => match nn {
                0x9e => SkipKeyDown(x),
                0xa1 => SkipKeyUp(x),
                _ => return None,
            },
            0xf => match nn {
                0x07 => GetDelay(x),
                0x0a => WaitKey(x),
                0x15 => SetDelay(x),
                0x18 => SetSound(x),
                0x1e => AddIndex(x),
                0x29 => FontChar(x),
                0x33 => Bcd(x),
                0x55 => Store(x),
                0x65 => Load(x),
                _ => return None,
            },
            _ => return None,
        };
        Some(instruction)
    }
}

/// conventional (Cowgod-style) mnemonics, used in trace logs
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jump(a) => write!(f, "JP {:#05x}", a),
            Call(a) => write!(f, "CALL {:#05x}", a),
            SkipEqImm(x, nn) => write!(f, "SE V{:X}, {:#04x}", x, nn),
            SkipNeImm(x, nn) => write!(f, "SNE V{:X}, {:#04x}", x, nn),
            SkipEqReg(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadImm(x, nn) => write!(f, "LD V{:X}, {:#04x}", x, nn),
            AddImm(x, nn) => write!(f, "ADD V{:X}, {:#04x}", x, nn),
            Move(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight(x, y) => write!(f, "SHR V{:X}, V{:X}", x, y),
            SubReverse(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft(x, y) => write!(f, "SHL V{:X}, V{:X}", x, y),
            SkipNeReg(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex(a) => write!(f, "LD I, {:#05x}", a),
            JumpOffset(_, a) => write!(f, "JP V0, {:#05x}", a),
            Random(x, nn) => write!(f, "RND V{:X}, {:#04x}", x, nn),
            Draw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipKeyDown(x) => write!(f, "SKP V{:X}", x),
            SkipKeyUp(x) => write!(f, "SKNP V{:X}", x),
            GetDelay(x) => write!(f, "LD V{:X}, DT", x),
            WaitKey(x) => write!(f, "LD V{:X}, K", x),
            SetDelay(x) => write!(f, "LD DT, V{:X}", x),
            SetSound(x) => write!(f, "LD ST, V{:X}", x),
            AddIndex(x) => write!(f, "ADD I, V{:X}", x),
            FontChar(x) => write!(f, "LD F, V{:X}", x),
            Bcd(x) => write!(f, "LD B, V{:X}", x),
            Store(x) => write!(f, "LD [I], V{:X}", x),
            Load(x) => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Instruction::*;
    use super::*;

    #[test]
    fn test_decode_fields() {
        assert_eq!(Instruction::decode(0x00e0), Some(Cls));
        assert_eq!(Instruction::decode(0x00ee), Some(Ret));
        assert_eq!(Instruction::decode(0x1abc), Some(Jump(0xabc)));
        assert_eq!(Instruction::decode(0x2123), Some(Call(0x123)));
        assert_eq!(Instruction::decode(0x3a42), Some(SkipEqImm(0xa, 0x42)));
        assert_eq!(Instruction::decode(0x5120), Some(SkipEqReg(1, 2)));
        assert_eq!(Instruction::decode(0x8ab4), Some(AddReg(0xa, 0xb)));
        assert_eq!(Instruction::decode(0x8abe), Some(ShiftLeft(0xa, 0xb)));
        assert_eq!(Instruction::decode(0xb3f0), Some(JumpOffset(3, 0x3f0)));
        assert_eq!(Instruction::decode(0xd125), Some(Draw(1, 2, 5)));
        assert_eq!(Instruction::decode(0xe29e), Some(SkipKeyDown(2)));
        assert_eq!(Instruction::decode(0xf40a), Some(WaitKey(4)));
        assert_eq!(Instruction::decode(0xff65), Some(Load(0xf)));
    }

    #[test]
    fn test_decode_unknown() {
        for word in [0x0000, 0x0123, 0x5121, 0x8008, 0x800f, 0x9ab1, 0xe200, 0xf0ff] {
            assert_eq!(Instruction::decode(word), None, "{:#06x}", word);
        }
    }

    #[test]
    fn test_disassembly() {
        assert_eq!(LoadImm(0, 5).to_string(), "LD V0, 0x05");
        assert_eq!(Draw(0xa, 0xb, 15).to_string(), "DRW VA, VB, 15");
        assert_eq!(Jump(0x200).to_string(), "JP 0x200");
        assert_eq!(Store(3).to_string(), "LD [I], V3");
    }
}
