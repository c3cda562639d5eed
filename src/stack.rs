/// how deep subroutine calls may nest
pub const CHIP8_STACK_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackFault {
    Overflow,
    Underflow,
}

/// Bounded LIFO of return addresses. Backing array plus a length, so an
/// empty stack is just `len == 0` rather than a magic index.
#[derive(Debug, Clone)]
pub struct CallStack {
    frames: [u16; CHIP8_STACK_DEPTH],
    len: usize,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack {
            frames: [0; CHIP8_STACK_DEPTH],
            len: 0,
        }
    }

    /// save a return address; a full stack leaves everything untouched
    pub fn push(&mut self, addr: u16) -> Result<(), StackFault> {
        if self.len == CHIP8_STACK_DEPTH {
            return Err(StackFault::Overflow);
        }
        self.frames[self.len] = addr;
        self.len += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, StackFault> {
        if self.len == 0 {
            return Err(StackFault::Underflow);
        }
        self.len -= 1;
        Ok(self.frames[self.len])
    }

    pub fn peek(&self) -> Option<u16> {
        self.len.checked_sub(1).map(|top| self.frames[top])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_lifo() {
        let mut s = CallStack::new();
        s.push(0x202).unwrap();
        s.push(0x404).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.peek(), Some(0x404));
        assert_eq!(s.pop(), Ok(0x404));
        assert_eq!(s.pop(), Ok(0x202));
        assert!(s.is_empty());
    }

    #[test]
    fn test_underflow() {
        let mut s = CallStack::new();
        assert_eq!(s.pop(), Err(StackFault::Underflow));
        assert_eq!(s.peek(), None);
        assert_eq!(s.len(), 0);
    }

    #[test]
    fn test_overflow_keeps_contents() {
        let mut s = CallStack::new();
        for addr in 0..CHIP8_STACK_DEPTH as u16 {
            s.push(addr).unwrap();
        }
        assert_eq!(s.push(0xfff), Err(StackFault::Overflow));
        assert_eq!(s.len(), CHIP8_STACK_DEPTH);
        assert_eq!(s.pop(), Ok(15));
    }
}
