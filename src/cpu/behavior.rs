// This code is licensed under MIT license (see LICENSE for details)

//! Contains implementations for each Chip-8 [Insn]
//!
//! Each handler is a pure transition over machine state. The fallible ones
//! (call, return, draw, and the I-indexed transfers) report faults with the
//! address of the instruction that caused them; [CPU::step](super::CPU::step)
//! rewinds the program counter before surfacing the error.

use super::*;
use crate::mem::FONT;
use rand::random;

impl CPU {
    /// Executes a single [Insn]
    #[rustfmt::skip]
    pub(super) fn execute(&mut self, instruction: Insn) -> Result<()> {
        match instruction {
            Insn::cls               => self.clear_screen(),
            Insn::ret               => self.ret()?,
            Insn::jmp   {       A } => self.jump(A),
            Insn::call  {       A } => self.call(A)?,
            Insn::seb   {    x, B } => self.skip_equals_immediate(x, B),
            Insn::sneb  {    x, B } => self.skip_not_equals_immediate(x, B),
            Insn::se    { y, x    } => self.skip_equals(x, y),
            Insn::movb  {    x, B } => self.load_immediate(x, B),
            Insn::addb  {    x, B } => self.add_immediate(x, B),
            Insn::mov   { y, x    } => self.load(x, y),
            Insn::or    { y, x    } => self.or(x, y),
            Insn::and   { y, x    } => self.and(x, y),
            Insn::xor   { y, x    } => self.xor(x, y),
            Insn::add   { y, x    } => self.add(x, y),
            Insn::sub   { y, x    } => self.sub(x, y),
            Insn::shr   { y: _, x } => self.shift_right(x),
            Insn::bsub  { y, x    } => self.backwards_sub(x, y),
            Insn::shl   { y: _, x } => self.shift_left(x),
            Insn::sne   { y, x    } => self.skip_not_equals(x, y),
            Insn::movi  {       A } => self.load_i_immediate(A),
            Insn::jmpr  {       A } => self.jump_indexed(A),
            Insn::rand  {    x, B } => self.rand(x, B),
            Insn::draw  { y, x, n } => self.draw(x, y, n)?,
            Insn::sek   {    x    } => self.skip_key_equals(x),
            Insn::snek  {    x    } => self.skip_key_not_equals(x),
            Insn::getdt {    x    } => self.load_delay_timer(x),
            Insn::waitk {    x    } => self.wait_for_key(x),
            Insn::setdt {    x    } => self.store_delay_timer(x),
            Insn::setst {    x    } => self.store_sound_timer(x),
            Insn::addi  {    x    } => self.add_i(x),
            Insn::font  {    x    } => self.load_sprite(x),
            Insn::bcd   {    x    } => self.bcd_convert(x)?,
            Insn::dmao  {    x    } => self.store_dma(x)?,
            Insn::dmai  {    x    } => self.load_dma(x)?,
        }
        Ok(())
    }

    /// The address of the instruction currently being executed. The program
    /// counter has already advanced past it when a handler runs.
    fn here(&self) -> Adr {
        self.pc.wrapping_sub(2) & 0xfff
    }
}

/// |`0aaa`| "System call" routines
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`00e0`| Clear screen memory to all 0       |
/// |`00ee`| Return from subroutine             |
impl CPU {
    /// |`00e0`| Clears the screen memory to 0
    pub(super) fn clear_screen(&mut self) {
        self.screen.clear();
        self.flags.draw = true;
    }
    /// |`00ee`| Returns from subroutine
    ///
    /// The stack pointer moves first, then the slot it lands on is read; a
    /// return with nothing on the stack is a fault, never a wrap.
    pub(super) fn ret(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(addr) => {
                self.pc = addr;
                Ok(())
            }
            None => Err(Error::StackUnderflow {
                sp: 0,
                pc: self.here(),
            }),
        }
    }
}

/// |`1aaa`| Sets pc to an absolute address
impl CPU {
    /// |`1aaa`| Sets the program counter to an absolute address
    pub(super) fn jump(&mut self, a: Adr) {
        self.pc = a;
    }
}

/// |`2aaa`| Pushes the return address onto the stack, then jumps to a
impl CPU {
    /// |`2aaa`| Pushes the return address onto the stack, then jumps to a.
    ///
    /// The pushed address is the instruction *following* the call, which is
    /// where pc already points. A 17th nested call is a fault.
    pub(super) fn call(&mut self, a: Adr) -> Result<()> {
        if self.stack.len() >= STACK_DEPTH {
            return Err(Error::StackOverflow {
                sp: self.stack.len(),
                pc: self.here(),
            });
        }
        self.stack.push(self.pc);
        self.pc = a;
        Ok(())
    }
}

/// |`3xbb`| Skips next instruction if register X == b
impl CPU {
    /// |`3xbb`| Skips the next instruction if register X == b
    pub(super) fn skip_equals_immediate(&mut self, x: Reg, b: u8) {
        if self.v[x] == b {
            self.pc = self.pc.wrapping_add(2) & 0xfff;
        }
    }
}

/// |`4xbb`| Skips next instruction if register X != b
impl CPU {
    /// |`4xbb`| Skips the next instruction if register X != b
    pub(super) fn skip_not_equals_immediate(&mut self, x: Reg, b: u8) {
        if self.v[x] != b {
            self.pc = self.pc.wrapping_add(2) & 0xfff;
        }
    }
}

/// |`5xy0`| Skips next instruction if register X == register Y
impl CPU {
    /// |`5xy0`| Skips the next instruction if register X == register Y
    pub(super) fn skip_equals(&mut self, x: Reg, y: Reg) {
        if self.v[x] == self.v[y] {
            self.pc = self.pc.wrapping_add(2) & 0xfff;
        }
    }
}

/// |`6xbb`| Loads immediate byte b into register vX
impl CPU {
    /// |`6xbb`| Loads immediate byte b into register vX
    pub(super) fn load_immediate(&mut self, x: Reg, b: u8) {
        self.v[x] = b;
    }
}

/// |`7xbb`| Adds immediate byte b to register vX
impl CPU {
    /// |`7xbb`| Adds immediate byte b to register vX, with 8-bit wraparound
    /// and no flag side effect
    pub(super) fn add_immediate(&mut self, x: Reg, b: u8) {
        self.v[x] = self.v[x].wrapping_add(b);
    }
}

/// |`8xyn`| Performs ALU operation
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`8xy0`| X = Y                              |
/// |`8xy1`| X = X | Y                          |
/// |`8xy2`| X = X & Y                          |
/// |`8xy3`| X = X ^ Y                          |
/// |`8xy4`| X = X + Y; vF = carry              |
/// |`8xy5`| X = X - Y; vF = no borrow          |
/// |`8xy6`| X = X >> 1; vF = bit 0 before      |
/// |`8xy7`| X = Y - X; vF = no borrow          |
/// |`8xyE`| X = X << 1; vF = bit 7 before      |
///
/// The flag is always computed from pre-operation values and stored last, so
/// an operation targeting vF leaves the flag, not the result.
impl CPU {
    /// |`8xy0`| Loads the value of y into x
    pub(super) fn load(&mut self, x: Reg, y: Reg) {
        self.v[x] = self.v[y];
    }
    /// |`8xy1`| Performs bitwise or of vX and vY, and stores the result in vX
    pub(super) fn or(&mut self, x: Reg, y: Reg) {
        self.v[x] |= self.v[y];
    }
    /// |`8xy2`| Performs bitwise and of vX and vY, and stores the result in vX
    pub(super) fn and(&mut self, x: Reg, y: Reg) {
        self.v[x] &= self.v[y];
    }
    /// |`8xy3`| Performs bitwise xor of vX and vY, and stores the result in vX
    pub(super) fn xor(&mut self, x: Reg, y: Reg) {
        self.v[x] ^= self.v[y];
    }
    /// |`8xy4`| Performs addition of vX and vY, and stores the result in vX
    pub(super) fn add(&mut self, x: Reg, y: Reg) {
        let carry;
        (self.v[x], carry) = self.v[x].overflowing_add(self.v[y]);
        self.v[0xf] = carry.into();
    }
    /// |`8xy5`| Performs subtraction of vX and vY, and stores the result in vX
    pub(super) fn sub(&mut self, x: Reg, y: Reg) {
        let borrow;
        (self.v[x], borrow) = self.v[x].overflowing_sub(self.v[y]);
        self.v[0xf] = (!borrow).into();
    }
    /// |`8xy6`| Performs bitwise right shift of vX. vY is decoded but plays
    /// no part.
    pub(super) fn shift_right(&mut self, x: Reg) {
        let shift_out = self.v[x] & 1;
        self.v[x] >>= 1;
        self.v[0xf] = shift_out;
    }
    /// |`8xy7`| Performs subtraction of vY and vX, and stores the result in vX
    pub(super) fn backwards_sub(&mut self, x: Reg, y: Reg) {
        let borrow;
        (self.v[x], borrow) = self.v[y].overflowing_sub(self.v[x]);
        self.v[0xf] = (!borrow).into();
    }
    /// |`8xyE`| Performs bitwise left shift of vX. vY is decoded but plays
    /// no part.
    pub(super) fn shift_left(&mut self, x: Reg) {
        let shift_out = self.v[x] >> 7;
        self.v[x] <<= 1;
        self.v[0xf] = shift_out;
    }
}

/// |`9xy0`| Skips next instruction if register X != register Y
impl CPU {
    /// |`9xy0`| Skips the next instruction if register X != register Y
    pub(super) fn skip_not_equals(&mut self, x: Reg, y: Reg) {
        if self.v[x] != self.v[y] {
            self.pc = self.pc.wrapping_add(2) & 0xfff;
        }
    }
}

/// |`Aaaa`| Load address #a into register I
impl CPU {
    /// |`Aadr`| Load address #adr into register I
    pub(super) fn load_i_immediate(&mut self, a: Adr) {
        self.i = a;
    }
}

/// |`Baaa`| Jump to &adr + v0
impl CPU {
    /// |`Badr`| Jump to &adr + v0
    pub(super) fn jump_indexed(&mut self, a: Adr) {
        self.pc = a.wrapping_add(self.v[0] as Adr) & 0xfff;
    }
}

/// |`Cxbb`| Stores a random number & the provided byte into vX
impl CPU {
    /// |`Cxbb`| Stores a random number & the provided byte into vX
    pub(super) fn rand(&mut self, x: Reg, b: u8) {
        self.v[x] = random::<u8>() & b;
    }
}

/// |`Dxyn`| Draws an n-byte sprite to the screen at coordinates (vX, vY)
impl CPU {
    /// |`Dxyn`| Draws an n-byte sprite to the screen at coordinates (vX, vY).
    ///
    /// vF is cleared first, then set if any destination pixel was already
    /// lit. Pixels past the screen edge are dropped, not wrapped. Reading
    /// sprite data past the end of memory is a fault.
    pub(super) fn draw(&mut self, x: Reg, y: Reg, n: Nib) -> Result<()> {
        let index = self.i as usize;
        let Some(sprite) = self.mem.get(index..index + n as usize) else {
            return Err(Error::OutOfBoundsAccess {
                addr: self.i,
                len: n as usize,
                pc: self.here(),
            });
        };
        self.v[0xf] = 0;
        if self.screen.blit(self.v[x], self.v[y], sprite) {
            self.v[0xf] = 1;
        }
        self.flags.draw = true;
        Ok(())
    }
}

/// |`Exbb`| Skips instruction on state of a key
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`eX9e`| Skip next instruction if key vX down |
/// |`eXa1`| Skip next instruction if key vX up |
impl CPU {
    /// |`Ex9e`| Skip next instruction if key vX is down
    pub(super) fn skip_key_equals(&mut self, x: Reg) {
        if self.keys[self.v[x] as usize & 0xf] {
            self.pc = self.pc.wrapping_add(2) & 0xfff;
        }
    }
    /// |`Exa1`| Skip next instruction if key vX is up
    pub(super) fn skip_key_not_equals(&mut self, x: Reg) {
        if !self.keys[self.v[x] as usize & 0xf] {
            self.pc = self.pc.wrapping_add(2) & 0xfff;
        }
    }
}

/// |`Fxbb`| Timers, key-wait, and I-indexed transfers
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`fX07`| Set vX to value in delay timer     |
/// |`fX0a`| Wait for input, store key in vX    |
/// |`fX15`| Set delay timer to the value in vX |
/// |`fX18`| Set sound timer to the value in vX |
/// |`fX1e`| Add vX to I                        |
/// |`fX29`| Point I at the glyph for vX        |
/// |`fX33`| BCD convert vX into I[0..3]        |
/// |`fX55`| Store v0..=vX at I                 |
/// |`fX65`| Load v0..=vX from I                |
impl CPU {
    /// |`Fx07`| Get the current DT, and put it in vX
    pub(super) fn load_delay_timer(&mut self, x: Reg) {
        self.v[x] = self.delay;
    }
    /// |`Fx0a`| Rewinds onto itself and latches the key-wait state.
    ///
    /// The suspension lives in [Wait](super::Wait), not in a loop here:
    /// step() keeps returning without fetching until a key is down, so the
    /// host can keep polling input and presenting frames.
    pub(super) fn wait_for_key(&mut self, x: Reg) {
        self.pc = self.here();
        self.flags.wait = Wait::AwaitingKey { x };
    }
    /// |`Fx15`| Load vX into DT
    pub(super) fn store_delay_timer(&mut self, x: Reg) {
        self.delay = self.v[x];
    }
    /// |`Fx18`| Load vX into ST
    pub(super) fn store_sound_timer(&mut self, x: Reg) {
        self.sound = self.v[x];
    }
    /// |`Fx1e`| Add vX to I, masked to 12 bits
    pub(super) fn add_i(&mut self, x: Reg) {
        self.i = self.i.wrapping_add(self.v[x] as Adr) & 0xfff;
    }
    /// |`Fx29`| Point I at the 5-byte glyph for the low nibble of vX
    pub(super) fn load_sprite(&mut self, x: Reg) {
        self.i = FONT + 5 * (self.v[x] as Adr & 0xf);
    }
    /// |`Fx33`| BCD convert vX into I`[0..3]`: hundreds, tens, ones
    pub(super) fn bcd_convert(&mut self, x: Reg) -> Result<()> {
        let value = self.v[x];
        let digits = self.range_mut(3)?;
        digits[0] = value / 100 % 10;
        digits[1] = value / 10 % 10;
        digits[2] = value % 10;
        Ok(())
    }
    /// |`Fx55`| Store v0..=vX at I. I itself is left unchanged.
    pub(super) fn store_dma(&mut self, x: Reg) -> Result<()> {
        let v = self.v;
        let target = self.range_mut(x + 1)?;
        target.copy_from_slice(&v[..=x]);
        Ok(())
    }
    /// |`Fx65`| Load v0..=vX from I. I itself is left unchanged.
    pub(super) fn load_dma(&mut self, x: Reg) -> Result<()> {
        let index = self.i as usize;
        let Some(source) = self.mem.get(index..index + x + 1) else {
            return Err(Error::OutOfBoundsAccess {
                addr: self.i,
                len: x + 1,
                pc: self.here(),
            });
        };
        self.v[..=x].copy_from_slice(source);
        Ok(())
    }

    /// A `len`-byte mutable window at I, or an [Error::OutOfBoundsAccess]
    fn range_mut(&mut self, len: usize) -> Result<&mut [u8]> {
        let (index, addr, pc) = (self.i as usize, self.i, self.here());
        match self.mem.get_mut(index..index + len) {
            Some(slice) => Ok(slice),
            None => Err(Error::OutOfBoundsAccess { addr, len, pc }),
        }
    }
}
