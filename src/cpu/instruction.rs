// This code is licensed under MIT license (see LICENSE for details)
#![allow(clippy::bad_bit_mask)]
//! Contains the definition of a Chip-8 [Insn]
//!
//! Decoding is a derive: each variant carries its bit pattern, and the
//! register-index fields `x`/`y` come out of the pattern already shifted, so
//! there is no hand-rolled nibble arithmetic to get wrong. A word that
//! matches no pattern fails to decode, which [step](crate::CPU::step) turns
//! into [UnrecognizedOpcode](crate::Error::UnrecognizedOpcode) rather than a
//! no-op.

use imperative_rs::InstructionSet;
use std::fmt::Display;

#[allow(non_camel_case_types, non_snake_case, missing_docs)]
#[derive(Clone, Copy, Debug, InstructionSet, PartialEq, Eq)]
/// One decoded Chip-8 instruction
pub enum Insn {
    /// | 00e0 | Clear screen memory to 0s
    #[opcode = "0x00e0"]
    cls,
    /// | 00ee | Return from subroutine
    #[opcode = "0x00ee"]
    ret,
    /// | 1aaa | Jump to an absolute address
    #[opcode = "0x1AAA"]
    jmp { A: u16 },
    /// | 2aaa | Push the return address, then jump to a
    #[opcode = "0x2AAA"]
    call { A: u16 },
    /// | 3xbb | Skip next instruction if vX == b
    #[opcode = "0x3xBB"]
    seb { B: u8, x: usize },
    /// | 4xbb | Skip next instruction if vX != b
    #[opcode = "0x4xBB"]
    sneb { B: u8, x: usize },
    /// | 5xy0 | Skip next instruction if vX == vY
    #[opcode = "0x5xy0"]
    se { y: usize, x: usize },
    /// | 6xbb | Load immediate byte b into vX
    #[opcode = "0x6xBB"]
    movb { B: u8, x: usize },
    /// | 7xbb | Add immediate byte b to vX, without touching vF
    #[opcode = "0x7xBB"]
    addb { B: u8, x: usize },
    /// | 8xy0 | Load the value of vY into vX
    #[opcode = "0x8xy0"]
    mov { y: usize, x: usize },
    /// | 8xy1 | vX = vX | vY
    #[opcode = "0x8xy1"]
    or { y: usize, x: usize },
    /// | 8xy2 | vX = vX & vY
    #[opcode = "0x8xy2"]
    and { y: usize, x: usize },
    /// | 8xy3 | vX = vX ^ vY
    #[opcode = "0x8xy3"]
    xor { y: usize, x: usize },
    /// | 8xy4 | vX = vX + vY; vF = carry
    #[opcode = "0x8xy4"]
    add { y: usize, x: usize },
    /// | 8xy5 | vX = vX - vY; vF = no borrow
    #[opcode = "0x8xy5"]
    sub { y: usize, x: usize },
    /// | 8xy6 | vX = vX >> 1; vF = bit shifted out
    #[opcode = "0x8xy6"]
    shr { y: usize, x: usize },
    /// | 8xy7 | vX = vY - vX; vF = no borrow
    #[opcode = "0x8xy7"]
    bsub { y: usize, x: usize },
    /// | 8xyE | vX = vX << 1; vF = bit shifted out
    #[opcode = "0x8xye"]
    shl { y: usize, x: usize },
    /// | 9xy0 | Skip next instruction if vX != vY
    #[opcode = "0x9xy0"]
    sne { y: usize, x: usize },
    /// | Aaaa | Load address a into I
    #[opcode = "0xaAAA"]
    movi { A: u16 },
    /// | Baaa | Jump to a + v0
    #[opcode = "0xbAAA"]
    jmpr { A: u16 },
    /// | Cxbb | vX = random byte & b
    #[opcode = "0xcxBB"]
    rand { B: u8, x: usize },
    /// | Dxyn | XOR-blit the n-byte sprite at I to (vX, vY); vF = collision
    #[opcode = "0xdxyn"]
    draw { y: usize, x: usize, n: u8 },
    /// | Ex9e | Skip next instruction if key vX is down
    #[opcode = "0xex9e"]
    sek { x: usize },
    /// | Exa1 | Skip next instruction if key vX is up
    #[opcode = "0xexa1"]
    snek { x: usize },
    /// | Fx07 | vX = delay timer
    #[opcode = "0xfx07"]
    getdt { x: usize },
    /// | Fx0a | Suspend until a key is pressed, store it in vX
    #[opcode = "0xfx0a"]
    waitk { x: usize },
    /// | Fx15 | delay timer = vX
    #[opcode = "0xfx15"]
    setdt { x: usize },
    /// | Fx18 | sound timer = vX
    #[opcode = "0xfx18"]
    setst { x: usize },
    /// | Fx1e | I += vX
    #[opcode = "0xfx1e"]
    addi { x: usize },
    /// | Fx29 | Point I at the charset glyph for vX
    #[opcode = "0xfx29"]
    font { x: usize },
    /// | Fx33 | BCD convert vX into I[0..3]
    #[opcode = "0xfx33"]
    bcd { x: usize },
    /// | Fx55 | Store v0..=vX at I
    #[opcode = "0xfx55"]
    dmao { x: usize },
    /// | Fx65 | Load v0..=vX from I
    #[opcode = "0xfx65"]
    dmai { x: usize },
}

impl Display for Insn {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Insn::cls               => write!(f, "cls    "),
            Insn::ret               => write!(f, "ret    "),
            Insn::jmp { A }         => write!(f, "jmp    {A:03x}"),
            Insn::call { A }        => write!(f, "call   {A:03x}"),
            Insn::seb { B, x }      => write!(f, "se     #{B:02x}, v{x:X}"),
            Insn::sneb { B, x }     => write!(f, "sne    #{B:02x}, v{x:X}"),
            Insn::se { y, x }       => write!(f, "se     v{y:X}, v{x:X}"),
            Insn::movb { B, x }     => write!(f, "mov    #{B:02x}, v{x:X}"),
            Insn::addb { B, x }     => write!(f, "add    #{B:02x}, v{x:X}"),
            Insn::mov { y, x }      => write!(f, "mov    v{y:X}, v{x:X}"),
            Insn::or { y, x }       => write!(f, "or     v{y:X}, v{x:X}"),
            Insn::and { y, x }      => write!(f, "and    v{y:X}, v{x:X}"),
            Insn::xor { y, x }      => write!(f, "xor    v{y:X}, v{x:X}"),
            Insn::add { y, x }      => write!(f, "add    v{y:X}, v{x:X}"),
            Insn::sub { y, x }      => write!(f, "sub    v{y:X}, v{x:X}"),
            Insn::shr { y, x }      => write!(f, "shr    v{y:X}, v{x:X}"),
            Insn::bsub { y, x }     => write!(f, "bsub   v{y:X}, v{x:X}"),
            Insn::shl { y, x }      => write!(f, "shl    v{y:X}, v{x:X}"),
            Insn::sne { y, x }      => write!(f, "sne    v{y:X}, v{x:X}"),
            Insn::movi { A }        => write!(f, "mov    ${A:03x}, I"),
            Insn::jmpr { A }        => write!(f, "jmp    ${A:03x}+v0"),
            Insn::rand { B, x }     => write!(f, "rand   #{B:02x}, v{x:X}"),
            Insn::draw { y, x, n }  => write!(f, "draw   #{n:x}, v{x:X}, v{y:X}"),
            Insn::sek { x }         => write!(f, "sek    v{x:X}"),
            Insn::snek { x }        => write!(f, "snek   v{x:X}"),
            Insn::getdt { x }       => write!(f, "mov    DT, v{x:X}"),
            Insn::waitk { x }       => write!(f, "waitk  v{x:X}"),
            Insn::setdt { x }       => write!(f, "mov    v{x:X}, DT"),
            Insn::setst { x }       => write!(f, "mov    v{x:X}, ST"),
            Insn::addi { x }        => write!(f, "add    v{x:X}, I"),
            Insn::font { x }        => write!(f, "font   v{x:X}, I"),
            Insn::bcd { x }         => write!(f, "bcd    v{x:X}, &I"),
            Insn::dmao { x }        => write!(f, "dmao   v{x:X}"),
            Insn::dmai { x }        => write!(f, "dmai   v{x:X}"),
        }
    }
}
