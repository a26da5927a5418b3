// This code is licensed under MIT license (see LICENSE for details)

//! The flat 4KiB address space: hex charset, loaded ROM, and scratch writes

use crate::error::{Error, Result};
use owo_colors::{OwoColorize, Style};
use std::{
    fmt::{Display, Formatter},
    slice::SliceIndex,
};

/// Total amount of addressable memory
pub const MSIZE: usize = 0x1000;
/// First address of program space. Everything below is interpreter territory.
pub const PROGRAM: usize = 0x200;
/// Address of the first glyph of the hex charset
pub const FONT: u16 = 0x050;

/// The canonical Chip-8 hex charset: 16 glyphs, 5 bytes each
pub const CHARSET: [u8; 80] = [
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

/// 4KiB of flat memory. Single-byte accesses are masked to 12 bits and always
/// succeed; multi-byte ranges that cross the end of memory are a fault at the
/// call site, never a silent truncation.
#[derive(Clone, PartialEq, Eq)]
pub struct Mem {
    mem: [u8; MSIZE],
}

impl Mem {
    /// Constructs a zeroed memory with the charset copied in at [FONT]
    pub fn new() -> Self {
        let mut mem = [0; MSIZE];
        let font = FONT as usize;
        mem[font..font + CHARSET.len()].copy_from_slice(&CHARSET);
        Mem { mem }
    }

    /// Copies a ROM into program space, clearing whatever was there before.
    ///
    /// Fails with [Error::RomTooLarge] if the ROM won't fit; memory is
    /// untouched in that case.
    /// # Examples
    /// ```rust
    /// # use cheep::*;
    /// let mut mem = Mem::new();
    /// mem.load(b"\x00\xe0").unwrap();
    /// assert_eq!(0x00e0, mem.fetch(0x200).unwrap());
    /// ```
    pub fn load(&mut self, rom: &[u8]) -> Result<()> {
        let max = MSIZE - PROGRAM;
        if rom.len() > max {
            return Err(Error::RomTooLarge {
                size: rom.len(),
                max,
            });
        }
        self.mem[PROGRAM..].fill(0);
        self.mem[PROGRAM..PROGRAM + rom.len()].copy_from_slice(rom);
        Ok(())
    }

    /// Reads one byte. The address is masked to 12 bits, so this is total.
    pub fn read(&self, addr: u16) -> u8 {
        self.mem[addr as usize & 0xfff]
    }

    /// Writes one byte. The address is masked to 12 bits, so this is total.
    pub fn write(&mut self, addr: u16, data: u8) {
        self.mem[addr as usize & 0xfff] = data;
    }

    /// Fetches a big-endian word at `addr`, `addr + 1`.
    ///
    /// Faults with [Error::OutOfBoundsAccess] if the pair straddles the end
    /// of memory.
    pub fn fetch(&self, addr: u16) -> Result<u16> {
        let base = addr as usize & 0xfff;
        match self.mem.get(base..base + 2) {
            Some(&[hi, lo]) => Ok(u16::from_be_bytes([hi, lo])),
            _ => Err(Error::OutOfBoundsAccess {
                addr,
                len: 2,
                pc: addr,
            }),
        }
    }

    /// Gets a slice of memory, if the whole range is in bounds
    pub fn get<I>(&self, index: I) -> Option<&<I as SliceIndex<[u8]>>::Output>
    where
        I: SliceIndex<[u8]>,
    {
        self.mem.get(index)
    }

    /// Gets a mutable slice of memory, if the whole range is in bounds
    pub fn get_mut<I>(&mut self, index: I) -> Option<&mut <I as SliceIndex<[u8]>>::Output>
    where
        I: SliceIndex<[u8]>,
    {
        self.mem.get_mut(index)
    }
}

impl Default for Mem {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Mem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mem({MSIZE} bytes)")
    }
}

impl Display for Mem {
    /// Hexdumps the entire address space
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Green phosphor style formatting, for taste
        let term: Style = Style::new().bold().green().on_black();
        for (index, byte) in self.mem.iter().enumerate() {
            if index % 16 == 0 {
                write!(f, "{:>03x}{} ", index.style(term), ":".style(term))?
            }
            write!(f, "{byte:02x}")?;
            write!(
                f,
                "{}",
                match index % 16 {
                    0xf => "\n",
                    0x7 => "  ",
                    _ if index % 2 == 1 => " ",
                    _ => "",
                }
            )?
        }
        Ok(())
    }
}
