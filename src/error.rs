// This code is licensed under MIT license (see LICENSE for details)

//! Error type for Cheep
//!
//! Faults returned from [CPU::step](crate::CPU::step) are terminal: the
//! machine rewinds onto the faulting instruction and stays there, so stepping
//! again reproduces the same error instead of corrupting adjacent state.

use thiserror::Error;

/// Result type, equivalent to [std::result::Result]<T, [enum@Error]>
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Cheep.
#[derive(Debug, Error)]
pub enum Error {
    /// The ROM does not fit in program space (load-time, never at runtime)
    #[error("rom is {size} bytes, but program space holds only {max}")]
    RomTooLarge {
        /// Size of the rejected ROM
        size: usize,
        /// Capacity of program space
        max: usize,
    },
    /// No dispatch match at any nibble level
    #[error("opcode {word:04x} at {addr:03x} not recognized")]
    UnrecognizedOpcode {
        /// The offending word
        word: u16,
        /// Address of the offending word
        addr: u16,
    },
    /// A 17th nested call without an intervening return
    #[error("call at {pc:03x} overflowed the stack (sp = {sp:x})")]
    StackOverflow {
        /// Stack depth when the call was attempted
        sp: usize,
        /// Address of the call instruction
        pc: u16,
    },
    /// A return with nothing on the stack
    #[error("return at {pc:03x} underflowed the stack (sp = {sp:x})")]
    StackUnderflow {
        /// Stack depth when the return was attempted
        sp: usize,
        /// Address of the return instruction
        pc: u16,
    },
    /// A computed multi-byte range crosses the end of memory
    #[error("access of {len} bytes at {addr:03x} falls outside memory (pc = {pc:03x})")]
    OutOfBoundsAccess {
        /// Base address of the access
        addr: u16,
        /// Length of the access in bytes
        len: usize,
        /// Address of the instruction that computed it
        pc: u16,
    },
    /// Tried to press a key that doesn't exist
    #[error("tried to press key {key:X} which does not exist")]
    InvalidKey {
        /// The offending key
        key: usize,
    },
    /// Tried to get/set an out-of-bounds register
    #[error("tried to access register v{reg:X} which does not exist")]
    InvalidRegister {
        /// The offending register
        reg: usize,
    },
    /// Error originated in [std::io]
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "minifb")]
    /// Error originated in [minifb]
    #[error(transparent)]
    MinifbError(#[from] minifb::Error),
}
