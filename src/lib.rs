// This code is licensed under MIT license (see LICENSE for details)

//! Cheep is a Chip-8 interpreter built around one idea: the machine is a pure
//! state value, advanced only through [CPU::step] (one fetch-decode-execute
//! cycle) and [CPU::tick] (one 60Hz timer decrement). Everything that owns a
//! device handle lives in the frontend binary; the library never blocks,
//! never draws, and never sleeps.

pub mod cpu;
pub mod error;
pub mod mem;
pub mod screen;

pub use cpu::{
    flags::{Flags, Wait},
    instruction::Insn,
    CPU,
};
pub use error::{Error, Result};
pub use mem::Mem;
pub use screen::Screen;

/// Common imports for Cheep
pub mod prelude {
    pub use crate::cpu::{
        flags::{Flags, Wait},
        instruction::Insn,
        CPU,
    };
    pub use crate::error::{Error, Result};
    pub use crate::mem::Mem;
    pub use crate::screen::Screen;
}
