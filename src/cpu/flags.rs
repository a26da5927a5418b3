// This code is licensed under MIT license (see LICENSE for details)

//! Flags that steer the interpreter but aren't registers of the Chip-8

/// The key-wait latch. Entered by the wait-for-key opcode, left on the first
/// step where some key is down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Wait {
    /// Normal fetch-decode-execute
    #[default]
    Running,
    /// Suspended until a key is pressed; the key index lands in `vX`
    AwaitingKey {
        /// Target register
        x: usize,
    },
}

/// Flags that aid in operation, but aren't inherent to the CPU
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Flags {
    /// Set when debug (live disassembly) mode is enabled
    pub debug: bool,
    /// Set when the interpreter is paused by the user and should not step
    pub pause: bool,
    /// Set when the screen has changed and the host should present a frame
    pub draw: bool,
    /// The key-wait latch
    pub wait: Wait,
}

impl Flags {
    /// Toggles debug mode
    ///
    /// # Examples
    /// ```rust
    /// # use cheep::*;
    /// let mut cpu = CPU::default();
    /// assert_eq!(false, cpu.flags.debug);
    /// cpu.flags.debug();
    /// assert_eq!(true, cpu.flags.debug);
    /// ```
    pub fn debug(&mut self) {
        self.debug = !self.debug
    }

    /// Toggles pause
    ///
    /// # Examples
    /// ```rust
    /// # use cheep::*;
    /// let mut cpu = CPU::default();
    /// assert_eq!(false, cpu.flags.pause);
    /// cpu.flags.pause();
    /// assert_eq!(true, cpu.flags.pause);
    /// ```
    pub fn pause(&mut self) {
        self.pause = !self.pause
    }
}
