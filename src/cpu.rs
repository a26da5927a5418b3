// This code is licensed under MIT license (see LICENSE for details)

//! Decodes and runs instructions

#[cfg(test)]
mod tests;

pub mod behavior;
pub mod flags;
pub mod instruction;

use self::{
    flags::{Flags, Wait},
    instruction::Insn,
};
use crate::{
    error::{Error, Result},
    mem::Mem,
    screen::Screen,
};
use imperative_rs::InstructionSet;
use owo_colors::OwoColorize;
use std::fmt::Debug;

type Reg = usize;
type Adr = u16;
type Nib = u8;

/// How many return addresses fit on the stack
pub const STACK_DEPTH: usize = 16;

/// The whole machine: memory, registers, stack, screen, timers, and key
/// state, advanced one instruction at a time by [CPU::step].
#[derive(Clone, PartialEq)]
pub struct CPU {
    /// Flags that control how the CPU behaves, but which aren't part of the
    /// chip-8: pause, the draw signal, and the key-wait latch.
    pub flags: Flags,
    mem: Mem,
    screen: Screen,
    stack: Vec<Adr>,
    // registers
    pc: Adr,
    i: Adr,
    v: [u8; 16],
    delay: u8,
    sound: u8,
    // I/O
    keys: [bool; 16],
    // Execution data
    cycle: usize,
}

// public interface
impl CPU {
    /// Constructs a new CPU with the ROM at `rom` loaded at 0x200
    /// # Examples
    /// ```rust,no_run
    /// # use cheep::*;
    /// let cpu = CPU::new("roms/pong.ch8", Flags::default()).unwrap();
    /// ```
    pub fn new(rom: impl AsRef<std::path::Path>, flags: Flags) -> Result<Self> {
        let mut cpu = CPU {
            flags,
            ..Default::default()
        };
        cpu.load_program(rom)?;
        Ok(cpu)
    }

    /// Loads a ROM file into the CPU's program space
    pub fn load_program(&mut self, rom: impl AsRef<std::path::Path>) -> Result<&mut Self> {
        self.load_program_bytes(&std::fs::read(rom)?)
    }

    /// Loads bytes into the CPU's program space.
    ///
    /// Fails with [Error::RomTooLarge] if they won't fit; the CPU never runs
    /// in a partially-loaded state.
    pub fn load_program_bytes(&mut self, rom: &[u8]) -> Result<&mut Self> {
        self.mem.load(rom)?;
        Ok(self)
    }

    /// Presses a key, and reports whether the key's state changed.
    /// If key does not exist, returns [Error::InvalidKey].
    ///
    /// # Examples
    /// ```rust
    /// # use cheep::*;
    /// let mut cpu = CPU::default();
    ///
    /// // press key `7`
    /// let did_press = cpu.press(0x7).unwrap();
    /// assert!(did_press);
    ///
    /// // press key `7` again, even though it's already pressed
    /// let did_press = cpu.press(0x7).unwrap();
    /// // it was already pressed, so nothing's changed.
    /// assert!(!did_press);
    /// ```
    pub fn press(&mut self, key: usize) -> Result<bool> {
        match self.keys.get_mut(key) {
            Some(keyref) if !*keyref => {
                *keyref = true;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(Error::InvalidKey { key }),
        }
    }

    /// Releases a key, and reports whether the key's state changed.
    /// If key is outside range `0..=0xF`, returns [Error::InvalidKey].
    pub fn release(&mut self, key: usize) -> Result<bool> {
        match self.keys.get_mut(key) {
            Some(keyref) if *keyref => {
                *keyref = false;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(Error::InvalidKey { key }),
        }
    }

    /// Sets a general purpose register in the CPU.
    /// If the register doesn't exist, returns [Error::InvalidRegister]
    /// # Examples
    /// ```rust
    /// # use cheep::*;
    /// let mut cpu = CPU::default();
    /// cpu.set_v(0x4, 0x41).unwrap();
    /// assert_eq!(0x41, cpu.v()[0x4]);
    /// ```
    pub fn set_v(&mut self, reg: Reg, value: u8) -> Result<()> {
        if let Some(gpr) = self.v.get_mut(reg) {
            *gpr = value;
            Ok(())
        } else {
            Err(Error::InvalidRegister { reg })
        }
    }

    /// Gets a slice of the entire general purpose registers
    pub fn v(&self) -> &[u8] {
        self.v.as_slice()
    }

    /// Gets the program counter
    /// # Examples
    /// ```rust
    /// # use cheep::*;
    /// let cpu = CPU::default();
    /// assert_eq!(0x200, cpu.pc());
    /// ```
    pub fn pc(&self) -> Adr {
        self.pc
    }

    /// Gets the I register
    pub fn i(&self) -> Adr {
        self.i
    }

    /// Gets the value in the sound timer register
    pub fn sound(&self) -> u8 {
        self.sound
    }

    /// Gets the value in the delay timer register
    pub fn delay(&self) -> u8 {
        self.delay
    }

    /// Gets the number of instructions the CPU has executed
    pub fn cycle(&self) -> usize {
        self.cycle
    }

    /// Gets the screen, without touching the draw signal
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Gets memory, for hexdumps
    pub fn mem(&self) -> &Mem {
        &self.mem
    }

    /// Takes the screen if a frame is due: returns it and lowers the draw
    /// signal, or returns None when nothing has changed since the last frame.
    /// # Examples
    /// ```rust
    /// # use cheep::*;
    /// let mut cpu = CPU::default();
    /// assert!(cpu.frame().is_none());
    /// cpu.load_program_bytes(b"\x00\xe0").unwrap();
    /// cpu.step().unwrap();
    /// assert!(cpu.frame().is_some());
    /// assert!(cpu.frame().is_none());
    /// ```
    pub fn frame(&mut self) -> Option<&Screen> {
        if self.flags.draw {
            self.flags.draw = false;
            Some(&self.screen)
        } else {
            None
        }
    }

    /// Executes a single instruction.
    ///
    /// All faults are terminal: the program counter is left on the faulting
    /// instruction, so stepping again reproduces the same error.
    /// # Examples
    /// ```rust
    /// # use cheep::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(b"\x00\xe0\x12\x02").unwrap();
    /// cpu.step().unwrap(); // cls
    /// assert_eq!(0x202, cpu.pc());
    /// assert_eq!(1, cpu.cycle());
    /// ```
    /// An unrecognized word is an error, never a no-op:
    /// ```rust
    /// # use cheep::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(b"\xff\xff").unwrap();
    /// cpu.step().expect_err("0xffff is not an instruction");
    /// assert_eq!(0x200, cpu.pc());
    /// ```
    pub fn step(&mut self) -> Result<&mut Self> {
        // Do nothing if paused
        if self.flags.pause {
            return Ok(self);
        }
        // Service the key-wait latch without fetching
        if let Wait::AwaitingKey { x } = self.flags.wait {
            if let Some(key) = self.keys.iter().position(|&down| down) {
                self.v[x] = key as u8;
                self.pc = self.pc.wrapping_add(2) & 0xfff;
                self.flags.wait = Wait::Running;
            }
            return Ok(self);
        }
        let word = self.mem.fetch(self.pc)?;
        let Ok((inc, insn)) = Insn::decode(&word.to_be_bytes()) else {
            return Err(Error::UnrecognizedOpcode {
                word,
                addr: self.pc,
            });
        };
        self.cycle += 1;
        if self.flags.debug {
            println!("{:3} {:03x}: {insn}", self.cycle.bright_black(), self.pc);
        }
        let prev = self.pc;
        self.pc = self.pc.wrapping_add(inc as Adr) & 0xfff;
        if let Err(fault) = self.execute(insn) {
            // freeze on the faulting instruction
            self.pc = prev;
            return Err(fault);
        }
        Ok(self)
    }

    /// Runs a single instruction even if the CPU is paused
    pub fn singlestep(&mut self) -> Result<&mut Self> {
        self.flags.pause = false;
        self.step()?;
        self.flags.pause = true;
        Ok(self)
    }

    /// Executes `steps` instructions. Timers are untouched; drive those with
    /// [CPU::tick] on a real-time cadence.
    /// # Examples
    /// ```rust
    /// # use cheep::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(b"\x00\xe0\x12\x02").unwrap();
    /// cpu.multistep(0x20).unwrap();
    /// assert_eq!(0x202, cpu.pc());
    /// assert_eq!(0x20, cpu.cycle());
    /// ```
    pub fn multistep(&mut self, steps: usize) -> Result<&mut Self> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(self)
    }

    /// Decrements both timers by one, saturating at zero.
    ///
    /// The host calls this at a steady 60Hz, independent of how many times
    /// [CPU::step] ran in the interval. [CPU::step] never touches the timers.
    /// # Examples
    /// ```rust
    /// # use cheep::*;
    /// let mut cpu = CPU::default();
    /// cpu.tick();
    /// assert_eq!(0, cpu.delay());
    /// ```
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// Soft resets the CPU: program counter back to 0x200, latches released,
    /// screen cleared. Registers and memory are left alone.
    pub fn soft_reset(&mut self) {
        self.pc = 0x200;
        self.flags.wait = Wait::Running;
        self.flags.draw = true;
        self.screen.clear();
    }

    /// Resets the machine to power-on state, keeping the loaded ROM and the
    /// user-facing flags (debug, pause).
    pub fn reset(&mut self) {
        self.flags = Flags {
            draw: true,
            wait: Wait::Running,
            ..self.flags
        };
        self.stack.truncate(0);
        self.pc = 0x200;
        self.i = 0;
        self.v = [0; 16];
        self.delay = 0;
        self.sound = 0;
        self.keys = [false; 16];
        self.screen.clear();
        self.cycle = 0;
    }

    /// Dumps the current state of all CPU registers, and the cycle count
    /// # Examples
    /// ```rust
    /// # use cheep::*;
    /// let cpu = CPU::default();
    /// cpu.dump();
    /// ```
    /// outputs
    /// ```text
    /// PC: 0200, SP: 0000, I: 0000
    /// v0: 00 v1: 00 v2: 00 v3: 00
    /// v4: 00 v5: 00 v6: 00 v7: 00
    /// v8: 00 v9: 00 vA: 00 vB: 00
    /// vC: 00 vD: 00 vE: 00 vF: 00
    /// DLY: 0, SND: 0, CYC:      0
    /// ```
    pub fn dump(&self) {
        println!(
            "PC: {:04x}, SP: {:04x}, I: {:04x}\n{}DLY: {}, SND: {}, CYC: {:6}",
            self.pc,
            self.stack.len(),
            self.i,
            self.v
                .into_iter()
                .enumerate()
                .map(|(i, gpr)| {
                    format!(
                        "v{i:X}: {gpr:02x} {}",
                        match i % 4 {
                            3 => "\n",
                            _ => "",
                        }
                    )
                })
                .collect::<String>(),
            self.delay,
            self.sound,
            self.cycle,
        );
    }
}

impl Debug for CPU {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CPU")
            .field("flags", &self.flags)
            .field("stack", &self.stack)
            .field("pc", &self.pc)
            .field("i", &self.i)
            .field("v", &self.v)
            .field("delay", &self.delay)
            .field("sound", &self.sound)
            .field("keys", &self.keys)
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}

impl Default for CPU {
    /// Constructs a CPU with an empty program space, charset at 0x050, and
    /// the program counter at 0x200
    fn default() -> Self {
        CPU {
            flags: Flags::default(),
            mem: Mem::new(),
            screen: Screen::new(),
            stack: Vec::with_capacity(STACK_DEPTH),
            pc: 0x200,
            i: 0,
            v: [0; 16],
            delay: 0,
            sound: 0,
            keys: [false; 16],
            cycle: 0,
        }
    }
}
