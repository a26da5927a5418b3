// This code is licensed under MIT license (see LICENSE for details)

//! The 64x32 one-bit framebuffer
//!
//! Mutated only by the XOR sprite blit and the explicit clear; sprites are
//! clipped at the edges, never wrapped.

use std::fmt::{Display, Formatter};

/// Screen width in pixels
pub const WIDTH: usize = 64;
/// Screen height in pixels
pub const HEIGHT: usize = 32;

/// One bit per pixel, row-major, MSB leftmost within a byte
#[derive(Clone, PartialEq, Eq)]
pub struct Screen {
    bits: [u8; WIDTH * HEIGHT / 8],
}

impl Screen {
    /// Constructs a blank screen
    pub fn new() -> Self {
        Screen {
            bits: [0; WIDTH * HEIGHT / 8],
        }
    }

    /// Clears the screen to all 0
    pub fn clear(&mut self) {
        self.bits.fill(0);
    }

    /// XOR-blits a sprite (8 pixels wide, one byte per row) at `(x, y)`.
    ///
    /// Pixels that land outside the screen are dropped. Returns true if any
    /// destination pixel was already set (a collision).
    /// # Examples
    /// ```rust
    /// # use cheep::*;
    /// let mut screen = Screen::new();
    /// assert!(!screen.blit(0, 0, &[0x80]));
    /// assert!(screen.get(0, 0));
    /// // drawing the same sprite again collides and erases it
    /// assert!(screen.blit(0, 0, &[0x80]));
    /// assert!(!screen.get(0, 0));
    /// ```
    pub fn blit(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut collision = false;
        for (line, &row) in sprite.iter().enumerate() {
            let y = y as usize + line;
            if y >= HEIGHT {
                break;
            }
            for bit in 0..8 {
                if row & (0x80 >> bit) == 0 {
                    continue;
                }
                let x = x as usize + bit;
                if x >= WIDTH {
                    break;
                }
                let (index, mask) = ((y * WIDTH + x) / 8, 0x80 >> (x % 8));
                if self.bits[index] & mask != 0 {
                    collision = true;
                }
                self.bits[index] ^= mask;
            }
        }
        collision
    }

    /// Reads one pixel. Out-of-range coordinates read as unset.
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }
        self.bits[(y * WIDTH + x) / 8] & (0x80 >> (x % 8)) != 0
    }

    /// The raw bit-packed framebuffer, for presentation
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Renders the screen to a string on a braille canvas
    #[cfg(feature = "drawille")]
    pub fn braille(&self) -> String {
        let mut canvas = drawille::Canvas::new(WIDTH as u32, HEIGHT as u32);
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                if self.get(x, y) {
                    canvas.set(x as u32, y as u32);
                }
            }
        }
        canvas.frame()
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Screen({WIDTH}x{HEIGHT})")
    }
}

impl Display for Screen {
    /// Renders the screen with box characters, one row of text per scanline
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, byte) in self.bits.iter().enumerate() {
            if index % (WIDTH / 8) == 0 {
                write!(f, "|")?;
            }
            for bit in 0..8 {
                write!(
                    f,
                    "{}",
                    if byte & (0x80 >> bit) != 0 { "█" } else { " " }
                )?;
            }
            if index % (WIDTH / 8) == WIDTH / 8 - 1 {
                writeln!(f, "|")?;
            }
        }
        Ok(())
    }
}
