// This code is licensed under MIT license (see LICENSE for details)

//! Window, framebuffer presentation, and key mapping for the minifb frontend

use cheep::{error::Result, screen, Screen, CPU};
use minifb::{Key, Scale, ScaleMode, Window, WindowOptions};
use std::time::Instant;

#[derive(Clone, Debug)]
pub struct UIBuilder {
    pub width: usize,
    pub height: usize,
    pub name: Option<&'static str>,
    pub window_options: WindowOptions,
}

impl UIBuilder {
    pub fn new() -> Self {
        UIBuilder::default()
    }
    pub fn build(&self) -> Result<UI> {
        let ui = UI {
            window: Window::new(
                self.name.unwrap_or_default(),
                self.width,
                self.height,
                self.window_options,
            )?,
            keyboard: Default::default(),
            fb: Default::default(),
            time: Instant::now(),
        };
        Ok(ui)
    }
}

impl Default for UIBuilder {
    fn default() -> Self {
        UIBuilder {
            width: screen::WIDTH,
            height: screen::HEIGHT,
            name: Some("Cheep"),
            window_options: WindowOptions {
                title: true,
                resize: false,
                scale: Scale::X16,
                scale_mode: ScaleMode::AspectRatioStretch,
                none: true,
                ..Default::default()
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameBufferFormat {
    pub fg: u32,
    pub bg: u32,
}

impl Default for FrameBufferFormat {
    fn default() -> Self {
        FrameBufferFormat {
            fg: 0x0011a434,
            bg: 0x001e2431,
        }
    }
}

/// Expands the interpreter's one-bit framebuffer into 32-bit pixels
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameBuffer {
    buffer: Vec<u32>,
    width: usize,
    height: usize,
    format: FrameBufferFormat,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        FrameBuffer {
            buffer: vec![0; width * height],
            width,
            height,
            format: Default::default(),
        }
    }
    /// Repaints the 32-bit buffer from a screen snapshot
    pub fn load(&mut self, screen: &Screen) {
        for (idx, byte) in screen.as_bytes().iter().enumerate() {
            for bit in 0..8 {
                self.buffer[8 * idx + bit] = if byte & (0x80 >> bit) != 0 {
                    self.format.fg
                } else {
                    self.format.bg
                }
            }
        }
    }
    pub fn present(&self, window: &mut Window) -> Result<()> {
        window.update_with_buffer(&self.buffer, self.width, self.height)?;
        Ok(())
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(screen::WIDTH, screen::HEIGHT)
    }
}

#[derive(Debug)]
pub struct UI {
    window: Window,
    keyboard: Vec<Key>,
    fb: FrameBuffer,
    time: Instant,
}

impl UI {
    /// Presents a frame. Returns false when the window has been closed.
    pub fn frame(&mut self, cpu: &mut CPU) -> Result<bool> {
        if cpu.flags.pause {
            self.window.set_title("Cheep ⏸")
        } else {
            self.window.set_title(&format!(
                "Cheep ▶ {:02.02}",
                1.0 / self.time.elapsed().as_secs_f64()
            ));
        }
        if !self.window.is_open() {
            return Ok(false);
        }
        self.time = Instant::now();
        if let Some(screen) = cpu.frame() {
            self.fb.load(screen);
        }
        self.fb.present(&mut self.window)?;
        Ok(true)
    }

    /// Polls the keyboard: forwards hex-pad keys to the interpreter and
    /// handles the UI keybinds. Returns false on a quit request.
    pub fn keys(&mut self, cpu: &mut CPU) -> Result<bool> {
        let keys = self.window.get_keys();
        for key in self.keyboard.iter().filter(|key| !keys.contains(key)) {
            if let Some(key) = identify_key(*key) {
                cpu.release(key)?;
            }
        }
        for key in keys.iter().filter(|key| !self.keyboard.contains(key)) {
            match key {
                Key::F1 => cpu.dump(),
                Key::F2 => println!("{}", cpu.screen()),
                Key::F3 => println!("{}", cpu.mem()),
                Key::F4 => {
                    cpu.flags.debug();
                    eprintln!(
                        "Debug {}.",
                        if cpu.flags.debug { "enabled" } else { "disabled" }
                    )
                }
                Key::F5 => {
                    cpu.flags.pause();
                    eprintln!("{}.", if cpu.flags.pause { "Paused" } else { "Unpaused" })
                }
                Key::F6 => {
                    eprintln!("Step");
                    cpu.singlestep()?;
                }
                Key::F9 | Key::Delete => {
                    eprintln!("Soft reset {:03x}", cpu.pc());
                    cpu.soft_reset();
                }
                Key::F10 => {
                    eprintln!("Reset");
                    cpu.reset();
                }
                Key::Escape => return Ok(false),
                key => {
                    if let Some(key) = identify_key(*key) {
                        cpu.press(key)?;
                    }
                }
            }
        }
        self.keyboard = keys;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Window construction needs a display, but the builder itself doesn't
    #[test]
    fn builder_defaults() {
        let builder = UIBuilder::new();
        assert_eq!(screen::WIDTH, builder.width);
        assert_eq!(screen::HEIGHT, builder.height);
        assert_eq!(Some("Cheep"), builder.name);
        assert!(matches!(builder.window_options.scale, Scale::X16));
    }

    #[test]
    fn framebuffer_covers_screen() {
        let mut fb = FrameBuffer::default();
        let mut screen = Screen::new();
        screen.blit(0, 0, &[0x80]);
        fb.load(&screen);
        assert_eq!(fb.buffer[0], fb.format.fg);
        assert_eq!(fb.buffer[1], fb.format.bg);
        assert_eq!(screen::WIDTH * screen::HEIGHT, fb.buffer.len());
    }
}

/// Maps the standard 4x4 layout (1234/QWER/ASDF/ZXCV) onto the hex pad
pub fn identify_key(key: Key) -> Option<usize> {
    match key {
        Key::Key1 => Some(0x1),
        Key::Key2 => Some(0x2),
        Key::Key3 => Some(0x3),
        Key::Key4 => Some(0xc),
        Key::Q => Some(0x4),
        Key::W => Some(0x5),
        Key::E => Some(0x6),
        Key::R => Some(0xd),
        Key::A => Some(0x7),
        Key::S => Some(0x8),
        Key::D => Some(0x9),
        Key::F => Some(0xe),
        Key::Z => Some(0xa),
        Key::X => Some(0x0),
        Key::C => Some(0xb),
        Key::V => Some(0xf),
        _ => None,
    }
}
