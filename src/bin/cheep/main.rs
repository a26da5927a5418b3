// This code is licensed under MIT license (see LICENSE for details)

//! Cheep: a Chip-8 interpreter
//!
//! The host loop alternates input polling, a batch of instruction steps, a
//! 60Hz timer tick, and a frame present, terminating on a fatal fault or
//! when the window closes.

mod audio;
mod ui;

use audio::Buzzer;
use cheep::{error::Result, Flags, CPU};
use gumdrop::Options;
use owo_colors::OwoColorize;
use std::{
    path::PathBuf,
    time::{Duration, Instant},
};
use ui::{UIBuilder, UI};

/// One period of the timer cadence
const TICK: Duration = Duration::from_nanos(1_000_000_000 / 60);

pub fn main() -> Result<()> {
    let options = Arguments::parse_args_default_or_exit();
    let state = State::new(options)?;
    for result in state {
        if let Err(e) = result {
            eprintln!("{}", e.bold().red());
            break;
        }
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Options)]
struct Arguments {
    #[options(help = "Load a ROM to run on Cheep.", required, free)]
    pub file: PathBuf,
    #[options(help = "Print this help message.")]
    help: bool,
    #[options(help = "Enable live disassembly at startup.")]
    pub debug: bool,
    #[options(help = "Enable pause mode at startup.")]
    pub pause: bool,
    #[options(help = "Set the instructions-per-frame rate.", default = "8")]
    pub speed: usize,
    #[options(help = "Set the target framerate.", default = "60", meta = "FR")]
    pub frame_rate: u64,
    #[options(help = "Disable the beeper.")]
    pub mute: bool,
}

#[derive(Debug)]
struct State {
    pub speed: usize,
    pub rate: u64,
    pub cpu: CPU,
    pub ui: UI,
    pub buzzer: Buzzer,
    /// Deadline of the next frame
    pub ft: Instant,
    /// Accumulator for the 60Hz timer cadence
    pub tt: Instant,
}

impl State {
    fn new(options: Arguments) -> Result<Self> {
        Ok(State {
            speed: options.speed,
            rate: options.frame_rate,
            cpu: CPU::new(
                &options.file,
                Flags {
                    debug: options.debug,
                    pause: options.pause,
                    ..Default::default()
                },
            )?,
            ui: UIBuilder::new().build()?,
            buzzer: Buzzer::new(options.mute),
            ft: Instant::now(),
            tt: Instant::now(),
        })
    }

    /// Ticks the timers on their own 60Hz cadence, independent of both the
    /// frame rate and the instruction rate
    fn tick_timers(&mut self) {
        while self.tt.elapsed() >= TICK {
            if !self.cpu.flags.pause {
                self.cpu.tick();
            }
            self.tt += TICK;
        }
        self.buzzer.set(self.cpu.sound() > 0);
    }

    fn wait_for_next_frame(&mut self) {
        let rate = Duration::from_nanos(1_000_000_000 / self.rate + 1);
        std::thread::sleep(rate.saturating_sub(self.ft.elapsed()));
        self.ft += rate;
    }
}

impl Iterator for State {
    type Item = Result<()>;

    fn next(&mut self) -> Option<Self::Item> {
        self.wait_for_next_frame();
        match self.ui.keys(&mut self.cpu) {
            Ok(keep_going) if !keep_going => return None,
            Err(e) => return Some(Err(e)),
            _ => (),
        }
        if let Err(e) = self.cpu.multistep(self.speed) {
            return Some(Err(e));
        }
        self.tick_timers();
        match self.ui.frame(&mut self.cpu) {
            Ok(keep_going) if !keep_going => return None,
            Err(e) => return Some(Err(e)),
            _ => (),
        }
        Some(Ok(()))
    }
}
