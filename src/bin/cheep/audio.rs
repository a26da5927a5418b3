// This code is licensed under MIT license (see LICENSE for details)

//! Drives the host beeper from the sound timer

use beep::beep;

/// Pitch of the buzzer, in Hz
const PITCH: u16 = 2093; // C7

/// An edge-triggered square-wave buzzer.
///
/// [Buzzer::set] is called once per frame with the current sound-timer state;
/// the tone only starts or stops when that state changes. If the host has no
/// beeper, the buzzer mutes itself rather than failing every frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Buzzer {
    muted: bool,
    sounding: bool,
}

impl Buzzer {
    pub fn new(muted: bool) -> Self {
        Buzzer {
            muted,
            sounding: false,
        }
    }

    pub fn set(&mut self, on: bool) {
        if self.muted || on == self.sounding {
            return;
        }
        self.sounding = on;
        if beep(if on { PITCH } else { 0 }).is_err() {
            self.muted = true;
            self.sounding = false;
        }
    }
}

impl Drop for Buzzer {
    fn drop(&mut self) {
        self.set(false);
    }
}
