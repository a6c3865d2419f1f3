//! Hardware adapter: the restore button.
//!
//! The only board input the core cares about is the restore pin, sampled
//! once at boot.  Any [`embedded_hal::digital::InputPin`] works, so the
//! ESP-IDF `PinDriver` on the device and a plain mock in tests share the
//! same code path.

use embedded_hal::digital::InputPin;
use log::{info, warn};

/// Restore-mode button.  HIGH requests restore mode.
pub struct RestoreButton<P> {
    pin: P,
}

impl<P: InputPin> RestoreButton<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Sample the pin.  A read error counts as "not requested" so a
    /// flaky input cannot lock the device out of its stored settings.
    pub fn restore_requested(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(true) => {
                info!("RestoreButton: restore mode requested");
                true
            }
            Ok(false) => false,
            Err(e) => {
                warn!("RestoreButton: pin read failed ({e:?}), ignoring");
                false
            }
        }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

/// Host stand-in for the restore GPIO.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct SimPin {
    pub high: bool,
}

#[cfg(not(target_os = "espidf"))]
impl embedded_hal::digital::ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

#[cfg(not(target_os = "espidf"))]
impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }
}
