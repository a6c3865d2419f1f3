//! Serial console command source.
//!
//! A background thread reads lines from the console (UART0 on the device,
//! stdin on the host), parses each into an [`AppCommand`] and hands it to
//! the control loop over a channel.  The loop drains the channel once per
//! tick, so commands run on the loop's thread like everything else.

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::{info, warn};

use crate::app::commands::AppCommand;

const CONSOLE_STACK_SIZE: usize = 8 * 1024;

/// Receiving end of the console reader.
pub struct Console {
    rx: Receiver<AppCommand>,
}

impl Console {
    /// Read commands from stdin.
    pub fn spawn() -> io::Result<Self> {
        Self::from_reader(io::BufReader::new(io::stdin()))
    }

    /// Read commands from any line source until it ends.
    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("console".into())
            .stack_size(CONSOLE_STACK_SIZE)
            .spawn(move || {
                for line in reader.lines() {
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => {
                            warn!("Console: read failed: {e}");
                            break;
                        }
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match line.parse::<AppCommand>() {
                        Ok(cmd) => {
                            info!("Console: {cmd:?}");
                            if tx.send(cmd).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Console: {e}"),
                    }
                }
            })?;
        Ok(Self { rx })
    }

    /// Next queued command, without blocking.
    pub fn try_next(&self) -> Option<AppCommand> {
        match self.rx.try_recv() {
            Ok(cmd) => Some(cmd),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}
