//! Web UI lifecycle adapter.
//!
//! Implements [`WebPort`]: start/stop, the idle timer and the basic-auth
//! credentials the settings pages are served with.  Page delivery and
//! request parsing belong to the HTTP transport, which reports activity
//! through [`WebUi::mark_activity`] and hands submissions to
//! [`AppService::apply_form`](crate::app::service::AppService::apply_form).

use log::{debug, info};

use crate::app::ports::{ClockPort, WebPort};

/// Basic-auth credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Lifecycle state of the settings web server.
pub struct WebUi<C> {
    clock: C,
    running: bool,
    last_activity_ms: u64,
    credentials: Option<Credentials>,
}

impl<C: ClockPort> WebUi<C> {
    pub fn new(clock: C) -> Self {
        let now = clock.now_ms();
        Self {
            clock,
            running: false,
            last_activity_ms: now,
            credentials: None,
        }
    }

    /// A request arrived.
    pub fn mark_activity(&mut self) {
        self.last_activity_ms = self.clock.now_ms();
    }

    /// Credentials a request must present, if any.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Check a request's basic-auth pair.  Open when no credentials are set.
    pub fn authorize(&self, user: &str, password: &str) -> bool {
        self.credentials
            .as_ref()
            .is_none_or(|c| c.user == user && c.password == password)
    }
}

impl<C: ClockPort> WebPort for WebUi<C> {
    fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.mark_activity();
            info!("WebUi: started");
        }
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            info!("WebUi: stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn reset_idle_time(&mut self) {
        self.mark_activity();
    }

    fn idle_time_ms(&self) -> u64 {
        self.clock.now_ms().saturating_sub(self.last_activity_ms)
    }

    fn set_authentication(&mut self, credentials: Option<(&str, &str)>) {
        debug!("WebUi: authentication {}", if credentials.is_some() { "on" } else { "off" });
        self.credentials = credentials.map(|(user, password)| Credentials {
            user: user.to_owned(),
            password: password.to_owned(),
        });
    }
}
