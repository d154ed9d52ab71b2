use chrono::{DateTime, Utc};
use log::info;
use rand::Rng;
use serde::Serialize;

use crate::api::models::AppState;
use crate::ws::hub::ServerMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityStatus {
    pub current_iteration: u64,
    pub last_iteration: DateTime<Utc>,
    pub security_score: f64,
    pub active_protocols: u32,
    pub threat_level: ThreatLevel,
}

/// Self-adjusting security score. Each iteration nudges the score up by
/// a random amount; the threat level is derived from the score.
#[derive(Debug)]
pub struct SecurityMonitor {
    current_iteration: u64,
    last_iteration: DateTime<Utc>,
    security_score: f64,
    active_protocols: u32,
}

impl SecurityMonitor {
    pub fn new() -> Self {
        Self {
            current_iteration: 1,
            last_iteration: Utc::now(),
            security_score: 85.0,
            active_protocols: 4,
        }
    }

    pub fn reset(&mut self) {
        *self = SecurityMonitor::new();
    }

    fn threat_level(score: f64) -> ThreatLevel {
        if score >= 95.0 {
            ThreatLevel::Low
        } else if score >= 85.0 {
            ThreatLevel::Medium
        } else {
            ThreatLevel::High
        }
    }

    pub fn status(&self) -> SecurityStatus {
        SecurityStatus {
            current_iteration: self.current_iteration,
            last_iteration: self.last_iteration,
            security_score: self.security_score,
            active_protocols: self.active_protocols,
            threat_level: Self::threat_level(self.security_score),
        }
    }

    /// Run one improvement iteration. Returns the new status and whether
    /// the threat level changed.
    pub fn iterate(&mut self, rng: &mut impl Rng) -> (SecurityStatus, bool) {
        let before = Self::threat_level(self.security_score);
        self.security_score = (self.security_score + rng.gen_range(0.1..0.8)).min(100.0);
        self.current_iteration += 1;
        self.last_iteration = Utc::now();

        let status = self.status();
        (status, before != Self::threat_level(self.security_score))
    }
}

impl Default for SecurityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// One scheduler tick over the security monitor; a `security_alert` goes
/// out only when the threat level moves.
pub fn security_tick(state: &AppState, rng: &mut impl Rng) -> SecurityStatus {
    let (status, level_changed) = {
        let mut monitor = state.security.lock().expect("mutex poisoned");
        monitor.iterate(rng)
    };

    if level_changed {
        info!(
            "SECURITY - threat level now {:?} (score {:.1})",
            status.threat_level, status.security_score
        );
        state.hub.send(ServerMessage::SecurityAlert {
            status: status.clone(),
        });
    }
    status
}
