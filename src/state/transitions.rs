use time::OffsetDateTime;
use tracing::debug;

use crate::{
    dto::ws::RealtimeMessage,
    state::{
        GamedaySnapshot,
        event::{Event, Leaderboard},
        phase::{Phase, resolve},
        reconciler,
    },
};

/// Fact delivered to the mutation funnel by one of the session's producers.
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Initial fetch on appear succeeded.
    EventLoaded(Event),
    /// Fallback poll fetched a fresh copy.
    EventRefreshed(Event),
    /// Initial fetch on appear failed.
    LoadFailed(String),
    /// Decoded push message.
    Realtime(RealtimeMessage),
    /// Leaderboard fetched on demand or by the poller.
    LeaderboardReplaced(Leaderboard),
    /// Check-in accepted by the backend.
    CheckedIn { points_earned: i64 },
    /// Authoritative balance returned by an activation submission.
    BalanceReplaced(i64),
}

impl GamedaySnapshot {
    /// Apply one fact, then refresh the derived fields and bump the version.
    pub fn apply(&mut self, mutation: Mutation, now: OffsetDateTime) {
        match mutation {
            Mutation::EventLoaded(event) | Mutation::EventRefreshed(event) => {
                self.replace_event(event);
            }
            Mutation::LoadFailed(message) => self.load_error = Some(message),
            Mutation::Realtime(message) => self.apply_realtime(message),
            Mutation::LeaderboardReplaced(leaderboard) => self.leaderboard = Some(leaderboard),
            Mutation::CheckedIn { points_earned } => {
                self.checked_in = true;
                self.points_balance += points_earned;
            }
            Mutation::BalanceReplaced(balance) => self.points_balance = balance,
        }

        self.refresh_derived(now);
        self.version += 1;
    }

    fn replace_event(&mut self, mut event: Event) {
        event.activations = reconciler::load(std::mem::take(&mut event.activations));
        self.event = Some(event);
        self.load_error = None;
    }

    fn apply_realtime(&mut self, message: RealtimeMessage) {
        if let RealtimeMessage::LeaderboardUpdate { leaderboard, .. } = message {
            self.leaderboard = Some(leaderboard);
            return;
        }

        let Some(event) = self.event.as_mut() else {
            debug!(?message, "no event loaded; dropping realtime message");
            return;
        };

        match message {
            RealtimeMessage::ScoreUpdate {
                home_score,
                away_score,
                period,
                ..
            } => {
                if let Some(score) = home_score {
                    event.home_score = score;
                }
                if let Some(score) = away_score {
                    event.away_score = score;
                }
                if period.is_some() {
                    event.period = period;
                }
            }
            RealtimeMessage::ActivationStarted { activation, .. }
            | RealtimeMessage::ActivationEnded { activation, .. } => {
                reconciler::upsert(&mut event.activations, activation);
            }
            RealtimeMessage::EventStatusChange { status, .. } => event.status = status,
            RealtimeMessage::LeaderboardUpdate { .. } => {}
        }
    }

    fn refresh_derived(&mut self, now: OffsetDateTime) {
        self.active_activation = self
            .event
            .as_ref()
            .and_then(|event| reconciler::active(&event.activations))
            .cloned();

        self.phase = match &self.event {
            Some(event) => resolve(self.checked_in, event.status, event.start_time, now),
            None if self.checked_in => Phase::CheckedIn,
            None => Phase::PreGame,
        };
    }
}
