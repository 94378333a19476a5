// Collision feedback: turns hard contacts on subscribed bodies into sound cues

use rand::{Rng, RngCore};
use std::collections::HashMap;

use crate::engine::audio::CuePlayer;
use crate::engine::physics::{ContactEvent, RigidBodyHandle};

/// Proof that a body is listening for collisions
///
/// Tokens are never reused, so a stale token cannot cancel a newer subscription
/// on the same body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken {
    id: u64,
    body: RigidBodyHandle,
}

pub struct CollisionFeedback {
    subscriptions: HashMap<RigidBodyHandle, SubscriptionToken>,
    next_id: u64,
    /// Contacts slower than this (m/s) stay silent
    threshold: f32,
    player: Box<dyn CuePlayer>,
    rng: Box<dyn RngCore>,
    trigger_count: u64,
    /// Whether the last cue failed; keeps a dead device from flooding the log
    player_failing: bool,
}

impl CollisionFeedback {
    pub fn new(threshold: f32, player: Box<dyn CuePlayer>, rng: Box<dyn RngCore>) -> Self {
        Self {
            subscriptions: HashMap::new(),
            next_id: 0,
            threshold,
            player,
            rng,
            trigger_count: 0,
            player_failing: false,
        }
    }

    /// Start listening for collisions on a body
    ///
    /// A body has at most one subscription; subscribing twice hands back the
    /// existing token.
    pub fn subscribe(&mut self, body: RigidBodyHandle) -> SubscriptionToken {
        if let Some(token) = self.subscriptions.get(&body) {
            log::warn!("Body {:?} is already subscribed", body);
            return *token;
        }

        let token = SubscriptionToken {
            id: self.next_id,
            body,
        };
        self.next_id += 1;
        self.subscriptions.insert(body, token);
        token
    }

    /// Stop listening; returns false if the token no longer matched anything
    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        match self.subscriptions.get(&token.body) {
            Some(current) if *current == token => {
                self.subscriptions.remove(&token.body);
                true
            }
            _ => false,
        }
    }

    pub fn is_subscribed(&self, body: RigidBodyHandle) -> bool {
        self.subscriptions.contains_key(&body)
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Number of cues triggered so far
    pub fn trigger_count(&self) -> u64 {
        self.trigger_count
    }

    /// React to one contact; returns true when a cue was triggered
    ///
    /// Events naming bodies that were removed since the step are ignored. A
    /// contact between two subscribed bodies still makes a single sound. Audio
    /// failures are logged and otherwise swallowed.
    pub fn handle(&mut self, event: &ContactEvent) -> bool {
        if !self.is_subscribed(event.body1) && !self.is_subscribed(event.body2) {
            return false;
        }
        // Written so NaN never passes
        if !(event.impact_velocity >= self.threshold) {
            return false;
        }

        let volume: f32 = self.rng.random();
        self.trigger_count += 1;
        log::debug!(
            "Impact at {:.2} m/s, cue volume {:.2}",
            event.impact_velocity,
            volume
        );

        match self.player.play(volume) {
            Ok(()) => self.player_failing = false,
            Err(e) if self.player_failing => log::debug!("Collision cue failed: {}", e),
            Err(e) => {
                log::warn!("Collision cue failed: {}", e);
                self.player_failing = true;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::audio::testing::RecordingCuePlayer;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn handle(index: u32) -> RigidBodyHandle {
        RigidBodyHandle::from_raw_parts(index, 0)
    }

    fn feedback(player: &RecordingCuePlayer) -> CollisionFeedback {
        CollisionFeedback::new(
            1.5,
            Box::new(player.clone()),
            Box::new(StdRng::seed_from_u64(7)),
        )
    }

    fn hit(body1: u32, body2: u32, impact_velocity: f32) -> ContactEvent {
        ContactEvent {
            body1: handle(body1),
            body2: handle(body2),
            impact_velocity,
        }
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let player = RecordingCuePlayer::new();
        let mut feedback = feedback(&player);

        let token = feedback.subscribe(handle(1));
        assert!(feedback.is_subscribed(handle(1)));
        assert_eq!(token.body, handle(1));
        assert_eq!(feedback.subscription_count(), 1);

        assert!(feedback.unsubscribe(token));
        assert!(!feedback.unsubscribe(token));
        assert!(!feedback.is_subscribed(handle(1)));
    }

    #[test]
    fn test_double_subscribe_keeps_one_subscription() {
        let player = RecordingCuePlayer::new();
        let mut feedback = feedback(&player);

        let first = feedback.subscribe(handle(3));
        let second = feedback.subscribe(handle(3));
        assert_eq!(first, second);
        assert_eq!(feedback.subscription_count(), 1);
    }

    #[test]
    fn test_stale_token_leaves_new_subscription_alone() {
        let player = RecordingCuePlayer::new();
        let mut feedback = feedback(&player);

        let old = feedback.subscribe(handle(2));
        feedback.unsubscribe(old);
        let _new = feedback.subscribe(handle(2));

        assert!(!feedback.unsubscribe(old));
        assert!(feedback.is_subscribed(handle(2)));
    }

    #[test]
    fn test_threshold_gates_cues() {
        let player = RecordingCuePlayer::new();
        let mut feedback = feedback(&player);
        feedback.subscribe(handle(1));

        assert!(!feedback.handle(&hit(1, 0, 0.4)));
        assert!(!feedback.handle(&hit(1, 0, 1.49)));
        assert!(feedback.handle(&hit(1, 0, 1.5)));
        assert!(feedback.handle(&hit(0, 1, 5.0)));
        assert!(!feedback.handle(&hit(1, 0, f32::NAN)));

        assert_eq!(feedback.trigger_count(), 2);
        let plays = player.plays();
        assert_eq!(plays.len(), 2);
        assert!(plays.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn test_unsubscribed_bodies_are_silent() {
        let player = RecordingCuePlayer::new();
        let mut feedback = feedback(&player);
        let token = feedback.subscribe(handle(1));
        feedback.unsubscribe(token);

        assert!(!feedback.handle(&hit(1, 0, 10.0)));
        assert!(!feedback.handle(&hit(5, 6, 10.0)));
        assert!(player.plays().is_empty());
    }

    #[test]
    fn test_two_subscribed_bodies_make_one_sound() {
        let player = RecordingCuePlayer::new();
        let mut feedback = feedback(&player);
        feedback.subscribe(handle(1));
        feedback.subscribe(handle(2));

        assert!(feedback.handle(&hit(1, 2, 3.0)));
        assert_eq!(player.plays().len(), 1);
    }

    #[test]
    fn test_audio_failure_is_swallowed() {
        let player = RecordingCuePlayer::failing();
        let mut feedback = feedback(&player);
        feedback.subscribe(handle(1));

        assert!(feedback.handle(&hit(1, 0, 3.0)));
        assert!(feedback.handle(&hit(1, 0, 3.0)));
        assert_eq!(feedback.trigger_count(), 2);
    }

    #[test]
    fn test_volumes_follow_seed() {
        let a = RecordingCuePlayer::new();
        let b = RecordingCuePlayer::new();
        let mut fa = feedback(&a);
        let mut fb = feedback(&b);
        fa.subscribe(handle(1));
        fb.subscribe(handle(1));

        for _ in 0..4 {
            fa.handle(&hit(1, 0, 2.0));
            fb.handle(&hit(1, 0, 2.0));
        }
        assert_eq!(a.plays(), b.plays());
    }
}
