//! Voice channel session accounting.
//!
//! A join opens a session under the user's voice key; the matching leave credits
//! four points per whole minute and removes the session. Moving between channels
//! keeps the original session running.

use chrono::{DateTime, Utc};
use dioxus_logger::tracing;

use crate::{
    cache::{voice_key, CacheStore},
    error::AppError,
    model::activity::{ActivityRecord, VoiceSession},
    service::activity::{ActivityService, ModifyOutcome},
};

impl<'a, C: CacheStore> ActivityService<'a, C> {
    /// Processes a voice state change; see `process_voice_transition_at`.
    pub async fn process_voice_transition(
        &self,
        old_channel: Option<u64>,
        new_channel: Option<u64>,
        user_id: u64,
        user_name: &str,
        is_bot: bool,
    ) {
        self.process_voice_transition_at(
            old_channel,
            new_channel,
            user_id,
            user_name,
            is_bot,
            Utc::now(),
        )
        .await
    }

    /// Processes a voice state change observed at `now`.
    ///
    /// - No channel -> channel: opens a session
    /// - Channel -> no channel: credits the session and removes it
    /// - Channel -> channel: ignored
    ///
    /// Bots never earn voice points. Failures are logged.
    pub async fn process_voice_transition_at(
        &self,
        old_channel: Option<u64>,
        new_channel: Option<u64>,
        user_id: u64,
        user_name: &str,
        is_bot: bool,
        now: DateTime<Utc>,
    ) {
        if is_bot {
            return;
        }

        match (old_channel, new_channel) {
            (None, Some(_)) => {
                if let Err(e) = self.open_voice_session(user_id, user_name, now).await {
                    tracing::error!(
                        "Failed to start voice session for user {}: {}",
                        user_id,
                        e
                    );
                }
            }
            (Some(_), None) => {
                if let Err(e) = self.credit_voice_session(user_id, user_name, now).await {
                    tracing::error!(
                        "Failed to credit voice session for user {}: {}",
                        user_id,
                        e
                    );
                }

                if let Err(e) = self.cache.del(&voice_key(user_id)).await {
                    tracing::error!(
                        "Failed to clear voice session for user {}: {}",
                        user_id,
                        e
                    );
                }
            }
            _ => {}
        }
    }

    async fn open_voice_session(
        &self,
        user_id: u64,
        user_name: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if self.get_activity(user_id).await?.is_none() {
            let mut record = ActivityRecord::new(user_id, user_name);
            if !self.update_activity(&mut record).await {
                tracing::warn!(
                    "Not tracking voice session for user {}: record could not be created",
                    user_id
                );
                return Ok(());
            }
        }

        let session = VoiceSession {
            user_id,
            joined_at: now,
        };
        self.cache
            .set(&voice_key(user_id), session.to_json()?)
            .await?;

        tracing::debug!("Started voice session for user {}", user_id);
        Ok(())
    }

    async fn credit_voice_session(
        &self,
        user_id: u64,
        user_name: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let Some(raw) = self.cache.get(&voice_key(user_id)).await? else {
            tracing::debug!("User {} left voice without an open session", user_id);
            return Ok(());
        };

        let earned = VoiceSession::from_json(&raw)?.points_until(now);

        match self
            .modify_activity(user_id, user_name, |record| {
                record.add_voice_points(earned);
                true
            })
            .await?
        {
            ModifyOutcome::Committed(record) => tracing::debug!(
                "Credited {} voice points to user {} (total {})",
                earned,
                user_id,
                record.voice_points
            ),
            ModifyOutcome::Conflicted => tracing::error!(
                "Dropped {} voice points for user {} after repeated conflicts",
                earned,
                user_id
            ),
            ModifyOutcome::Skipped => {}
        }

        Ok(())
    }
}
