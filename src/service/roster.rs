//! Top performer role reconciliation.
//!
//! The role is granted to the top `positions` users and kept until a holder falls out
//! of the top `limit`, so users near the cutoff do not flap between ticks. Blacklisted
//! users never hold the role; exception users always do.

use std::collections::HashSet;

use dioxus_logger::tracing;
use sea_orm::DatabaseConnection;

use crate::{
    cache::CacheStore,
    config::Config,
    error::AppError,
    model::activity::ActivityKind,
    service::{activity::ActivityService, discord::MemberDirectory},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSettings {
    pub role_id: u64,
    /// Ranks that earn the role.
    pub positions: usize,
    /// Ranks that keep the role once held.
    pub limit: usize,
    pub blacklist: HashSet<u64>,
    pub exceptions: HashSet<u64>,
}

impl RosterSettings {
    /// Builds roster settings from config; `None` when no top role is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let role_id = config.top_role_id?;
        Some(Self {
            role_id,
            positions: config.roster_positions,
            limit: config.roster_limit,
            blacklist: config.roster_blacklist.clone(),
            exceptions: config.roster_exceptions.clone(),
        })
    }
}

/// Role changes needed to reach the desired roster.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RosterPlan {
    pub add: Vec<u64>,
    pub remove: Vec<u64>,
}

/// Outcome counts of one reconciliation pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RosterReport {
    pub added: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Computes role changes from the ranked leaderboard and the current holders.
///
/// # Arguments
/// - `top_user_ids` - User ids ordered by rank, best first
/// - `holders` - Users currently holding the role
/// - `settings` - Roster thresholds and overrides
pub fn plan_roster(top_user_ids: &[u64], holders: &[u64], settings: &RosterSettings) -> RosterPlan {
    let retained: HashSet<u64> = top_user_ids.iter().take(settings.limit).copied().collect();
    let holders: HashSet<u64> = holders.iter().copied().collect();

    let mut remove: Vec<u64> = holders
        .iter()
        .filter(|id| {
            settings.blacklist.contains(*id)
                || (!retained.contains(*id) && !settings.exceptions.contains(*id))
        })
        .copied()
        .collect();

    let mut add: Vec<u64> = top_user_ids
        .iter()
        .take(settings.positions.min(settings.limit))
        .chain(settings.exceptions.iter())
        .filter(|id| !holders.contains(*id) && !settings.blacklist.contains(*id))
        .copied()
        .collect();

    remove.sort_unstable();
    add.sort_unstable();
    add.dedup();

    RosterPlan { add, remove }
}

pub struct RosterService<'a, C: CacheStore> {
    ledger: ActivityService<'a, C>,
    settings: &'a RosterSettings,
}

impl<'a, C: CacheStore> RosterService<'a, C> {
    pub fn new(db: &'a DatabaseConnection, cache: &'a C, settings: &'a RosterSettings) -> Self {
        Self {
            ledger: ActivityService::new(db, cache),
            settings,
        }
    }

    /// Brings the role holders in line with the current leaderboard.
    ///
    /// Individual role changes are best-effort: a failure is logged and counted, and
    /// the remaining changes still run.
    ///
    /// # Returns
    /// - `Ok(RosterReport)` - Counts of applied and failed changes
    /// - `Err(AppError)` - Leaderboard or role holder lookup failed; nothing changed
    pub async fn reconcile<M: MemberDirectory>(
        &self,
        members: &M,
    ) -> Result<RosterReport, AppError> {
        let top = self
            .ledger
            .get_top_users(1, ActivityKind::Text, self.settings.limit.max(1) as u64)
            .await?;
        let top_user_ids: Vec<u64> = top.users.iter().map(|user| user.user_id).collect();
        let holders = members.role_holders(self.settings.role_id).await?;

        let plan = plan_roster(&top_user_ids, &holders, self.settings);
        let mut report = RosterReport::default();

        for user_id in plan.remove {
            match members.remove_role(user_id, self.settings.role_id).await {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    tracing::warn!("Failed to remove top role from user {}: {}", user_id, e);
                    report.failed += 1;
                }
            }
        }

        for user_id in plan.add {
            match members.add_role(user_id, self.settings.role_id).await {
                Ok(()) => report.added += 1,
                Err(e) => {
                    tracing::warn!("Failed to grant top role to user {}: {}", user_id, e);
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            "Top role reconciled: {} added, {} removed, {} failed",
            report.added,
            report.removed,
            report.failed
        );

        Ok(report)
    }
}
