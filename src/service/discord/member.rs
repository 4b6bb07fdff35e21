//! Guild member lookups and role mutations used by the ledger and the roster.
//!
//! `MemberDirectory` is the seam between the core and Discord. The bot uses
//! `SerenityMemberDirectory`; tests substitute an in-memory directory.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{GuildId, RoleId, UserId};
use serenity::http::Http;

use crate::error::AppError;

/// Maximum page size accepted by Discord's list guild members endpoint.
const MEMBER_PAGE_SIZE: u64 = 1000;

const ROSTER_AUDIT_REASON: &str = "Activity leaderboard update";

#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Whether the member is currently boosting the guild.
    async fn is_booster(&self, user_id: u64) -> Result<bool, AppError>;

    /// Ids of every member holding `role_id`.
    async fn role_holders(&self, role_id: u64) -> Result<Vec<u64>, AppError>;

    async fn add_role(&self, user_id: u64, role_id: u64) -> Result<(), AppError>;

    async fn remove_role(&self, user_id: u64, role_id: u64) -> Result<(), AppError>;
}

/// `MemberDirectory` backed by the Discord HTTP API for a single guild.
pub struct SerenityMemberDirectory {
    http: Arc<Http>,
    guild_id: GuildId,
}

impl SerenityMemberDirectory {
    pub fn new(http: Arc<Http>, guild_id: impl Into<GuildId>) -> Self {
        Self {
            http,
            guild_id: guild_id.into(),
        }
    }
}

#[async_trait]
impl MemberDirectory for SerenityMemberDirectory {
    async fn is_booster(&self, user_id: u64) -> Result<bool, AppError> {
        let member = self
            .guild_id
            .member(self.http.as_ref(), UserId::new(user_id))
            .await?;

        Ok(member.premium_since.is_some())
    }

    async fn role_holders(&self, role_id: u64) -> Result<Vec<u64>, AppError> {
        let role_id = RoleId::new(role_id);
        let mut holders = Vec::new();
        let mut after: Option<UserId> = None;

        loop {
            let members = self
                .guild_id
                .members(self.http.as_ref(), Some(MEMBER_PAGE_SIZE), after)
                .await?;
            let page_len = members.len() as u64;

            after = members.last().map(|m| m.user.id);
            holders.extend(
                members
                    .iter()
                    .filter(|m| m.roles.contains(&role_id))
                    .map(|m| m.user.id.get()),
            );

            if page_len < MEMBER_PAGE_SIZE {
                break;
            }
        }

        Ok(holders)
    }

    async fn add_role(&self, user_id: u64, role_id: u64) -> Result<(), AppError> {
        let member = self
            .guild_id
            .member(self.http.as_ref(), UserId::new(user_id))
            .await?;

        self.http
            .add_member_role(
                self.guild_id,
                member.user.id,
                RoleId::new(role_id),
                Some(ROSTER_AUDIT_REASON),
            )
            .await?;

        Ok(())
    }

    async fn remove_role(&self, user_id: u64, role_id: u64) -> Result<(), AppError> {
        let member = self
            .guild_id
            .member(self.http.as_ref(), UserId::new(user_id))
            .await?;

        self.http
            .remove_member_role(
                self.guild_id,
                member.user.id,
                RoleId::new(role_id),
                Some(ROSTER_AUDIT_REASON),
            )
            .await?;

        Ok(())
    }
}
