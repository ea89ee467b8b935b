//! Per-user dashboard and the users overview

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::account::{ProfileRepository, RecipientOption, User, UserRepository};
use crate::donation::DonationRepository;
use crate::goals::{GoalRepository, GoalView};
use crate::ledger::{LedgerRepository, TransactionView};
use crate::money::format_money;

const RECENT_TRANSACTIONS: i64 = 10;
const DASHBOARD_GOALS: i64 = 5;

pub const UNCATEGORISED: &str = "Uncategorised";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardTotals {
    #[schema(example = "1500.00")]
    pub incoming: String,
    #[schema(example = "320.40")]
    pub outgoing: String,
    #[schema(example = "1179.60")]
    pub net: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Dashboard {
    pub display_name: String,
    pub transactions: Vec<TransactionView>,
    pub goals: Vec<GoalView>,
    pub totals: DashboardTotals,
    /// Packs pledged by this user
    pub donation_packs: i64,
    pub available_recipients: Vec<RecipientOption>,
    pub server_time: DateTime<Utc>,
}

pub async fn load(pool: &PgPool, user: &User) -> Result<Dashboard, sqlx::Error> {
    let profile = ProfileRepository::ensure_profile(pool, user).await?;
    let transactions = LedgerRepository::recent(pool, user.user_id, RECENT_TRANSACTIONS).await?;
    let goals = GoalRepository::list(pool, user.user_id, Some(DASHBOARD_GOALS)).await?;
    let totals = LedgerRepository::totals(pool, user.user_id).await?;
    let donation_packs = DonationRepository::packs_for_user(pool, user).await?;
    let available_recipients = ProfileRepository::available_recipients(pool, user.user_id).await?;

    Ok(Dashboard {
        display_name: profile.display_name,
        transactions: transactions.into_iter().map(TransactionView::from).collect(),
        goals: goals.into_iter().map(GoalView::from).collect(),
        totals: DashboardTotals {
            incoming: format_money(totals.incoming),
            outgoing: format_money(totals.outgoing),
            net: format_money(totals.net()),
        },
        donation_packs,
        available_recipients,
        server_time: Utc::now(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MembershipCount {
    #[schema(example = "Standard")]
    pub membership_level: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UsersOverview {
    pub total_users: i64,
    pub profile_breakdown: Vec<MembershipCount>,
}

/// Blank levels fold into one "Uncategorised" bucket
pub fn membership_breakdown(rows: Vec<(String, i64)>) -> Vec<MembershipCount> {
    let mut out: Vec<MembershipCount> = Vec::with_capacity(rows.len());
    for (level, count) in rows {
        let level = match level.trim() {
            "" => UNCATEGORISED.to_string(),
            l => l.to_string(),
        };
        match out.iter_mut().find(|m| m.membership_level == level) {
            Some(existing) => existing.count += count,
            None => out.push(MembershipCount {
                membership_level: level,
                count,
            }),
        }
    }
    out
}

pub async fn users_overview(pool: &PgPool) -> Result<UsersOverview, sqlx::Error> {
    let total_users = UserRepository::count(pool).await?;
    let rows = ProfileRepository::membership_breakdown(pool).await?;
    Ok(UsersOverview {
        total_users,
        profile_breakdown: membership_breakdown(rows),
    })
}
