//! Gamification Service - points, levels and badges per email address

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;
use serde::Serialize;

use crate::domain::DomainError;
use crate::models::site_settings::{GamificationSettings, LevelThreshold};
use crate::models::user_gamification::{self, Entity as UserGamification};
use crate::utils::time::now_iso;

/// Points granted for every submitted purchase request.
pub const PURCHASE_REQUEST_POINTS: i64 = 50_000_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextLevel {
    pub name: String,
    pub min_points: i64,
    pub remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GamificationProfile {
    pub email: String,
    pub points: i64,
    pub level: String,
    pub badges: Vec<String>,
    pub achievements: Vec<String>,
    pub next_level: Option<NextLevel>,
    pub progress: f64,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Highest level whose threshold is at or below `points`.
pub fn level_for(table: &GamificationSettings, points: i64) -> Option<&LevelThreshold> {
    table
        .levels
        .iter()
        .take_while(|level| level.min_points <= points)
        .last()
        .or_else(|| table.levels.first())
}

pub fn next_level(table: &GamificationSettings, points: i64) -> Option<NextLevel> {
    table
        .levels
        .iter()
        .find(|level| level.min_points > points)
        .map(|level| NextLevel {
            name: level.name.clone(),
            min_points: level.min_points,
            remaining: level.min_points - points,
        })
}

/// Fraction of the way from the current level to the next one, in `0..=1`.
pub fn progress(table: &GamificationSettings, points: i64) -> f64 {
    let floor = level_for(table, points).map(|l| l.min_points).unwrap_or(0);
    match next_level(table, points) {
        Some(next) if next.min_points > floor => {
            ((points - floor) as f64 / (next.min_points - floor) as f64).clamp(0.0, 1.0)
        }
        Some(_) => 0.0,
        None => 1.0,
    }
}

/// Existing badges in their original order, followed by any newly
/// qualified badges in table order. Badges are never taken away.
pub fn earned_badges(
    table: &GamificationSettings,
    points: i64,
    existing: &[String],
) -> Vec<String> {
    let mut badges = existing.to_vec();
    for rule in &table.badges {
        if points >= rule.min_points && !badges.contains(&rule.id) {
            badges.push(rule.id.clone());
        }
    }
    badges
}

pub fn build_profile(
    table: &GamificationSettings,
    email: String,
    row: Option<&user_gamification::Model>,
) -> Result<GamificationProfile, DomainError> {
    let points = row.map(|r| r.points).unwrap_or(0);
    let level = level_for(table, points)
        .map(|l| l.name.clone())
        .or_else(|| row.map(|r| r.level.clone()))
        .unwrap_or_default();

    let (badges, achievements) = match row {
        Some(r) => (r.badge_list()?, r.achievement_list()?),
        None => (Vec::new(), Vec::new()),
    };

    Ok(GamificationProfile {
        email,
        points,
        level,
        badges,
        achievements,
        next_level: next_level(table, points),
        progress: progress(table, points),
    })
}

pub async fn get_profile<C: ConnectionTrait>(
    db: &C,
    table: &GamificationSettings,
    email: &str,
) -> Result<GamificationProfile, DomainError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(DomainError::Validation("email is required".into()));
    }

    let row = UserGamification::find()
        .filter(user_gamification::Column::Email.eq(&email))
        .one(db)
        .await?;

    build_profile(table, email, row.as_ref())
}

/// Add `amount` points to `email`, creating the row on first award.
///
/// The increment is a single `INSERT ... ON CONFLICT DO UPDATE`, so two
/// concurrent awards for the same address can neither insert twice nor
/// lose an increment. Level and badges are then recomputed on the same
/// connection; run this inside a transaction to keep both steps together.
pub async fn award_points<C: ConnectionTrait>(
    db: &C,
    table: &GamificationSettings,
    email: &str,
    amount: i64,
) -> Result<user_gamification::Model, DomainError> {
    if amount <= 0 {
        return Err(DomainError::Validation("award amount must be positive".into()));
    }

    let email = normalize_email(email);
    let now = now_iso();
    let initial_level = level_for(table, amount)
        .map(|l| l.name.clone())
        .unwrap_or_default();

    let row = user_gamification::ActiveModel {
        email: Set(email.clone()),
        points: Set(amount),
        level: Set(initial_level),
        badges: Set("[]".to_string()),
        achievements: Set("[]".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    };

    UserGamification::insert(row)
        .on_conflict(
            OnConflict::column(user_gamification::Column::Email)
                .value(
                    user_gamification::Column::Points,
                    Expr::col((UserGamification, user_gamification::Column::Points)).add(amount),
                )
                .value(user_gamification::Column::UpdatedAt, Expr::value(now.clone()))
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    let current = UserGamification::find()
        .filter(user_gamification::Column::Email.eq(&email))
        .one(db)
        .await?
        .ok_or_else(|| DomainError::Database(format!("gamification row for {} vanished", email)))?;

    let level = level_for(table, current.points)
        .map(|l| l.name.clone())
        .unwrap_or_else(|| current.level.clone());
    let badges = earned_badges(table, current.points, &current.badge_list()?);

    let mut active: user_gamification::ActiveModel = current.into();
    active.level = Set(level);
    active.badges = Set(serde_json::to_string(&badges)?);
    active.updated_at = Set(now);

    Ok(active.update(db).await?)
}
