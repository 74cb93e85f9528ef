//! Settings Service - the single `main_settings` row

use sea_orm::*;

use crate::domain::DomainError;
use crate::models::site_settings::{self, SETTINGS_ID, SettingsUpdate, SiteSettings};
use crate::utils::time::now_iso;

/// Load and parse the settings row. A missing row yields the defaults.
pub async fn load<C: ConnectionTrait>(db: &C) -> Result<SiteSettings, DomainError> {
    match site_settings::Entity::find_by_id(SETTINGS_ID).one(db).await? {
        Some(model) => SiteSettings::try_from(model),
        None => {
            tracing::warn!("Settings row missing, serving defaults");
            Ok(SiteSettings::default())
        }
    }
}

/// Merge `update` into the stored settings, validate, and persist.
pub async fn update(
    db: &DatabaseConnection,
    update: SettingsUpdate,
) -> Result<SiteSettings, DomainError> {
    let mut settings = load(db).await?;
    settings.apply(update);
    settings.validate()?;

    let now = now_iso();
    let active = settings.to_active_model(&now)?;

    let exists = site_settings::Entity::find_by_id(SETTINGS_ID)
        .one(db)
        .await?
        .is_some();
    if exists {
        active.update(db).await?;
    } else {
        active.insert(db).await?;
    }

    settings.updated_at = Some(now);
    tracing::info!("Site settings updated");
    Ok(settings)
}
