use std::collections::BTreeMap;

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::domain::DomainError;

pub const SETTINGS_ID: &str = "main_settings";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub site_name: String,
    pub contact_whatsapp: Option<String>,
    pub banners: String,        // JSON array of Banner
    pub popup_modal: String,    // JSON object
    pub appearance: String,     // JSON object
    pub currency_rates: String, // JSON object
    pub gamification: String,   // JSON object
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub id: String,
    pub image_url: String,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupModal {
    pub enabled: bool,
    pub title: String,
    pub message: String,
    pub image_url: Option<String>,
    pub cta_label: Option<String>,
    pub cta_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appearance {
    pub primary_color: String,
    pub secondary_color: String,
    pub logo_url: Option<String>,
    pub dark_mode: bool,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            primary_color: "#2563eb".to_string(),
            secondary_color: "#f59e0b".to_string(),
            logo_url: None,
            dark_mode: false,
            extra: Map::new(),
        }
    }
}

/// Exchange rates expressed as units of each currency per one unit of `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRates {
    pub base: String,
    pub rates: BTreeMap<String, f64>,
}

impl Default for CurrencyRates {
    fn default() -> Self {
        Self {
            base: "IDR".to_string(),
            rates: BTreeMap::from([("IDR".to_string(), 1.0), ("USD".to_string(), 0.000063)]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelThreshold {
    pub name: String,
    pub min_points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeRule {
    pub id: String,
    pub name: String,
    pub min_points: i64,
}

/// Point table: ordered levels and badge rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamificationSettings {
    pub levels: Vec<LevelThreshold>,
    pub badges: Vec<BadgeRule>,
}

impl Default for GamificationSettings {
    fn default() -> Self {
        let level = |name: &str, min_points: i64| LevelThreshold {
            name: name.to_string(),
            min_points,
        };
        let badge = |id: &str, name: &str, min_points: i64| BadgeRule {
            id: id.to_string(),
            name: name.to_string(),
            min_points,
        };
        Self {
            levels: vec![
                level("Bronze", 0),
                level("Silver", 50_000_000),
                level("Gold", 150_000_000),
                level("Platinum", 500_000_000),
                level("Diamond", 1_000_000_000),
            ],
            badges: vec![
                badge("first_purchase", "First Purchase", 1),
                badge("loyal_buyer", "Loyal Buyer", 100_000_000),
                badge("big_spender", "Big Spender", 250_000_000),
                badge("legend", "Legend", 1_000_000_000),
            ],
        }
    }
}

/// Typed view of the settings row, as exchanged with API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub site_name: String,
    pub contact_whatsapp: Option<String>,
    pub banners: Vec<Banner>,
    pub popup_modal: PopupModal,
    pub appearance: Appearance,
    pub currency_rates: CurrencyRates,
    pub gamification: GamificationSettings,
    pub updated_at: Option<String>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "DealHub".to_string(),
            contact_whatsapp: None,
            banners: Vec::new(),
            popup_modal: PopupModal::default(),
            appearance: Appearance::default(),
            currency_rates: CurrencyRates::default(),
            gamification: GamificationSettings::default(),
            updated_at: None,
        }
    }
}

/// Partial update sent by the admin settings editor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub site_name: Option<String>,
    pub contact_whatsapp: Option<String>,
    pub banners: Option<Vec<Banner>>,
    pub popup_modal: Option<PopupModal>,
    pub appearance: Option<Appearance>,
    pub currency_rates: Option<CurrencyRates>,
    pub gamification: Option<GamificationSettings>,
}

fn default_true() -> bool {
    true
}

impl TryFrom<Model> for SiteSettings {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            site_name: model.site_name,
            contact_whatsapp: model.contact_whatsapp,
            banners: serde_json::from_str(&model.banners)?,
            popup_modal: serde_json::from_str(&model.popup_modal)?,
            appearance: serde_json::from_str(&model.appearance)?,
            currency_rates: serde_json::from_str(&model.currency_rates)?,
            gamification: serde_json::from_str(&model.gamification)?,
            updated_at: Some(model.updated_at),
        })
    }
}

impl SiteSettings {
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(site_name) = update.site_name {
            self.site_name = site_name;
        }
        if let Some(contact) = update.contact_whatsapp {
            // An empty string clears the number
            self.contact_whatsapp = Some(contact).filter(|c| !c.trim().is_empty());
        }
        if let Some(banners) = update.banners {
            self.banners = banners;
        }
        if let Some(popup) = update.popup_modal {
            self.popup_modal = popup;
        }
        if let Some(appearance) = update.appearance {
            self.appearance = appearance;
        }
        if let Some(rates) = update.currency_rates {
            self.currency_rates = rates;
        }
        if let Some(gamification) = update.gamification {
            self.gamification = gamification;
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.site_name.trim().is_empty() {
            return Err(DomainError::Validation("site_name must not be empty".into()));
        }

        let rates = &self.currency_rates;
        if !rates.rates.contains_key(&rates.base) {
            return Err(DomainError::Validation(format!(
                "base currency {} has no rate",
                rates.base
            )));
        }
        if let Some((code, _)) = rates
            .rates
            .iter()
            .find(|(_, rate)| !rate.is_finite() || **rate <= 0.0)
        {
            return Err(DomainError::Validation(format!(
                "rate for {} must be a positive number",
                code
            )));
        }

        let levels = &self.gamification.levels;
        if levels.is_empty() {
            return Err(DomainError::Validation("at least one level is required".into()));
        }
        if levels[0].min_points != 0 {
            return Err(DomainError::Validation("the first level must start at 0 points".into()));
        }
        if levels.windows(2).any(|w| w[1].min_points <= w[0].min_points) {
            return Err(DomainError::Validation(
                "level thresholds must be strictly increasing".into(),
            ));
        }
        if self.gamification.badges.iter().any(|b| b.min_points < 0) {
            return Err(DomainError::Validation("badge thresholds must not be negative".into()));
        }

        Ok(())
    }

    /// Serialize into an active model for the fixed settings row.
    pub fn to_active_model(&self, now: &str) -> Result<ActiveModel, DomainError> {
        Ok(ActiveModel {
            id: Set(SETTINGS_ID.to_string()),
            site_name: Set(self.site_name.clone()),
            contact_whatsapp: Set(self.contact_whatsapp.clone()),
            banners: Set(serde_json::to_string(&self.banners)?),
            popup_modal: Set(serde_json::to_string(&self.popup_modal)?),
            appearance: Set(serde_json::to_string(&self.appearance)?),
            currency_rates: Set(serde_json::to_string(&self.currency_rates)?),
            gamification: Set(serde_json::to_string(&self.gamification)?),
            updated_at: Set(now.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    fn unwrap_set(v: ActiveValue<String>) -> String {
        match v {
            ActiveValue::Set(s) | ActiveValue::Unchanged(s) => s,
            ActiveValue::NotSet => panic!("value not set"),
        }
    }

    #[test]
    fn settings_round_trip_through_row_columns() {
        let mut settings = SiteSettings::default();
        settings.banners.push(Banner {
            id: "b1".into(),
            image_url: "/banners/b1.png".into(),
            link_url: Some("https://example.com".into()),
            title: None,
            is_active: true,
            extra: Map::from_iter([("position".to_string(), JsonValue::from(2))]),
        });
        settings
            .appearance
            .extra
            .insert("font".into(), JsonValue::from("Inter"));

        let active = settings.to_active_model("2026-01-01T00:00:00.000Z").unwrap();
        let model = Model {
            id: unwrap_set(active.id),
            site_name: unwrap_set(active.site_name),
            contact_whatsapp: None,
            banners: unwrap_set(active.banners),
            popup_modal: unwrap_set(active.popup_modal),
            appearance: unwrap_set(active.appearance),
            currency_rates: unwrap_set(active.currency_rates),
            gamification: unwrap_set(active.gamification),
            updated_at: unwrap_set(active.updated_at),
        };

        let back = SiteSettings::try_from(model).unwrap();
        assert_eq!(back.banners, settings.banners);
        assert_eq!(back.appearance, settings.appearance);
        assert_eq!(back.currency_rates, settings.currency_rates);
        assert_eq!(back.gamification, settings.gamification);
    }

    #[test]
    fn malformed_column_is_rejected() {
        let model = Model {
            id: SETTINGS_ID.into(),
            site_name: "x".into(),
            contact_whatsapp: None,
            banners: "not json".into(),
            popup_modal: "{}".into(),
            appearance: "{}".into(),
            currency_rates: r#"{"base":"IDR","rates":{"IDR":1}}"#.into(),
            gamification: r#"{"levels":[],"badges":[]}"#.into(),
            updated_at: "".into(),
        };
        assert!(SiteSettings::try_from(model).is_err());
    }

    #[test]
    fn validate_rejects_unordered_levels() {
        let mut settings = SiteSettings::default();
        settings.gamification.levels.swap(1, 2);
        assert!(matches!(settings.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn validate_rejects_missing_base_rate() {
        let mut settings = SiteSettings::default();
        settings.currency_rates.base = "EUR".into();
        assert!(settings.validate().is_err());
        assert!(SiteSettings::default().validate().is_ok());
    }
}
