pub mod click_event;
pub mod product;
pub mod purchase_request;
pub mod site_settings;
pub mod user_gamification;

pub use site_settings::SiteSettings;
