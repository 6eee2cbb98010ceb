pub mod daily_stat;
pub mod global_settings;
pub mod link;
pub mod online_session;
pub mod redirect_history;
pub mod redirect_url;
pub mod timed_redirect_url;

pub use daily_stat::Entity as DailyStatEntity;
pub use global_settings::Entity as GlobalSettingsEntity;
pub use link::Entity as LinkEntity;
pub use online_session::Entity as OnlineSessionEntity;
pub use redirect_history::Entity as RedirectHistoryEntity;
pub use redirect_url::Entity as RedirectUrlEntity;
pub use timed_redirect_url::Entity as TimedRedirectUrlEntity;
