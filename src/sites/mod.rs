mod error;
mod index;
mod types;

pub use error::SiteError;
pub use index::LaunchSiteIndex;
pub use types::LaunchSite;
