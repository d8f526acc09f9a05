//! Browser-driven review collection: sessions, page adapters, the Navigator
//! and the Review Collector.

pub mod adapter;
pub mod collector;
pub mod error;
pub mod http_session;
pub mod navigator;
pub mod pause;
pub mod session;
pub mod storefront;
pub mod strategy;

#[cfg(test)]
pub(crate) mod test_support;

pub use adapter::{PageAdapter, PageReviews};
pub use collector::{CollectError, CollectState, Collection, Collector, StopReason};
pub use error::ScraperError;
pub use http_session::{HttpSession, HttpSessionProvider};
pub use navigator::{LoadOutcome, NavigationTiming, Navigator};
pub use session::{BrowserSession, Page, SessionGuard, SessionProvider};
pub use storefront::StorefrontAdapter;
pub use strategy::SelectorMatch;
