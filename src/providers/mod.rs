mod pagerduty;
mod provider;

pub use pagerduty::PagerDutyProvider;
pub use provider::{OAuthProvider, TokenRequestFormat};
