//! Error banners and page-health checks.
//!
//! Share pages for deleted or private conversations still return markup; the
//! only signal is a banner in the text or a redirect to the login host.

use url::Url;

use crate::error::{StrategyFailure, StrategyResult};
use crate::parse::text::visible_text;
use crate::types::conversation::ConversationTurn;
use crate::types::page::FetchedPage;

/// Phrases that mark a turn as an error banner rather than dialogue.
pub const ERROR_BANNERS: &[&str] = &[
    "can't load shared conversation",
    "unable to load",
    "something went wrong",
    "not found",
    "return to chatgpt",
];

/// Phrases in the visible page text that mean the share is gone or private.
pub const PAGE_ERROR_INDICATORS: &[&str] = &[
    "conversation not found",
    "this conversation is private",
    "conversation has been deleted",
];

/// True when the turn content matches an error banner.
pub fn is_error_banner(content: &str) -> bool {
    let lower = content.to_lowercase();
    ERROR_BANNERS.iter().any(|banner| lower.contains(banner))
}

/// Drop error-banner turns, keeping order.
pub fn strip_error_banners(turns: Vec<ConversationTurn>) -> Vec<ConversationTurn> {
    turns
        .into_iter()
        .filter(|turn| !is_error_banner(&turn.content))
        .collect()
}

/// True when the final URL points at an authentication page.
pub fn is_login_redirect(final_url: &str) -> bool {
    let Ok(parsed) = Url::parse(final_url) else {
        return false;
    };

    let host_is_auth = parsed
        .host_str()
        .map(|host| host.starts_with("auth.") || host.starts_with("login."))
        .unwrap_or(false);

    let path = parsed.path().to_ascii_lowercase();
    let path_is_auth = path.starts_with("/auth/login")
        || path.starts_with("/login")
        || path.starts_with("/signin");

    host_is_auth || path_is_auth
}

/// Reject pages that resolved to a login wall or an error screen.
pub fn check_page_health(page: &FetchedPage) -> StrategyResult<()> {
    if is_login_redirect(&page.final_url) {
        return Err(StrategyFailure::NotFound(format!(
            "redirected to login ({})",
            page.final_url
        )));
    }

    if !page.has_content() {
        return Err(StrategyFailure::MalformedContent("empty page body".into()));
    }

    let text = visible_text(&page.html).to_lowercase();
    if let Some(indicator) = PAGE_ERROR_INDICATORS
        .iter()
        .find(|indicator| text.contains(*indicator))
    {
        return Err(StrategyFailure::NotFound(format!(
            "page reports \"{}\"",
            indicator
        )));
    }

    Ok(())
}
