//! Callback Routing Grammar
//!
//! A callback token is either a reserved command or an opaque application
//! key:
//!
//! ```text
//! token := "screen:" <screen-id>     navigate to a screen
//!        | "nav:back"                 go to the current screen's parent
//!        | <anything else>            application key (exact handler lookup)
//! ```
//!
//! Matchers are tried in the fixed order of `MATCHERS`, so navigation always
//! wins over back, and both win over application keys. Applications must
//! avoid the `screen:` prefix and the back sentinel for their own keys.

use crate::ids::ScreenId;

/// Prefix of navigation tokens
pub const NAVIGATE_PREFIX: &str = "screen:";

/// Back-navigation sentinel token
pub const BACK_TOKEN: &str = "nav:back";

/// Classified callback token
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route<'a> {
    /// Navigate to the screen with this id
    Navigate(&'a str),
    /// Navigate to the current screen's parent
    Back,
    /// Opaque application key
    Application(&'a str),
}

type Matcher = for<'a> fn(&'a str) -> Option<Route<'a>>;

fn match_navigate(token: &str) -> Option<Route<'_>> {
    token.strip_prefix(NAVIGATE_PREFIX).map(Route::Navigate)
}

fn match_back(token: &str) -> Option<Route<'_>> {
    (token == BACK_TOKEN).then_some(Route::Back)
}

/// Reserved-command matchers in priority order
const MATCHERS: [Matcher; 2] = [match_navigate, match_back];

/// Classify a callback token
#[must_use]
pub fn classify(token: &str) -> Route<'_> {
    MATCHERS
        .iter()
        .find_map(|matcher| matcher(token))
        .unwrap_or(Route::Application(token))
}

/// Navigation token for `screen_id`
#[must_use]
pub fn navigate_token(screen_id: &ScreenId) -> String {
    format!("{NAVIGATE_PREFIX}{screen_id}")
}

/// Whether `key` collides with a reserved command
#[must_use]
pub fn is_reserved(key: &str) -> bool {
    !matches!(classify(key), Route::Application(_))
}
