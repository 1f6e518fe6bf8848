//! Demo Screen Tree
//!
//! A small bot that exercises every control kind:
//!
//! ```text
//! main ─┬─ settings   toggle, rating, button group (reset)
//!       ├─ gallery    carousel
//!       ├─ profile    text input, progress bar
//!       └─ help       accordion
//!            └─ about rich text, link button
//! ```
//!
//! Handlers reach back into the manager and their own screen through `Weak`
//! references; the registry owns the screens and screens own their handlers.

use std::sync::{Arc, Weak};

use chatscreen_core::{
    Accordion, Button, ButtonGroup, Carousel, ContentFragment, DeliveryClient, HandlerContext,
    ProgressBar, Rating, RichText, Screen, ScreenId, ScreenManager, SharedScreen, TextInput,
    Toggle, STATE_KEY,
};
use tracing::info;

/// Main menu
pub const MAIN: &str = "main";
/// Settings screen
pub const SETTINGS: &str = "settings";
/// Image gallery
pub const GALLERY: &str = "gallery";
/// Name prompt
pub const PROFILE: &str = "profile";
/// FAQ
pub const HELP: &str = "help";
/// About page
pub const ABOUT: &str = "about";

/// Named state armed by the profile prompt
pub const NAME_STATE: &str = "awaiting_name";
/// State key holding the entered name
pub const NAME_KEY: &str = "name";
/// Token of the settings reset button
pub const RESET_TOKEN: &str = "settings:reset";

/// Register the demo screens; `main` becomes the main screen
pub fn register_demo<D: DeliveryClient + 'static>(manager: &Arc<ScreenManager<D>>) {
    register_main(manager);
    register_settings(manager);
    register_gallery(manager);
    register_profile(manager);
    register_help(manager);
    info!(screens = manager.screen_count(), "Demo screens registered");
}

fn register_main<D: DeliveryClient + 'static>(manager: &ScreenManager<D>) {
    let content = ContentFragment::markdown("Welcome to the *chatscreen* demo.")
        .with_buttons_per_row(2)
        .with_buttons(vec![
            Button::callback("⚙️ Settings", format!("screen:{SETTINGS}")),
            Button::callback("🖼 Gallery", format!("screen:{GALLERY}")),
            Button::callback("👤 Profile", format!("screen:{PROFILE}")),
            Button::callback("❓ Help", format!("screen:{HELP}")),
        ]);
    manager.register_screen(Screen::with_id(MAIN, "Menu", content), true);
}

fn register_settings<D: DeliveryClient + 'static>(manager: &ScreenManager<D>) {
    let screen = Screen::with_id(
        SETTINGS,
        "Settings",
        ContentFragment::text("Tune your experience").with_buttons_per_row(3),
    )
    .with_parent(MAIN)
    .with_control(Toggle::new("settings:notify", true, "🔔 Notifications on", "🔕 Notifications off"))
    .with_control(Rating::new(0, "settings:stars"))
    .with_control(ButtonGroup::new(vec![Button::callback("↺ Reset", RESET_TOKEN)]));
    let shared = manager.register_screen(screen, false);

    let weak = Arc::downgrade(&shared);
    shared
        .write()
        .on_callback(RESET_TOKEN, move |_token: String, ctx: HandlerContext| {
            reset_settings(weak.clone(), ctx)
        });
}

async fn reset_settings(screen: Weak<parking_lot::RwLock<Screen>>, ctx: HandlerContext) -> anyhow::Result<bool> {
    let Some(screen) = screen.upgrade() else {
        return Ok(false);
    };
    {
        let mut guard = screen.write();
        for control in &mut guard.controls {
            if let Some(toggle) = control.as_toggle_mut() {
                toggle.state = true;
            }
            if let Some(rating) = control.as_rating_mut() {
                rating.set_value(0);
            }
        }
    }
    info!(chat_id = %ctx.chat_id, "Settings reset");
    Ok(true)
}

fn register_gallery<D: DeliveryClient + 'static>(manager: &ScreenManager<D>) {
    let carousel = Carousel::new(
        vec![
            "https://picsum.photos/id/10/600/400".to_string(),
            "https://picsum.photos/id/20/600/400".to_string(),
            "https://picsum.photos/id/30/600/400".to_string(),
        ],
        vec![
            "Forest".to_string(),
            "Desk".to_string(),
            "Coffee".to_string(),
        ],
    );
    let screen = Screen::with_id(GALLERY, "Gallery", ContentFragment::default().with_buttons_per_row(3))
        .with_parent(MAIN)
        .with_control(carousel);
    manager.register_screen(screen, false);
}

fn register_profile<D: DeliveryClient + 'static>(manager: &Arc<ScreenManager<D>>) {
    let screen = Screen::with_id(PROFILE, "Profile", ContentFragment::default())
        .with_parent(MAIN)
        .with_control(TextInput::new("What is your name?", NAME_STATE).with_placeholder("e.g. Ada"))
        .with_control(ProgressBar::new(0, 1, "Profile complete"));
    let shared = manager.register_screen(screen, false);

    let manager_ref = Arc::downgrade(manager);
    let screen_ref = Arc::downgrade(&shared);
    shared
        .write()
        .on_text_input(NAME_STATE, move |text: String, ctx: HandlerContext| {
            save_name(manager_ref.clone(), screen_ref.clone(), text, ctx)
        });
}

async fn save_name<D: DeliveryClient + 'static>(
    manager: Weak<ScreenManager<D>>,
    screen: Weak<parking_lot::RwLock<Screen>>,
    text: String,
    ctx: HandlerContext,
) -> anyhow::Result<bool> {
    let Some(manager) = manager.upgrade() else {
        return Ok(false);
    };
    let name = text.trim().to_string();
    if name.is_empty() {
        return Ok(false);
    }

    manager.state().set_state(ctx.chat_id, NAME_KEY, name.clone());
    manager.state().remove_state(ctx.chat_id, STATE_KEY);
    if let Some(screen) = screen.upgrade() {
        mark_profile_complete(&screen);
    }
    info!(chat_id = %ctx.chat_id, name = %name, "Name saved");

    manager
        .navigate_to_screen(ctx.chat_id, &ScreenId::new(MAIN))
        .await?;
    Ok(false)
}

fn mark_profile_complete(screen: &SharedScreen) {
    let mut guard = screen.write();
    for control in &mut guard.controls {
        if let Some(bar) = control.as_progress_mut() {
            bar.value = bar.max;
        }
    }
}

fn register_help<D: DeliveryClient + 'static>(manager: &ScreenManager<D>) {
    let faq = Accordion::new(vec![
        (
            "How do I go back?".to_string(),
            "Press the back button under any sub-screen.".to_string(),
        ),
        (
            "Where is my data?".to_string(),
            "Only in memory. Restarting the bot forgets everything.".to_string(),
        ),
    ]);
    let help = Screen::with_id(
        HELP,
        "Help",
        ContentFragment::default().with_button(Button::callback("ℹ️ About", format!("screen:{ABOUT}"))),
    )
    .with_parent(MAIN)
    .with_control(faq);
    manager.register_screen(help, false);

    let about = Screen::with_id(ABOUT, "About", ContentFragment::default())
        .with_parent(HELP)
        .with_back_button_text("« Help")
        .with_control(RichText::markdown("Built on _chatscreen_: screens, navigation and state for chat bots."))
        .with_control(Button::link("Source", "https://example.org/chatscreen"));
    manager.register_screen(about, false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use chatscreen_core::{
        CallbackEvent, CallbackId, ChatId, EngineConfig, MemoryDelivery, MessageId, Sender,
        TextMessageEvent,
    };
    use pretty_assertions::assert_eq;

    const CHAT: ChatId = ChatId(9);

    fn demo() -> (Arc<MemoryDelivery>, Arc<ScreenManager<MemoryDelivery>>) {
        let delivery = Arc::new(MemoryDelivery::new());
        let manager = Arc::new(ScreenManager::new(
            Arc::clone(&delivery),
            EngineConfig::default(),
        ));
        register_demo(&manager);
        (delivery, manager)
    }

    fn press(token: &str) -> CallbackEvent {
        CallbackEvent {
            callback_id: CallbackId(token.to_string()),
            token: token.to_string(),
            chat_id: CHAT,
            message_id: MessageId(0),
            sender: Sender::new(1, "Ada"),
        }
    }

    #[test]
    fn test_every_control_kind_is_used() {
        let (_, manager) = demo();
        let kinds: HashSet<&'static str> = [MAIN, SETTINGS, GALLERY, PROFILE, HELP, ABOUT]
            .iter()
            .filter_map(|id| manager.lookup_screen(&ScreenId::new(*id)))
            .flat_map(|screen| {
                screen
                    .read()
                    .controls
                    .iter()
                    .map(chatscreen_core::UiControl::kind_name)
                    .collect::<Vec<_>>()
            })
            .collect();
        assert_eq!(kinds.len(), 9);
        assert_eq!(manager.main_screen_id(), Some(ScreenId::new(MAIN)));
    }

    #[tokio::test]
    async fn test_name_flow_returns_to_main() {
        let (_, manager) = demo();
        manager.navigate_to_main_screen(CHAT).await.unwrap();
        manager.handle_callback(press("screen:profile")).await;
        assert!(manager.state().is_in_state(CHAT, NAME_STATE));

        manager
            .handle_text_message(TextMessageEvent {
                chat_id: CHAT,
                sender: Sender::new(1, "Ada"),
                message_id: MessageId(5),
                text: "  Ada  ".to_string(),
            })
            .await;

        assert_eq!(manager.current_screen(CHAT), Some(ScreenId::new(MAIN)));
        assert_eq!(manager.state().get_state(CHAT, NAME_KEY, String::new()), "Ada");
        assert!(manager.state().named_state(CHAT).is_none());
        let profile = manager.lookup_screen(&ScreenId::new(PROFILE)).unwrap();
        let complete = profile.read().controls.iter().any(|control| {
            matches!(&control.kind, chatscreen_core::ControlKind::ProgressBar(bar) if bar.percent() == 100)
        });
        assert!(complete);
    }

    #[tokio::test]
    async fn test_settings_reset() {
        let (delivery, manager) = demo();
        manager
            .navigate_to_screen(CHAT, &ScreenId::new(SETTINGS))
            .await
            .unwrap();
        manager.handle_callback(press("settings:notify")).await;
        manager.handle_callback(press("settings:stars:4")).await;
        manager.handle_callback(press(RESET_TOKEN)).await;

        let message = delivery.last_sent().unwrap();
        assert!(message
            .buttons()
            .any(|button| button.text == "🔔 Notifications on"));
        let settings = manager.lookup_screen(&ScreenId::new(SETTINGS)).unwrap();
        let value = settings.read().controls[1].as_rating().map(|r| r.value());
        assert_eq!(value, Some(0));
    }
}
