//! Maps a command name onto an automation card in the application UI
//! and performs the activation gesture.

use fantoccini::{Client, Locator};
use tracing::{info, warn};

use crate::errors::RelayError;
use crate::interact;
use crate::locator::{self, Strategy};
use crate::waiter::INTERACTION_TIMEOUT;

/// Nearest enclosing card container of a matched label
const CARD_CONTAINER: &str = "./ancestor::mat-card[1]";

fn activation_chain() -> Vec<Strategy> {
    vec![
        Strategy::css("span.mat-ripple.mat-mdc-button-ripple"),
        Strategy::css("button"),
    ]
}

/// Activate the automation card whose label matches `name`.
///
/// Non-fatal by contract: an unknown command, a vanished card, or any
/// driver failure is logged and reported as `false`. The daemon must
/// stay alive across arbitrarily many bad commands.
pub async fn click_automation(client: &Client, name: &str) -> bool {
    match try_click(client, name).await {
        Ok(()) => {
            info!(automation = name, "clicked automation");
            true
        }
        Err(err) => {
            warn!(automation = name, %err, "failed to click automation");
            false
        }
    }
}

async fn try_click(client: &Client, name: &str) -> Result<(), RelayError> {
    let label = normalize_label(name);
    let chain = [Strategy::xpath(card_label_xpath(&label))];
    let label_element = locator::locate(client, &chain, INTERACTION_TIMEOUT).await?;

    let card = label_element.find(Locator::XPath(CARD_CONTAINER)).await?;
    let surface = locator::locate_within(&card, &activation_chain(), INTERACTION_TIMEOUT).await?;

    interact::scroll_into_view(client, &surface).await?;
    interact::hover(client, &surface).await?;
    interact::focus(client, &surface).await?;
    interact::click(client, &surface).await?;
    Ok(())
}

/// Collapse runs of whitespace and trim, matching how the UI renders
/// card labels. Case is preserved: matching is exact.
pub(crate) fn normalize_label(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// XPath matching a card label element by its normalized text.
pub(crate) fn card_label_xpath(label: &str) -> String {
    format!(
        "//div[contains(@class, 'automation-name') and normalize-space(text())={}]",
        xpath_literal(label)
    )
}

/// Quote an arbitrary string as an XPath 1.0 literal. XPath has no
/// escape sequences, so a value containing both quote kinds must be
/// assembled with concat().
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value.split('\'').map(|part| format!("'{part}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod dispatch_test;
