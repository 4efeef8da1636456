//! Gesture primitives shared by the login flow and the dispatcher.
//!
//! Everything here goes through script execution rather than native
//! input simulation; a native click is intercepted whenever a ripple
//! overlay sits above the target.

use std::time::Duration;

use fantoccini::Client;
use fantoccini::elements::Element;
use serde_json::Value;

use crate::errors::RelayError;

const FIELD_SETTLE: Duration = Duration::from_millis(200);

/// Center the element in the viewport.
pub async fn scroll_into_view(client: &Client, element: &Element) -> Result<(), RelayError> {
    run(
        client,
        "arguments[0].scrollIntoView({block: 'center'});",
        element,
        None,
    )
    .await
}

/// Set a form field's value and notify the page's reactive logic.
///
/// The hosting framework ignores direct property assignment, so the
/// value write is followed by bubbling `input` and `change` events.
pub async fn set_field_value(
    client: &Client,
    element: &Element,
    value: &str,
) -> Result<(), RelayError> {
    tokio::time::sleep(FIELD_SETTLE).await;
    run(
        client,
        r#"
        arguments[0].value = arguments[1];
        arguments[0].dispatchEvent(new Event('input', { bubbles: true }));
        arguments[0].dispatchEvent(new Event('change', { bubbles: true }));
        "#,
        element,
        Some(Value::String(value.to_string())),
    )
    .await
}

/// Move the synthetic pointer onto the element.
pub async fn hover(client: &Client, element: &Element) -> Result<(), RelayError> {
    run(
        client,
        r#"
        const opts = { bubbles: true, cancelable: true, view: window };
        arguments[0].dispatchEvent(new MouseEvent('mouseover', opts));
        arguments[0].dispatchEvent(new MouseEvent('mousemove', opts));
        "#,
        element,
        None,
    )
    .await
}

pub async fn focus(client: &Client, element: &Element) -> Result<(), RelayError> {
    run(client, "arguments[0].focus();", element, None).await
}

pub async fn click(client: &Client, element: &Element) -> Result<(), RelayError> {
    run(client, "arguments[0].click();", element, None).await
}

/// Scroll into view, then click programmatically.
pub async fn activate(client: &Client, element: &Element) -> Result<(), RelayError> {
    scroll_into_view(client, element).await?;
    click(client, element).await
}

async fn run(
    client: &Client,
    script: &str,
    element: &Element,
    extra: Option<Value>,
) -> Result<(), RelayError> {
    let mut args = vec![serde_json::to_value(element)?];
    if let Some(value) = extra {
        args.push(value);
    }
    client.execute(script, args).await?;
    Ok(())
}
