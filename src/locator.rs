use std::fmt;
use std::time::Duration;

use fantoccini::elements::Element;
use fantoccini::{Client, Locator};
use tracing::debug;

use crate::errors::RelayError;
use crate::waiter::wait_until;

/// One way of finding a UI element.
///
/// A slice of strategies forms a fallback chain, tried in order with
/// first-match-wins semantics. Hosted UIs change markup across
/// releases, so a chain of progressively less specific strategies is
/// more robust than any single selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Stable `id` attribute
    Id(String),
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
}

impl Strategy {
    pub fn id(value: impl Into<String>) -> Self {
        Strategy::Id(value.into())
    }

    pub fn css(value: impl Into<String>) -> Self {
        Strategy::Css(value.into())
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Strategy::XPath(value.into())
    }

    fn as_locator(&self) -> Locator<'_> {
        match self {
            Strategy::Id(value) => Locator::Id(value),
            Strategy::Css(value) => Locator::Css(value),
            Strategy::XPath(value) => Locator::XPath(value),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Id(value) => write!(f, "id={value}"),
            Strategy::Css(value) => write!(f, "css={value}"),
            Strategy::XPath(value) => write!(f, "xpath={value}"),
        }
    }
}

/// Resolve the first strategy in `chain` that yields a located,
/// visible, and enabled element within `timeout` (per strategy, per
/// stage). Individual strategy failures are swallowed; only full
/// exhaustion surfaces, as a `NotFound` carrying every attempted
/// strategy.
///
/// Pure query: the caller is responsible for scrolling the element
/// into the viewport before interacting with it.
pub async fn locate(
    client: &Client,
    chain: &[Strategy],
    timeout: Duration,
) -> Result<Element, RelayError> {
    for strategy in chain {
        match qualify(client, strategy, timeout).await {
            Ok(element) => {
                debug!(%strategy, "strategy matched");
                return Ok(element);
            }
            Err(err) => {
                debug!(%strategy, %err, "strategy failed, advancing");
            }
        }
    }
    Err(exhausted(chain))
}

/// Same as [`locate`], scoped to the subtree under `root`.
pub async fn locate_within(
    root: &Element,
    chain: &[Strategy],
    timeout: Duration,
) -> Result<Element, RelayError> {
    for strategy in chain {
        let found = wait_until(timeout, || async move {
            root.find(strategy.as_locator()).await.ok()
        })
        .await;
        match found {
            Ok(element) => match wait_for_interactable(&element, timeout).await {
                Ok(()) => {
                    debug!(%strategy, "strategy matched within subtree");
                    return Ok(element);
                }
                Err(err) => debug!(%strategy, %err, "strategy failed, advancing"),
            },
            Err(err) => debug!(%strategy, %err, "strategy failed, advancing"),
        }
    }
    Err(exhausted(chain))
}

async fn qualify(
    client: &Client,
    strategy: &Strategy,
    timeout: Duration,
) -> Result<Element, RelayError> {
    let element = wait_until(timeout, || async move {
        client.find(strategy.as_locator()).await.ok()
    })
    .await?;
    wait_for_interactable(&element, timeout).await?;
    Ok(element)
}

async fn wait_for_interactable(element: &Element, timeout: Duration) -> Result<(), RelayError> {
    wait_until(timeout, || async move {
        element.is_displayed().await.ok().filter(|v| *v).map(|_| ())
    })
    .await?;
    wait_until(timeout, || async move {
        element.is_enabled().await.ok().filter(|v| *v).map(|_| ())
    })
    .await?;
    Ok(())
}

fn exhausted(chain: &[Strategy]) -> RelayError {
    RelayError::NotFound {
        attempted: chain.iter().map(ToString::to_string).collect(),
    }
}

#[cfg(test)]
#[path = "locator_test.rs"]
mod locator_test;
