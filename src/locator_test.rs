// Unit tests for locator strategies and chains

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_strategy_display_renders_kind_and_value() {
    assert_eq!(Strategy::id("identifierNext").to_string(), "id=identifierNext");
    assert_eq!(Strategy::css("button").to_string(), "css=button");
    assert_eq!(
        Strategy::xpath("//div[@class='x']").to_string(),
        "xpath=//div[@class='x']"
    );
}

#[test]
fn test_strategy_maps_to_the_matching_driver_locator() {
    assert!(matches!(
        Strategy::id("identifierNext").as_locator(),
        Locator::Id("identifierNext")
    ));
    assert!(matches!(
        Strategy::css("button").as_locator(),
        Locator::Css("button")
    ));
    assert!(matches!(
        Strategy::xpath("//button").as_locator(),
        Locator::XPath("//button")
    ));
}

#[test]
fn test_exhausted_chain_lists_strategies_in_attempt_order() {
    let chain = [
        Strategy::id("identifierNext"),
        Strategy::css(r#"button[jsname="LgbsSe"]"#),
        Strategy::css("button:nth-of-type(2)"),
    ];
    let err = exhausted(&chain);

    match err {
        RelayError::NotFound { attempted } => {
            assert_eq!(
                attempted,
                vec![
                    "id=identifierNext".to_string(),
                    r#"css=button[jsname="LgbsSe"]"#.to_string(),
                    "css=button:nth-of-type(2)".to_string(),
                ]
            );
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}
