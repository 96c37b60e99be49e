use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.engine.browser, Browser::Chrome);
    assert_eq!(config.engine.max_tracked_elements, 10_000);
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.directory.is_none());
}

#[test]
fn test_geometry_config_default() {
    let geometry = GeometryConfig::default();
    assert_eq!(geometry.min_rect_size, 1.0);
    assert_eq!(geometry.min_text_size, 2.0);
    assert_eq!(geometry.box_min_height, 110.0);
    assert_eq!(geometry.max_clickable_event_area, 1_000_000.0);
    assert_eq!(geometry.min_icon_room, 10.0);
    assert_eq!(geometry.min_frame_size, 6.0);
}

#[test]
fn test_browser_lowercase_names() {
    let json = serde_json::to_string(&Browser::Firefox).unwrap();
    assert_eq!(json, "\"firefox\"");
    let parsed: Browser = serde_json::from_str("\"chrome\"").unwrap();
    assert_eq!(parsed, Browser::Chrome);
}

#[test]
fn test_partial_section_keeps_defaults() {
    let config: Config = toml::from_str(
        r#"
        [geometry]
        box_min_height = 80.0
        "#,
    )
    .unwrap();
    assert_eq!(config.geometry.box_min_height, 80.0);
    assert_eq!(config.geometry.min_text_size, 2.0);
    assert_eq!(config.engine.max_tracked_elements, 10_000);
}

#[test]
fn test_config_serialization() {
    let config = Config::default();
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("max_tracked_elements"));
    assert!(json.contains("chrome"));
}
