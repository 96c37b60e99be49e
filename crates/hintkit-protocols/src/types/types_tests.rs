use super::*;

#[test]
fn test_element_type_round_trips_through_name() {
    for ty in ElementType::ALL {
        assert_eq!(ty.as_str().parse::<ElementType>().unwrap(), ty);
    }
}

#[test]
fn test_element_type_unknown_name() {
    let err = "button".parse::<ElementType>().unwrap_err();
    assert!(err.to_string().contains("button"));
}

#[test]
fn test_element_type_serde_kebab_case() {
    let json = serde_json::to_string(&ElementType::ClickableEvent).unwrap();
    assert_eq!(json, "\"clickable-event\"");
}

#[test]
fn test_ranking_and_quality_flags() {
    assert!(ElementType::Scrollable.ranks_lower());
    assert!(ElementType::Selectable.ranks_lower());
    assert!(!ElementType::Link.ranks_lower());
    assert!(ElementType::ClickableEvent.is_low_quality());
    assert!(!ElementType::Clickable.is_low_quality());
}

#[test]
fn test_rect_contains_edges() {
    let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
    assert!(rect.contains(10.0, 20.0));
    assert!(rect.contains(110.0, 70.0));
    assert!(!rect.contains(9.9, 40.0));
}

#[test]
fn test_rect_intersects() {
    let a = Rect::new(0.0, 0.0, 100.0, 100.0);
    assert!(a.intersects(&Rect::new(50.0, 50.0, 100.0, 100.0)));
    assert!(!a.intersects(&Rect::new(100.0, 0.0, 10.0, 10.0)));
    assert!(!a.intersects(&Rect::new(200.0, 200.0, 100.0, 100.0)));
}

#[test]
fn test_rect_envelope() {
    let rects = [
        Rect::new(10.0, 10.0, 20.0, 10.0),
        Rect::new(0.0, 25.0, 15.0, 10.0),
    ];
    let env = Rect::envelope(&rects).unwrap();
    assert_eq!(env, Rect::new(0.0, 10.0, 30.0, 25.0));
    assert!(Rect::envelope(&[]).is_none());
}

#[test]
fn test_rect_vertical_overlap() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(50.0, 5.0, 10.0, 10.0);
    let c = Rect::new(0.0, 10.0, 10.0, 10.0);
    assert!(a.overlaps_vertically(&b));
    assert!(!a.overlaps_vertically(&c));
}

#[test]
fn test_mutation_record_constructors() {
    let record = MutationRecord::attribute(ElementId(3), "href");
    assert_eq!(record.attribute_name.as_deref(), Some("href"));
    assert!(record.added.is_empty());

    let record = MutationRecord::added(ElementId(1), vec![ElementId(2)]);
    assert_eq!(record.added, vec![ElementId(2)]);
    assert!(record.attribute_name.is_none());
}
