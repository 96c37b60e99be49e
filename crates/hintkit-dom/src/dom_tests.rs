use std::sync::Arc;

use hintkit_protocols::{Document, ElementId, PageHooks, Rect, StyleProperty};
use tokio::sync::mpsc;

use super::*;

fn page() -> MemoryDocument {
    MemoryDocument::new(
        PageSnapshot::new(vec![
            PageNode::new(1, "html").with_rect(0.0, 0.0, 1280.0, 2000.0),
            PageNode::new(2, "BODY")
                .with_parent(1)
                .with_rect(0.0, 0.0, 1280.0, 2000.0),
            PageNode::new(3, "label")
                .with_parent(2)
                .with_rect(10.0, 10.0, 100.0, 20.0)
                .with_text(30.0, 12.0, 60.0, 16.0),
            PageNode::new(4, "input")
                .with_parent(3)
                .with_attr("type", "checkbox")
                .with_rect(10.0, 12.0, 16.0, 16.0)
                .with_paint_order(1),
            PageNode::new(5, "label")
                .with_parent(2)
                .with_attr("for", "name")
                .with_rect(10.0, 40.0, 50.0, 20.0),
            PageNode::new(6, "input")
                .with_parent(2)
                .with_attr("id", "name")
                .with_rect(70.0, 40.0, 150.0, 20.0)
                .with_style(StyleProperty::PaddingLeft, "4px"),
            PageNode::new(7, "div")
                .with_parent(2)
                .with_rect(0.0, 1000.0, 100.0, 100.0),
        ])
        .with_url("https://example.com/"),
    )
    .unwrap()
}

#[test]
fn test_structure_queries() {
    let doc = page();
    assert_eq!(doc.document_element(), Some(ElementId(1)));
    assert_eq!(doc.scrolling_element(), Some(ElementId(1)));
    assert_eq!(doc.body(), Some(ElementId(2)));
    assert_eq!(doc.tag_name(ElementId(2)).as_deref(), Some("body"));
    assert_eq!(doc.base_url().as_deref(), Some("https://example.com/"));
    assert!(doc.is_top_frame());
    assert_eq!(
        doc.children(ElementId(2)),
        vec![ElementId(3), ElementId(5), ElementId(6), ElementId(7)]
    );
    assert_eq!(
        doc.descendants(ElementId(2)),
        vec![ElementId(3), ElementId(4), ElementId(5), ElementId(6), ElementId(7)]
    );
    assert!(doc.contains(ElementId(2), ElementId(4)));
    assert!(doc.contains(ElementId(4), ElementId(4)));
    assert!(!doc.contains(ElementId(4), ElementId(2)));
    assert_eq!(doc.parent(ElementId(4)), Some(ElementId(3)));
}

#[test]
fn test_missing_element_yields_empty_values() {
    let doc = page();
    let missing = ElementId(99);
    assert_eq!(doc.tag_name(missing), None);
    assert!(doc.client_rects(missing).is_empty());
    assert_eq!(doc.bounding_rect(missing), Rect::default());
    assert!(!doc.is_connected(missing));
}

#[test]
fn test_attributes_and_styles() {
    let doc = page();
    assert_eq!(
        doc.attribute(ElementId(4), "type").as_deref(),
        Some("checkbox")
    );
    assert!(doc.has_attribute(ElementId(6), "id"));
    assert_eq!(
        doc.computed_style(ElementId(6), StyleProperty::PaddingLeft)
            .as_deref(),
        Some("4px")
    );
    assert_eq!(
        doc.computed_style(ElementId(6), StyleProperty::BorderLeftWidth),
        None
    );
}

#[test]
fn test_labels() {
    let doc = page();
    assert_eq!(doc.labels(ElementId(4)), vec![ElementId(3)]);
    assert_eq!(doc.labels(ElementId(6)), vec![ElementId(5)]);
    assert!(doc.labels(ElementId(7)).is_empty());
}

#[test]
fn test_text_runs_include_descendants() {
    let doc = page();
    assert_eq!(doc.text_runs(ElementId(3)).len(), 1);
    assert_eq!(doc.text_runs(ElementId(2)).len(), 1);
    assert!(doc.has_direct_text(ElementId(3)));
    assert!(!doc.has_direct_text(ElementId(2)));
}

#[test]
fn test_element_at_point_prefers_paint_order() {
    let doc = page();
    assert_eq!(doc.element_at_point(15.0, 15.0), Some(ElementId(4)));
    assert_eq!(doc.element_at_point(80.0, 15.0), Some(ElementId(3)));
    assert_eq!(doc.element_at_point(5000.0, 5000.0), None);
}

#[test]
fn test_insert_and_remove() {
    let doc = page();
    let record = doc
        .insert(
            ElementId(7),
            vec![
                PageNode::new(10, "a").with_attr("href", "/next"),
                PageNode::new(11, "span").with_parent(10),
            ],
        )
        .unwrap();
    assert_eq!(record.target, ElementId(7));
    assert_eq!(record.added, vec![ElementId(10)]);
    assert!(doc.is_connected(ElementId(11)));

    let record = doc.remove(ElementId(10)).unwrap();
    assert_eq!(record.target, ElementId(7));
    assert_eq!(record.removed, vec![ElementId(10)]);
    assert!(!doc.is_connected(ElementId(10)));
    assert!(!doc.is_connected(ElementId(11)));
    assert_eq!(doc.parent(ElementId(10)), None);
    assert_eq!(doc.children(ElementId(10)), vec![ElementId(11)]);
}

#[test]
fn test_append_moves_and_reattaches() {
    let doc = page();
    doc.insert(
        ElementId(7),
        vec![
            PageNode::new(10, "div"),
            PageNode::new(11, "span").with_parent(10),
        ],
    )
    .unwrap();

    let records = doc.append(ElementId(2), ElementId(10)).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].target, ElementId(7));
    assert_eq!(records[0].removed, vec![ElementId(10)]);
    assert_eq!(records[1].target, ElementId(2));
    assert_eq!(records[1].added, vec![ElementId(10)]);
    assert_eq!(doc.parent(ElementId(10)), Some(ElementId(2)));

    doc.remove(ElementId(10)).unwrap();
    let records = doc.append(ElementId(7), ElementId(10)).unwrap();
    assert_eq!(records.len(), 1);
    assert!(doc.is_connected(ElementId(11)));

    let err = doc.append(ElementId(11), ElementId(10)).unwrap_err();
    assert!(matches!(err, DomError::Cycle { .. }));
}

#[test]
fn test_insert_rejects_bad_nodes() {
    let doc = page();
    let err = doc
        .insert(ElementId(99), vec![PageNode::new(10, "div")])
        .unwrap_err();
    assert!(matches!(err, DomError::UnknownElement(ElementId(99))));

    let err = doc
        .insert(ElementId(2), vec![PageNode::new(3, "div")])
        .unwrap_err();
    assert!(matches!(err, DomError::DuplicateId(ElementId(3))));
}

#[test]
fn test_set_attribute() {
    let doc = page();
    let record = doc
        .set_attribute(ElementId(7), "role", Some("button"))
        .unwrap();
    assert_eq!(record.attribute_name.as_deref(), Some("role"));
    assert_eq!(doc.attribute(ElementId(7), "role").as_deref(), Some("button"));

    doc.set_attribute(ElementId(7), "role", None).unwrap();
    assert!(!doc.has_attribute(ElementId(7), "role"));
}

#[test]
fn test_viewport_membership() {
    let doc = page();
    assert!(doc.is_in_viewport(ElementId(4)));
    assert!(!doc.is_in_viewport(ElementId(7)));

    doc.update_layout(ElementId(7), |node| {
        node.rects = vec![Rect::new(0.0, 100.0, 100.0, 100.0)];
    })
    .unwrap();
    assert!(doc.is_in_viewport(ElementId(7)));
}

#[test]
fn test_snapshot_from_json() {
    let json = r#"{
        "url": "file:///tmp/page.html",
        "nodes": [
            {"id": 1, "tag_name": "html"},
            {"id": 2, "tag_name": "body", "parent": 1},
            {"id": 3, "tag_name": "div", "parent": 2,
             "rects": [{"x": 0, "y": 0, "width": 10, "height": 10}],
             "styles": {"overflow-y": "auto"},
             "scroll": {"scroll_width": 10, "scroll_height": 50,
                        "client_width": 10, "client_height": 10}}
        ]
    }"#;
    let doc = MemoryDocument::from_json(json).unwrap();
    assert_eq!(doc.len(), 3);
    assert_eq!(
        doc.computed_style(ElementId(3), StyleProperty::OverflowY)
            .as_deref(),
        Some("auto")
    );
    assert_eq!(doc.scroll_metrics(ElementId(3)).scroll_height, 50.0);
}

#[test]
fn test_snapshot_unknown_parent() {
    let json = r#"{"nodes": [{"id": 2, "tag_name": "div", "parent": 1}]}"#;
    let err = MemoryDocument::from_json(json).unwrap_err();
    assert!(matches!(err, DomError::UnknownParent { .. }));
}

#[tokio::test]
async fn test_hooks_report_intersections() {
    let doc = Arc::new(page());
    let hooks = MemoryHooks::new(doc.clone());
    let (tx, mut rx) = mpsc::unbounded_channel();
    hooks.attach(tx);

    hooks.observe_intersection(ElementId(4));
    hooks.observe_intersection(ElementId(7));
    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert!(first.is_intersecting);
    assert!(!second.is_intersecting);

    doc.update_layout(ElementId(7), |node| {
        node.rects = vec![Rect::new(0.0, 0.0, 10.0, 10.0)];
    })
    .unwrap();
    hooks.refresh_intersections();
    let mut entries = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
    entries.sort_by_key(|e| e.target);
    assert!(entries.iter().all(|e| e.is_intersecting));

    hooks.settle().await;
    let log = hooks.log();
    assert_eq!(log.observed.len(), 2);
    assert_eq!(log.settles, 1);
}

#[test]
fn test_hooks_log_subscriptions() {
    let hooks = MemoryHooks::new(Arc::new(page()));
    hooks.observe_document();
    hooks.inject_page_script().unwrap();
    hooks.observe_frame(ElementId(7));
    hooks.watch_detached(ElementId(3));
    hooks.request_idle_slice();

    let log = hooks.log();
    assert!(log.document_observed);
    assert_eq!(log.script_injections, 1);
    assert!(log.observed_frames.contains(&ElementId(7)));
    assert_eq!(log.detached, vec![ElementId(3)]);
    assert_eq!(log.idle_requests, 1);

    hooks.disconnect_detached();
    hooks.disconnect_frames();
    hooks.disconnect_intersection();
    hooks.disconnect_document();
    let log = hooks.log();
    assert!(!log.document_observed);
    assert!(log.detached.is_empty());
    assert!(log.observed_frames.is_empty());
    assert_eq!(log.detached_disconnects, 1);
    assert_eq!(log.intersection_disconnects, 1);
}

#[test]
fn test_blocked_script() {
    let hooks = MemoryHooks::new(Arc::new(page())).with_blocked_script();
    assert!(hooks.inject_page_script().is_err());
    assert_eq!(hooks.log().script_injections, 0);
}
