//! Scan and stats commands: replay a page snapshot through the engine.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use hintkit_config::Config;
use hintkit_core::{ElementFilter, ElementManager, ManagerConfig, ManagerStats, QueueProgress, VisibleElement};
use hintkit_dom::{MemoryDocument, MemoryHooks};
use hintkit_protocols::{ElementType, InstantDeadline, Viewport};
use tracing::{debug, info};

use crate::cli::OutputFormat;

type CmdResult<T> = Result<T, Box<dyn std::error::Error>>;

/// A page snapshot wired to a running element manager.
pub(crate) struct Session {
    document: Arc<MemoryDocument>,
    manager: ElementManager,
}

impl Session {
    pub(crate) fn open(config: &Config, page: &Path) -> CmdResult<Self> {
        let document = Arc::new(MemoryDocument::load(page)?);
        let hooks = Arc::new(MemoryHooks::new(document.clone()));
        let manager = ElementManager::new(document.clone(), hooks.clone(), ManagerConfig::from(config))?;
        hooks.attach(manager.intersection_sender());
        manager.start();
        info!("Loaded {} ({} elements)", page.display(), document.len());
        Ok(Self { document, manager })
    }

    /// The top-level viewport of the page.
    fn viewports(&self) -> Vec<Viewport> {
        let viewport = self.document.viewport();
        vec![Viewport::new(0.0, 0.0, viewport.width, viewport.height)]
    }

    /// Run idle slices of `slice` each until the queue drains. Returns the
    /// number of slices used.
    pub(crate) fn drain_in_slices(&self, slice: Duration) -> usize {
        let mut slices = 0;
        loop {
            slices += 1;
            let deadline = InstantDeadline::after(slice);
            if self.manager.process_idle_slice(&deadline) == QueueProgress::Drained {
                break;
            }
        }
        debug!("Queue drained in {} slices", slices);
        slices
    }

    pub(crate) async fn hints(&self, filter: &ElementFilter) -> CmdResult<Vec<VisibleElement>> {
        let results = self
            .manager
            .get_visible_elements(filter, &self.viewports(), None)
            .await?;
        Ok(results.into_iter().flatten().collect())
    }

    pub(crate) fn stats(&self) -> ManagerStats {
        self.manager.get_stats()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.manager.stop();
    }
}

pub(crate) fn filter_for(types: Vec<ElementType>, selectable: bool) -> ElementFilter {
    if selectable {
        ElementFilter::Selectable
    } else if types.is_empty() {
        ElementFilter::all()
    } else {
        ElementFilter::types(types)
    }
}

pub(crate) async fn handle_scan(
    config: &Config,
    page: &Path,
    types: Vec<ElementType>,
    selectable: bool,
    slice_ms: Option<u64>,
    format: OutputFormat,
) -> CmdResult<()> {
    let session = Session::open(config, page)?;
    if let Some(ms) = slice_ms {
        session.drain_in_slices(Duration::from_millis(ms));
    }
    let hints = session.hints(&filter_for(types, selectable)).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&hints)?),
        OutputFormat::Table => {
            if hints.is_empty() {
                println!("No elements found.");
            } else {
                print!("{}", render_hints(&hints));
            }
        }
    }
    Ok(())
}

pub(crate) async fn handle_stats(config: &Config, page: &Path, format: OutputFormat) -> CmdResult<()> {
    let session = Session::open(config, page)?;
    session.hints(&ElementFilter::all()).await?;
    let stats = session.stats();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Table => print!("{}", render_stats(&stats)),
    }
    Ok(())
}

fn render_hints(hints: &[VisibleElement]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:<16} {:>8} {:>8} {:<6} {:>6} {}",
        "ELEMENT", "TYPE", "X", "Y", "ALIGN", "WEIGHT", "LISTENER"
    );
    let _ = writeln!(out, "{}", "-".repeat(68));
    for hint in hints {
        let align = match hint.measurement.align {
            hintkit_protocols::Align::Left => "left",
            hintkit_protocols::Align::Right => "right",
        };
        let _ = writeln!(
            out,
            "{:<10} {:<16} {:>8.1} {:>8.1} {:<6} {:>6.2} {}",
            hint.element.to_string(),
            hint.element_type.as_str(),
            hint.measurement.x,
            hint.measurement.y,
            align,
            hint.measurement.weight,
            if hint.has_click_listener { "yes" } else { "no" }
        );
    }
    out
}

fn render_stats(stats: &ManagerStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Running:          {}", stats.running);
    let _ = writeln!(out, "Bailed:           {}", stats.bailed);
    let _ = writeln!(out, "Elements:         {}", stats.total_elements);
    for (element_type, count) in &stats.elements {
        let _ = writeln!(out, "  {:<16}{}", element_type.as_str(), count);
    }
    let _ = writeln!(out, "Visible:          {}", stats.visible_elements);
    let _ = writeln!(
        out,
        "Frames:           {} ({} visible)",
        stats.tracked_frames, stats.visible_frames
    );
    let _ = writeln!(out, "Queue length:     {}", stats.queue_length);
    let _ = writeln!(
        out,
        "Processing:       {:.3} ms in {} slices",
        stats.processing_time_ms, stats.slices
    );
    out
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use hintkit_protocols::ElementId;
    use tempfile::NamedTempFile;

    use super::*;

    const PAGE: &str = r#"{
        "url": "https://example.com/",
        "nodes": [
            { "id": 1, "tag_name": "html", "rects": [{ "x": 0, "y": 0, "width": 1280, "height": 2000 }] },
            { "id": 2, "tag_name": "body", "parent": 1, "rects": [{ "x": 0, "y": 0, "width": 1280, "height": 2000 }] },
            { "id": 3, "tag_name": "a", "parent": 2, "attributes": { "href": "/docs" },
              "rects": [{ "x": 10, "y": 10, "width": 100, "height": 20 }] },
            { "id": 4, "tag_name": "div", "parent": 2, "onclick": true,
              "rects": [{ "x": 10, "y": 50, "width": 100, "height": 20 }] },
            { "id": 5, "tag_name": "button", "parent": 4,
              "rects": [{ "x": 10, "y": 50, "width": 100, "height": 20 }] },
            { "id": 6, "tag_name": "p", "parent": 2,
              "rects": [{ "x": 10, "y": 90, "width": 400, "height": 20 }],
              "text_runs": [{ "rects": [{ "x": 10, "y": 92, "width": 300, "height": 16 }] }] }
        ]
    }"#;

    fn page_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(PAGE.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_scan_page() {
        let file = page_file();
        let session = Session::open(&Config::default(), file.path()).unwrap();
        let hints = session.hints(&filter_for(Vec::new(), false)).await.unwrap();
        let found: Vec<(ElementId, ElementType)> =
            hints.iter().map(|h| (h.element, h.element_type)).collect();
        assert_eq!(
            found,
            vec![
                (ElementId(3), ElementType::Link),
                (ElementId(5), ElementType::Clickable)
            ]
        );

        let table = render_hints(&hints);
        assert!(table.starts_with("ELEMENT"));
        assert!(table.contains("#3"));
        assert!(table.contains("link"));
    }

    #[tokio::test]
    async fn test_scan_selectable() {
        let file = page_file();
        let session = Session::open(&Config::default(), file.path()).unwrap();
        let hints = session.hints(&filter_for(Vec::new(), true)).await.unwrap();
        assert!(hints.iter().any(|h| h.element == ElementId(6)));
        assert!(hints.iter().all(|h| h.element_type == ElementType::Selectable));
    }

    #[tokio::test]
    async fn test_sliced_scan_matches() {
        let file = page_file();
        let session = Session::open(&Config::default(), file.path()).unwrap();
        assert!(session.drain_in_slices(Duration::from_millis(50)) >= 1);
        assert_eq!(session.stats().queue_length, 0);
        let hints = session
            .hints(&filter_for(vec![ElementType::Link], false))
            .await
            .unwrap();
        assert_eq!(hints.len(), 1);
    }

    #[tokio::test]
    async fn test_stats_report() {
        let file = page_file();
        let session = Session::open(&Config::default(), file.path()).unwrap();
        session.hints(&ElementFilter::all()).await.unwrap();
        let stats = session.stats();
        assert_eq!(stats.total_elements, 3);
        let report = render_stats(&stats);
        assert!(report.contains("Elements:         3"));
        assert!(report.contains("clickable-event"));
    }

    #[test]
    fn test_missing_page() {
        let result = Session::open(&Config::default(), Path::new("/nonexistent/page.json"));
        assert!(result.is_err());
    }
}
