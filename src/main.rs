use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use diagramkit::{
    init_logging, Config, DesignFile, EditorSession, ElementKind, EventFilter, FileImageLoader,
    LineStatus, Point, PolylinePatch, PropertyPatch, RetainedScene,
};

/// Builds a small diagram, edits it, and writes it as a design file.
///
/// Usage: `diagramkit [OUTPUT] [CONFIG]`
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let mut args = std::env::args().skip(1);
    let output = PathBuf::from(args.next().unwrap_or_else(|| "diagram.json".to_string()));
    let config_path = args.next().map(PathBuf::from);
    let config = Config::load_or_default(config_path.as_deref());

    let loader = Arc::new(FileImageLoader::new());
    let mut session = EditorSession::new(RetainedScene::new(), config, loader);
    session.bus().subscribe(EventFilter::All, |event| {
        tracing::debug!("{}", event.description());
    });

    session.add_element(ElementKind::Polygon, None)?;
    session.set_selected_edit_mode(true)?;
    session.add_node_at_edge(0)?;
    session.drag_node(1, Point::new(430.0, 220.0))?;
    session.set_selected_edit_mode(false)?;

    session.add_element(
        ElementKind::Polyline,
        Some(PropertyPatch::Polyline(PolylinePatch {
            status: Some(Some(LineStatus::Running)),
            ..Default::default()
        })),
    )?;
    session.set_selected_edit_mode(true)?;
    session.add_node_at_position(Point::new(600.0, 380.0))?;
    session.set_selected_edit_mode(false)?;

    session.add_element(ElementKind::Text, None)?;

    let name = output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "diagram".to_string());
    DesignFile::with_elements(name, session.serialize())
        .save_to_file(&output)
        .with_context(|| format!("Failed to save {}", output.display()))?;

    tracing::info!(
        "diagramkit {} wrote {} elements to {}",
        diagramkit::VERSION,
        session.len(),
        output.display()
    );
    Ok(())
}
