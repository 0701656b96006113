//! Modulo headless client: runs a scripted session against an in-process
//! remote and logs the resulting frames.
//!
//! `RUST_LOG=debug cargo run -p modulo-app` shows every gesture and save.

use std::sync::Arc;

use log::info;
use modulo_app::{InteractionController, Session, WorkspaceConfig};
use modulo_core::{CalendarView, ModuleKind};
use modulo_layout::LayoutMode;
use modulo_sync::{MemoryRemote, SyncEvent};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = WorkspaceConfig::from_env();
    let remote = Arc::new(MemoryRemote::new());
    let mut session = Session::open(remote.clone(), &config)?;

    session.open_workspace().await;
    if let Some(status) = session.store().status() {
        info!("Status: {}", status.text);
    }

    session
        .register("Grace", "Hopper", "grace@example.com", "cobol-1959")
        .await?;
    session.open_workspace().await;

    let store = session.store_mut();
    let tasks = store.add_module(ModuleKind::TaskList);
    let first = store.add_item(&tasks, "Write the release notes")?;
    store.add_item(&tasks, "Tag the build")?;
    store.toggle_item(&tasks, &first)?;

    let calendar = store
        .modules()
        .iter()
        .find(|m| m.kind() == ModuleKind::Calendar)
        .map(|m| m.id.clone());
    if let Some(calendar) = calendar {
        let today = store.today().format("%Y-%m-%d").to_string();
        store.add_event(&calendar, &today, "Standup")?;
        store.set_view(&calendar, CalendarView::Weekly)?;
    }

    // Snap mode: drag the new task list to the front.
    let mut controller = InteractionController::new();
    let last = store.modules().len().saturating_sub(1);
    let dragged = controller.drag_start(store, last)?;
    for target in (0..last).rev() {
        controller.drag_over(store, &dragged, target)?;
    }
    controller.drag_end(store, &dragged)?;

    // Free mode: move it by its header.
    session.set_layout_mode(LayoutMode::Free)?;
    let store = session.store_mut();
    if let Some(geometry) = store.geometry_of(&tasks) {
        let (px, py) = (geometry.x as f32 + 10.0, geometry.y as f32 + 10.0);
        if controller.pointer_down(store, px, py)?.is_some() {
            controller.pointer_move(store, &tasks, px + 200.0, py + 40.0)?;
            controller.pointer_up(store, &tasks, px + 240.0, py + 60.0)?;
        }
    }

    for event in store.flush().await {
        match event {
            SyncEvent::Saved { revision } => info!("Saved revision {revision}"),
            SyncEvent::Failed { revision, error } => info!("Revision {revision} failed: {error}"),
        }
    }

    let frame = store.frame();
    info!("Frame {} ({} mode):", frame.generation, frame.mode.as_str());
    for module in &frame.modules {
        let g = module.geometry;
        info!(
            "  {:<14} {:<10} at ({}, {}) {}x{}",
            module.title, module.chip, g.x, g.y, g.width, g.height
        );
    }
    if let Some(stored) = remote.stored("grace@example.com").await {
        info!("Remote holds revision {} with {} module(s)", stored.revision, stored.modules.len());
    }
    println!("{}", serde_json::to_string_pretty(frame)?);
    Ok(())
}
