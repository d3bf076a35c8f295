//! imframe - per-frame mutation scheduler and async callback runtime
//!
//! Headless demo binary. It initializes:
//! - Logging infrastructure (file rotation + console output)
//! - Configuration loading ([`ConfigManager`])
//! - A [`ScriptRegistry`] host with a few demo handlers
//! - An [`App`] driven for a fixed number of frames
//!
//! The demo builds a small window tree, queues runtime mutations and an
//! async job, and runs the frame loop until the job's result has been
//! dispatched back onto the render thread.

use anyhow::Result;
use imframe::{
    App, ConfigManager, InputFrame, Item, ItemKind, NullRenderer, Payload, ScriptRegistry,
    SystemClock, APP_NAME, ROOT_WINDOW, VERSION,
};
use std::sync::Arc;

fn main() -> Result<()> {
    let _guard = imframe::logging::setup_logging_with_console("logs", "imframe", false, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_manager = ConfigManager::new("imframe-data")?;
    let config = config_manager.load()?;

    let registry = Arc::new(ScriptRegistry::new());
    registry.register(ScriptRegistry::PRIMARY, "on_render", |_, _| {
        Ok(Payload::Empty)
    });
    registry.register(ScriptRegistry::PRIMARY, "compute", |_, payload| {
        match payload {
            Payload::Int(value) => Ok(Payload::Int(value * value)),
            other => Ok(other),
        }
    });
    registry.register(ScriptRegistry::PRIMARY, "on_result", |_, payload| {
        tracing::info!("async result arrived: {:?}", payload);
        Ok(Payload::Empty)
    });

    let mut app = App::new(
        config,
        Arc::clone(&registry) as Arc<dyn imframe::HostEnv>,
        Box::new(NullRenderer::new()),
        Box::new(SystemClock::new()),
    );

    // Build phase: a menu with two entries under the root window.
    app.add_item(Item::new(ItemKind::Menu, "menu"))?;
    app.push_parent("menu")?;
    app.add_item(Item::new(ItemKind::Widget, "open"))?;
    app.add_item(Item::new(ItemKind::Widget, "quit"))?;
    app.pop_parent()?;
    app.set_render_callback(ROOT_WINDOW, "on_render")?;

    app.start();

    // Runtime phase: queue a few structural changes and one async job.
    app.add_runtime_item(ROOT_WINDOW, None, Item::new(ItemKind::Widget, "status"))?;
    app.move_item_up("quit")?;
    app.run_async("compute", Payload::Int(12), "on_result");

    let input = InputFrame::default();
    for _ in 0..120 {
        app.frame(&input)?;
        if !app.pool_active() {
            continue;
        }
        std::thread::sleep(std::time::Duration::from_millis(1));
    }

    for error in registry.errors() {
        tracing::warn!("host reported: {error}");
    }

    app.shutdown();
    tracing::info!("demo finished after {} frames", app.frame_count());
    Ok(())
}
