//! Prints every global mouse button and wheel event.
//!
//! Usage: `mousehook-demo [--json] [CONFIG.yaml]`
//!
//! Without a config path the default location is used if it exists.

use mousehook_core::{HookConfig, MouseEvent};
use mousehook_platform::MouseHook;
use std::process::ExitCode;

// Prefix match: covers mousehook_core, mousehook_platform and mousehook_demo.
const DEFAULT_LOG_FILTER: &str = "mousehook=info";

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .try_init();
}

fn print_event(label: &str, event: MouseEvent, json: bool) {
    if json {
        match serde_json::to_string(&event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!("Failed to serialize event: {}", e),
        }
    } else if label == "wheel" {
        println!(
            "Mouse wheel event: {} -> Delta {} at ({}, {})",
            event.button, event.delta, event.x, event.y
        );
    } else {
        println!(
            "Mouse button {}: {} at ({}, {})",
            label, event.button, event.x, event.y
        );
    }
}

fn main() -> ExitCode {
    init_logging();

    let mut json = false;
    let mut config_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            _ => config_path = Some(arg),
        }
    }

    let config = match config_path {
        Some(path) => HookConfig::load(&path),
        None => HookConfig::load_or_default(HookConfig::default_path()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let hook = MouseHook::with_config(config);
    hook.on_down(move |event| print_event("down", event, json))
        .on_up(move |event| print_event("up", event, json))
        .on_wheel(move |event| print_event("wheel", event, json));

    println!("Press Ctrl+C to exit");
    match hook.run() {
        Ok(stats) => {
            tracing::info!(?stats, "Hook finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Mouse hook failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
