//! System Override - GDExtension bindings
//!
//! Exposes the Rust spacecraft simulation to Godot 4 via GDExtension.

use godot::prelude::*;

mod sim_bridge;

/// GDExtension entry point.
struct OverrideExtension;

#[gdextension]
unsafe impl ExtensionLibrary for OverrideExtension {}
