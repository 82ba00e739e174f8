// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
mod process_record;
mod process_registry;
mod process_types;

// Re-export.
pub use process_record::*;
pub use process_registry::*;
pub use process_types::*;
