// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Finds `"<file>"@<line>.<col>` locations in interpreter output and brings the editor's
//! view there.

// Attach.
mod location_scanner;
mod navigator;

// Re-export.
pub use location_scanner::*;
pub use navigator::*;
