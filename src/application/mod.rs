// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers; no tensor code and no
// printing here.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The preprocessing workflow
pub mod prepare_use_case;
