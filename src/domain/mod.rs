// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that define what the
// pipeline talks about: dialogues, turns, tokenised turns and
// the errors preprocessing can raise.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Dialogue records, turns and tokenised turns
pub mod dialog;

// Preprocessing error taxonomy
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
