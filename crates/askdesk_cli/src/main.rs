//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `askdesk_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    // A tiny probe keeps core crate wiring verifiable independently from
    // any transport host.
    println!("askdesk_core ping={}", askdesk_core::ping());
    println!("askdesk_core version={}", askdesk_core::core_version());
}
