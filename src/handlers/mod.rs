// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (admin JWT auth)
//
pub mod public;    // No authentication required (/, /health)
pub mod protected; // Admin JWT required (/api/*)
