// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;    // Gestion des événements clavier
pub mod converter; // Rendu du formulaire de conversion

// Re-exports pour simplifier les imports
pub use converter::render;
pub use events::{Event, EventHandler};
