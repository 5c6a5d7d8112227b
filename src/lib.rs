// ============================================================================
// LazyFX - Library
// ============================================================================
// Expose les modules publics pour les tests et le binaire
// ============================================================================

pub mod api;    // Client API exchangerate-api.com
pub mod app;    // État de l'application
pub mod config; // Configuration (clé API, URL de base)
pub mod models; // Structures de données
pub mod ui;     // Interface utilisateur
