// ============================================================================
// Module : api
// ============================================================================
// Ce module contient le client API pour récupérer les taux de change
// depuis le fournisseur (exchangerate-api.com)
// ============================================================================

pub mod exchangerate; // Client API exchangerate-api.com

// Re-export des fonctions principales
pub use exchangerate::{convert, fetch_latest_rates};
