// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod currency;   // Table statique des devises
pub mod conversion; // Requête et résultat de conversion

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use lazyfx::models::currency::Currency;
// On peut faire : use lazyfx::models::Currency;
pub use conversion::{Conversion, ConversionRequest};
pub use currency::{index_of, Currency, CURRENCIES, DEFAULT_FROM, DEFAULT_TO};
