// ============================================================================
// Structure : Currency
// ============================================================================
// Représente une devise supportée par le convertisseur
//
// CONCEPTS RUST :
// 1. &'static str : chaînes connues à la compilation (pas d'allocation)
// 2. const : table de devises figée dans le binaire
// 3. Copy : la structure est copiée librement (deux pointeurs, c'est tout)
// ============================================================================

/// Une devise du convertisseur
///
/// CONCEPT RUST : &'static str vs String
/// - La liste des devises est fixe et connue à la compilation
/// - &'static str : référence vers le binaire, aucune allocation
/// - Copy : passer une Currency par valeur ne coûte rien
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    /// Code ISO 4217 (ex: "EUR", "USD")
    pub code: &'static str,

    /// Nom affiché à l'utilisateur (ex: "Euro", "Dollar américain")
    pub name: &'static str,
}

impl Currency {
    /// Libellé affiché dans les sélecteurs
    ///
    /// Format : "Euro (EUR)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }
}

// ============================================================================
// Table des devises
// ============================================================================
// CONCEPT RUST : const array
// - Taille fixe connue à la compilation : [Currency; 10]
// - Immuable, jamais persistée, définie au démarrage du process
// ============================================================================

/// Les 10 devises proposées par le convertisseur
pub const CURRENCIES: [Currency; 10] = [
    Currency { code: "EUR", name: "Euro" },
    Currency { code: "USD", name: "Dollar américain" },
    Currency { code: "GBP", name: "Livre sterling" },
    Currency { code: "XOF", name: "Franc CFA" },
    Currency { code: "JPY", name: "Yen japonais" },
    Currency { code: "CAD", name: "Dollar canadien" },
    Currency { code: "AUD", name: "Dollar australien" },
    Currency { code: "CHF", name: "Franc suisse" },
    Currency { code: "CNY", name: "Yuan chinois" },
    Currency { code: "INR", name: "Roupie indienne" },
];

/// Devise source par défaut
pub const DEFAULT_FROM: &str = "EUR";

/// Devise cible par défaut
pub const DEFAULT_TO: &str = "USD";

/// Retourne l'index d'une devise dans la table à partir de son code
///
/// CONCEPT RUST : Iterator::position
/// - Parcourt la table et retourne l'index du premier match
/// - Option<usize> : None si le code n'existe pas
pub fn index_of(code: &str) -> Option<usize> {
    CURRENCIES.iter().position(|c| c.code == code)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_ten_currencies() {
        assert_eq!(CURRENCIES.len(), 10);
    }

    #[test]
    fn test_codes_are_iso_like() {
        // Codes ISO 4217 : 3 lettres majuscules
        for currency in CURRENCIES.iter() {
            assert_eq!(currency.code.len(), 3);
            assert!(currency.code.chars().all(|c| c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_index_of() {
        assert_eq!(index_of("EUR"), Some(0));
        assert_eq!(index_of("USD"), Some(1));
        assert_eq!(index_of("INR"), Some(9));
        assert_eq!(index_of("BTC"), None);
    }

    #[test]
    fn test_defaults_exist_in_table() {
        assert!(index_of(DEFAULT_FROM).is_some());
        assert!(index_of(DEFAULT_TO).is_some());
        assert_ne!(DEFAULT_FROM, DEFAULT_TO);
    }

    #[test]
    fn test_label_format() {
        let eur = CURRENCIES[index_of("EUR").unwrap()];
        assert_eq!(eur.label(), "Euro (EUR)");
    }
}
