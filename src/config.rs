// ============================================================================
// Structure : Config
// ============================================================================
// Configuration explicite de l'application, construite une fois dans main()
// et injectée dans le worker / le client API
//
// CONCEPT : Dependency injection plutôt que lecture ambiante
// - La clé API n'est PAS lue depuis l'environnement au moment de l'appel
// - Elle est capturée une fois au démarrage dans un objet Config
// - Les tests peuvent construire un Config pointant vers un serveur mocké
// ============================================================================

use std::env;

/// Variable d'environnement contenant la clé API du fournisseur de taux
pub const API_KEY_ENV: &str = "EXCHANGERATE_API_KEY";

/// URL de base du fournisseur de taux (exchangerate-api.com)
pub const DEFAULT_API_BASE_URL: &str = "https://v6.exchangerate-api.com";

/// Configuration de l'application
///
/// CONCEPT RUST : Option pour l'absence de valeur
/// - api_key: None -> l'erreur est remontée à l'utilisateur lors de la
///   première conversion, jamais au démarrage
#[derive(Debug, Clone)]
pub struct Config {
    /// Clé API du fournisseur de taux (None si non configurée)
    pub api_key: Option<String>,

    /// URL de base de l'API (remplaçable dans les tests)
    pub api_base_url: String,
}

impl Config {
    /// Construit la configuration depuis l'environnement
    ///
    /// Une variable vide est traitée comme absente : exporter
    /// EXCHANGERATE_API_KEY="" ne compte pas comme une clé configurée.
    pub fn from_env() -> Self {
        let api_key = env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty());

        Self {
            api_key,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Construit une configuration explicite (utilisé par les tests)
    pub fn new(api_key: Option<String>, api_base_url: String) -> Self {
        Self {
            api_key,
            api_base_url,
        }
    }

    /// Vérifie si une clé API est configurée
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
