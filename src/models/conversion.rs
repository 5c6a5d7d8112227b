// ============================================================================
// Structures : ConversionRequest et Conversion
// ============================================================================
// Les deux extrémités du cycle de conversion :
// - ConversionRequest : snapshot de l'état au moment où le debounce expire
// - Conversion : résultat d'une requête réussie
//
// CONCEPTS RUST :
// 1. Snapshot pattern : la requête fige les valeurs, l'état peut continuer
//    à changer pendant l'appel réseau
// 2. Numéro de séquence : identifie chaque requête émise pour pouvoir
//    écarter les réponses périmées
// ============================================================================

use chrono::{DateTime, Utc};

/// Une demande de conversion émise vers le worker
///
/// CONCEPT : Request sequencing
/// - seq est strictement croissant (une requête = un numéro)
/// - Une réponse dont le seq n'est plus le dernier émis est périmée
/// - Transforme le "dernier résolu gagne" en "dernier émis gagne"
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Numéro de séquence de la requête
    pub seq: u64,

    /// Montant saisi, tel quel (le parsing se fait côté client API)
    pub amount: String,

    /// Code de la devise source (ex: "EUR")
    pub from: &'static str,

    /// Code de la devise cible (ex: "USD")
    pub to: &'static str,
}

/// Résultat d'une conversion réussie
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Montant converti : montant parsé * taux
    pub value: f64,

    /// Taux appliqué (1 unité de la devise source = rate unités de la cible)
    pub rate: f64,

    /// Date de dernière mise à jour de la table de taux côté fournisseur
    /// None si le fournisseur ne renvoie pas le timestamp
    pub last_update: Option<DateTime<Utc>>,
}
