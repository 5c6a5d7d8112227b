// ============================================================================
// API Client : exchangerate-api.com
// ============================================================================
// Récupère la table de taux "latest" pour une devise de base et calcule
// la conversion demandée
//
// CONCEPTS RUST :
// 1. async/await : programmation asynchrone (non-bloquante)
// 2. Result<T, E> : gestion d'erreurs avec contexte
// 3. Serde : désérialisation JSON automatique
// ============================================================================

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::config::Config;
use crate::models::{Conversion, ConversionRequest};

// ============================================================================
// Structures pour parser la réponse JSON du fournisseur
// ============================================================================
// Le endpoint "latest" renvoie un payload plat :
//   { "result": "success" | "error",
//     "error-type": "invalid-key" (optionnel),
//     "time_last_update_unix": 1700000000 (optionnel),
//     "conversion_rates": { "USD": 1.08, ... } }
//
// CONCEPT RUST : #[serde(rename = "...")]
// - "error-type" contient un tiret, impossible comme identifiant Rust
// - rename fait le mapping JSON -> champ Rust
// ============================================================================

/// Réponse du endpoint "latest rates" du fournisseur
#[derive(Debug, Deserialize)]
struct RatesResponse {
    /// "success" ou "error" (sentinelle applicative du fournisseur)
    result: String,

    /// Type d'erreur applicative (ex: "invalid-key"), présent si result == "error"
    #[serde(rename = "error-type")]
    error_type: Option<String>,

    /// Timestamp Unix de la dernière mise à jour de la table de taux
    time_last_update_unix: Option<i64>,

    /// Table de taux : 1 unité de la devise de base = N unités de chaque devise
    #[serde(default)]
    conversion_rates: HashMap<String, f64>,
}

/// Table de taux pour une devise de base
#[derive(Debug, Clone)]
pub struct RateTable {
    /// Taux par code de devise
    pub rates: HashMap<String, f64>,

    /// Date de dernière mise à jour côté fournisseur
    pub last_update: Option<DateTime<Utc>>,
}

// ============================================================================
// Fonctions publiques de l'API
// ============================================================================

/// Récupère la table de taux "latest" pour une devise de base
///
/// Taxonomie d'erreurs (toutes remontées comme une seule chaîne lisible) :
/// - Configuration : clé API absente, détectée AVANT tout appel réseau
/// - Transport : statut HTTP non-succès
/// - Applicative : payload avec result == "error"
///
/// CONCEPT RUST : #[instrument]
/// - Macro tracing qui ajoute automatiquement un span
/// - skip(config) : la config contient la clé API, on ne la log jamais
#[instrument(skip(config))]
pub async fn fetch_latest_rates(config: &Config, base: &str) -> Result<RateTable> {
    // Erreur de configuration : détectée avant tout appel réseau
    // CONCEPT RUST : Context sur Option
    // - .context() transforme un None en Err avec le message donné
    let api_key = config
        .api_key
        .as_deref()
        .context("Clé API manquante. Veuillez vérifier la configuration.")?;

    let url = build_rates_url(&config.api_base_url, api_key, base);
    debug!(base = %base, "Built exchange rate API URL");

    // Ajout d'un User-Agent explicite, comme pour tout client HTTP du projet
    debug!("Creating HTTP client");
    let client = reqwest::Client::builder()
        .user_agent(concat!("lazyfx/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Échec de la création du client HTTP")?;

    debug!("Sending HTTP request to exchange rate provider");
    let response = client
        .get(&url)
        .send()
        .await
        .context("Échec de la requête. Vérifiez votre clé API.")?;

    let status = response.status();
    debug!(status = %status, "Received HTTP response");

    // Erreur de transport : statut HTTP non-succès (hors 200-299)
    if !status.is_success() {
        error!(status = %status, "Exchange rate provider returned error status");
        anyhow::bail!("Échec de la requête. Vérifiez votre clé API.");
    }

    // Parse la réponse JSON
    // CONCEPT RUST : Serde deserialization
    // - .json::<T>() désérialise automatiquement le JSON vers le type T
    debug!("Parsing JSON response");
    let payload: RatesResponse = response
        .json()
        .await
        .context("Échec du parsing JSON de la réponse du fournisseur")?;

    // Erreur applicative : le fournisseur signale un échec dans le payload
    // (ex: "invalid-key", "inactive-account"). Le message utilisateur est
    // le error-type du fournisseur, ou un libellé générique s'il est absent.
    if payload.result == "error" {
        let error_type = payload
            .error_type
            .unwrap_or_else(|| "Erreur inconnue.".to_string());
        error!(error_type = %error_type, "Provider signalled application error");
        anyhow::bail!("{}", error_type);
    }

    // Convertit le timestamp Unix en DateTime<Utc> (absent = None, pas une erreur)
    let last_update = payload
        .time_last_update_unix
        .and_then(|ts| DateTime::from_timestamp(ts, 0));

    info!(
        base = %base,
        rates = payload.conversion_rates.len(),
        "Successfully fetched rate table"
    );

    Ok(RateTable {
        rates: payload.conversion_rates,
        last_update,
    })
}

/// Exécute une demande de conversion complète
///
/// Pipeline : parse du montant -> fetch de la table de taux pour la devise
/// source -> lookup du taux cible -> multiplication
///
/// Un taux absent pour la devise cible est une erreur explicite (plutôt
/// qu'un résultat non-numérique).
#[instrument(skip(config), fields(seq = request.seq, from = %request.from, to = %request.to))]
pub async fn convert(config: &Config, request: &ConversionRequest) -> Result<Conversion> {
    // Parse le montant saisi
    // CONCEPT RUST : str::parse avec turbofish implicite
    // - Le type cible f64 est inféré depuis la déclaration
    let amount: f64 = request
        .amount
        .trim()
        .parse()
        .with_context(|| format!("Montant invalide : {}", request.amount))?;

    let table = fetch_latest_rates(config, request.from).await?;

    // Lookup du taux pour la devise cible
    // CONCEPT RUST : Option::copied
    // - get() retourne Option<&f64>, copied() donne Option<f64>
    let rate = table
        .rates
        .get(request.to)
        .copied()
        .with_context(|| format!("Taux indisponible pour {}", request.to))?;

    let value = amount * rate;
    info!(rate = rate, value = value, "Conversion computed");

    Ok(Conversion {
        value,
        rate,
        last_update: table.last_update,
    })
}

/// Construit l'URL du endpoint "latest rates"
///
/// Format : {base_url}/v6/{clé}/latest/{devise source}
///
/// CONCEPT RUST : &str vs String
/// - Fonction prend des &str (références, pas d'allocation)
/// - Retourne String (owned, allouée)
fn build_rates_url(base_url: &str, api_key: &str, base: &str) -> String {
    format!(
        "{}/v6/{}/latest/{}",
        base_url.trim_end_matches('/'),
        api_key,
        base
    )
}

// ============================================================================
// Tests unitaires
// ============================================================================
// Le client est testé contre un serveur HTTP mocké (wiremock) : aucun test
// ne dépend du vrai fournisseur ni d'une vraie clé API
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Config de test pointant vers le serveur mocké
    fn test_config(server: &MockServer) -> Config {
        Config::new(Some("test-key".to_string()), server.uri())
    }

    /// Requête de conversion de test
    fn request(amount: &str, from: &'static str, to: &'static str) -> ConversionRequest {
        ConversionRequest {
            seq: 1,
            amount: amount.to_string(),
            from,
            to,
        }
    }

    #[test]
    fn test_build_rates_url() {
        let url = build_rates_url("https://v6.exchangerate-api.com", "ma-cle", "EUR");
        assert_eq!(url, "https://v6.exchangerate-api.com/v6/ma-cle/latest/EUR");

        // Un slash final sur la base ne doit pas doubler le séparateur
        let url = build_rates_url("http://localhost:8080/", "k", "USD");
        assert_eq!(url, "http://localhost:8080/v6/k/latest/USD");
    }

    // CONCEPT RUST : #[tokio::test]
    // - Macro qui setup un runtime tokio pour le test
    // - Permet d'utiliser .await dans les tests
    #[tokio::test]
    async fn test_convert_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v6/test-key/latest/EUR"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": "success",
                "time_last_update_unix": 1_700_000_000,
                "conversion_rates": { "USD": 1.08, "GBP": 0.86 }
            })))
            .mount(&server)
            .await;

        let config = test_config(&server);
        let conversion = convert(&config, &request("100", "EUR", "USD"))
            .await
            .unwrap();

        // 100 EUR à 1.08 -> 108 USD (tolérance flottante)
        assert!((conversion.value - 108.0).abs() < 1e-9);
        assert!((conversion.rate - 1.08).abs() < 1e-9);
        assert!(conversion.last_update.is_some());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let server = MockServer::start().await;

        // Aucun appel ne doit partir : expect(0) fait échouer le test sinon
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = Config::new(None, server.uri());
        let err = convert(&config, &request("100", "EUR", "USD"))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Clé API manquante. Veuillez vérifier la configuration."
        );
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v6/test-key/latest/EUR"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let config = test_config(&server);
        let err = convert(&config, &request("100", "EUR", "USD"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Échec de la requête. Vérifiez votre clé API.");
    }

    #[tokio::test]
    async fn test_provider_application_error() {
        let server = MockServer::start().await;

        // Le fournisseur renvoie 200 mais signale l'erreur dans le payload
        Mock::given(method("GET"))
            .and(path("/v6/test-key/latest/EUR"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": "error",
                "error-type": "invalid-key"
            })))
            .mount(&server)
            .await;

        let config = test_config(&server);
        let err = convert(&config, &request("100", "EUR", "USD"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "invalid-key");
    }

    #[tokio::test]
    async fn test_provider_error_without_type() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v6/test-key/latest/EUR"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": "error"
            })))
            .mount(&server)
            .await;

        let config = test_config(&server);
        let err = convert(&config, &request("100", "EUR", "USD"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Erreur inconnue.");
    }

    #[tokio::test]
    async fn test_missing_rate_for_target() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v6/test-key/latest/EUR"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": "success",
                "conversion_rates": { "USD": 1.08 }
            })))
            .mount(&server)
            .await;

        let config = test_config(&server);
        let err = convert(&config, &request("100", "EUR", "XOF"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Taux indisponible pour XOF");
    }

    #[tokio::test]
    async fn test_invalid_amount() {
        let server = MockServer::start().await;

        // Le parsing du montant échoue avant tout appel réseau
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = test_config(&server);
        let err = convert(&config, &request(".", "EUR", "USD"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Montant invalide : .");
    }

    #[tokio::test]
    async fn test_zero_amount_is_converted() {
        let server = MockServer::start().await;

        // "0" n'est pas un montant vide : la conversion a bien lieu
        Mock::given(method("GET"))
            .and(path("/v6/test-key/latest/EUR"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": "success",
                "conversion_rates": { "USD": 1.08 }
            })))
            .mount(&server)
            .await;

        let config = test_config(&server);
        let conversion = convert(&config, &request("0", "EUR", "USD"))
            .await
            .unwrap();

        assert_eq!(conversion.value, 0.0);
    }
}
