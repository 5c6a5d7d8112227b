// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global du convertisseur TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Encapsulation : le debounce et le séquencement sont privés, accès via
//    méthodes publiques
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Garantit la cohérence de l'état
// ============================================================================

use std::time::{Duration, Instant};

use crate::models::{index_of, Conversion, ConversionRequest, Currency, CURRENCIES, DEFAULT_FROM, DEFAULT_TO};

/// Fenêtre de quiescence du debounce : seule la dernière saisie d'une
/// rafale de moins de 500ms déclenche un appel réseau
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

// ============================================================================
// Enum : Field
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Représente le champ du formulaire ayant le focus
// - Un seul champ actif à la fois
// ============================================================================

/// Champs du formulaire de conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Saisie du montant
    Amount,

    /// Sélecteur de devise source ("De")
    From,

    /// Sélecteur de devise cible ("Vers")
    To,
}

impl Field {
    /// Champ suivant dans l'ordre du formulaire (Tab / flèche bas)
    pub fn next(self) -> Self {
        match self {
            Field::Amount => Field::From,
            Field::From => Field::To,
            Field::To => Field::Amount,
        }
    }

    /// Champ précédent (flèche haut)
    pub fn previous(self) -> Self {
        match self {
            Field::Amount => Field::To,
            Field::From => Field::Amount,
            Field::To => Field::From,
        }
    }
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Montant saisi, texte brut (peut être vide)
    pub amount: String,

    /// Index de la devise source dans CURRENCIES
    pub from_index: usize,

    /// Index de la devise cible dans CURRENCIES
    /// Invariant : to_index != from_index (pas de conversion X -> X)
    pub to_index: usize,

    /// Champ du formulaire ayant le focus
    pub focus: Field,

    /// Dernier résultat de conversion (None tant que rien n'a abouti)
    pub result: Option<Conversion>,

    /// Message d'erreur de la dernière tentative
    /// Invariant : result et error jamais non-None en même temps
    pub error: Option<String>,

    /// Indique si une conversion est en cours
    pub is_loading: bool,

    /// Indique si l'utilisateur a demandé à quitter (attend confirmation)
    /// CONCEPT : Two-step quit pour éviter les sorties accidentelles
    pub confirm_quit: bool,

    /// Une saisie a eu lieu depuis le dernier poll (debounce à replanifier)
    dirty: bool,

    /// Échéance du debounce en cours (None si rien de planifié)
    debounce_deadline: Option<Instant>,

    /// Numéro de séquence de la dernière requête émise
    /// CONCEPT : Stale response guard
    /// - Chaque requête émise incrémente ce compteur
    /// - Une réponse dont le seq ne correspond plus est écartée
    /// - Garantit "dernier émis gagne" malgré des réponses dans le désordre
    latest_seq: u64,
}

impl App {
    /// Crée une nouvelle instance de App (EUR -> USD, montant vide)
    pub fn new() -> Self {
        Self {
            running: true,
            amount: String::new(),
            from_index: index_of(DEFAULT_FROM).unwrap_or(0),
            to_index: index_of(DEFAULT_TO).unwrap_or(1),
            focus: Field::Amount,
            result: None,
            error: None,
            is_loading: false,
            confirm_quit: false,
            dirty: false,
            debounce_deadline: None,
            latest_seq: 0,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Devise source actuellement sélectionnée
    pub fn from_currency(&self) -> Currency {
        CURRENCIES[self.from_index]
    }

    /// Devise cible actuellement sélectionnée
    pub fn to_currency(&self) -> Currency {
        CURRENCIES[self.to_index]
    }

    // ========================================================================
    // Saisie du montant
    // ========================================================================

    /// Ajoute un caractère au montant (chiffres, un seul point décimal)
    ///
    /// Le filtrage se fait ici et non dans l'UI : le buffer ne peut pas
    /// contenir autre chose qu'un nombre décimal partiel
    pub fn append_amount_char(&mut self, c: char) {
        let accepted = c.is_ascii_digit() || (c == '.' && !self.amount.contains('.'));
        if accepted {
            self.amount.push(c);
            self.touch();
        }
    }

    /// Supprime le dernier caractère du montant
    pub fn backspace_amount(&mut self) {
        if self.amount.pop().is_some() {
            self.touch();
        }
    }

    // ========================================================================
    // Navigation dans le formulaire
    // ========================================================================

    /// Donne le focus au champ suivant (Tab / flèche bas)
    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    /// Donne le focus au champ précédent (flèche haut)
    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    // ========================================================================
    // Sélection des devises
    // ========================================================================

    /// Passe à la devise suivante dans le sélecteur ayant le focus
    ///
    /// CONCEPT : Cycle d'états
    /// - Le sélecteur cible saute la devise source (pas de X -> X)
    /// - Déplacer la source sur la cible pousse la cible d'un cran
    pub fn next_currency(&mut self) {
        match self.focus {
            Field::Amount => {}
            Field::From => {
                self.from_index = (self.from_index + 1) % CURRENCIES.len();
                self.bump_target_if_colliding();
                self.touch();
            }
            Field::To => {
                self.to_index = self.next_target_index(self.to_index);
                self.touch();
            }
        }
    }

    /// Passe à la devise précédente dans le sélecteur ayant le focus
    pub fn previous_currency(&mut self) {
        match self.focus {
            Field::Amount => {}
            Field::From => {
                self.from_index = (self.from_index + CURRENCIES.len() - 1) % CURRENCIES.len();
                self.bump_target_if_colliding();
                self.touch();
            }
            Field::To => {
                self.to_index = self.previous_target_index(self.to_index);
                self.touch();
            }
        }
    }

    /// Inverse les devises source et cible
    ///
    /// Pas de validation nécessaire : les deux index sont toujours des
    /// devises valides et distinctes
    pub fn swap_currencies(&mut self) {
        std::mem::swap(&mut self.from_index, &mut self.to_index);
        self.touch();
    }

    /// Index cible suivant, en sautant la devise source
    fn next_target_index(&self, from_position: usize) -> usize {
        let mut index = (from_position + 1) % CURRENCIES.len();
        if index == self.from_index {
            index = (index + 1) % CURRENCIES.len();
        }
        index
    }

    /// Index cible précédent, en sautant la devise source
    fn previous_target_index(&self, from_position: usize) -> usize {
        let len = CURRENCIES.len();
        let mut index = (from_position + len - 1) % len;
        if index == self.from_index {
            index = (index + len - 1) % len;
        }
        index
    }

    /// Rétablit l'invariant to_index != from_index après un déplacement
    /// de la devise source
    fn bump_target_if_colliding(&mut self) {
        if self.to_index == self.from_index {
            self.to_index = (self.to_index + 1) % CURRENCIES.len();
        }
    }

    // ========================================================================
    // Debounce et émission des requêtes
    // ========================================================================

    /// Marque une saisie : le debounce sera (re)planifié au prochain poll
    fn touch(&mut self) {
        self.dirty = true;
    }

    /// Fait avancer le cycle de debounce et émet une requête si l'échéance
    /// est atteinte
    ///
    /// Appelé à chaque itération de l'event loop (étape UPDATE). Prend `now`
    /// en paramètre pour rester déterministe dans les tests.
    ///
    /// CONCEPT : Debounce par échéance
    /// - Toute saisie replanifie l'échéance à now + 500ms (l'ancienne est
    ///   annulée de fait : il n'y a qu'une seule échéance)
    /// - Montant vide : rien n'est planifié, aucune requête n'est émise
    /// - À l'échéance : snapshot de l'état et émission d'UNE requête
    pub fn poll_conversion(&mut self, now: Instant) -> Option<ConversionRequest> {
        if self.dirty {
            self.dirty = false;
            self.debounce_deadline = if self.amount.is_empty() {
                None
            } else {
                Some(now + DEBOUNCE_WINDOW)
            };
        }

        let deadline = self.debounce_deadline?;
        if now < deadline {
            return None;
        }

        // L'échéance est atteinte : émet la requête
        self.debounce_deadline = None;
        self.latest_seq += 1;
        self.is_loading = true;
        self.error = None;

        Some(ConversionRequest {
            seq: self.latest_seq,
            amount: self.amount.clone(),
            from: self.from_currency().code,
            to: self.to_currency().code,
        })
    }

    /// Applique un résultat de conversion réussi
    ///
    /// Retourne false si la réponse est périmée (une requête plus récente
    /// a été émise entre temps) : l'état n'est alors pas modifié
    pub fn apply_success(&mut self, seq: u64, conversion: Conversion) -> bool {
        if seq != self.latest_seq {
            return false;
        }

        self.is_loading = false;
        self.error = None;
        self.result = Some(conversion);
        true
    }

    /// Applique un échec de conversion
    ///
    /// Retourne false si la réponse est périmée. Un échec remplace le
    /// résultat précédent : result et error ne coexistent jamais.
    pub fn apply_failure(&mut self, seq: u64, message: String) -> bool {
        if seq != self.latest_seq {
            return false;
        }

        self.is_loading = false;
        self.result = None;
        self.error = Some(message);
        true
    }

    // ========================================================================
    // Quit Confirmation Management
    // ========================================================================

    /// Demande la confirmation de quitter
    ///
    /// CONCEPT : Two-step quit pattern
    /// - Première pression de 'q' : confirm_quit = true
    /// - Deuxième pression : quit réel
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Vérifie si on attend la confirmation de quit
    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Échéance largement dépassée pour forcer l'émission
    fn after_window(start: Instant) -> Instant {
        start + DEBOUNCE_WINDOW + Duration::from_millis(10)
    }

    #[test]
    fn test_app_creation() {
        let app = App::new();
        assert!(app.is_running());
        assert_eq!(app.from_currency().code, "EUR");
        assert_eq!(app.to_currency().code, "USD");
        assert!(app.amount.is_empty());
        assert!(app.result.is_none());
        assert!(app.error.is_none());
        assert!(!app.is_loading);
    }

    #[test]
    fn test_amount_input_filtering() {
        let mut app = App::new();
        app.append_amount_char('1');
        app.append_amount_char('2');
        app.append_amount_char('.');
        app.append_amount_char('.'); // deuxième point refusé
        app.append_amount_char('5');
        app.append_amount_char('x'); // lettre refusée
        assert_eq!(app.amount, "12.5");

        app.backspace_amount();
        assert_eq!(app.amount, "12.");
    }

    #[test]
    fn test_swap_currencies() {
        let mut app = App::new();
        app.swap_currencies();
        assert_eq!(app.from_currency().code, "USD");
        assert_eq!(app.to_currency().code, "EUR");

        app.swap_currencies();
        assert_eq!(app.from_currency().code, "EUR");
        assert_eq!(app.to_currency().code, "USD");
    }

    #[test]
    fn test_target_selector_skips_source() {
        let mut app = App::new();
        app.focus = Field::To;

        // Un tour complet du sélecteur cible ne doit jamais proposer la source
        for _ in 0..(CURRENCIES.len() * 2) {
            app.next_currency();
            assert_ne!(app.to_index, app.from_index);
        }
        for _ in 0..(CURRENCIES.len() * 2) {
            app.previous_currency();
            assert_ne!(app.to_index, app.from_index);
        }
    }

    #[test]
    fn test_moving_source_onto_target_bumps_target() {
        let mut app = App::new();
        app.focus = Field::From;

        // EUR -> USD : avancer la source d'un cran la met sur USD (la cible)
        app.next_currency();
        assert_eq!(app.from_currency().code, "USD");
        assert_ne!(app.to_index, app.from_index);
    }

    #[test]
    fn test_empty_amount_never_issues_request() {
        let mut app = App::new();
        let start = Instant::now();

        // Changer les devises sans montant ne planifie rien
        app.swap_currencies();
        assert!(app.poll_conversion(start).is_none());
        assert!(app.poll_conversion(after_window(start)).is_none());

        // result / error restent intacts
        assert!(app.result.is_none());
        assert!(app.error.is_none());
        assert!(!app.is_loading);
    }

    #[test]
    fn test_debounce_waits_for_quiescence() {
        let mut app = App::new();
        let start = Instant::now();

        app.append_amount_char('1');

        // Premier poll : planifie l'échéance, n'émet rien
        assert!(app.poll_conversion(start).is_none());

        // Juste avant l'échéance : toujours rien
        let before = start + DEBOUNCE_WINDOW - Duration::from_millis(1);
        assert!(app.poll_conversion(before).is_none());

        // Échéance atteinte : une requête est émise
        let request = app.poll_conversion(after_window(start)).unwrap();
        assert_eq!(request.amount, "1");
        assert_eq!(request.from, "EUR");
        assert_eq!(request.to, "USD");
        assert!(app.is_loading);

        // Sans nouvelle saisie, plus aucune émission
        assert!(app.poll_conversion(after_window(after_window(start))).is_none());
    }

    #[test]
    fn test_rapid_edits_issue_single_request_with_final_state() {
        let mut app = App::new();
        let start = Instant::now();

        // Frappes "1", "12", "123" à 100ms d'intervalle (< fenêtre de 500ms)
        app.append_amount_char('1');
        assert!(app.poll_conversion(start).is_none());

        app.append_amount_char('2');
        assert!(app.poll_conversion(start + Duration::from_millis(100)).is_none());

        app.append_amount_char('3');
        let last_edit = start + Duration::from_millis(200);
        assert!(app.poll_conversion(last_edit).is_none());

        // L'échéance courante part de la dernière frappe
        let before = last_edit + DEBOUNCE_WINDOW - Duration::from_millis(1);
        assert!(app.poll_conversion(before).is_none());

        let request = app.poll_conversion(after_window(last_edit)).unwrap();
        assert_eq!(request.amount, "123");
        assert_eq!(request.seq, 1); // une seule requête émise au total
    }

    #[test]
    fn test_clearing_amount_cancels_pending_request() {
        let mut app = App::new();
        let start = Instant::now();

        app.append_amount_char('7');
        assert!(app.poll_conversion(start).is_none());

        // Le montant redevient vide avant l'échéance
        app.backspace_amount();
        assert!(app.poll_conversion(after_window(start)).is_none());
    }

    #[test]
    fn test_zero_amount_is_issued() {
        let mut app = App::new();
        let start = Instant::now();

        // "0" n'est pas vide : la requête part
        app.append_amount_char('0');
        assert!(app.poll_conversion(start).is_none());
        let request = app.poll_conversion(after_window(start)).unwrap();
        assert_eq!(request.amount, "0");
    }

    #[test]
    fn test_apply_success_and_failure_are_exclusive() {
        let mut app = App::new();
        let start = Instant::now();

        app.append_amount_char('1');
        app.poll_conversion(start);
        let request = app.poll_conversion(after_window(start)).unwrap();

        let conversion = Conversion {
            value: 1.08,
            rate: 1.08,
            last_update: None,
        };
        assert!(app.apply_success(request.seq, conversion));
        assert!(app.result.is_some());
        assert!(app.error.is_none());
        assert!(!app.is_loading);

        // Une nouvelle requête qui échoue remplace le résultat
        app.append_amount_char('2');
        let t2 = after_window(start) + Duration::from_secs(1);
        app.poll_conversion(t2);
        let request2 = app.poll_conversion(after_window(t2)).unwrap();

        assert!(app.apply_failure(request2.seq, "invalid-key".to_string()));
        assert!(app.result.is_none());
        assert_eq!(app.error.as_deref(), Some("invalid-key"));
        assert!(!app.is_loading);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut app = App::new();
        let start = Instant::now();

        // Première requête (seq 1)
        app.append_amount_char('1');
        app.poll_conversion(start);
        let first = app.poll_conversion(after_window(start)).unwrap();

        // Deuxième requête (seq 2) émise avant que la première ne réponde
        app.append_amount_char('2');
        let t2 = after_window(start) + Duration::from_secs(1);
        app.poll_conversion(t2);
        let second = app.poll_conversion(after_window(t2)).unwrap();
        assert!(second.seq > first.seq);

        // La réponse de la première requête arrive en retard : écartée
        let stale = Conversion {
            value: 999.0,
            rate: 9.99,
            last_update: None,
        };
        assert!(!app.apply_success(first.seq, stale));
        assert!(app.result.is_none());
        assert!(app.is_loading); // toujours en attente de la requête 2

        // La réponse de la requête courante est appliquée normalement
        let fresh = Conversion {
            value: 12.96,
            rate: 1.08,
            last_update: None,
        };
        assert!(app.apply_success(second.seq, fresh));
        assert!((app.result.as_ref().unwrap().value - 12.96).abs() < 1e-9);
        assert!(!app.is_loading);
    }

    #[test]
    fn test_failure_does_not_leave_loading_lingering() {
        let mut app = App::new();
        let start = Instant::now();

        app.append_amount_char('5');
        app.poll_conversion(start);
        let request = app.poll_conversion(after_window(start)).unwrap();
        assert!(app.is_loading);

        // Échec immédiat (ex: clé API manquante) : loading retombe
        app.apply_failure(
            request.seq,
            "Clé API manquante. Veuillez vérifier la configuration.".to_string(),
        );
        assert!(!app.is_loading);
        assert!(app.error.is_some());
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = App::new();
        assert!(!app.is_awaiting_quit_confirmation());

        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        assert!(app.is_running());

        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());

        app.request_quit();
        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_focus_cycle() {
        let mut app = App::new();
        assert_eq!(app.focus, Field::Amount);

        app.focus_next();
        assert_eq!(app.focus, Field::From);
        app.focus_next();
        assert_eq!(app.focus, Field::To);
        app.focus_next();
        assert_eq!(app.focus, Field::Amount);

        app.focus_previous();
        assert_eq!(app.focus, Field::To);
    }
}
