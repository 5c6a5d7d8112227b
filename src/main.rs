// ============================================================================
// LazyFX - Convertisseur de devises dans le terminal
// ============================================================================
// Programme TUI : un formulaire (montant, devise source, devise cible),
// une conversion débouncée via l'API exchangerate-api.com, et un panneau
// de statut chargement / résultat / erreur
//
// ARCHITECTURE :
// 1. Event loop synchrone : render -> input -> update
// 2. Worker thread : exécute les appels API async sans bloquer l'UI
// 3. Debounce : seule la dernière saisie d'une rafale déclenche un appel
// 4. Numéros de séquence : les réponses périmées sont écartées
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use lazyfx::api::exchangerate;
use lazyfx::app::App;
use lazyfx::config::{Config, API_KEY_ENV};
use lazyfx::models::{Conversion, ConversionRequest};
use lazyfx::ui::{events::EventHandler, render};

// ============================================================================
// AppCommand : Commandes pour le worker thread
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des commandes au worker thread
// - Le worker thread exécute les tâches async (appels API)
// - Communication via mpsc channels (multi-producer, single-consumer)
// ============================================================================

/// Commandes envoyées au worker thread pour exécuter des tâches async
#[derive(Debug, Clone)]
enum AppCommand {
    /// Exécuter une demande de conversion
    /// La requête est un snapshot : l'état peut continuer à changer
    /// pendant l'appel réseau
    Convert { request: ConversionRequest },
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    /// Conversion réussie
    Converted { seq: u64, conversion: Conversion },

    /// Échec de la conversion (le message est affiché tel quel)
    ConvertFailed { seq: u64, message: String },
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place, avec rotation quotidienne
//
// Les logs sont écrits dans :
// - Linux/WSL : ~/.local/share/lazyfx/logs/lazyfx.log
// - macOS : ~/Library/Application Support/lazyfx/logs/lazyfx.log
// - Windows : C:\Users\<user>\AppData\Local\lazyfx\logs\lazyfx.log
// (repli sur ./logs si le répertoire data n'est pas disponible)
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// # Voir les logs en temps réel
/// tail -f ~/.local/share/lazyfx/logs/lazyfx.log
///
/// # Contrôler le niveau de log
/// RUST_LOG=debug cargo run
/// RUST_LOG=lazyfx=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Répertoire de logs cross-platform via dirs, repli sur ./logs
    let log_dir = dirs::data_local_dir()
        .map(|dir| dir.join("lazyfx").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("./logs"));

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    // Rotation quotidienne : lazyfx.log.2026-08-25, etc.
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "lazyfx.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender) // Écrit dans le fichier
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true) // Inclut le module (ex: lazyfx::api::exchangerate)
                .with_thread_ids(true) // Inclut l'ID du thread (utile pour le worker)
                .with_line_number(true),
        )
        .with(
            // Filtre les logs par niveau
            // Par défaut : debug pour lazyfx, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazyfx=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    // Initialize logging FIRST
    // - Si init échoue, on affiche l'erreur et continue quand même
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("LazyFX starting up");

    // Configuration explicite, construite une seule fois et injectée partout
    // CONCEPT : pas de lecture ambiante de l'environnement au moment de
    // l'appel — l'absence de clé est une erreur utilisateur lors de la
    // première conversion, jamais un échec au démarrage
    let config = Config::from_env();
    if !config.has_api_key() {
        warn!(env = API_KEY_ENV, "No API key configured, conversions will fail");
    }

    // Setup du terminal en mode TUI
    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    // Crée l'état de l'application
    // CONCEPT RUST : Arc<Mutex<>> pour partage entre la closure de rendu
    // et la gestion des événements
    let app = Arc::new(Mutex::new(App::new()));

    // Crée les channels pour communication avec le worker
    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    // Lance le worker thread en arrière-plan
    info!("Spawning background worker thread");
    spawn_background_worker(command_rx, result_tx, config);

    // Crée le gestionnaire d'événements
    let events = EventHandler::new();

    // Exécute l'event loop
    info!("Starting event loop");
    let result = run(&mut terminal, app, &events, command_tx, result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// CONCEPT RUST : Background async worker avec channels
// - Thread séparé qui traite les commandes async
// - Reçoit des AppCommand via un channel (command_rx)
// - Envoie des AppResult via un autre channel (result_tx)
// - Permet de faire des appels API sans bloquer l'UI
//
// Les requêtes HTTP en cours ne sont jamais annulées : une réponse
// arrivée trop tard est simplement écartée côté UI grâce au numéro
// de séquence porté par chaque requête
// ============================================================================

/// Worker thread qui exécute les conversions en arrière-plan
///
/// CONCEPT RUST : Thread + async runtime
/// - std::thread::spawn() : crée un thread OS
/// - tokio::runtime::Runtime : runtime async dans ce thread
/// - block_on() bloque le thread worker (pas l'UI)
///
/// # Arguments
/// * `command_rx` - Receiver pour recevoir les commandes
/// * `result_tx` - Sender pour envoyer les résultats
/// * `config` - Configuration injectée (clé API, URL de base)
fn spawn_background_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    config: Config,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = ?e, "Failed to create tokio runtime, worker unavailable");
                return;
            }
        };

        // Boucle de traitement des commandes
        loop {
            match command_rx.recv() {
                Ok(AppCommand::Convert { request }) => {
                    info!(seq = request.seq, from = %request.from, to = %request.to, "Worker received conversion request");

                    let seq = request.seq;
                    let result = runtime.block_on(exchangerate::convert(&config, &request));

                    match result {
                        Ok(conversion) => {
                            info!(seq = seq, value = conversion.value, "Conversion succeeded");
                            let _ = result_tx.send(AppResult::Converted { seq, conversion });
                        }
                        Err(e) => {
                            // Le message utilisateur est le contexte le plus
                            // externe de l'erreur anyhow
                            error!(seq = seq, error = %e, "Conversion failed");
                            let _ = result_tx.send(AppResult::ConvertFailed {
                                seq,
                                message: e.to_string(),
                            });
                        }
                    }
                }
                Err(_) => {
                    // Channel fermé, on quitte
                    info!("Worker thread exiting (channel closed)");
                    break;
                }
            }
        }
    });
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// CONCEPT : Event Loop Pattern
// - Loop infinie : while app.is_running()
// - À chaque itération :
//   0. Traiter les résultats du worker (avec garde anti-réponse périmée)
//   1. Dessiner l'interface (render)
//   2. Traiter les événements (input)
//   3. Faire avancer le debounce et émettre les requêtes dues (update)
// ============================================================================

/// Exécute la boucle principale de l'application
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    loop {
        // Vérifie si l'app est toujours en cours d'exécution
        // CONCEPT : Lock scope minimisé
        {
            let app_lock = app.lock().unwrap();
            if !app_lock.is_running() {
                break;
            }
        }

        // ========================================
        // 0. RÉSULTATS : Traite les résultats du worker
        // ========================================
        // CONCEPT : Non-blocking receive avec try_recv
        // - Ok(result) : applique le résultat (sauf s'il est périmé)
        // - Err(Empty) : pas de résultat, continue
        // - Err(Disconnected) : worker mort
        match result_rx.try_recv() {
            Ok(AppResult::Converted { seq, conversion }) => {
                let mut app_lock = app.lock().unwrap();
                if app_lock.apply_success(seq, conversion) {
                    info!(seq = seq, "Conversion result applied");
                } else {
                    // Une requête plus récente a été émise entre temps :
                    // la réponse est écartée, pas d'écrasement du résultat
                    debug!(seq = seq, "Stale conversion result discarded");
                }
            }
            Ok(AppResult::ConvertFailed { seq, message }) => {
                let mut app_lock = app.lock().unwrap();
                if app_lock.apply_failure(seq, message) {
                    info!(seq = seq, "Conversion error applied");
                } else {
                    debug!(seq = seq, "Stale conversion error discarded");
                }
            }
            Err(mpsc::TryRecvError::Empty) => {
                // Pas de résultat, c'est normal
            }
            Err(mpsc::TryRecvError::Disconnected) => {
                error!("Worker thread disconnected!");
                // Continue quand même, mais le worker est mort
            }
        }

        // ========================================
        // 1. RENDER : Dessine l'interface
        // ========================================
        {
            let app_clone = app.clone();
            terminal.draw(|frame| {
                let app_lock = app_clone.lock().unwrap();
                render(frame, &app_lock);
            })?;
        }

        // ========================================
        // 2. INPUT : Traite les événements
        // ========================================
        match events.next() {
            Ok(event) => {
                let mut app_lock = app.lock().unwrap();
                handle_event(&mut app_lock, event);
            }
            Err(_) => {
                // Erreur lors de la lecture d'événement
            }
        }

        // ========================================
        // 3. UPDATE : Fait avancer le debounce
        // ========================================
        // Si la fenêtre de quiescence (500ms) est écoulée depuis la
        // dernière saisie, une requête est émise vers le worker
        {
            let mut app_lock = app.lock().unwrap();
            if let Some(request) = app_lock.poll_conversion(Instant::now()) {
                info!(seq = request.seq, from = %request.from, to = %request.to, amount = %request.amount, "Issuing conversion request");
                let _ = command_tx.send(AppCommand::Convert { request });
            }
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching avec guards
/// - Guard clauses (if) pour filtrer les événements
/// - Les touches agissent selon le champ ayant le focus
fn handle_event(app: &mut App, event: lazyfx::ui::events::Event) {
    use lazyfx::app::Field;
    use lazyfx::ui::events::{
        get_char_from_event, is_amount_char_event, is_backspace_event, is_down_event,
        is_left_event, is_quit_event, is_right_event, is_swap_event, is_tab_event, is_up_event,
        Event,
    };

    match event {
        Event::Key(_) if is_quit_event(&event) => {
            // Touche 'q' : quit confirmation two-step
            // - Première pression : active confirm_quit
            // - Deuxième pression : quit réel
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        // Saisie du montant (chiffres et point) quand le champ a le focus
        Event::Key(_) if is_amount_char_event(&event) && app.focus == Field::Amount => {
            app.cancel_quit();
            if let Some(c) = get_char_from_event(&event) {
                app.append_amount_char(c);
            }
        }

        // Backspace : supprimer le dernier caractère du montant
        Event::Key(_) if is_backspace_event(&event) && app.focus == Field::Amount => {
            app.cancel_quit();
            app.backspace_amount();
        }

        // 's' : inverser les devises source et cible
        Event::Key(_) if is_swap_event(&event) => {
            app.cancel_quit();
            info!(
                from = %app.from_currency().code,
                to = %app.to_currency().code,
                "User swapped currencies"
            );
            app.swap_currencies();
        }

        // Tab / flèche bas : champ suivant
        Event::Key(_) if is_tab_event(&event) || is_down_event(&event) => {
            app.cancel_quit();
            app.focus_next();
        }

        // Flèche haut : champ précédent
        Event::Key(_) if is_up_event(&event) => {
            app.cancel_quit();
            app.focus_previous();
        }

        // Flèches gauche/droite : faire défiler la devise du sélecteur actif
        Event::Key(_) if is_left_event(&event) => {
            app.cancel_quit();
            app.previous_currency();
        }
        Event::Key(_) if is_right_event(&event) => {
            app.cancel_quit();
            app.next_currency();
        }

        Event::Key(_) => {
            // Toute autre touche : annule la confirmation de quit si active
            app.cancel_quit();
        }

        Event::Tick => {
            // Tick régulier : le debounce avance dans l'étape UPDATE
        }
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// CONCEPT RUST : Terminal raw mode
// - Raw mode : on reçoit tous les caractères directement
// - Alternate screen : écran secondaire (ne pollue pas l'historique)
//
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
///
/// Appelé dans main() même en cas d'erreur, pour ne pas laisser le
/// terminal cassé
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;

    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    terminal.show_cursor()?;

    Ok(())
}
