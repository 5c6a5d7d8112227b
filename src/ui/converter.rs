// ============================================================================
// Converter - Rendu de l'interface principale
// ============================================================================
// Dessine le formulaire de conversion en utilisant les widgets de ratatui
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Widgets : composants UI (Block, Paragraph, etc.)
// 3. Layout : découpage de l'espace en zones
// 4. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Field};

// ============================================================================
// Fonction principale de rendu
// ============================================================================

/// Dessine l'interface complète
///
/// Un seul écran : header, formulaire (montant + sélecteurs), panneau de
/// statut et footer. Le panneau de statut affiche exactement UN des états :
/// chargement, erreur, résultat, ou message d'attente.
///
/// # Arguments
/// * `frame` - Surface de dessin ratatui
/// * `app` - État de l'application
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, chunks[0]);
    render_amount_input(frame, app, chunks[1]);
    render_currency_selectors(frame, app, chunks[2]);
    render_status(frame, app, chunks[3]);
    render_footer(frame, app, chunks[4]);
}

// ============================================================================
// Layout : Découpage de l'écran
// ============================================================================
// CONCEPT RATATUI : Layout
// - split() découpe un Rect en plusieurs zones
// - Length(n) : exactement n lignes ; Min(n) : au moins n
// ============================================================================

/// Crée le layout principal (header, montant, sélecteurs, statut, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header : 3 lignes
            Constraint::Length(3), // Saisie du montant
            Constraint::Length(3), // Sélecteurs De / Vers
            Constraint::Min(5),    // Panneau de statut : tout le reste
            Constraint::Length(3), // Footer : 3 lignes
        ])
        .split(area)
        .to_vec()
}

/// Style de bordure d'un champ selon son focus
fn field_border_style(app: &App, field: Field) -> Style {
    if app.focus == field {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Cyan)
    }
}

// ============================================================================
// Header : Titre de l'application
// ============================================================================

/// Dessine le header avec le titre
fn render_header(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" LazyFX ")
        .title_alignment(Alignment::Center);

    let text = vec![Line::from(Span::styled(
        "Convertisseur de devises",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Formulaire : montant et sélecteurs de devises
// ============================================================================

/// Dessine le champ de saisie du montant
///
/// CONCEPT : Input cursor
/// - Un bloc "█" clignotant matérialise le curseur quand le champ a le focus
fn render_amount_input(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(field_border_style(app, Field::Amount))
        .title(" Montant ");

    let mut spans = vec![Span::styled(
        app.amount.as_str(),
        Style::default().fg(Color::White),
    )];

    if app.focus == Field::Amount {
        spans.push(Span::styled(
            "█",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::SLOW_BLINK),
        ));
    } else if app.amount.is_empty() {
        spans.push(Span::styled(
            "Entrez un montant",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let paragraph = Paragraph::new(vec![Line::from(spans)]).block(block);

    frame.render_widget(paragraph, area);
}

/// Dessine les deux sélecteurs de devises côte à côte
fn render_currency_selectors(frame: &mut Frame, app: &App, area: Rect) {
    // Découpe horizontale 50/50 pour De / Vers
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_selector(frame, app, halves[0], Field::From, " De ", app.from_currency().label());
    render_selector(frame, app, halves[1], Field::To, " Vers ", app.to_currency().label());
}

/// Dessine un sélecteur de devise
///
/// Les flèches ◄ ► rappellent que ←/→ font défiler les devises
fn render_selector(frame: &mut Frame, app: &App, area: Rect, field: Field, title: &str, label: String) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(field_border_style(app, field))
        .title(title.to_string());

    let arrow_style = if app.focus == field {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let line = Line::from(vec![
        Span::styled("◄ ", arrow_style),
        Span::styled(label, Style::default().fg(Color::White)),
        Span::styled(" ►", arrow_style),
    ]);

    let paragraph = Paragraph::new(vec![line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Panneau de statut : chargement / résultat / erreur
// ============================================================================

/// Formate un montant converti pour l'affichage
///
/// Format : "108.00 USD"
pub fn format_result(value: f64, code: &str) -> String {
    format!("{:.2} {}", value, code)
}

/// Dessine le panneau de statut
///
/// États mutuellement exclusifs, dans l'ordre de priorité :
/// 1. Chargement en cours
/// 2. Erreur de la dernière tentative
/// 3. Dernier résultat
/// 4. Message d'attente
fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Conversion ");

    let text: Vec<Line> = if app.is_loading {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "Conversion en cours...",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
        ]
    } else if let Some(error) = &app.error {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("⚠ {}", error),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
        ]
    } else if let Some(conversion) = &app.result {
        let mut lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    format!("{} {} = ", app.amount, app.from_currency().code),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format_result(conversion.value, app.to_currency().code),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                format!(
                    "1 {} = {:.4} {}",
                    app.from_currency().code,
                    conversion.rate,
                    app.to_currency().code
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        if let Some(last_update) = conversion.last_update {
            lines.push(Line::from(Span::styled(
                format!("Taux du {}", last_update.format("%d/%m/%Y %H:%M UTC")),
                Style::default().fg(Color::DarkGray),
            )));
        }

        lines
    } else {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "Entrez un montant et choisissez les devises à convertir.",
                Style::default().fg(Color::Gray),
            )),
        ]
    };

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer : Instructions
// ============================================================================

/// Dessine le footer avec les raccourcis clavier
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        // Message de confirmation de quit
        Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled("[q]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Quitter  "),
            Span::styled("[Tab/↑↓]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Champ  "),
            Span::styled("[←→]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Devise  "),
            Span::styled("[s]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" ⇄ Inverser les devises"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_result() {
        // 100 * 1.08 laisse un résidu flottant, l'affichage doit rester propre
        assert_eq!(format_result(100.0 * 1.08, "USD"), "108.00 USD");
        assert_eq!(format_result(0.0, "EUR"), "0.00 EUR");
        assert_eq!(format_result(1234.5678, "JPY"), "1234.57 JPY");
    }
}
