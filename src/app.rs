//! Application state management for the Indexa+ converter
//!
//! This module contains the converter state machine: loading quotations on
//! start, switching between unit tabs, capturing the amount, and computing
//! the peso result.

use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{info, warn};
use std::collections::HashMap;
use std::time::Duration;

use crate::cli::StartupConfig;
use crate::convert::convert;
use crate::data::{Quotation, RateClient, RateError, UnitKind};

/// How long the "calculating" indicator stays up before the result is shown
pub const CALCULATION_DELAY: Duration = Duration::from_millis(300);

/// Number of days of history shown by the history panel
pub const HISTORY_DAYS: i64 = 30;

/// Longest amount the input field accepts
const MAX_INPUT_LEN: usize = 18;

/// Application state enum representing the load status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Initial state while quotations are being fetched
    Loading,
    /// Both quotations are available
    Ready,
    /// At least one quotation could not be loaded, even from the cache
    Error(String),
}

/// Main application struct managing state and data
pub struct App {
    /// Current load state
    pub state: AppState,
    /// Unit selected in the tab bar
    pub active_unit: UnitKind,
    /// Raw amount typed by the user
    pub input: String,
    /// Last computed peso amount
    pub result: f64,
    /// Set while a calculation is pending
    pub calculating: bool,
    /// Dismissable alert message
    pub alert: Option<String>,
    /// Quotation history for the active unit, once requested
    pub history: Option<Vec<Quotation>>,
    /// Flag indicating history should be fetched by the event loop
    pub history_requested: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Loaded quotations keyed by unit
    quotations: HashMap<UnitKind, Quotation>,
    /// Date to request quotations for
    date: Option<NaiveDate>,
    /// Quotation service client
    client: RateClient,
}

impl App {
    /// Creates a new App in the loading state
    pub fn new(client: RateClient, config: &StartupConfig) -> Self {
        Self {
            state: AppState::Loading,
            active_unit: config.unit,
            input: String::new(),
            result: 0.0,
            calculating: false,
            alert: None,
            history: None,
            history_requested: false,
            show_help: false,
            should_quit: false,
            quotations: HashMap::new(),
            date: config.date,
            client,
        }
    }

    /// Stores a quotation directly (for rendering tests)
    #[cfg(test)]
    pub(crate) fn insert_quotation(&mut self, kind: UnitKind, quotation: Quotation) {
        self.quotations.insert(kind, quotation);
    }

    /// Returns the loaded quotation for `kind`, if any
    pub fn quotation(&self, kind: UnitKind) -> Option<&Quotation> {
        self.quotations.get(&kind)
    }

    /// Returns the quotation of the selected tab
    pub fn active_quotation(&self) -> Option<&Quotation> {
        self.quotation(self.active_unit)
    }

    /// Usable rate of the selected tab
    pub fn active_rate(&self) -> Option<f64> {
        self.active_quotation().and_then(Quotation::rate)
    }

    /// Whether the calculate action is enabled
    pub fn can_calculate(&self) -> bool {
        self.state != AppState::Loading && self.active_rate().is_some()
    }

    /// Loads both quotations concurrently
    ///
    /// Transitions to `Ready` when both succeed and to `Error` when either fails.
    /// Quotations that did load are kept in both cases.
    pub async fn load_quotations(&mut self) {
        self.state = AppState::Loading;

        let (indexed, adjustable) = futures::future::join(
            self.client.fetch_quotation(UnitKind::Indexed, self.date),
            self.client.fetch_quotation(UnitKind::Adjustable, self.date),
        )
        .await;

        self.apply_quotations(indexed, adjustable);
    }

    fn apply_quotations(
        &mut self,
        indexed: Result<Quotation, RateError>,
        adjustable: Result<Quotation, RateError>,
    ) {
        let mut failures = Vec::new();

        for (kind, result) in [(UnitKind::Indexed, indexed), (UnitKind::Adjustable, adjustable)] {
            match result {
                Ok(quotation) => {
                    self.quotations.insert(kind, quotation);
                }
                Err(e) => failures.push(format!("{}: {}", kind, e)),
            }
        }

        if failures.is_empty() {
            info!("quotations loaded");
            self.state = AppState::Ready;
        } else {
            let message = format!("Could not load quotations ({})", failures.join("; "));
            warn!("{}", message);
            self.alert = Some(message.clone());
            self.state = AppState::Error(message);
        }
    }

    /// Selects a unit tab, clearing the input and result
    pub fn select_unit(&mut self, kind: UnitKind) {
        if kind == self.active_unit {
            return;
        }
        self.active_unit = kind;
        self.input.clear();
        self.result = 0.0;
        self.calculating = false;
        self.history = None;
        self.history_requested = false;
    }

    /// Switches to the other unit tab
    pub fn toggle_unit(&mut self) {
        self.select_unit(self.active_unit.toggle());
    }

    /// Appends a character to the amount input
    ///
    /// Accepts digits and a single decimal point (`,` is taken as `.`).
    pub fn push_input(&mut self, c: char) {
        let c = if c == ',' { '.' } else { c };
        let accepted = c.is_ascii_digit() || (c == '.' && !self.input.contains('.'));
        if accepted && self.input.len() < MAX_INPUT_LEN {
            self.input.push(c);
        }
    }

    /// Removes the last character of the amount input
    pub fn pop_input(&mut self) {
        self.input.pop();
    }

    /// Starts a calculation if the active unit has a rate
    ///
    /// # Returns
    /// * `true` if a calculation is now pending
    /// * `false` if the action is disabled
    pub fn request_calculation(&mut self) -> bool {
        if !self.can_calculate() {
            return false;
        }
        self.calculating = true;
        true
    }

    /// Completes a pending calculation
    pub fn finish_calculation(&mut self) {
        if !self.calculating {
            return;
        }
        self.result = convert(&self.input, self.active_rate());
        self.calculating = false;
    }

    /// Fetches the last `HISTORY_DAYS` of quotations for the active unit
    ///
    /// Failures are shown in the alert and do not change the load state.
    pub async fn load_history(&mut self) {
        self.history_requested = false;

        let end = self.date.unwrap_or_else(|| Local::now().date_naive());
        let start = end - ChronoDuration::days(HISTORY_DAYS);

        match self
            .client
            .fetch_history(self.active_unit, Some(start), Some(end))
            .await
        {
            Ok(series) => {
                info!("loaded {} {} history points", series.len(), self.active_unit);
                self.history = Some(series);
            }
            Err(e) => {
                self.alert = Some(format!("Could not load history: {}", e));
            }
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `Tab`/`Left`/`Right`: Switch unit
    /// - `0`-`9`, `.`, `,`: Type amount
    /// - `Backspace`: Delete last character
    /// - `Enter`: Calculate
    /// - `h`: Show history for the active unit
    /// - `?`: Toggle help
    /// - `Esc`: Dismiss alert, or quit when there is none
    /// - `q` / `Ctrl+C`: Quit
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        if key_event.modifiers.contains(KeyModifiers::CONTROL)
            && key_event.code == KeyCode::Char('c')
        {
            self.should_quit = true;
            return;
        }

        // Help overlay intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        if self.state == AppState::Loading || self.calculating {
            if key_event.code == KeyCode::Char('q') {
                self.should_quit = true;
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Esc => {
                if self.alert.take().is_none() {
                    self.should_quit = true;
                }
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                self.toggle_unit();
            }
            KeyCode::Enter => {
                self.request_calculation();
            }
            KeyCode::Backspace => {
                self.pop_input();
            }
            KeyCode::Char('h') => {
                self.history_requested = true;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            KeyCode::Char(c) => {
                self.push_input(c);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryStore, RateCache};
    use crate::data::client::testing::FakeTransport;
    use crate::data::HttpResponse;
    use std::sync::Arc;

    const BASE: &str = "http://rates.test/api";

    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn quotation_json(kind: &str, value: f64) -> String {
        format!(
            r#"{{"fecha":"2024-11-20","metadata":{{"fecha_consulta":"2024-11-20T10:00:00","fuente":"BCU"}},"moneda":"UYU","tipo":"{}","valor":{}}}"#,
            kind, value
        )
    }

    fn create_test_app() -> (App, Arc<FakeTransport>) {
        let transport = Arc::new(FakeTransport::new());
        let client = RateClient::with_transport(
            transport.clone(),
            RateCache::new(Arc::new(MemoryStore::new())),
        )
        .with_base_url(BASE);
        let app = App::new(client, &StartupConfig::default());
        (app, transport)
    }

    fn serve_quotation(transport: &FakeTransport, code: &str, value: f64) {
        transport.respond(
            &format!("{}/cotizacion/{}", BASE, code),
            HttpResponse::json(200, quotation_json(&code.to_uppercase(), value)),
        );
    }

    async fn create_loaded_app() -> (App, Arc<FakeTransport>) {
        let (mut app, transport) = create_test_app();
        serve_quotation(&transport, "ui", 6.2323);
        serve_quotation(&transport, "ur", 1747.25);
        app.load_quotations().await;
        (app, transport)
    }

    fn type_amount(app: &mut App, amount: &str) {
        for c in amount.chars() {
            app.handle_key(key_event(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_new_app_starts_loading() {
        let (app, _) = create_test_app();
        assert_eq!(app.state, AppState::Loading);
        assert_eq!(app.active_unit, UnitKind::Indexed);
        assert!(!app.can_calculate());
    }

    #[test]
    fn test_new_app_uses_startup_unit() {
        let config = StartupConfig {
            unit: UnitKind::Adjustable,
            ..Default::default()
        };
        let app = App::new(RateClient::new(RateCache::disabled()), &config);
        assert_eq!(app.active_unit, UnitKind::Adjustable);
    }

    #[tokio::test]
    async fn test_load_quotations_success_enters_ready() {
        let (app, transport) = create_loaded_app().await;

        assert_eq!(app.state, AppState::Ready);
        assert!(app.alert.is_none());
        assert_eq!(app.quotation(UnitKind::Indexed).and_then(|q| q.rate()), Some(6.2323));
        assert_eq!(app.quotation(UnitKind::Adjustable).and_then(|q| q.rate()), Some(1747.25));
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_load_quotations_both_fail_enters_error() {
        let (mut app, _) = create_test_app();

        app.load_quotations().await;

        assert!(matches!(app.state, AppState::Error(_)));
        assert!(app.alert.is_some());
        assert!(!app.can_calculate());
        assert!(!app.request_calculation());
        assert!(!app.calculating);
    }

    #[tokio::test]
    async fn test_partial_failure_is_error_but_keeps_loaded_unit() {
        let (mut app, transport) = create_test_app();
        serve_quotation(&transport, "ui", 6.2323);

        app.load_quotations().await;

        match &app.state {
            AppState::Error(message) => assert!(message.contains("UR")),
            other => panic!("expected error state, got {:?}", other),
        }
        assert!(app.can_calculate(), "UI tab should stay usable");

        app.toggle_unit();
        assert!(!app.can_calculate(), "UR tab has no rate");
    }

    #[tokio::test]
    async fn test_load_uses_cache_when_service_fails() {
        let (mut app, transport) = create_loaded_app().await;
        transport.clear();

        app.load_quotations().await;

        assert_eq!(app.state, AppState::Ready);
        assert_eq!(app.active_rate(), Some(6.2323));
    }

    #[tokio::test]
    async fn test_quotation_without_value_disables_calculation() {
        let (mut app, transport) = create_test_app();
        serve_quotation(&transport, "ur", 1747.25);
        transport.respond(
            &format!("{}/cotizacion/ui", BASE),
            HttpResponse::json(200, r#"{"fecha":"2024-11-20","moneda":"UYU","tipo":"UI"}"#),
        );

        app.load_quotations().await;

        assert_eq!(app.state, AppState::Ready);
        assert!(app.active_quotation().is_some());
        assert!(!app.can_calculate());
    }

    #[tokio::test]
    async fn test_calculate_adjustable_units() {
        let (mut app, _) = create_loaded_app().await;
        app.select_unit(UnitKind::Adjustable);
        type_amount(&mut app, "100");

        app.handle_key(key_event(KeyCode::Enter));
        assert!(app.calculating);

        app.finish_calculation();
        assert!(!app.calculating);
        assert_eq!(app.result, 174725.0);
    }

    #[tokio::test]
    async fn test_calculate_with_empty_input_is_zero() {
        let (mut app, _) = create_loaded_app().await;

        assert!(app.request_calculation());
        app.finish_calculation();

        assert_eq!(app.result, 0.0);
    }

    #[tokio::test]
    async fn test_keys_ignored_while_calculating() {
        let (mut app, _) = create_loaded_app().await;
        type_amount(&mut app, "2");
        app.request_calculation();

        app.handle_key(key_event(KeyCode::Char('5')));
        app.handle_key(key_event(KeyCode::Tab));

        assert_eq!(app.input, "2");
        assert_eq!(app.active_unit, UnitKind::Indexed);
    }

    #[test]
    fn test_finish_without_request_is_noop() {
        let (mut app, _) = create_test_app();
        app.result = 42.0;
        app.finish_calculation();
        assert_eq!(app.result, 42.0);
    }

    #[tokio::test]
    async fn test_tab_switch_clears_input_and_result_without_fetching() {
        let (mut app, transport) = create_loaded_app().await;
        type_amount(&mut app, "10");
        app.request_calculation();
        app.finish_calculation();
        assert!(app.result > 0.0);

        app.handle_key(key_event(KeyCode::Tab));

        assert_eq!(app.active_unit, UnitKind::Adjustable);
        assert!(app.input.is_empty());
        assert_eq!(app.result, 0.0);
        assert_eq!(transport.requests().len(), 2, "Tab switch must not re-fetch");
    }

    #[test]
    fn test_selecting_active_unit_keeps_input() {
        let (mut app, _) = create_test_app();
        app.state = AppState::Ready;
        app.input = "5".to_string();

        app.select_unit(UnitKind::Indexed);

        assert_eq!(app.input, "5");
    }

    #[test]
    fn test_input_accepts_digits_and_one_decimal_point() {
        let (mut app, _) = create_test_app();
        app.state = AppState::Ready;

        type_amount(&mut app, "12,5.7x");

        assert_eq!(app.input, "12.57");

        app.handle_key(key_event(KeyCode::Backspace));
        assert_eq!(app.input, "12.5");
    }

    #[test]
    fn test_input_length_is_bounded() {
        let (mut app, _) = create_test_app();
        app.state = AppState::Ready;

        type_amount(&mut app, &"9".repeat(40));

        assert_eq!(app.input.len(), MAX_INPUT_LEN);
    }

    #[test]
    fn test_esc_dismisses_alert_then_quits() {
        let (mut app, _) = create_test_app();
        app.state = AppState::Error("boom".to_string());
        app.alert = Some("boom".to_string());

        app.handle_key(key_event(KeyCode::Esc));
        assert!(app.alert.is_none());
        assert!(!app.should_quit);
        assert_eq!(app.state, AppState::Error("boom".to_string()));

        app.handle_key(key_event(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn test_q_quits_while_loading() {
        let (mut app, _) = create_test_app();
        app.handle_key(key_event(KeyCode::Char('1')));
        assert!(app.input.is_empty(), "Input is disabled while loading");

        app.handle_key(key_event(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let (mut app, _) = create_test_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_overlay_toggle() {
        let (mut app, _) = create_test_app();
        app.state = AppState::Ready;

        app.handle_key(key_event(KeyCode::Char('?')));
        assert!(app.show_help);

        app.handle_key(key_event(KeyCode::Char('5')));
        assert!(app.input.is_empty(), "Help intercepts keys");

        app.handle_key(key_event(KeyCode::Esc));
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn test_load_history_success() {
        let config = StartupConfig {
            date: NaiveDate::from_ymd_opt(2024, 11, 30),
            ..Default::default()
        };
        let transport = Arc::new(FakeTransport::new());
        let client = RateClient::with_transport(transport.clone(), RateCache::disabled())
            .with_base_url(BASE);
        let mut app = App::new(client, &config);
        app.state = AppState::Ready;
        transport.respond(
            &format!("{}/historico/ui?inicio=2024-10-31&fin=2024-11-30", BASE),
            HttpResponse::json(
                200,
                format!("[{},{}]", quotation_json("UI", 6.20), quotation_json("UI", 6.23)),
            ),
        );

        app.handle_key(key_event(KeyCode::Char('h')));
        assert!(app.history_requested);
        app.load_history().await;

        assert!(!app.history_requested);
        assert_eq!(app.history.as_ref().map(Vec::len), Some(2));
        assert!(app.alert.is_none());
    }

    #[tokio::test]
    async fn test_load_history_failure_sets_alert_only() {
        let (mut app, _) = create_loaded_app().await;

        app.load_history().await;

        assert!(app.history.is_none());
        assert!(app.alert.as_deref().unwrap_or("").contains("history"));
        assert_eq!(app.state, AppState::Ready);
    }

    #[tokio::test]
    async fn test_tab_switch_clears_history() {
        let (mut app, _) = create_loaded_app().await;
        app.history = Some(Vec::new());

        app.toggle_unit();

        assert!(app.history.is_none());
    }
}
