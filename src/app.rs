use std::sync::Arc;

use crate::auth::{CredentialCheck, LoginForm};
use crate::backend::PromptBackend;
use crate::events::AppEvent;
use crate::presenter::{Phase, PresenterConfig, ResponsePresenter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Guidance,
}

#[derive(Debug)]
pub struct App {
    pub screen: Screen,
    pub should_quit: bool,
    pub login: LoginForm,
    pub presenter: ResponsePresenter,
    pub input_buffer: String,
    pub last_prompt: Option<String>,
    pub show_help: bool,
    pub exit_pending: bool,
    /// One-line notice shown in the status bar (video results, warnings).
    pub status_message: Option<String>,
    pub video_pending: bool,
}

impl App {
    pub fn new(presenter_config: PresenterConfig) -> Self {
        Self {
            screen: Screen::Login,
            should_quit: false,
            login: LoginForm::new(),
            presenter: ResponsePresenter::new(presenter_config),
            input_buffer: String::new(),
            last_prompt: None,
            show_help: false,
            exit_pending: false,
            status_message: None,
            video_pending: false,
        }
    }

    pub const fn quit(&mut self) {
        self.should_quit = true;
    }

    pub const fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Move to the guidance screen if the checker accepts the login form.
    pub fn sign_in(&mut self, checker: &dyn CredentialCheck) -> bool {
        if !self.login.submit(checker) {
            tracing::info!(username = %self.login.username, "sign-in refused");
            return false;
        }

        tracing::info!(username = %self.login.username, "signed in");
        self.screen = Screen::Guidance;
        true
    }

    /// Hand the typed prompt to the presenter. Empty prompts are passed
    /// through; the backend decides what to make of them.
    pub fn submit_prompt(&mut self, backend: Arc<dyn PromptBackend>) {
        let prompt = std::mem::take(&mut self.input_buffer);
        self.status_message = None;
        self.presenter.submit(prompt.clone(), backend);
        self.last_prompt = Some(prompt);
    }

    pub fn cancel_response(&mut self) {
        self.presenter.cancel();
    }

    /// The complete response, once it has been fully revealed.
    pub fn finished_response(&self) -> Option<&str> {
        let state = self.presenter.state();
        if state.phase == Phase::Done {
            state.full_text.as_deref().filter(|text| !text.is_empty())
        } else {
            None
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        self.video_pending = false;
        match event {
            AppEvent::VideoReady(url) => {
                tracing::info!(%url, "video ready");
                self.status_message = Some(format!("Video: {url}"));
            }
            AppEvent::VideoFailed(error) => {
                tracing::warn!(%error, "video request failed");
                self.status_message = Some(format!("Video failed: {error}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MockCredentialCheck, NonEmptyCredentials};
    use crate::backend::SimulatedBackend;
    use std::time::Duration;

    fn app() -> App {
        App::new(PresenterConfig::default())
    }

    #[test]
    fn test_app_new() {
        let app = app();
        assert_eq!(app.screen, Screen::Login);
        assert!(!app.should_quit);
        assert_eq!(app.presenter.phase(), Phase::Idle);
        assert!(app.last_prompt.is_none());
    }

    #[test]
    fn test_app_quit() {
        let mut app = app();
        app.quit();
        assert!(app.should_quit);
    }

    #[test]
    fn test_toggle_help() {
        let mut app = app();
        assert!(!app.show_help);
        app.toggle_help();
        assert!(app.show_help);
        app.toggle_help();
        assert!(!app.show_help);
    }

    #[test]
    fn test_sign_in_switches_screen() {
        let mut app = app();
        app.login.username = "parent".to_string();
        app.login.password = "secret".to_string();

        assert!(app.sign_in(&NonEmptyCredentials));
        assert_eq!(app.screen, Screen::Guidance);
    }

    #[test]
    fn test_refused_sign_in_stays_on_login() {
        let mut checker = MockCredentialCheck::new();
        checker.expect_check().times(1).return_const(false);

        let mut app = app();
        app.login.username = "parent".to_string();
        app.login.password = "secret".to_string();

        assert!(!app.sign_in(&checker));
        assert_eq!(app.screen, Screen::Login);
        assert!(app.login.rejected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_prompt_reveals_simulated_response() {
        let mut app = app();
        app.input_buffer = "How do I handle tantrums?".to_string();
        app.submit_prompt(Arc::new(SimulatedBackend::new(Duration::from_secs(1))));

        assert!(app.input_buffer.is_empty());
        assert_eq!(app.last_prompt.as_deref(), Some("How do I handle tantrums?"));
        assert_eq!(app.presenter.phase(), Phase::Waiting);
        assert!(app.finished_response().is_none());

        app.presenter.settle().await;

        let expected =
            SimulatedBackend::response_for("How do I handle tantrums?");
        assert_eq!(app.presenter.revealed_text(), expected);
        assert_eq!(app.finished_response(), Some(expected.as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_response_stops_waiting() {
        let mut app = app();
        app.submit_prompt(Arc::new(SimulatedBackend::default()));
        app.cancel_response();

        assert_eq!(app.presenter.phase(), Phase::Idle);
        assert!(!app.presenter.is_active());
    }

    #[test]
    fn test_handle_video_events() {
        let mut app = app();
        app.video_pending = true;
        app.handle_event(AppEvent::VideoReady("https://cdn.example/v.mp4".to_string()));
        assert!(!app.video_pending);
        assert_eq!(
            app.status_message.as_deref(),
            Some("Video: https://cdn.example/v.mp4")
        );

        app.handle_event(AppEvent::VideoFailed("401".to_string()));
        assert_eq!(app.status_message.as_deref(), Some("Video failed: 401"));
    }
}
