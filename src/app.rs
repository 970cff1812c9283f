//! Main application state and screen routing

use std::fmt;
use std::sync::Arc;

use eframe::egui;
use tokio::runtime::Handle;

use crate::core::assist::{SimulatedGenerator, TextGenerator};
use crate::core::config::AppConfig;
use crate::core::export::{Exporter, SimulatedExporter};
use crate::core::preferences::{Preferences, Theme};
use crate::core::session::{DocumentRoute, EditorSession, Opened, Redirect};
use crate::core::storage::{FileStorage, KeyValueStore, MemoryStorage};
use crate::core::store::DocumentStore;
use crate::core::tasks::TaskRunner;
use crate::ui::{
    dashboard::{DashboardPanel, DashboardState},
    editor::{EditorPanel, EditorScreen},
    settings::{SettingsPanel, SettingsState},
    toast::Toasts,
    welcome::WelcomePanel,
};

/// Screen addressed by a path
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Welcome,
    Dashboard,
    Editor(DocumentRoute),
    Settings,
}

impl Route {
    /// Parse a path; anything unknown leads to the welcome screen
    pub fn parse(path: &str) -> Self {
        let path = path.trim().trim_end_matches('/');
        let path = path.strip_prefix('/').unwrap_or(path);
        let segments: Vec<&str> = path.split('/').collect();

        match segments.as_slice() {
            ["dashboard"] => Self::Dashboard,
            ["settings"] => Self::Settings,
            ["editor", id] if !id.is_empty() => Self::Editor(DocumentRoute::parse(id)),
            _ => Self::Welcome,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Welcome => write!(f, "/"),
            Route::Dashboard => write!(f, "/dashboard"),
            Route::Editor(doc) => write!(f, "/editor/{}", doc.segment()),
            Route::Settings => write!(f, "/settings"),
        }
    }
}

/// Open the configured data directory, falling back to memory.
/// Returns the document backend, the preference backend and a warning for
/// the user when persistence is unavailable.
fn open_backends(
    config: &AppConfig,
) -> (Box<dyn KeyValueStore>, Box<dyn KeyValueStore>, Option<&'static str>) {
    match FileStorage::open(config.data_dir()) {
        Ok(storage) => {
            tracing::info!("Storing documents in {}", storage.root().display());
            (Box::new(storage.clone()), Box::new(storage), None)
        }
        Err(e) => {
            tracing::warn!("Falling back to in-memory storage: {}", e);
            (
                Box::new(MemoryStorage::new()),
                Box::new(MemoryStorage::new()),
                Some("Depolama alanına erişilemedi; değişiklikler kalıcı olmayacak."),
            )
        }
    }
}

/// Main application state
pub struct DocflowApp {
    /// Application configuration
    pub config: AppConfig,
    /// Persisted document collection
    pub store: DocumentStore,
    /// Backend holding the preferences
    pub prefs_storage: Box<dyn KeyValueStore>,
    pub preferences: Preferences,
    /// Runs generation and export in the background
    pub runner: TaskRunner,
    pub generator: Arc<dyn TextGenerator>,
    pub exporter: Arc<dyn Exporter>,
    /// Screen currently shown
    pub route: Route,
    /// Navigation requested by a screen, applied after the frame
    pub pending_route: Option<Route>,
    pub dashboard: DashboardState,
    /// Open editor, present while on an editor route
    pub editor: Option<EditorScreen>,
    pub settings: SettingsState,
    pub toasts: Toasts,
}

impl DocflowApp {
    /// Create a new application instance
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        runtime: Handle,
        initial: Route,
    ) -> Self {
        let (documents, prefs_storage, warning) = open_backends(&config);
        let mut app = Self::from_backends(config, documents, prefs_storage, runtime);
        if let Some(warning) = warning {
            app.toasts.error(warning);
        }

        app.apply_theme(&cc.egui_ctx);
        app.navigate(initial);
        app
    }

    pub fn from_backends(
        config: AppConfig,
        documents: Box<dyn KeyValueStore>,
        prefs_storage: Box<dyn KeyValueStore>,
        runtime: Handle,
    ) -> Self {
        let store = DocumentStore::new(documents).with_policy(config.storage.on_corrupt);
        let preferences = Preferences::load(&*prefs_storage).unwrap_or_else(|e| {
            tracing::warn!("Failed to load preferences, using defaults: {}", e);
            Preferences::default()
        });
        let generator: Arc<dyn TextGenerator> =
            Arc::new(SimulatedGenerator::new(config.assist.generation_delay()));
        let exporter: Arc<dyn Exporter> =
            Arc::new(SimulatedExporter::new(config.assist.export_delay()));

        Self {
            config,
            store,
            prefs_storage,
            settings: SettingsState::new(preferences),
            preferences,
            runner: TaskRunner::new(runtime),
            generator,
            exporter,
            route: Route::Welcome,
            pending_route: None,
            dashboard: DashboardState::default(),
            editor: None,
            toasts: Toasts::default(),
        }
    }

    pub fn apply_theme(&self, ctx: &egui::Context) {
        let theme = match self.preferences.theme {
            Theme::Light => egui::ThemePreference::Light,
            Theme::Dark => egui::ThemePreference::Dark,
            Theme::System => egui::ThemePreference::System,
        };
        ctx.set_theme(theme);
    }

    /// Switch screens, preparing the state of the target screen
    pub fn navigate(&mut self, route: Route) {
        tracing::debug!("Navigating from {} to {}", self.route, route);

        if let Some(mut screen) = self.editor.take() {
            screen.close();
        }

        match &route {
            Route::Welcome => {}
            Route::Dashboard => self.reload_documents(),
            Route::Settings => self.settings = SettingsState::new(self.preferences),
            Route::Editor(doc_route) => match EditorSession::open(&mut self.store, doc_route) {
                Ok(Opened::Editing(session)) => self.editor = Some(EditorScreen::new(session)),
                Ok(Opened::Redirect(Redirect::ToList)) => return self.navigate(Route::Dashboard),
                Ok(Opened::Redirect(Redirect::ToDocument(id))) => {
                    return self.navigate(Route::Editor(DocumentRoute::Existing(id)))
                }
                Err(e) => {
                    tracing::error!("Failed to open document: {}", e);
                    self.toasts.error(e.user_message());
                    return self.navigate(Route::Dashboard);
                }
            },
        }

        self.route = route;
    }

    /// Ask for a screen change once the current frame is done
    pub fn request_route(&mut self, route: Route) {
        self.pending_route = Some(route);
    }

    fn reload_documents(&mut self) {
        match self.store.list_all() {
            Ok(docs) => self.dashboard.documents = docs,
            Err(e) => {
                tracing::error!("Failed to load documents: {}", e);
                self.toasts.error(e.user_message());
                self.dashboard.documents.clear();
            }
        }
    }
}

impl eframe::App for DocflowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match self.route.clone() {
            Route::Welcome => WelcomePanel::show(ctx, self),
            Route::Dashboard => DashboardPanel::show(ctx, self),
            Route::Editor(_) => EditorPanel::show(ctx, self),
            Route::Settings => SettingsPanel::show(ctx, self),
        }

        self.toasts.show(ctx);

        if let Some(route) = self.pending_route.take() {
            self.navigate(route);
            ctx.request_repaint();
        }
    }
}
