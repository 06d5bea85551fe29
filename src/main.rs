use chrono::{Duration, Local};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, warn};
use noted::app::App;
use noted::backend::memory::MemoryBackend;
use noted::backend::rest::{RestAuth, RestStore};
use noted::backend::{AuthBackend, DocumentStore, SessionHandle};
use noted::config::Config;
use noted::error::ServiceResult;
use noted::logging::init_logging;
use noted::models::NewTask;
use noted::preferences::PreferenceStore;
use noted::services::Workspace;
use noted::ui::run_app;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;

const DEMO_EMAIL: &str = "demo@noted.app";
const DEMO_PASSWORD: &str = "password";

async fn seed_demo(backend: &Arc<MemoryBackend>) -> Result<(), Box<dyn std::error::Error>> {
    let uid = backend.register(DEMO_EMAIL, DEMO_PASSWORD)?;
    let store: Arc<dyn DocumentStore> = backend.clone();
    seed_workspace(&Workspace::new(store, &uid)).await?;
    Ok(())
}

async fn seed_workspace(ws: &Workspace) -> ServiceResult<()> {
    let today = Local::now().date_naive();
    ws.users.ensure_details("Demo").await?;
    ws.tasks
        .create(NewTask {
            title: "Plan the week".to_string(),
            description: "<p>Review <b>goals</b> and block focus time.</p>".to_string(),
            date: Some(today),
            ..NewTask::default()
        })
        .await?;
    ws.tasks
        .create(NewTask {
            title: "Book dentist".to_string(),
            date: Some(today + Duration::days(2)),
            duration_minutes: Some(30),
            ..NewTask::default()
        })
        .await?;

    let groceries = ws.lists.create_list("Groceries").await?;
    for text in ["Oat milk", "Apples", "Coffee beans", "Bread"] {
        ws.lists.add_item(&groceries.id, text).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    if let Err(err) = init_logging(&config.log_level, &config.log_dir()) {
        eprintln!("Logging disabled: {err}");
    }

    let session = Arc::new(SessionHandle::default());
    let (auth, store): (Arc<dyn AuthBackend>, Arc<dyn DocumentStore>) = match &config.backend {
        Some(backend) => {
            info!("event=startup backend=rest project={}", backend.project_id);
            (
                Arc::new(RestAuth::new(backend, session.clone())),
                Arc::new(RestStore::new(backend, session)),
            )
        }
        None => {
            info!("event=startup backend=memory");
            let memory = Arc::new(MemoryBackend::new(session));
            if let Err(err) = seed_demo(&memory).await {
                warn!("event=demo_seed_failed err={}", err);
            }
            (memory.clone(), memory)
        }
    };

    let prefs = PreferenceStore::open(config.preferences_path());
    let mut app = App::new(auth, store, prefs);
    app.demo = config.is_demo();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    terminal.hide_cursor()?;

    let res = run_app(&mut terminal, app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }
    info!("event=shutdown");

    Ok(())
}
