use std::io;
use std::time::{Duration as StdDuration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use hbdm::{Credentials, HbdmClient, RestConfig};
use hbdm_dashboard::app::{commands, AppRuntime};
use hbdm_dashboard::config::{self, ConfigStore};
use hbdm_dashboard::debug_hooks;

fn main() -> Result<()> {
    let log_path = debug_hooks::init_logging(&config::data_dir())?;

    let store = ConfigStore::new()?;
    let mut cfg = store.load();
    cfg.apply_env();

    let client = HbdmClient::new(RestConfig {
        endpoint: cfg.rest_endpoint.clone(),
        timeout: cfg.http_timeout(),
    })
    .context("build http client")?;

    tracing::info!(
        "starting: profile={} symbol={} endpoint={} config={:?} log={:?}",
        cfg.profile.as_str(),
        cfg.symbol,
        client.endpoint(),
        store.config_path(),
        log_path,
    );

    let gateway = if cfg.profile.orders_enabled() {
        let creds = Credentials::from_env().with_context(|| {
            format!("profile {} places orders and needs API keys", cfg.profile.as_str())
        })?;
        Some(client.clone().with_credentials(creds))
    } else {
        None
    };

    let runtime = AppRuntime::new(cfg, client, gateway)?;
    run_ui(runtime)
}

fn run_ui(mut runtime: AppRuntime<HbdmClient, HbdmClient>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = ui_loop(&mut terminal, &mut runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        tracing::error!("ui loop ended with error: {err:?}");
    }
    res
}

fn ui_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    runtime: &mut AppRuntime<HbdmClient, HbdmClient>,
) -> Result<()> {
    loop {
        if event::poll(StdDuration::from_millis(10))? {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(ev) = commands::key_event(key) {
                        runtime.handle_event(ev);
                    }
                }
                Event::Resize(..) => runtime.mark_dirty(),
                _ => {}
            }
        }
        if runtime.should_quit() {
            break;
        }

        runtime.tick_if_needed(Instant::now());
        runtime.render_if_dirty(terminal)?;
    }

    tracing::info!("quit");
    Ok(())
}
