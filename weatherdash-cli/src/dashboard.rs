use std::fmt;

use anyhow::{Context, Result};
use inquire::{InquireError, Select, Text};
use tokio::sync::watch;
use weatherdash_core::{SessionController, SessionState, Units};

use crate::render;

/// Menu entries offered after each redraw.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Search,
    Recent(String),
    ChangeUnits,
    Refresh,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Search => f.write_str("Search a city"),
            Action::Recent(city) => write!(f, "Recent: {city}"),
            Action::ChangeUnits => f.write_str("Change units"),
            Action::Refresh => f.write_str("Refresh"),
            Action::Quit => f.write_str("Quit"),
        }
    }
}

/// User intents that go through the network.
#[derive(Debug)]
enum Intent {
    Search(String),
    Recent(String),
    Refresh,
}

#[derive(Debug, Clone, Copy)]
struct UnitsOption(Units);

impl fmt::Display for UnitsOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(render::units_label(self.0))
    }
}

/// Interactive loop. Returns when the user quits or cancels the menu.
pub async fn run(session: SessionController) -> Result<()> {
    let mut changes = session.subscribe();

    loop {
        // Anything unseen here was published by an auto-refresh while the menu was open.
        let background = changes.has_changed().unwrap_or(false);
        let state = changes.borrow_and_update().clone();
        println!("\n{}", render::screen(&state, session.refresh_interval()));
        println!("{}\n", render::menu_note(background));

        let options = menu(&state);
        let Some(action) = prompt(move || Select::new("What next?", options).prompt()).await?
        else {
            break;
        };

        match action {
            Action::Search => {
                let asked = prompt(|| {
                    Text::new("City:").with_placeholder("Enter city name").prompt()
                })
                .await?;
                let Some(city) = asked else {
                    continue;
                };
                let city = city.trim();
                if city.is_empty() {
                    continue;
                }
                drive(&session, &mut changes, Intent::Search(city.to_string())).await?;
            }
            Action::Recent(city) => drive(&session, &mut changes, Intent::Recent(city)).await?,
            Action::ChangeUnits => {
                let current = state.units;
                let picked = prompt(move || {
                    let options: Vec<UnitsOption> =
                        Units::all().iter().copied().map(UnitsOption).collect();
                    let cursor = Units::all().iter().position(|u| *u == current).unwrap_or(0);
                    Select::new("Units:", options).with_starting_cursor(cursor).prompt()
                })
                .await?;
                if let Some(UnitsOption(units)) = picked {
                    session.change_units(units);
                    mark_seen(&mut changes);
                }
            }
            Action::Refresh => drive(&session, &mut changes, Intent::Refresh).await?,
            Action::Quit => break,
        }
    }

    session.dispose();
    Ok(())
}

fn menu(state: &SessionState) -> Vec<Action> {
    let mut options = vec![Action::Search];
    options.extend(state.recent.iter().map(|city| Action::Recent(city.to_string())));
    options.push(Action::ChangeUnits);
    if state.last_city.is_some() {
        options.push(Action::Refresh);
    }
    options.push(Action::Quit);
    options
}

/// Run a blocking inquire prompt off the runtime threads. Esc / Ctrl-C yield `None`.
async fn prompt<T, F>(ask: F) -> Result<Option<T>>
where
    F: FnOnce() -> Result<T, InquireError> + Send + 'static,
    T: Send + 'static,
{
    let answer = tokio::task::spawn_blocking(ask).await.context("Prompt task failed")?;

    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("Failed to read input"),
    }
}

/// Hand the intent to the session and print the loading indicator as soon as
/// the session raises it.
async fn drive(
    session: &SessionController,
    changes: &mut watch::Receiver<SessionState>,
    intent: Intent,
) -> Result<()> {
    let worker = session.clone();
    let mut task = tokio::spawn(async move {
        match intent {
            Intent::Search(city) => worker.search(&city).await,
            Intent::Recent(city) => worker.select_recent(&city).await,
            Intent::Refresh => worker.manual_refresh().await,
        }
    });

    let mut shown = false;
    loop {
        tokio::select! {
            joined = &mut task => {
                joined.context("Session task failed")?;
                mark_seen(changes);
                return Ok(());
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    task.await.context("Session task failed")?;
                    mark_seen(changes);
                    return Ok(());
                }
                if !shown && changes.borrow_and_update().loading {
                    println!("{}", render::LOADING);
                    shown = true;
                }
            }
        }
    }
}

/// Changes caused by the user's own action are not background updates.
fn mark_seen(changes: &mut watch::Receiver<SessionState>) {
    let _ = changes.borrow_and_update();
}
