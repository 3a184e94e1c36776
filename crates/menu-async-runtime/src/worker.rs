use crate::{DocumentStore, EditorCommand, EditorUpdate, Result, RuntimeError};
use menu_pagination::{Document, EditingSession, Measure, SessionEvents, SessionOptions, Template};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Load `id` from `store`, or start an empty document when it does not exist
pub async fn open_session<S: DocumentStore>(
    store: &S,
    id: &str,
    template: Template,
    options: SessionOptions,
) -> Result<EditingSession> {
    let document = match store.load(id).await {
        Ok(document) => document,
        Err(RuntimeError::NotFound(_)) => {
            log::info!("Starting new document '{id}'");
            Document::for_template(&template)?
        }
        Err(e) => return Err(e),
    };
    Ok(EditingSession::new(document, template, options)?)
}

/// Spawn [`worker_task`] and return its channels
pub fn spawn_editor<S, M>(
    id: String,
    session: EditingSession,
    store: S,
    measurer: M,
) -> (
    mpsc::UnboundedSender<EditorCommand>,
    mpsc::UnboundedReceiver<EditorUpdate>,
    JoinHandle<()>,
)
where
    S: DocumentStore + 'static,
    M: Measure + Send + Sync + 'static,
{
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(worker_task(id, session, store, measurer, command_rx, update_tx));
    (command_tx, update_rx, handle)
}

async fn sleep_until(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

/// Async worker task that owns an editing session
///
/// Commands are applied in arrival order. Between commands the task sleeps
/// until the session's next measurement deadline. Dirty documents are saved
/// after each full overflow pass and on shutdown; a failed save is retried
/// on the next pass.
pub async fn worker_task<S, M>(
    id: String,
    mut session: EditingSession,
    store: S,
    measurer: M,
    mut command_rx: mpsc::UnboundedReceiver<EditorCommand>,
    update_tx: mpsc::UnboundedSender<EditorUpdate>,
) where
    S: DocumentStore,
    M: Measure + Send + Sync,
{
    session.start_timers(Instant::now().into_std());

    loop {
        tokio::select! {
            cmd = command_rx.recv() => match cmd {
                Some(EditorCommand::Shutdown) | None => break,
                Some(EditorCommand::Save) => save(&id, &mut session, &store, &update_tx).await,
                Some(cmd) => process_command(cmd, &mut session, &update_tx),
            },
            _ = sleep_until(session.next_deadline()) => {}
        }

        let events = session.poll(Instant::now().into_std(), &measurer);
        if events.full_passes > 0 && session.is_dirty() {
            save(&id, &mut session, &store, &update_tx).await;
        }
        publish_events(events, &session, &update_tx);
    }

    session.stop_timers();
    if session.is_dirty() {
        save(&id, &mut session, &store, &update_tx).await;
    }
    let _ = update_tx.send(EditorUpdate::Closed);
}

fn publish_events(
    events: SessionEvents,
    session: &EditingSession,
    update_tx: &mpsc::UnboundedSender<EditorUpdate>,
) {
    if events.overflow_changed {
        let _ = update_tx.send(EditorUpdate::OverflowChanged {
            overflow: session.overflow().clone(),
        });
    }
    if let Some(prompt) = events.prompt {
        log::info!(
            "'{}' overflows page {} by {}",
            prompt.category_name,
            prompt.page_number,
            prompt.overflow_amount
        );
        let _ = update_tx.send(EditorUpdate::ResolutionRequired { prompt });
    }
}

async fn save<S: DocumentStore>(
    id: &str,
    session: &mut EditingSession,
    store: &S,
    update_tx: &mpsc::UnboundedSender<EditorUpdate>,
) {
    let revision = session.revision();
    match store.save(id, session.document()).await {
        Ok(()) => {
            session.mark_saved(revision);
            log::info!("Saved '{id}' at revision {revision}");
            let _ = update_tx.send(EditorUpdate::Saved { revision });
        }
        Err(e) => {
            log::warn!("Failed to save '{id}', will retry: {e}");
            let _ = update_tx.send(EditorUpdate::Error {
                message: format!("Failed to save: {e}"),
            });
        }
    }
}

fn process_command(
    cmd: EditorCommand,
    session: &mut EditingSession,
    update_tx: &mpsc::UnboundedSender<EditorUpdate>,
) {
    let revision = session.revision();
    let active_page = session.active_page();

    if let Err(e) = apply_command(cmd, session, update_tx) {
        log::warn!("Command failed: {e}");
        let _ = update_tx.send(EditorUpdate::Error {
            message: e.to_string(),
        });
    }

    if session.revision() != revision || session.active_page() != active_page {
        let _ = update_tx.send(EditorUpdate::DocumentChanged {
            revision: session.revision(),
            document: session.document().clone(),
            active_page: session.active_page(),
        });
    }
}

fn apply_command(
    cmd: EditorCommand,
    session: &mut EditingSession,
    update_tx: &mpsc::UnboundedSender<EditorUpdate>,
) -> menu_pagination::Result<()> {
    match cmd {
        EditorCommand::CreateCategory {
            name,
            on_active_page,
        } => {
            if on_active_page {
                session.create_category_on_active_page(name)?;
            } else {
                session.create_category(name)?;
            }
        }
        EditorCommand::RenameCategory { id, name } => session.rename_category(id, name)?,
        EditorCommand::DeleteCategory { id } => {
            session.delete_category(id)?;
        }
        EditorCommand::SetCategoryBreaks {
            id,
            break_before,
            break_mode,
        } => session.set_category_breaks(id, break_before, break_mode)?,
        EditorCommand::AddItem { category, item } => {
            session.add_item(category, item)?;
        }
        EditorCommand::UpdateItem { id, update } => session.update_item(id, update)?,
        EditorCommand::RemoveItem { id } => {
            session.remove_item(id)?;
        }
        EditorCommand::MoveItem {
            item,
            category,
            index,
        } => session.move_item(item, category, index)?,
        EditorCommand::CreatePage { variant } => {
            match variant {
                Some(variant) => session.create_page_with_variant(variant)?,
                None => session.create_page()?,
            };
        }
        EditorCommand::DeletePage { id } => session.delete_page(id)?,
        EditorCommand::SetPageVariant { page, variant } => session.set_page_variant(page, variant)?,
        EditorCommand::SetActivePage { index } => session.set_active_page(index)?,
        EditorCommand::AssignCategory { category, page } => {
            session.assign_category(category, page)?
        }
        EditorCommand::StartDrag { entity } => session.start_drag(entity),
        EditorCommand::DragOver { target } => session.drag_over(target),
        EditorCommand::DragMove {
            dragged,
            candidates,
        } => {
            session.drag_over_rect(&dragged, &candidates);
        }
        EditorCommand::Drop => session.drop_drag(),
        EditorCommand::CancelDrag => session.cancel_drag(),
        EditorCommand::Resolve { choice } => {
            let outcome = session.resolve(choice)?;
            let _ = update_tx.send(EditorUpdate::ResolutionApplied { outcome });
        }
        EditorCommand::DismissResolution => {
            session.dismiss_resolution();
        }
        EditorCommand::ReplaceTemplate { template } => {
            session.replace_template(template)?;
        }
        EditorCommand::AutoPaginate => {
            session.auto_paginate()?;
        }
        EditorCommand::CalculateStats => {
            let _ = update_tx.send(EditorUpdate::StatsCalculated {
                stats: session.statistics(),
            });
        }
        EditorCommand::Save | EditorCommand::Shutdown => {}
    }
    Ok(())
}
