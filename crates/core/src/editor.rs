use tokio::sync::mpsc;

use crate::actions::{parse_action, Action, ActionHistory};
use crate::collision::{self, CollisionMessage, CollisionQueue};
use crate::continuity::{Continuity, ContinuityKind};
use crate::error::Result;
use crate::messages::{EditorCommand, EditorEvent, EditorRequest, Settings};
use crate::show::{DotTarget, DotType, SheetId, Show};

/// Owns the show being edited and everything that mutates it: commands with
/// undo, action strings, recomputation and collision scheduling.
pub struct Editor {
    show: Show,
    settings: Settings,
    history: ActionHistory,
    collisions: Option<CollisionQueue>,
    pending_collisions: usize,
    events: Vec<EditorEvent>,
}

impl Editor {
    /// An editor that runs collision passes inline.
    pub fn new(show: Show, settings: Settings) -> Self {
        Self {
            show,
            history: ActionHistory::new(settings.history_limit),
            settings,
            collisions: None,
            pending_collisions: 0,
            events: Vec::new(),
        }
    }

    /// Hand collision passes to a background worker. Must be called from
    /// inside a tokio runtime.
    pub fn with_collision_queue(mut self) -> Self {
        self.collisions = Some(CollisionQueue::new(self.settings.collision_queue_capacity));
        self
    }

    pub fn show(&self) -> &Show {
        &self.show
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn into_show(self) -> Show {
        self.show
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Take the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    /// Build a continuity from an editor tag with the configured cycle policy.
    pub fn create_continuity(
        &self,
        tag: &str,
        sheet: &SheetId,
        dot_type: DotType,
    ) -> Result<Continuity> {
        let mut continuity = Continuity::create(tag, &self.show, sheet, dot_type)?;
        match &mut continuity.kind {
            ContinuityKind::FollowLeader(ftl) => ftl.cycle = self.settings.follow_leader_cycle,
            ContinuityKind::CounterMarch(cm) => cm.cycle = self.settings.follow_leader_cycle,
            _ => {}
        }
        Ok(continuity)
    }

    /// Apply a command and record its inverse for undo.
    ///
    /// The inverse is recorded as soon as the show has changed, so a failed
    /// recompute still leaves the edit undoable.
    pub fn apply(&mut self, command: EditorCommand) -> Result<()> {
        let (inverse, affected) = self.execute(command)?;
        self.history.record(inverse);
        self.recompute(&affected)
    }

    /// Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(command) = self.history.pop_undo() else {
            return Ok(false);
        };
        let (inverse, affected) = match self.execute(command.clone()) {
            Ok(done) => done,
            Err(e) => {
                self.history.push_undo(command);
                return Err(e);
            }
        };
        self.history.push_redo(inverse);
        self.recompute(&affected)?;
        Ok(true)
    }

    /// Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(command) = self.history.pop_redo() else {
            return Ok(false);
        };
        let (inverse, affected) = match self.execute(command.clone()) {
            Ok(done) => done,
            Err(e) => {
                self.history.push_redo(command);
                return Err(e);
            }
        };
        self.history.push_undo(inverse);
        self.recompute(&affected)?;
        Ok(true)
    }

    /// Run a menu action string such as `"addSheet(16)"`.
    pub fn do_action(&mut self, input: &str) -> Result<()> {
        let action = parse_action(input)?;
        log::debug!("Running action {:?}", action);
        match action {
            Action::Undo => {
                self.undo()?;
            }
            Action::Redo => {
                self.redo()?;
            }
            Action::AddSheet { num_beats } => self.apply(EditorCommand::AddSheet {
                num_beats: num_beats.unwrap_or(self.settings.default_num_beats),
            })?,
            Action::RemoveSheet { index } => {
                let sheet = self.show.sheet_id_at(index)?;
                self.apply(EditorCommand::RemoveSheet { sheet })?
            }
            Action::CloneSheet { index } => {
                let sheet = self.show.sheet_id_at(index)?;
                self.apply(EditorCommand::CloneSheet { sheet })?
            }
            Action::Recompute { index } => {
                let sheet = self.show.sheet_id_at(index)?;
                self.recompute(&[sheet])?
            }
        }
        Ok(())
    }

    /// Recompute every sheet of the show.
    pub fn recompute_all(&mut self) -> Result<()> {
        let sheets: Vec<SheetId> = self.show.sheets().map(|sheet| sheet.id().clone()).collect();
        self.recompute(&sheets)
    }

    /// Rebuild movements on the given sheets and schedule collision passes.
    pub fn recompute(&mut self, sheets: &[SheetId]) -> Result<()> {
        for sheet in sheets {
            self.show.update_movements(sheet, DotTarget::All)?;
            self.events.push(EditorEvent::MovementsUpdated {
                sheet: sheet.clone(),
            });
            self.schedule_collisions(sheet)?;
        }
        Ok(())
    }

    fn schedule_collisions(&mut self, sheet: &SheetId) -> Result<()> {
        if !self.settings.collision_detection {
            return Ok(());
        }
        let Some(queue) = &self.collisions else {
            let message = match self.show.collision_job(sheet, 0).map(|job| collision::detect(&job)) {
                Ok(Ok(report)) => CollisionMessage::Report(report),
                Ok(Err(e)) => CollisionMessage::Failed {
                    sheet: sheet.clone(),
                    generation: 0,
                    error: e.to_string(),
                },
                Err(e) => return Err(e),
            };
            return self.store_collision_message(message);
        };

        let generation = queue.next_generation(sheet);
        let job = self.show.collision_job(sheet, generation)?;
        match queue.try_enqueue(job) {
            Ok(()) => {
                self.pending_collisions += 1;
                Ok(())
            }
            Err(job) => {
                log::warn!(
                    "Collision queue full, checking sheet {} inline",
                    job.sheet
                );
                let message = match collision::detect(&job) {
                    Ok(report) => CollisionMessage::Report(report),
                    Err(e) => CollisionMessage::Failed {
                        sheet: job.sheet,
                        generation: job.generation,
                        error: e.to_string(),
                    },
                };
                self.store_collision_message(message)
            }
        }
    }

    /// Take a message from the collision worker. Reports for anything but
    /// the newest pass of a sheet are dropped.
    pub fn handle_collision_message(&mut self, message: CollisionMessage) -> Result<()> {
        self.pending_collisions = self.pending_collisions.saturating_sub(1);
        self.store_collision_message(message)
    }

    fn is_current(&self, sheet: &SheetId, generation: u64) -> bool {
        let exists = self.show.sheet(sheet).is_ok();
        match &self.collisions {
            Some(queue) => exists && queue.is_current(sheet, generation),
            None => exists,
        }
    }

    fn store_collision_message(&mut self, message: CollisionMessage) -> Result<()> {
        match message {
            CollisionMessage::Report(report) => {
                if !self.is_current(&report.sheet, report.generation) {
                    log::debug!(
                        "Dropping stale collision report for sheet {} (generation {})",
                        report.sheet,
                        report.generation
                    );
                    return Ok(());
                }
                let sheet = report.sheet.clone();
                let generation = report.generation;
                self.show.store_collisions(report)?;
                self.events
                    .push(EditorEvent::CollisionsUpdated { sheet, generation });
            }
            CollisionMessage::Failed {
                sheet,
                generation,
                error,
            } => {
                if self.is_current(&sheet, generation) {
                    self.events.push(EditorEvent::CollisionsFailed {
                        sheet,
                        generation,
                        error,
                    });
                }
            }
            CollisionMessage::Skipped { .. } => {}
        }
        Ok(())
    }

    /// Apply whatever the collision worker has finished so far.
    pub fn poll_collisions(&mut self) -> Result<()> {
        while let Some(message) = self.collisions.as_mut().and_then(|q| q.try_recv()) {
            self.handle_collision_message(message)?;
        }
        Ok(())
    }

    /// Wait for every queued collision pass to report back.
    pub async fn wait_for_collisions(&mut self) -> Result<()> {
        while self.pending_collisions > 0 {
            let Some(queue) = self.collisions.as_mut() else {
                break;
            };
            let Some(message) = queue.recv().await else {
                break;
            };
            self.handle_collision_message(message)?;
        }
        Ok(())
    }

    fn prev_sheet_id(&self, sheet: &SheetId) -> Option<SheetId> {
        self.show.prev_sheet(sheet).map(|prev| prev.id().clone())
    }

    /// A sheet plus the one before it, whose movements head for it.
    fn with_prev(&self, sheet: &SheetId) -> Vec<SheetId> {
        let mut sheets: Vec<SheetId> = self.prev_sheet_id(sheet).into_iter().collect();
        sheets.push(sheet.clone());
        sheets
    }

    /// Change the show and return the inverse command with the sheets whose
    /// movements are now stale.
    fn execute(&mut self, command: EditorCommand) -> Result<(EditorCommand, Vec<SheetId>)> {
        log::debug!("Executing command: {:?}", command);
        let (inverse, affected) = match command {
            EditorCommand::AddSheet { num_beats } => {
                let sheet = self.show.add_sheet(num_beats);
                let affected = self.with_prev(&sheet);
                (EditorCommand::RemoveSheet { sheet }, affected)
            }
            EditorCommand::RemoveSheet { sheet } => {
                let (index, removed) = self.show.remove_sheet(&sheet)?;
                let affected = index
                    .checked_sub(1)
                    .and_then(|prev| self.show.sheet_at(prev))
                    .map(|prev| vec![prev.id().clone()])
                    .unwrap_or_default();
                (
                    EditorCommand::RestoreSheet {
                        sheet: Box::new(removed),
                        index,
                    },
                    affected,
                )
            }
            EditorCommand::RestoreSheet { sheet, index } => {
                let sheet = self.show.insert_sheet(*sheet, index);
                let affected = self.with_prev(&sheet);
                (EditorCommand::RemoveSheet { sheet }, affected)
            }
            EditorCommand::CloneSheet { sheet } => {
                let copy = self.show.clone_sheet(&sheet)?;
                let affected = self.with_prev(&copy);
                (EditorCommand::RemoveSheet { sheet: copy }, affected)
            }
            EditorCommand::AddContinuity { continuity } => {
                let sheet = continuity.sheet().clone();
                let dot_type = continuity.dot_type();
                self.show.add_continuity(continuity)?;
                let index = self.show.sheet(&sheet)?.continuities(dot_type).len() - 1;
                (
                    EditorCommand::RemoveContinuity {
                        sheet: sheet.clone(),
                        dot_type,
                        index,
                    },
                    vec![sheet],
                )
            }
            EditorCommand::InsertContinuity { index, continuity } => {
                let sheet = continuity.sheet().clone();
                let dot_type = continuity.dot_type();
                self.show.insert_continuity(index, continuity)?;
                (
                    EditorCommand::RemoveContinuity {
                        sheet: sheet.clone(),
                        dot_type,
                        index,
                    },
                    vec![sheet],
                )
            }
            EditorCommand::RemoveContinuity {
                sheet,
                dot_type,
                index,
            } => {
                let continuity = self.show.remove_continuity(&sheet, dot_type, index)?;
                (
                    EditorCommand::InsertContinuity { index, continuity },
                    vec![sheet],
                )
            }
            EditorCommand::MoveContinuity {
                sheet,
                dot_type,
                from,
                to,
            } => {
                self.show.move_continuity(&sheet, dot_type, from, to)?;
                (
                    EditorCommand::MoveContinuity {
                        sheet: sheet.clone(),
                        dot_type,
                        from: to,
                        to: from,
                    },
                    vec![sheet],
                )
            }
            EditorCommand::ReplaceContinuity { index, continuity } => {
                let sheet = continuity.sheet().clone();
                let previous = self.show.replace_continuity(index, continuity)?;
                (
                    EditorCommand::ReplaceContinuity {
                        index,
                        continuity: previous,
                    },
                    vec![sheet],
                )
            }
            EditorCommand::SetDotTypes { sheet, dots } => {
                let mut previous = Vec::with_capacity(dots.len());
                for (dot, dot_type) in dots {
                    previous.extend(self.show.change_dot_types(&sheet, &[dot], dot_type)?);
                }
                let affected = vec![sheet.clone()];
                (
                    EditorCommand::SetDotTypes {
                        sheet,
                        dots: previous,
                    },
                    affected,
                )
            }
            EditorCommand::SetPosition {
                sheet,
                dot,
                position,
            } => {
                let previous = self.show.set_position(&sheet, dot, position)?;
                let affected = self.with_prev(&sheet);
                (
                    EditorCommand::SetPosition {
                        sheet,
                        dot,
                        position: previous,
                    },
                    affected,
                )
            }
            EditorCommand::SwapDots { sheet, a, b } => {
                self.show.swap_dots(&sheet, a, b)?;
                let affected = self.with_prev(&sheet);
                (EditorCommand::SwapDots { sheet, a, b }, affected)
            }
            EditorCommand::SetSheetDefaults { sheet, defaults } => {
                let previous =
                    std::mem::replace(&mut self.show.sheet_mut(&sheet)?.defaults, defaults);
                (
                    EditorCommand::SetSheetDefaults {
                        sheet: sheet.clone(),
                        defaults: previous,
                    },
                    vec![sheet],
                )
            }
            EditorCommand::SetShowDefaults { defaults } => {
                let previous = std::mem::replace(&mut self.show.defaults, defaults);
                let affected = self.show.sheets().map(|sheet| sheet.id().clone()).collect();
                (EditorCommand::SetShowDefaults { defaults: previous }, affected)
            }
            EditorCommand::UpdateMovements { sheet, target } => {
                self.show.update_movements(&sheet, target.clone())?;
                self.events.push(EditorEvent::MovementsUpdated {
                    sheet: sheet.clone(),
                });
                self.schedule_collisions(&sheet)?;
                (EditorCommand::UpdateMovements { sheet, target }, Vec::new())
            }
        };

        Ok((inverse, affected))
    }

    fn process_request(&mut self, request: EditorRequest) -> Result<()> {
        match request {
            EditorRequest::Command(command) => self.apply(command),
            EditorRequest::Action(action) => self.do_action(&action),
            EditorRequest::Shutdown => Ok(()),
        }
    }

    fn flush_events(&mut self, event_tx: &mpsc::UnboundedSender<EditorEvent>) {
        for event in self.drain_events() {
            let _ = event_tx.send(event);
        }
    }

    /// Run the editor with channel-based communication
    pub async fn run_with_channels(
        mut self,
        mut request_rx: mpsc::UnboundedReceiver<EditorRequest>,
        event_tx: mpsc::UnboundedSender<EditorEvent>,
    ) -> Result<Show> {
        log::info!("Editor run_with_channels starting...");
        let mut reports = self
            .collisions
            .as_mut()
            .and_then(|queue| queue.take_report_receiver());

        loop {
            tokio::select! {
                request = request_rx.recv() => {
                    let Some(request) = request else {
                        break;
                    };
                    log::debug!("Received request: {:?}", request);

                    if let EditorRequest::Shutdown = request {
                        log::info!("Received shutdown request");
                        break;
                    }

                    if let Err(e) = self.process_request(request) {
                        log::error!("Command processing error: {}", e);
                        let _ = event_tx.send(EditorEvent::Error {
                            message: format!("Command processing error: {}", e),
                        });
                    }
                    self.flush_events(&event_tx);
                }

                Some(message) = async {
                    if let Some(rx) = reports.as_mut() {
                        rx.recv().await
                    } else {
                        // Return a future that never resolves if no receiver
                        std::future::pending().await
                    }
                } => {
                    if let Err(e) = self.handle_collision_message(message) {
                        log::error!("Collision report error: {}", e);
                    }
                    self.flush_events(&event_tx);
                }
            }
        }

        if let Some(queue) = self.collisions.take() {
            queue.shutdown().await;
        }
        let _ = event_tx.send(EditorEvent::ShutdownComplete);
        Ok(self.show)
    }
}
