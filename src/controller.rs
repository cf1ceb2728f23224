//! Trigger surface between the UI and the persona state.
//!
//! Every user action goes through `PersonaController`. Requests run as
//! `Query`s on spawned tasks and their results are applied on `tick()`.
//! Errors never escape: each one becomes a notification on the state.

use crate::error::PersonaError;
use crate::persona::{Ack, Persona, PersonaApi, PersonaFields};
use crate::query::Query;
use crate::state::{Action, PersonaForm, PersonaState, Submission};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A create or update in flight
struct PendingSave {
  /// Record id for an update, `None` for a create
  target: Option<i64>,
  /// Session the save was submitted from
  generation: u64,
  query: Query<Ack, PersonaError>,
}

struct PendingDelete {
  id: i64,
  query: Query<Ack, PersonaError>,
}

pub struct PersonaController {
  api: Arc<dyn PersonaApi>,
  state: PersonaState,
  list: Query<Vec<Persona>, PersonaError>,
  save: Option<PendingSave>,
  delete: Option<PendingDelete>,
}

impl PersonaController {
  pub fn new(api: Arc<dyn PersonaApi>) -> Self {
    let list_api = api.clone();
    let list = Query::new(move || {
      let api = list_api.clone();
      async move { api.list_all().await }
    });

    Self {
      api,
      state: PersonaState::new(),
      list,
      save: None,
      delete: None,
    }
  }

  pub fn state(&self) -> &PersonaState {
    &self.state
  }

  /// Busy flag for the table: a fetch or a delete is in flight
  pub fn busy_list(&self) -> bool {
    self.list.is_loading() || self.delete.is_some()
  }

  /// Busy flag for the modal: a save is in flight
  pub fn busy_modal(&self) -> bool {
    self.save.is_some()
  }

  /// Fetch the collection unless a fetch is already running.
  pub fn load(&mut self) {
    self.list.fetch();
  }

  pub fn open_new(&mut self) -> PersonaForm {
    self.state.session_mut().open_new()
  }

  /// Open the record displayed at `row` for editing.
  pub fn open_edit(&mut self, row: usize) -> Option<PersonaForm> {
    let record = self.state.record_at_row(row)?.clone();
    Some(self.state.session_mut().open_edit(record))
  }

  pub fn cancel(&mut self) {
    self.state.session_mut().close();
  }

  /// Validate the form and send a create or update, depending on the
  /// session. Validation failures are returned (and notified) without any
  /// request being made. Ignored while a save is already running.
  pub fn submit(&mut self, form: &PersonaForm) -> Result<(), PersonaError> {
    if self.save.is_some() {
      debug!("save already in flight, ignoring submit");
      return Ok(());
    }

    let submission = match self.state.session().submission(form) {
      Some(Ok(submission)) => submission,
      Some(Err(err)) => {
        let err = PersonaError::from(err);
        self.state.notify_error(&err, Action::Save);
        return Err(err);
      }
      None => {
        debug!("submit with closed session, ignoring");
        return Ok(());
      }
    };

    let api = self.api.clone();
    let (target, query) = match submission {
      Submission::Create(fields) => (None, save_query(api, None, fields)),
      Submission::Update { id, fields } => (Some(id), save_query(api, Some(id), fields)),
    };

    let generation = self.state.session().generation();
    let mut pending = PendingSave {
      target,
      generation,
      query,
    };
    pending.query.fetch();
    self.save = Some(pending);
    Ok(())
  }

  /// Close the session and hand back the id of the record it held, for the
  /// caller to confirm before calling `delete`.
  pub fn begin_delete(&mut self) -> Option<i64> {
    self.state.session_mut().take_delete_target()
  }

  pub fn delete(&mut self, id: i64) {
    if self.delete.is_some() {
      debug!(id, "delete already in flight, ignoring");
      return;
    }

    let api = self.api.clone();
    let mut query = Query::new(move || {
      let api = api.clone();
      async move { api.delete(id).await }
    });
    query.fetch();
    self.delete = Some(PendingDelete { id, query });
  }

  pub fn search(&mut self, text: &str) -> Result<usize, PersonaError> {
    self.state.search(text)
  }

  pub fn show_all(&mut self) {
    self.state.show_all();
  }

  /// Apply any settled request. Returns `true` if something changed.
  pub fn tick(&mut self) -> bool {
    let mut changed = false;

    if self.list.poll() {
      let result = settled(self.list.take_result());
      if let Ok(records) = &result {
        debug!(count = records.len(), "personas loaded");
      }
      self.state.apply_list(result);
      changed = true;
    }

    if let Some(mut pending) = self.save.take() {
      if pending.query.poll() {
        let result = settled(pending.query.take_result());
        self.finish_save(pending.target, pending.generation, result);
        changed = true;
      } else {
        self.save = Some(pending);
      }
    }

    if let Some(mut pending) = self.delete.take() {
      if pending.query.poll() {
        let result = settled(pending.query.take_result());
        self.finish_delete(pending.id, result);
        changed = true;
      } else {
        self.delete = Some(pending);
      }
    }

    changed
  }

  fn finish_save(
    &mut self,
    target: Option<i64>,
    generation: u64,
    result: Result<Ack, PersonaError>,
  ) {
    match result {
      Ok(ack) => {
        let id = target
          .map(|id| id.to_string())
          .unwrap_or_else(|| ack.to_string());
        info!(id = %id, "persona saved");

        // Only close the session the save was made from
        self.state.session_mut().close_if_current(generation);
        self.state.notify(format!("Saved. ID: {}", id));
        self.state.clear_search();
        self.list.refetch();
      }
      Err(err) => {
        warn!(error = %err, ?target, "save failed");
        self.state.notify_error(&err, Action::Save);
      }
    }
  }

  fn finish_delete(&mut self, id: i64, result: Result<Ack, PersonaError>) {
    match result {
      Ok(_) => {
        info!(id, "persona deleted");
        self.state.notify("Record deleted.");
        self.state.clear_search();
        self.list.refetch();
      }
      Err(err) => {
        warn!(error = %err, id, "delete failed");
        self.state.notify_error(&err, Action::Delete);
      }
    }
  }
}

/// A polled query that produced no result had its task die before
/// answering; report it like any other failed request.
fn settled<T>(result: Option<Result<T, PersonaError>>) -> Result<T, PersonaError> {
  result.unwrap_or_else(|| {
    Err(PersonaError::Network(
      "request ended without a response".to_string(),
    ))
  })
}

fn save_query(
  api: Arc<dyn PersonaApi>,
  id: Option<i64>,
  fields: PersonaFields,
) -> Query<Ack, PersonaError> {
  Query::new(move || {
    let api = api.clone();
    let fields = fields.clone();
    async move {
      match id {
        Some(id) => api.update(id, &fields).await,
        None => api.create(&fields).await,
      }
    }
  })
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::persona::types::NEW_PERSONA_ID;
  use crate::persona::Sex;
  use crate::state::cache::tests::persona;
  use crate::state::{Level, SessionState, TableContent};
  use async_trait::async_trait;
  use pretty_assertions::assert_eq;
  use std::sync::Mutex;
  use std::time::Duration;

  #[derive(Debug, Clone, PartialEq)]
  enum Request {
    List,
    Create(PersonaFields),
    Update(i64, PersonaFields),
    Delete(i64),
  }

  /// In-memory server: applies mutations to its own collection
  #[derive(Default)]
  pub(crate) struct FakeApi {
    records: Mutex<Vec<Persona>>,
    requests: Mutex<Vec<Request>>,
    fail_with: Mutex<Option<PersonaError>>,
    abort_next: Mutex<bool>,
  }

  impl FakeApi {
    pub(crate) fn with(ids: &[i64]) -> Arc<Self> {
      Arc::new(Self {
        records: Mutex::new(ids.iter().map(|&id| persona(id)).collect()),
        ..Default::default()
      })
    }

    fn fail_next(&self, err: PersonaError) {
      *self.fail_with.lock().unwrap() = Some(err);
    }

    /// Make the next request's task die without answering
    fn abort_next(&self) {
      *self.abort_next.lock().unwrap() = true;
    }

    fn requests(&self) -> Vec<Request> {
      self.requests.lock().unwrap().clone()
    }

    fn record(&self, request: Request) -> Result<(), PersonaError> {
      self.requests.lock().unwrap().push(request);
      let abort = std::mem::take(&mut *self.abort_next.lock().unwrap());
      if abort {
        panic!("request task aborted");
      }
      match self.fail_with.lock().unwrap().take() {
        Some(err) => Err(err),
        None => Ok(()),
      }
    }

    fn server_ids(&self) -> Vec<i64> {
      self.records.lock().unwrap().iter().map(|p| p.id).collect()
    }
  }

  fn apply(persona: &mut Persona, fields: &PersonaFields) {
    persona.first_name = fields.first_name.clone();
    persona.last_name = fields.last_name.clone();
    persona.sex = fields.sex.wire_value().to_string();
    persona.birth_date = fields.birth_date.clone();
    persona.role_id = Some(fields.role_id);
  }

  #[async_trait]
  impl PersonaApi for FakeApi {
    async fn list_all(&self) -> Result<Vec<Persona>, PersonaError> {
      self.record(Request::List)?;
      Ok(self.records.lock().unwrap().clone())
    }

    async fn create(&self, fields: &PersonaFields) -> Result<Ack, PersonaError> {
      self.record(Request::Create(fields.clone()))?;
      let mut records = self.records.lock().unwrap();
      let id = records.iter().map(|p| p.id).max().unwrap_or(0) + 1;
      let mut created = persona(id);
      apply(&mut created, fields);
      records.push(created);
      Ok(Ack(serde_json::json!(id)))
    }

    async fn update(&self, id: i64, fields: &PersonaFields) -> Result<Ack, PersonaError> {
      self.record(Request::Update(id, fields.clone()))?;
      let mut records = self.records.lock().unwrap();
      if let Some(existing) = records.iter_mut().find(|p| p.id == id) {
        apply(existing, fields);
      }
      Ok(Ack(serde_json::json!({ "result": true })))
    }

    async fn delete(&self, id: i64) -> Result<Ack, PersonaError> {
      self.record(Request::Delete(id))?;
      self.records.lock().unwrap().retain(|p| p.id != id);
      Ok(Ack(serde_json::json!({ "result": true })))
    }
  }

  async fn settle(controller: &mut PersonaController) {
    for _ in 0..200 {
      tokio::time::sleep(Duration::from_millis(5)).await;
      controller.tick();
      if !controller.busy_list() && !controller.busy_modal() {
        return;
      }
    }
    panic!("requests did not settle");
  }

  async fn loaded(api: &Arc<FakeApi>) -> PersonaController {
    let mut controller = PersonaController::new(api.clone());
    controller.load();
    settle(&mut controller).await;
    controller
  }

  fn cached_ids(controller: &PersonaController) -> Vec<i64> {
    controller
      .state()
      .cache()
      .current()
      .iter()
      .map(|p| p.id)
      .collect()
  }

  fn new_form() -> PersonaForm {
    PersonaForm {
      first_name: "Luis".to_string(),
      last_name: "Perez".to_string(),
      sex: Some(Sex::Male),
      birth_date: "1985-02-03".to_string(),
      role_id: "3".to_string(),
    }
  }

  #[tokio::test]
  async fn test_load_fills_cache() {
    let api = FakeApi::with(&[1, 2]);
    let mut controller = PersonaController::new(api.clone());

    controller.load();
    assert!(controller.busy_list());
    assert!(!controller.busy_modal());

    settle(&mut controller).await;
    assert_eq!(cached_ids(&controller), vec![1, 2]);
    assert!(!controller.busy_list());
  }

  #[tokio::test]
  async fn test_create_sends_sentinel_and_refetches() {
    let api = FakeApi::with(&[1, 2]);
    let mut controller = loaded(&api).await;

    // A stale edit must not leak its id into a create
    controller.open_edit(0);
    controller.cancel();
    controller.open_new();
    controller.submit(&new_form()).unwrap();
    assert!(controller.busy_modal());

    settle(&mut controller).await;

    let expected = new_form().validate().unwrap();
    assert_eq!(
      api.requests(),
      vec![Request::List, Request::Create(expected), Request::List]
    );
    assert_eq!(cached_ids(&controller), api.server_ids());
    assert_eq!(cached_ids(&controller), vec![1, 2, 3]);
    assert_eq!(
      controller.state().session().state(),
      &SessionState::Closed
    );
    assert_eq!(
      controller.state().notification().map(|n| n.message.as_str()),
      Some("Saved. ID: 3")
    );
    assert_eq!(NEW_PERSONA_ID, 0);
  }

  #[tokio::test]
  async fn test_edit_sends_opened_record_id() {
    let api = FakeApi::with(&[4, 9]);
    let mut controller = loaded(&api).await;

    let mut form = controller.open_edit(1).unwrap();
    assert_eq!(form.sex.map(Sex::form_value), Some("f"));
    form.first_name = "Renamed".to_string();
    controller.submit(&form).unwrap();
    settle(&mut controller).await;

    match &api.requests()[1] {
      Request::Update(id, fields) => {
        assert_eq!(*id, 9);
        assert_eq!(fields.sex.wire_value(), "F");
        assert_eq!(fields.first_name, "Renamed");
      }
      other => panic!("expected update, got {:?}", other),
    }
    assert_eq!(
      controller.state().cache().get(1).map(|p| p.first_name.as_str()),
      Some("Renamed")
    );
    assert_eq!(
      controller.state().notification().map(|n| n.message.as_str()),
      Some("Saved. ID: 9")
    );
  }

  #[tokio::test]
  async fn test_failed_save_keeps_session_and_cache() {
    let api = FakeApi::with(&[1, 2]);
    let mut controller = loaded(&api).await;

    let form = controller.open_edit(0).unwrap();
    let session_before = controller.state().session().state().clone();
    api.fail_next(PersonaError::Api {
      status: 400,
      message: Some("fecha invalida".to_string()),
    });
    controller.submit(&form).unwrap();
    settle(&mut controller).await;

    assert_eq!(controller.state().session().state(), &session_before);
    assert_eq!(cached_ids(&controller), vec![1, 2]);
    assert!(!controller.busy_modal());
    let notification = controller.state().notification().unwrap();
    assert_eq!(notification.level, Level::Error);
    assert_eq!(notification.message, "Save failed: fecha invalida");
    // No refetch after a failure
    assert_eq!(api.requests().len(), 2);
  }

  #[tokio::test]
  async fn test_network_failure_on_save() {
    let api = FakeApi::with(&[1]);
    let mut controller = loaded(&api).await;

    controller.open_new();
    api.fail_next(PersonaError::Network("connection refused".to_string()));
    controller.submit(&new_form()).unwrap();
    settle(&mut controller).await;

    assert_eq!(
      controller.state().session().state(),
      &SessionState::Creating
    );
    assert_eq!(
      controller.state().notification().map(|n| n.message.as_str()),
      Some("Connection error. Please try again.")
    );
  }

  #[tokio::test]
  async fn test_validation_blocks_request() {
    let api = FakeApi::with(&[1]);
    let mut controller = loaded(&api).await;

    controller.open_new();
    let mut form = new_form();
    form.birth_date.clear();

    assert!(matches!(
      controller.submit(&form),
      Err(PersonaError::Validation(_))
    ));
    assert!(!controller.busy_modal());
    assert_eq!(api.requests(), vec![Request::List]);
    assert_eq!(
      controller.state().session().state(),
      &SessionState::Creating
    );
  }

  #[tokio::test]
  async fn test_delete_closes_session_then_refetches() {
    let api = FakeApi::with(&[1, 2, 3]);
    let mut controller = loaded(&api).await;

    controller.open_edit(1);
    let id = controller.begin_delete().unwrap();
    assert_eq!(id, 2);
    assert_eq!(
      controller.state().session().state(),
      &SessionState::Closed
    );

    controller.delete(id);
    assert!(controller.busy_list());
    settle(&mut controller).await;

    assert_eq!(
      api.requests(),
      vec![Request::List, Request::Delete(2), Request::List]
    );
    assert_eq!(cached_ids(&controller), vec![1, 3]);
    assert_eq!(
      controller.state().notification().map(|n| n.message.as_str()),
      Some("Record deleted.")
    );
  }

  #[tokio::test]
  async fn test_failed_delete_keeps_cache() {
    let api = FakeApi::with(&[1, 2]);
    let mut controller = loaded(&api).await;

    api.fail_next(PersonaError::Api {
      status: 409,
      message: None,
    });
    controller.delete(1);
    settle(&mut controller).await;

    assert_eq!(cached_ids(&controller), vec![1, 2]);
    assert_eq!(
      controller.state().notification().map(|n| n.message.as_str()),
      Some("Delete failed: could not delete")
    );
  }

  #[tokio::test]
  async fn test_successful_mutation_clears_search() {
    let api = FakeApi::with(&[1, 2]);
    let mut controller = loaded(&api).await;

    controller.search("2").unwrap();
    assert_eq!(controller.state().active_search(), Some("2"));

    let form = controller.open_edit(0).unwrap();
    assert_eq!(controller.state().session().held_record().map(|p| p.id), Some(2));
    controller.submit(&form).unwrap();
    settle(&mut controller).await;

    assert_eq!(controller.state().active_search(), None);
    assert_eq!(
      controller.state().content(),
      &TableContent::Rows(vec![0, 1])
    );
  }

  #[tokio::test]
  async fn test_failed_load_reports_no_data() {
    let api = FakeApi::with(&[1]);
    api.fail_next(PersonaError::Network("unreachable".to_string()));
    let controller = loaded(&api).await;

    assert_eq!(controller.state().content(), &TableContent::LoadFailed);
    assert!(controller.state().cache().current().is_empty());
  }

  #[tokio::test]
  async fn test_stale_create_does_not_close_newer_session() {
    let api = FakeApi::with(&[1]);
    let mut controller = loaded(&api).await;

    controller.open_new();
    controller.submit(&new_form()).unwrap();
    controller.cancel();
    controller.open_new();
    settle(&mut controller).await;

    assert_eq!(
      controller.state().session().state(),
      &SessionState::Creating
    );
    assert_eq!(
      controller.state().notification().map(|n| n.message.as_str()),
      Some("Saved. ID: 2")
    );
  }

  #[tokio::test]
  async fn test_stale_edit_does_not_close_reopened_record() {
    let api = FakeApi::with(&[1, 2]);
    let mut controller = loaded(&api).await;

    let form = controller.open_edit(0).unwrap();
    controller.submit(&form).unwrap();
    controller.cancel();
    controller.open_edit(0);
    settle(&mut controller).await;

    assert_eq!(
      controller.state().session().held_record().map(|p| p.id),
      Some(1)
    );
  }

  #[tokio::test]
  async fn test_reload_after_search_shows_everything() {
    let api = FakeApi::with(&[1, 2, 3]);
    let mut controller = loaded(&api).await;

    controller.search("2").unwrap();
    controller.load();
    settle(&mut controller).await;

    assert_eq!(
      controller.state().content(),
      &TableContent::Rows(vec![0, 1, 2])
    );
    assert_eq!(controller.state().active_search(), None);
  }

  #[tokio::test]
  async fn test_aborted_save_is_reported() {
    let api = FakeApi::with(&[1]);
    let mut controller = loaded(&api).await;

    controller.open_new();
    api.abort_next();
    controller.submit(&new_form()).unwrap();
    settle(&mut controller).await;

    assert!(!controller.busy_modal());
    assert_eq!(
      controller.state().session().state(),
      &SessionState::Creating
    );
    let notification = controller.state().notification().unwrap();
    assert_eq!(notification.level, Level::Error);
    assert_eq!(notification.message, "Connection error. Please try again.");
  }

  #[tokio::test]
  async fn test_aborted_delete_is_reported() {
    let api = FakeApi::with(&[1, 2]);
    let mut controller = loaded(&api).await;

    api.abort_next();
    controller.delete(2);
    settle(&mut controller).await;

    assert!(!controller.busy_list());
    assert_eq!(cached_ids(&controller), vec![1, 2]);
    assert_eq!(
      controller.state().notification().map(|n| n.message.as_str()),
      Some("Connection error. Please try again.")
    );
  }
}
