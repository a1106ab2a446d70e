//! Test doubles for the job store, generation provider and reference selector

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use uuid::Uuid;

use avatar_gen::app_state::AppState;
use avatar_gen::db::{JobStore, StatusUpdate, StoreError};
use avatar_gen::models::job::{Job, JobStatus};
use avatar_gen::services::dispatcher::JobDispatcher;
use avatar_gen::services::generator::{
    GenerationError, GenerationResult, ImageGenerator, PLACEHOLDER_RESULT_URL,
};
use avatar_gen::services::reference::ReferenceSelector;

pub const REFERENCE_URL: &str = "https://images.example/reference.jpg";

/// In-memory [`JobStore`] with the same guarded transitions as the SQL queries.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<Uuid, Job>>,
    unavailable: AtomicBool,
    /// Every write that actually changed a row, in order.
    transitions: Mutex<Vec<(Uuid, JobStatus)>>,
}

impl MemoryJobStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every subsequent call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.lock().unwrap().values().cloned().collect()
    }

    pub fn job(&self, id: Uuid) -> Option<Job> {
        self.jobs.lock().unwrap().get(&id).cloned()
    }

    pub fn transitions(&self) -> Vec<(Uuid, JobStatus)> {
        self.transitions.lock().unwrap().clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn transition(
        &self,
        id: Uuid,
        status: JobStatus,
        result_url: Option<&str>,
    ) -> Result<StatusUpdate, StoreError> {
        self.check_available()?;
        let mut jobs = self.jobs.lock().unwrap();
        match jobs.get_mut(&id) {
            Some(job) if job.status == JobStatus::Processing => {
                job.status = status;
                job.result_image_url = result_url.map(str::to_string);
                self.transitions.lock().unwrap().push((id, status));
                Ok(StatusUpdate::Applied)
            }
            _ => Ok(StatusUpdate::Unchanged),
        }
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create_job(
        &self,
        user_id: &str,
        reference_image_url: &str,
    ) -> Result<Job, StoreError> {
        self.check_available()?;
        let job = Job {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            status: JobStatus::Processing,
            reference_image_url: reference_image_url.to_string(),
            result_image_url: None,
            created_at: Utc::now(),
        };
        self.jobs.lock().unwrap().insert(job.id, job.clone());
        Ok(job)
    }

    async fn mark_completed(
        &self,
        job_id: Uuid,
        result_url: &str,
    ) -> Result<StatusUpdate, StoreError> {
        self.transition(job_id, JobStatus::Completed, Some(result_url))
    }

    async fn mark_failed(&self, job_id: Uuid) -> Result<StatusUpdate, StoreError> {
        self.transition(job_id, JobStatus::Failed, None)
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<Job>, StoreError> {
        self.check_available()?;
        Ok(self.job(job_id))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}

/// Outcome a [`ScriptedGenerator`] produces.
#[derive(Clone)]
pub enum Script {
    Generated(&'static str),
    Placeholder,
    Timeout,
    Provider(&'static str),
    /// Fails with the error of a refused TCP connection.
    Transport,
}

/// Fake provider returning a fixed outcome.
///
/// Optionally waits on a gate before answering, and records the job statuses
/// visible in the store at the moment each call starts.
pub struct ScriptedGenerator {
    script: Script,
    store: Arc<MemoryJobStore>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    observed: Mutex<Vec<Vec<JobStatus>>>,
    requests: Mutex<Vec<(String, String)>>,
}

impl ScriptedGenerator {
    pub fn new(script: Script, store: &Arc<MemoryJobStore>) -> Arc<Self> {
        Self::build(script, store, None)
    }

    /// Like [`ScriptedGenerator::new`] but each call blocks until `gate` is notified.
    pub fn gated(script: Script, store: &Arc<MemoryJobStore>, gate: Arc<Notify>) -> Arc<Self> {
        Self::build(script, store, Some(gate))
    }

    fn build(script: Script, store: &Arc<MemoryJobStore>, gate: Option<Arc<Notify>>) -> Arc<Self> {
        Arc::new(Self {
            script,
            store: Arc::clone(store),
            gate,
            calls: AtomicUsize::new(0),
            observed: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn observed(&self) -> Vec<Vec<JobStatus>> {
        self.observed.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        source_image: &str,
        target_image: &str,
    ) -> Result<GenerationResult, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let statuses: Vec<JobStatus> = self.store.jobs().iter().map(|job| job.status).collect();
        self.observed.lock().unwrap().push(statuses);
        self.requests
            .lock()
            .unwrap()
            .push((source_image.to_string(), target_image.to_string()));

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match &self.script {
            Script::Generated(url) => Ok(GenerationResult::Generated(url.to_string())),
            Script::Placeholder => Ok(GenerationResult::Placeholder(
                PLACEHOLDER_RESULT_URL.to_string(),
            )),
            Script::Timeout => Err(GenerationError::Timeout(Duration::from_secs(60))),
            Script::Provider(status) => Err(GenerationError::Provider {
                status: status.to_string(),
            }),
            Script::Transport => Err(GenerationError::Transport(refused_connection().await)),
        }
    }
}

/// A real `reqwest::Error` from connecting to a port nothing listens on.
pub async fn refused_connection() -> reqwest::Error {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    reqwest::Client::new()
        .get(format!("http://{addr}/"))
        .send()
        .await
        .expect_err("nothing should be listening")
}

/// Always picks the same reference image.
pub struct FixedSelector;

impl ReferenceSelector for FixedSelector {
    fn select_reference(&self) -> String {
        REFERENCE_URL.to_string()
    }
}

pub fn dispatcher(
    store: &Arc<MemoryJobStore>,
    generator: &Arc<ScriptedGenerator>,
) -> JobDispatcher {
    JobDispatcher::new(store.clone(), generator.clone(), Arc::new(FixedSelector))
}

pub fn app_state(store: &Arc<MemoryJobStore>, generator: &Arc<ScriptedGenerator>) -> AppState {
    AppState::new(store.clone(), dispatcher(store, generator))
}

/// Poll until every job in the store has left `processing`.
pub async fn wait_for_terminal(store: &MemoryJobStore) {
    for _ in 0..200 {
        if store.jobs().iter().all(|job| job.status.is_terminal()) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("jobs did not reach a terminal status within 2 seconds");
}
