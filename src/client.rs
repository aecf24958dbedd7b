//! This module provides a client to a remote task store
//!
//! The remote contract for partial updates has varied across backend versions, so writes
//! go through a chain of alternate encodings of the same intent: each one is tried in a
//! fixed order and the first success wins. All encodings are idempotent ways of saying the
//! same thing, never parallel writes. Callers only ever see the canonical repository
//! operations; the juggling stays in here.

use std::error::Error;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::config;
use crate::organization::Organization;
use crate::task::{Task, TaskPatch};
use crate::traits::{OrganizationRepository, TaskRepository};

/// One alternate encoding of a write intent
#[derive(Clone, Debug, PartialEq)]
struct WriteStrategy {
    method: Method,
    url: Url,
    /// Verb hint carried in the body as `_method`, for backends that only route POST
    method_hint: Option<&'static str>,
}

impl WriteStrategy {
    /// The body this strategy sends: the intent's fields, plus the `_method` hint when one is set
    fn body(&self, intent: Option<&Value>) -> Option<Value> {
        match (intent, self.method_hint) {
            (Some(intent), Some(hint)) => {
                let mut body = intent.clone();
                if let Some(fields) = body.as_object_mut() {
                    fields.insert("_method".to_string(), hint.into());
                }
                Some(body)
            }
            (Some(intent), None) => Some(intent.clone()),
            (None, Some(hint)) => Some(serde_json::json!({ "_method": hint })),
            (None, None) => None,
        }
    }
}

/// A store that fetches its data from a remote HTTP resource
pub struct RemoteStore {
    base_url: Url,
}

impl RemoteStore {
    /// Create a remote store client. This does not start a connection
    pub fn new<S: AsRef<str>>(base_url: S) -> Result<Self, Box<dyn Error>> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self { base_url })
    }

    /// Create a remote store client against the configured backend URL
    pub fn from_config() -> Result<Self, Box<dyn Error>> {
        let url = config::BACKEND_URL.lock().unwrap(/* never poisoned, it only holds a String */).clone();
        Self::new(url)
    }

    fn collection_url(&self, collection: &str) -> Result<Url, Box<dyn Error>> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| "The base URL cannot carry a path")?
            .pop_if_empty()
            .push(collection);
        Ok(url)
    }

    fn resource_url(&self, collection: &str, id: &str) -> Result<Url, Box<dyn Error>> {
        let mut url = self.collection_url(collection)?;
        url.path_segments_mut()
            .map_err(|_| "The base URL cannot carry a path")?
            .push(id);
        Ok(url)
    }

    /// The route shapes historically accepted for a task update, in the order to try them
    fn update_strategies(&self, id: &str) -> Result<Vec<WriteStrategy>, Box<dyn Error>> {
        Ok(vec![
            WriteStrategy { method: Method::PATCH, url: self.collection_url("tasks")?, method_hint: None },
            WriteStrategy { method: Method::PATCH, url: self.resource_url("tasks", id)?, method_hint: None },
            WriteStrategy { method: Method::PUT, url: self.resource_url("tasks", id)?, method_hint: None },
            WriteStrategy { method: Method::POST, url: self.resource_url("tasks", id)?, method_hint: Some("PATCH") },
        ])
    }

    /// The route shapes historically accepted for a task deletion, in the order to try them
    fn delete_strategies(&self, id: &str) -> Result<Vec<WriteStrategy>, Box<dyn Error>> {
        let mut by_query = self.collection_url("tasks")?;
        by_query.query_pairs_mut().append_pair("id", id);

        Ok(vec![
            WriteStrategy { method: Method::DELETE, url: self.resource_url("tasks", id)?, method_hint: None },
            WriteStrategy { method: Method::POST, url: self.resource_url("tasks", id)?, method_hint: Some("DELETE") },
            WriteStrategy { method: Method::DELETE, url: by_query, method_hint: None },
        ])
    }

    async fn attempt_write(&self, strategy: &WriteStrategy, intent: Option<&Value>) -> Result<(), Box<dyn Error>> {
        let mut request = reqwest::Client::new().request(strategy.method.clone(), strategy.url.clone());
        if let Some(body) = strategy.body(intent) {
            request = request.json(&body);
        }
        let response = request.send().await?;

        if response.status().is_success() == false {
            return Err(format!("Unexpected HTTP status code {:?}", response.status()).into());
        }
        Ok(())
    }

    /// Runs a write chain: first success wins, tolerated failures are only logged.
    /// The error of the last strategy is returned once every one of them has failed.
    async fn run_write_chain(&self, strategies: Vec<WriteStrategy>, intent: Option<&Value>) -> Result<(), Box<dyn Error>> {
        let mut last_error: Option<Box<dyn Error>> = None;
        for strategy in strategies {
            match self.attempt_write(&strategy, intent).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    log::warn!("Write strategy {} {} failed: {}. Trying the next one", strategy.method, strategy.url, err);
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| "No write strategy to try".into()))
    }
}

#[async_trait(?Send)]
impl TaskRepository for RemoteStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, Box<dyn Error>> {
        let response = reqwest::Client::new()
            .get(self.collection_url("tasks")?)
            .send()
            .await?;

        if response.status().is_success() == false {
            return Err(format!("Unexpected HTTP status code {:?}", response.status()).into());
        }

        // A non-JSON body is a failure of this call, not a crash
        let tasks = response.json::<Vec<Task>>().await?;
        Ok(tasks)
    }

    async fn create_task(&mut self, task: Task) -> Result<Task, Box<dyn Error>> {
        let response = reqwest::Client::new()
            .post(self.collection_url("tasks")?)
            .json(&task)
            .send()
            .await?;

        if response.status().is_success() == false {
            return Err(format!("Unexpected HTTP status code {:?}", response.status()).into());
        }

        let created = response.json::<Task>().await?;
        Ok(created)
    }

    async fn update_task(&mut self, id: &str, patch: &TaskPatch) -> Result<(), Box<dyn Error>> {
        // Collection-level strategies need the id in the body to know what to patch
        let mut intent = serde_json::to_value(patch)?;
        if let Some(fields) = intent.as_object_mut() {
            fields.insert("id".to_string(), id.into());
        }

        self.run_write_chain(self.update_strategies(id)?, Some(&intent)).await
    }

    async fn delete_task(&mut self, id: &str) -> Result<(), Box<dyn Error>> {
        self.run_write_chain(self.delete_strategies(id)?, None).await
    }
}

#[async_trait(?Send)]
impl OrganizationRepository for RemoteStore {
    async fn list_organizations(&self) -> Result<Vec<Organization>, Box<dyn Error>> {
        let response = reqwest::Client::new()
            .get(self.collection_url("organizations")?)
            .send()
            .await?;

        if response.status().is_success() == false {
            return Err(format!("Unexpected HTTP status code {:?}", response.status()).into());
        }

        let organizations = response.json::<Vec<Organization>>().await?;
        Ok(organizations)
    }

    async fn create_organization(&mut self, organization: Organization) -> Result<Organization, Box<dyn Error>> {
        let response = reqwest::Client::new()
            .post(self.collection_url("organizations")?)
            .json(&organization)
            .send()
            .await?;

        if response.status().is_success() == false {
            return Err(format!("Unexpected HTTP status code {:?}", response.status()).into());
        }

        let created = response.json::<Organization>().await?;
        Ok(created)
    }

    async fn delete_organization(&mut self, id: &str) -> Result<(), Box<dyn Error>> {
        let response = reqwest::Client::new()
            .delete(self.resource_url("organizations", id)?)
            .send()
            .await?;

        if response.status().is_success() == false {
            return Err(format!("Unexpected HTTP status code {:?}", response.status()).into());
        }
        Ok(())
    }
}
