use kinema_model::{
    NewTask, NewTopic, ProgressEntry, PublishTaskRequest, SubmissionResult,
    SubmitAnswerRequest, Task, TaskUpdate, Topic, TopicUpdate,
};
use log::debug;
use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};

use super::{ensure_success, read_json};
use crate::errors::{ApiError, ApiResult};
use crate::gateway::{Gateway, MultipartBody, RequestOptions};
use crate::routes::{utils::replace_param, v1};

/// Topics, tasks, answers and progress; every call goes through the gateway
#[derive(Debug, Clone)]
pub struct ContentApi {
    gateway: Gateway,
}

impl ContentApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.gateway.request(path, RequestOptions::get()).await?;
        read_json(response).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let options =
            RequestOptions::json(method, body).map_err(ApiError::Encode)?;
        let response = self.gateway.request(path, options).await?;
        read_json(response).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let response = self
            .gateway
            .request(path, RequestOptions::delete())
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    // Topics

    pub async fn topics(&self) -> ApiResult<Vec<Topic>> {
        self.get(v1::content::topics::COLLECTION).await
    }

    pub async fn topic(&self, id: &str) -> ApiResult<Topic> {
        self.get(&replace_param(v1::content::topics::ITEM, "{id}", id))
            .await
    }

    pub async fn create_topic(&self, topic: &NewTopic) -> ApiResult<Topic> {
        debug!("[ContentApi] Creating topic {:?}", topic.title);
        self.send(Method::POST, v1::content::topics::COLLECTION, topic)
            .await
    }

    pub async fn update_topic(
        &self,
        id: &str,
        update: &TopicUpdate,
    ) -> ApiResult<Topic> {
        self.send(
            Method::PUT,
            &replace_param(v1::content::topics::ITEM, "{id}", id),
            update,
        )
        .await
    }

    pub async fn delete_topic(&self, id: &str) -> ApiResult<()> {
        debug!("[ContentApi] Deleting topic {}", id);
        self.delete(&replace_param(v1::content::topics::ITEM, "{id}", id))
            .await
    }

    pub async fn tasks_by_topic(&self, topic_id: &str) -> ApiResult<Vec<Task>> {
        self.get(&replace_param(v1::content::topics::TASKS, "{id}", topic_id))
            .await
    }

    // Tasks

    pub async fn tasks(&self) -> ApiResult<Vec<Task>> {
        self.get(v1::content::tasks::COLLECTION).await
    }

    pub async fn task(&self, id: &str) -> ApiResult<Task> {
        self.get(&replace_param(v1::content::tasks::ITEM, "{id}", id))
            .await
    }

    /// Create a task as a multipart form, attaching the image when present
    pub async fn create_task(&self, task: &NewTask) -> ApiResult<Task> {
        let mut form = MultipartBody::new();
        for (name, value) in task.form_fields() {
            form = form.text(name, value);
        }
        if let Some(image) = &task.image {
            form = form.file(
                "image",
                image.file_name.clone(),
                image.mime_type.clone(),
                image.bytes.clone(),
            );
        }
        debug!(
            "[ContentApi] Creating task {:?} ({} form parts)",
            task.title,
            form.len()
        );

        let response = self
            .gateway
            .request(
                v1::content::tasks::COLLECTION,
                RequestOptions::multipart(Method::POST, form),
            )
            .await?;
        read_json(response).await
    }

    pub async fn update_task(
        &self,
        id: &str,
        update: &TaskUpdate,
    ) -> ApiResult<Task> {
        self.send(
            Method::PUT,
            &replace_param(v1::content::tasks::ITEM, "{id}", id),
            update,
        )
        .await
    }

    pub async fn delete_task(&self, id: &str) -> ApiResult<()> {
        debug!("[ContentApi] Deleting task {}", id);
        self.delete(&replace_param(v1::content::tasks::ITEM, "{id}", id))
            .await
    }

    pub async fn publish_task(&self, id: &str) -> ApiResult<Task> {
        let body = PublishTaskRequest {
            task_id: id.to_string(),
        };
        self.send(Method::POST, v1::content::tasks::PUBLISH, &body)
            .await
    }

    pub async fn draft_tasks(&self) -> ApiResult<Vec<Task>> {
        self.get(v1::content::tasks::DRAFTS).await
    }

    pub async fn submit_answer(
        &self,
        task_id: &str,
        answer: &str,
    ) -> ApiResult<SubmissionResult> {
        let body = SubmitAnswerRequest {
            answer: answer.to_string(),
        };
        self.send(
            Method::POST,
            &replace_param(v1::content::tasks::SUBMIT, "{id}", task_id),
            &body,
        )
        .await
    }

    /// Progress of the current user across all tasks
    pub async fn progress(&self) -> ApiResult<Vec<ProgressEntry>> {
        self.get(v1::content::tasks::PROGRESS).await
    }
}
