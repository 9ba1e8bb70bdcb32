use async_trait::async_trait;
use reqwest::{Request, Response};
use std::sync::Arc;

/// Executes a prepared request. Provider wrappers and auth decorators are
/// layered on top of this seam, and tests substitute canned responses.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

#[async_trait]
impl<C: HttpClient + ?Sized> HttpClient for Arc<C> {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        (**self).execute(req).await
    }
}
