//! HTTP client for the blog API.

use reqwest::{Method, RequestBuilder, header};
use serde::Serialize;
use serde::de::DeserializeOwned;

use quill_shared::ApiResponse;
use quill_shared::dto::{
    CategoryItem, CategoryList, CategoryRequest, CategoryResponse, CreatedResource, Empty,
    PostItem, PostList, PostRequest, PostResponse, ThumbnailUpload,
};

use crate::credential::Credential;
use crate::error::ClientError;
use crate::fetcher::FetchKey;

/// Typed client; one method per API route.
///
/// Admin methods take the [`Credential`] explicitly, there is no ambient token.
#[derive(Debug, Clone)]
pub struct BlogClient {
    http: reqwest::Client,
    base_url: String,
}

impl BlogClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, credential: Option<&Credential>) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match credential {
            Some(credential) => builder.header(header::AUTHORIZATION, credential.header_value()),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            let err = ClientError::from_response(status.as_u16(), &body);
            tracing::debug!(error = %err, "API request failed");
            Err(err)
        }
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        credential: &Credential,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(self.request(method, path, Some(credential)).json(body))
            .await
    }

    /// GET whatever `key` names and decode it as `T`. Used as a [`Fetcher`](crate::Fetcher) loader.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &FetchKey) -> Result<T, ClientError> {
        self.send(self.request(Method::GET, key.path(), key.credential()))
            .await
    }

    // Public reads

    pub async fn list_posts(&self) -> Result<Vec<PostResponse>, ClientError> {
        let body: ApiResponse<PostList> = self.send(self.request(Method::GET, "/posts", None)).await?;
        Ok(body.data.posts)
    }

    pub async fn get_post(&self, id: i32) -> Result<PostResponse, ClientError> {
        let body: ApiResponse<PostItem> = self
            .send(self.request(Method::GET, &format!("/posts/{id}"), None))
            .await?;
        Ok(body.data.post)
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryResponse>, ClientError> {
        let body: ApiResponse<CategoryList> = self
            .send(self.request(Method::GET, "/categories", None))
            .await?;
        Ok(body.data.categories)
    }

    pub async fn get_category(&self, id: i32) -> Result<CategoryResponse, ClientError> {
        let body: ApiResponse<CategoryItem> = self
            .send(self.request(Method::GET, &format!("/categories/{id}"), None))
            .await?;
        Ok(body.data.category)
    }

    // Admin posts

    pub async fn admin_list_posts(
        &self,
        credential: &Credential,
    ) -> Result<Vec<PostResponse>, ClientError> {
        let body: ApiResponse<PostList> = self
            .send(self.request(Method::GET, "/admin/posts", Some(credential)))
            .await?;
        Ok(body.data.posts)
    }

    pub async fn admin_get_post(
        &self,
        credential: &Credential,
        id: i32,
    ) -> Result<PostResponse, ClientError> {
        let body: ApiResponse<PostItem> = self
            .send(self.request(Method::GET, &format!("/admin/posts/{id}"), Some(credential)))
            .await?;
        Ok(body.data.post)
    }

    /// Returns the new post's id.
    pub async fn create_post(
        &self,
        credential: &Credential,
        post: &PostRequest,
    ) -> Result<i32, ClientError> {
        let body: ApiResponse<CreatedResource> = self
            .send_json(Method::POST, "/admin/posts", credential, post)
            .await?;
        Ok(body.data.id)
    }

    /// Returns the post as stored after the update.
    pub async fn update_post(
        &self,
        credential: &Credential,
        id: i32,
        post: &PostRequest,
    ) -> Result<PostResponse, ClientError> {
        let body: ApiResponse<PostItem> = self
            .send_json(Method::PUT, &format!("/admin/posts/{id}"), credential, post)
            .await?;
        Ok(body.data.post)
    }

    pub async fn delete_post(&self, credential: &Credential, id: i32) -> Result<(), ClientError> {
        let _: ApiResponse<Empty> = self
            .send(self.request(Method::DELETE, &format!("/admin/posts/{id}"), Some(credential)))
            .await?;
        Ok(())
    }

    // Admin categories

    pub async fn admin_list_categories(
        &self,
        credential: &Credential,
    ) -> Result<Vec<CategoryResponse>, ClientError> {
        let body: ApiResponse<CategoryList> = self
            .send(self.request(Method::GET, "/admin/categories", Some(credential)))
            .await?;
        Ok(body.data.categories)
    }

    pub async fn admin_get_category(
        &self,
        credential: &Credential,
        id: i32,
    ) -> Result<CategoryResponse, ClientError> {
        let body: ApiResponse<CategoryItem> = self
            .send(self.request(
                Method::GET,
                &format!("/admin/categories/{id}"),
                Some(credential),
            ))
            .await?;
        Ok(body.data.category)
    }

    pub async fn create_category(
        &self,
        credential: &Credential,
        category: &CategoryRequest,
    ) -> Result<i32, ClientError> {
        let body: ApiResponse<CreatedResource> = self
            .send_json(Method::POST, "/admin/categories", credential, category)
            .await?;
        Ok(body.data.id)
    }

    pub async fn update_category(
        &self,
        credential: &Credential,
        id: i32,
        category: &CategoryRequest,
    ) -> Result<CategoryResponse, ClientError> {
        let body: ApiResponse<CategoryItem> = self
            .send_json(
                Method::PUT,
                &format!("/admin/categories/{id}"),
                credential,
                category,
            )
            .await?;
        Ok(body.data.category)
    }

    pub async fn delete_category(
        &self,
        credential: &Credential,
        id: i32,
    ) -> Result<(), ClientError> {
        let _: ApiResponse<Empty> = self
            .send(self.request(
                Method::DELETE,
                &format!("/admin/categories/{id}"),
                Some(credential),
            ))
            .await?;
        Ok(())
    }

    /// Upload raw image bytes; the returned key goes into a post's `thumbnailImageKey`.
    pub async fn upload_thumbnail(
        &self,
        credential: &Credential,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<ThumbnailUpload, ClientError> {
        let body: ApiResponse<ThumbnailUpload> = self
            .send(
                self.request(Method::POST, "/admin/thumbnails", Some(credential))
                    .header(header::CONTENT_TYPE, content_type)
                    .body(data),
            )
            .await?;
        Ok(body.data)
    }
}
