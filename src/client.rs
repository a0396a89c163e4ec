use reqwest::{header, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::ids::ResourceId;
use crate::models::{
    AdaptiveTokens, ArchiveResponse, Book, Books, CharMap, CorrectionRequest, CreateUserRequest,
    ExtendedLexicon, Job, JobStatus, Line, LoginRequest, NewBook, OcrModels, Page, PatternCounts,
    PostCorrection, PostOcr, Profile, SearchResults, Session, SplitPackages, SplitRequest,
    SuggestionCounts, Suggestions, Token, User, Users, Version,
};

/// Server side jobs that can be started for a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    Profile,
    ExtendedLexicon,
    PostCorrection,
    Train,
    Predict { model_id: i64 },
}

impl JobKind {
    fn path(&self, book: i64) -> String {
        match self {
            JobKind::Profile => format!("profile/books/{}", book),
            JobKind::ExtendedLexicon => format!("el/books/{}", book),
            JobKind::PostCorrection => format!("pc/books/{}", book),
            JobKind::Train => format!("ocr/train/books/{}", book),
            JobKind::Predict { .. } => format!("ocr/predict/books/{}", book),
        }
    }
}

/// Selects a page of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRef {
    First,
    Last,
    Id(i64),
    /// `n` pages after (positive) or before (negative) the given page.
    Relative(i64, i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub queries: Vec<String>,
    pub search_type: String,
    pub ignore_case: bool,
    pub max: i64,
}

/// HTTP client bound to one pocoweb instance.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    host: reqwest::Url,
    auth: Option<String>,
}

impl Client {
    /// Unauthenticated client, used for `login` and `version`.
    pub fn new(base_url: &str, skip_verify: bool) -> Result<Self> {
        if base_url.is_empty() {
            return Err(Error::MissingLogin);
        }
        let host = reqwest::Url::parse(base_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(skip_verify)
            .build()?;
        Ok(Client {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            host,
            auth: None,
        })
    }

    pub fn authenticate(base_url: &str, auth: &str, skip_verify: bool) -> Result<Self> {
        if auth.is_empty() {
            return Err(Error::MissingLogin);
        }
        let mut client = Client::new(base_url, skip_verify)?;
        client.auth = Some(auth.to_string());
        Ok(client)
    }

    /// Logs in and returns a client that carries the new session's token.
    pub async fn login(
        base_url: &str,
        email: &str,
        password: &str,
        skip_verify: bool,
    ) -> Result<(Self, Session)> {
        let client = Client::new(base_url, skip_verify)?;
        let session: Session = client
            .post("login", &LoginRequest { email, password })
            .await?;
        let client = Client {
            auth: Some(session.auth.clone()),
            ..client
        };
        Ok((client, session))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> Option<&str> {
        self.auth.as_deref()
    }

    /// Joins `path` to the base url.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Resolves `path` against the scheme and authority of the base url
    /// only. Archive and image paths handed out by the server are
    /// relative to the host, not to the API root.
    pub fn host_url(&self, path: &str) -> Result<String> {
        let path = format!("/{}", path.trim_start_matches('/'));
        self.host
            .join(&path)
            .map(String::from)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", path, e)))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request_url(method, self.url(path))
    }

    fn request_url(&self, method: Method, url: String) -> RequestBuilder {
        tracing::debug!(%method, %url, "request");
        let request = self.http.request(method, url);
        match &self.auth {
            Some(auth) => request.bearer_auth(auth),
            None => request,
        }
    }

    async fn send(request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(%status, "response");
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: message.trim().to_string(),
            });
        }
        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = Self::send(self.request(Method::GET, path)).await?;
        Ok(response.json().await?)
    }

    async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = Self::send(self.request(Method::GET, path).query(query)).await?;
        Ok(response.json().await?)
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = Self::send(self.request(Method::POST, path).json(body)).await?;
        Ok(response.json().await?)
    }

    /// Requests whose response body carries nothing of interest.
    async fn execute(&self, method: Method, path: &str) -> Result<()> {
        Self::send(self.request(method, path)).await?;
        Ok(())
    }

    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let response = Self::send(self.request(Method::GET, path)).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Downloads a zip archive from `url`, which must come back as
    /// `application/zip`.
    async fn get_zip(&self, url: String) -> Result<Vec<u8>> {
        let response = Self::send(self.request_url(Method::GET, url)).await?;
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("application/zip") {
            return Err(Error::BadContentType(content_type));
        }
        Ok(response.bytes().await?.to_vec())
    }

    // sessions

    pub async fn get_login(&self) -> Result<Session> {
        self.get("login").await
    }

    pub async fn logout(&self) -> Result<()> {
        self.execute(Method::GET, "logout").await
    }

    pub async fn api_version(&self) -> Result<Version> {
        self.get("api-version").await
    }

    // users

    pub async fn get_users(&self) -> Result<Users> {
        self.get("users").await
    }

    pub async fn get_user(&self, id: i64) -> Result<User> {
        self.get(&format!("users/{}", id)).await
    }

    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User> {
        self.post("users", request).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<()> {
        self.execute(Method::DELETE, &format!("users/{}", id)).await
    }

    // books, pages, lines and tokens

    pub async fn get_books(&self) -> Result<Books> {
        self.get("books").await
    }

    pub async fn get_book(&self, id: i64) -> Result<Book> {
        self.get(&format!("books/{}", id)).await
    }

    /// Uploads a zipped book; the metadata is sent as query parameters.
    pub async fn create_book(&self, book: &NewBook, archive: Vec<u8>) -> Result<Book> {
        let request = self
            .request(Method::POST, "books")
            .query(book)
            .header(header::CONTENT_TYPE, "application/zip")
            .body(archive);
        let response = Self::send(request).await?;
        Ok(response.json().await?)
    }

    /// Deletes a book, a page or a line.
    pub async fn delete_resource(&self, id: &ResourceId) -> Result<()> {
        let path = match *id {
            ResourceId::Book(book) => format!("books/{}", book),
            ResourceId::Page { book, page } => format!("books/{}/pages/{}", book, page),
            ResourceId::Line { book, page, line } => {
                format!("books/{}/pages/{}/lines/{}", book, page, line)
            }
            _ => return Err(Error::InvalidId(id.to_string())),
        };
        self.execute(Method::DELETE, &path).await
    }

    pub async fn get_page(&self, book: i64, page: PageRef) -> Result<Page> {
        let path = match page {
            PageRef::First => format!("books/{}/pages/first", book),
            PageRef::Last => format!("books/{}/pages/last", book),
            PageRef::Id(page) => format!("books/{}/pages/{}", book, page),
            PageRef::Relative(page, n) if n > 0 => {
                format!("books/{}/pages/{}/next/{}", book, page, n)
            }
            PageRef::Relative(page, n) if n < 0 => {
                format!("books/{}/pages/{}/prev/{}", book, page, -n)
            }
            PageRef::Relative(page, _) => format!("books/{}/pages/{}", book, page),
        };
        self.get(&path).await
    }

    fn line_path(book: i64, page: i64, line: i64) -> String {
        format!("books/{}/pages/{}/lines/{}", book, page, line)
    }

    fn token_path(book: i64, page: i64, line: i64, token: i64) -> String {
        format!("{}/tokens/{}", Self::line_path(book, page, line), token)
    }

    pub async fn get_line(&self, book: i64, page: i64, line: i64) -> Result<Line> {
        self.get(&Self::line_path(book, page, line)).await
    }

    pub async fn get_token(
        &self,
        book: i64,
        page: i64,
        line: i64,
        token: i64,
        len: Option<i64>,
    ) -> Result<Token> {
        let path = Self::token_path(book, page, line, token);
        match len {
            Some(len) => self.get_query(&path, &[("len", len)]).await,
            None => self.get(&path).await,
        }
    }

    pub async fn correct_line(
        &self,
        book: i64,
        page: i64,
        line: i64,
        typ: &str,
        correction: &str,
    ) -> Result<Line> {
        let request = self
            .request(Method::POST, &Self::line_path(book, page, line))
            .query(&[("t", typ)])
            .json(&CorrectionRequest { correction });
        Ok(Self::send(request).await?.json().await?)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn correct_token(
        &self,
        book: i64,
        page: i64,
        line: i64,
        token: i64,
        len: Option<i64>,
        typ: &str,
        correction: &str,
    ) -> Result<Token> {
        let mut query = vec![("t", typ.to_string())];
        if let Some(len) = len {
            query.push(("len", len.to_string()));
        }
        let request = self
            .request(Method::POST, &Self::token_path(book, page, line, token))
            .query(&query)
            .json(&CorrectionRequest { correction });
        Ok(Self::send(request).await?.json().await?)
    }

    pub async fn put_line_ocr(&self, book: i64, page: i64, line: i64, ocr: &PostOcr) -> Result<Line> {
        self.post(&format!("{}/ocr", Self::line_path(book, page, line)), ocr)
            .await
    }

    /// Downloads an image (page or line) by the path the server reports.
    pub async fn get_image(&self, img_file: &str) -> Result<Vec<u8>> {
        let response = Self::send(self.request_url(Method::GET, self.host_url(img_file)?)).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn raw(&self, path: &str) -> Result<Vec<u8>> {
        self.get_bytes(path).await
    }

    // search and archives

    pub async fn search(&self, book: i64, query: &SearchQuery, skip: i64) -> Result<SearchResults> {
        let mut params = vec![
            ("i", query.ignore_case.to_string()),
            ("max", query.max.to_string()),
            ("skip", skip.to_string()),
            ("type", query.search_type.clone()),
        ];
        params.extend(query.queries.iter().map(|q| ("q", q.clone())));
        self.get_query(&format!("books/{}/search", book), &params)
            .await
    }

    pub async fn download_book(&self, book: i64) -> Result<Vec<u8>> {
        let archive: ArchiveResponse = self.get(&format!("books/{}/download", book)).await?;
        self.get_zip(self.host_url(&archive.archive)?).await
    }

    pub async fn download_pool(&self, user: bool) -> Result<Vec<u8>> {
        self.get_zip(self.url(if user { "pool/user" } else { "pool/global" }))
            .await
    }

    // profiles, lexica and post-correction

    pub async fn get_profile(&self, book: i64) -> Result<Profile> {
        self.get(&format!("profile/books/{}", book)).await
    }

    pub async fn query_profile(&self, book: i64, queries: &[String]) -> Result<Suggestions> {
        let params: Vec<_> = queries.iter().map(|q| ("q", q.as_str())).collect();
        self.get_query(&format!("profile/books/{}", book), &params)
            .await
    }

    pub async fn get_patterns(&self, book: i64, ocr: bool, queries: &[String]) -> Result<PatternCounts> {
        let mut params = vec![("ocr", ocr.to_string())];
        params.extend(queries.iter().map(|q| ("q", q.clone())));
        self.get_query(&format!("profile/books/{}/patterns", book), &params)
            .await
    }

    pub async fn get_suspicious(&self, book: i64) -> Result<SuggestionCounts> {
        self.get(&format!("profile/books/{}/suspicious", book)).await
    }

    pub async fn get_adaptive_tokens(&self, book: i64) -> Result<AdaptiveTokens> {
        self.get(&format!("profile/books/{}/adaptive", book)).await
    }

    pub async fn get_extended_lexicon(&self, book: i64) -> Result<ExtendedLexicon> {
        self.get(&format!("el/books/{}", book)).await
    }

    pub async fn get_post_correction(&self, book: i64) -> Result<PostCorrection> {
        self.get(&format!("pc/books/{}", book)).await
    }

    pub async fn get_char_map(&self, book: i64, filter: &str) -> Result<CharMap> {
        self.get_query(&format!("books/{}/charmap", book), &[("filter", filter)])
            .await
    }

    pub async fn get_ocr_models(&self, book: i64) -> Result<OcrModels> {
        self.get(&format!("ocr/books/{}", book)).await
    }

    // jobs

    pub async fn start_job(&self, kind: &JobKind, book: i64) -> Result<Job> {
        let body = match kind {
            JobKind::Predict { model_id } => serde_json::json!({ "modelId": model_id }),
            _ => serde_json::json!({}),
        };
        self.post(&kind.path(book), &body).await
    }

    pub async fn get_job_status(&self, job_id: i64) -> Result<JobStatus> {
        self.get(&format!("jobs/{}", job_id)).await
    }

    // packages

    pub async fn split(&self, book: i64, request: &SplitRequest) -> Result<SplitPackages> {
        self.post(&format!("pkg/split/books/{}", book), request)
            .await
    }

    /// Assigns a package to `user`, or back to its original owner.
    pub async fn assign(&self, package: i64, user: Option<i64>) -> Result<()> {
        let path = match user {
            Some(user) => format!("pkg/assign/books/{}?assignto={}", package, user),
            None => format!("pkg/assign/books/{}", package),
        };
        self.execute(Method::GET, &path).await
    }

    pub async fn takeback(&self, book: i64) -> Result<()> {
        self.execute(Method::GET, &format!("pkg/takeback/books/{}", book))
            .await
    }
}
