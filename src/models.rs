use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub institute: String,
    pub admin: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Users {
    pub users: Vec<User>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    pub user: User,
    pub auth: String,
    pub expires: i64,
}

#[derive(Debug, Serialize, Clone)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize, Clone)]
pub struct CreateUserRequest {
    pub user: User,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Version {
    pub version: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Book {
    pub book_id: i64,
    pub project_id: i64,
    pub author: String,
    pub title: String,
    pub description: String,
    pub year: i32,
    pub language: String,
    pub profiler_url: String,
    pub page_ids: Vec<i64>,
    pub is_book: bool,
    pub status: BTreeMap<String, bool>,
}

impl Book {
    /// Three character summary of the book's status flags, e.g. `pe-`.
    pub fn status_string(&self) -> String {
        let flag = |key: &str, c: char| {
            if self.status.get(key).copied().unwrap_or(false) {
                c
            } else {
                '-'
            }
        };
        [
            flag("profiled", 'p'),
            flag("extended-lexicon", 'e'),
            flag("post-corrected", 'c'),
        ]
        .iter()
        .collect()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Books {
    pub books: Vec<Book>,
}

/// Metadata passed as query parameters when uploading a new book.
#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub author: String,
    pub title: String,
    pub language: String,
    pub description: String,
    pub hist_patterns: String,
    pub profiler_url: String,
    pub year: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Token {
    pub project_id: i64,
    pub book_id: i64,
    pub page_id: i64,
    pub line_id: i64,
    pub token_id: i64,
    pub offset: usize,
    pub ocr: String,
    pub cor: String,
    pub is_manually_corrected: bool,
    pub is_automatically_corrected: bool,
    pub is_match: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Line {
    pub project_id: i64,
    pub book_id: i64,
    pub page_id: i64,
    pub line_id: i64,
    pub img_file: String,
    pub ocr: String,
    pub cor: String,
    pub cuts: Vec<i64>,
    pub confidences: Vec<f64>,
    pub is_manually_corrected: bool,
    pub is_automatically_corrected: bool,
    pub tokens: Vec<Token>,
}

impl Line {
    pub fn id(&self) -> String {
        format!("{}:{}:{}", self.project_id, self.page_id, self.line_id)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Page {
    pub project_id: i64,
    pub book_id: i64,
    pub page_id: i64,
    pub prev_page_id: i64,
    pub next_page_id: i64,
    pub img_file: String,
    pub lines: Vec<Line>,
}

#[derive(Debug, Serialize, Clone)]
pub struct CorrectionRequest<'a> {
    pub correction: &'a str,
}

/// OCR data uploaded for a single line snippet.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostOcr {
    pub ocr: String,
    pub cuts: Vec<i64>,
    pub confidences: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SearchMatch {
    pub lines: Vec<Line>,
    pub total: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResults {
    pub book_id: i64,
    pub project_id: i64,
    #[serde(rename = "type")]
    pub search_type: String,
    pub skip: i64,
    pub max: i64,
    pub matches: BTreeMap<String, SearchMatch>,
}

impl SearchResults {
    pub fn has_matches(&self) -> bool {
        self.matches.values().any(|m| !m.lines.is_empty())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Suggestion {
    pub token: String,
    pub suggestion: String,
    pub modern: String,
    pub dict: String,
    pub hist_patterns: Vec<String>,
    pub ocr_patterns: Vec<String>,
    pub distance: i32,
    pub weight: f64,
    pub top: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Suggestions {
    pub book_id: i64,
    pub project_id: i64,
    pub suggestions: BTreeMap<String, Vec<Suggestion>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SuggestionCounts {
    pub book_id: i64,
    pub project_id: i64,
    pub counts: BTreeMap<String, u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PatternCounts {
    pub book_id: i64,
    pub project_id: i64,
    pub ocr: bool,
    pub counts: BTreeMap<String, u64>,
}

/// Rewrite pattern as reported by the profiler.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct Pattern {
    pub left: String,
    pub right: String,
    pub pos: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct Candidate {
    pub suggestion: String,
    pub modern: String,
    pub dict: String,
    pub hist_patterns: Vec<Pattern>,
    #[serde(rename = "OCRPatterns")]
    pub ocr_patterns: Vec<Pattern>,
    pub distance: i32,
    pub weight: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct Interpretation {
    pub n: i64,
    #[serde(rename = "OCR")]
    pub ocr: String,
    pub candidates: Vec<Candidate>,
}

/// Full profile of a book keyed by the OCR token.
pub type Profile = BTreeMap<String, Interpretation>;

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AdaptiveTokens {
    pub book_id: i64,
    pub project_id: i64,
    pub adaptive_tokens: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtendedLexicon {
    pub book_id: i64,
    pub project_id: i64,
    pub yes: BTreeMap<String, u64>,
    pub no: BTreeMap<String, u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PostCorrectionToken {
    pub page_id: i64,
    pub line_id: i64,
    pub token_id: i64,
    pub ocr: String,
    pub cor: String,
    pub confidence: f64,
    pub taken: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PostCorrection {
    pub book_id: i64,
    pub project_id: i64,
    pub corrections: BTreeMap<String, PostCorrectionToken>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CharMap {
    pub book_id: i64,
    pub project_id: i64,
    pub char_map: BTreeMap<String, u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct OcrModel {
    pub id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct OcrModels {
    pub models: Vec<OcrModel>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SplitRequest {
    pub user_ids: Vec<i64>,
    pub random: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Package {
    pub project_id: i64,
    pub owner: i64,
    pub page_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SplitPackages {
    pub book_id: i64,
    pub packages: Vec<Package>,
}

/// Body of the archive endpoint; `archive` is a path relative to the host.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ArchiveResponse {
    pub archive: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// No job was ever started for the book.
    #[default]
    Empty,
    Queued,
    Running,
    Done,
    Failed,
}

impl JobState {
    pub fn is_active(&self) -> bool {
        matches!(self, JobState::Queued | JobState::Running)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct JobStatus {
    pub job_id: i64,
    pub book_id: i64,
    #[serde(rename = "statusName")]
    pub status: JobState,
    pub timestamp: i64,
}

/// Returned by the server when a job was submitted.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Job {
    pub id: i64,
}
