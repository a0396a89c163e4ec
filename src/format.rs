//! Rendering of API responses as tab separated text, JSON or templates.

use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use crate::error::Result;
use crate::models::{
    AdaptiveTokens, Book, Books, CharMap, ExtendedLexicon, JobStatus, Line, OcrModels, Page,
    PatternCounts, Pattern, PostCorrection, Profile, SearchResults, Session, SplitPackages,
    SuggestionCounts, Suggestions, Token, User, Users, Version,
};
use crate::utils::{sanitize_field, sanitize_text};

/// Every value a command can hand to the formatter.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Response {
    Session(Session),
    Version(Version),
    User(User),
    Users(Users),
    Book(Book),
    Books(Books),
    Page(Page),
    Line(Line),
    Token(Token),
    SearchResults(SearchResults),
    Suggestions(Suggestions),
    SuggestionCounts(SuggestionCounts),
    PatternCounts(PatternCounts),
    Profile(Profile),
    AdaptiveTokens(AdaptiveTokens),
    ExtendedLexicon(ExtendedLexicon),
    PostCorrection(PostCorrection),
    CharMap(CharMap),
    OcrModels(OcrModels),
    SplitPackages(SplitPackages),
    JobStatus(JobStatus),
}

macro_rules! impl_from_response {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Response {
                fn from(value: $variant) -> Self {
                    Response::$variant(value)
                }
            }
        )*
    };
}

impl_from_response!(
    Session,
    Version,
    User,
    Users,
    Book,
    Books,
    Page,
    Line,
    Token,
    SearchResults,
    Suggestions,
    SuggestionCounts,
    PatternCounts,
    AdaptiveTokens,
    ExtendedLexicon,
    PostCorrection,
    CharMap,
    OcrModels,
    SplitPackages,
    JobStatus,
    Profile,
);

/// Exactly one output mode is active per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Default,
    Json,
    Template(String),
}

impl OutputMode {
    /// `--json` takes precedence over `--format`.
    pub fn from_flags(json: bool, template: Option<&str>) -> Self {
        match (json, template) {
            (true, _) => OutputMode::Json,
            (false, Some(t)) if !t.is_empty() => OutputMode::Template(t.to_string()),
            _ => OutputMode::Default,
        }
    }
}

/// Switches for the default rendering of lines and tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatOptions {
    /// Print tokens instead of whole lines.
    pub words: bool,
    /// Also print the OCR text.
    pub ocr: bool,
    /// Do not print the corrected text.
    pub no_cor: bool,
    /// Only print manually corrected lines and tokens.
    pub only_manual: bool,
    pub color: bool,
}

pub struct Formatter<W> {
    out: W,
    mode: OutputMode,
    options: FormatOptions,
}

impl<W: Write> Formatter<W> {
    pub fn new(out: W, mode: OutputMode, options: FormatOptions) -> Self {
        Formatter { out, mode, options }
    }

    pub fn mode(&self) -> &OutputMode {
        &self.mode
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes a batch of responses. JSON and template output treat a single
    /// response as a value and several responses as a list.
    pub fn write(&mut self, responses: &[Response]) -> Result<()> {
        match self.mode.clone() {
            OutputMode::Json => {
                match responses {
                    [single] => serde_json::to_writer(&mut self.out, single)?,
                    many => serde_json::to_writer(&mut self.out, many)?,
                }
                writeln!(self.out)?;
            }
            OutputMode::Template(template) => {
                let rendered = match responses {
                    [single] => render_template(&template, single)?,
                    many => render_template(&template, &many)?,
                };
                self.out.write_all(rendered.as_bytes())?;
            }
            OutputMode::Default => {
                for response in responses {
                    self.write_default(response)?;
                }
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn write_default(&mut self, response: &Response) -> Result<()> {
        match response {
            Response::Session(s) => self.session(s),
            Response::Version(v) => self.row(&[v.version.clone()]),
            Response::User(u) => self.user(u),
            Response::Users(users) => users.users.iter().try_for_each(|u| self.user(u)),
            Response::Book(b) => self.book(b),
            Response::Books(books) => books.books.iter().try_for_each(|b| self.book(b)),
            Response::Page(p) => self.page(p),
            Response::Line(l) => self.line(l),
            Response::Token(t) => self.token(t),
            Response::SearchResults(r) => self.search_results(r),
            Response::Suggestions(s) => self.suggestions(s),
            Response::SuggestionCounts(c) => c.counts.iter().try_for_each(|(token, n)| {
                self.row(&[
                    c.book_id.to_string(),
                    c.project_id.to_string(),
                    sanitize_field(token),
                    n.to_string(),
                ])
            }),
            Response::PatternCounts(c) => c.counts.iter().try_for_each(|(pattern, n)| {
                self.row(&[
                    c.book_id.to_string(),
                    c.project_id.to_string(),
                    sanitize_field(pattern),
                    n.to_string(),
                    c.ocr.to_string(),
                ])
            }),
            Response::Profile(p) => self.profile(p),
            Response::AdaptiveTokens(a) => self.adaptive_tokens(a),
            Response::ExtendedLexicon(el) => self.extended_lexicon(el),
            Response::PostCorrection(pc) => self.post_correction(pc),
            Response::CharMap(c) => c.char_map.iter().try_for_each(|(chr, n)| {
                self.row(&[
                    c.book_id.to_string(),
                    c.project_id.to_string(),
                    sanitize_field(chr),
                    n.to_string(),
                ])
            }),
            Response::OcrModels(m) => m.models.iter().try_for_each(|model| {
                self.row(&[
                    model.id.to_string(),
                    sanitize_field(&model.name),
                    sanitize_field(&model.description),
                ])
            }),
            Response::SplitPackages(s) => self.split_packages(s),
            Response::JobStatus(j) => self.row(&[
                j.job_id.to_string(),
                j.book_id.to_string(),
                format!("{:?}", j.status).to_lowercase(),
                rfc3339(j.timestamp),
            ]),
        }
    }

    fn row(&mut self, fields: &[String]) -> Result<()> {
        writeln!(self.out, "{}", fields.join("\t"))?;
        Ok(())
    }

    fn session(&mut self, s: &Session) -> Result<()> {
        self.row(&[
            s.user.id.to_string(),
            sanitize_field(&s.user.email),
            sanitize_field(&s.user.name),
            s.auth.clone(),
            rfc3339(s.expires),
        ])
    }

    fn user(&mut self, u: &User) -> Result<()> {
        self.row(&[
            u.id.to_string(),
            sanitize_field(&u.name),
            sanitize_field(&u.email),
            sanitize_field(&u.institute),
            u.admin.to_string(),
        ])
    }

    fn book(&mut self, b: &Book) -> Result<()> {
        self.row(&[
            b.book_id.to_string(),
            b.project_id.to_string(),
            sanitize_field(&b.author),
            sanitize_field(&b.title),
            b.page_ids.len().to_string(),
            if b.is_book { "B" } else { "P" }.to_string(),
            b.status_string(),
            b.year.to_string(),
            sanitize_field(&b.language),
            sanitize_field(&b.profiler_url),
            sanitize_field(&b.description),
        ])
    }

    fn page(&mut self, p: &Page) -> Result<()> {
        p.lines.iter().try_for_each(|l| self.line(l))
    }

    fn line(&mut self, l: &Line) -> Result<()> {
        if self.options.only_manual && !l.is_manually_corrected {
            return Ok(());
        }
        if self.options.words {
            return l.tokens.iter().try_for_each(|t| self.token(t));
        }
        let id = l.id();
        if !self.options.no_cor {
            let text = if l.tokens.is_empty() {
                sanitize_text(&l.cor)
            } else {
                l.tokens
                    .iter()
                    .map(|t| self.colored(t))
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            writeln!(self.out, "{}\t{}", id, text)?;
        }
        if self.options.ocr {
            let text = if l.tokens.is_empty() {
                l.ocr.clone()
            } else {
                l.tokens
                    .iter()
                    .map(|t| t.ocr.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            writeln!(self.out, "{}\t{}", id, sanitize_text(&text))?;
        }
        Ok(())
    }

    fn token(&mut self, t: &Token) -> Result<()> {
        if self.options.only_manual && !t.is_manually_corrected {
            return Ok(());
        }
        let id = format!("{}:{}:{}:{}", t.project_id, t.page_id, t.line_id, t.token_id);
        if !self.options.no_cor {
            let text = self.colored(t);
            writeln!(self.out, "{}\t{}", id, text)?;
        }
        if self.options.ocr {
            writeln!(self.out, "{}\t{}", id, sanitize_text(&t.ocr))?;
        }
        Ok(())
    }

    /// Corrected token text; matches are red, manual corrections green and
    /// automatic corrections yellow.
    fn colored(&self, t: &Token) -> String {
        let text = sanitize_text(&t.cor);
        if !self.options.color {
            return text;
        }
        if t.is_match {
            text.red().to_string()
        } else if t.is_manually_corrected {
            text.green().to_string()
        } else if t.is_automatically_corrected {
            text.yellow().to_string()
        } else {
            text
        }
    }

    fn search_results(&mut self, r: &SearchResults) -> Result<()> {
        for m in r.matches.values() {
            for line in &m.lines {
                if !self.options.words {
                    self.line(line)?;
                    continue;
                }
                // each printed token is a match, so drop the match highlight
                for token in line.tokens.iter().filter(|t| t.is_match) {
                    let token = Token {
                        is_match: false,
                        ..token.clone()
                    };
                    self.token(&token)?;
                }
            }
        }
        Ok(())
    }

    fn suggestions(&mut self, s: &Suggestions) -> Result<()> {
        for suggestion in s.suggestions.values().flatten() {
            self.row(&[
                s.project_id.to_string(),
                sanitize_field(&suggestion.token),
                sanitize_field(&suggestion.suggestion),
                sanitize_field(&suggestion.modern),
                join_patterns(&suggestion.hist_patterns),
                join_patterns(&suggestion.ocr_patterns),
                sanitize_field(&suggestion.dict),
                suggestion.distance.to_string(),
                format!("{:.6}", suggestion.weight),
                suggestion.top.to_string(),
            ])?;
        }
        Ok(())
    }

    fn profile(&mut self, p: &Profile) -> Result<()> {
        for (token, interpretation) in p {
            for (i, c) in interpretation.candidates.iter().enumerate() {
                self.row(&[
                    sanitize_field(token),
                    sanitize_field(&c.suggestion),
                    sanitize_field(&c.modern),
                    join_patterns(&pattern_strings(&c.hist_patterns)),
                    join_patterns(&pattern_strings(&c.ocr_patterns)),
                    sanitize_field(&c.dict),
                    c.distance.to_string(),
                    format!("{:.6}", c.weight),
                    (i == 0).to_string(),
                ])?;
            }
        }
        Ok(())
    }

    fn adaptive_tokens(&mut self, a: &AdaptiveTokens) -> Result<()> {
        for token in &a.adaptive_tokens {
            self.row(&[
                a.book_id.to_string(),
                a.project_id.to_string(),
                sanitize_field(token),
            ])?;
        }
        Ok(())
    }

    fn extended_lexicon(&mut self, el: &ExtendedLexicon) -> Result<()> {
        let entries = el
            .yes
            .iter()
            .map(|e| (e, true))
            .chain(el.no.iter().map(|e| (e, false)));
        for ((entry, n), taken) in entries {
            self.row(&[
                el.book_id.to_string(),
                el.project_id.to_string(),
                sanitize_field(entry),
                n.to_string(),
                taken.to_string(),
            ])?;
        }
        Ok(())
    }

    fn post_correction(&mut self, pc: &PostCorrection) -> Result<()> {
        for t in pc.corrections.values() {
            self.row(&[
                format!("{}:{}:{}:{}", pc.book_id, t.page_id, t.line_id, t.token_id),
                sanitize_field(&t.ocr),
                sanitize_field(&t.cor),
                format!("{:.6}", t.confidence),
                t.taken.to_string(),
            ])?;
        }
        Ok(())
    }

    fn split_packages(&mut self, s: &SplitPackages) -> Result<()> {
        for p in &s.packages {
            let pages: Vec<String> = p.page_ids.iter().map(|id| id.to_string()).collect();
            self.row(&[
                s.book_id.to_string(),
                p.project_id.to_string(),
                p.owner.to_string(),
                pages.join(","),
            ])?;
        }
        Ok(())
    }
}

fn rfc3339(epoch: i64) -> String {
    chrono::DateTime::from_timestamp(epoch, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| epoch.to_string())
}

fn pattern_strings(patterns: &[Pattern]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| format!("{}:{}:{}", p.left, p.right, p.pos))
        .collect()
}

/// An empty pattern list is printed as `::`.
fn join_patterns(patterns: &[String]) -> String {
    if patterns.is_empty() {
        return "::".to_string();
    }
    sanitize_field(&patterns.join(","))
}

/// Renders a user template against `value`. A literal `\n` in the template
/// stands for a newline. Object fields are available as top level
/// variables; the whole value is available as `data`.
pub fn render_template<T: Serialize + ?Sized>(template: &str, value: &T) -> Result<String> {
    let value = serde_json::to_value(value)?;
    let mut ctx = match &value {
        serde_json::Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    ctx.insert("data".to_string(), value);
    let mut env = minijinja::Environment::new();
    env.set_keep_trailing_newline(true);
    let source = template.replace("\\n", "\n");
    Ok(env.render_str(&source, ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(mode: OutputMode, options: FormatOptions, responses: &[Response]) -> String {
        let mut f = Formatter::new(Vec::new(), mode, options);
        f.write(responses).unwrap();
        String::from_utf8(f.into_inner()).unwrap()
    }

    fn token(id: i64, cor: &str, manual: bool, is_match: bool) -> Token {
        Token {
            project_id: 1,
            page_id: 2,
            line_id: 3,
            token_id: id,
            cor: cor.to_string(),
            ocr: cor.to_uppercase(),
            is_manually_corrected: manual,
            is_match,
            ..Token::default()
        }
    }

    fn line() -> Line {
        Line {
            project_id: 1,
            page_id: 2,
            line_id: 3,
            cor: "foo bar".to_string(),
            ocr: "FOO BAR".to_string(),
            is_manually_corrected: true,
            tokens: vec![token(1, "foo", true, false), token(2, "bar", false, true)],
            ..Line::default()
        }
    }

    #[test]
    fn test_output_mode_from_flags() {
        assert_eq!(OutputMode::from_flags(true, Some("{{x}}")), OutputMode::Json);
        assert_eq!(
            OutputMode::from_flags(false, Some("{{x}}")),
            OutputMode::Template("{{x}}".to_string())
        );
        assert_eq!(OutputMode::from_flags(false, Some("")), OutputMode::Default);
        assert_eq!(OutputMode::from_flags(false, None), OutputMode::Default);
    }

    #[test]
    fn test_line_default_and_ocr() {
        let options = FormatOptions {
            ocr: true,
            ..FormatOptions::default()
        };
        let out = render(OutputMode::Default, options, &[line().into()]);
        assert_eq!(out, "1:2:3\tfoo bar\n1:2:3\tFOO BAR\n");
    }

    #[test]
    fn test_line_words_only_manual() {
        let options = FormatOptions {
            words: true,
            only_manual: true,
            ..FormatOptions::default()
        };
        let out = render(OutputMode::Default, options, &[line().into()]);
        assert_eq!(out, "1:2:3:1\tfoo\n");
    }

    #[test]
    fn test_search_results_words_prints_matches() {
        let mut results = SearchResults::default();
        results.matches.insert(
            "bar".to_string(),
            crate::models::SearchMatch {
                lines: vec![line()],
                total: 1,
            },
        );
        let options = FormatOptions {
            words: true,
            ..FormatOptions::default()
        };
        let out = render(OutputMode::Default, options, &[results.into()]);
        assert_eq!(out, "1:2:3:2\tbar\n");
    }

    #[test]
    fn test_colored_tokens() {
        colored::control::set_override(true);
        let options = FormatOptions {
            color: true,
            ..FormatOptions::default()
        };
        let out = render(OutputMode::Default, options, &[token(2, "bar", false, true).into()]);
        assert!(out.contains("\u{1b}[31mbar"));
    }

    #[test]
    fn test_extended_lexicon_rows() {
        let mut el = ExtendedLexicon {
            book_id: 4,
            project_id: 4,
            ..ExtendedLexicon::default()
        };
        el.yes.insert("vnd".to_string(), 3);
        el.no.insert("xyz".to_string(), 1);
        let out = render(OutputMode::Default, FormatOptions::default(), &[el.into()]);
        assert_eq!(out, "4\t4\tvnd\t3\ttrue\n4\t4\txyz\t1\tfalse\n");
    }

    #[test]
    fn test_session_row() {
        let session = Session {
            user: User {
                id: 1,
                name: "Jane Doe".to_string(),
                email: "jane@example.org".to_string(),
                ..User::default()
            },
            auth: "abc".to_string(),
            expires: 0,
        };
        let out = render(OutputMode::Default, FormatOptions::default(), &[session.into()]);
        assert_eq!(out, "1\tjane@example.org\tJane_Doe\tabc\t1970-01-01T00:00:00+00:00\n");
    }

    #[test]
    fn test_json_multiple_values_is_array() {
        let out = render(
            OutputMode::Json,
            FormatOptions::default(),
            &[
                Version { version: "1.0".to_string() }.into(),
                Version { version: "2.0".to_string() }.into(),
            ],
        );
        assert_eq!(out, "[{\"version\":\"1.0\"},{\"version\":\"2.0\"}]\n");
    }

    #[test]
    fn test_template_object_fields_and_newline() {
        let out = render(
            OutputMode::Template("v={{ version }}\\n".to_string()),
            FormatOptions::default(),
            &[Version { version: "1.0".to_string() }.into()],
        );
        assert_eq!(out, "v=1.0\n");
    }

    #[test]
    fn test_template_list_via_data() {
        let out = render(
            OutputMode::Template("{% for v in data %}{{ v.version }};{% endfor %}".to_string()),
            FormatOptions::default(),
            &[
                Version { version: "1".to_string() }.into(),
                Version { version: "2".to_string() }.into(),
            ],
        );
        assert_eq!(out, "1;2;");
    }

    #[test]
    fn test_invalid_template() {
        let mut f = Formatter::new(
            Vec::new(),
            OutputMode::Template("{{ unclosed".to_string()),
            FormatOptions::default(),
        );
        let err = f.write(&[Version::default().into()]).unwrap_err();
        assert!(err.to_string().starts_with("invalid format string"));
    }
}
