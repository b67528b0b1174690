use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bookpub_config::BookConfig;
use tokio::fs;

use super::BuildRequest;
use crate::error::BuildError;
use crate::walk;

/// Markup to HTML conversion.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Convert `request.manuscript` into `request.output_dir`, writing the
    /// entry file. `book` is `None` when the project has no usable config.
    async fn convert(
        &self,
        book: Option<&BookConfig>,
        request: &BuildRequest,
    ) -> Result<(), BuildError>;
}

const CHAPTER_EXTENSIONS: &[&str] = &["md", "markdown"];
const TEMPLATE_EXTENSIONS: &[&str] = &["ejs"];

/// Converts Markdown chapters into a single `index.html`.
///
/// Chapters are ordered by their path relative to the manuscript, so
/// `01-intro.md` comes before `02-setup.md`. Other files (stylesheets,
/// images) are copied into the output tree unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownConverter;

impl MarkdownConverter {
    pub fn new() -> Self {
        Self
    }

    /// GFM with raw HTML passed through; the manuscript is the author's own.
    fn render_chapter(&self, path: &Path, source: &str) -> Result<String, BuildError> {
        let mut options = markdown::Options::gfm();
        options.compile.allow_dangerous_html = true;

        markdown::to_html_with_options(source, &options).map_err(|e| {
            BuildError::Conversion {
                file: path.to_path_buf(),
                message: e.to_string(),
            }
        })
    }
}

#[async_trait]
impl Converter for MarkdownConverter {
    async fn convert(
        &self,
        book: Option<&BookConfig>,
        request: &BuildRequest,
    ) -> Result<(), BuildError> {
        let manuscript = &request.manuscript;
        if !fs::try_exists(manuscript).await.unwrap_or(false) {
            return Err(BuildError::ManuscriptNotFound(manuscript.clone()));
        }

        let files = collect_files(manuscript)?;
        let (chapters, assets): (Vec<_>, Vec<_>) = files
            .into_iter()
            .filter(|rel| !has_extension(rel, TEMPLATE_EXTENSIONS))
            .partition(|rel| has_extension(rel, CHAPTER_EXTENSIONS));

        if chapters.is_empty() {
            return Err(BuildError::EmptyManuscript(manuscript.clone()));
        }

        fs::create_dir_all(&request.output_dir)
            .await
            .map_err(|e| write_failed(&request.output_dir, e))?;

        let mut sections = Vec::with_capacity(chapters.len());
        for rel in &chapters {
            let path = manuscript.join(rel);
            let source = fs::read_to_string(&path)
                .await
                .map_err(|e| BuildError::Conversion {
                    file: path.clone(),
                    message: e.to_string(),
                })?;
            let body = self.render_chapter(&path, &source)?;
            tracing::debug!(chapter = %rel.display(), "converted");
            sections.push((chapter_id(rel), body));
        }

        for rel in &assets {
            let target = request.output_dir.join(rel);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| write_failed(parent, e))?;
            }
            fs::copy(manuscript.join(rel), &target)
                .await
                .map_err(|e| write_failed(&target, e))?;
        }

        let stylesheets: Vec<PathBuf> = match book {
            Some(book) if !book.stylesheets.is_empty() => book.stylesheets.clone(),
            _ => assets
                .iter()
                .filter(|rel| has_extension(rel, &["css"]))
                .cloned()
                .collect(),
        };

        let fallback = BookConfig::default();
        let html = render_document(book.unwrap_or(&fallback), &stylesheets, &sections);
        let entry = request.entry_file();
        fs::write(&entry, html)
            .await
            .map_err(|e| write_failed(&entry, e))?;

        tracing::info!(
            chapters = chapters.len(),
            assets = assets.len(),
            output = %request.output_dir.display(),
            "conversion finished"
        );
        Ok(())
    }
}

/// Manuscript files relative to `root`, in path order.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let files = walk::files_under(root).map_err(|e| BuildError::Conversion {
        file: e.path().unwrap_or(root).to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(files
        .into_iter()
        .filter_map(|path| path.strip_prefix(root).ok().map(Path::to_path_buf))
        .collect())
}

fn has_extension(path: &Path, exts: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| exts.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

fn chapter_id(rel: &Path) -> String {
    rel.with_extension("")
        .to_string_lossy()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect()
}

fn render_document(book: &BookConfig, stylesheets: &[PathBuf], sections: &[(String, String)]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n");
    html.push_str(&format!("<html lang=\"{}\">\n<head>\n", escape(&book.language)));
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(&book.title)));
    if let Some(author) = &book.author {
        html.push_str(&format!("<meta name=\"author\" content=\"{}\">\n", escape(author)));
    }
    if let Some(description) = &book.description {
        html.push_str(&format!(
            "<meta name=\"description\" content=\"{}\">\n",
            escape(description)
        ));
    }
    for sheet in stylesheets {
        // URLs use forward slashes on every platform
        let href = sheet.to_string_lossy().replace('\\', "/");
        html.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\">\n", escape(&href)));
    }
    html.push_str("</head>\n<body>\n");

    html.push_str("<header class=\"title-page\">\n");
    html.push_str(&format!("<h1 class=\"book-title\">{}</h1>\n", escape(&book.title)));
    if let Some(subtitle) = &book.subtitle {
        html.push_str(&format!("<p class=\"book-subtitle\">{}</p>\n", escape(subtitle)));
    }
    if let Some(author) = &book.author {
        html.push_str(&format!("<p class=\"book-author\">{}</p>\n", escape(author)));
    }
    html.push_str("</header>\n");

    for (id, body) in sections {
        html.push_str(&format!("<section class=\"chapter\" id=\"{id}\">\n"));
        html.push_str(body);
        html.push_str("\n</section>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn write_failed(path: &Path, e: std::io::Error) -> BuildError {
    BuildError::WriteFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}
