//! File contents written by `bookpub new`.

use bookpub_config::{BookConfig, WatchFile};

pub fn book_config(name: &str) -> String {
    BookConfig::example_yaml(&title_from_name(name))
}

pub fn introduction(name: &str) -> String {
    format!(
        "# {}\n\n\
         Welcome to your new book. Every Markdown file in this directory is a\n\
         chapter; chapters are ordered by file name.\n\n\
         Run `bookpub dev` to preview while you write, and `bookpub build --type pdf`\n\
         for print.\n",
        title_from_name(name)
    )
}

pub fn stylesheet() -> &'static str {
    r#"body {
  font-family: Georgia, "Times New Roman", serif;
  line-height: 1.6;
  max-width: 40em;
  margin: 0 auto;
}

.chapter {
  page-break-before: always;
}

@page {
  size: A5;
  margin: 20mm 15mm;
}
"#
}

pub fn watch_config() -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(&WatchFile::sample())?;
    json.push('\n');
    Ok(json)
}

pub fn gitignore() -> &'static str {
    "build/\nnode_modules/\n.DS_Store\n"
}

/// `my-first_book` → `My First Book`
fn title_from_name(name: &str) -> String {
    name.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
