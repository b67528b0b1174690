/// Names that would clash with files the tool or common tooling writes.
const RESERVED_NAMES: &[&str] = &["manuscript", "build", "node_modules", "favicon.ico"];

/// Parse and validate a project name for `bookpub new`.
///
/// - Cannot be empty
/// - Must not start with `.` or a digit
/// - Letters, digits, `-` and `_` only
/// - Must not be a reserved name
///
/// # Examples
///
/// Valid names: my-book, field_notes, book2
/// Invalid names: .book, 2nd-edition, my book, build
pub fn parse_project_name(s: &str) -> Result<String, String> {
    let Some(first) = s.chars().next() else {
        return Err("Project name cannot be empty".to_string());
    };

    if first == '.' {
        return Err(format!("Project name cannot start with a dot: '{}'", s));
    }

    if first.is_ascii_digit() {
        return Err(format!("Project name cannot start with a number: '{}'", s));
    }

    if !s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(format!(
            "Project name can only contain letters, numbers, hyphens, and underscores: '{}'",
            s
        ));
    }

    if RESERVED_NAMES.contains(&s.to_lowercase().as_str()) {
        return Err(format!("Project name '{}' is reserved", s));
    }

    Ok(s.to_string())
}
