/// Trims surrounding whitespace from a line of `git` output.
pub fn clean_line(line: &str) -> &str {
    line.trim()
}

/// Old and new paths of a rename or copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPath {
    pub old_path: String,
    pub new_path: String,
}

/// Expands git's `prefix/{old => new}/suffix` shorthand into full paths.
///
/// `old` is the text left of ` => ` and `new` the text right of it. Only the
/// braced segment differs between the two paths. A side without braces is used
/// as is, and an empty braced segment collapses the doubled separator.
pub fn split_old_new_file(old: &str, new: &str) -> SplitPath {
    let (prefix, old_mid) = match old.split_once('{') {
        Some((prefix, mid)) => (prefix, mid),
        None => ("", old),
    };
    let (new_mid, suffix) = match new.split_once('}') {
        Some((mid, suffix)) => (mid, suffix),
        None => (new, ""),
    };

    SplitPath {
        old_path: collapse_separators(&format!("{prefix}{old_mid}{suffix}")),
        new_path: collapse_separators(&format!("{prefix}{new_mid}{suffix}")),
    }
}

fn collapse_separators(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for ch in path.chars() {
        if ch == '/' && out.ends_with('/') {
            continue;
        }
        out.push(ch);
    }
    out.trim().to_string()
}

/// Returns the chunk index if `name` looks like `<digits>.json`.
pub fn chunk_index(name: &str) -> Option<usize> {
    let stem = name.strip_suffix(".json")?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}
