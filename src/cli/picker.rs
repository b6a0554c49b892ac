//! Data file discovery and the interactive picker.
//!
//! Discovery is shared by `ov fit --pick` (numbered text prompt) and the
//! dashboard, which cycles through the same list with `o` in place of an
//! upload widget. CSV files and workbooks under the current directory are
//! listed.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::io::ingest::WORKBOOK_EXTENSIONS;

/// Default directory recursion depth for finding data files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Prompt the user to select a data file from the current directory tree.
///
/// Accepts a number from the list or an explicit path; `q` cancels.
pub fn prompt_for_data_path() -> Result<PathBuf, AppError> {
    let files = discover_data_files();
    if files.is_empty() {
        return Err(AppError::new(
            2,
            "No .csv or spreadsheet files found. Provide one with `ov fit -f <file.csv>`.",
        ));
    }

    eprintln!("Found {} data file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        eprintln!("{:>3}) {}", idx + 1, pretty_path(path));
    }

    let stdin = io::stdin();
    loop {
        eprint!("Select a file (1-{}) or type a path (q to quit): ", files.len());
        io::stderr()
            .flush()
            .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = stdin
            .read_line(&mut input)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(AppError::new(2, "No input received."));
        }

        match resolve_choice(input.trim(), &files) {
            Choice::Quit => return Err(AppError::new(2, "Canceled.")),
            Choice::Path(path) => match validate_data_path(&path) {
                Ok(path) => return Ok(path),
                Err(err) => eprintln!("{err}"),
            },
            Choice::OutOfRange(n) => {
                eprintln!("Invalid choice: {n}. Enter a number between 1 and {}.", files.len());
            }
        }
    }
}

#[derive(Debug, PartialEq)]
enum Choice {
    Quit,
    Path(PathBuf),
    OutOfRange(usize),
}

fn resolve_choice(input: &str, files: &[PathBuf]) -> Choice {
    if input.eq_ignore_ascii_case("q") {
        return Choice::Quit;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=files.len()).contains(&n) => Choice::Path(files[n - 1].clone()),
        Ok(n) => Choice::OutOfRange(n),
        Err(_) => Choice::Path(PathBuf::from(input)),
    }
}

/// Check that `path` names an existing `.csv` or workbook file.
pub fn validate_data_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(2, format!("Data file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    if !has_data_extension(path) {
        return Err(AppError::new(
            2,
            format!("Expected a .csv or spreadsheet file (got: {}).", path.display()),
        ));
    }
    Ok(path.to_path_buf())
}

/// Discover data files under the current directory (deterministic order).
pub fn discover_data_files() -> Vec<PathBuf> {
    find_data_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

fn find_data_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    walk(root, 0, max_depth, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn walk(dir: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                walk(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && has_data_extension(&path) {
            out.push(path);
        }
    }
}

fn has_data_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ext.eq_ignore_ascii_case("csv")
                || WORKBOOK_EXTENSIONS.iter().any(|w| ext.eq_ignore_ascii_case(w))
        })
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    name.starts_with('.') || matches!(name, "target" | "node_modules")
}

/// Path as shown to the user (no leading `./`).
pub fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ov-picker-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn finds_data_files_sorted_and_skips_hidden_dirs() {
        let dir = scratch_dir("find");
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::create_dir_all(dir.join(".git")).unwrap();
        fs::write(dir.join("b.csv"), "x,y\n").unwrap();
        fs::write(dir.join("sub/a.CSV"), "x,y\n").unwrap();
        fs::write(dir.join(".git/c.csv"), "x,y\n").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();
        fs::write(dir.join("sub/units.xlsx"), "").unwrap();

        let found = find_data_files(&dir, 4);
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b.csv", "a.CSV", "units.xlsx"]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn validate_rejects_missing_and_wrong_extension() {
        let dir = scratch_dir("validate");
        let txt = dir.join("data.txt");
        fs::write(&txt, "x,y\n").unwrap();

        assert_eq!(validate_data_path(&dir.join("nope.csv")).unwrap_err().exit_code(), 2);
        assert!(validate_data_path(&txt).is_err());
        assert!(validate_data_path(&dir).is_err());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn choices_resolve() {
        let files = vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")];
        assert_eq!(resolve_choice("Q", &files), Choice::Quit);
        assert_eq!(resolve_choice("2", &files), Choice::Path(PathBuf::from("b.csv")));
        assert_eq!(resolve_choice("3", &files), Choice::OutOfRange(3));
        assert_eq!(resolve_choice("x.csv", &files), Choice::Path(PathBuf::from("x.csv")));
    }
}
