use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Appends one line to the note file, creating it (and its directory) on
/// first use. Plain file I/O on purpose; the text is never interpolated into
/// a shell command.
pub fn append_note(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", text.trim_end_matches('\n'))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn appends_one_line_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.text");
        append_note(&path, "first").unwrap();
        append_note(&path, "second\n").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/note.text");
        append_note(&path, "hello").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
