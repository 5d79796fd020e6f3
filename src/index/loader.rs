//! Line-delimited index file loader

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::types::{WebIndex, WebIndexItem};

use super::IndexError;

/// Load the whole web index from `path`.
///
/// Blank lines are skipped. The first malformed record aborts the load.
pub fn load_index(path: &Path) -> Result<WebIndex, IndexError> {
    debug!("Loading the web index from {}", path.display());
    let start = Instant::now();

    let file = File::open(path).map_err(|source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let index = read_index(BufReader::new(file), path)?;

    info!(
        "Web index loaded: {} items from {} in {:?}",
        index.len(),
        path.display(),
        start.elapsed()
    );
    Ok(index)
}

/// Read index records from any buffered reader. `path` is only used in errors.
pub fn read_index<R: BufRead>(reader: R, path: &Path) -> Result<WebIndex, IndexError> {
    let mut items = Vec::new();

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let item = WebIndexItem::from_json_line(&line).map_err(|source| IndexError::Record {
            line: line_idx + 1,
            source,
        })?;
        items.push(item);
    }

    Ok(WebIndex::new(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::RecordError;
    use std::io::{Cursor, Write};

    const PAGE_A: &str = r#"{"final_url":"https://a.example","title":"A","headings":{"h1":["Alpha"]},"description":"","keywords":"","author":"","content_snippet":"alpha","content_snippet_quality":1.0,"image_alts":"","link_texts":""}"#;
    const PAGE_B: &str = r#"{"final_url":"https://b.example","title":"B","headings":{},"description":"beta","keywords":"","author":"","content_snippet":"","content_snippet_quality":0,"image_alts":"","link_texts":""}"#;

    #[test]
    fn reads_records_in_order_and_skips_blank_lines() {
        let data = format!("{}\n\n{}\n", PAGE_A, PAGE_B);
        let index = read_index(Cursor::new(data), Path::new("mem")).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index[0].url, "https://a.example");
        assert_eq!(index[1].url, "https://b.example");
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let data = format!("{}\n{{not json\n{}\n", PAGE_A, PAGE_B);
        let err = read_index(Cursor::new(data), Path::new("mem")).unwrap_err();
        match err {
            IndexError::Record { line, source } => {
                assert_eq!(line, 2);
                assert!(matches!(source, RecordError::Json(_)));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn bad_heading_aborts_load() {
        let bad = PAGE_A.replace("\"h1\"", "\"section\"");
        let data = format!("{}\n{}\n", PAGE_B, bad);
        let err = read_index(Cursor::new(data), Path::new("mem")).unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(err.to_string().contains("section"));
    }

    #[test]
    fn load_index_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", PAGE_A).unwrap();
        writeln!(file, "{}", PAGE_B).unwrap();
        let index = load_index(file.path()).unwrap();
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_index(&tmp.path().join("absent.jsonl")).unwrap_err();
        assert!(matches!(err, IndexError::Io { .. }));
    }
}
