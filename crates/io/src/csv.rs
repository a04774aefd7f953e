// Survey CSV decoding

use std::io::Read;
use std::path::{Path, PathBuf};

use lubegrid_recon::SourceTable;

/// Read one survey file into a token matrix named after the file.
pub fn load_table(path: &Path) -> Result<SourceTable, String> {
    let content = read_file_as_utf8(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let delimiter = sniff_delimiter(&content);
    let rows = tokenize(&content, delimiter).map_err(|e| format!("{}: {}", path.display(), e))?;
    log::debug!(
        "{}: {} row(s), delimiter {:?}",
        path.display(),
        rows.len(),
        delimiter as char
    );

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SourceTable::new(name, rows))
}

/// Decode several files concurrently. Tables come back in `paths` order no
/// matter which thread finishes first; the first error in that order wins.
pub fn load_tables(paths: &[PathBuf]) -> Result<Vec<SourceTable>, String> {
    if paths.len() <= 1 {
        return paths.iter().map(|p| load_table(p)).collect();
    }

    let results: Vec<Result<SourceTable, String>> = std::thread::scope(|scope| {
        let handles: Vec<_> = paths
            .iter()
            .map(|path| scope.spawn(move || load_table(path)))
            .collect();
        handles
            .into_iter()
            .zip(paths)
            .map(|(handle, path)| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(format!("{}: decoder thread panicked", path.display())))
            })
            .collect()
    });

    results.into_iter().collect()
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(10)
        .collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                ::csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // The header line must split into more than one field
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Lines agreeing with the header, weighted by its width
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;
    Ok(decode_bytes(bytes))
}

fn decode_bytes(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            // Survey exports from older Excel builds are Windows-1252
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Split CSV text into rows of raw fields. Row widths may differ; the first
/// row is returned like any other.
pub fn tokenize(content: &str, delimiter: u8) -> Result<Vec<Vec<String>>, String> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}
