//! File tools: read, append a code block, replace a line range.

use devagent_core::error::ToolError;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Read a file's full text.
pub async fn read_file(path: &str) -> Result<String, ToolError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            debug!(path, bytes = content.len(), "Read file");
            Ok(content)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ToolError::FileNotFound(path.to_string()))
        }
        Err(e) => Err(ToolError::io(path, &e)),
    }
}

/// Append `code` to the end of the file, wrapped in newlines.
///
/// The file is created if it does not exist.
pub async fn append_function(path: &str, code: &str) -> Result<(), ToolError> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| ToolError::io(path, &e))?;

    let block = format!("\n{code}\n");
    file.write_all(block.as_bytes())
        .await
        .map_err(|e| ToolError::io(path, &e))?;
    file.flush().await.map_err(|e| ToolError::io(path, &e))?;

    debug!(path, bytes = block.len(), "Appended code block");
    Ok(())
}

/// Replace lines `start..=end` (1-based) of the file with `new_lines`.
///
/// The range is checked before anything is written; on error the file is
/// left exactly as it was.
pub async fn replace_lines(
    path: &str,
    start: i64,
    end: i64,
    new_lines: &[String],
) -> Result<(), ToolError> {
    let content = read_file(path).await?;
    let updated = splice_lines(&content, start, end, new_lines)?;
    tokio::fs::write(path, updated)
        .await
        .map_err(|e| ToolError::io(path, &e))?;

    debug!(path, start, end, inserted = new_lines.len(), "Replaced line range");
    Ok(())
}

/// Pure splice: the text that `replace_lines` would write.
///
/// Each element of `new_lines` is exactly one line. A trailing terminator is
/// tolerated, but an element with an embedded newline is rejected so the
/// result always has `N - (end - start + 1) + K` lines.
///
/// Every line outside the range keeps its original bytes. Each replacement
/// line gets a `\n` terminator, except when the range covers the final line
/// of a file without a trailing newline: the last replacement line then stays
/// unterminated too (unless it is empty, which would otherwise vanish).
pub fn splice_lines(
    content: &str,
    start: i64,
    end: i64,
    new_lines: &[String],
) -> Result<String, ToolError> {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let line_count = lines.len();

    if start < 1 || start > end || end > line_count as i64 {
        return Err(ToolError::InvalidRange {
            start_line: start,
            end_line: end,
            line_count,
        });
    }

    let texts: Vec<&str> = new_lines
        .iter()
        .map(|line| {
            line.strip_suffix("\r\n")
                .or_else(|| line.strip_suffix('\n'))
                .unwrap_or(line)
        })
        .collect();
    if let Some(i) = texts.iter().position(|t| t.contains('\n')) {
        return Err(ToolError::InvalidArguments {
            tool_name: "replace_lines".into(),
            reason: format!("new_lines[{i}] spans more than one line"),
        });
    }

    let first = (start - 1) as usize;
    let last = end as usize;
    let keep_unterminated = last == line_count && !content.ends_with('\n');

    let mut out = String::with_capacity(content.len());
    for line in &lines[..first] {
        out.push_str(line);
    }
    for (i, text) in texts.iter().enumerate() {
        out.push_str(text);

        let is_last = i + 1 == texts.len();
        if !(is_last && keep_unterminated && !text.is_empty()) {
            out.push('\n');
        }
    }
    for line in &lines[last..] {
        out.push_str(line);
    }
    Ok(out)
}
