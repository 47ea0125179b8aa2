//! Compact and tabular decoders
//!
//! Both shapes are reduced to `token → value` maps. Rows that cannot be
//! aligned with the header are logged and skipped so one bad row never
//! costs the rest of the batch.

use super::types::{DecodedRecords, ResponseFormat, DEFAULT_DELIMITER};
use crate::error::{Error, Result};
use crate::types::RawRecord;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Reply code meaning the query matched nothing
pub const NO_RECORDS_FOUND: u32 = 20201;

static MARKUP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(?:RETS|COLUMNS|DELIMITER)[\s/>]").unwrap());

static DELIMITER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<DELIMITER\s+value\s*=\s*"([0-9A-Fa-f]{1,2})"\s*/?>"#).unwrap()
});

static COLUMNS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<COLUMNS>(.*?)</COLUMNS>").unwrap());

static DATA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<DATA>(.*?)</DATA>").unwrap());

static REPLY_OPEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<RETS(\s[^>]*)?>").unwrap());

static REPLY_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bReplyCode\s*=\s*"\s*(\d+)\s*""#).unwrap());

static REPLY_TEXT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bReplyText\s*=\s*"([^"]*)""#).unwrap());

impl ResponseFormat {
    /// Pick the decoder for a body
    pub fn detect(body: &str) -> Self {
        if !MARKUP_REGEX.is_match(body) {
            return ResponseFormat::Tabular;
        }
        let delimiter = DELIMITER_REGEX
            .captures(body)
            .and_then(|cap| u8::from_str_radix(&cap[1], 16).ok())
            .map_or(DEFAULT_DELIMITER, char::from);
        ResponseFormat::CompactXml { delimiter }
    }
}

/// `ReplyCode` and `ReplyText` of a `<RETS>` envelope, if the body has one
pub fn reply_status(body: &str) -> Option<(u32, String)> {
    let open = REPLY_OPEN_REGEX.captures(body)?;
    let attrs = open.get(1).map_or("", |m| m.as_str());
    let code = REPLY_CODE_REGEX.captures(attrs)?[1].parse().ok()?;
    let text = REPLY_TEXT_REGEX
        .captures(attrs)
        .map(|cap| decode_entities(&cap[1]))
        .unwrap_or_default();
    Some((code, text))
}

/// Decode the predefined XML entities
pub fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Decode a search response body into raw records
pub fn decode_records(body: &str) -> DecodedRecords {
    match ResponseFormat::detect(body) {
        ResponseFormat::CompactXml { delimiter } => decode_compact(body, delimiter),
        ResponseFormat::Tabular => decode_tabular(body),
    }
}

/// Decode the compact rows of one metadata element
///
/// Fails when the element is missing or the server replied with an error,
/// which callers treat as metadata being unavailable.
pub fn decode_metadata(body: &str, element: &str) -> Result<DecodedRecords> {
    if let Some((code, text)) = reply_status(body) {
        if code != 0 {
            return Err(Error::metadata(format!(
                "{element} request failed with ReplyCode {code}: {text}"
            )));
        }
    }

    let content = element_content(body, element).ok_or_else(|| {
        Error::metadata(format!(
            "response has no {element} element: {}",
            crate::error::snippet(body)
        ))
    })?;

    let delimiter = match ResponseFormat::detect(body) {
        ResponseFormat::CompactXml { delimiter } => delimiter,
        ResponseFormat::Tabular => DEFAULT_DELIMITER,
    };
    Ok(decode_compact(content, delimiter))
}

/// Inner text of the first `<element ...>` in `body`
///
/// A self-closing element yields an empty string.
fn element_content<'a>(body: &'a str, element: &str) -> Option<&'a str> {
    let open = format!("<{element}");
    let mut search_from = 0;
    while let Some(pos) = body[search_from..].find(&open) {
        let start = search_from + pos;
        let after_name = start + open.len();
        let rest = &body[after_name..];
        if rest.starts_with(|c: char| c.is_whitespace() || c == '>' || c == '/') {
            let tag_end = after_name + rest.find('>')?;
            if body[..tag_end].ends_with('/') {
                return Some("");
            }
            let content_start = tag_end + 1;
            let close = format!("</{element}>");
            let content_end = content_start + body[content_start..].find(&close)?;
            return Some(&body[content_start..content_end]);
        }
        search_from = after_name;
    }
    None
}

fn decode_compact(body: &str, delimiter: char) -> DecodedRecords {
    let format = ResponseFormat::CompactXml { delimiter };

    if let Some((NO_RECORDS_FOUND, _)) = reply_status(body) {
        debug!("Server reported no matching records");
        return DecodedRecords {
            format,
            ..DecodedRecords::default()
        };
    }

    let Some(columns) = COLUMNS_REGEX.captures(body) else {
        return DecodedRecords {
            format,
            ..DecodedRecords::default()
        };
    };
    let columns: Vec<String> = split_compact_row(&columns[1], delimiter)
        .into_iter()
        .map(|c| c.trim().to_string())
        .collect();

    let mut records = Vec::new();
    let mut skipped = 0;
    // Line 1 is the header; data rows follow
    for (index, row) in DATA_REGEX.captures_iter(body).enumerate() {
        let values = split_compact_row(&row[1], delimiter);
        match align(&columns, values, index + 2) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(error = %e, "Skipping malformed record");
                skipped += 1;
            }
        }
    }

    DecodedRecords {
        format,
        columns,
        records,
        skipped,
    }
}

fn decode_tabular(body: &str) -> DecodedRecords {
    let mut lines = body
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header)) = lines.next() else {
        return DecodedRecords::default();
    };
    let columns: Vec<String> = header
        .trim_end_matches(['\r', '\n'])
        .split(DEFAULT_DELIMITER)
        .map(|c| c.trim().to_string())
        .collect();

    let mut records = Vec::new();
    let mut skipped = 0;
    for (index, line) in lines {
        let values = line
            .trim_end_matches(['\r', '\n'])
            .split(DEFAULT_DELIMITER)
            .map(str::to_string)
            .collect();
        match align(&columns, values, index + 1) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(error = %e, "Skipping malformed record");
                skipped += 1;
            }
        }
    }

    DecodedRecords {
        format: ResponseFormat::Tabular,
        columns,
        records,
        skipped,
    }
}

/// Split a compact row, dropping the single leading and trailing delimiter
fn split_compact_row(row: &str, delimiter: char) -> Vec<String> {
    let row = row.trim_matches(['\r', '\n']);
    let row = row.strip_prefix(delimiter).unwrap_or(row);
    let row = row.strip_suffix(delimiter).unwrap_or(row);
    row.split(delimiter).map(decode_entities).collect()
}

fn align(columns: &[String], values: Vec<String>, line: usize) -> Result<RawRecord> {
    if values.len() != columns.len() {
        return Err(Error::record_parse(
            line,
            format!(
                "expected {} columns, found {}",
                columns.len(),
                values.len()
            ),
        ));
    }
    Ok(columns.iter().cloned().zip(values).collect())
}
