//! CSV input and output tables

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chatrelay_core_types::ConversationRecord;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use csv::StringRecord;
use tracing::debug;

use crate::errors::RelayError;

const BOM: &str = "\u{feff}";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Prompt columns tried, in order, when none is requested explicitly.
pub const PROMPT_COLUMNS: [&str; 2] = ["messages", "user"];

pub const SUBMITTED_SUFFIX: &str = "_submited";
pub const RESPONSE_SUFFIX: &str = "_response";

/// `<dir>/<stem><suffix>.csv` next to `input`.
pub fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{suffix}.csv"))
}

struct Columns {
    headers: Vec<String>,
}

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        Self {
            headers: headers
                .iter()
                .map(|h| h.trim_start_matches(BOM).trim().to_string())
                .collect(),
        }
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

fn open_reader(path: &Path) -> Result<(csv::Reader<File>, Columns), RelayError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|err| RelayError::table(path, err))?;
    let columns = Columns::new(reader.headers().map_err(|err| RelayError::table(path, err))?);
    Ok((reader, columns))
}

fn cell(row: &StringRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| row.get(i))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Read the prompt column of `path`, keeping one entry per row.
pub fn read_prompts(path: &Path, column: Option<&str>) -> Result<Vec<String>, RelayError> {
    let (mut reader, columns) = open_reader(path)?;
    let index = match column {
        Some(name) => columns.index(name),
        None => PROMPT_COLUMNS.iter().find_map(|name| columns.index(name)),
    }
    .ok_or_else(|| RelayError::MissingColumn {
        path: path.to_path_buf(),
        column: column.unwrap_or(PROMPT_COLUMNS[0]).to_string(),
    })?;

    let mut prompts = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|err| RelayError::table(path, err))?;
        prompts.push(row.get(index).unwrap_or_default().to_string());
    }
    debug!(path = %path.display(), count = prompts.len(), "read prompts");
    Ok(prompts)
}

/// Read a submitted table back into records.
///
/// Requires a `user` column; `link`, `assistant`, `error` and `submitted_at`
/// are optional.
pub fn read_records(path: &Path) -> Result<Vec<ConversationRecord>, RelayError> {
    let (mut reader, columns) = open_reader(path)?;
    let user = columns
        .index("user")
        .ok_or_else(|| RelayError::MissingColumn {
            path: path.to_path_buf(),
            column: "user".to_string(),
        })?;
    let link = columns.index("link");
    let assistant = columns.index("assistant");
    let error = columns.index("error");
    let submitted_at = columns.index("submitted_at");

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|err| RelayError::table(path, err))?;
        records.push(ConversationRecord::restore(
            row.get(user).unwrap_or_default(),
            cell(&row, link),
            cell(&row, assistant),
            cell(&row, error),
            cell(&row, submitted_at).and_then(|raw| parse_timestamp(&raw)),
        ));
    }
    debug!(path = %path.display(), count = records.len(), "read records");
    Ok(records)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Local));
    }
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .ok()
        .and_then(|naive| Local.from_local_datetime(&naive).single())
}

fn create_writer(path: &Path, bom: bool) -> Result<csv::Writer<File>, RelayError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| RelayError::io(parent, err))?;
    }
    let mut file = File::create(path).map_err(|err| RelayError::io(path, err))?;
    if bom {
        file.write_all(BOM.as_bytes())
            .map_err(|err| RelayError::io(path, err))?;
    }
    Ok(csv::Writer::from_writer(file))
}

fn finish(path: &Path, mut writer: csv::Writer<File>) -> Result<(), RelayError> {
    writer.flush().map_err(|err| RelayError::io(path, err))
}

/// Dispatch output: UTF-8 with BOM, `user, assistant, link, error, submitted_at`.
pub fn write_submitted(path: &Path, records: &[ConversationRecord]) -> Result<(), RelayError> {
    let mut writer = create_writer(path, true)?;
    writer
        .write_record(["user", "assistant", "link", "error", "submitted_at"])
        .map_err(|err| RelayError::table(path, err))?;
    for record in records {
        let submitted_at = record
            .submitted_at()
            .map(|at| at.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default();
        writer
            .write_record([
                record.prompt(),
                record.reply().unwrap_or_default(),
                record.link().unwrap_or_default(),
                record.error().unwrap_or_default(),
                submitted_at.as_str(),
            ])
            .map_err(|err| RelayError::table(path, err))?;
    }
    finish(path, writer)
}

/// Collection output: `user, assistant, link`.
pub fn write_responses(path: &Path, records: &[ConversationRecord]) -> Result<(), RelayError> {
    let mut writer = create_writer(path, false)?;
    writer
        .write_record(["user", "assistant", "link"])
        .map_err(|err| RelayError::table(path, err))?;
    for record in records {
        writer
            .write_record([
                record.prompt(),
                record.reply().unwrap_or_default(),
                record.link().unwrap_or_default(),
            ])
            .map_err(|err| RelayError::table(path, err))?;
    }
    finish(path, writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn output_path_appends_suffix() {
        assert_eq!(
            output_path(Path::new("data/messages.csv"), SUBMITTED_SUFFIX),
            PathBuf::from("data/messages_submited.csv")
        );
        assert_eq!(
            output_path(Path::new("messages_submited.csv"), RESPONSE_SUFFIX),
            PathBuf::from("messages_submited_response.csv")
        );
    }

    #[test]
    fn reads_messages_then_user_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.csv");
        fs::write(&path, "id,messages\n1,Hi\n2,\"multi\nline\"\n3,\n").unwrap();
        assert_eq!(
            read_prompts(&path, None).unwrap(),
            vec!["Hi", "multi\nline", ""]
        );

        fs::write(&path, "\u{feff}user\nHello\n").unwrap();
        assert_eq!(read_prompts(&path, None).unwrap(), vec!["Hello"]);

        let err = read_prompts(&path, Some("prompt")).unwrap_err();
        assert!(matches!(err, RelayError::MissingColumn { ref column, .. } if column == "prompt"));
    }

    #[test]
    fn submitted_table_round_trips_through_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("in_submited.csv");

        let mut ok = ConversationRecord::new("Hi");
        ok.mark_dispatched("https://x/thread/c/1", Local::now()).unwrap();
        let mut failed = ConversationRecord::new("2+2?");
        failed.mark_failed("anchor not found");

        write_submitted(&path, &[ok.clone(), failed]).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with('\u{feff}'));
        assert!(raw.contains("user,assistant,link,error,submitted_at"));

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].link(), Some("https://x/thread/c/1"));
        assert!(records[0].submitted_at().is_some());
        assert_eq!(records[1].link(), None);
        assert_eq!(records[1].error(), Some("anchor not found"));
    }

    #[test]
    fn responses_table_has_three_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("r.csv");
        let mut record = ConversationRecord::new("Hi");
        record.mark_dispatched("https://x/c/1", Local::now()).unwrap();
        record.set_reply("Hello!").unwrap();

        write_responses(&path, &[record, ConversationRecord::new("lost")]).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        let mut lines = raw.lines();
        assert_eq!(lines.next(), Some("user,assistant,link"));
        assert_eq!(lines.next(), Some("Hi,Hello!,https://x/c/1"));
        assert_eq!(lines.next(), Some("lost,,"));
    }
}
