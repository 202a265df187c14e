use std::fs::{self, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use actix_web::web;
use anyhow::Context;

use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, is_header};
use crate::utils::csv_utils::parse_rows;

/// Append-only CSV attendance log.
#[derive(Clone)]
pub struct AttendanceLog {
    path: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

pub fn init_db(csv_path: &Path) -> anyhow::Result<AttendanceLog> {
    if let Some(parent) = csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    Ok(AttendanceLog::new(csv_path))
}

impl AttendanceLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, record: AttendanceRecord) -> Result<(), AppError> {
        let path = self.path.clone();
        let lock = self.write_lock.clone();

        web::block(move || {
            let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            append_record(&path, &record)
        })
        .await??;

        Ok(())
    }

    pub async fn load(&self) -> Result<Vec<AttendanceRecord>, AppError> {
        let path = self.path.clone();
        let records = web::block(move || read_records(&path)).await??;
        Ok(records)
    }
}

fn append_record(path: &Path, record: &AttendanceRecord) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .read(true)
        .create(true)
        .append(true)
        .open(path)?;

    let mut line = String::new();
    if !ends_with_newline(&mut file)? {
        line.push('\n');
    }
    line.push_str(&record.to_csv_line());
    line.push('\n');
    file.write_all(line.as_bytes())
}

/// True for an empty file or one whose last byte is `\n`.
fn ends_with_newline(file: &mut fs::File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn read_records(path: &Path) -> io::Result<Vec<AttendanceRecord>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut records = Vec::new();
    for (index, fields) in parse_rows(&text).into_iter().enumerate() {
        if is_header(&fields) {
            continue;
        }
        match AttendanceRecord::from_fields(&fields) {
            Some(record) => records.push(record),
            None => tracing::warn!(row = index + 1, ?fields, "Skipping malformed attendance row"),
        }
    }

    Ok(records)
}
