use crate::{
    config::Config,
    db::AttendanceLog,
    error::AppError,
    model::attendance::{
        AttendanceFilter, AttendanceRecord, AttendanceSort, AttendanceSummary, CLOCK_FORMAT,
        CSV_HEADER, SortColumn, SortOrder,
    },
    utils::csv_utils::join_row,
    vision::{
        image_decode::{ImageError, ImageInfo, UploadFormat, decode_upload},
        recognizer::FaceRecognizer,
    },
};
use actix_multipart::Multipart;
use actix_web::{
    HttpResponse, Responder,
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web,
};
use chrono::{Local, NaiveDate, SubsecRound};
use futures_util::StreamExt;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Multipart part carrying the photo
pub const IMAGE_FIELD: &str = "file";

pub const RECOGNIZED_MESSAGE: &str = "✅ Face recognized successfully!";

/// Photo part of the upload form
#[derive(ToSchema)]
pub struct UploadForm {
    /// jpg, jpeg or png photo
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Serialize, ToSchema)]
pub struct MarkAttendanceResponse {
    #[schema(example = "✅ Face recognized successfully!")]
    pub recognized: String,
    #[schema(example = "Attendance marked at 09:15:00")]
    pub info: String,
    pub record: AttendanceRecord,
    pub image: ImageInfo,
}

// Empty form fields (`?from=&to=`) mean "no filter".
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    /// Page number, starting at 1
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<u32>,
    /// Rows per page (1-100, default 20)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub per_page: Option<u32>,
    /// First day to include (YYYY-MM-DD)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub from: Option<NaiveDate>,
    /// Last day to include (YYYY-MM-DD)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub to: Option<NaiveDate>,
    /// Case-insensitive name fragment
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    /// Sort column: `name` or `time` (default)
    #[serde(default, deserialize_with = "empty_as_none")]
    #[param(value_type = Option<String>, example = "time")]
    pub sort: Option<SortColumn>,
    /// Sort direction: `asc` or `desc` (default)
    #[serde(default, deserialize_with = "empty_as_none")]
    #[param(value_type = Option<String>, example = "desc")]
    pub order: Option<SortOrder>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub to: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
}

fn empty_as_none<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(d)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceRecord>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: usize,
}

/// Mark attendance from an uploaded photo
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Face recognized and attendance marked", body = MarkAttendanceResponse),
        (status = 400, description = "No image uploaded", body = Object, example = json!({
            "message": "No image uploaded"
        })),
        (status = 413, description = "Image too large"),
        (status = 415, description = "Not a jpg, jpeg or png image"),
        (status = 422, description = "Image could not be decoded"),
        (status = 429, description = "Too many requests"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
#[instrument(
    name = "attendance_upload",
    skip(payload, config, log, recognizer),
    fields(upload_id = %Uuid::new_v4())
)]
pub async fn mark_attendance(
    mut payload: Multipart,
    config: web::Data<Config>,
    log: web::Data<AttendanceLog>,
    recognizer: web::Data<dyn FaceRecognizer>,
) -> Result<HttpResponse, AppError> {
    let (upload, filename) = read_image_field(&mut payload, config.max_upload_bytes)
        .await?
        .ok_or(AppError::NoImage)?;

    if let Some(name) = filename.as_deref().filter(|n| !n.is_empty()) {
        if UploadFormat::from_filename(name).is_none() {
            info!(filename = %name, "Rejected upload with unsupported extension");
            return Err(AppError::UnsupportedType(name.to_string()));
        }
    }

    debug!(size = upload.file.len(), "Decoding uploaded image");

    let max_bytes = config.max_upload_bytes;
    let (info, recognition) = web::block(move || {
        decode_upload(&upload.file, max_bytes).map(|(img, info)| {
            let recognition = recognizer.recognize(&img);
            (info, recognition)
        })
    })
    .await??;

    let recognition = recognition.ok_or(AppError::NotRecognized)?;

    let now = Local::now().naive_local().trunc_subsecs(0);
    let record = AttendanceRecord::new(recognition.name, now);

    log.append(record.clone()).await?;

    info!(
        name = %record.name,
        width = info.width,
        height = info.height,
        "Attendance marked"
    );

    Ok(HttpResponse::Ok().json(MarkAttendanceResponse {
        recognized: RECOGNIZED_MESSAGE.to_string(),
        info: format!("Attendance marked at {}", now.format(CLOCK_FORMAT)),
        record,
        image: info,
    }))
}

/// Returns the first non-empty file part with its client-side filename.
/// Other parts are drained and ignored.
async fn read_image_field(
    payload: &mut Multipart,
    max_bytes: usize,
) -> Result<Option<(UploadForm, Option<String>)>, AppError> {
    while let Some(item) = payload.next().await {
        let mut field = item?;

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);
        let is_image = field.name() == Some(IMAGE_FIELD) || filename.is_some();

        if !is_image {
            while let Some(chunk) = field.next().await {
                chunk?;
            }
            continue;
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            let size = bytes.len() + chunk.len();
            if size > max_bytes {
                return Err(ImageError::TooLarge(size, max_bytes).into());
            }
            bytes.extend_from_slice(&chunk);
        }

        // Browsers send an empty part when no file was chosen
        if bytes.is_empty() {
            continue;
        }

        return Ok(Some((UploadForm { file: bytes }, filename)));
    }

    Ok(None)
}

/// List attendance rows, newest first unless `sort`/`order` say otherwise
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, body = AttendanceListResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    log: web::Data<AttendanceLog>,
    query: web::Query<AttendanceQuery>,
) -> Result<impl Responder, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = ((page - 1) as usize).saturating_mul(per_page as usize);

    let filter = AttendanceFilter {
        from: query.from,
        to: query.to,
        name: query.name.clone(),
    };

    let records = log.load().await?;
    let mut matching: Vec<AttendanceRecord> = filter.apply(&records).cloned().collect();
    AttendanceSort {
        column: query.sort.unwrap_or_default(),
        order: query.order.unwrap_or_default(),
    }
    .sort(&mut matching);

    let total = matching.len();
    let data = matching
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .collect();

    Ok(web::Json(AttendanceListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Download attendance rows as CSV
#[utoipa::path(
    get,
    path = "/api/attendance/export",
    params(ExportQuery),
    responses(
        (status = 200, description = "CSV file with a Name,Time header", content_type = "text/csv", body = String),
        (status = 404, description = "No records to export", body = Object, example = json!({
            "message": "No records to export"
        }))
    ),
    tag = "Attendance"
)]
pub async fn export_attendance(
    log: web::Data<AttendanceLog>,
    query: web::Query<ExportQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = AttendanceFilter {
        from: query.from,
        to: query.to,
        name: query.name.clone(),
    };

    let records = log.load().await?;
    let rows: Vec<String> = filter.apply(&records).map(|r| r.to_csv_line()).collect();

    if rows.is_empty() {
        return Err(AppError::NothingToExport);
    }

    let mut body = join_row(CSV_HEADER);
    body.push('\n');
    for row in &rows {
        body.push_str(row);
        body.push('\n');
    }

    let filename = format!("attendance_{}.csv", Local::now().format("%Y-%m-%d"));
    info!(rows = rows.len(), %filename, "Exported attendance");

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(body))
}

/// Dashboard counters
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    responses(
        (status = 200, body = AttendanceSummary)
    ),
    tag = "Attendance"
)]
pub async fn attendance_summary(
    log: web::Data<AttendanceLog>,
) -> Result<impl Responder, AppError> {
    let records = log.load().await?;
    let today = Local::now().date_naive();

    Ok(web::Json(AttendanceSummary::from_records(&records, today)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::TIME_FORMAT;
    use crate::routes;
    use crate::vision::image_decode::tests::encoded;
    use crate::vision::recognizer::PlaceholderRecognizer;
    use actix_web::{App, http::StatusCode, test};
    use chrono::NaiveDateTime;
    use image::ImageFormat;
    use std::fs;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tempfile::TempDir;

    const BOUNDARY: &str = "----attendance-test-boundary";

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn test_config(dir: &TempDir) -> Config {
        Config {
            attendance_csv: dir.path().join("attendance.csv"),
            ..Config::default()
        }
    }

    macro_rules! test_app {
        ($config:expr) => {{
            let config: Config = $config;
            let log = AttendanceLog::new(config.attendance_csv.clone());
            let recognizer: Arc<dyn FaceRecognizer> =
                Arc::new(PlaceholderRecognizer::new(config.recognized_name.clone()));
            let cfg = config.clone();
            test::init_service(
                App::new()
                    .app_data(web::Data::new(config.clone()))
                    .app_data(web::Data::new(log))
                    .app_data(web::Data::from(recognizer))
                    .configure(move |c| routes::configure(c, cfg.clone())),
            )
            .await
        }};
    }

    fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match filename {
                Some(f) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(parts: &[(&str, Option<&str>, &[u8])]) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/attendance")
            .peer_addr(peer())
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(parts))
    }

    fn csv_lines(config: &Config) -> Vec<String> {
        fs::read_to_string(&config.attendance_csv)
            .unwrap_or_default()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[actix_web::test]
    async fn upload_marks_attendance_for_person_1() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let app = test_app!(config.clone());

        let png = encoded(ImageFormat::Png, 4, 3);
        let before = Local::now().naive_local().trunc_subsecs(0);
        let resp = test::call_service(
            &app,
            upload_request(&[(IMAGE_FIELD, Some("face.png"), png.as_slice())]).to_request(),
        )
        .await;
        let after = Local::now().naive_local();
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["recognized"], RECOGNIZED_MESSAGE);
        assert_eq!(body["record"]["name"], "Person 1");
        assert_eq!(body["image"]["width"], 4);
        assert_eq!(body["image"]["height"], 3);
        assert_eq!(body["image"]["format"], "png");

        let lines = csv_lines(&config);
        assert_eq!(lines.len(), 1);
        let (name, time) = lines[0].split_once(',').unwrap();
        assert_eq!(name, "Person 1");
        let time = NaiveDateTime::parse_from_str(time, TIME_FORMAT).unwrap();
        assert!(time >= before && time <= after);

        let info = body["info"].as_str().unwrap();
        assert_eq!(
            info,
            format!("Attendance marked at {}", time.format(CLOCK_FORMAT))
        );
    }

    #[actix_web::test]
    async fn each_upload_appends_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let app = test_app!(config.clone());

        let jpeg = encoded(ImageFormat::Jpeg, 8, 8);
        for _ in 0..3 {
            let resp = test::call_service(
                &app,
                upload_request(&[(IMAGE_FIELD, Some("face.jpg"), jpeg.as_slice())]).to_request(),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let lines = csv_lines(&config);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.starts_with("Person 1,")));
    }

    #[actix_web::test]
    async fn request_without_image_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let app = test_app!(config.clone());

        let resp = test::call_service(
            &app,
            upload_request(&[("note", None, &b"hello"[..])]).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // empty file part, as sent by a browser with nothing chosen
        let resp = test::call_service(
            &app,
            upload_request(&[(IMAGE_FIELD, Some(""), &b""[..])]).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "No image uploaded");

        assert!(!config.attendance_csv.exists());
    }

    #[actix_web::test]
    async fn undecodable_image_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let app = test_app!(config.clone());

        let garbage: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x00, 0x01, 0x02, 0x03];
        let resp = test::call_service(
            &app,
            upload_request(&[(IMAGE_FIELD, Some("face.png"), garbage)]).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!config.attendance_csv.exists());
    }

    #[actix_web::test]
    async fn disallowed_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let app = test_app!(config.clone());

        let png = encoded(ImageFormat::Png, 2, 2);
        let resp = test::call_service(
            &app,
            upload_request(&[(IMAGE_FIELD, Some("face.gif"), png.as_slice())]).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(!config.attendance_csv.exists());
    }

    #[actix_web::test]
    async fn oversized_upload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            max_upload_bytes: 16,
            ..test_config(&dir)
        };
        let app = test_app!(config.clone());

        let png = encoded(ImageFormat::Png, 16, 16);
        let resp = test::call_service(
            &app,
            upload_request(&[(IMAGE_FIELD, Some("face.png"), png.as_slice())]).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(!config.attendance_csv.exists());
    }

    #[actix_web::test]
    async fn configured_name_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            recognized_name: "Front Desk".to_string(),
            ..test_config(&dir)
        };
        let app = test_app!(config.clone());

        let png = encoded(ImageFormat::Png, 2, 2);
        let resp = test::call_service(
            &app,
            upload_request(&[(IMAGE_FIELD, Some("face.png"), png.as_slice())]).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(csv_lines(&config)[0].starts_with("Front Desk,"));
    }

    fn seed(config: &Config) {
        fs::write(
            &config.attendance_csv,
            "Person 1,2026-01-01 09:00:00\n\
             Alice,2026-01-02 09:00:00\n\
             Person 1,2026-01-03 09:00:00\n\
             Person 1,2026-01-04 09:00:00\n",
        )
        .unwrap();
    }

    #[actix_web::test]
    async fn list_is_newest_first_and_paginated() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        seed(&config);
        let app = test_app!(config.clone());

        let req = test::TestRequest::get()
            .uri("/api/attendance?page=2&per_page=3")
            .peer_addr(peer())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["total"], 4);
        assert_eq!(body["page"], 2);
        assert_eq!(body["per_page"], 3);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["time"], "2026-01-01 09:00:00");

        let req = test::TestRequest::get()
            .uri("/api/attendance")
            .peer_addr(peer())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["per_page"], 20);
        assert_eq!(body["data"][0]["time"], "2026-01-04 09:00:00");
    }

    #[actix_web::test]
    async fn list_filters_by_date_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        seed(&config);
        let app = test_app!(config.clone());

        let req = test::TestRequest::get()
            .uri("/api/attendance?from=2026-01-02&to=2026-01-03&name=person")
            .peer_addr(peer())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["time"], "2026-01-03 09:00:00");
    }

    #[actix_web::test]
    async fn empty_query_fields_mean_no_filter() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        seed(&config);
        let app = test_app!(config.clone());

        let req = test::TestRequest::get()
            .uri("/api/attendance?from=&to=&name=&page=&per_page=&sort=&order=")
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["total"], 4);
        assert_eq!(body["data"][0]["time"], "2026-01-04 09:00:00");

        let req = test::TestRequest::get()
            .uri("/api/attendance/export?from=&to=")
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert_eq!(std::str::from_utf8(&body).unwrap().lines().count(), 5);
    }

    #[actix_web::test]
    async fn bad_date_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let app = test_app!(config.clone());

        let req = test::TestRequest::get()
            .uri("/api/attendance?from=yesterday")
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    macro_rules! listed {
        ($app:expr, $query:expr) => {{
            let req = test::TestRequest::get()
                .uri(&format!("/api/attendance?{}", $query))
                .peer_addr(peer())
                .to_request();
            let body: serde_json::Value = test::call_and_read_body_json(&$app, req).await;
            body["data"]
                .as_array()
                .unwrap()
                .iter()
                .map(|r| format!("{} {}", r["name"].as_str().unwrap(), r["time"].as_str().unwrap()))
                .collect::<Vec<String>>()
        }};
    }

    #[actix_web::test]
    async fn list_sorts_by_requested_column_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        seed(&config);
        let app = test_app!(config.clone());

        assert_eq!(
            listed!(app, "sort=time&order=asc"),
            vec![
                "Person 1 2026-01-01 09:00:00",
                "Alice 2026-01-02 09:00:00",
                "Person 1 2026-01-03 09:00:00",
                "Person 1 2026-01-04 09:00:00",
            ]
        );
        assert_eq!(
            listed!(app, "sort=time&order=desc")[0],
            "Person 1 2026-01-04 09:00:00"
        );
        assert_eq!(
            listed!(app, "sort=name&order=asc"),
            vec![
                "Alice 2026-01-02 09:00:00",
                "Person 1 2026-01-01 09:00:00",
                "Person 1 2026-01-03 09:00:00",
                "Person 1 2026-01-04 09:00:00",
            ]
        );
        assert_eq!(
            listed!(app, "sort=NAME&order=DESC"),
            vec![
                "Person 1 2026-01-04 09:00:00",
                "Person 1 2026-01-03 09:00:00",
                "Person 1 2026-01-01 09:00:00",
                "Alice 2026-01-02 09:00:00",
            ]
        );

        let req = test::TestRequest::get()
            .uri("/api/attendance?sort=department")
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn export_returns_csv_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        seed(&config);
        let app = test_app!(config.clone());

        let req = test::TestRequest::get()
            .uri("/api/attendance/export?name=alice")
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let disposition = resp
            .headers()
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains("attendance_"));

        let body = test::read_body(resp).await;
        assert_eq!(body, "Name,Time\nAlice,2026-01-02 09:00:00\n");
    }

    #[actix_web::test]
    async fn export_with_no_rows_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let app = test_app!(config.clone());

        let req = test::TestRequest::get()
            .uri("/api/attendance/export")
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn summary_reports_counts() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        seed(&config);
        let app = test_app!(config.clone());

        let req = test::TestRequest::get()
            .uri("/api/attendance/summary")
            .peer_addr(peer())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["total_records"], 4);
        assert_eq!(body["unique_names"], 2);
        assert_eq!(body["last_marked_at"], "2026-01-04 09:00:00");
    }
}
