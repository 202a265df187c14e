use crate::api::attendance::{AttendanceListResponse, MarkAttendanceResponse, UploadForm};
use crate::model::attendance::{AttendanceRecord, AttendanceSummary};
use crate::vision::image_decode::{ImageInfo, UploadFormat};
use crate::vision::recognizer::Recognition;
use utoipa::{Modify, OpenApi};

/// Prefix the handler paths are documented under.
const DOC_API_PREFIX: &str = "/api";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Face Recognition Attendance API",
        version = "0.1.0",
        description = r#"
## Face Recognition Attendance System

Upload a photo to recognize a face and mark attendance.

### 🔹 Key Features
- **Mark Attendance**
  - Upload a jpg, jpeg or png photo; a row `Name,Time` is appended to the attendance CSV
- **Attendance Records**
  - List rows with date and name filters, export them as CSV, view dashboard counters

### ⚠️ Recognition
Recognition is a placeholder: every decodable photo is reported as the configured
identity (`Person 1` by default).

---
Built with **Rust**, **Actix Web**, **image** and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::mark_attendance,
        crate::api::attendance::list_attendance,
        crate::api::attendance::export_attendance,
        crate::api::attendance::attendance_summary
    ),
    components(
        schemas(
            UploadForm,
            MarkAttendanceResponse,
            AttendanceListResponse,
            AttendanceRecord,
            AttendanceSummary,
            ImageInfo,
            UploadFormat,
            Recognition
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance marking and records APIs"),
    )
)]
pub struct ApiDoc;

/// Moves documented paths from `/api` to the configured `API_PREFIX`.
pub struct ApiPrefix(pub String);

impl Modify for ApiPrefix {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let prefix = self.0.trim_end_matches('/');
        if prefix == DOC_API_PREFIX {
            return;
        }

        let paths = std::mem::take(&mut openapi.paths.paths);
        openapi.paths.paths = paths
            .into_iter()
            .map(|(path, item)| match path.strip_prefix(DOC_API_PREFIX) {
                Some(rest) => (format!("{prefix}{rest}"), item),
                None => (path, item),
            })
            .collect();
    }
}

pub fn openapi(api_prefix: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    ApiPrefix(api_prefix.to_string()).modify(&mut doc);
    doc
}
