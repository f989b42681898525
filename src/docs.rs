use crate::error::ErrorResponse;
use crate::model::attendance::{
    AttendanceRecord, AttendanceRows, AttendanceStatus, AttendanceUpload, DailyOverview, MarkAttendance,
};
use crate::model::faculty::{CreateFaculty, EmployeeDetail, Faculty, FacultyUpload, UpdateFaculty};
use crate::model::holiday::Holiday;
use crate::model::leave_application::{LeaveApplication, LeaveFilter, LeaveStatus, LeaveSubmission};
use crate::model::lock::{LockKind, MonthlyLock};
use crate::model::settings::Settings;
use crate::model::summary::{
    ExportFormat, LopCandidate, LopReversal, MonthlyRun, MonthlySummary, SummaryAdjustment, SummaryExport,
};
use crate::model::user::{
    LoginRequest, PendingUserView, RegisterRequest, Registration, Role, UserProfile,
};
use crate::payroll::normalizer::RejectedRow;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Faculty HR API",
        version = "1.0.0",
        description = r#"
## Faculty Attendance, Leave & Payroll

Back office for a teaching department: daily attendance sheets, leave
applications, monthly pay summaries and casual-leave bookkeeping.

### 🔹 Key Features
- **Faculty roster**
  - Create, update, bulk upload from a workbook, per-employee monthly view
- **Attendance**
  - Daily sheet upload with per-row rejection report, manual marking, daily overview
- **Leave**
  - Submit (mirrored into attendance), approve/reject, delete, printable letter
- **Payroll**
  - Monthly summary with holidays and casual leaves, payable-day adjustment,
    CSV/XLSX export, finalize, loss-of-pay reversal
- **Casual-leave allocation**
  - One credit per month without absences, run at most once per month

### 📦 Errors
Every error answers with `{ "error", "code", "details"? }`.
"#,
    ),
    paths(
        crate::api::accounts::register,
        crate::api::accounts::login,
        crate::api::accounts::username_available,
        crate::api::accounts::list_users,
        crate::api::accounts::list_pending,
        crate::api::accounts::approve_pending,
        crate::api::accounts::reject_pending,
        crate::api::accounts::delete_user,

        crate::api::faculty::list_faculty,
        crate::api::faculty::get_faculty,
        crate::api::faculty::create_faculty,
        crate::api::faculty::update_faculty,
        crate::api::faculty::delete_faculty,
        crate::api::faculty::upload_faculty,
        crate::api::faculty::employee_month,

        crate::api::attendance::upload_sheet,
        crate::api::attendance::upload_rows,
        crate::api::attendance::daily_overview,
        crate::api::attendance::mark_attendance,

        crate::api::leave::submit_leave,
        crate::api::leave::list_leaves,
        crate::api::leave::get_leave,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,
        crate::api::leave::delete_leave,
        crate::api::leave::leave_letter,

        crate::api::holiday::list_holidays,
        crate::api::holiday::put_holiday,
        crate::api::holiday::delete_holiday,

        crate::api::settings::get_settings,
        crate::api::settings::put_settings,

        crate::api::payroll::monthly_summary,
        crate::api::payroll::adjust_summary,
        crate::api::payroll::export_summary,
        crate::api::payroll::finalize_month,
        crate::api::payroll::lop_candidates,
        crate::api::payroll::reverse_lop,
        crate::api::payroll::allocate_month,
        crate::api::payroll::allocation_status
    ),
    components(
        schemas(
            ErrorResponse,
            Faculty,
            CreateFaculty,
            UpdateFaculty,
            FacultyUpload,
            EmployeeDetail,
            RejectedRow,
            AttendanceStatus,
            AttendanceRecord,
            AttendanceRows,
            AttendanceUpload,
            DailyOverview,
            MarkAttendance,
            Holiday,
            LeaveStatus,
            LeaveApplication,
            LeaveSubmission,
            LeaveFilter,
            LockKind,
            MonthlyLock,
            Settings,
            MonthlySummary,
            SummaryAdjustment,
            SummaryExport,
            ExportFormat,
            LopCandidate,
            LopReversal,
            MonthlyRun,
            Role,
            RegisterRequest,
            LoginRequest,
            UserProfile,
            PendingUserView,
            Registration
        )
    ),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Users", description = "Account administration"),
        (name = "Faculty", description = "Faculty roster"),
        (name = "Attendance", description = "Daily attendance"),
        (name = "Leave", description = "Leave applications"),
        (name = "Holidays", description = "Holiday calendar"),
        (name = "Settings", description = "Attendance and registration settings"),
        (name = "Payroll", description = "Monthly summary, loss of pay and casual-leave allocation"),
    )
)]
pub struct ApiDoc;
