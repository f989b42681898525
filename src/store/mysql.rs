use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{FromRow, MySql, MySqlPool, Transaction};
use tracing::{debug, error};

use super::{Batch, Mutation, Store, StoreError, StoreResult};
use crate::model::EmpId;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::faculty::Faculty;
use crate::model::holiday::Holiday;
use crate::model::leave_application::{LeaveApplication, LeaveFilter, LeaveStatus};
use crate::model::lock::{LockKind, MonthlyLock};
use crate::model::settings::Settings;
use crate::model::user::{PendingUser, Role, UserAccount};
use crate::payroll::calendar::{DateRange, MonthKey};

/// MySQL duplicate-key / integrity violation.
const INTEGRITY_VIOLATION: &str = "23000";

fn decode<T: FromStr>(column: &str, raw: &str) -> StoreResult<T> {
    raw.parse()
        .map_err(|_| StoreError::Corrupt(format!("{column} = `{raw}`")))
}

#[derive(FromRow)]
struct FacultyRow {
    emp_id: u64,
    name: String,
    dept: String,
    designation: String,
    salary: f64,
    casual_leaves: i32,
    username: Option<String>,
    registered: bool,
}

impl From<FacultyRow> for Faculty {
    fn from(row: FacultyRow) -> Self {
        Faculty {
            emp_id: row.emp_id,
            name: row.name,
            dept: row.dept,
            designation: row.designation,
            salary: row.salary,
            casual_leaves: row.casual_leaves,
            username: row.username,
            registered: row.registered,
        }
    }
}

#[derive(FromRow)]
struct AttendanceRow {
    emp_id: u64,
    date: NaiveDate,
    in_time: NaiveTime,
    status: String,
    leave_application_id: Option<String>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> StoreResult<Self> {
        Ok(AttendanceRecord {
            emp_id: row.emp_id,
            date: row.date,
            in_time: row.in_time,
            status: decode::<AttendanceStatus>("attendance.status", &row.status)?,
            leave_application_id: row.leave_application_id,
        })
    }
}

#[derive(FromRow)]
struct LeaveRow {
    id: String,
    emp_id: u64,
    name: String,
    dept: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: String,
    leave_type: String,
    status: String,
    submitted_at: DateTime<Utc>,
}

impl TryFrom<LeaveRow> for LeaveApplication {
    type Error = StoreError;

    fn try_from(row: LeaveRow) -> StoreResult<Self> {
        Ok(LeaveApplication {
            id: row.id,
            emp_id: row.emp_id,
            name: row.name,
            dept: row.dept,
            start_date: row.start_date,
            end_date: row.end_date,
            reason: row.reason,
            leave_type: row.leave_type,
            status: decode::<LeaveStatus>("leave_applications.status", &row.status)?,
            submission_timestamp: row.submitted_at,
        })
    }
}

#[derive(FromRow)]
struct SettingsRow {
    on_time_threshold: NaiveTime,
    permission_limit: u32,
    account_creation_enabled: bool,
    user_account_request_enabled: bool,
}

#[derive(FromRow)]
struct LockRow {
    kind: String,
    month: String,
    completed: bool,
    completed_at: DateTime<Utc>,
    updated_count: u32,
}

impl TryFrom<LockRow> for MonthlyLock {
    type Error = StoreError;

    fn try_from(row: LockRow) -> StoreResult<Self> {
        Ok(MonthlyLock {
            kind: decode::<LockKind>("monthly_locks.kind", &row.kind)?,
            month: decode::<MonthKey>("monthly_locks.month", &row.month)?,
            completed: row.completed,
            timestamp: row.completed_at,
            updated_count: row.updated_count,
        })
    }
}

#[derive(FromRow)]
struct UserRow {
    username: String,
    password_hash: String,
    role: String,
    emp_id: Option<u64>,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = StoreError;

    fn try_from(row: UserRow) -> StoreResult<Self> {
        Ok(UserAccount {
            username: row.username,
            password_hash: row.password_hash,
            role: decode::<Role>("users.role", &row.role)?,
            emp_id: row.emp_id,
        })
    }
}

#[derive(FromRow)]
struct PendingRow {
    username: String,
    password_hash: String,
    emp_id: u64,
    requested_at: DateTime<Utc>,
}

impl From<PendingRow> for PendingUser {
    fn from(row: PendingRow) -> Self {
        PendingUser {
            username: row.username,
            password_hash: row.password_hash,
            emp_id: row.emp_id,
            requested_at: row.requested_at,
        }
    }
}

const FACULTY_COLUMNS: &str = "emp_id, name, dept, designation, salary, casual_leaves, username, registered";
const ATTENDANCE_COLUMNS: &str = "emp_id, date, in_time, status, leave_application_id";
const LEAVE_COLUMNS: &str =
    "id, emp_id, name, dept, start_date, end_date, reason, leave_type, status, submitted_at";

/// `Store` over the MySQL schema in `migrations/`. One transaction per batch.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlStore { pool }
    }

    async fn apply_one(tx: &mut Transaction<'_, MySql>, mutation: Mutation) -> StoreResult<()> {
        match mutation {
            Mutation::PutFaculty(f) => {
                sqlx::query(
                    r#"
                    INSERT INTO faculty
                        (emp_id, name, dept, designation, salary, casual_leaves, username, registered)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                    ON DUPLICATE KEY UPDATE
                        name = VALUES(name),
                        dept = VALUES(dept),
                        designation = VALUES(designation),
                        salary = VALUES(salary),
                        casual_leaves = VALUES(casual_leaves),
                        username = VALUES(username),
                        registered = VALUES(registered)
                    "#,
                )
                .bind(f.emp_id)
                .bind(&f.name)
                .bind(&f.dept)
                .bind(&f.designation)
                .bind(f.salary)
                .bind(f.casual_leaves)
                .bind(&f.username)
                .bind(f.registered)
                .execute(&mut **tx)
                .await?;
            }
            Mutation::DeleteFaculty(emp_id) => {
                sqlx::query("DELETE FROM attendance WHERE emp_id = ?")
                    .bind(emp_id)
                    .execute(&mut **tx)
                    .await?;
                sqlx::query("DELETE FROM faculty WHERE emp_id = ?")
                    .bind(emp_id)
                    .execute(&mut **tx)
                    .await?;
            }
            Mutation::AdjustCasualLeaves { emp_id, delta } => {
                let result = sqlx::query("UPDATE faculty SET casual_leaves = casual_leaves + ? WHERE emp_id = ?")
                    .bind(delta)
                    .bind(emp_id)
                    .execute(&mut **tx)
                    .await?;
                // MySQL reports changed rows, so a zero delta would read as missing.
                if delta != 0 && result.rows_affected() == 0 {
                    return Err(StoreError::Missing(format!("faculty {emp_id} not found")));
                }
            }
            Mutation::LinkAccount { emp_id, username } => {
                let found = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM faculty WHERE emp_id = ?")
                    .bind(emp_id)
                    .fetch_one(&mut **tx)
                    .await?;
                if found == 0 {
                    return Err(StoreError::Missing(format!("faculty {emp_id} not found")));
                }
                sqlx::query("UPDATE faculty SET username = ?, registered = ? WHERE emp_id = ?")
                    .bind(&username)
                    .bind(username.is_some())
                    .bind(emp_id)
                    .execute(&mut **tx)
                    .await?;
            }
            Mutation::PutAttendance(r) => {
                sqlx::query(
                    r#"
                    INSERT INTO attendance (emp_id, date, in_time, status, leave_application_id)
                    VALUES (?, ?, ?, ?, ?)
                    ON DUPLICATE KEY UPDATE
                        in_time = VALUES(in_time),
                        status = VALUES(status),
                        leave_application_id = VALUES(leave_application_id)
                    "#,
                )
                .bind(r.emp_id)
                .bind(r.date)
                .bind(r.in_time)
                .bind(r.status.as_ref())
                .bind(&r.leave_application_id)
                .execute(&mut **tx)
                .await?;
            }
            Mutation::DeleteAttendance { emp_id, date } => {
                sqlx::query("DELETE FROM attendance WHERE emp_id = ? AND date = ?")
                    .bind(emp_id)
                    .bind(date)
                    .execute(&mut **tx)
                    .await?;
            }
            Mutation::PutLeave(l) => {
                sqlx::query(
                    r#"
                    REPLACE INTO leave_applications
                        (id, emp_id, name, dept, start_date, end_date, reason, leave_type, status, submitted_at)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&l.id)
                .bind(l.emp_id)
                .bind(&l.name)
                .bind(&l.dept)
                .bind(l.start_date)
                .bind(l.end_date)
                .bind(&l.reason)
                .bind(&l.leave_type)
                .bind(l.status.as_ref())
                .bind(l.submission_timestamp)
                .execute(&mut **tx)
                .await?;
            }
            Mutation::TransitionLeave { id, from, to } => {
                let result = sqlx::query("UPDATE leave_applications SET status = ? WHERE id = ? AND status = ?")
                    .bind(to.as_ref())
                    .bind(&id)
                    .bind(from.as_ref())
                    .execute(&mut **tx)
                    .await?;
                if result.rows_affected() == 0 {
                    let current = sqlx::query_scalar::<_, String>("SELECT status FROM leave_applications WHERE id = ?")
                        .bind(&id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    return Err(match current {
                        None => StoreError::Missing(format!("leave application {id} not found")),
                        Some(status) => {
                            StoreError::Conflict(format!("leave application {id} is {status}, not {from}"))
                        }
                    });
                }
            }
            Mutation::DeleteLeave(id) => {
                sqlx::query("DELETE FROM leave_applications WHERE id = ?")
                    .bind(&id)
                    .execute(&mut **tx)
                    .await?;
            }
            Mutation::PutHoliday(h) => {
                sqlx::query(
                    "INSERT INTO holidays (date, description) VALUES (?, ?) \
                     ON DUPLICATE KEY UPDATE description = VALUES(description)",
                )
                .bind(h.date)
                .bind(&h.description)
                .execute(&mut **tx)
                .await?;
            }
            Mutation::DeleteHoliday(date) => {
                sqlx::query("DELETE FROM holidays WHERE date = ?")
                    .bind(date)
                    .execute(&mut **tx)
                    .await?;
            }
            Mutation::PutSettings(s) => {
                sqlx::query(
                    r#"
                    REPLACE INTO settings
                        (id, on_time_threshold, permission_limit, account_creation_enabled, user_account_request_enabled)
                    VALUES (1, ?, ?, ?, ?)
                    "#,
                )
                .bind(s.on_time_threshold)
                .bind(s.permission_limit)
                .bind(s.account_creation_enabled)
                .bind(s.user_account_request_enabled)
                .execute(&mut **tx)
                .await?;
            }
            Mutation::AcquireLock(lock) => {
                let result = sqlx::query(
                    "INSERT INTO monthly_locks (kind, month, completed, completed_at, updated_count) \
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(lock.kind.as_ref())
                .bind(lock.month.to_string())
                .bind(lock.completed)
                .bind(lock.timestamp)
                .bind(lock.updated_count)
                .execute(&mut **tx)
                .await;

                if let Err(sqlx::Error::Database(db_err)) = &result {
                    if db_err.code().as_deref() == Some(INTEGRITY_VIOLATION) {
                        return Err(StoreError::Conflict(format!("{} for {} already ran", lock.kind, lock.month)));
                    }
                }
                result?;
            }
            Mutation::PutUser(u) => {
                sqlx::query("REPLACE INTO users (username, password_hash, role, emp_id) VALUES (?, ?, ?, ?)")
                    .bind(&u.username)
                    .bind(&u.password_hash)
                    .bind(u.role.as_ref())
                    .bind(u.emp_id)
                    .execute(&mut **tx)
                    .await?;
            }
            Mutation::DeleteUser(username) => {
                sqlx::query("DELETE FROM users WHERE username = ?")
                    .bind(&username)
                    .execute(&mut **tx)
                    .await?;
            }
            Mutation::PutPendingUser(p) => {
                sqlx::query(
                    "REPLACE INTO pending_users (username, password_hash, emp_id, requested_at) VALUES (?, ?, ?, ?)",
                )
                .bind(&p.username)
                .bind(&p.password_hash)
                .bind(p.emp_id)
                .bind(p.requested_at)
                .execute(&mut **tx)
                .await?;
            }
            Mutation::DeletePendingUser(username) => {
                sqlx::query("DELETE FROM pending_users WHERE username = ?")
                    .bind(&username)
                    .execute(&mut **tx)
                    .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MySqlStore {
    async fn list_faculty(&self) -> StoreResult<Vec<Faculty>> {
        let sql = format!("SELECT {FACULTY_COLUMNS} FROM faculty ORDER BY emp_id");
        let rows = sqlx::query_as::<_, FacultyRow>(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Faculty::from).collect())
    }

    async fn get_faculty(&self, emp_id: EmpId) -> StoreResult<Option<Faculty>> {
        let sql = format!("SELECT {FACULTY_COLUMNS} FROM faculty WHERE emp_id = ?");
        let row = sqlx::query_as::<_, FacultyRow>(&sql)
            .bind(emp_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Faculty::from))
    }

    async fn attendance_between(&self, range: DateRange) -> StoreResult<Vec<AttendanceRecord>> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE date BETWEEN ? AND ? ORDER BY emp_id, date"
        );
        let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(range.start())
            .bind(range.end())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }

    async fn attendance_for(&self, emp_id: EmpId, range: DateRange) -> StoreResult<Vec<AttendanceRecord>> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE emp_id = ? AND date BETWEEN ? AND ? ORDER BY date"
        );
        let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(emp_id)
            .bind(range.start())
            .bind(range.end())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }

    async fn get_attendance(&self, emp_id: EmpId, date: NaiveDate) -> StoreResult<Option<AttendanceRecord>> {
        let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE emp_id = ? AND date = ?");
        let row = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(emp_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;
        row.map(AttendanceRecord::try_from).transpose()
    }

    async fn list_leaves(&self, filter: &LeaveFilter) -> StoreResult<Vec<LeaveApplication>> {
        let mut sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_applications WHERE 1=1");
        if filter.emp_id.is_some() {
            sql.push_str(" AND emp_id = ?");
        }
        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        sql.push_str(" ORDER BY submitted_at DESC");

        let mut query = sqlx::query_as::<_, LeaveRow>(&sql);
        if let Some(emp_id) = filter.emp_id {
            query = query.bind(emp_id);
        }
        if let Some(status) = filter.status {
            query = query.bind(status.as_ref().to_string());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(LeaveApplication::try_from).collect()
    }

    async fn get_leave(&self, id: &str) -> StoreResult<Option<LeaveApplication>> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_applications WHERE id = ?");
        let row = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(LeaveApplication::try_from).transpose()
    }

    async fn list_holidays(&self) -> StoreResult<Vec<Holiday>> {
        let rows = sqlx::query_as::<_, (NaiveDate, String)>("SELECT date, description FROM holidays ORDER BY date")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(date, description)| Holiday { date, description })
            .collect())
    }

    async fn load_settings(&self) -> StoreResult<Option<Settings>> {
        let row = sqlx::query_as::<_, SettingsRow>(
            "SELECT on_time_threshold, permission_limit, account_creation_enabled, user_account_request_enabled \
             FROM settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| Settings {
            on_time_threshold: r.on_time_threshold,
            permission_limit: r.permission_limit,
            account_creation_enabled: r.account_creation_enabled,
            user_account_request_enabled: r.user_account_request_enabled,
        }))
    }

    async fn get_lock(&self, kind: LockKind, month: MonthKey) -> StoreResult<Option<MonthlyLock>> {
        let row = sqlx::query_as::<_, LockRow>(
            "SELECT kind, month, completed, completed_at, updated_count FROM monthly_locks \
             WHERE kind = ? AND month = ?",
        )
        .bind(kind.as_ref())
        .bind(month.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(MonthlyLock::try_from).transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<UserAccount>> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT username, password_hash, role, emp_id FROM users ORDER BY username")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(UserAccount::try_from).collect()
    }

    async fn get_user(&self, username: &str) -> StoreResult<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT username, password_hash, role, emp_id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserAccount::try_from).transpose()
    }

    async fn list_pending_users(&self) -> StoreResult<Vec<PendingUser>> {
        let rows = sqlx::query_as::<_, PendingRow>(
            "SELECT username, password_hash, emp_id, requested_at FROM pending_users ORDER BY requested_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PendingUser::from).collect())
    }

    async fn get_pending_user(&self, username: &str) -> StoreResult<Option<PendingUser>> {
        let row = sqlx::query_as::<_, PendingRow>(
            "SELECT username, password_hash, emp_id, requested_at FROM pending_users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(PendingUser::from))
    }

    async fn apply(&self, batch: Batch) -> StoreResult<()> {
        let size = batch.len();
        let mut tx = self.pool.begin().await?;

        for mutation in batch.into_mutations() {
            if let Err(e) = Self::apply_one(&mut tx, mutation).await {
                error!(error = %e, size, "Batch failed, rolling back");
                tx.rollback().await?;
                return Err(e);
            }
        }

        tx.commit().await?;
        debug!(size, "Batch committed");
        Ok(())
    }
}
