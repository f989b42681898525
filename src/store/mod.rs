//! Storage boundary.
//!
//! Reads are typed per entity. Every write goes through [`Store::apply`], which
//! takes an ordered [`Batch`] and applies all of it or none of it.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::EmpId;
use crate::model::attendance::AttendanceRecord;
use crate::model::faculty::Faculty;
use crate::model::holiday::Holiday;
use crate::model::leave_application::{LeaveApplication, LeaveFilter, LeaveStatus};
use crate::model::lock::{LockKind, MonthlyLock};
use crate::model::settings::Settings;
use crate::model::user::{PendingUser, UserAccount};
use crate::payroll::calendar::{DateRange, MonthKey};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A guarded write found the record in an unexpected state.
    #[error("{0}")]
    Conflict(String),
    /// A mutation targeted a record that does not exist.
    #[error("{0}")]
    Missing(String),
    /// A stored value could not be decoded.
    #[error("corrupt stored value: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Backend(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One write inside a [`Batch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Insert or replace.
    PutFaculty(Faculty),
    /// Also removes the employee's attendance.
    DeleteFaculty(EmpId),
    AdjustCasualLeaves { emp_id: EmpId, delta: i32 },
    /// Sets or clears the linked username; `registered` follows it.
    LinkAccount { emp_id: EmpId, username: Option<String> },
    /// Overwrites whatever is stored for `(emp_id, date)`.
    PutAttendance(AttendanceRecord),
    DeleteAttendance { emp_id: EmpId, date: NaiveDate },
    PutLeave(LeaveApplication),
    /// Fails with `Conflict` unless the stored status is `from`.
    TransitionLeave { id: String, from: LeaveStatus, to: LeaveStatus },
    DeleteLeave(String),
    PutHoliday(Holiday),
    DeleteHoliday(NaiveDate),
    PutSettings(Settings),
    /// Fails with `Conflict` when a lock for the same kind and month exists.
    AcquireLock(MonthlyLock),
    PutUser(UserAccount),
    DeleteUser(String),
    PutPendingUser(PendingUser),
    DeletePendingUser(String),
}

/// Ordered mutations applied atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    mutations: Vec<Mutation>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(mutation: Mutation) -> Self {
        Batch {
            mutations: vec![mutation],
        }
    }

    pub fn push(&mut self, mutation: Mutation) -> &mut Self {
        self.mutations.push(mutation);
        self
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }
}

impl Extend<Mutation> for Batch {
    fn extend<I: IntoIterator<Item = Mutation>>(&mut self, iter: I) {
        self.mutations.extend(iter);
    }
}

impl FromIterator<Mutation> for Batch {
    fn from_iter<I: IntoIterator<Item = Mutation>>(iter: I) -> Self {
        Batch {
            mutations: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Roster ordered by employee id.
    async fn list_faculty(&self) -> StoreResult<Vec<Faculty>>;

    async fn get_faculty(&self, emp_id: EmpId) -> StoreResult<Option<Faculty>>;

    /// Attendance of every employee with a date inside `range`, ordered by employee then date.
    async fn attendance_between(&self, range: DateRange) -> StoreResult<Vec<AttendanceRecord>>;

    /// One employee's attendance inside `range`, ordered by date.
    async fn attendance_for(&self, emp_id: EmpId, range: DateRange) -> StoreResult<Vec<AttendanceRecord>>;

    async fn get_attendance(&self, emp_id: EmpId, date: NaiveDate) -> StoreResult<Option<AttendanceRecord>>;

    /// Newest submission first.
    async fn list_leaves(&self, filter: &LeaveFilter) -> StoreResult<Vec<LeaveApplication>>;

    async fn get_leave(&self, id: &str) -> StoreResult<Option<LeaveApplication>>;

    /// Ordered by date.
    async fn list_holidays(&self) -> StoreResult<Vec<Holiday>>;

    async fn load_settings(&self) -> StoreResult<Option<Settings>>;

    async fn get_lock(&self, kind: LockKind, month: MonthKey) -> StoreResult<Option<MonthlyLock>>;

    async fn list_users(&self) -> StoreResult<Vec<UserAccount>>;

    async fn get_user(&self, username: &str) -> StoreResult<Option<UserAccount>>;

    async fn list_pending_users(&self) -> StoreResult<Vec<PendingUser>>;

    async fn get_pending_user(&self, username: &str) -> StoreResult<Option<PendingUser>>;

    /// Applies every mutation in order, or none of them.
    async fn apply(&self, batch: Batch) -> StoreResult<()>;
}
