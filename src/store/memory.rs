use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{Batch, Mutation, Store, StoreError, StoreResult};
use crate::model::EmpId;
use crate::model::attendance::AttendanceRecord;
use crate::model::faculty::Faculty;
use crate::model::holiday::Holiday;
use crate::model::leave_application::{LeaveApplication, LeaveFilter};
use crate::model::lock::{LockKind, MonthlyLock};
use crate::model::settings::Settings;
use crate::model::user::{PendingUser, UserAccount};
use crate::payroll::calendar::{DateRange, MonthKey};

#[derive(Debug, Clone, Default)]
struct Tree {
    faculty: BTreeMap<EmpId, Faculty>,
    attendance: BTreeMap<(EmpId, NaiveDate), AttendanceRecord>,
    leaves: BTreeMap<String, LeaveApplication>,
    holidays: BTreeMap<NaiveDate, Holiday>,
    settings: Option<Settings>,
    locks: BTreeMap<(LockKind, MonthKey), MonthlyLock>,
    users: BTreeMap<String, UserAccount>,
    pending_users: BTreeMap<String, PendingUser>,
}

impl Tree {
    fn apply(&mut self, mutation: Mutation) -> StoreResult<()> {
        match mutation {
            Mutation::PutFaculty(faculty) => {
                self.faculty.insert(faculty.emp_id, faculty);
            }
            Mutation::DeleteFaculty(emp_id) => {
                self.faculty.remove(&emp_id);
                self.attendance.retain(|(emp, _), _| *emp != emp_id);
            }
            Mutation::AdjustCasualLeaves { emp_id, delta } => {
                let faculty = self
                    .faculty
                    .get_mut(&emp_id)
                    .ok_or_else(|| StoreError::Missing(format!("faculty {emp_id} not found")))?;
                faculty.casual_leaves += delta;
            }
            Mutation::LinkAccount { emp_id, username } => {
                let faculty = self
                    .faculty
                    .get_mut(&emp_id)
                    .ok_or_else(|| StoreError::Missing(format!("faculty {emp_id} not found")))?;
                faculty.registered = username.is_some();
                faculty.username = username;
            }
            Mutation::PutAttendance(record) => {
                self.attendance.insert(record.key(), record);
            }
            Mutation::DeleteAttendance { emp_id, date } => {
                self.attendance.remove(&(emp_id, date));
            }
            Mutation::PutLeave(leave) => {
                self.leaves.insert(leave.id.clone(), leave);
            }
            Mutation::TransitionLeave { id, from, to } => {
                let leave = self
                    .leaves
                    .get_mut(&id)
                    .ok_or_else(|| StoreError::Missing(format!("leave application {id} not found")))?;
                if leave.status != from {
                    return Err(StoreError::Conflict(format!(
                        "leave application {id} is {}, not {from}",
                        leave.status
                    )));
                }
                leave.status = to;
            }
            Mutation::DeleteLeave(id) => {
                self.leaves.remove(&id);
            }
            Mutation::PutHoliday(holiday) => {
                self.holidays.insert(holiday.date, holiday);
            }
            Mutation::DeleteHoliday(date) => {
                self.holidays.remove(&date);
            }
            Mutation::PutSettings(settings) => {
                self.settings = Some(settings);
            }
            Mutation::AcquireLock(lock) => {
                let key = (lock.kind, lock.month);
                if self.locks.contains_key(&key) {
                    return Err(StoreError::Conflict(format!("{} for {} already ran", lock.kind, lock.month)));
                }
                self.locks.insert(key, lock);
            }
            Mutation::PutUser(user) => {
                self.users.insert(user.username.clone(), user);
            }
            Mutation::DeleteUser(username) => {
                self.users.remove(&username);
            }
            Mutation::PutPendingUser(pending) => {
                self.pending_users.insert(pending.username.clone(), pending);
            }
            Mutation::DeletePendingUser(username) => {
                self.pending_users.remove(&username);
            }
        }
        Ok(())
    }
}

/// Whole data set in process memory.
///
/// A batch is applied to a copy of the tree, which replaces the live tree only
/// if every mutation succeeded.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tree: RwLock<Tree>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tree> {
        self.tree.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tree> {
        self.tree.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_faculty(&self) -> StoreResult<Vec<Faculty>> {
        Ok(self.read().faculty.values().cloned().collect())
    }

    async fn get_faculty(&self, emp_id: EmpId) -> StoreResult<Option<Faculty>> {
        Ok(self.read().faculty.get(&emp_id).cloned())
    }

    async fn attendance_between(&self, range: DateRange) -> StoreResult<Vec<AttendanceRecord>> {
        Ok(self
            .read()
            .attendance
            .values()
            .filter(|r| range.contains(r.date))
            .cloned()
            .collect())
    }

    async fn attendance_for(&self, emp_id: EmpId, range: DateRange) -> StoreResult<Vec<AttendanceRecord>> {
        Ok(self
            .read()
            .attendance
            .range((emp_id, range.start())..=(emp_id, range.end()))
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn get_attendance(&self, emp_id: EmpId, date: NaiveDate) -> StoreResult<Option<AttendanceRecord>> {
        Ok(self.read().attendance.get(&(emp_id, date)).cloned())
    }

    async fn list_leaves(&self, filter: &LeaveFilter) -> StoreResult<Vec<LeaveApplication>> {
        let mut leaves: Vec<LeaveApplication> =
            self.read().leaves.values().filter(|l| filter.matches(l)).cloned().collect();
        leaves.sort_by(|a, b| b.submission_timestamp.cmp(&a.submission_timestamp));
        Ok(leaves)
    }

    async fn get_leave(&self, id: &str) -> StoreResult<Option<LeaveApplication>> {
        Ok(self.read().leaves.get(id).cloned())
    }

    async fn list_holidays(&self) -> StoreResult<Vec<Holiday>> {
        Ok(self.read().holidays.values().cloned().collect())
    }

    async fn load_settings(&self) -> StoreResult<Option<Settings>> {
        Ok(self.read().settings.clone())
    }

    async fn get_lock(&self, kind: LockKind, month: MonthKey) -> StoreResult<Option<MonthlyLock>> {
        Ok(self.read().locks.get(&(kind, month)).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<UserAccount>> {
        Ok(self.read().users.values().cloned().collect())
    }

    async fn get_user(&self, username: &str) -> StoreResult<Option<UserAccount>> {
        Ok(self.read().users.get(username).cloned())
    }

    async fn list_pending_users(&self) -> StoreResult<Vec<PendingUser>> {
        Ok(self.read().pending_users.values().cloned().collect())
    }

    async fn get_pending_user(&self, username: &str) -> StoreResult<Option<PendingUser>> {
        Ok(self.read().pending_users.get(username).cloned())
    }

    async fn apply(&self, batch: Batch) -> StoreResult<()> {
        let mut live = self.write();
        let mut next = live.clone();
        for mutation in batch.into_mutations() {
            next.apply(mutation)?;
        }
        *live = next;
        Ok(())
    }
}
