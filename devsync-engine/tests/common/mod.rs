//! Fakes for the engine's external collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use devsync_engine::gatekeeper::{Permission, PermissionProvider, PermissionStatus};
use devsync_engine::readers::{
    CallLogProvider, NativeCallLogEntry, SmsErrorCallback, SmsProvider, SmsSuccessCallback,
};
use devsync_engine::{Contact, ContactService, NotificationHook, SyncError, SyncResult};
use devsync_types::{ContactId, ConversationAppendRequest, EpochMillis};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ── Notifier ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingNotifier {
    pub successes: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
    pub infos: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }
}

impl NotificationHook for RecordingNotifier {
    fn show_success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn show_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn show_info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }
}

// ── Contact backend ──────────────────────────────────────────────

pub fn contact(id: &str, name: &str, phone: &str) -> Contact {
    Contact {
        id: ContactId::new(id),
        name: name.to_string(),
        phone: phone.to_string(),
        alternate_phones: Vec::new(),
        email: None,
        company: None,
    }
}

#[derive(Default)]
pub struct FakeContactService {
    pub contacts: Mutex<Vec<Contact>>,
    pub appended: Mutex<Vec<ConversationAppendRequest>>,
    pub get_calls: AtomicUsize,
    pub fail_get: Mutex<bool>,
    /// Append attempts (1-based) that should fail.
    pub fail_attempts: Mutex<HashSet<usize>>,
    /// Contact ids whose appends always fail.
    pub fail_contacts: Mutex<HashSet<String>>,
    /// Runs once, right after the next successful append.
    pub on_append: Mutex<Option<Box<dyn FnOnce() + Send>>>,
    attempts: AtomicUsize,
}

impl FakeContactService {
    pub fn with_contacts(contacts: Vec<Contact>) -> Self {
        Self {
            contacts: Mutex::new(contacts),
            ..Default::default()
        }
    }

    pub fn appended(&self) -> Vec<ConversationAppendRequest> {
        self.appended.lock().unwrap().clone()
    }

    pub fn fail_attempt(&self, attempt: usize) {
        self.fail_attempts.lock().unwrap().insert(attempt);
    }

    pub fn after_next_append(&self, hook: impl FnOnce() + Send + 'static) {
        *self.on_append.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn clear_failures(&self) {
        self.fail_attempts.lock().unwrap().clear();
        self.fail_contacts.lock().unwrap().clear();
        *self.fail_get.lock().unwrap() = false;
    }
}

#[async_trait]
impl ContactService for FakeContactService {
    async fn get_contacts(&self) -> SyncResult<Vec<Contact>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_get.lock().unwrap() {
            return Err(SyncError::Network("connection refused".into()));
        }
        Ok(self.contacts.lock().unwrap().clone())
    }

    async fn add_conversation(&self, request: &ConversationAppendRequest) -> SyncResult<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_attempts.lock().unwrap().contains(&attempt)
            || self
                .fail_contacts
                .lock()
                .unwrap()
                .contains(request.contact_id.as_str())
        {
            return Err(SyncError::Api {
                status: 500,
                message: "internal error".into(),
            });
        }
        self.appended.lock().unwrap().push(request.clone());
        let hook = self.on_append.lock().unwrap().take();
        if let Some(hook) = hook {
            hook();
        }
        Ok(())
    }
}

// ── Permissions ──────────────────────────────────────────────────

#[derive(Default)]
pub struct FakePermissionProvider {
    pub granted: Mutex<HashSet<Permission>>,
    /// What a prompt answers; unlisted permissions are denied.
    pub prompt_answers: Mutex<HashMap<Permission, PermissionStatus>>,
    pub fail: Mutex<bool>,
    pub check_calls: AtomicUsize,
    pub request_calls: Mutex<Vec<Vec<Permission>>>,
}

impl FakePermissionProvider {
    pub fn granting(permissions: &[Permission]) -> Self {
        let provider = Self::default();
        provider.granted.lock().unwrap().extend(permissions.iter().copied());
        provider
    }
}

#[async_trait]
impl PermissionProvider for FakePermissionProvider {
    async fn check(&self, permission: Permission) -> SyncResult<bool> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail.lock().unwrap() {
            return Err(SyncError::Permission("activity not attached".into()));
        }
        Ok(self.granted.lock().unwrap().contains(&permission))
    }

    async fn request(
        &self,
        permissions: &[Permission],
    ) -> SyncResult<HashMap<Permission, PermissionStatus>> {
        self.request_calls.lock().unwrap().push(permissions.to_vec());
        if *self.fail.lock().unwrap() {
            return Err(SyncError::Permission("activity not attached".into()));
        }
        let answers = self.prompt_answers.lock().unwrap();
        Ok(permissions
            .iter()
            .map(|p| (*p, answers.get(p).copied().unwrap_or(PermissionStatus::Denied)))
            .collect())
    }
}

// ── Call log ─────────────────────────────────────────────────────

pub fn native_call(phone: &str, kind: &str, duration: u64, timestamp: i64) -> NativeCallLogEntry {
    serde_json::from_value(json!({
        "phoneNumber": phone,
        "type": kind,
        "duration": duration,
        "timestamp": timestamp.to_string(),
    }))
    .unwrap()
}

#[derive(Default)]
pub struct FakeCallLogProvider {
    pub entries: Mutex<Vec<NativeCallLogEntry>>,
    pub load_calls: Mutex<Vec<(usize, EpochMillis)>>,
    pub fail: Mutex<bool>,
    /// When set, `load` waits for a notification before answering.
    pub gate: Option<Arc<Notify>>,
}

impl FakeCallLogProvider {
    pub fn with_entries(entries: Vec<NativeCallLogEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            ..Default::default()
        }
    }

    pub fn load_count(&self) -> usize {
        self.load_calls.lock().unwrap().len()
    }

    pub fn push(&self, entry: NativeCallLogEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl CallLogProvider for FakeCallLogProvider {
    async fn load(
        &self,
        limit: usize,
        min_timestamp: EpochMillis,
    ) -> SyncResult<Vec<NativeCallLogEntry>> {
        self.load_calls.lock().unwrap().push((limit, min_timestamp));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if *self.fail.lock().unwrap() {
            return Err(SyncError::Provider("call log cursor closed".into()));
        }
        // Newest first, like the device provider.
        let mut rows: Vec<NativeCallLogEntry> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.timestamp.as_i64().unwrap_or(0) >= min_timestamp.as_millis())
            .cloned()
            .collect();
        rows.sort_by_key(|e| std::cmp::Reverse(e.timestamp.as_i64()));
        rows.truncate(limit);
        Ok(rows)
    }
}

// ── SMS ──────────────────────────────────────────────────────────

pub fn native_sms(address: &str, body: &str, kind: i64, date: i64, read: i64) -> Value {
    json!({
        "_id": date,
        "address": address,
        "body": body,
        "type": kind,
        "date": date,
        "read": read,
    })
}

/// How the fake answers `list`.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub enum SmsBehaviour {
    #[default]
    Succeed,
    /// Answer from another thread after the call returned.
    SucceedLater,
    Fail,
    /// Drop both callbacks without calling either.
    Drop,
}

#[derive(Default)]
pub struct FakeSmsProvider {
    pub messages: Mutex<Vec<Value>>,
    pub filters: Mutex<Vec<String>>,
    pub behaviour: Mutex<SmsBehaviour>,
}

impl FakeSmsProvider {
    pub fn with_messages(messages: Vec<Value>) -> Self {
        Self {
            messages: Mutex::new(messages),
            ..Default::default()
        }
    }

    pub fn list_count(&self) -> usize {
        self.filters.lock().unwrap().len()
    }

    pub fn set_behaviour(&self, behaviour: SmsBehaviour) {
        *self.behaviour.lock().unwrap() = behaviour;
    }
}

impl SmsProvider for FakeSmsProvider {
    fn list(&self, filter_json: String, on_error: SmsErrorCallback, on_success: SmsSuccessCallback) {
        let filter: Value = serde_json::from_str(&filter_json).unwrap();
        self.filters.lock().unwrap().push(filter_json);
        let min_date = filter["minDate"].as_i64().unwrap_or(0);
        let rows: Vec<Value> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m["date"].as_i64().unwrap_or(0) >= min_date)
            .cloned()
            .collect();
        let payload = serde_json::to_string(&rows).unwrap();

        match *self.behaviour.lock().unwrap() {
            SmsBehaviour::Succeed => on_success(rows.len(), payload),
            SmsBehaviour::SucceedLater => {
                let count = rows.len();
                std::thread::spawn(move || {
                    std::thread::sleep(std::time::Duration::from_millis(10));
                    on_success(count, payload);
                });
            }
            SmsBehaviour::Fail => on_error("READ_SMS permission revoked".into()),
            SmsBehaviour::Drop => {}
        }
    }
}
