//! Building conversation append requests from matched device records.
//!
//! This is the only place SMS bodies are shortened; readers hand over the
//! full text and the metadata keeps it.

use devsync_types::{
    CallKind, CallLogEntry, ChannelMetadata, ContactId, ConversationAppendRequest,
    ConversationMetadata, ConversationType, Direction, RawActivityRecord, SmsEntry,
};

/// Appended to previews that were cut.
pub const ELLIPSIS: &str = "...";

/// Builds the append request for a record matched to `contact_id`.
pub fn build_append_request(
    contact_id: ContactId,
    record: &RawActivityRecord,
    preview_max_chars: usize,
) -> ConversationAppendRequest {
    match record {
        RawActivityRecord::Call(call) => call_request(contact_id, call),
        RawActivityRecord::Sms(sms) => sms_request(contact_id, sms, preview_max_chars),
    }
}

fn call_request(contact_id: ContactId, call: &CallLogEntry) -> ConversationAppendRequest {
    let direction = call.kind.direction();
    ConversationAppendRequest {
        contact_id,
        kind: ConversationType::Call,
        direction,
        preview_content: call_preview(call.kind, direction, call.duration_seconds),
        metadata: ConversationMetadata {
            detail: ChannelMetadata::Call {
                duration: call.duration_seconds,
                call_type: call.raw_type.clone(),
            },
            synced_from_device: true,
            original_timestamp: call.timestamp,
        },
    }
}

fn sms_request(
    contact_id: ContactId,
    sms: &SmsEntry,
    preview_max_chars: usize,
) -> ConversationAppendRequest {
    ConversationAppendRequest {
        contact_id,
        kind: ConversationType::Sms,
        direction: sms.mailbox.direction(),
        preview_content: truncate_preview(&sms.body, preview_max_chars),
        metadata: ConversationMetadata {
            detail: ChannelMetadata::Sms {
                full_message: sms.body.clone(),
                read: sms.read,
                message_type: sms.raw_type,
            },
            synced_from_device: true,
            original_timestamp: sms.timestamp,
        },
    }
}

/// `"Missed call"`, or `"Incoming call (1m 5s)"` / `"Outgoing call (42s)"`.
pub fn call_preview(kind: CallKind, direction: Direction, duration_seconds: u64) -> String {
    if kind == CallKind::Missed {
        return "Missed call".to_string();
    }
    let label = match direction {
        Direction::Incoming => "Incoming",
        Direction::Outgoing => "Outgoing",
    };
    format!("{label} call ({})", format_duration(duration_seconds))
}

/// `42s`, `2m`, `2m 5s`.
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }
    let (mins, secs) = (seconds / 60, seconds % 60);
    if secs > 0 {
        format!("{mins}m {secs}s")
    } else {
        format!("{mins}m")
    }
}

/// Keeps the first `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_preview(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &body[..cut]),
        None => body.to_string(),
    }
}
