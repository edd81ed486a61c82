pub fn config_loaded(user: &str) -> String {
    format!("Loaded configuration for user: {user}")
}

pub const STARTING: &str = "Starting Brainbot...";

pub fn logged_in(user: &str) -> String {
    format!("Logged in as {user}")
}

pub fn set_display_name_fail(err: &str) -> String {
    format!("Failed to set display name: {err}")
}

pub fn sync_loop_fail(err: &str) -> String {
    format!("Sync loop failed: {err}")
}

pub fn invite_received(room_id: &str) -> String {
    format!("💌 Received invite for room {room_id}")
}

pub fn brain_opened(backend: &str) -> String {
    format!("Brain backend ready: {backend}")
}

pub fn brain_unavailable(handler: &str, err: &str) -> String {
    format!("Brain unavailable in {handler}: {err}")
}

pub fn handler_failed(handler: &str, err: &str) -> String {
    format!("Handler {handler} failed: {err}")
}

pub fn send_failed(target: &str, err: &str) -> String {
    format!("Failed to send message to {target}: {err}")
}

pub fn reaction_failed(room_id: &str, err: &str) -> String {
    format!("Adding reaction failed in {room_id}: {err}")
}

pub fn membership_lookup_failed(room_id: &str, err: &str) -> String {
    format!("Membership lookup failed for {room_id}: {err}")
}

pub fn vote_registered(key: &str, text: &str) -> String {
    format!("Vote {key} opened: {text}")
}

pub fn vote_resolved(key: &str, passed: bool) -> String {
    let outcome = if passed { "passed" } else { "failed" };
    format!("Vote {key} {outcome}")
}

pub fn stats_reset(subscribers: usize) -> String {
    format!("Weekly stats sent to {subscribers} subscriber(s) and counters reset")
}

pub fn job_scheduled(job: &str, at: &str) -> String {
    format!("Job [{job}] next run at {at}")
}

pub fn job_failed(job: &str, err: &str) -> String {
    format!("Job [{job}] failed: {err}")
}

pub fn votes_pruned(count: usize) -> String {
    format!("Pruned {count} resolved vote(s)")
}

pub fn join_failed(room_id: &str, err: &str) -> String {
    format!("Failed to join room {room_id}: {err}")
}
