// --- Default value functions ---

pub(super) fn default_name() -> String {
    "pollcast".to_string()
}
pub(super) fn default_data_dir() -> String {
    "~/.pollcast".to_string()
}
pub(super) fn default_log_level() -> String {
    "info".to_string()
}
pub(super) fn default_true() -> bool {
    true
}
pub(super) fn default_command_prefix() -> String {
    "/".to_string()
}
pub(super) fn default_relay_timeout() -> u64 {
    15
}
pub(super) fn default_recipient_type() -> String {
    "group".to_string()
}
pub(super) fn default_whatsapp_api_base() -> String {
    "https://graph.facebook.com/v21.0".to_string()
}
pub(super) fn default_sheets_api_base() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}
