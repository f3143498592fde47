use std::{env, sync::OnceLock};

use crate::{ClientError, controller::Confirmation};
use anyhow::Error as AnyhowError;
use clap::{Command, builder::Arg};
use locale_config::Locale;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    English,
    Vietnamese,
}

const PLACEHOLDER_PREFIX: &str = "i18n:";
const LANGUAGE_ENV_KEY: &str = "LINGUAFLOW_LANG";

static LANGUAGE: OnceLock<Language> = OnceLock::new();
static MESSAGES: OnceLock<Messages> = OnceLock::new();

fn interpolate(template: &str, values: &[(&str, String)]) -> String {
    let mut result = template.to_owned();
    for (key, value) in values {
        let placeholder = format!("{{{key}}}");
        result = result.replace(&placeholder, value);
    }
    result
}

pub fn language() -> Language {
    *LANGUAGE.get_or_init(detect_language)
}

pub fn messages() -> &'static Messages {
    MESSAGES.get_or_init(|| Messages { language: language() })
}

fn detect_language() -> Language {
    if let Ok(value) = env::var(LANGUAGE_ENV_KEY) {
        if let Some(lang) = parse_language_tag(&value) {
            return lang;
        }
    }

    let locale = Locale::user_default();
    for (_category, tag) in locale.tags() {
        if let Some(lang) = parse_language_tag(tag.as_ref()) {
            return lang;
        }
    }

    Language::English
}

fn parse_language_tag(raw: &str) -> Option<Language> {
    let mut normalized = raw
        .trim()
        .split('=')
        .next_back()
        .unwrap_or(raw)
        .replace('_', "-")
        .to_ascii_lowercase();

    if let Some(idx) = normalized.find('@') {
        normalized.truncate(idx);
    }
    if let Some(idx) = normalized.find('.') {
        normalized.truncate(idx);
    }

    if normalized.is_empty() {
        return None;
    }
    if normalized == "vi" || normalized.starts_with("vi-") {
        return Some(Language::Vietnamese);
    }
    if normalized.starts_with("en") {
        return Some(Language::English);
    }

    None
}

pub struct Messages {
    language: Language,
}

impl Messages {
    pub fn error_prefix(&self) -> &'static str {
        self.text("errors.prefix")
    }

    pub fn confirm_prompt(&self, question: Confirmation) -> String {
        format!("{} {} ", self.text(question.message_key()), self.text("confirm.suffix"))
    }

    pub fn cancelled(&self) -> &'static str {
        self.text("confirm.cancelled")
    }

    pub fn password_prompt(&self) -> &'static str {
        self.text("prompt.password")
    }

    pub fn confirm_password_prompt(&self) -> &'static str {
        self.text("prompt.confirm_password")
    }

    pub fn suggestion_prompt(&self) -> &'static str {
        self.text("prompt.suggestion")
    }

    pub fn logged_in(&self, user: &str) -> String {
        interpolate(self.text("session.logged_in"), &[("user", user.to_string())])
    }

    pub fn registered(&self, user: &str) -> String {
        interpolate(self.text("session.registered"), &[("user", user.to_string())])
    }

    pub fn guest_mode(&self) -> &'static str {
        self.text("session.guest")
    }

    pub fn logged_out(&self) -> &'static str {
        self.text("session.logged_out")
    }

    pub fn status_lines(&self, authenticated: bool, view: &str, api_url: &str) -> String {
        let session = if authenticated {
            self.text("status.authenticated")
        } else {
            self.text("status.anonymous")
        };
        interpolate(
            self.text("status.summary"),
            &[
                ("session", session.to_string()),
                ("view", view.to_string()),
                ("url", api_url.to_string()),
            ],
        )
    }

    pub fn translate_box(&self, source: &str, target: &str) -> String {
        interpolate(
            self.text("status.translate_box"),
            &[("source", source.to_string()), ("target", target.to_string())],
        )
    }

    pub fn indicators(&self, saved: bool, rating: Option<&str>, suggested: bool) -> String {
        interpolate(
            self.text("status.indicators"),
            &[
                ("saved", self.yes_no(saved).to_string()),
                ("rating", rating.unwrap_or("-").to_string()),
                ("suggested", self.yes_no(suggested).to_string()),
            ],
        )
    }

    fn yes_no(&self, value: bool) -> &'static str {
        if value { self.text("common.yes") } else { self.text("common.no") }
    }

    pub fn translating(&self) -> &'static str {
        self.text("translate.busy")
    }

    pub fn nothing_to_translate(&self) -> &'static str {
        self.text("translate.empty")
    }

    pub fn nothing_selected(&self) -> &'static str {
        self.text("translate.nothing_selected")
    }

    pub fn saved_default(&self) -> &'static str {
        self.text("save.saved")
    }

    pub fn unsaved_default(&self) -> &'static str {
        self.text("save.unsaved")
    }

    pub fn rating_default(&self) -> &'static str {
        self.text("rate.received")
    }

    pub fn rating_cleared(&self, rating: &str) -> String {
        interpolate(self.text("rate.cleared"), &[("rating", rating.to_string())])
    }

    pub fn suggestion_default(&self) -> &'static str {
        self.text("suggest.sent")
    }

    pub fn item_deleted_default(&self) -> &'static str {
        self.text("delete.item_deleted")
    }

    pub fn history_cleared_default(&self) -> &'static str {
        self.text("delete.history_cleared")
    }

    pub fn saved_cleared_default(&self) -> &'static str {
        self.text("delete.saved_cleared")
    }

    pub fn history_opened(&self, id: i64) -> String {
        interpolate(self.text("history.opened"), &[("id", id.to_string())])
    }

    pub fn panel_login_required(&self) -> &'static str {
        self.text("panel.login_required")
    }

    pub fn no_history(&self) -> &'static str {
        self.text("panel.no_history")
    }

    pub fn no_saved(&self) -> &'static str {
        self.text("panel.no_saved")
    }

    pub fn history_title(&self) -> &'static str {
        self.text("panel.history_title")
    }

    pub fn saved_title(&self) -> &'static str {
        self.text("panel.saved_title")
    }

    pub fn theme_current(&self, theme: &str) -> String {
        interpolate(self.text("theme.current"), &[("theme", theme.to_string())])
    }

    pub fn theme_set(&self, theme: &str) -> String {
        interpolate(self.text("theme.set"), &[("theme", theme.to_string())])
    }

    pub fn api_url_set(&self, url: &str) -> String {
        interpolate(self.text("config.api_url_set"), &[("url", url.to_string())])
    }

    pub fn render_anyhow(&self, err: &AnyhowError) -> String {
        if let Some(client) = err.downcast_ref::<ClientError>() {
            return self.render_client_error(client);
        }
        for cause in err.chain().skip(1) {
            if let Some(client) = cause.downcast_ref::<ClientError>() {
                return self.render_client_error(client);
            }
        }
        err.to_string()
    }

    fn render_client_error(&self, error: &ClientError) -> String {
        let message = self.text(error.message_key());
        let placeholders = error.placeholders();
        interpolate(message, &placeholders)
    }

    fn text(&self, key: &str) -> &'static str {
        match self.language {
            Language::English => english_text(key),
            Language::Vietnamese => vietnamese_text(key).unwrap_or_else(|| english_text(key)),
        }
    }

    pub fn translate_placeholder(&self, candidate: &str) -> Option<&'static str> {
        let key = candidate.trim().strip_prefix(PLACEHOLDER_PREFIX)?;
        Some(self.text(key))
    }
}

pub fn localize_command(mut command: Command, messages: &Messages) -> Command {
    if let Some(about) = command
        .get_about()
        .and_then(|styled| messages.translate_placeholder(&styled.to_string()))
    {
        command = command.about(about);
    }
    if let Some(long_about) = command
        .get_long_about()
        .and_then(|styled| messages.translate_placeholder(&styled.to_string()))
    {
        command = command.long_about(long_about);
    }

    command = command.mut_args(|arg| localize_arg(arg, messages));
    command = command.mut_subcommands(|sub| localize_command(sub, messages));
    command
}

fn localize_arg(mut arg: Arg, messages: &Messages) -> Arg {
    if let Some(help) = arg
        .get_help()
        .and_then(|styled| messages.translate_placeholder(&styled.to_string()))
    {
        arg = arg.help(help);
    }

    if let Some(long_help) = arg
        .get_long_help()
        .and_then(|styled| messages.translate_placeholder(&styled.to_string()))
    {
        arg = arg.long_help(long_help);
    }

    arg
}

fn english_text(key: &str) -> &'static str {
    match key {
        "cli.about" => "LinguaFlow translation client",
        "cli.version_flag_help" => "Show version information and exit.",
        "cli.root_help" => "Override the root directory for all client data.",
        "cli.api_url_help" => "Override the translation backend URL.",
        "command.login.about" => "Log in and store the access token.",
        "command.register.about" => "Create an account and log in.",
        "command.guest.about" => "Continue without an account.",
        "command.logout.about" => "Forget the stored access token.",
        "command.status.about" => "Show the session and the current translation.",
        "command.translate.about" => "Translate text with the selected languages.",
        "command.save.about" => "Save or unsave the current translation.",
        "command.like.about" => "Like the current translation (again to undo).",
        "command.dislike.about" => "Dislike the current translation (again to undo).",
        "command.suggest.about" => "Suggest a better translation.",
        "command.history.about" => "Browse and manage translation history.",
        "command.history.list.about" => "List history records.",
        "command.history.open.about" => "Load a history record into the translate box.",
        "command.history.delete.about" => "Delete one history record.",
        "command.history.clear.about" => "Delete all history records.",
        "command.saved.about" => "Browse and manage saved translations.",
        "command.saved.list.about" => "List saved translations.",
        "command.saved.delete.about" => "Delete one saved translation.",
        "command.saved.clear.about" => "Delete all saved translations.",
        "command.theme.about" => "Show or change the colour theme.",
        "command.theme.show.about" => "Show the current theme.",
        "command.theme.toggle.about" => "Switch between dark and light.",
        "command.theme.set.about" => "Set the theme explicitly.",
        "command.config.about" => "Inspect or change client settings.",
        "command.config.show.about" => "Print the effective settings.",
        "command.config.set_api_url.about" => "Store a new backend URL.",
        "args.username" => "Account username",
        "args.password" => "Password (prompted when omitted)",
        "args.confirm_password" => "Password confirmation (prompted when omitted)",
        "args.translate.text" => "Text to translate",
        "args.translate.from" => "Source language code",
        "args.translate.to" => "Target language code",
        "args.suggest.text" => "Suggested translation (prompted when omitted)",
        "args.search" => "Filter records on the server",
        "args.full" => "Include saved status for every record",
        "args.format" => "Output format",
        "args.id" => "Record identifier",
        "args.yes" => "Skip the confirmation prompt",
        "args.theme" => "Theme name",
        "args.url" => "Backend base URL",
        "errors.prefix" => "Error:",
        "common.yes" => "yes",
        "common.no" => "no",
        "confirm.delete_item" => "Delete this item?",
        "confirm.clear_history" => "Are you sure you want to delete ALL history?",
        "confirm.clear_saved" => "Are you sure you want to delete ALL saved translations?",
        "confirm.suffix" => "[y/N]",
        "confirm.cancelled" => "Cancelled.",
        "prompt.password" => "Password: ",
        "prompt.confirm_password" => "Confirm password: ",
        "prompt.suggestion" => "Enter a better translation: ",
        "session.logged_in" => "Logged in as {user}.",
        "session.registered" => "Account created. Logged in as {user}.",
        "session.guest" => "Continuing as guest.",
        "session.logged_out" => "Logged out.",
        "status.authenticated" => "logged in",
        "status.anonymous" => "guest",
        "status.summary" => "Session: {session}\nView: {view}\nBackend: {url}",
        "status.translate_box" => "Languages: {source} -> {target}",
        "status.indicators" => "Saved: {saved}  Rating: {rating}  Suggested: {suggested}",
        "translate.busy" => "Translating...",
        "translate.empty" => "Nothing to translate.",
        "translate.nothing_selected" => "Translate something first.",
        "save.saved" => "Saved successfully",
        "save.unsaved" => "Removed from saved translations.",
        "rate.received" => "Rating received",
        "rate.cleared" => "Removed your {rating}.",
        "suggest.sent" => "Suggestion sent",
        "delete.item_deleted" => "Item deleted",
        "delete.history_cleared" => "History cleared",
        "delete.saved_cleared" => "All saved translations deleted",
        "history.opened" => "Loaded history record #{id} into the translate box.",
        "panel.login_required" => "Please login to view and save your translation history.",
        "panel.no_history" => "No history records.",
        "panel.no_saved" => "No saved translations.",
        "panel.history_title" => "Translation history",
        "panel.saved_title" => "Saved translations",
        "theme.current" => "Theme: {theme}",
        "theme.set" => "Theme set to {theme}.",
        "config.api_url_set" => "Backend URL set to {url}.",
        "client.network" => "Connection error: {error}",
        "client.api_error" => "{detail}",
        "client.decode" => "Unexpected response from {url}: {error}",
        "client.session_expired" => "Your session has expired. Please login again.",
        "client.login_required.save" => "Please login to save.",
        "client.login_required.rate" => "Please login to rate.",
        "client.login_required.suggest" => "Please login to suggest.",
        "client.login_required.delete" => "Please login to delete records.",
        "client.login_required.history" => {
            "Please login to view and save your translation history."
        }
        "client.missing_token" => "Not logged in; refusing to call {url}.",
        "client.history_item_not_found" => "History record #{id} not found.",
        "client.invalid_api_url" => "Invalid backend URL '{url}': {error}",
        "client.unsupported_api_scheme" => "Backend URL '{url}' must use http or https.",
        "client.http_client" => "Failed to build HTTP client: {error}",
        "core.create_dir_failed" => "Failed to create directory {path}: {error}",
        "core.read_file_failed" => "Failed to read {path}: {error}",
        "core.write_file_failed" => "Failed to write {path}: {error}",
        "core.remove_file_failed" => "Failed to remove {path}: {error}",
        "core.parse_settings_failed" => "Failed to parse settings file {path}: {error}",
        "core.parse_state_failed" => "Failed to parse state file {path}: {error}",
        "core.serialise_toml_failed" => "Failed to serialise TOML document: {error}",
        "core.home_dir_unknown" => "Unable to determine user home directory for LINGUAFLOW_ROOT",
        _ => panic!("missing English text for key '{key}'"),
    }
}

fn vietnamese_text(key: &str) -> Option<&'static str> {
    Some(match key {
        "cli.about" => "Trình khách dịch thuật LinguaFlow",
        "cli.version_flag_help" => "Hiển thị phiên bản rồi thoát.",
        "cli.root_help" => "Ghi đè thư mục gốc chứa dữ liệu của trình khách.",
        "cli.api_url_help" => "Ghi đè địa chỉ máy chủ dịch.",
        "command.login.about" => "Đăng nhập và lưu mã truy cập.",
        "command.register.about" => "Tạo tài khoản và đăng nhập.",
        "command.guest.about" => "Tiếp tục mà không cần tài khoản.",
        "command.logout.about" => "Xoá mã truy cập đã lưu.",
        "command.status.about" => "Hiển thị phiên và bản dịch hiện tại.",
        "command.translate.about" => "Dịch văn bản với cặp ngôn ngữ đã chọn.",
        "command.save.about" => "Lưu hoặc bỏ lưu bản dịch hiện tại.",
        "command.like.about" => "Thích bản dịch hiện tại (chọn lại để huỷ).",
        "command.dislike.about" => "Không thích bản dịch hiện tại (chọn lại để huỷ).",
        "command.suggest.about" => "Đề xuất bản dịch tốt hơn.",
        "command.history.about" => "Xem và quản lý lịch sử dịch.",
        "command.history.list.about" => "Liệt kê lịch sử dịch.",
        "command.history.open.about" => "Đưa một mục lịch sử vào ô dịch.",
        "command.history.delete.about" => "Xoá một mục lịch sử.",
        "command.history.clear.about" => "Xoá toàn bộ lịch sử.",
        "command.saved.about" => "Xem và quản lý bản dịch đã lưu.",
        "command.saved.list.about" => "Liệt kê bản dịch đã lưu.",
        "command.saved.delete.about" => "Xoá một bản dịch đã lưu.",
        "command.saved.clear.about" => "Xoá toàn bộ bản dịch đã lưu.",
        "command.theme.about" => "Xem hoặc đổi giao diện màu.",
        "command.theme.show.about" => "Hiển thị giao diện hiện tại.",
        "command.theme.toggle.about" => "Chuyển giữa tối và sáng.",
        "command.theme.set.about" => "Đặt giao diện cụ thể.",
        "command.config.about" => "Xem hoặc thay đổi cấu hình.",
        "command.config.show.about" => "In cấu hình đang dùng.",
        "command.config.set_api_url.about" => "Lưu địa chỉ máy chủ mới.",
        "args.username" => "Tên đăng nhập",
        "args.password" => "Mật khẩu (sẽ hỏi nếu bỏ trống)",
        "args.confirm_password" => "Nhập lại mật khẩu (sẽ hỏi nếu bỏ trống)",
        "args.translate.text" => "Văn bản cần dịch",
        "args.translate.from" => "Mã ngôn ngữ nguồn",
        "args.translate.to" => "Mã ngôn ngữ đích",
        "args.suggest.text" => "Bản dịch đề xuất (sẽ hỏi nếu bỏ trống)",
        "args.search" => "Lọc kết quả trên máy chủ",
        "args.full" => "Kèm trạng thái đã lưu cho từng mục",
        "args.format" => "Định dạng đầu ra",
        "args.id" => "Mã mục",
        "args.yes" => "Bỏ qua bước xác nhận",
        "args.theme" => "Tên giao diện",
        "args.url" => "Địa chỉ gốc của máy chủ",
        "errors.prefix" => "Lỗi:",
        "common.yes" => "có",
        "common.no" => "không",
        "confirm.delete_item" => "Xoá mục này?",
        "confirm.clear_history" => "Bạn có chắc muốn xoá TOÀN BỘ lịch sử?",
        "confirm.clear_saved" => "Bạn có chắc muốn xoá TOÀN BỘ bản dịch đã lưu?",
        "confirm.suffix" => "[y/N]",
        "confirm.cancelled" => "Đã huỷ.",
        "prompt.password" => "Mật khẩu: ",
        "prompt.confirm_password" => "Nhập lại mật khẩu: ",
        "prompt.suggestion" => "Nhập bản dịch tốt hơn: ",
        "session.logged_in" => "Đã đăng nhập với tên {user}.",
        "session.registered" => "Đã tạo tài khoản. Đăng nhập với tên {user}.",
        "session.guest" => "Tiếp tục với tư cách khách.",
        "session.logged_out" => "Đã đăng xuất.",
        "status.authenticated" => "đã đăng nhập",
        "status.anonymous" => "khách",
        "status.summary" => "Phiên: {session}\nMàn hình: {view}\nMáy chủ: {url}",
        "status.translate_box" => "Ngôn ngữ: {source} -> {target}",
        "status.indicators" => "Đã lưu: {saved}  Đánh giá: {rating}  Đã đề xuất: {suggested}",
        "translate.busy" => "Đang dịch...",
        "translate.empty" => "Không có gì để dịch.",
        "translate.nothing_selected" => "Hãy dịch một đoạn văn bản trước.",
        "save.saved" => "Đã lưu thành công",
        "save.unsaved" => "Đã bỏ khỏi danh sách đã lưu.",
        "rate.received" => "Đã nhận đánh giá",
        "rate.cleared" => "Đã huỷ {rating}.",
        "suggest.sent" => "Đã gửi đề xuất",
        "delete.item_deleted" => "Đã xoá mục",
        "delete.history_cleared" => "Đã xoá lịch sử",
        "delete.saved_cleared" => "Đã xoá toàn bộ bản dịch đã lưu",
        "history.opened" => "Đã đưa mục lịch sử #{id} vào ô dịch.",
        "panel.login_required" => "Vui lòng đăng nhập để xem và lưu lịch sử dịch.",
        "panel.no_history" => "Chưa có lịch sử.",
        "panel.no_saved" => "Chưa có bản dịch đã lưu.",
        "panel.history_title" => "Lịch sử dịch",
        "panel.saved_title" => "Bản dịch đã lưu",
        "theme.current" => "Giao diện: {theme}",
        "theme.set" => "Đã đặt giao diện {theme}.",
        "config.api_url_set" => "Đã đặt địa chỉ máy chủ {url}.",
        "client.network" => "Lỗi kết nối: {error}",
        "client.decode" => "Phản hồi không hợp lệ từ {url}: {error}",
        "client.session_expired" => "Phiên đăng nhập đã hết hạn. Vui lòng đăng nhập lại.",
        "client.login_required.save" => "Vui lòng đăng nhập để lưu.",
        "client.login_required.rate" => "Vui lòng đăng nhập để đánh giá.",
        "client.login_required.suggest" => "Vui lòng đăng nhập để đề xuất.",
        "client.login_required.delete" => "Vui lòng đăng nhập để xoá.",
        "client.login_required.history" => "Vui lòng đăng nhập để xem và lưu lịch sử dịch.",
        "client.history_item_not_found" => "Không tìm thấy mục lịch sử #{id}.",
        "client.invalid_api_url" => "Địa chỉ máy chủ '{url}' không hợp lệ: {error}",
        "client.unsupported_api_scheme" => "Địa chỉ máy chủ '{url}' phải dùng http hoặc https.",
        "core.create_dir_failed" => "Không tạo được thư mục {path}: {error}",
        "core.read_file_failed" => "Không đọc được {path}: {error}",
        "core.write_file_failed" => "Không ghi được {path}: {error}",
        "core.remove_file_failed" => "Không xoá được {path}: {error}",
        "core.parse_settings_failed" => "Không đọc được tệp cấu hình {path}: {error}",
        "core.parse_state_failed" => "Không đọc được tệp trạng thái {path}: {error}",
        other => return Some(english_text(other)),
    })
}
