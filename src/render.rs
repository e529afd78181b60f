//! Text rendering for the command line
//!
//! Every view is built through [`render_guarded`] so a bug in formatting
//! one odd record degrades to a retry message instead of aborting the
//! process.

use std::fmt::Write;
use std::panic::{self, AssertUnwindSafe};

use crate::api::SelectOption;
use crate::filters::SelectorView;
use crate::log_error;
use crate::notify::{Notice, NoticeLevel};
use crate::projector::{option_label, DisplayRecord, SearchResults};
use crate::utils::truncate_text;

const MODULE: &str = "render";

/// Shown in place of output that failed to render
pub const FALLBACK_MESSAGE: &str = "Something went wrong while displaying results. Please try again.";

const MAX_FILE_NAME_CHARS: usize = 72;

/// Run `build`, returning [`FALLBACK_MESSAGE`] if it panics
pub fn render_guarded<F>(build: F) -> String
where
    F: FnOnce() -> String,
{
    match panic::catch_unwind(AssertUnwindSafe(build)) {
        Ok(output) => output,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            log_error!(MODULE, "Rendering failed: {}", reason);
            FALLBACK_MESSAGE.to_string()
        }
    }
}

/// One record as an indented block
pub fn render_record(record: &DisplayRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", record.title);
    let _ = writeln!(
        out,
        "  {}",
        truncate_text(&record.file_name, MAX_FILE_NAME_CHARS, "...")
    );
    let _ = writeln!(
        out,
        "  Build {} | {} | {} | {} | {}",
        or_dash(&record.build_ver),
        or_dash(&record.language),
        or_dash(&record.architecture),
        record.size,
        record.push_date
    );
    if !record.sha1.is_empty() {
        let _ = writeln!(out, "  SHA1:   {}", record.sha1);
    }
    if !record.sha256.is_empty() {
        let _ = writeln!(out, "  SHA256: {}", record.sha256);
    }
    if !record.download_url.is_empty() {
        let _ = writeln!(out, "  URL:    {}", record.download_url);
    }
    out
}

pub fn render_records(records: &[DisplayRecord]) -> String {
    if records.is_empty() {
        return "No files found.\n".to_string();
    }
    records
        .iter()
        .map(render_record)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Records followed by the `matched/total` count
pub fn render_search_results(results: &SearchResults) -> String {
    let mut out = render_records(&results.records);
    let _ = writeln!(out, "\n{} files", results.count_label());
    out
}

/// `value  label` lines, marking a disabled list
pub fn render_options(title: &str, options: &[SelectOption], disabled: bool, localized: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}{}", title, if disabled { " (unavailable)" } else { "" });
    if options.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for option in options {
        let _ = writeln!(out, "  {:<16} {}", option.value, option_label(option, localized));
    }
    out
}

/// Every dropdown of a selector view
pub fn render_selector(view: &SelectorView, localized: bool) -> String {
    [
        render_options("Systems", &view.system_options, false, localized),
        render_options("Versions", &view.version_options, view.version_disabled, localized),
        render_options("Languages", &view.language_options, view.language_disabled, localized),
        render_options("Editions", &view.edition_options, view.edition_disabled, localized),
    ]
    .join("\n")
}

pub fn render_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Success => format!("[ok] {}", notice.message),
        NoticeLevel::Error => format!("[error] {}", notice.message),
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
