//! Small shared helpers.

use chrono::{DateTime, Utc};

pub const APP_NAME: &str = "agora";

pub const DEFAULT_POST_IMAGE: &str = "https://picsum.photos/seed/default/800/400";

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

pub fn print_banner() {
    println!(
        r#"
   __ _  __ _  ___  _ __ __ _
  / _` |/ _` |/ _ \| '__/ _` |
 | (_| | (_| | (_) | | | (_| |
  \__,_|\__, |\___/|_|  \__,_|
        |___/   {APP_NAME} forum store
"#
    );
}

/// True when `text` is empty or only whitespace.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
