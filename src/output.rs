//! Output formatting for command results.

use serde::Serialize;

use ag_app::usecases::ShellFrame;

/// Prints `data` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("✓ {message}");
}

pub fn print_info(message: &str) {
    println!("{message}");
}

pub fn print_frame(frame: &ShellFrame) {
    let redirect = frame
        .redirect
        .as_ref()
        .map(|route| format!(" -> {route}"))
        .unwrap_or_default();
    let chrome = if frame.chrome { "with chrome" } else { "bare" };
    println!("{} [{:?}, {chrome}]{redirect}", frame.route, frame.view);
}
