// Output formatting helpers for CLI commands
// Decorated progress lines go to stderr so stdout carries only expansion output

const CYAN_BOLD: &str = "1;36";
const GREEN: &str = "32";
const GREEN_BOLD: &str = "1;32";
const YELLOW: &str = "33";
const RED_BOLD: &str = "1;31";
const DIM: &str = "2";

fn emit(style: &str, label: &str, message: &str) {
    eprintln!("\x1b[{}m{}\x1b[0m {}", style, label, message);
}

/// Right-aligned action word followed by a message
pub fn status(action: &str, message: &str) {
    emit(CYAN_BOLD, &format!("{:>12}", action), message);
}

pub fn success(message: &str) {
    emit(GREEN_BOLD, "  \u{2713}", message);
}

pub fn check(message: &str) {
    emit(GREEN, "  \u{2713}", message);
}

pub fn warning(message: &str) {
    emit(YELLOW, "  !", message);
}

pub fn error(message: &str) {
    emit(RED_BOLD, "error:", message);
}

/// One axis with its candidate values: "    rvm  2.0.0, 1.9.3"
pub fn axis(name: &str, values: &[String], gated: bool) {
    let marker = if gated { " (gated)" } else { "" };
    emit(DIM, &format!("{:>12}", name), &format!("{}{}", values.join(", "), marker));
}
