//! Terminal colors for status output.
//!
//! Respects `NO_COLOR`, `FORCE_COLOR` and TTY detection through
//! `owo-colors`' `if_supports_color()`. `--no-color` sets an in-process flag
//! that bypasses it entirely.

use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

static NO_COLOR_FLAG: AtomicBool = AtomicBool::new(false);

/// Call once from main.rs when `--no-color` is passed.
pub fn set_no_color() {
    NO_COLOR_FLAG.store(true, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

impl Rgb {
    const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }
}

const OK: Rgb = Rgb::from_hex(0x10B981);
const WARN: Rgb = Rgb::from_hex(0xF59E0B);
const DANGER: Rgb = Rgb::from_hex(0xEF4444);
const INFO: Rgb = Rgb::from_hex(0x3B82F6);
const MUTED: Rgb = Rgb::from_hex(0x5C6370);

fn no_color() -> bool {
    NO_COLOR_FLAG.load(Ordering::Relaxed)
}

fn paint(text: &str, rgb: Rgb) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(Stdout, |t| t.truecolor(rgb.r, rgb.g, rgb.b))
        .to_string()
}

/// Connected, detection active, command succeeded.
pub fn ok(text: &str) -> String {
    paint(text, OK)
}

pub fn warn(text: &str) -> String {
    paint(text, WARN)
}

/// Disconnected, violation, command failed.
pub fn danger(text: &str) -> String {
    paint(text, DANGER)
}

pub fn info(text: &str) -> String {
    paint(text, INFO)
}

/// Timestamps and secondary details.
pub fn muted(text: &str) -> String {
    paint(text, MUTED)
}

pub fn bold(text: &str) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(Stdout, |t| t.bold()).to_string()
}

/// Color for a service log level (`INFO`, `WARNING`, `ERROR`, ...).
pub fn log_level(level: &str) -> String {
    match level.to_ascii_uppercase().as_str() {
        "ERROR" | "CRITICAL" => danger(level),
        "WARNING" | "WARN" => warn(level),
        "SUCCESS" => ok(level),
        "INFO" => info(level),
        _ => muted(level),
    }
}
