//! Output formatting utilities.

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Prints rows as a table.
pub fn table<T: Tabled>(rows: &[T]) {
    if rows.is_empty() {
        info("No results found.");
    } else {
        println!("{}", Table::new(rows).with(Style::rounded()));
    }
}
