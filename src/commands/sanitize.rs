//! `vcrkit sanitize` command.

use crate::cassette::name::{sanitize, EXTENSION};

/// Execute the `sanitize` command.
///
/// # Errors
///
/// Never fails; returns `Result` for dispatch uniformity.
pub fn run(name: &str) -> Result<(), String> {
    println!("{}", file_name(name));
    Ok(())
}

fn file_name(name: &str) -> String {
    format!("{}.{EXTENSION}", sanitize(name))
}

#[cfg(test)]
mod tests {
    use super::file_name;

    #[test]
    fn maps_names_to_files() {
        assert_eq!(file_name("GitHub: list repos"), "GitHub_list_repos.json");
        assert_eq!(file_name("///"), "cassette.json");
    }
}
