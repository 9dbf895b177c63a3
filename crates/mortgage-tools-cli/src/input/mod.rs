pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Calculator input from `--input <file.json>`, else from JSON piped on
/// stdin. `None` means the caller should fall back to flags.
pub fn read_input<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => file::read_json(path).map(Some),
        None => stdin::read_stdin(),
    }
}
