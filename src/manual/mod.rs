//! Manual PDF loading.

mod pdf;

pub use pdf::{extract_text, load_pages};

/// Path of a sibling output file: `<manual stem><suffix>.txt`.
///
/// `manual.pdf` with suffix `_stuff` becomes `manual_stuff.txt`; a path
/// without a `.pdf` extension keeps its full name as the stem.
pub fn output_path(manual: &std::path::Path, suffix: &str) -> std::path::PathBuf {
    let file_name = manual
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = match file_name.len().checked_sub(4) {
        Some(cut) if file_name.get(cut..).is_some_and(|ext| ext.eq_ignore_ascii_case(".pdf")) => {
            &file_name[..cut]
        }
        _ => file_name.as_str(),
    };
    manual.with_file_name(format!("{}{}.txt", stem, suffix))
}
