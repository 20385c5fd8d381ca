//! Helpers for the pipe-delimited update information embedded in AppImages.

/// Separator between the fields of an update information string.
pub const FIELD_SEPARATOR: char = '|';

/// The update method named by the first field, e.g. `ocs-v1-appimagehub-direct`.
pub fn method_of(update_info: &str) -> &str {
    update_info
        .split(FIELD_SEPARATOR)
        .next()
        .unwrap_or_default()
}

/// Splits update information into exactly `N` fields, or `None` when the count differs.
pub fn split_fields<const N: usize>(update_info: &str) -> Option<[&str; N]> {
    let fields: Vec<&str> = update_info.split(FIELD_SEPARATOR).collect();
    fields.try_into().ok()
}
