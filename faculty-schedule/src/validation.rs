//! Shape checks applied by the HTTP handlers before a request reaches a
//! service.

/// An identifier that is absent or zero never names a stored record.
pub fn is_id_invalid(id: Option<i64>) -> bool {
    matches!(id, None | Some(0))
}

pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}
