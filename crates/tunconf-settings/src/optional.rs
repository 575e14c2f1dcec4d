//! Field-level building blocks of the resolution algebra.
//!
//! Optional fields are `Option<T>`: `None` means no source has decided the
//! field yet, while `Some(String::new())` or `Some(Vec::new())` is an explicit
//! decision to leave it empty. Required scalars have no absent state of their
//! own, so their empty or zero value stands for "undecided".

/// A required scalar whose empty or zero value means "undecided".
pub(crate) trait Scalar: Clone {
    fn is_unset(&self) -> bool;
}

impl Scalar for String {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl Scalar for u32 {
    fn is_unset(&self) -> bool {
        *self == 0
    }
}

/// Take `other` only if `field` is absent.
pub(crate) fn merge<T: Clone>(field: &mut Option<T>, other: &Option<T>) {
    if field.is_none() {
        field.clone_from(other);
    }
}

/// Take `other` whenever it is present.
pub(crate) fn override_with<T: Clone>(field: &mut Option<T>, other: &Option<T>) {
    if other.is_some() {
        field.clone_from(other);
    }
}

/// Assign `value` if `field` is still absent.
pub(crate) fn default<T>(field: &mut Option<T>, value: T) {
    if field.is_none() {
        *field = Some(value);
    }
}

pub(crate) fn merge_scalar<T: Scalar>(field: &mut T, other: &T) {
    if field.is_unset() {
        field.clone_from(other);
    }
}

pub(crate) fn override_scalar<T: Scalar>(field: &mut T, other: &T) {
    if !other.is_unset() {
        field.clone_from(other);
    }
}

pub(crate) fn default_scalar<T: Scalar>(field: &mut T, value: T) {
    if field.is_unset() {
        *field = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_present_empty() {
        let mut field = Some(String::new());
        merge(&mut field, &Some("other".to_string()));
        assert_eq!(field, Some(String::new()));
    }

    #[test]
    fn test_merge_fills_absent_with_absent() {
        let mut field: Option<u16> = None;
        merge(&mut field, &None);
        assert_eq!(field, None);
    }

    #[test]
    fn test_override_ignores_absent() {
        let mut field = Some(1u16);
        override_with(&mut field, &None);
        assert_eq!(field, Some(1));
        override_with(&mut field, &Some(0));
        assert_eq!(field, Some(0));
    }

    #[test]
    fn test_default_only_when_absent() {
        let mut absent: Option<bool> = None;
        default(&mut absent, true);
        assert_eq!(absent, Some(true));

        let mut decided = Some(false);
        default(&mut decided, true);
        assert_eq!(decided, Some(false));
    }

    #[test]
    fn test_scalar_zero_is_unset() {
        let mut mark = 0u32;
        merge_scalar(&mut mark, &7);
        assert_eq!(mark, 7);
        override_scalar(&mut mark, &0);
        assert_eq!(mark, 7);
        default_scalar(&mut mark, 51820);
        assert_eq!(mark, 7);
    }
}
