//! Validation callbacks and a few ready-made validators.
//!
//! A validator receives a field's candidate value and returns `Some(message)`
//! to reject it. Text validators take `&str`; multi-select validators take
//! the selected values as a slice.

/// A boxed validation callback for a single value.
pub type Validator<T> = Box<dyn Fn(&T) -> Option<String> + Send + Sync>;

/// A boxed validation callback for text.
pub type TextValidator = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// A boxed validation callback for a set of selected values.
pub type SelectionValidator<T> = Box<dyn Fn(&[T]) -> Option<String> + Send + Sync>;

/// Rejects empty or whitespace-only text.
pub fn validate_required(name: &str) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
    let message = format!("{name} is required");
    move |s: &str| s.trim().is_empty().then(|| message.clone())
}

/// Rejects text shorter than `min` characters.
pub fn validate_min_length(min: usize) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
    move |s: &str| {
        (s.chars().count() < min).then(|| format!("must be at least {min} characters"))
    }
}

/// Rejects text longer than `max` characters.
pub fn validate_max_length(max: usize) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
    move |s: &str| (s.chars().count() > max).then(|| format!("must be at most {max} characters"))
}

/// Rejects text that does not look like an email address.
pub fn validate_email() -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
    |s: &str| {
        let valid = s
            .split_once('@')
            .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));
        (!valid).then(|| "invalid email address".to_string())
    }
}

/// Rejects selections with fewer than `min` values.
pub fn validate_min_selected<T: 'static>(min: usize) -> impl Fn(&[T]) -> Option<String> + Send + Sync + 'static {
    move |values: &[T]| {
        (values.len() < min).then(|| match min {
            1 => "select at least one option".to_string(),
            n => format!("select at least {n} options"),
        })
    }
}
