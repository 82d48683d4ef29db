//! Match analysis IDs.
//!
//! Every analysis run gets a ULID so feedback records can point back at
//! the exact report the user reacted to. IDs sort by creation time, which
//! keeps the feedback log chronologically scannable.

use once_cell::sync::Lazy;
use ulid::Ulid;

/// Process-level session ID, generated at first access.
static SESSION_ID: Lazy<String> = Lazy::new(|| Ulid::new().to_string());

/// The ID shared by everything this process does.
#[inline]
pub fn session() -> &'static str {
    &SESSION_ID
}

/// A fresh ID for one analysis.
#[inline]
pub fn generate() -> String {
    Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_is_stable() {
        assert_eq!(session(), session());
        assert_eq!(session().len(), 26);
    }

    #[test]
    fn generated_ids_are_unique_and_ordered() {
        let older = generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let newer = generate();
        assert_ne!(older, newer);
        assert!(older < newer);
    }
}
