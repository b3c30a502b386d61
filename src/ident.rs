//! Identifier generation for catalog rows.

use uuid::Uuid;

/// Generate a fresh version-4 UUID for a new row.
///
/// Backed by the operating system's cryptographic random source, so
/// collisions are negligible and identifiers carry no ordering. Exhaustion of
/// the entropy source aborts the process; there is no recoverable error path.
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generates_version_4_layout() {
        let id = generate();
        assert_eq!(id.get_version_num(), 4);
        assert_eq!(id.get_variant(), uuid::Variant::RFC4122);

        // 13th hex digit is the version, 17th is the variant.
        let hex = id.simple().to_string();
        assert_eq!(&hex[12..13], "4");
        assert!(matches!(&hex[16..17], "8" | "9" | "a" | "b"));
    }

    #[test]
    fn sequential_identifiers_do_not_collide() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate()));
        }
    }
}
