use rand::seq::SliceRandom;
use rand::Rng;

use regforge_core::UserData;

const FIRST_NAMES: &[&str] = &[
    "Andi", "Budi", "Citra", "Dewi", "Eka", "Fajar", "Galih", "Hendra",
    "Indra", "Joko", "Kusuma", "Lestari", "Mega", "Nanda", "Okta", "Putri",
    "Rini", "Sari", "Teguh", "Utami", "Vina", "Wahyu", "Yusuf", "Zahra",
    "Agus", "Bambang", "Cahya", "Dimas", "Endang", "Fitri", "Gunawan", "Hani",
    "Irwan", "Joni", "Kartika", "Lukman", "Maya", "Nurul", "Omar", "Putra",
    "Ratna", "Surya", "Tika", "Udin", "Vera", "Wati", "Yanto", "Zaki",
];

const LAST_NAMES: &[&str] = &[
    "Pratama", "Wijaya", "Santoso", "Kusuma", "Hidayat", "Saputra", "Nugroho",
    "Wibowo", "Suryadi", "Permana", "Setiawan", "Rahmawati", "Susanto", "Hartono",
    "Yulianto", "Kurniawan", "Suharto", "Budiman", "Hermawan", "Prasetyo",
    "Wulandari", "Purnama", "Laksana", "Mahendra", "Adrianto", "Firmansyah",
];

/// Generate a realistic display name for the registration form.
pub fn generate_display_name() -> String {
    let mut rng = rand::thread_rng();
    let first = FIRST_NAMES.choose(&mut rng).unwrap();
    let last = LAST_NAMES.choose(&mut rng).unwrap();
    format!("{} {}", first, last)
}

/// Generate a strong random password.
pub fn generate_password() -> String {
    use sha2::{Digest, Sha256};

    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();

    let mut hasher = Sha256::new();
    hasher.update(&random_bytes);
    let hash = hasher.finalize();

    // 16 hex chars + special chars for complexity requirements
    format!("{}!@#", hex::encode(&hash[..8]))
}

/// Fresh identity for one claimed job index. The mailbox address is
/// assigned later, once provisioning succeeds.
pub fn generate_user_data() -> UserData {
    UserData {
        name: generate_display_name(),
        password: generate_password(),
        email: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_has_two_parts() {
        let name = generate_display_name();
        assert_eq!(name.split_whitespace().count(), 2);
    }

    #[test]
    fn password_is_long_and_mixed() {
        let password = generate_password();
        assert_eq!(password.len(), 19);
        assert!(password.ends_with("!@#"));
        assert!(password.chars().any(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn user_data_starts_without_address() {
        let user = generate_user_data();
        assert!(user.email.is_none());
        assert!(!user.name.is_empty());
        assert!(!user.password.is_empty());
    }
}
