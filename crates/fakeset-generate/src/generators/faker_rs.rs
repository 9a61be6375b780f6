use fake::Fake;
use fake::faker::address::en::{BuildingNumber, CityName, StateAbbr, StreetName, ZipCode};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::{DomainSuffix, SafeEmail};
use fake::faker::job::en::Title;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::{LastName, Name};
use rand::RngCore;

pub fn full_name(rng: &mut dyn RngCore) -> String {
    Name().fake_with_rng(rng)
}

pub fn job(rng: &mut dyn RngCore) -> String {
    Title().fake_with_rng(rng)
}

pub fn company_name(rng: &mut dyn RngCore) -> String {
    CompanyName().fake_with_rng(rng)
}

pub fn email(rng: &mut dyn RngCore) -> String {
    SafeEmail().fake_with_rng(rng)
}

/// A registrable-looking domain such as `keebler.com`.
pub fn domain_name(rng: &mut dyn RngCore) -> String {
    let label: String = LastName().fake_with_rng(rng);
    let suffix: String = DomainSuffix().fake_with_rng(rng);
    let label = slugify(&label);
    let label = if label.is_empty() {
        "example".to_string()
    } else {
        label
    };
    format!("{label}.{suffix}")
}

/// Two-line postal address; callers flatten the line break.
pub fn address(rng: &mut dyn RngCore) -> String {
    let number: String = BuildingNumber().fake_with_rng(rng);
    let street: String = StreetName().fake_with_rng(rng);
    let city: String = CityName().fake_with_rng(rng);
    let state: String = StateAbbr().fake_with_rng(rng);
    let zip: String = ZipCode().fake_with_rng(rng);
    format!("{number} {street}\n{city}, {state} {zip}")
}

pub fn sentences(count: usize, rng: &mut dyn RngCore) -> String {
    (0..count)
        .map(|_| Sentence(3..9).fake_with_rng::<String, _>(&mut *rng))
        .collect::<Vec<_>>()
        .join(" ")
}

fn slugify(value: &str) -> String {
    value
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn domain_names_have_label_and_suffix() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let domain = domain_name(&mut rng);
            let (label, suffix) = domain.split_once('.').expect("dot in domain");
            assert!(!label.is_empty());
            assert!(!suffix.is_empty());
            assert!(label.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit()));
        }
    }

    #[test]
    fn address_has_two_lines() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let value = address(&mut rng);
        assert_eq!(value.lines().count(), 2);
    }

    #[test]
    fn sentences_respect_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(sentences(0, &mut rng), "");
        let text = sentences(3, &mut rng);
        assert_eq!(text.matches('.').count(), 3);
    }
}
