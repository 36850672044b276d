//! Content-based listing similarity for "you may also like" ordering.
//!
//! Pure functions over listing data; no side effects and no store access.

use crate::model::Hotel;
use rand::seq::SliceRandom;

/// Similarity of `candidate` to `reference`:
/// 2 for a city match, 2 for a type match, 1 for a country match, plus one
/// point per shared facility.
pub fn score(candidate: &Hotel, reference: &Hotel) -> u32 {
    let mut score = 0;
    if candidate.city == reference.city {
        score += 2;
    }
    if candidate.kind == reference.kind {
        score += 2;
    }
    if candidate.country == reference.country {
        score += 1;
    }
    score += candidate
        .facilities
        .iter()
        .filter(|f| reference.facilities.contains(f))
        .count() as u32;
    score
}

/// Top `k` candidates by similarity to `reference`.
///
/// The reference itself is excluded, zero-scored candidates are dropped, and
/// ties keep the candidates' original relative order (stable sort).
pub fn recommend(reference: &Hotel, candidates: &[Hotel], k: usize) -> Vec<Hotel> {
    let mut scored: Vec<(u32, &Hotel)> = candidates
        .iter()
        .filter(|h| h.id != reference.id)
        .map(|h| (score(h, reference), h))
        .filter(|(s, _)| *s > 0)
        .collect();

    scored.sort_by_key(|(s, _)| std::cmp::Reverse(*s));
    scored.into_iter().take(k).map(|(_, h)| h.clone()).collect()
}

/// Unordered sample of `k` listings, used when there is no reference or
/// nothing scores above zero. Non-deterministic by design.
pub fn fallback_sample(candidates: &[Hotel], k: usize) -> Vec<Hotel> {
    candidates
        .choose_multiple(&mut rand::thread_rng(), k)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn hotel(name: &str, city: &str, kind: &str, country: &str, facilities: &[&str]) -> Hotel {
        Hotel {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: name.to_string(),
            city: city.to_string(),
            country: country.to_string(),
            description: String::new(),
            kind: kind.to_string(),
            price_per_night: 100.0,
            star_rating: 3,
            facilities: facilities.iter().map(|f| f.to_string()).collect(),
            image_urls: Vec::new(),
            bookings: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_scoring_and_stable_ordering() {
        let reference = hotel("Ref", "Paris", "Luxury", "France", &["wifi", "pool"]);
        let candidates = vec![
            hotel("H1", "Paris", "Luxury", "France", &["wifi"]),
            hotel("H2", "Paris", "Budget", "Spain", &["pool"]),
            hotel("H3", "London", "Luxury", "France", &[]),
            hotel("H4", "London", "Budget", "Germany", &[]),
        ];

        assert_eq!(score(&candidates[0], &reference), 6);
        assert_eq!(score(&candidates[1], &reference), 3);
        assert_eq!(score(&candidates[2], &reference), 3);
        assert_eq!(score(&candidates[3], &reference), 0);

        let top = recommend(&reference, &candidates, 3);
        let names: Vec<&str> = top.iter().map(|h| h.name.as_str()).collect();
        // H2 and H3 tie at 3; their original relative order is preserved.
        assert_eq!(names, vec!["H1", "H2", "H3"]);
    }

    #[test]
    fn test_reference_is_excluded() {
        let reference = hotel("Ref", "Paris", "Luxury", "France", &["wifi"]);
        let mut candidates = vec![hotel("Other", "Paris", "Luxury", "France", &["wifi"])];
        candidates.push(reference.clone());

        let top = recommend(&reference, &candidates, 5);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "Other");
    }

    #[test]
    fn test_zero_scores_are_dropped() {
        let reference = hotel("Ref", "Paris", "Luxury", "France", &[]);
        let candidates = vec![hotel("Far", "Tokyo", "Hostel", "Japan", &["sauna"])];
        assert!(recommend(&reference, &candidates, 3).is_empty());
    }

    #[test]
    fn test_k_caps_the_result() {
        let reference = hotel("Ref", "Paris", "Luxury", "France", &[]);
        let candidates: Vec<Hotel> = (0..10)
            .map(|i| hotel(&format!("H{}", i), "Paris", "Budget", "Spain", &[]))
            .collect();
        assert_eq!(recommend(&reference, &candidates, 3).len(), 3);
    }

    #[test]
    fn test_fallback_sample_returns_distinct_listings() {
        let candidates: Vec<Hotel> = (0..10)
            .map(|i| hotel(&format!("H{}", i), "Paris", "Budget", "Spain", &[]))
            .collect();

        let sample = fallback_sample(&candidates, 3);
        assert_eq!(sample.len(), 3);
        let mut ids: Vec<Uuid> = sample.iter().map(|h| h.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_fallback_sample_with_few_candidates() {
        let candidates = vec![hotel("Only", "Paris", "Budget", "Spain", &[])];
        assert_eq!(fallback_sample(&candidates, 3).len(), 1);
    }
}
