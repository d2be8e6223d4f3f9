use sha2::{Digest, Sha256};

use crate::models::{CacheFilters, CacheType};

pub struct CacheKeys;

impl CacheKeys {
    /// Analytics payload cache key: `tg:analytics:{hash}`.
    ///
    /// The hash is a SHA-256 digest over the cache type and every filter
    /// dimension, each written with a fixed label and a NUL terminator so
    /// the digest depends only on the values, never on how the filter
    /// struct was assembled. Absent dimensions hash the label with an
    /// empty value, which keeps `Some("")` and `None` distinct from each
    /// other only where the dimension itself allows empty strings.
    pub fn analytics(cache_type: CacheType, filters: &CacheFilters) -> String {
        let mut hasher = Sha256::new();

        hasher.update(b"type:");
        hasher.update(cache_type.as_str().as_bytes());
        hasher.update(b"\x00");

        hasher.update(b"period:");
        if let Some(period) = filters.period_type {
            hasher.update(period.as_str().as_bytes());
        }
        hasher.update(b"\x00");

        hasher.update(b"data:");
        if let Some(data_type) = filters.data_type {
            hasher.update(data_type.as_str().as_bytes());
        }
        hasher.update(b"\x00");

        hasher.update(b"category:");
        if let Some(ref category) = filters.category {
            hasher.update(category.as_bytes());
        }
        hasher.update(b"\x00");

        hasher.update(b"company:");
        if let Some(ref company) = filters.company {
            hasher.update(company.as_bytes());
        }
        hasher.update(b"\x00");

        hasher.update(b"location:");
        if let Some(location_id) = filters.location_id {
            hasher.update(location_id.to_string().as_bytes());
        }
        hasher.update(b"\x00");

        hasher.update(b"range:");
        if let Some(start) = filters.range_start {
            hasher.update(start.format("%Y-%m-%d").to_string().as_bytes());
        }
        hasher.update(b"..");
        if let Some(end) = filters.range_end {
            hasher.update(end.format("%Y-%m-%d").to_string().as_bytes());
        }
        hasher.update(b"\x00");

        let hash = hasher.finalize();
        format!("tg:analytics:{:x}", hash)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::models::{DataType, Granularity};

    fn sample_filters() -> CacheFilters {
        CacheFilters {
            period_type: Some(Granularity::Daily),
            data_type: Some(DataType::Sms),
            category: Some("retail".to_string()),
            company: None,
            location_id: Some(Uuid::nil()),
            range_start: NaiveDate::from_ymd_opt(2024, 3, 1),
            range_end: NaiveDate::from_ymd_opt(2024, 3, 31),
        }
    }

    #[test]
    fn identical_inputs_produce_identical_keys() {
        let a = CacheKeys::analytics(CacheType::AccountView, &sample_filters());
        let b = CacheKeys::analytics(CacheType::AccountView, &sample_filters());
        assert_eq!(a, b);
        assert!(a.starts_with("tg:analytics:"));
    }

    #[test]
    fn cache_type_participates_in_the_key() {
        let filters = sample_filters();
        let account = CacheKeys::analytics(CacheType::AccountView, &filters);
        let company = CacheKeys::analytics(CacheType::CompanyView, &filters);
        assert_ne!(account, company);
    }

    #[test]
    fn every_filter_dimension_participates_in_the_key() {
        let base = CacheKeys::analytics(CacheType::BarGraph, &sample_filters());

        let variants = [
            CacheFilters {
                period_type: Some(Granularity::Weekly),
                ..sample_filters()
            },
            CacheFilters {
                data_type: Some(DataType::Calls),
                ..sample_filters()
            },
            CacheFilters {
                category: None,
                ..sample_filters()
            },
            CacheFilters {
                company: Some("Acme".to_string()),
                ..sample_filters()
            },
            CacheFilters {
                location_id: None,
                ..sample_filters()
            },
            CacheFilters {
                range_end: NaiveDate::from_ymd_opt(2024, 4, 30),
                ..sample_filters()
            },
        ];
        for variant in &variants {
            assert_ne!(base, CacheKeys::analytics(CacheType::BarGraph, variant));
        }
    }

    #[test]
    fn absent_dimensions_do_not_bleed_into_neighbors() {
        // "category=ab, company=" must not collide with "category=a, company=b".
        let left = CacheFilters {
            category: Some("ab".to_string()),
            company: None,
            ..CacheFilters::default()
        };
        let right = CacheFilters {
            category: Some("a".to_string()),
            company: Some("b".to_string()),
            ..CacheFilters::default()
        };
        assert_ne!(
            CacheKeys::analytics(CacheType::AccountView, &left),
            CacheKeys::analytics(CacheType::AccountView, &right)
        );
    }
}
