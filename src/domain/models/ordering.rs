//! Ordering of short URL listings.

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    LongUrl,
    ShortCode,
    DateCreated,
    Visits,
    Title,
}

impl OrderField {
    /// SQL expression used by the PostgreSQL repository.
    pub fn column(&self) -> &'static str {
        match self {
            Self::LongUrl => "s.long_url",
            Self::ShortCode => "s.short_code",
            Self::DateCreated => "s.created_at",
            Self::Visits => "s.visits_count",
            Self::Title => "s.title",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Parsed `order_by` parameter, e.g. `visits-DESC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortUrlsOrdering {
    pub field: OrderField,
    pub direction: OrderDirection,
}

impl ShortUrlsOrdering {
    pub fn new(field: OrderField, direction: OrderDirection) -> Self {
        Self { field, direction }
    }
}

impl Default for ShortUrlsOrdering {
    fn default() -> Self {
        Self::new(OrderField::DateCreated, OrderDirection::Desc)
    }
}

impl FromStr for ShortUrlsOrdering {
    type Err = String;

    /// Accepts `field` or `field-DIR`. The direction defaults to ascending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.rsplit_once('-') {
            Some((field, dir)) => (field, Some(dir)),
            None => (s, None),
        };

        let field = match field {
            "long_url" | "longUrl" => OrderField::LongUrl,
            "short_code" | "shortCode" => OrderField::ShortCode,
            "date_created" | "dateCreated" => OrderField::DateCreated,
            "visits" => OrderField::Visits,
            "title" => OrderField::Title,
            other => return Err(format!("unknown order field: {other}")),
        };

        let direction = match direction.map(str::to_ascii_uppercase).as_deref() {
            None | Some("ASC") => OrderDirection::Asc,
            Some("DESC") => OrderDirection::Desc,
            Some(other) => return Err(format!("unknown order direction: {other}")),
        };

        Ok(Self::new(field, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_and_direction() {
        let ordering: ShortUrlsOrdering = "visits-DESC".parse().unwrap();
        assert_eq!(ordering.field, OrderField::Visits);
        assert_eq!(ordering.direction, OrderDirection::Desc);
    }

    #[test]
    fn test_parse_field_only_defaults_to_asc() {
        let ordering: ShortUrlsOrdering = "short_code".parse().unwrap();
        assert_eq!(ordering.field, OrderField::ShortCode);
        assert_eq!(ordering.direction, OrderDirection::Asc);
    }

    #[test]
    fn test_parse_camel_case_field() {
        let ordering: ShortUrlsOrdering = "dateCreated-asc".parse().unwrap();
        assert_eq!(ordering.field, OrderField::DateCreated);
        assert_eq!(ordering.direction, OrderDirection::Asc);
    }

    #[test]
    fn test_parse_rejects_unknown_values() {
        assert!("color-ASC".parse::<ShortUrlsOrdering>().is_err());
        assert!("visits-UP".parse::<ShortUrlsOrdering>().is_err());
    }

    #[test]
    fn test_default_is_newest_first() {
        let ordering = ShortUrlsOrdering::default();
        assert_eq!(ordering.field.column(), "s.created_at");
        assert_eq!(ordering.direction.as_sql(), "DESC");
    }
}
