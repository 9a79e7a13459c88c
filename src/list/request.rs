//! Inbound list parameters.

use crate::error::AppError;
use std::collections::HashMap;

/// Raw list parameters as received. `page` and `limit` of 0 mean "not given".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub page: i64,
    pub limit: i64,
    pub search: String,
    pub order_by: String,
    pub include_deleted: bool,
    /// Remaining parameters, sorted by key. Only allow-listed ones become filters.
    pub filters: Vec<(String, String)>,
}

impl ListRequest {
    /// Build from query-string parameters. Malformed `page`, `limit` or
    /// `include_deleted` values are rejected.
    pub fn from_query(params: HashMap<String, String>) -> Result<Self, AppError> {
        let mut req = ListRequest::default();
        for (k, v) in params {
            match k.as_str() {
                "page" => req.page = parse_int("page", &v)?,
                "limit" => req.limit = parse_int("limit", &v)?,
                "search" => req.search = v,
                "order_by" => req.order_by = v,
                "include_deleted" => {
                    req.include_deleted = v
                        .trim()
                        .parse()
                        .map_err(|_| AppError::invalid_parameter("include_deleted"))?;
                }
                _ => req.filters.push((k, v)),
            }
        }
        req.filters.sort();
        Ok(req)
    }

    /// Trim the search term; trim and lower-case the order key and drop it
    /// when it is not in `orderable`.
    pub fn normalized(mut self, orderable: &[&str]) -> Self {
        self.search = self.search.trim().to_string();
        self.order_by = self.order_by.trim().to_lowercase();
        if !orderable.contains(&self.order_by.as_str()) {
            self.order_by.clear();
        }
        self
    }
}

fn parse_int(name: &str, raw: &str) -> Result<i64, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse().map_err(|_| AppError::invalid_parameter(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn splits_known_keys_from_filters() {
        let req = ListRequest::from_query(query(&[
            ("page", "2"),
            ("limit", "10"),
            ("search", " ann "),
            ("order_by", "Name"),
            ("username", "ann"),
            ("email", "a@b.c"),
        ]))
        .unwrap();
        assert_eq!(req.page, 2);
        assert_eq!(req.limit, 10);
        assert_eq!(
            req.filters,
            vec![("email".to_string(), "a@b.c".to_string()), ("username".to_string(), "ann".to_string())]
        );
    }

    #[test]
    fn rejects_non_numeric_page() {
        let err = ListRequest::from_query(query(&[("page", "two")])).unwrap_err();
        assert!(err.is(ErrorKind::InvalidParameter));
        assert_eq!(err.to_string(), "Invalid parameter: `page`.");
    }

    #[test]
    fn empty_numbers_mean_not_given() {
        let req = ListRequest::from_query(query(&[("page", ""), ("limit", " ")])).unwrap();
        assert_eq!((req.page, req.limit), (0, 0));
    }

    #[test]
    fn normalizes_order_key_against_allow_list() {
        let req = ListRequest {
            search: "  bob ".into(),
            order_by: "  NAME ".into(),
            ..Default::default()
        }
        .normalized(&["id", "name"]);
        assert_eq!(req.search, "bob");
        assert_eq!(req.order_by, "name");

        let req = ListRequest {
            order_by: "password; drop table users".into(),
            ..Default::default()
        }
        .normalized(&["id", "name"]);
        assert!(req.order_by.is_empty());
    }
}
