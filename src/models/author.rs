//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::pagination::PageQuery;

/// Author row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub biography: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl Author {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn apply(&mut self, data: UpdateAuthor) {
        self.first_name = data.first_name;
        self.last_name = data.last_name;
        self.biography = data.biography;
        self.date_of_birth = data.date_of_birth;
    }
}

impl From<CreateAuthor> for Author {
    fn from(data: CreateAuthor) -> Self {
        Self {
            id: 0,
            first_name: data.first_name,
            last_name: data.last_name,
            biography: data.biography,
            date_of_birth: data.date_of_birth,
        }
    }
}

/// Author as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDto {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub biography: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl From<Author> for AuthorDto {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            first_name: author.first_name,
            last_name: author.last_name,
            biography: author.biography,
            date_of_birth: author.date_of_birth,
        }
    }
}

/// Create author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 50, message = "First name is required (max 50 characters)"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name is required (max 50 characters)"))]
    pub last_name: String,
    #[validate(length(max = 2000, message = "Biography must be at most 2000 characters"))]
    pub biography: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Update author request (full replacement)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 50, message = "First name is required (max 50 characters)"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name is required (max 50 characters)"))]
    pub last_name: String,
    #[validate(length(max = 2000, message = "Biography must be at most 2000 characters"))]
    pub biography: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Author search query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AuthorSearchQuery {
    /// Substring of first or last name
    pub query: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl AuthorSearchQuery {
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_author_requires_names() {
        let data = CreateAuthor {
            first_name: String::new(),
            last_name: "Orwell".to_string(),
            biography: None,
            date_of_birth: None,
        };
        let errors = data.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("first_name"));
    }

    #[test]
    fn test_apply_replaces_fields() {
        let mut author = Author::from(CreateAuthor {
            first_name: "George".to_string(),
            last_name: "Orwell".to_string(),
            biography: Some("English novelist".to_string()),
            date_of_birth: None,
        });
        author.apply(UpdateAuthor {
            first_name: "Eric".to_string(),
            last_name: "Blair".to_string(),
            biography: None,
            date_of_birth: NaiveDate::from_ymd_opt(1903, 6, 25),
        });
        assert_eq!(author.full_name(), "Eric Blair");
        assert!(author.biography.is_none());
        assert_eq!(author.date_of_birth, NaiveDate::from_ymd_opt(1903, 6, 25));
    }
}
