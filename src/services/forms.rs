//! Incoming recipe payloads and their validation.
//!
//! Everything here runs before any database work, so a rejected payload never
//! opens a transaction.

use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::{
        dao::{IngredientFields, RecipeDraft, RecipeFields, StepFields},
        entities::ingredient::Measure,
    },
    error::AppError,
};

pub const MAX_TITLE_LEN: usize = 255;
pub const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },
    #[error("{field} must not be negative")]
    Negative { field: String },
    #[error("{field} is too large")]
    OutOfRange { field: String },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },
    #[error("{field} refers to an unknown {entity} ({id})")]
    UnknownChild {
        field: String,
        entity: &'static str,
        id: Uuid,
    },
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::bad_request(err.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: Option<i64>,
    pub image: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub steps: Vec<StepForm>,
    #[serde(default)]
    pub ingredients: Vec<IngredientForm>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepForm {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngredientForm {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub measure: Option<Measure>,
}

/// Nested rows may omit the name; direct creation may not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildMode {
    Nested,
    Direct,
}

impl RecipeForm {
    pub fn validate(self) -> Result<RecipeDraft, ValidationError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::Required {
                field: "title".to_string(),
            });
        }
        check_len("title", &title, MAX_TITLE_LEN)?;

        let recipe = RecipeFields {
            title,
            description: self.description,
            duration_minutes: minutes("duration_minutes", self.duration_minutes)?,
            image: self.image.filter(|image| !image.trim().is_empty()),
            is_public: self.is_public,
        };

        let mut steps = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.into_iter().enumerate() {
            if let Some(fields) = step.validate_at(&format!("steps[{index}]"), ChildMode::Nested)? {
                steps.push(fields);
            }
        }

        let mut ingredients = Vec::with_capacity(self.ingredients.len());
        for (index, ingredient) in self.ingredients.into_iter().enumerate() {
            let field = format!("ingredients[{index}]");
            if let Some(fields) = ingredient.validate_at(&field, ChildMode::Nested)? {
                ingredients.push(fields);
            }
        }

        Ok(RecipeDraft {
            recipe,
            steps,
            ingredients,
        })
    }
}

impl StepForm {
    fn is_blank(&self) -> bool {
        self.id.is_none()
            && blank(self.name.as_deref())
            && blank(self.description.as_deref())
            && self.duration_minutes.is_none()
    }

    /// `Ok(None)` for an all-empty nested row, which is skipped.
    pub fn validate_at(self, prefix: &str, mode: ChildMode) -> Result<Option<StepFields>, ValidationError> {
        if mode == ChildMode::Nested && self.is_blank() {
            return Ok(None);
        }

        let name = child_name(prefix, self.name, mode)?;
        Ok(Some(StepFields {
            id: self.id,
            name,
            description: self.description.unwrap_or_default(),
            duration_minutes: minutes(&format!("{prefix}.duration_minutes"), self.duration_minutes)?,
        }))
    }
}

impl IngredientForm {
    fn is_blank(&self) -> bool {
        self.id.is_none()
            && blank(self.name.as_deref())
            && self.quantity.is_none()
            && self.measure.is_none()
    }

    pub fn validate_at(
        self,
        prefix: &str,
        mode: ChildMode,
    ) -> Result<Option<IngredientFields>, ValidationError> {
        if mode == ChildMode::Nested && self.is_blank() {
            return Ok(None);
        }

        let name = child_name(prefix, self.name, mode)?;
        let quantity = match self.quantity {
            Some(quantity) if quantity.is_nan() || quantity.is_infinite() => {
                return Err(ValidationError::OutOfRange {
                    field: format!("{prefix}.quantity"),
                });
            }
            Some(quantity) if quantity < 0.0 => {
                return Err(ValidationError::Negative {
                    field: format!("{prefix}.quantity"),
                });
            }
            other => other,
        };

        Ok(Some(IngredientFields {
            id: self.id,
            name,
            quantity,
            measure: self.measure,
        }))
    }
}

fn blank(value: Option<&str>) -> bool {
    value.is_none_or(|value| value.trim().is_empty())
}

fn child_name(prefix: &str, name: Option<String>, mode: ChildMode) -> Result<String, ValidationError> {
    let name = name.map(|name| name.trim().to_string()).unwrap_or_default();
    let field = format!("{prefix}.name");
    if name.is_empty() && mode == ChildMode::Direct {
        return Err(ValidationError::Required { field });
    }
    check_len(&field, &name, MAX_NAME_LEN)?;
    Ok(name)
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

fn minutes(field: &str, value: Option<i64>) -> Result<Option<i32>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    i32::try_from(value)
        .map(Some)
        .map_err(|_| ValidationError::OutOfRange {
            field: field.to_string(),
        })
}
