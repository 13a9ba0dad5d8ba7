use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::ValidatedJson;
use crate::auth::Session;
use crate::db;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[validate(length(min = 1, message = "El nombre es requerido"))]
    pub name: String,
    #[validate(custom(function = "validate_optional_email", message = "Email inválido"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub district: Option<String>,
    pub notes: Option<String>,
}

/// The form sends empty strings for untouched optional fields; those are
/// fine, anything else must be a real address.
fn validate_optional_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || validator::validate_email(value) {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

fn normalize(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// GET /api/contacts
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    _session: Session,
) -> Result<Json<Value>, AppError> {
    let contacts = db::list_contacts(state.pool.as_ref()).await?;
    Ok(Json(json!({ "data": contacts })))
}

/// POST /api/contacts
pub async fn create_contact(
    State(state): State<Arc<AppState>>,
    session: Session,
    ValidatedJson(form): ValidatedJson<ContactForm>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let contact = db::insert_contact(
        state.pool.as_ref(),
        &form.name,
        normalize(&form.email),
        normalize(&form.phone),
        normalize(&form.district),
        normalize(&form.notes),
        Some(session.user_id),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "data": contact }))))
}

/// PUT /api/contacts/:id
pub async fn update_contact(
    State(state): State<Arc<AppState>>,
    _session: Session,
    Path(id): Path<Uuid>,
    ValidatedJson(form): ValidatedJson<ContactForm>,
) -> Result<Json<Value>, AppError> {
    let contact = db::update_contact(
        state.pool.as_ref(),
        id,
        &form.name,
        normalize(&form.email),
        normalize(&form.phone),
        normalize(&form.district),
        normalize(&form.notes),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Contacto no encontrado".to_string()))?;

    Ok(Json(json!({ "data": contact })))
}

/// DELETE /api/contacts/:id
pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    _session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let deleted = db::delete_contact(state.pool.as_ref(), id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Contacto no encontrado".to_string()));
    }
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_email_is_accepted() {
        let form = ContactForm {
            name: "Ana".to_string(),
            email: Some(String::new()),
            phone: None,
            district: None,
            notes: None,
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn malformed_email_is_rejected() {
        let form = ContactForm {
            name: "Ana".to_string(),
            email: Some("not-an-email".to_string()),
            phone: None,
            district: None,
            notes: None,
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn empty_name_is_rejected() {
        let form = ContactForm {
            name: String::new(),
            email: None,
            phone: None,
            district: None,
            notes: None,
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn normalize_drops_empty_strings() {
        assert_eq!(normalize(&Some(String::new())), None);
        assert_eq!(normalize(&Some("Lince".to_string())), Some("Lince"));
        assert_eq!(normalize(&None), None);
    }
}
