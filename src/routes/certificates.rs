use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::ValidatedJson;
use crate::auth::{MaybeSession, Session};
use crate::certnum::generate_certificate_number;
use crate::db::{self, NewCertificate, Sex, Species, TestResult};
use crate::error::AppError;
use crate::pdf::{render_certificate, CertificateData};
use crate::state::AppState;
use crate::storage::{object_path, SIGNED_URL_EXPIRY_SECS};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CertificateForm {
    #[validate(length(min = 1, message = "El nombre de la mascota es requerido"))]
    pub pet_name: String,
    pub species: Species,
    #[validate(length(min = 1, message = "La raza es requerida"))]
    pub breed: String,
    #[validate(length(min = 1, message = "La edad es requerida"))]
    pub age: String,
    pub sex: Sex,
    #[validate(length(min = 1, message = "El tipo de prueba es requerido"))]
    pub test_type: String,
    #[validate(length(min = 1, message = "La marca de la prueba es requerida"))]
    pub test_brand: String,
    #[validate(length(min = 1, message = "La fecha de la prueba es requerida"))]
    pub test_date: String,
    pub result: TestResult,
    #[validate(length(min = 1, message = "El nombre del veterinario es requerido"))]
    pub vet_name: String,
    #[validate(length(min = 1, message = "El nombre de la clínica es requerido"))]
    pub clinic_name: String,
    #[validate(length(min = 1, message = "El distrito es requerido"))]
    pub district: String,
}

/// Shared issue path for both generation and regeneration: allocate a
/// number, render, upload, sign, insert. The upload-then-insert sequence has
/// no compensating rollback; a failed insert can leave an orphaned object
/// behind, which is accepted for this workflow.
async fn issue_certificate(
    state: &AppState,
    fields: CertificateFields,
) -> Result<db::Certificate, AppError> {
    let issued_at = Utc::now();
    let certificate_number = generate_certificate_number(state.counter.as_ref(), issued_at).await;

    let pdf_bytes = render_certificate(&CertificateData {
        certificate_number: certificate_number.clone(),
        pet_name: fields.pet_name.clone(),
        species: fields.species.clone(),
        breed: fields.breed.clone(),
        age: fields.age.clone(),
        sex: fields.sex.clone(),
        test_type: fields.test_type.clone(),
        test_brand: fields.test_brand.clone(),
        test_date: fields.test_date,
        result: fields.result.clone(),
        vet_name: fields.vet_name.clone(),
        clinic_name: fields.clinic_name.clone(),
        district: fields.district.clone(),
        issued_at,
    })?;

    let pdf_path = object_path(&certificate_number, issued_at);
    state
        .storage
        .upload(&pdf_path, pdf_bytes, "application/pdf")
        .await?;
    let pdf_url = state
        .storage
        .signed_url(&pdf_path, SIGNED_URL_EXPIRY_SECS)
        .await?;

    let certificate = db::insert_certificate(
        state.pool.as_ref(),
        &NewCertificate {
            certificate_number,
            pdf_url,
            pdf_path,
            pet_name: fields.pet_name,
            species: fields.species,
            breed: fields.breed,
            age: fields.age,
            sex: fields.sex,
            test_type: fields.test_type,
            test_brand: fields.test_brand,
            test_date: fields.test_date,
            result: fields.result,
            vet_name: fields.vet_name,
            clinic_name: fields.clinic_name,
            district: fields.district,
            created_by: fields.created_by,
        },
    )
    .await?;

    tracing::info!(
        "Issued certificate {} at {}",
        certificate.certificate_number,
        certificate.pdf_path
    );
    Ok(certificate)
}

struct CertificateFields {
    pet_name: String,
    species: String,
    breed: String,
    age: String,
    sex: String,
    test_type: String,
    test_brand: String,
    test_date: NaiveDate,
    result: String,
    vet_name: String,
    clinic_name: String,
    district: String,
    created_by: Option<Uuid>,
}

/// POST /api/certificates/generate
///
/// Public: the form is open, but a present session associates the row with
/// its user.
pub async fn generate_certificate(
    State(state): State<Arc<AppState>>,
    MaybeSession(session): MaybeSession,
    ValidatedJson(form): ValidatedJson<CertificateForm>,
) -> Result<Json<Value>, AppError> {
    let test_date = NaiveDate::parse_from_str(&form.test_date, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("La fecha de la prueba es inválida".to_string()))?;

    let certificate = issue_certificate(
        &state,
        CertificateFields {
            pet_name: form.pet_name,
            species: form.species.as_str().to_string(),
            breed: form.breed,
            age: form.age,
            sex: form.sex.as_str().to_string(),
            test_type: form.test_type,
            test_brand: form.test_brand,
            test_date,
            result: form.result.as_str().to_string(),
            vet_name: form.vet_name,
            clinic_name: form.clinic_name,
            district: form.district,
            created_by: session.map(|s| s.user_id),
        },
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "certificateNumber": certificate.certificate_number,
        "downloadUrl": certificate.pdf_url,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateRequest {
    pub certificate_id: Uuid,
}

/// POST /api/certificates/regenerate
///
/// Reissues from an existing row's data: new number, new PDF, new object,
/// new row. The original is left untouched.
pub async fn regenerate_certificate(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(request): Json<RegenerateRequest>,
) -> Result<Json<Value>, AppError> {
    let original = db::get_certificate(state.pool.as_ref(), request.certificate_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Certificado no encontrado".to_string()))?;

    let certificate = issue_certificate(
        &state,
        CertificateFields {
            pet_name: original.pet_name,
            species: original.species,
            breed: original.breed,
            age: original.age,
            sex: original.sex,
            test_type: original.test_type,
            test_brand: original.test_brand,
            test_date: original.test_date,
            result: original.result,
            vet_name: original.vet_name,
            clinic_name: original.clinic_name,
            district: original.district,
            created_by: Some(session.user_id),
        },
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "certificateNumber": certificate.certificate_number,
        "downloadUrl": certificate.pdf_url,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ListFilter {
    pub result: Option<String>,
    pub species: Option<String>,
}

/// GET /api/certificates
pub async fn list_certificates(
    State(state): State<Arc<AppState>>,
    _session: Session,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Value>, AppError> {
    let certificates = db::list_certificates(
        state.pool.as_ref(),
        filter.result.as_deref().filter(|s| !s.is_empty()),
        filter.species.as_deref().filter(|s| !s.is_empty()),
    )
    .await?;

    Ok(Json(json!({ "data": certificates })))
}

#[derive(Debug, Deserialize)]
pub struct SignedUrlQuery {
    pub path: Option<String>,
}

/// GET /api/certificates/signed-url?path=...
pub async fn signed_url(
    State(state): State<Arc<AppState>>,
    _session: Session,
    Query(query): Query<SignedUrlQuery>,
) -> Result<Json<Value>, AppError> {
    let path = query
        .path
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("PDF path is required".to_string()))?;

    if path.contains("..") {
        return Err(AppError::BadRequest("PDF path is invalid".to_string()));
    }

    let url = state
        .storage
        .signed_url(&path, SIGNED_URL_EXPIRY_SECS)
        .await?;

    Ok(Json(json!({ "signedUrl": url })))
}
