use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One issued certificate. Rows are immutable; regeneration inserts a new
/// row instead of touching the old one.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: Uuid,
    pub certificate_number: String,
    pub pdf_url: String,
    pub pdf_path: String,
    pub pet_name: String,
    pub species: String,
    pub breed: String,
    pub age: String,
    pub sex: String,
    pub test_type: String,
    pub test_brand: String,
    pub test_date: NaiveDate,
    pub result: String,
    pub vet_name: String,
    pub clinic_name: String,
    pub district: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub district: Option<String>,
    pub notes: Option<String>,
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Field values for a certificate row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewCertificate {
    pub certificate_number: String,
    pub pdf_url: String,
    pub pdf_path: String,
    pub pet_name: String,
    pub species: String,
    pub breed: String,
    pub age: String,
    pub sex: String,
    pub test_type: String,
    pub test_brand: String,
    pub test_date: NaiveDate,
    pub result: String,
    pub vet_name: String,
    pub clinic_name: String,
    pub district: String,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Species {
    Canino,
    Felino,
    Ave,
    Roedor,
    Reptil,
    Otro,
}

impl Species {
    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Canino => "Canino",
            Species::Felino => "Felino",
            Species::Ave => "Ave",
            Species::Roedor => "Roedor",
            Species::Reptil => "Reptil",
            Species::Otro => "Otro",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Macho,
    Hembra,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Macho => "Macho",
            Sex::Hembra => "Hembra",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestResult {
    Negativo,
    Positivo,
    Indeterminado,
}

impl TestResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestResult::Negativo => "NEGATIVO",
            TestResult::Positivo => "POSITIVO",
            TestResult::Indeterminado => "INDETERMINADO",
        }
    }
}
