mod models;

pub use models::*;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub type DbPool = Arc<PgPool>;

pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(Arc::new(pool))
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

pub async fn insert_certificate(
    pool: &PgPool,
    new: &NewCertificate,
) -> Result<Certificate, sqlx::Error> {
    sqlx::query_as::<_, Certificate>(
        r#"
        INSERT INTO certificates (
            certificate_number, pdf_url, pdf_path,
            pet_name, species, breed, age, sex,
            test_type, test_brand, test_date, result,
            vet_name, clinic_name, district, created_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING *
        "#,
    )
    .bind(&new.certificate_number)
    .bind(&new.pdf_url)
    .bind(&new.pdf_path)
    .bind(&new.pet_name)
    .bind(&new.species)
    .bind(&new.breed)
    .bind(&new.age)
    .bind(&new.sex)
    .bind(&new.test_type)
    .bind(&new.test_brand)
    .bind(new.test_date)
    .bind(&new.result)
    .bind(&new.vet_name)
    .bind(&new.clinic_name)
    .bind(&new.district)
    .bind(new.created_by)
    .fetch_one(pool)
    .await
}

pub async fn get_certificate(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<Certificate>, sqlx::Error> {
    sqlx::query_as::<_, Certificate>("SELECT * FROM certificates WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Lists certificates newest first. `result` and `species` narrow the listing
/// when present (dashboard filter bar).
pub async fn list_certificates(
    pool: &PgPool,
    result: Option<&str>,
    species: Option<&str>,
) -> Result<Vec<Certificate>, sqlx::Error> {
    sqlx::query_as::<_, Certificate>(
        r#"
        SELECT * FROM certificates
        WHERE ($1::text IS NULL OR result = $1)
          AND ($2::text IS NULL OR species = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(result)
    .bind(species)
    .fetch_all(pool)
    .await
}

pub async fn list_contacts(pool: &PgPool) -> Result<Vec<Contact>, sqlx::Error> {
    sqlx::query_as::<_, Contact>("SELECT * FROM contacts ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn insert_contact(
    pool: &PgPool,
    name: &str,
    email: Option<&str>,
    phone: Option<&str>,
    district: Option<&str>,
    notes: Option<&str>,
    owner_id: Option<Uuid>,
) -> Result<Contact, sqlx::Error> {
    sqlx::query_as::<_, Contact>(
        r#"
        INSERT INTO contacts (name, email, phone, district, notes, owner_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(district)
    .bind(notes)
    .bind(owner_id)
    .fetch_one(pool)
    .await
}

pub async fn update_contact(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    email: Option<&str>,
    phone: Option<&str>,
    district: Option<&str>,
    notes: Option<&str>,
) -> Result<Option<Contact>, sqlx::Error> {
    sqlx::query_as::<_, Contact>(
        r#"
        UPDATE contacts
        SET name = $2, email = $3, phone = $4, district = $5, notes = $6
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(district)
    .bind(notes)
    .fetch_optional(pool)
    .await
}

/// Returns how many rows were deleted (0 when the id is unknown).
pub async fn delete_contact(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
