//! Mapping of Postgres rows onto the shared wire types.
//!
//! Ids are selected as `::text` and times/dates as `::text` so the rows
//! carry the same string formats the backend hands to any other client.

use shared_types::{
    AvailabilityRow, PetSize, PetSummary, ServicePricing, ServiceSummary, ServiceType, StaffSummary,
};
use sqlx::postgres::PgRow;
use sqlx::Row;

pub fn service_type_from_db(value: &str) -> ServiceType {
    match value.trim().to_lowercase().as_str() {
        "bath" | "banho" => ServiceType::Bath,
        "grooming" | "tosa" => ServiceType::Grooming,
        "veterinary" | "vet" | "veterinario" | "veterinário" => ServiceType::Veterinary,
        _ => ServiceType::Other,
    }
}

pub fn pet_size_from_db(value: &str) -> Option<PetSize> {
    match value.trim().to_lowercase().as_str() {
        "small" | "pequeno" => Some(PetSize::Small),
        "medium" | "medio" | "médio" => Some(PetSize::Medium),
        "large" | "grande" => Some(PetSize::Large),
        "extra_large" | "xl" | "gigante" => Some(PetSize::ExtraLarge),
        _ => None,
    }
}

fn size_column(row: &PgRow, column: &str) -> Result<PetSize, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    pet_size_from_db(&raw).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("unknown pet size {raw:?}").into(),
    })
}

fn minutes_column(row: &PgRow, column: &str) -> Result<u32, sqlx::Error> {
    let minutes: i32 = row.try_get(column)?;
    u32::try_from(minutes).map_err(|_| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("negative duration {minutes}").into(),
    })
}

pub fn availability_row(row: &PgRow) -> Result<AvailabilityRow, sqlx::Error> {
    Ok(AvailabilityRow {
        staff_profile_id: row.try_get("staff_profile_id")?,
        time_slot: row.try_get("time_slot")?,
        available: row.try_get("available")?,
        date: row.try_get("date")?,
    })
}

pub fn service_summary(row: &PgRow) -> Result<ServiceSummary, sqlx::Error> {
    let service_type: String = row.try_get("service_type")?;
    Ok(ServiceSummary {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        service_type: service_type_from_db(&service_type),
        default_duration: minutes_column(row, "default_duration")?,
        base_price: row.try_get("base_price")?,
    })
}

pub fn staff_summary(row: &PgRow) -> Result<StaffSummary, sqlx::Error> {
    Ok(StaffSummary {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        can_bathe: row.try_get("can_bathe")?,
        can_groom: row.try_get("can_groom")?,
        can_vet: row.try_get("can_vet")?,
    })
}

pub fn pet_summary(row: &PgRow) -> Result<PetSummary, sqlx::Error> {
    Ok(PetSummary {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        breed: row.try_get("breed")?,
        size: size_column(row, "size")?,
    })
}

pub fn service_pricing(row: &PgRow) -> Result<ServicePricing, sqlx::Error> {
    Ok(ServicePricing {
        service_id: row.try_get("service_id")?,
        size: size_column(row, "size")?,
        price: row.try_get("price")?,
        duration_minutes: minutes_column(row, "duration_minutes")?,
    })
}
