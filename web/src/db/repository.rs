//! Postgres implementation of the backend contracts.
//!
//! Booking, edit and profile writes go through stored procedures that own
//! the conflict and capacity rules; this layer only marshals arguments and
//! carries their errors back as [`BackendError`].

use async_trait::async_trait;
use chrono::NaiveDate;
use shared_types::{
    AvailabilityRow, BackendError, ClientProfileUpdate, ConsentUpdate, CreateBookingParams,
    EditBookingParams, PetSummary, ServicePricing, ServiceSummary, StaffSummary,
};
use sqlx::postgres::{PgDatabaseError, PgRow};
use sqlx::{PgPool, Row};

use super::entities;
use crate::backend::{
    AvailabilityAdmin, AvailabilitySource, BackendResult, BookingBackend, CatalogSource,
    ProfileBackend,
};
use crate::utils::time::{parse_date, parse_slot_time};

#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Convert a sqlx failure, keeping Postgres' message/detail/hint/SQLSTATE.
pub fn backend_error(err: sqlx::Error) -> BackendError {
    if let sqlx::Error::Database(db) = &err {
        if let Some(pg) = db.try_downcast_ref::<PgDatabaseError>() {
            return BackendError {
                message: pg.message().to_string(),
                details: pg.detail().map(str::to_string),
                hint: pg.hint().map(str::to_string),
                code: Some(pg.code().to_string()),
            };
        }
        return BackendError {
            message: db.message().to_string(),
            details: None,
            hint: None,
            code: db.code().map(|code| code.into_owned()),
        };
    }
    BackendError::new(err.to_string())
}

fn map_rows<T>(
    rows: Vec<PgRow>,
    map: fn(&PgRow) -> Result<T, sqlx::Error>,
) -> BackendResult<Vec<T>> {
    rows.iter()
        .map(map)
        .collect::<Result<Vec<_>, _>>()
        .map_err(backend_error)
}

fn invalid(what: &str, value: &str) -> BackendError {
    BackendError {
        message: format!("invalid {what}: {value}"),
        details: None,
        hint: None,
        code: None,
    }
}

#[async_trait]
impl AvailabilitySource for PgBackend {
    async fn fetch_availability(
        &self,
        date: NaiveDate,
        staff_ids: &[String],
    ) -> BackendResult<Vec<AvailabilityRow>> {
        let rows = sqlx::query(
            "SELECT staff_profile_id::text AS staff_profile_id,
                    time_slot::text AS time_slot,
                    available,
                    date::text AS date
             FROM staff_availability
             WHERE date = $1
               AND staff_profile_id::text = ANY($2)
             ORDER BY staff_profile_id, time_slot",
        )
        .bind(date)
        .bind(staff_ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(backend_error)?;

        tracing::debug!(%date, staff = staff_ids.len(), rows = rows.len(), "availability rows fetched");
        map_rows(rows, entities::availability_row)
    }
}

#[async_trait]
impl CatalogSource for PgBackend {
    async fn fetch_services(&self) -> BackendResult<Vec<ServiceSummary>> {
        let rows = sqlx::query(
            "SELECT id::text AS id,
                    name,
                    service_type,
                    default_duration,
                    base_price::float8 AS base_price
             FROM services
             WHERE active = true
             ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend_error)?;

        map_rows(rows, entities::service_summary)
    }

    async fn fetch_staff(&self) -> BackendResult<Vec<StaffSummary>> {
        let rows = sqlx::query(
            "SELECT id::text AS id, name, can_bathe, can_groom, can_vet
             FROM staff_profiles
             WHERE active = true
             ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend_error)?;

        map_rows(rows, entities::staff_summary)
    }

    async fn fetch_pets(&self, user_id: &str) -> BackendResult<Vec<PetSummary>> {
        let rows = sqlx::query(
            "SELECT id::text AS id, name, breed, size
             FROM pets
             WHERE owner_id::text = $1
             ORDER BY name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend_error)?;

        map_rows(rows, entities::pet_summary)
    }

    async fn fetch_pricing(&self) -> BackendResult<Vec<ServicePricing>> {
        let rows = sqlx::query(
            "SELECT service_id::text AS service_id,
                    size,
                    price::float8 AS price,
                    duration_minutes
             FROM service_pricing",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend_error)?;

        map_rows(rows, entities::service_pricing)
    }
}

#[async_trait]
impl BookingBackend for PgBackend {
    async fn create_booking(&self, params: &CreateBookingParams) -> BackendResult<String> {
        let date = parse_date(&params.booking_date)
            .ok_or_else(|| invalid("booking date", &params.booking_date))?;
        let time = parse_slot_time(&params.time_slot)
            .ok_or_else(|| invalid("time slot", &params.time_slot))?;

        let row = sqlx::query(
            "SELECT create_booking_atomic(
                 _user_id => $1::uuid,
                 _pet_id => $2::uuid,
                 _service_id => $3::uuid,
                 _provider_ids => $4::uuid[],
                 _booking_date => $5,
                 _time_slot => $6,
                 _notes => $7,
                 _secondary_service_id => $8::uuid
             )::text AS appointment_id",
        )
        .bind(&params.user_id)
        .bind(&params.pet_id)
        .bind(&params.service_id)
        .bind(&params.provider_ids)
        .bind(date)
        .bind(time)
        .bind(&params.notes)
        .bind(&params.secondary_service_id)
        .fetch_one(&self.pool)
        .await
        .map_err(backend_error)?;

        row.try_get::<String, _>("appointment_id")
            .map_err(backend_error)
    }

    async fn edit_booking(&self, params: &EditBookingParams) -> BackendResult<()> {
        let date =
            parse_date(&params.new_date).ok_or_else(|| invalid("date", &params.new_date))?;
        let time = parse_slot_time(&params.new_time_slot)
            .ok_or_else(|| invalid("time slot", &params.new_time_slot))?;

        sqlx::query(
            "SELECT edit_booking_admin(
                 _appointment_id => $1::uuid,
                 _new_date => $2,
                 _new_time_slot => $3,
                 _extra_fee => $4,
                 _admin_notes => $5,
                 _force_override => $6,
                 _edited_by => $7::uuid
             )",
        )
        .bind(&params.appointment_id)
        .bind(date)
        .bind(time)
        .bind(params.extra_fee)
        .bind(&params.admin_notes)
        .bind(params.force_override)
        .bind(&params.edited_by)
        .execute(&self.pool)
        .await
        .map_err(backend_error)?;

        Ok(())
    }
}

#[async_trait]
impl ProfileBackend for PgBackend {
    async fn update_profile(&self, update: &ClientProfileUpdate) -> BackendResult<()> {
        sqlx::query(
            "SELECT client_update_profile(
                 _user_id => $1::uuid,
                 _name => $2,
                 _phone => $3,
                 _address => $4
             )",
        )
        .bind(&update.user_id)
        .bind(&update.name)
        .bind(&update.phone)
        .bind(&update.address)
        .execute(&self.pool)
        .await
        .map_err(backend_error)?;

        Ok(())
    }

    async fn update_consent(&self, update: &ConsentUpdate) -> BackendResult<()> {
        sqlx::query(
            "SELECT client_update_consent(
                 _user_id => $1::uuid,
                 _consent_type => $2,
                 _granted => $3
             )",
        )
        .bind(&update.user_id)
        .bind(&update.consent_type)
        .bind(update.granted)
        .execute(&self.pool)
        .await
        .map_err(backend_error)?;

        Ok(())
    }

    async fn complete_onboarding(&self, user_id: &str) -> BackendResult<()> {
        sqlx::query("SELECT client_complete_onboarding(_user_id => $1::uuid)")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;

        Ok(())
    }
}

#[async_trait]
impl AvailabilityAdmin for PgBackend {
    async fn set_slot_availability(&self, row: &AvailabilityRow) -> BackendResult<()> {
        let date = parse_date(&row.date).ok_or_else(|| invalid("date", &row.date))?;
        let time =
            parse_slot_time(&row.time_slot).ok_or_else(|| invalid("time slot", &row.time_slot))?;

        sqlx::query(
            "INSERT INTO staff_availability (staff_profile_id, date, time_slot, available)
             VALUES ($1::uuid, $2, $3, $4)
             ON CONFLICT (staff_profile_id, date, time_slot)
             DO UPDATE SET available = EXCLUDED.available",
        )
        .bind(&row.staff_profile_id)
        .bind(date)
        .bind(time)
        .bind(row.available)
        .execute(&self.pool)
        .await
        .map_err(backend_error)?;

        tracing::info!(
            staff_id = %row.staff_profile_id,
            date = %row.date,
            time_slot = %row.time_slot,
            available = row.available,
            "availability override saved"
        );
        Ok(())
    }
}
