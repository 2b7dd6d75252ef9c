use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use super::StoreError;
use crate::models::hotel::{
    ContactInfo, ContactType, CreateHotelRequest, Hotel, HotelOfficial, LocationStats,
    NewContactInfo,
};

/// Durable storage for the hotel directory.
#[async_trait]
pub trait HotelRepository: Send + Sync {
    /// Insert a hotel together with its contacts.
    async fn create_hotel(&self, hotel: CreateHotelRequest) -> Result<Hotel, StoreError>;

    /// Delete a hotel; its contacts go with it.
    async fn delete_hotel(&self, id: Uuid) -> Result<(), StoreError>;

    async fn add_contact(
        &self,
        hotel_id: Uuid,
        contact: NewContactInfo,
    ) -> Result<ContactInfo, StoreError>;

    /// Remove a contact, provided it belongs to `hotel_id`.
    async fn remove_contact(&self, hotel_id: Uuid, contact_id: Uuid) -> Result<(), StoreError>;

    async fn list_hotels(&self) -> Result<Vec<Hotel>, StoreError>;

    async fn list_officials(&self) -> Result<Vec<HotelOfficial>, StoreError>;

    async fn get_hotel(&self, id: Uuid) -> Result<Option<Hotel>, StoreError>;

    /// Count hotels with a `location` contact equal to `location`, and the
    /// phone contacts among those hotels.
    async fn location_stats(&self, location: &str) -> Result<LocationStats, StoreError>;
}

pub struct PgHotelRepository {
    pool: PgPool,
}

impl PgHotelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn contact_from_row(row: &PgRow) -> Result<ContactInfo, StoreError> {
    let info_type: String = row.try_get("info_type")?;
    let kind = ContactType::from_str(&info_type).map_err(|_| StoreError::InvalidColumn {
        column: "info_type",
        value: info_type.clone(),
    })?;

    Ok(ContactInfo {
        id: row.try_get("id")?,
        hotel_id: row.try_get("hotel_id")?,
        info_type: kind,
        info_content: row.try_get("info_content")?,
    })
}

fn hotel_from_row(row: &PgRow, contact_infos: Vec<ContactInfo>) -> Result<Hotel, StoreError> {
    Ok(Hotel {
        id: row.try_get("id")?,
        owner_name: row.try_get("owner_name")?,
        owner_surname: row.try_get("owner_surname")?,
        company_title: row.try_get("company_title")?,
        contact_infos,
    })
}

#[async_trait]
impl HotelRepository for PgHotelRepository {
    async fn create_hotel(&self, request: CreateHotelRequest) -> Result<Hotel, StoreError> {
        let hotel_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO hotels (id, owner_name, owner_surname, company_title)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(hotel_id)
        .bind(&request.owner_name)
        .bind(&request.owner_surname)
        .bind(&request.company_title)
        .execute(&mut *tx)
        .await?;

        let mut contact_infos = Vec::with_capacity(request.contacts.len());
        for contact in request.contacts {
            let contact = ContactInfo {
                id: Uuid::new_v4(),
                hotel_id,
                info_type: contact.info_type,
                info_content: contact.info_content,
            };

            sqlx::query(
                r#"
                INSERT INTO contact_infos (id, hotel_id, info_type, info_content)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(contact.id)
            .bind(contact.hotel_id)
            .bind(contact.info_type.as_ref())
            .bind(&contact.info_content)
            .execute(&mut *tx)
            .await?;

            contact_infos.push(contact);
        }

        tx.commit().await?;

        Ok(Hotel {
            id: hotel_id,
            owner_name: request.owner_name,
            owner_surname: request.owner_surname,
            company_title: request.company_title,
            contact_infos,
        })
    }

    async fn delete_hotel(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM hotels WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "hotel", id });
        }
        Ok(())
    }

    async fn add_contact(
        &self,
        hotel_id: Uuid,
        contact: NewContactInfo,
    ) -> Result<ContactInfo, StoreError> {
        let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM hotels WHERE id = $1")
            .bind(hotel_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound {
                entity: "hotel",
                id: hotel_id,
            });
        }

        let contact = ContactInfo {
            id: Uuid::new_v4(),
            hotel_id,
            info_type: contact.info_type,
            info_content: contact.info_content,
        };

        sqlx::query(
            r#"
            INSERT INTO contact_infos (id, hotel_id, info_type, info_content)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(contact.id)
        .bind(contact.hotel_id)
        .bind(contact.info_type.as_ref())
        .bind(&contact.info_content)
        .execute(&self.pool)
        .await?;

        Ok(contact)
    }

    async fn remove_contact(&self, hotel_id: Uuid, contact_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM contact_infos WHERE id = $1 AND hotel_id = $2")
            .bind(contact_id)
            .bind(hotel_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "contact",
                id: contact_id,
            });
        }
        Ok(())
    }

    async fn list_hotels(&self) -> Result<Vec<Hotel>, StoreError> {
        let hotel_rows = sqlx::query(
            "SELECT id, owner_name, owner_surname, company_title FROM hotels ORDER BY company_title",
        )
        .fetch_all(&self.pool)
        .await?;

        let contact_rows =
            sqlx::query("SELECT id, hotel_id, info_type, info_content FROM contact_infos")
                .fetch_all(&self.pool)
                .await?;

        let mut contacts_by_hotel: HashMap<Uuid, Vec<ContactInfo>> = HashMap::new();
        for row in &contact_rows {
            let contact = contact_from_row(row)?;
            contacts_by_hotel
                .entry(contact.hotel_id)
                .or_default()
                .push(contact);
        }

        hotel_rows
            .iter()
            .map(|row| {
                let id: Uuid = row.try_get("id")?;
                hotel_from_row(row, contacts_by_hotel.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    async fn list_officials(&self) -> Result<Vec<HotelOfficial>, StoreError> {
        let rows = sqlx::query(
            "SELECT owner_name, owner_surname, company_title FROM hotels ORDER BY company_title",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| {
                Ok::<_, StoreError>(HotelOfficial {
                    owner_name: r.try_get("owner_name")?,
                    owner_surname: r.try_get("owner_surname")?,
                    company_title: r.try_get("company_title")?,
                })
            })
            .collect()
    }

    async fn get_hotel(&self, id: Uuid) -> Result<Option<Hotel>, StoreError> {
        let Some(hotel_row) = sqlx::query(
            "SELECT id, owner_name, owner_surname, company_title FROM hotels WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let contact_rows = sqlx::query(
            "SELECT id, hotel_id, info_type, info_content FROM contact_infos WHERE hotel_id = $1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let contacts = contact_rows
            .iter()
            .map(contact_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        hotel_from_row(&hotel_row, contacts).map(Some)
    }

    async fn location_stats(&self, location: &str) -> Result<LocationStats, StoreError> {
        let row = sqlx::query(
            r#"
            WITH matched AS (
                SELECT DISTINCT hotel_id
                FROM contact_infos
                WHERE info_type = $2 AND info_content = $1
            )
            SELECT
                (SELECT COUNT(*) FROM matched)::INT AS hotel_count,
                (SELECT COUNT(*)
                 FROM contact_infos c
                 JOIN matched m ON c.hotel_id = m.hotel_id
                 WHERE c.info_type = $3)::INT AS phone_count
            "#,
        )
        .bind(location)
        .bind(ContactType::Location.as_ref())
        .bind(ContactType::Phone.as_ref())
        .fetch_one(&self.pool)
        .await?;

        Ok(LocationStats {
            hotel_count: row.try_get("hotel_count")?,
            phone_count: row.try_get("phone_count")?,
        })
    }
}
